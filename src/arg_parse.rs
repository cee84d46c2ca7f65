use crate::error::Result;
use crate::synth_config::Playbook;
use crate::voicing;
use log::info;
use std::fs;

/// Reads a playbook and applies chord normalization when it asks for it.
pub fn load_playbook_from_file(filepath: &str) -> Result<Playbook> {
  let content = fs::read_to_string(filepath)?;
  let playbook = parse_playbook(&content)?;
  info!(
    "Loaded {} chord(s) for {} oscillator(s) from {}",
    playbook.chords.len(),
    playbook.oscillators.len(),
    filepath
  );
  Ok(playbook)
}

pub fn parse_playbook(content: &str) -> Result<Playbook> {
  let mut playbook: Playbook = serde_json::from_str(content)?;
  playbook.validate()?;
  if playbook.normalize {
    let threshold = playbook.normalize_threshold;
    playbook.chords = playbook.chords.iter().map(|chord| voicing::normalize(chord, threshold)).collect();
  }
  Ok(playbook)
}
