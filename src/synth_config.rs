use crate::error::{Error, Result};
use crate::synth::{nyquist, F0, NORMALIZE_THRESHOLD, SRf};
use crate::types::synthesis::{ChordDef, InversionFactor, InversionSelection};
use crate::types::timbre::Osc;
use serde::{Deserialize, Serialize};

fn default_sample_rate() -> f64 {
  SRf
}

fn default_reference_pitch() -> f64 {
  F0
}

fn default_normalize_threshold() -> f64 {
  NORMALIZE_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
  #[serde(default = "default_sample_rate")]
  pub sample_rate: f64,
  /// Pitch of each chord's lowest partial in root position
  #[serde(default = "default_reference_pitch")]
  pub reference_pitch: f64,
}

impl SynthConfig {
  pub fn new(sample_rate: f64, reference_pitch: f64) -> SynthConfig {
    SynthConfig {
      sample_rate,
      reference_pitch,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if !self.sample_rate.is_finite() || self.sample_rate < 1f64 || self.sample_rate > u32::MAX as f64 {
      return Err(Error::InvalidSampleRate(self.sample_rate));
    }
    Ok(())
  }

  /// Sample rate as written into the WAV header.
  pub fn wav_sample_rate(&self) -> u32 {
    self.sample_rate.round() as u32
  }
}

impl Default for SynthConfig {
  fn default() -> Self {
    SynthConfig::new(SRf, F0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InversionOptions {
  pub generate: bool,
  pub selection: InversionSelection,
  pub factor: InversionFactor,
  /// Add the whole chord one octave up after its inversions
  pub octave_up: bool,
}

/// Optional second render of each cycle through a compressor and a low-pass filter,
/// written next to the plain file with a `compressed` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
  pub enabled: bool,
  pub threshold_db: f64,
  pub ratio: f64,
  pub attack_ms: f64,
  pub release_ms: f64,
  /// Cutoff in Hz; a low cutoff suits a low reference pitch
  pub low_pass_frequency: f64,
}

impl Default for CompressionOptions {
  fn default() -> Self {
    CompressionOptions {
      enabled: false,
      threshold_db: -8f64,
      ratio: 4f64,
      attack_ms: 0.8,
      release_ms: 0.8,
      low_pass_frequency: 180f64,
    }
  }
}

impl CompressionOptions {
  pub fn validate(&self, sample_rate: f64) -> Result<()> {
    let invalid = |setting: &'static str, value: f64| Err(Error::InvalidCompression { setting, value });
    if !self.threshold_db.is_finite() || self.threshold_db > 0f64 {
      return invalid("threshold_db", self.threshold_db);
    }
    if !self.ratio.is_finite() || self.ratio < 1f64 {
      return invalid("ratio", self.ratio);
    }
    if !self.attack_ms.is_finite() || self.attack_ms < 0f64 {
      return invalid("attack_ms", self.attack_ms);
    }
    if !self.release_ms.is_finite() || self.release_ms < 0f64 {
      return invalid("release_ms", self.release_ms);
    }
    if !(self.low_pass_frequency > 0f64 && self.low_pass_frequency < nyquist(sample_rate)) {
      return invalid("low_pass_frequency", self.low_pass_frequency);
    }
    Ok(())
  }
}

/// A full batch: which oscillators render which chords, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
  #[serde(flatten)]
  pub synth: SynthConfig,
  pub oscillators: Vec<Osc>,
  pub chords: Vec<ChordDef>,
  #[serde(default)]
  pub inversions: InversionOptions,
  #[serde(default)]
  pub normalize: bool,
  #[serde(default = "default_normalize_threshold")]
  pub normalize_threshold: f64,
  /// Also render ratio 1 once for every oscillator in the bank
  #[serde(default)]
  pub unison_bank: bool,
  #[serde(default)]
  pub compression: CompressionOptions,
}

impl Playbook {
  pub fn new(synth: SynthConfig, oscillators: Vec<Osc>, chords: Vec<ChordDef>) -> Self {
    Playbook {
      synth,
      oscillators,
      chords,
      inversions: InversionOptions::default(),
      normalize: false,
      normalize_threshold: NORMALIZE_THRESHOLD,
      unison_bank: false,
      compression: CompressionOptions::default(),
    }
  }

  /// Checks the settings that would otherwise only fail once rendering starts.
  pub fn validate(&self) -> Result<()> {
    self.synth.validate()?;
    for chord in self.chords.iter() {
      chord.validate_name()?;
    }
    if self.compression.enabled {
      self.compression.validate(self.synth.sample_rate)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod test_unit {
  use super::*;

  #[test]
  fn test_chord_names_must_stay_inside_the_oscillator_dir() {
    for name in ["../x", "a/b", "a\\b", "", "  "] {
      let playbook = Playbook::new(SynthConfig::default(), vec![Osc::Sine], vec![ChordDef::new(name, vec![4.0, 5.0, 6.0], &[])]);
      match playbook.validate() {
        Err(Error::InvalidChordName(n)) => assert_eq!(name, n),
        other => panic!("expected InvalidChordName for {:?}, got {:?}", name, other),
      }
    }
    let playbook = Playbook::new(SynthConfig::default(), vec![Osc::Sine], vec![ChordDef::new("m7»", vec![10.0, 12.0, 15.0, 18.0], &[])]);
    assert!(playbook.validate().is_ok());
  }

  #[test]
  fn test_compression_settings_are_checked_only_when_enabled() {
    let mut playbook = Playbook::new(SynthConfig::default(), vec![Osc::Sine], vec![]);
    playbook.compression.low_pass_frequency = 15000.0;
    assert!(playbook.validate().is_ok());

    playbook.compression.enabled = true;
    assert!(matches!(
      playbook.validate(),
      Err(Error::InvalidCompression { setting: "low_pass_frequency", .. })
    ));

    playbook.compression = CompressionOptions { enabled: true, ratio: 0.5, ..CompressionOptions::default() };
    assert!(matches!(playbook.validate(), Err(Error::InvalidCompression { setting: "ratio", .. })));

    playbook.compression = CompressionOptions { enabled: true, ..CompressionOptions::default() };
    assert!(playbook.validate().is_ok());
  }
}
