//! Batch planning.
//!
//! Every output path is decided here, before anything is rendered, so parallel
//! workers never race for a file name.

use crate::error::Result;
use crate::files;
use crate::synth_config::{CompressionOptions, Playbook};
use crate::types::synthesis::{ChordDef, Ratio, SynthesisRequest, Variant};
use crate::types::timbre::{Osc, Oscillator};
use crate::voicing;
use itertools::iproduct;
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Directory holding the unison bank.
pub const UNISON_DIR: &str = "unison";

/// One (oscillator, chord, voicing) render with its reserved output path.
#[derive(Debug, Clone)]
pub struct Task {
  /// Position in the plan, also the order files should be presented in
  pub order: usize,
  pub osc: Oscillator,
  pub chord: String,
  pub variant: Variant,
  /// Root position ratios; the variant is applied when the request is built
  pub root: Vec<Ratio>,
  pub factor: f64,
  pub reference_frequency: f64,
  pub path: PathBuf,
  pub compressed: Option<CompressedTarget>,
}

/// Where and how the compressed copy of a task is written.
#[derive(Debug, Clone)]
pub struct CompressedTarget {
  pub options: CompressionOptions,
  pub path: PathBuf,
}

impl Task {
  pub fn ratios(&self) -> Result<Vec<Ratio>> {
    voicing::apply(&self.root, self.variant, self.factor)
  }

  pub fn request(&self) -> Result<SynthesisRequest> {
    Ok(SynthesisRequest {
      reference_frequency: self.reference_frequency,
      ratios: self.ratios()?,
      oscillator: self.osc,
    })
  }
}

/// File stem for a chord voicing.
///
/// Root only chords keep four characters of their name; chords with inversions keep
/// three and add `0` for the root, the inversion index, or `+` for the octave up voicing.
pub fn stem(chord: &str, variant: Variant, root_only: bool) -> String {
  let short = |n: usize| chord.chars().take(n).collect::<String>();
  match variant {
    Variant::Root if root_only => short(4),
    Variant::Root => format!("{}0", short(3)),
    Variant::Inversion(k) => format!("{}{}", short(3), k),
    Variant::OctaveUp => format!("{}+", short(3)),
    Variant::Unison => short(4),
  }
}

/// Hands out unique paths. A path already claimed, or already on disk when
/// the plan is built, gets the first free ` (i)` suffix.
#[derive(Debug, Default)]
pub struct PathReserver {
  claimed: HashSet<PathBuf>,
}

impl PathReserver {
  pub fn reserve(&mut self, dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.wav", stem));
    let mut i = 1;
    while self.claimed.contains(&path) || files::exists(&path) {
      debug!("{} already exists", path.display());
      path = dir.join(format!("{} ({}).wav", stem, i));
      i += 1;
    }
    self.claimed.insert(path.clone());
    path
  }
}

fn compressed_target(reserver: &mut PathReserver, options: &CompressionOptions, dir: &Path, stem: &str) -> Option<CompressedTarget> {
  if !options.enabled {
    return None;
  }
  Some(CompressedTarget {
    options: *options,
    path: reserver.reserve(dir, &format!("{}compressed", stem)),
  })
}

/// Lays out every render of a playbook under `out_dir`, in output order:
/// per oscillator, per chord, root then inversions then octave up; the unison bank last.
pub fn plan(playbook: &Playbook, out_dir: &Path) -> Vec<Task> {
  let mut reserver = PathReserver::default();
  let mut tasks: Vec<Task> = Vec::new();
  let options = &playbook.inversions;
  let pitch = playbook.synth.reference_pitch;

  for (osc, chord) in iproduct!(playbook.oscillators.iter(), playbook.chords.iter()) {
    let dir = out_dir.join(osc.name());
    let root_only = !options.generate || voicing::is_root_only(chord, options.selection);
    let factor = voicing::inversion_factor(&chord.ratios, options.factor);
    for variant in voicing::variants(chord, options) {
      let file_stem = stem(&chord.name, variant, root_only);
      let path = reserver.reserve(&dir, &file_stem);
      let compressed = compressed_target(&mut reserver, &playbook.compression, &dir, &file_stem);
      tasks.push(Task {
        order: tasks.len(),
        osc: osc.oscillator(),
        chord: chord.name.clone(),
        variant,
        root: chord.ratios.clone(),
        factor,
        reference_frequency: reference_frequency(pitch, chord),
        path,
        compressed,
      });
    }
  }

  if playbook.unison_bank {
    let dir = out_dir.join(UNISON_DIR);
    for osc in Osc::ALL {
      let path = reserver.reserve(&dir, osc.name());
      let compressed = compressed_target(&mut reserver, &playbook.compression, &dir, osc.name());
      tasks.push(Task {
        order: tasks.len(),
        osc: osc.oscillator(),
        chord: osc.name().to_string(),
        variant: Variant::Unison,
        root: vec![1f64],
        factor: 2f64,
        reference_frequency: pitch,
        path,
        compressed,
      });
    }
  }
  tasks
}

/// Every voicing of a chord shares the root position's reference so its lowest
/// partial sounds at `pitch`.
pub fn reference_frequency(pitch: f64, chord: &ChordDef) -> f64 {
  match chord.ratios.first() {
    Some(&lowest) => pitch / lowest,
    None => pitch,
  }
}
