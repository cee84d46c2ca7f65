//! Chord voicings: inversions, octave shifts and register normalization.
//!
//! Ratio order is never changed. Summation does not care about order, but
//! inversion indices do.

use crate::error::{Error, Result};
use crate::synth_config::InversionOptions;
use crate::types::synthesis::{ChordDef, InversionFactor, InversionSelection, Ratio, Variant};
use log::debug;

/// Octave multiplier applied to the inverted partials. Always a power of two, at least 2.
pub fn inversion_factor(ratios: &[Ratio], policy: InversionFactor) -> f64 {
  match policy {
    InversionFactor::Fixed => 2f64,
    InversionFactor::Smart => {
      let lowest = ratios.iter().copied().fold(f64::INFINITY, f64::min);
      let highest = ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max);
      let mut factor = 2f64;
      if !(lowest > 0f64) || !highest.is_finite() {
        return factor;
      }
      let spread = highest / lowest;
      while factor <= spread {
        factor *= 2f64;
      }
      factor
    }
  }
}

/// Raises the first `k` ratios by `factor` and keeps the rest.
pub fn invert(ratios: &[Ratio], k: usize, factor: f64) -> Result<Vec<Ratio>> {
  if k == 0 || k >= ratios.len() {
    return Err(Error::InvalidInversionIndex {
      index: k,
      n_ratios: ratios.len(),
    });
  }
  Ok(ratios.iter().enumerate().map(|(i, r)| if i < k { r * factor } else { *r }).collect())
}

/// Every ratio one octave up.
pub fn octave_up(ratios: &[Ratio]) -> Vec<Ratio> {
  ratios.iter().map(|r| r * 2f64).collect()
}

/// Single notes and chords rooted on 1 are left as they are.
fn is_unison(ratios: &[Ratio]) -> bool {
  ratios.len() == 1 || ratios.first() == Some(&1f64)
}

/// A chord that only ever renders its root position.
pub fn is_root_only(chord: &ChordDef, selection: InversionSelection) -> bool {
  is_unison(&chord.ratios) || (selection == InversionSelection::Custom && chord.inversions.is_empty())
}

/// Raises a chord by octaves until its lowest ratio reaches `threshold`,
/// so every chord in a bank sits in the same register. Applying it twice changes nothing.
pub fn normalize(chord: &ChordDef, threshold: f64) -> ChordDef {
  let mut normalized = chord.clone();
  if is_unison(&chord.ratios) || !(threshold > 0f64) {
    return normalized;
  }
  let base = match chord.ratios.first() {
    Some(&base) if base > 0f64 && base.is_finite() => base,
    _ => return normalized,
  };
  let mut lift = 1f64;
  while base * lift < threshold {
    lift *= 2f64;
  }
  if lift > 1f64 {
    normalized.ratios = chord.ratios.iter().map(|r| r * lift).collect();
    debug!("{} raised {} octave(s)", chord.name, lift.log2());
  }
  normalized
}

/// Inversion indices to render for a chord under `selection`.
///
/// `Custom` passes the chord's own set through untouched, out of range entries
/// included, so they can be reported per artifact.
pub fn select_inversions(chord: &ChordDef, selection: InversionSelection) -> Vec<usize> {
  if chord.ratios.len() < 2 || is_unison(&chord.ratios) {
    return vec![];
  }
  let max = chord.ratios.len() - 1;
  match selection {
    InversionSelection::Custom => chord.inversions.iter().copied().collect(),
    InversionSelection::All => (1..=max).collect(),
    InversionSelection::Even => (1..=max).filter(|k| k % 2 == 0).collect(),
    InversionSelection::UpTo(limit) => (1..=max.min(limit)).collect(),
    InversionSelection::Only(k) => {
      if (1..=max).contains(&k) {
        vec![k]
      } else {
        vec![]
      }
    }
  }
}

/// Every voicing of `chord` in render order: root, inversions ascending, then octave up.
pub fn variants(chord: &ChordDef, options: &InversionOptions) -> Vec<Variant> {
  let mut out = vec![Variant::Root];
  if !options.generate || is_root_only(chord, options.selection) {
    return out;
  }
  out.extend(select_inversions(chord, options.selection).into_iter().map(Variant::Inversion));
  if options.octave_up {
    out.push(Variant::OctaveUp);
  }
  out
}

/// Ratios of one voicing of a root position chord.
pub fn apply(ratios: &[Ratio], variant: Variant, factor: f64) -> Result<Vec<Ratio>> {
  match variant {
    Variant::Root | Variant::Unison => Ok(ratios.to_vec()),
    Variant::Inversion(k) => invert(ratios, k, factor),
    Variant::OctaveUp => Ok(octave_up(ratios)),
  }
}
