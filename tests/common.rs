#![allow(dead_code)]
use jicycle::synth_config::{InversionOptions, Playbook, SynthConfig};
use jicycle::types::synthesis::{ChordDef, InversionFactor, InversionSelection};
use jicycle::types::timbre::Osc;

pub const TEST_SAMPLE_RATE: f64 = 20000.0;
pub const TEST_PITCH: f64 = 261.6255653005986;

pub fn test_config() -> SynthConfig {
  SynthConfig::new(TEST_SAMPLE_RATE, TEST_PITCH)
}

/// A small bank with inversions on, like the ones loaded onto the sampler.
pub fn test_playbook(oscillators: Vec<Osc>, chords: Vec<ChordDef>) -> Playbook {
  let mut playbook = Playbook::new(test_config(), oscillators, chords);
  playbook.inversions = InversionOptions {
    generate: true,
    selection: InversionSelection::Custom,
    factor: InversionFactor::Smart,
    octave_up: false,
  };
  playbook
}

pub fn expected_period(reference_frequency: f64) -> usize {
  (TEST_SAMPLE_RATE / reference_frequency).round() as usize
}
