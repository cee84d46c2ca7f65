/// This module provides the settings for the application's synthesis engine.
/// It includes the default Sample Rate and reference pitch for single cycle renders,
/// the PCM scaling factor, and the Nyquist helpers.
///
/// The module also offers convenient aliases for standard constants at f64 precision.
pub const pi: f64 = std::f64::consts::PI;
pub const pi2: f64 = pi * 2f64;
pub const pi_2: f64 = std::f64::consts::FRAC_PI_2;

pub use crate::types::synthesis::SampleBuffer;

/// Known good rate for the target sampler. 22050, 24000, 44100 and 48000 also work for other hosts.
pub const SR: usize = 20000;
pub const SRf: f64 = SR as f64;

/// C4
pub const F0: f64 = 261.6255653005986;

/// Largest positive 16 bit sample, used as the quantization scale.
pub const PCM_SCALE: f64 = i16::MAX as f64;

/// Nyquist Frequency: maximum renderable frequency at the given sample rate
pub fn nyquist(sample_rate: f64) -> f64 {
  sample_rate / 2f64
}

/// Longest single cycle accepted, in samples. About three seconds at the default rate.
pub const MAX_PERIOD: usize = 1 << 16;

/// Upper bound on the harmonics summed per partial.
pub const MAX_PARTIALS: usize = 1024;

/// Octave threshold for chord normalization.
/// Minor [10,12,15] is the highest simple chord, so lower chords are raised to meet it.
pub const NORMALIZE_THRESHOLD: f64 = 8f64;
