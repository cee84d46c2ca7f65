//! Dynamics and filtering for the compressed copy of a single cycle.
//!
//! A cycle is too short for an envelope follower to settle, so it is tiled three
//! times, processed, and the middle period is kept. The result still loops.

use crate::error::{Error, Result};
use crate::render::quantize;
use crate::synth::PCM_SCALE;
use crate::synth_config::CompressionOptions;
use crate::types::synthesis::SampleBuffer;
use biquad::{Biquad, Coefficients, DirectForm1, Hertz, Type as FilterType, Q_BUTTERWORTH_F64};

const MIN_DB: f64 = -96f64;

pub fn amp_to_db(amp: f64) -> f64 {
  let amp = amp.abs();
  if amp == 0f64 {
    MIN_DB
  } else {
    (20f64 * amp.log10()).max(MIN_DB)
  }
}

pub fn db_to_amp(db: f64) -> f64 {
  10f64.powf(db / 20f64)
}

/// Smoothing coefficient for a time constant in seconds.
fn time_to_coefficient(time_sec: f64, sample_rate: f64) -> f64 {
  if time_sec <= 0f64 {
    0f64
  } else {
    (-1f64 / (time_sec * sample_rate)).exp()
  }
}

/// Linear gain that maps `input_db` onto the compression curve.
pub fn hard_knee_gain(input_db: f64, threshold_db: f64, ratio: f64) -> f64 {
  if input_db < threshold_db {
    1f64
  } else {
    let out_db = threshold_db + (input_db - threshold_db) / ratio.max(1f64);
    db_to_amp(out_db - input_db)
  }
}

/// Peak compressor with separate attack and release smoothing.
pub fn compressor(samples: &[f64], sample_rate: f64, options: &CompressionOptions) -> Vec<f64> {
  let attack = time_to_coefficient(options.attack_ms / 1000f64, sample_rate);
  let release = time_to_coefficient(options.release_ms / 1000f64, sample_rate);

  let mut output = Vec::with_capacity(samples.len());
  let mut previous_gain = 1f64;
  for &sample in samples.iter() {
    let target = hard_knee_gain(amp_to_db(sample), options.threshold_db, options.ratio);
    // falling gain is the attack phase
    let coeff = if target < previous_gain { attack } else { release };
    let gain = target + coeff * (previous_gain - target);
    previous_gain = gain;
    output.push(sample * gain);
  }
  output
}

/// Butterworth low-pass over `samples`.
pub fn apply_lowpass(samples: &[f64], sample_rate: f64, cutoff_hz: f64) -> Result<Vec<f64>> {
  let fs = Hertz::<f64>::from_hz(sample_rate).map_err(|e| Error::Filter(format!("{:?}", e)))?;
  let f0 = Hertz::<f64>::from_hz(cutoff_hz).map_err(|e| Error::Filter(format!("{:?}", e)))?;
  let coeffs = Coefficients::<f64>::from_params(FilterType::LowPass, fs, f0, Q_BUTTERWORTH_F64)
    .map_err(|e| Error::Filter(format!("low-pass at {} Hz: {:?}", cutoff_hz, e)))?;

  let mut filter = DirectForm1::<f64>::new(coeffs);
  Ok(samples.iter().map(|&sample| filter.run(sample)).collect())
}

/// Compresses and low-passes one rendered cycle, keeping its length.
pub fn compress_cycle(buffer: &[i16], sample_rate: f64, options: &CompressionOptions) -> Result<SampleBuffer> {
  let n = buffer.len();
  if n == 0 {
    return Ok(Vec::new());
  }
  let tiled: Vec<f64> = buffer.iter().cycle().take(3 * n).map(|&s| s as f64 / PCM_SCALE).collect();
  let squeezed = compressor(&tiled, sample_rate, options);
  let filtered = apply_lowpass(&squeezed, sample_rate, options.low_pass_frequency)?;
  Ok(filtered[n..2 * n].iter().map(|&v| quantize(v)).collect())
}
