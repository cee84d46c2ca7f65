use crate::error::{Error, Result};
use crate::synth::{nyquist, MAX_PARTIALS, MAX_PERIOD};
use std::time::Instant;

/// Number of samples in one loopable cycle of `frequency`.
///
/// Rounds to the nearest whole sample; a period of zero samples
/// (pitch far above the sample rate) cannot be looped, and neither can
/// one longer than `MAX_PERIOD`.
pub fn period_length(sample_rate: f64, frequency: f64) -> Result<usize> {
  if !sample_rate.is_finite() || sample_rate <= 0f64 {
    return Err(Error::InvalidSampleRate(sample_rate));
  }
  let n = (sample_rate / frequency).round();
  if !n.is_finite() || n < 1f64 {
    return Err(Error::DegenerateLoopPeriod { sample_rate, frequency });
  }
  if n > MAX_PERIOD as f64 {
    return Err(Error::LoopPeriodTooLong {
      sample_rate,
      frequency,
      max_period: MAX_PERIOD,
    });
  }
  Ok(n as usize)
}

/// The frequency that completes exactly one cycle in `period` samples.
/// Trades pitch accuracy for a seamless loop point.
pub fn loop_frequency(sample_rate: f64, period: usize) -> f64 {
  sample_rate / period as f64
}

/// Number of harmonics of `frequency` that stay under Nyquist, at most `MAX_PARTIALS`.
pub fn partials_below_nyquist(sample_rate: f64, frequency: f64) -> usize {
  let n = (nyquist(sample_rate) / frequency).floor();
  if n.is_nan() {
    return 0;
  }
  (n as usize).min(MAX_PARTIALS)
}

/// Measures the execution time of a function.
///
/// Returns the result of the function and the duration it took to execute.
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, std::time::Duration) {
  let start = Instant::now();
  let result = f();
  let duration = start.elapsed();
  (result, duration)
}
