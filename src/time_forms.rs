//! Single cycle waveforms in the time domain.
//!
//! Every form maps a phase `x` (radians, already scaled by the partial's frequency) and
//! the number of harmonics that fit under Nyquist to an amplitude in [-1, 1].
//! The band limited forms divide by `partials` and must not be called with zero.

use crate::synth::{pi, pi_2};
use std::ops::Range;

/// Unit generator: (phase, partials) -> amplitude
pub type Ugen = fn(f64, usize) -> f64;

/// Sum of `sin(nx)/n` over `harmonics`, each weighted by a raised cosine window
/// that falls to zero just past the `partials`-th harmonic to soften Gibbs ringing.
fn windowed_sum(x: f64, partials: usize, harmonics: Range<usize>, odd_only: bool) -> f64 {
  window_step_sum(x, pi_2 / partials as f64, harmonics, odd_only)
}

/// `windowed_sum` with the window advancing `k` radians per harmonic.
fn window_step_sum(x: f64, k: f64, harmonics: Range<usize>, odd_only: bool) -> f64 {
  harmonics
    .filter(|n| !odd_only || n % 2 == 1)
    .map(|n| {
      let m = ((n - 1) as f64 * k).cos();
      (n as f64 * x).sin() / n as f64 * m * m
    })
    .sum()
}

pub fn sine(x: f64, _partials: usize) -> f64 {
  x.sin()
}

pub fn triangle(x: f64, _partials: usize) -> f64 {
  0.63 * x.sin().asin()
}

pub fn sawtooth(x: f64, partials: usize) -> f64 {
  windowed_sum(x, partials, 1..partials, false) / 2f64
}

/// Sawtooth whose window closes twice as fast, reopening once past the middle partial.
pub fn sawtooth_narrow(x: f64, partials: usize) -> f64 {
  window_step_sum(x, pi / partials as f64, 1..partials, false) / 2f64
}

/// Sawtooth without its fundamental, summing a fixed 48 harmonics.
pub fn sawtooth_upper(x: f64, partials: usize) -> f64 {
  windowed_sum(x, partials, 2..50, false) / 2f64
}

pub fn square(x: f64, partials: usize) -> f64 {
  windowed_sum(x, partials, 1..partials, true)
}

/// Unwindowed Fourier square with a fixed 99 odd harmonics. Not band limited.
pub fn square_fourier(x: f64, _partials: usize) -> f64 {
  (1..100usize)
    .map(|n| {
      let h = (2 * n - 1) as f64;
      (x * h).sin() / h
    })
    .sum()
}

pub fn fm1(x: f64, _partials: usize) -> f64 {
  let (wc, kw, wm) = (3f64, 4.8f64, 2f64);
  (wc * x + kw * (wm * x).sin()).sin()
}

pub fn fm2(x: f64, _partials: usize) -> f64 {
  let (wc, kw, wm) = (1f64, 1.6f64, 3f64);
  (wc * x + kw * (wm * x).sin()).sin()
}

// The additive voices keep a fixed harmonic count; `partials` only shapes the window.

pub fn choir(x: f64, partials: usize) -> f64 {
  windowed_sum(x, partials, 1..3, false) / 2f64
}

pub fn voice(x: f64, partials: usize) -> f64 {
  windowed_sum(x, partials, 1..6, false) / 2f64
}

pub fn flute(x: f64, partials: usize) -> f64 {
  windowed_sum(x, partials, 1..4, true)
}

pub fn whistle(x: f64, partials: usize) -> f64 {
  windowed_sum(x, partials, 1..3, true)
}

/// Triangle sine pulse: starts as a triangle and rounds out in the second half.
pub fn triangle_sine_pulse(x: f64, _partials: usize) -> f64 {
  let v = 0.78 * (x / 2f64 - 0.463).cos().asin().powi(2) - 1.0002;
  v.clamp(-1f64, 1f64)
}

pub fn tuba(x: f64, _partials: usize) -> f64 {
  ((1f64 + 2f64 * x + (-1f64 + x + x.sin()).sin()).sin() + x.sin()) / 2f64
}

pub fn trumpet(x: f64, _partials: usize) -> f64 {
  ((1f64 + 2f64 * x + (1f64 + x + x.sin()).sin()).sin() + x.sin()) / 2f64
}

pub fn soft(x: f64, _partials: usize) -> f64 {
  0.2 + ((1f64 + 2f64 * x + (2f64 * x + x.sin()).sin()).sin() + x.sin()) / 1.8
}

pub fn pad(x: f64, _partials: usize) -> f64 {
  ((1f64 + 2f64 * x + (2f64 * x + (2f64 * x).sin()).sin()).sin() + x.sin()) / 2f64
}

/// Phase warp shared by the harmonic sine and buzzy families. Runs at half speed,
/// `y` sets how much of the inner modulation leaks through; above 8 it gets noisy.
/// With odd `y` the result repeats every 4π, so odd ratios will not loop cleanly.
fn warped(x: f64, y: f64) -> f64 {
  let h = x / 2f64;
  (2f64 * h + (33f64 + (y * h).sin()).sin()) + 2.13
}

pub fn harmonic_sine(x: f64, _partials: usize) -> f64 {
  -warped(x, 3f64).sin()
}

pub fn harmonic_sine2(x: f64, _partials: usize) -> f64 {
  -warped(x, 9f64).sin()
}

pub fn buzzy(x: f64, _partials: usize) -> f64 {
  -0.62 * warped(x, 8f64).sin().asin()
}

pub fn buzzy2(x: f64, _partials: usize) -> f64 {
  -0.62 * warped(x, 4f64).sin().asin()
}

pub fn distort(x: f64, _partials: usize) -> f64 {
  (1f64 + x + (1f64 + 3f64 * x + (9f64 * x).sin()).sin()).sin()
}

pub fn clip(x: f64, partials: usize) -> f64 {
  let clip_factor = 2.2;
  (clip_factor * distort(x, partials)).clamp(-1f64, 1f64)
}

/// One full turn sampled at `n` points, starting at `from`.
pub fn phases(from: f64, n: usize) -> Vec<f64> {
  (0..n).map(|i| from + 2f64 * pi * i as f64 / n as f64).collect()
}
