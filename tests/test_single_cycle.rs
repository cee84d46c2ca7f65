mod common;

use jicycle::render::{quantize, sample_chord};
use jicycle::synth::pi2;
use jicycle::time::partials_below_nyquist;
use jicycle::types::synthesis::SynthesisRequest;
use jicycle::types::timbre::Osc;

#[test]
fn test_major_triad_scenario() {
  let conf = common::test_config();
  let request = SynthesisRequest {
    reference_frequency: common::TEST_PITCH,
    ratios: vec![4.0, 5.0, 6.0],
    oscillator: Osc::Sine.oscillator(),
  };
  let buffer = sample_chord(&conf, &request).unwrap();
  assert_eq!(76, buffer.len());
  assert_eq!(common::expected_period(common::TEST_PITCH), buffer.len());

  let fundamental: f64 = 20000.0 / 76.0;
  assert!((fundamental - 263.16).abs() < 0.01);
  for (i, &sample) in buffer.iter().enumerate() {
    let t = i as f64 * pi2 / 20000.0;
    let v = request.ratios.iter().map(|r| (fundamental * r * t).sin()).sum::<f64>() / 3.0;
    assert_eq!(quantize(v), sample);
  }
}

/// Playing the buffer twice in a row must not add a jump at the seam beyond
/// what the waveform itself does between two neighbouring samples.
/// Even ratios, since the harmonic sine forms repeat every 4π.
#[test]
fn test_seam_is_no_rougher_than_the_waveform() {
  let conf = common::test_config();
  for osc in Osc::ALL.iter().filter(|o| o.deterministic()) {
    let request = SynthesisRequest {
      reference_frequency: common::TEST_PITCH / 8.0,
      ratios: vec![8.0, 10.0, 12.0, 16.0],
      oscillator: osc.oscillator(),
    };
    let buffer = sample_chord(&conf, &request).unwrap();
    let n = buffer.len();
    let fundamental = common::TEST_SAMPLE_RATE / n as f64;

    let render_at = |i: usize| {
      let t = i as f64 * pi2 / common::TEST_SAMPLE_RATE;
      let v = request
        .ratios
        .iter()
        .map(|r| {
          let f = fundamental * r;
          (osc.ugen())(f * t, partials_below_nyquist(common::TEST_SAMPLE_RATE, f))
        })
        .sum::<f64>()
        / request.ratios.len() as f64;
      quantize(v) as i32
    };

    let seam = (buffer[0] as i32 - buffer[n - 1] as i32).abs();
    let continued = (render_at(n) - buffer[n - 1] as i32).abs();
    assert!((seam - continued).abs() <= 1, "{}: seam {} vs continued {}", osc, seam, continued);
  }
}

#[test]
fn test_noise_is_the_only_nondeterministic_oscillator() {
  let conf = common::test_config();
  let request = SynthesisRequest {
    reference_frequency: common::TEST_PITCH,
    ratios: vec![1.0],
    oscillator: Osc::Noise.oscillator(),
  };
  let a = sample_chord(&conf, &request).unwrap();
  let b = sample_chord(&conf, &request).unwrap();
  assert_eq!(a.len(), b.len());
  assert_ne!(a, b);
}
