pub mod dynamics;
pub mod engrave;

use crate::error::{Error, Result};
use crate::files;
use crate::plan::Task;
use crate::synth::{nyquist, pi2, PCM_SCALE};
use crate::synth_config::SynthConfig;
use crate::time::{self, loop_frequency, partials_below_nyquist, period_length};
use crate::types::synthesis::{Ratio, SampleBuffer, SynthesisRequest, Variant};
use itertools::Itertools;
use log::{error, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};
use std::thread;
use sysinfo::System;

/// Checks everything that can be known before the first sample is computed.
/// Returns the loop period in samples.
pub fn validate_request(sample_rate: f64, request: &SynthesisRequest) -> Result<usize> {
  if request.ratios.is_empty() {
    return Err(Error::EmptyChord);
  }
  if let Some((index, &ratio)) = request.ratios.iter().find_position(|r| !(**r > 0f64 && r.is_finite())) {
    return Err(Error::InvalidRatio { index, ratio });
  }

  let period = period_length(sample_rate, request.reference_frequency)?;
  let fundamental = loop_frequency(sample_rate, period);

  if request.oscillator.band_limited {
    for &ratio in request.ratios.iter() {
      let frequency = fundamental * ratio;
      if partials_below_nyquist(sample_rate, frequency) == 0 {
        return Err(Error::AboveNyquist {
          osc: request.oscillator.name.to_string(),
          ratio,
          frequency,
          nyquist: nyquist(sample_rate),
        });
      }
    }
  }
  Ok(period)
}

/// Scales a value in [-1, 1] to 16 bit PCM.
pub fn quantize(v: f64) -> i16 {
  (PCM_SCALE * v).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Renders exactly one period of the chord.
///
/// The reference frequency is first snapped to `sample_rate / N` for a whole number of
/// samples `N`, so the buffer loops without a seam. Each partial is band limited to the
/// harmonics under Nyquist, and the partials are averaged so the sum stays in range.
pub fn sample_chord(conf: &SynthConfig, request: &SynthesisRequest) -> Result<SampleBuffer> {
  let sample_rate = conf.sample_rate;
  let period = validate_request(sample_rate, request)?;
  let fundamental = loop_frequency(sample_rate, period);
  let ugen = request.oscillator.ugen;

  let partials: Vec<(f64, usize)> = request
    .ratios
    .iter()
    .map(|r| {
      let frequency = fundamental * r;
      (frequency, partials_below_nyquist(sample_rate, frequency))
    })
    .collect();
  let n_ratios = partials.len() as f64;

  let mut buffer: SampleBuffer = Vec::with_capacity(period);
  for i in 0..period {
    let t = i as f64 * pi2 / sample_rate;
    let mut v = 0f64;
    for &(frequency, n_partials) in partials.iter() {
      let phase = frequency * t;
      let y = ugen(phase, n_partials);
      if !(-1f64..=1f64).contains(&y) {
        return Err(Error::InvalidOscillatorOutput {
          osc: request.oscillator.name.to_string(),
          phase,
          partials: n_partials,
          value: y,
        });
      }
      v += y;
    }
    buffer.push(quantize(v / n_ratios));
  }
  Ok(buffer)
}

/// One written single cycle and what it holds.
#[derive(Debug, Clone)]
pub struct Artifact {
  pub order: usize,
  pub osc: &'static str,
  pub chord: String,
  pub variant: Variant,
  pub ratios: Vec<Ratio>,
  pub path: PathBuf,
  pub compressed_path: Option<PathBuf>,
  pub n_samples: usize,
  pub loop_frequency: f64,
}

/// A task that could not be rendered or written.
#[derive(Debug)]
pub struct Failure {
  pub order: usize,
  pub osc: &'static str,
  pub chord: String,
  pub variant: Variant,
  pub path: PathBuf,
  pub error: Error,
}

/// Outcome of a whole plan. Both lists keep plan order.
#[derive(Debug, Default)]
pub struct BatchReport {
  pub artifacts: Vec<Artifact>,
  pub failures: Vec<Failure>,
}

impl BatchReport {
  pub fn is_ok(&self) -> bool {
    self.failures.is_empty()
  }

  /// Written files in plan order, for post processing that depends on ordering.
  pub fn paths(&self) -> Vec<&PathBuf> {
    self.artifacts.iter().map(|a| &a.path).collect()
  }

  pub fn log_summary(&self) {
    let per_osc = self.artifacts.iter().counts_by(|a| a.osc);
    for (osc, count) in per_osc.iter().sorted() {
      info!("{}: {} single cycle(s)", osc, count);
    }
    for failure in self.failures.iter() {
      error!(
        "{} {} ({}) -> {}: {}",
        failure.osc,
        failure.chord,
        failure.variant,
        failure.path.display(),
        failure.error
      );
    }
    info!("{} written, {} failed", self.artifacts.len(), self.failures.len());
  }
}

/// Renders one task and writes it to its reserved path.
pub fn render_task(conf: &SynthConfig, task: &Task) -> Result<Artifact> {
  let request = task.request()?;
  let buffer = sample_chord(conf, &request)?;
  engrave::samples(conf.wav_sample_rate(), &buffer, &task.path)?;

  if let Some(target) = task.compressed.as_ref() {
    let compressed = dynamics::compress_cycle(&buffer, conf.sample_rate, &target.options)?;
    engrave::samples(conf.wav_sample_rate(), &compressed, &target.path)?;
  }

  let period = buffer.len();
  info!(
    "GENERATED: {} ratios [{}] {} samples",
    task.path.display(),
    request.ratios.iter().join(","),
    period
  );
  Ok(Artifact {
    order: task.order,
    osc: task.osc.name,
    chord: task.chord.clone(),
    variant: task.variant,
    ratios: request.ratios,
    path: task.path.clone(),
    compressed_path: task.compressed.as_ref().map(|target| target.path.clone()),
    n_samples: period,
    loop_frequency: loop_frequency(conf.sample_rate, period),
  })
}

fn settle(conf: &SynthConfig, task: &Task) -> std::result::Result<Artifact, Failure> {
  render_task(conf, task).map_err(|error| Failure {
    order: task.order,
    osc: task.osc.name,
    chord: task.chord.clone(),
    variant: task.variant,
    path: task.path.clone(),
    error,
  })
}

/// Worker count: idle cores less one, capped by `MAX_PAR_THREADS`.
pub fn get_par_thread_count() -> usize {
  let available_threads = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);

  let mut sys = System::new_all();
  sys.refresh_cpu_all();

  let idle_cores = sys.cpus().iter().filter(|cpu| cpu.cpu_usage() < 50.0).count().max(1);

  let actual_available_threads = available_threads.min(idle_cores);

  let max_par_threads = env::var("MAX_PAR_THREADS")
    .ok()
    .and_then(|val| val.parse::<usize>().ok())
    .unwrap_or(actual_available_threads);

  let num_threads = actual_available_threads.min(max_par_threads);

  if num_threads > 1 {
    num_threads - 1
  } else {
    1
  }
}

/// Renders every task of a plan. A failing task is reported and the rest carry on.
pub fn render_plan(conf: &SynthConfig, tasks: &[Task]) -> Result<BatchReport> {
  conf.validate()?;
  let mut dirs: BTreeSet<&Path> = BTreeSet::new();
  for task in tasks.iter() {
    if task.path.parent().is_some_and(|dir| dirs.insert(dir)) {
      files::with_dir(&task.path)?;
    }
  }

  let num_threads = get_par_thread_count();
  let (outcomes, duration) = time::measure(|| {
    let parallel = || tasks.par_iter().map(|task| settle(conf, task)).collect::<Vec<_>>();
    if num_threads > 1 {
      match ThreadPoolBuilder::new().num_threads(num_threads).build() {
        Ok(pool) => pool.install(parallel),
        Err(e) => {
          warn!("Falling back to the global pool: {}", e);
          parallel()
        }
      }
    } else {
      tasks.iter().map(|task| settle(conf, task)).collect::<Vec<_>>()
    }
  });
  info!("Rendered {} task(s) on {} thread(s) in {:?}", tasks.len(), num_threads, duration);

  let mut report = BatchReport::default();
  for outcome in outcomes {
    match outcome {
      Ok(artifact) => report.artifacts.push(artifact),
      Err(failure) => report.failures.push(failure),
    }
  }
  Ok(report)
}

#[cfg(test)]
mod test_unit {
  use super::*;
  use crate::synth::{F0, SRf};
  use crate::time_forms;
  use crate::types::timbre::{Osc, Oscillator};

  fn request(reference_frequency: f64, ratios: Vec<f64>, osc: Osc) -> SynthesisRequest {
    SynthesisRequest {
      reference_frequency,
      ratios,
      oscillator: osc.oscillator(),
    }
  }

  #[test]
  fn test_major_chord_sine_cycle() {
    let conf = SynthConfig::new(20000.0, F0);
    let buffer = sample_chord(&conf, &request(F0, vec![4.0, 5.0, 6.0], Osc::Sine)).unwrap();
    assert_eq!(76, buffer.len());

    let f0 = 20000.0 / 76.0;
    for (i, &sample) in buffer.iter().enumerate() {
      let t = i as f64 * pi2 / 20000.0;
      let v: f64 = [4.0, 5.0, 6.0].iter().map(|r| (f0 * r * t).sin()).sum::<f64>() / 3.0;
      assert_eq!((32767.0 * v).round() as i16, sample, "sample {}", i);
    }
    assert_eq!(0, buffer[0]);
  }

  #[test]
  fn test_period_matches_rounding() {
    let conf = SynthConfig::default();
    for &f0 in [40.0f64, 65.4, 130.8, 261.6255653005986, 523.25, 1046.5].iter() {
      let buffer = sample_chord(&conf, &request(f0, vec![1.0], Osc::Sine)).unwrap();
      assert_eq!((SRf / f0).round() as usize, buffer.len());
    }
  }

  #[test]
  fn test_cycle_loops_without_seam() {
    let conf = SynthConfig::default();
    for osc in [Osc::Sine, Osc::Sawtooth, Osc::Choir, Osc::Fm1] {
      let req = request(F0 / 10.0, vec![10.0, 12.0, 15.0], osc);
      let buffer = sample_chord(&conf, &req).unwrap();
      let n = buffer.len();
      let fundamental = SRf / n as f64;

      // the sample that would follow the last one is the first sample again
      let t = n as f64 * pi2 / SRf;
      let next: f64 = req
        .ratios
        .iter()
        .map(|r| {
          let f = fundamental * r;
          osc.ugen()(f * t, partials_below_nyquist(SRf, f))
        })
        .sum::<f64>()
        / 3.0;
      let wrapped = quantize(next) as i32;
      assert!((wrapped - buffer[0] as i32).abs() <= 1, "{}: {} vs {}", osc, wrapped, buffer[0]);
    }
  }

  #[test]
  fn test_deterministic_oscillators_are_idempotent() {
    let conf = SynthConfig::default();
    for osc in Osc::ALL.iter().filter(|o| o.deterministic()) {
      let req = request(F0 / 4.0, vec![4.0, 5.0, 6.0, 9.0], *osc);
      let a = sample_chord(&conf, &req).unwrap();
      let b = sample_chord(&conf, &req).unwrap();
      assert_eq!(a, b, "{} rendered twice differently", osc);
    }
  }

  #[test]
  fn test_every_oscillator_renders_a_chord() {
    let conf = SynthConfig::default();
    for osc in Osc::ALL {
      let buffer = sample_chord(&conf, &request(F0 / 12.0, vec![12.0, 16.0, 19.0, 24.0, 29.0, 36.0], osc));
      assert!(buffer.is_ok(), "{}: {:?}", osc, buffer.err());
    }
  }

  #[test]
  fn test_invalid_ratio() {
    let conf = SynthConfig::default();
    for bad in [0.0, -4.0, f64::NAN, f64::INFINITY] {
      match sample_chord(&conf, &request(F0, vec![4.0, bad, 6.0], Osc::Sine)) {
        Err(Error::InvalidRatio { index, .. }) => assert_eq!(1, index),
        other => panic!("expected InvalidRatio, got {:?}", other),
      }
    }
  }

  #[test]
  fn test_empty_chord() {
    let conf = SynthConfig::default();
    assert!(matches!(sample_chord(&conf, &request(F0, vec![], Osc::Sine)), Err(Error::EmptyChord)));
  }

  #[test]
  fn test_degenerate_period() {
    let conf = SynthConfig::new(1000.0, F0);
    match sample_chord(&conf, &request(5000.0, vec![1.0], Osc::Sine)) {
      Err(Error::DegenerateLoopPeriod { sample_rate, frequency }) => {
        assert_eq!(1000.0, sample_rate);
        assert_eq!(5000.0, frequency);
      }
      other => panic!("expected DegenerateLoopPeriod, got {:?}", other),
    }
  }

  #[test]
  fn test_band_limited_oscillator_above_nyquist() {
    let conf = SynthConfig::default();
    // 48 * 263.16 Hz lands above 10 kHz
    let req = request(F0, vec![4.0, 48.0], Osc::Sawtooth);
    assert!(matches!(sample_chord(&conf, &req), Err(Error::AboveNyquist { ratio, .. }) if ratio == 48.0));
    // plain forms do not need partials
    assert!(sample_chord(&conf, &request(F0, vec![4.0, 48.0], Osc::Sine)).is_ok());
  }

  fn too_loud(x: f64, _partials: usize) -> f64 {
    1.5 * x.sin()
  }

  #[test]
  fn test_out_of_range_oscillator_is_rejected() {
    let conf = SynthConfig::default();
    let req = SynthesisRequest {
      reference_frequency: F0,
      ratios: vec![1.0],
      oscillator: Oscillator::custom("too_loud", too_loud, false),
    };
    match sample_chord(&conf, &req) {
      Err(Error::InvalidOscillatorOutput { osc, phase, partials, value }) => {
        assert_eq!("too_loud", osc);
        assert!(value.abs() > 1.0);
        assert_eq!(partials_below_nyquist(SRf, loop_frequency(SRf, 76)), partials);

        // the first sample past the bound is the one reported
        let fundamental = loop_frequency(SRf, 76);
        let first = (0..76)
          .map(|i| fundamental * (i as f64 * pi2 / SRf))
          .find(|x| too_loud(*x, partials).abs() > 1.0)
          .unwrap();
        assert_eq!(first, phase);
        assert_eq!(too_loud(first, partials), value);
        assert!(phase > 0.0 && phase < pi2 / 4.0);
      }
      other => panic!("expected InvalidOscillatorOutput, got {:?}", other),
    }
  }

  #[test]
  fn test_custom_oscillator() {
    let conf = SynthConfig::default();
    let req = SynthesisRequest {
      reference_frequency: F0,
      ratios: vec![1.0],
      oscillator: Oscillator::custom("half_sine", |x, p| time_forms::sine(x, p) / 2.0, false),
    };
    let buffer = sample_chord(&conf, &req).unwrap();
    assert!(buffer.iter().all(|s| s.abs() <= 16384));
  }

  #[test]
  fn test_quantize() {
    assert_eq!(32767, quantize(1.0));
    assert_eq!(-32767, quantize(-1.0));
    assert_eq!(0, quantize(0.0));
    assert_eq!(16384, quantize(0.5));
    assert_eq!(i16::MAX, quantize(2.0));
    assert_eq!(i16::MIN, quantize(-2.0));
  }
}
