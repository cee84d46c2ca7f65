use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("ratio {ratio} at position {index} must be a positive finite number")]
  InvalidRatio { index: usize, ratio: f64 },

  #[error("oscillator `{osc}` produced {value} at phase {phase} with {partials} partials; output must stay in [-1, 1]")]
  InvalidOscillatorOutput {
    osc: String,
    phase: f64,
    partials: usize,
    value: f64,
  },

  #[error("reference frequency {frequency} Hz has no loopable period at {sample_rate} Hz")]
  DegenerateLoopPeriod { sample_rate: f64, frequency: f64 },

  #[error("reference frequency {frequency} Hz needs a cycle longer than {max_period} samples at {sample_rate} Hz")]
  LoopPeriodTooLong {
    sample_rate: f64,
    frequency: f64,
    max_period: usize,
  },

  #[error("inversion {index} is out of range for a chord of {n_ratios} ratios")]
  InvalidInversionIndex { index: usize, n_ratios: usize },

  #[error("ratio {ratio} puts a partial at {frequency} Hz, above the Nyquist frequency {nyquist} Hz; oscillator `{osc}` needs at least one partial")]
  AboveNyquist {
    osc: String,
    ratio: f64,
    frequency: f64,
    nyquist: f64,
  },

  #[error("chord has no ratios")]
  EmptyChord,

  #[error("sample rate {0} must be a positive finite number")]
  InvalidSampleRate(f64),

  #[error("chord name `{0}` must be non-empty and free of path separators")]
  InvalidChordName(String),

  #[error("compression setting `{setting}` = {value} is out of range")]
  InvalidCompression { setting: &'static str, value: f64 },

  #[error("filter error: {0}")]
  Filter(String),

  #[error("no oscillator named `{0}`")]
  UnknownOscillator(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("WAV error: {0}")]
  Wav(#[from] hound::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
