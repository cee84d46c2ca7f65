pub mod synthesis {
  use super::timbre::Oscillator;
  use crate::error::{Error, Result};
  use serde::{Deserialize, Serialize};
  use std::collections::BTreeSet;
  use std::fmt;

  /// Frequency of a partial as a multiple of the chord's reference unit.
  /// Usually a small integer.
  pub type Ratio = f64;

  /// Signed 16 bit PCM, exactly one period.
  pub type SampleBuffer = Vec<i16>;

  /// A named chord as read from a playbook.
  ///
  /// `inversions` lists the inversion indices to render when the playbook
  /// selects inversions per chord.
  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  pub struct ChordDef {
    pub name: String,
    pub ratios: Vec<Ratio>,
    #[serde(default)]
    pub inversions: BTreeSet<usize>,
  }

  impl ChordDef {
    pub fn new(name: &str, ratios: Vec<Ratio>, inversions: &[usize]) -> Self {
      ChordDef {
        name: name.to_string(),
        ratios,
        inversions: inversions.iter().copied().collect(),
      }
    }

    /// The name becomes part of a file name, so it must be a single path component.
    pub fn validate_name(&self) -> Result<()> {
      let bad_char = |c: char| std::path::is_separator(c) || c == '/' || c == '\\' || c == '\0';
      if self.name.trim().is_empty() || self.name.chars().any(bad_char) {
        return Err(Error::InvalidChordName(self.name.clone()));
      }
      Ok(())
    }
  }

  /// Which voicing of a chord an artifact holds.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
  pub enum Variant {
    Root,
    Inversion(usize),
    OctaveUp,
    /// Ratio 1 at the reference pitch, rendered once per oscillator.
    Unison,
  }

  impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
        Variant::Root => write!(f, "root"),
        Variant::Inversion(k) => write!(f, "inversion {}", k),
        Variant::OctaveUp => write!(f, "octave up"),
        Variant::Unison => write!(f, "unison"),
      }
    }
  }

  /// How far the lowest partials move when a chord is inverted.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
  #[serde(rename_all = "snake_case")]
  pub enum InversionFactor {
    /// One octave
    #[default]
    Fixed,
    /// Smallest power of two that lifts the lowest partial above the highest one
    Smart,
  }

  /// Which inversion indices of a chord get rendered.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
  #[serde(rename_all = "snake_case")]
  pub enum InversionSelection {
    /// The chord's own `inversions` set
    #[default]
    Custom,
    All,
    Even,
    UpTo(usize),
    Only(usize),
  }

  /// Everything needed to render one single cycle.
  #[derive(Debug, Clone)]
  pub struct SynthesisRequest {
    pub reference_frequency: f64,
    pub ratios: Vec<Ratio>,
    pub oscillator: Oscillator,
  }
}

pub mod timbre {
  use crate::error::{Error, Result};
  use crate::noise;
  use crate::time_forms::{self, Ugen};
  use once_cell::sync::Lazy;
  use serde::{Deserialize, Serialize};
  use std::collections::HashMap;
  use std::fmt;
  use std::str::FromStr;

  /// A waveform the synthesizer can drive.
  ///
  /// `band_limited` oscillators divide by their partial count and
  /// need at least one harmonic under Nyquist.
  #[derive(Debug, Clone, Copy)]
  pub struct Oscillator {
    pub name: &'static str,
    pub ugen: Ugen,
    pub band_limited: bool,
  }

  impl Oscillator {
    pub fn custom(name: &'static str, ugen: Ugen, band_limited: bool) -> Self {
      Oscillator { name, ugen, band_limited }
    }
  }

  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
  pub enum Osc {
    #[serde(rename = "sine")]
    Sine,
    #[serde(rename = "tri")]
    Triangle,
    #[serde(rename = "saw")]
    Sawtooth,
    #[serde(rename = "saw1")]
    NarrowSawtooth,
    #[serde(rename = "saw2")]
    UpperSawtooth,
    #[serde(rename = "sqr")]
    Square,
    #[serde(rename = "sqr2")]
    FourierSquare,
    #[serde(rename = "fm1")]
    Fm1,
    #[serde(rename = "fm2")]
    Fm2,
    #[serde(rename = "choir")]
    Choir,
    #[serde(rename = "voice")]
    Voice,
    #[serde(rename = "flute")]
    Flute,
    #[serde(rename = "whistle")]
    Whistle,
    #[serde(rename = "tsp")]
    TriangleSinePulse,
    #[serde(rename = "tuba")]
    Tuba,
    #[serde(rename = "trumpet")]
    Trumpet,
    #[serde(rename = "soft")]
    Soft,
    #[serde(rename = "pad")]
    Pad,
    #[serde(rename = "harmsin")]
    HarmonicSine,
    #[serde(rename = "harmsin2")]
    HarmonicSine2,
    #[serde(rename = "buzzy")]
    Buzzy,
    #[serde(rename = "buzzy2")]
    Buzzy2,
    #[serde(rename = "distort")]
    Distort,
    #[serde(rename = "clip")]
    Clip,
    #[serde(rename = "noise")]
    Noise,
  }

  static BANK: Lazy<HashMap<&'static str, Osc>> = Lazy::new(|| Osc::ALL.iter().map(|osc| (osc.name(), *osc)).collect());

  impl Osc {
    pub const ALL: [Osc; 25] = [
      Osc::Sine,
      Osc::Triangle,
      Osc::Sawtooth,
      Osc::NarrowSawtooth,
      Osc::UpperSawtooth,
      Osc::Square,
      Osc::FourierSquare,
      Osc::Fm1,
      Osc::Fm2,
      Osc::Choir,
      Osc::Voice,
      Osc::Flute,
      Osc::Whistle,
      Osc::TriangleSinePulse,
      Osc::Tuba,
      Osc::Trumpet,
      Osc::Soft,
      Osc::Pad,
      Osc::HarmonicSine,
      Osc::HarmonicSine2,
      Osc::Buzzy,
      Osc::Buzzy2,
      Osc::Distort,
      Osc::Clip,
      Osc::Noise,
    ];

    pub fn name(&self) -> &'static str {
      match self {
        Osc::Sine => "sine",
        Osc::Triangle => "tri",
        Osc::Sawtooth => "saw",
        Osc::NarrowSawtooth => "saw1",
        Osc::UpperSawtooth => "saw2",
        Osc::Square => "sqr",
        Osc::FourierSquare => "sqr2",
        Osc::Fm1 => "fm1",
        Osc::Fm2 => "fm2",
        Osc::Choir => "choir",
        Osc::Voice => "voice",
        Osc::Flute => "flute",
        Osc::Whistle => "whistle",
        Osc::TriangleSinePulse => "tsp",
        Osc::Tuba => "tuba",
        Osc::Trumpet => "trumpet",
        Osc::Soft => "soft",
        Osc::Pad => "pad",
        Osc::HarmonicSine => "harmsin",
        Osc::HarmonicSine2 => "harmsin2",
        Osc::Buzzy => "buzzy",
        Osc::Buzzy2 => "buzzy2",
        Osc::Distort => "distort",
        Osc::Clip => "clip",
        Osc::Noise => "noise",
      }
    }

    pub fn ugen(&self) -> Ugen {
      use time_forms::*;
      match self {
        Osc::Sine => sine,
        Osc::Triangle => triangle,
        Osc::Sawtooth => sawtooth,
        Osc::NarrowSawtooth => sawtooth_narrow,
        Osc::UpperSawtooth => sawtooth_upper,
        Osc::Square => square,
        Osc::FourierSquare => square_fourier,
        Osc::Fm1 => fm1,
        Osc::Fm2 => fm2,
        Osc::Choir => choir,
        Osc::Voice => voice,
        Osc::Flute => flute,
        Osc::Whistle => whistle,
        Osc::TriangleSinePulse => triangle_sine_pulse,
        Osc::Tuba => tuba,
        Osc::Trumpet => trumpet,
        Osc::Soft => soft,
        Osc::Pad => pad,
        Osc::HarmonicSine => harmonic_sine,
        Osc::HarmonicSine2 => harmonic_sine2,
        Osc::Buzzy => buzzy,
        Osc::Buzzy2 => buzzy2,
        Osc::Distort => distort,
        Osc::Clip => clip,
        Osc::Noise => noise::white,
      }
    }

    /// True for the forms built from a windowed partial sum.
    pub fn band_limited(&self) -> bool {
      matches!(
        self,
        Osc::Sawtooth
          | Osc::NarrowSawtooth
          | Osc::UpperSawtooth
          | Osc::Square
          | Osc::Choir | Osc::Voice | Osc::Flute | Osc::Whistle
      )
    }

    /// Same inputs always render the same cycle.
    pub fn deterministic(&self) -> bool {
      !matches!(self, Osc::Noise)
    }

    pub fn oscillator(&self) -> Oscillator {
      Oscillator {
        name: self.name(),
        ugen: self.ugen(),
        band_limited: self.band_limited(),
      }
    }

    pub fn lookup(name: &str) -> Result<Osc> {
      BANK.get(name).copied().ok_or_else(|| Error::UnknownOscillator(name.to_string()))
    }
  }

  impl FromStr for Osc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
      Osc::lookup(s)
    }
  }

  impl fmt::Display for Osc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.name())
    }
  }

}
