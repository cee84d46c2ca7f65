use rand::Rng;

/// Uniform white noise. Ignores phase, so a cycle of it never repeats between renders.
pub fn white(_x: f64, _partials: usize) -> f64 {
  let mut rng = rand::thread_rng();
  rng.gen_range(-1.0..1.0)
}
