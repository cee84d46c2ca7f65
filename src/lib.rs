#![allow(non_upper_case_globals)]
pub mod arg_parse;
pub mod error;
pub mod files;
pub mod noise;
pub mod plan;
pub mod render;
pub mod synth;
pub mod synth_config;
pub mod time;
pub mod time_forms;
pub mod types;
pub mod voicing;

pub use error::{Error, Result};
pub use render::{BatchReport, render_plan, sample_chord};

/// Plans and renders a whole playbook into `out_dir`.
pub fn render_playbook(playbook: &synth_config::Playbook, out_dir: &std::path::Path) -> Result<BatchReport> {
  playbook.validate()?;
  let tasks = plan::plan(playbook, out_dir);
  render_plan(&playbook.synth, &tasks)
}
