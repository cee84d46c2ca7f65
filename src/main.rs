use std::env;
use std::path::Path;
use std::process;

use jicycle::arg_parse;
use jicycle::render_playbook;
use log::{error, info};

fn main() {
  dotenv::dotenv().ok();
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    .format_timestamp_millis()
    .init();

  let args: Vec<String> = env::args().collect();

  if args.len() < 3 {
    eprintln!(r#"Usage: jicycle "/abs/to/playbook.json" "/abs/to/out_dir""#);
    process::exit(1);
  }

  let playbook_path = &args[1];
  let out_dir = Path::new(&args[2]);

  let playbook = match arg_parse::load_playbook_from_file(playbook_path) {
    Ok(playbook) => playbook,
    Err(e) => {
      error!("Failed to open playbook {}: {}", playbook_path, e);
      process::exit(1);
    }
  };

  match render_playbook(&playbook, out_dir) {
    Ok(report) => {
      report.log_summary();
      if !report.is_ok() {
        process::exit(1);
      }
      info!("{}", out_dir.display());
    }
    Err(e) => {
      error!("Problem while rendering into {}: {}", out_dir.display(), e);
      process::exit(1);
    }
  }
}
