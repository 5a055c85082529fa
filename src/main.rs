use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use status_time_report::cli::{Cli, normalize};
use status_time_report::{processor, util};

/// Logs go to stderr; stdout carries only report JSON.
fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing(cli.verbose);

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: validate, compute, save
  processor::process(&cfg)
}
