use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod dashboard;

use crate::args::Args;
use crate::dashboard::{run_update, DashboardError, DashboardResult};

fn run(args: Args) -> DashboardResult<()> {
    let config_path = match args.config {
        Some(p) => p,
        None => return Err(DashboardError::MissingConfig {}),
    };
    run_update(
        config_path,
        args.out,
        args.input.unwrap_or_default(),
        args.reference,
    )
}

fn main() {
    let args = Args::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
    debug!("args: {:?}", args);

    if let Err(e) = run(args) {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("{}", bt);
        }
        std::process::exit(1);
    }
}
