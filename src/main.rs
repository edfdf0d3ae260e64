mod args;
mod conrank;

use clap::Parser;
use log::{info, warn, LevelFilter};
use snafu::ErrorCompat;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    let res = conrank::run_consensus_file(
        args.config.clone(),
        args.reference.clone(),
        &conrank::Overrides {
            out: args.out.clone(),
            limit: args.limit,
            weights: args.weight.clone().unwrap_or_default(),
            matrices: args.matrices.clone(),
        },
    );

    if let Err(e) = res {
        warn!("Error occurred {:?}", e);
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
