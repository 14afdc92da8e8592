use std::{fs, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use stagegraph_cli::{Args, ErrorAdapter};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Stagegraph");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = stagegraph_cli::run(&args) {
        let mut adapted_error = ErrorAdapter::new(&err);
        if let Some(path) = &args.graph {
            if let Ok(src) = fs::read_to_string(path) {
                adapted_error = adapted_error.with_source(path, src);
            }
        }

        let reporter = miette::GraphicalReportHandler::new();
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &adapted_error)
            .expect("Writing to String buffer is infallible");

        error!("Failed\n{writer}");
        process::exit(1);
    }

    info!("Completed successfully");
}
