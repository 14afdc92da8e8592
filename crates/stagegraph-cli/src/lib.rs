//! Stagegraph CLI library
//!
//! This module contains the core CLI logic: it opens a dashboard session
//! over a results directory, replays the requested clicks and writes the
//! resulting dashboard as SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use error_adapter::ErrorAdapter;

use std::fs;

use log::{info, warn};

use stagegraph::{
    StagegraphError,
    dashboard::Dashboard,
    graph::{ConfigError, GraphModel},
    overlay::{OverlayKind, Transition},
};

/// Run the Stagegraph CLI application
///
/// # Errors
///
/// Returns `StagegraphError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Graph file errors, including unknown `--show` overlays
/// - Layout, rendering or export errors
pub fn run(args: &Args) -> Result<(), StagegraphError> {
    info!(
        graph_path:? = args.graph,
        results_dir = args.results,
        output_path = args.output;
        "Rendering dashboard"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let model = match &args.graph {
        Some(path) => GraphModel::from_toml_str(&fs::read_to_string(path)?)?,
        None => GraphModel::default_pipeline(),
    };

    let requests = args
        .show
        .iter()
        .map(|name| {
            name.parse::<OverlayKind>()
                .map_err(|_| ConfigError::UnknownOverlayKind {
                    context: "--show".to_string(),
                    kind: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut dashboard = Dashboard::open(model, &app_config, &args.results)?;
    dashboard.wait_for_loads();

    for kind in requests {
        report(&kind.to_string(), Some(dashboard.request(kind)));
    }
    for node in &args.click {
        report(node, dashboard.click_node(node));
    }
    for title in &args.click_plate {
        report(title, dashboard.click_plate(title));
    }

    let mut exporter = dashboard.svg_exporter(&args.output)?;
    dashboard.export(&mut exporter)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}

fn report(request: &str, transition: Option<Transition>) {
    match transition {
        Some(Transition::Suppressed(availability)) => {
            warn!(request = request, availability = availability.name(); "Overlay not shown");
        }
        Some(transition) => info!(request = request, transition:? = transition; "Overlay request"),
        None => warn!(request = request; "Click target has no overlay binding"),
    }
}
