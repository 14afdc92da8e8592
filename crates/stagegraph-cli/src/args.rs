//! Command-line argument definitions for the Stagegraph CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the graph, the results directory, the
//! overlays to open, the nodes and plates to click and the output path.

use clap::Parser;

/// Command-line arguments for the Stagegraph dashboard renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a graph configuration file (TOML). The standard pipeline is
    /// used when omitted.
    #[arg(help = "Path to the graph file")]
    pub graph: Option<String>,

    /// Directory holding the metric documents and COLMAP models of a run
    #[arg(short, long, default_value = "results")]
    pub results: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "dashboard.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Overlay to open, e.g. `frontend_summary` or
    /// `point_cloud:adjustment-output`. May be repeated.
    #[arg(long = "show", value_name = "OVERLAY")]
    pub show: Vec<String>,

    /// Node to click, by id. May be repeated.
    #[arg(long = "click", value_name = "NODE")]
    pub click: Vec<String>,

    /// Plate to click, by title. May be repeated.
    #[arg(long = "click-plate", value_name = "TITLE")]
    pub click_plate: Vec<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
