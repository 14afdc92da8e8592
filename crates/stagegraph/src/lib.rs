//! Stagegraph - a static computation-graph dashboard for structure-from-motion
//! pipeline results.
//!
//! The dashboard draws the pipeline as a graph of stages grouped into
//! plates. Result nodes and plates open overlays over precomputed outputs:
//! metric tables read from JSON documents and point clouds read from COLMAP
//! text models. An overlay opens only once its data is available.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stagegraph::{config::AppConfig, dashboard::Dashboard, graph::GraphModel};
//!
//! let model = GraphModel::from_toml_str(&std::fs::read_to_string("pipeline.toml")?)?;
//! let mut dashboard = Dashboard::open(model, &AppConfig::default(), "results")?;
//!
//! // Metric documents load in the background.
//! dashboard.wait_for_loads();
//! dashboard.click_node("frontendSummary");
//!
//! let svg = dashboard.render_svg()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod dashboard;
pub mod export;
pub mod graph;
pub mod metrics;
pub mod overlay;
pub mod point_cloud;
pub mod registry;
pub mod render;

mod error;
mod layout;

pub use stagegraph_core::{color, draw, geometry, identifier};

pub use error::StagegraphError;
