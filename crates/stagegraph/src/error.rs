//! Error types for Stagegraph operations.
//!
//! [`StagegraphError`] is the crate boundary error. Module level errors
//! ([`ConfigError`], [`RenderError`], [`crate::export::Error`]) convert into it.
//! Metric document failures are not part of it: a document that fails to
//! load disables only its own overlay and is recorded in the metrics store.

use std::io;

use thiserror::Error;

pub use crate::graph::ConfigError;
pub use crate::render::RenderError;

/// The main error type for Stagegraph operations.
#[derive(Debug, Error)]
pub enum StagegraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for StagegraphError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
