//! Error adapter for converting StagegraphError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Syntax errors in
//! a graph file are labeled in the file's source when it is attached with
//! [`ErrorAdapter::with_source`].

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, NamedSource, SourceSpan};

use stagegraph::{StagegraphError, graph::ConfigError};

/// Adapter rendering a [`StagegraphError`] as a miette diagnostic.
pub struct ErrorAdapter<'a> {
    err: &'a StagegraphError,
    src: Option<NamedSource<String>>,
}

impl<'a> ErrorAdapter<'a> {
    pub fn new(err: &'a StagegraphError) -> Self {
        Self { err, src: None }
    }

    /// Attaches the graph file the error was raised for.
    pub fn with_source(mut self, name: &str, src: String) -> Self {
        self.src = Some(NamedSource::new(name, src));
        self
    }

    fn config_error(&self) -> Option<&ConfigError> {
        match self.err {
            StagegraphError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.err, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.err, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.err.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err {
            StagegraphError::Io(_) => "stagegraph::io",
            StagegraphError::Config(_) => "stagegraph::config",
            StagegraphError::Layout(_) => "stagegraph::layout",
            StagegraphError::Render(_) => "stagegraph::render",
            StagegraphError::Export(_) => "stagegraph::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.config_error()? {
            ConfigError::UnknownEdgeEndpoint { .. } | ConfigError::UnknownPlateMember { .. } => {
                "every edge endpoint and plate member must be the id of a declared node"
            }
            ConfigError::UnknownOverlayKind { .. } => {
                "expected one of frontend_summary, averaging_metrics, \
                 point_cloud:association-output, point_cloud:adjustment-output"
            }
            ConfigError::MissingTriggerBinding(_) => {
                "add `overlay = \"...\"` to the node, or drop `category = \"overlay-trigger\"`"
            }
            ConfigError::PlateWithoutRegion(_) => {
                "list the plate's `members`, or give it a `region = [x, y, width, height]`"
            }
            ConfigError::Cycle(_) => {
                "remove an edge of the cycle, or pin one of its nodes with `position = [x, y]`"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.src.as_ref()?;
        let ConfigError::Syntax {
            message,
            span: Some(span),
        } = self.config_error()?
        else {
            return None;
        };

        let label = LabeledSpan::new_primary_with_span(
            Some(message.clone()),
            SourceSpan::from(span.clone()),
        );
        Some(Box::new(std::iter::once(label)))
    }
}
