//! TOML graph configuration.
//!
//! ```toml
//! [[nodes]]
//! id = "twoViewEstimator"
//! label = "Two-View Estimator"
//! position = [600.0, 90.0]
//!
//! [[nodes]]
//! id = "frontendSummary"
//! category = "overlay-trigger"
//! overlay = "frontend_summary"
//!
//! [[edges]]
//! source = "twoViewEstimator"
//! target = "frontendSummary"
//!
//! [[plates]]
//! title = "Frontend"
//! overlay = "frontend_summary"
//! members = ["twoViewEstimator", "frontendSummary"]
//! ```
//!
//! Nodes without a `position` are placed by the layout pass. A plate needs
//! either `members` or a `region = [x, y, width, height]`.

use serde::Deserialize;

use stagegraph_core::geometry::{Bounds, Point, Size};

use super::{ConfigError, GraphModel, GraphNode, NodeCategory, Plate};
use crate::overlay::OverlayKind;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphFile {
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
    #[serde(default)]
    plates: Vec<PlateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeEntry {
    id: String,
    label: Option<String>,
    #[serde(default)]
    category: NodeCategory,
    overlay: Option<String>,
    position: Option<[f32; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeEntry {
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlateEntry {
    title: String,
    overlay: Option<String>,
    #[serde(default)]
    members: Vec<String>,
    region: Option<[f32; 4]>,
}

fn parse_overlay(context: impl FnOnce() -> String, kind: &str) -> Result<OverlayKind, ConfigError> {
    kind.parse().map_err(|_| ConfigError::UnknownOverlayKind {
        context: context(),
        kind: kind.to_string(),
    })
}

impl GraphModel {
    /// Parses and validates a TOML graph configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Syntax`] with the offending byte range for
    /// malformed TOML, [`ConfigError::UnknownOverlayKind`] for an
    /// unrecognised overlay name, or any error from
    /// [`super::GraphModelBuilder::build`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: GraphFile = toml::from_str(source).map_err(|err| ConfigError::Syntax {
            message: err.message().to_string(),
            span: err.span(),
        })?;

        let mut builder = GraphModel::builder();

        for entry in file.nodes {
            let overlay = entry
                .overlay
                .as_deref()
                .map(|kind| parse_overlay(|| format!("node `{}`", entry.id), kind))
                .transpose()?;
            let label = entry.label.unwrap_or_else(|| entry.id.clone());
            let mut node = GraphNode::new(&entry.id, label, entry.category, overlay);
            if let Some([x, y]) = entry.position {
                node = node.at(x, y);
            }
            builder = builder.node(node);
        }

        for entry in file.edges {
            builder = builder.edge(&entry.source, &entry.target);
        }

        for entry in file.plates {
            let mut plate = Plate::new(entry.title.as_str())
                .with_members(entry.members.iter().map(String::as_str));
            if let Some(kind) = entry.overlay.as_deref() {
                plate = plate.with_overlay(parse_overlay(
                    || format!("plate `{}`", entry.title),
                    kind,
                )?);
            }
            if let Some([x, y, width, height]) = entry.region {
                plate = plate.with_region(Bounds::new_from_top_left(
                    Point::new(x, y),
                    Size::new(width, height),
                ));
            }
            builder = builder.plate(plate);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Placement;

    #[test]
    fn test_parse_full_file() {
        let source = r#"
            [[nodes]]
            id = "imageInput"
            label = "Image Input"
            position = [100.0, 80.0]

            [[nodes]]
            id = "twoViewEstimator"

            [[nodes]]
            id = "frontendSummary"
            category = "overlay-trigger"
            overlay = "frontend_summary"

            [[edges]]
            source = "imageInput"
            target = "twoViewEstimator"

            [[plates]]
            title = "Frontend"
            overlay = "frontend_summary"
            members = ["twoViewEstimator", "frontendSummary"]

            [[plates]]
            title = "Notes"
            region = [0.0, 0.0, 50.0, 20.0]
        "#;

        let model = GraphModel::from_toml_str(source).unwrap();

        let input = model.find_node("imageInput").unwrap();
        assert_eq!(input.label(), "Image Input");
        assert_eq!(input.placement(), Placement::Explicit(Point::new(100.0, 80.0)));

        let estimator = model.find_node("twoViewEstimator").unwrap();
        assert_eq!(estimator.label(), "twoViewEstimator");
        assert_eq!(estimator.placement(), Placement::Derived);

        let summary = model.find_node("frontendSummary").unwrap();
        assert_eq!(summary.category(), NodeCategory::OverlayTrigger);
        assert_eq!(summary.overlay(), Some(OverlayKind::FrontendSummary));

        assert_eq!(model.edges().len(), 1);
        assert_eq!(model.plates().len(), 2);
        assert_eq!(
            model.plate("Frontend").and_then(Plate::overlay),
            Some(OverlayKind::FrontendSummary)
        );
        assert!(model.plate("Notes").and_then(Plate::region).is_some());
    }

    #[test]
    fn test_syntax_error_carries_span() {
        let source = "[[nodes]]\nid = \n";

        let err = GraphModel::from_toml_str(source).unwrap_err();

        match err {
            ConfigError::Syntax { span, .. } => assert!(span.is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_field_is_syntax_error() {
        let source = "[[nodes]]\nid = \"a\"\ncolour = \"red\"\n";

        let err = GraphModel::from_toml_str(source).unwrap_err();

        assert!(matches!(err, ConfigError::Syntax { .. }));
    }

    #[test]
    fn test_unknown_plate_overlay() {
        let source = r#"
            [[nodes]]
            id = "a"

            [[plates]]
            title = "Frontend"
            overlay = "frontend_sumary"
            members = ["a"]
        "#;

        let err = GraphModel::from_toml_str(source).unwrap_err();

        assert_eq!(
            err,
            ConfigError::UnknownOverlayKind {
                context: "plate `Frontend`".to_string(),
                kind: "frontend_sumary".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let source = "[[nodes]]\nid = \"a\"\ncategory = \"clickable\"\n";

        assert!(GraphModel::from_toml_str(source).is_err());
    }

    #[test]
    fn test_typo_in_edge_fails() {
        let source = r#"
            [[nodes]]
            id = "imageInput"

            [[nodes]]
            id = "twoViewEstimator"

            [[edges]]
            source = "imageInput"
            target = "twoViewEstimatr"
        "#;

        let err = GraphModel::from_toml_str(source).unwrap_err();

        assert!(matches!(err, ConfigError::UnknownEdgeEndpoint { .. }));
    }

    #[test]
    fn test_cycle_fails_at_load() {
        let source = r#"
            [[nodes]]
            id = "a"

            [[nodes]]
            id = "b"

            [[edges]]
            source = "a"
            target = "b"

            [[edges]]
            source = "b"
            target = "a"
        "#;

        let err = GraphModel::from_toml_str(source).unwrap_err();

        assert!(matches!(err, ConfigError::Cycle(_)));
    }
}
