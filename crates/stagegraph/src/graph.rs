//! The static computation graph shown by the dashboard.
//!
//! A [`GraphModel`] holds the pipeline's nodes, the directed edges between
//! them, and the titled plates that group stages. It is immutable once built
//! and is validated at construction, so every edge endpoint and plate member
//! is guaranteed to name an existing node.
//!
//! Models come from three places:
//! - [`GraphModel::default_pipeline`] for the standard pipeline,
//! - [`GraphModel::from_toml_str`] for a graph configuration file,
//! - [`crate::registry::ProcessRegistry::to_graph_model`] for registered
//!   processes.

mod config_file;
mod pipeline;

use std::{collections::HashMap, ops::Range};

use indexmap::IndexMap;
use log::debug;
use petgraph::{algo::toposort, graph::DiGraph};
use serde::Deserialize;
use thiserror::Error;

use stagegraph_core::{
    geometry::{Bounds, Point},
    identifier::Id,
};

use crate::overlay::OverlayKind;

/// Errors that make a graph configuration unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{message}")]
    Syntax {
        message: String,
        span: Option<Range<usize>>,
    },

    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),

    #[error("edge `{from}` -> `{to}` references unknown node `{missing}`")]
    UnknownEdgeEndpoint {
        from: String,
        to: String,
        missing: String,
    },

    #[error("{context} names unknown overlay kind `{kind}`")]
    UnknownOverlayKind { context: String, kind: String },

    #[error("plate `{plate}` lists unknown member `{member}`")]
    UnknownPlateMember { plate: String, member: String },

    #[error("overlay-trigger node `{0}` has no overlay binding")]
    MissingTriggerBinding(String),

    #[error("descriptive node `{0}` cannot bind an overlay")]
    UnexpectedBinding(String),

    #[error("duplicate plate title `{0}`")]
    DuplicatePlate(String),

    #[error("binding names unknown plate `{0}`")]
    UnknownPlate(String),

    #[error("plate `{0}` has neither members nor a region")]
    PlateWithoutRegion(String),

    #[error("process `{0}` is registered twice")]
    DuplicateProcess(String),

    #[error("cycle through node `{0}` prevents a layered layout")]
    Cycle(String),
}

/// Fails if the edges among layout-placed nodes form a cycle.
///
/// Pinned nodes take no part in layering, so edges touching them are ignored.
fn check_layerable(
    nodes: &IndexMap<Id, GraphNode>,
    edges: &[GraphEdge],
) -> Result<(), ConfigError> {
    let mut graph: DiGraph<Id, ()> = DiGraph::new();
    let mut indices = HashMap::new();
    for node in nodes.values() {
        if node.placement == Placement::Derived {
            indices.insert(node.id, graph.add_node(node.id));
        }
    }
    for edge in edges {
        if let (Some(&source), Some(&target)) =
            (indices.get(&edge.source), indices.get(&edge.target))
        {
            graph.add_edge(source, target, ());
        }
    }

    toposort(&graph, None)
        .map(|_| ())
        .map_err(|cycle| ConfigError::Cycle(graph[cycle.node_id()].to_string()))
}

// =============================================================================
// Nodes, edges and plates
// =============================================================================

/// Role of a node in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCategory {
    /// A pipeline stage or data product; not interactive.
    #[default]
    Descriptive,
    /// A node whose click requests its bound overlay.
    OverlayTrigger,
}

/// Where a node is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Placement {
    /// Center given by the configuration.
    Explicit(Point),
    /// Center computed by the layout pass.
    #[default]
    Derived,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    id: Id,
    label: String,
    category: NodeCategory,
    placement: Placement,
    overlay: Option<OverlayKind>,
}

impl GraphNode {
    /// Creates a node. Category and binding are checked by
    /// [`GraphModelBuilder::build`].
    pub fn new(
        id: &str,
        label: impl Into<String>,
        category: NodeCategory,
        overlay: Option<OverlayKind>,
    ) -> Self {
        Self {
            id: Id::new(id),
            label: label.into(),
            category,
            placement: Placement::Derived,
            overlay,
        }
    }

    pub fn descriptive(id: &str, label: impl Into<String>) -> Self {
        Self::new(id, label, NodeCategory::Descriptive, None)
    }

    pub fn trigger(id: &str, label: impl Into<String>, overlay: OverlayKind) -> Self {
        Self::new(id, label, NodeCategory::OverlayTrigger, Some(overlay))
    }

    /// Pins the node's center.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.placement = Placement::Explicit(Point::new(x, y));
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn category(&self) -> NodeCategory {
        self.category
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// The overlay requested by clicking this node.
    pub fn overlay(&self) -> Option<OverlayKind> {
        self.overlay
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub source: Id,
    pub target: Id,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: Id::new(source),
            target: Id::new(target),
        }
    }
}

/// A titled region grouping pipeline stages.
///
/// Plates do not take part in the graph. Their region is the padded union of
/// their members, or the explicit rectangle when they have none.
#[derive(Debug, Clone, PartialEq)]
pub struct Plate {
    title: String,
    overlay: Option<OverlayKind>,
    members: Vec<Id>,
    region: Option<Bounds>,
}

impl Plate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            overlay: None,
            members: Vec::new(),
            region: None,
        }
    }

    pub fn with_overlay(mut self, overlay: OverlayKind) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_members<'a>(mut self, members: impl IntoIterator<Item = &'a str>) -> Self {
        self.members.extend(members.into_iter().map(Id::new));
        self
    }

    pub fn with_region(mut self, region: Bounds) -> Self {
        self.region = Some(region);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn overlay(&self) -> Option<OverlayKind> {
        self.overlay
    }

    pub fn members(&self) -> &[Id] {
        &self.members
    }

    pub fn region(&self) -> Option<Bounds> {
        self.region
    }
}

// =============================================================================
// Model
// =============================================================================

/// A validated, immutable computation graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphModel {
    nodes: IndexMap<Id, GraphNode>,
    edges: Vec<GraphEdge>,
    plates: Vec<Plate>,
}

impl GraphModel {
    pub fn builder() -> GraphModelBuilder {
        GraphModelBuilder::default()
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn node(&self, id: Id) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Looks a node up by its textual id without interning `name`.
    pub fn find_node(&self, name: &str) -> Option<&GraphNode> {
        Id::existing(name).and_then(|id| self.node(id))
    }

    pub fn contains(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edges in declaration order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    pub fn plate(&self, title: &str) -> Option<&Plate> {
        self.plates.iter().find(|plate| plate.title == title)
    }

    /// Returns `true` if any node relies on the layout pass for its center.
    pub fn needs_layout(&self) -> bool {
        self.nodes()
            .any(|node| node.placement == Placement::Derived)
    }
}

/// Collects nodes, edges and plates and validates them into a [`GraphModel`].
#[derive(Debug, Default)]
pub struct GraphModelBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    plates: Vec<Plate>,
}

impl GraphModelBuilder {
    pub fn node(mut self, node: GraphNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn edge(mut self, source: &str, target: &str) -> Self {
        self.edges.push(GraphEdge::new(source, target));
        self
    }

    pub fn plate(mut self, plate: Plate) -> Self {
        self.plates.push(plate);
        self
    }

    /// Validates the collected parts.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for duplicate node ids or plate titles, a
    /// trigger without a binding, a descriptive node with one, an edge
    /// endpoint or plate member that is not a node, or a plate with neither
    /// members nor a region.
    pub fn build(self) -> Result<GraphModel, ConfigError> {
        let mut nodes = IndexMap::with_capacity(self.nodes.len());
        for node in self.nodes {
            match (node.category, node.overlay) {
                (NodeCategory::OverlayTrigger, None) => {
                    return Err(ConfigError::MissingTriggerBinding(node.id.to_string()));
                }
                (NodeCategory::Descriptive, Some(_)) => {
                    return Err(ConfigError::UnexpectedBinding(node.id.to_string()));
                }
                _ => {}
            }
            let id = node.id;
            if nodes.insert(id, node).is_some() {
                return Err(ConfigError::DuplicateNode(id.to_string()));
            }
        }

        for edge in &self.edges {
            let missing = [edge.source, edge.target]
                .into_iter()
                .find(|id| !nodes.contains_key(id));
            if let Some(missing) = missing {
                return Err(ConfigError::UnknownEdgeEndpoint {
                    from: edge.source.to_string(),
                    to: edge.target.to_string(),
                    missing: missing.to_string(),
                });
            }
        }

        check_layerable(&nodes, &self.edges)?;

        for (index, plate) in self.plates.iter().enumerate() {
            if self.plates[..index].iter().any(|p| p.title == plate.title) {
                return Err(ConfigError::DuplicatePlate(plate.title.clone()));
            }
            if plate.members.is_empty() && plate.region.is_none() {
                return Err(ConfigError::PlateWithoutRegion(plate.title.clone()));
            }
            if let Some(member) = plate.members.iter().find(|id| !nodes.contains_key(*id)) {
                return Err(ConfigError::UnknownPlateMember {
                    plate: plate.title.clone(),
                    member: member.to_string(),
                });
            }
        }

        debug!(
            nodes = nodes.len(),
            edges = self.edges.len(),
            plates = self.plates.len();
            "Graph model built"
        );

        Ok(GraphModel {
            nodes,
            edges: self.edges,
            plates: self.plates,
        })
    }
}
