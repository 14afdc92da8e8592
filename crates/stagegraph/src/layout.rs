//! Node placement.
//!
//! Nodes with an explicit center keep it. The remaining nodes are placed by
//! a layered layout:
//!
//! 1. Build a directed graph over the derived nodes.
//! 2. Assign each node to the layer of its longest incoming path.
//! 3. Size every layer by its widest node.
//! 4. Compute the x position of each layer.
//! 5. Stack the nodes of a layer top to bottom in declaration order.
//!
//! When a model mixes both kinds, the derived block starts below the lowest
//! explicit node.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{
    Direction,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
};

use stagegraph_core::{
    geometry::{Point, Size},
    identifier::Id,
};

use crate::{
    config::LayoutConfig,
    error::StagegraphError,
    graph::{GraphModel, Placement},
};

/// Layered layout engine for derived node placements.
#[derive(Debug, Clone)]
pub struct Engine {
    column_spacing: f32,
    row_spacing: f32,
}

impl Engine {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            column_spacing: config.column_spacing(),
            row_spacing: config.row_spacing(),
        }
    }

    /// Resolves the center of every node in `model`.
    ///
    /// `sizes` must hold the measured size of every node.
    ///
    /// # Errors
    ///
    /// Returns [`StagegraphError::Layout`] if the derived nodes form a cycle
    /// or a node has no measured size. Models from
    /// [`crate::graph::GraphModelBuilder::build`] are never cyclic.
    pub fn positions(
        &self,
        model: &GraphModel,
        sizes: &IndexMap<Id, Size>,
    ) -> Result<IndexMap<Id, Point>, StagegraphError> {
        let size_of = |id: Id| {
            sizes
                .get(&id)
                .copied()
                .ok_or_else(|| StagegraphError::Layout(format!("node `{id}` was not measured")))
        };

        let mut positions = IndexMap::with_capacity(model.node_count());
        let mut explicit_bottom: Option<f32> = None;
        for node in model.nodes() {
            if let Placement::Explicit(center) = node.placement() {
                let bottom = center.y() + size_of(node.id())?.height() / 2.0;
                explicit_bottom = Some(explicit_bottom.map_or(bottom, |b: f32| b.max(bottom)));
                positions.insert(node.id(), center);
            }
        }

        if model.needs_layout() {
            let origin_y = explicit_bottom.map_or(0.0, |bottom| bottom + self.row_spacing);
            let derived = self.derived_positions(model, &size_of, origin_y)?;
            debug!(nodes = derived.len(); "Derived node positions");
            positions.extend(derived);
        }

        // Keep model order.
        let ordered = model
            .nodes()
            .filter_map(|node| positions.get(&node.id()).map(|p| (node.id(), *p)))
            .collect();
        Ok(ordered)
    }

    fn derived_positions(
        &self,
        model: &GraphModel,
        size_of: &impl Fn(Id) -> Result<Size, StagegraphError>,
        origin_y: f32,
    ) -> Result<Vec<(Id, Point)>, StagegraphError> {
        // Step 1: graph over derived nodes
        let mut graph: DiGraph<Id, ()> = DiGraph::new();
        let mut indices: HashMap<Id, NodeIndex> = HashMap::new();
        for node in model.nodes() {
            if node.placement() == Placement::Derived {
                indices.insert(node.id(), graph.add_node(node.id()));
            }
        }
        for edge in model.edges() {
            if let (Some(&source), Some(&target)) =
                (indices.get(&edge.source), indices.get(&edge.target))
            {
                graph.add_edge(source, target, ());
            }
        }

        // Step 2: longest-path layers
        let layers = Self::assign_layers(&graph)?;

        // Step 3: layer widths
        let mut layer_widths = Vec::with_capacity(layers.len());
        for layer in &layers {
            let mut width = 0.0f32;
            for index in layer {
                width = width.max(size_of(graph[*index])?.width());
            }
            layer_widths.push(width);
        }

        // Step 4: layer x positions
        let mut layer_x = Vec::with_capacity(layer_widths.len());
        let mut x = 0.0;
        for width in &layer_widths {
            layer_x.push(x + width / 2.0);
            x += width + self.column_spacing;
        }

        // Step 5: stack nodes in each layer
        let mut positions = Vec::with_capacity(graph.node_count());
        for (layer, nodes) in layers.iter().enumerate() {
            let mut y = origin_y;
            for (row, index) in nodes.iter().enumerate() {
                let id = graph[*index];
                let height = size_of(id)?.height();
                if row > 0 {
                    y += self.row_spacing;
                }
                let center = Point::new(layer_x[layer], y + height / 2.0);
                trace!(node = id.to_string(), layer = layer, center:? = center; "Placed node");
                positions.push((id, center));
                y += height;
            }
        }

        Ok(positions)
    }

    /// Groups nodes by the length of their longest incoming path.
    ///
    /// Nodes in a layer keep their insertion order.
    fn assign_layers(graph: &DiGraph<Id, ()>) -> Result<Vec<Vec<NodeIndex>>, StagegraphError> {
        let order = toposort(graph, None).map_err(|cycle| {
            StagegraphError::Layout(format!(
                "cycle through node `{}` prevents a layered layout",
                graph[cycle.node_id()]
            ))
        })?;

        let mut rank: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
        for index in &order {
            let layer = graph
                .neighbors_directed(*index, Direction::Incoming)
                .filter_map(|parent| rank.get(&parent))
                .map(|parent_layer| parent_layer + 1)
                .max()
                .unwrap_or(0);
            rank.insert(*index, layer);
        }

        let depth = rank.values().copied().max().map_or(0, |max| max + 1);
        let mut layers = vec![Vec::new(); depth];
        for index in graph.node_indices() {
            if let Some(layer) = rank.get(&index) {
                layers[*layer].push(index);
            }
        }
        Ok(layers)
    }
}
