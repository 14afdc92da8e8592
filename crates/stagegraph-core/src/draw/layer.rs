//! Layer-based rendering for SVG output.
//!
//! # Example
//!
//! ```
//! # use stagegraph_core::draw::{RenderLayer, LayeredOutput};
//! # use svg::node::element::Rectangle;
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Node, Box::new(Rectangle::new()));
//! output.add_to_layer(RenderLayer::Plate, Box::new(Rectangle::new()));
//!
//! // Plate group is emitted before the node group.
//! let groups = output.render();
//! assert_eq!(groups.len(), 2);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Z-order of dashboard elements, bottom first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Full-canvas background
    Background,
    /// Plate regions grouping pipeline stages
    Plate,
    /// Directed connectors between nodes
    Edge,
    /// Node boxes with their labels
    Node,
    /// Free-standing text such as plate titles
    Text,
    /// Overlay panels, always above the graph
    Overlay,
}

impl RenderLayer {
    /// Returns the name written to the `data-layer` attribute.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Plate => "plate",
            Self::Edge => "edge",
            Self::Node => "node",
            Self::Text => "text",
            Self::Overlay => "overlay",
        }
    }
}

/// SVG nodes tagged with the layer they belong to.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    /// Creates a new empty `LayeredOutput`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node to `layer`, after any node already in it.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Appends every node of `other`, keeping their layers.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    /// Returns `true` if no node has been added.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of nodes across all layers.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Consumes the output and returns one `<g data-layer=...>` per non-empty
    /// layer, bottom layer first.
    ///
    /// The sort is stable, so nodes inside a layer keep insertion order.
    pub fn render(mut self) -> Vec<SvgNode> {
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result: Vec<SvgNode> = Vec::new();
        let mut current: Option<(RenderLayer, svg_element::Group)> = None;

        for (layer, node) in self.items {
            current = match current {
                Some((current_layer, group)) if current_layer == layer => {
                    Some((current_layer, group.add(node)))
                }
                previous => {
                    if let Some((_, group)) = previous {
                        result.push(Box::new(group));
                    }
                    let group = svg_element::Group::new()
                        .set("data-layer", layer.name())
                        .add(node);
                    Some((layer, group))
                }
            };
        }

        if let Some((_, group)) = current {
            result.push(Box::new(group));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use svg::node::element::Rectangle;

    use super::*;

    #[test]
    fn test_empty_output_renders_nothing() {
        let output = LayeredOutput::new();
        assert!(output.is_empty());
        assert!(output.render().is_empty());
    }

    #[test]
    fn test_one_group_per_layer() {
        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Node, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Edge, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Node, Box::new(Rectangle::new()));
        assert_eq!(output.len(), 3);

        assert_eq!(output.render().len(), 2);
    }

    #[test]
    fn test_layers_emitted_bottom_first() {
        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Overlay, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Plate, Box::new(Rectangle::new()));

        let rendered: Vec<String> = output
            .render()
            .into_iter()
            .map(|node| node.to_string())
            .collect();

        assert!(rendered[0].contains("data-layer=\"plate\""));
        assert!(rendered[1].contains("data-layer=\"overlay\""));
    }

    #[test]
    fn test_merge_keeps_layers() {
        let mut first = LayeredOutput::new();
        first.add_to_layer(RenderLayer::Plate, Box::new(Rectangle::new()));

        let mut second = LayeredOutput::new();
        second.add_to_layer(RenderLayer::Plate, Box::new(Rectangle::new()));
        second.add_to_layer(RenderLayer::Text, Box::new(Rectangle::new()));

        first.merge(second);
        assert_eq!(first.render().len(), 2);
    }
}
