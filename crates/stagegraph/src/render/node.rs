use std::rc::Rc;

use indexmap::IndexMap;

use stagegraph_core::{
    draw::NodeBoxDefinition,
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use crate::{
    graph::{GraphNode, NodeCategory},
    overlay::{Availability, OverlayData, OverlayKind},
    render::Styles,
};

/// Visual kind of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Descriptive,
    /// Clicking the node requests `overlay`. `availability` tells whether
    /// that request would currently be granted.
    Trigger {
        overlay: OverlayKind,
        availability: Availability,
    },
}

/// A positioned node box. `anchor` is the node id edges attach to.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeElement {
    pub anchor: Id,
    pub label: String,
    pub bounds: Bounds,
    pub kind: NodeKind,
}

impl NodeElement {
    pub fn is_trigger(&self) -> bool {
        matches!(self.kind, NodeKind::Trigger { .. })
    }
}

/// Maps each [`GraphNode`] to a node box.
#[derive(Debug, Clone)]
pub struct NodeRenderer {
    descriptive: Rc<NodeBoxDefinition>,
    trigger: Rc<NodeBoxDefinition>,
}

impl NodeRenderer {
    pub fn new(styles: &Styles) -> Self {
        Self {
            descriptive: Rc::clone(styles.descriptive()),
            trigger: Rc::clone(styles.trigger()),
        }
    }

    fn definition(&self, category: NodeCategory) -> &NodeBoxDefinition {
        match category {
            NodeCategory::Descriptive => &self.descriptive,
            NodeCategory::OverlayTrigger => &self.trigger,
        }
    }

    /// Size of the box `node` is drawn with.
    pub fn measure(&self, node: &GraphNode) -> Size {
        self.definition(node.category()).measure(node.label())
    }

    /// Renders `node` into the box placed for it by the layout pass.
    ///
    /// Trigger nodes carry the current availability of their overlay so the
    /// exported scene can show whether a click would open it.
    pub fn render(&self, node: &GraphNode, bounds: Bounds, data: &dyn OverlayData) -> NodeElement {
        let kind = match (node.category(), node.overlay()) {
            (NodeCategory::OverlayTrigger, Some(overlay)) => NodeKind::Trigger {
                overlay,
                availability: data.availability(overlay),
            },
            _ => NodeKind::Descriptive,
        };

        NodeElement {
            anchor: node.id(),
            label: node.label().to_string(),
            bounds,
            kind,
        }
    }
}

/// Bounds of every mounted node, keyed by anchor.
#[derive(Debug, Clone, Default)]
pub struct NodeAnchors {
    bounds: IndexMap<Id, Bounds>,
}

impl NodeAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, node: &NodeElement) {
        self.bounds.insert(node.anchor, node.bounds);
    }

    pub fn get(&self, anchor: Id) -> Option<Bounds> {
        self.bounds.get(&anchor).copied()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    struct Loading;

    impl OverlayData for Loading {
        fn availability(&self, _kind: OverlayKind) -> Availability {
            Availability::Loading
        }
    }

    fn renderer() -> NodeRenderer {
        NodeRenderer::new(&Styles::from_config(&AppConfig::default()).unwrap())
    }

    fn placed(node: &GraphNode, center: Point) -> Bounds {
        center.to_bounds(renderer().measure(node))
    }

    #[test]
    fn test_descriptive_node() {
        let node = GraphNode::descriptive("imageInput", "Image Input");

        let element = renderer().render(&node, placed(&node, Point::new(100.0, 50.0)), &Loading);

        assert_eq!(element.anchor, "imageInput");
        assert_eq!(element.kind, NodeKind::Descriptive);
        assert_eq!(element.bounds.center(), Point::new(100.0, 50.0));
        assert!(!element.is_trigger());
    }

    #[test]
    fn test_trigger_node_carries_availability() {
        let node = GraphNode::trigger(
            "frontendSummary",
            "Frontend Summary",
            OverlayKind::FrontendSummary,
        );

        let element = renderer().render(&node, placed(&node, Point::default()), &Loading);

        assert_eq!(
            element.kind,
            NodeKind::Trigger {
                overlay: OverlayKind::FrontendSummary,
                availability: Availability::Loading,
            }
        );
    }

    #[test]
    fn test_anchors_follow_mounted_nodes() {
        let renderer = renderer();
        let node = GraphNode::descriptive("a", "A");
        let element = renderer.render(&node, placed(&node, Point::new(10.0, 10.0)), &Loading);

        let mut anchors = NodeAnchors::new();
        assert!(anchors.get(node.id()).is_none());
        anchors.mount(&element);

        assert_eq!(anchors.get(node.id()), Some(element.bounds));
        assert_eq!(anchors.len(), 1);
    }
}
