use stagegraph_core::{geometry::Point, identifier::Id};

use crate::{
    graph::GraphEdge,
    render::{NodeAnchors, RenderError},
};

/// A directed connector between two mounted nodes.
///
/// `start` and `end` lie on the border of the source and target boxes,
/// along the line joining their centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeElement {
    pub source: Id,
    pub target: Id,
    pub start: Point,
    pub end: Point,
}

/// Resolves edges against mounted node anchors.
#[derive(Debug, Clone, Default)]
pub struct EdgeRenderer;

impl EdgeRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders one connector per edge, in edge order.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnmountedAnchor`] if an endpoint has not been
    /// mounted yet. Edges must be rendered after their nodes.
    pub fn render(
        &self,
        edges: &[GraphEdge],
        anchors: &NodeAnchors,
    ) -> Result<Vec<EdgeElement>, RenderError> {
        edges
            .iter()
            .map(|edge| self.render_edge(edge, anchors))
            .collect()
    }

    fn render_edge(&self, edge: &GraphEdge, anchors: &NodeAnchors) -> Result<EdgeElement, RenderError> {
        let resolve = |anchor: Id| {
            anchors.get(anchor).ok_or(RenderError::UnmountedAnchor {
                from: edge.source,
                to: edge.target,
                anchor,
            })
        };
        let source = resolve(edge.source)?;
        let target = resolve(edge.target)?;

        Ok(EdgeElement {
            source: edge.source,
            target: edge.target,
            start: source.ray_exit(target.center()),
            end: target.ray_exit(source.center()),
        })
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use stagegraph_core::geometry::{Bounds, Size};

    use super::*;
    use crate::render::{NodeElement, NodeKind};

    fn mount(anchors: &mut NodeAnchors, id: &str, center: Point) {
        anchors.mount(&NodeElement {
            anchor: Id::new(id),
            label: id.to_string(),
            bounds: Bounds::new_from_center(center, Size::new(100.0, 40.0)),
            kind: NodeKind::Descriptive,
        });
    }

    #[test]
    fn test_endpoints_lie_on_box_borders() {
        let mut anchors = NodeAnchors::new();
        mount(&mut anchors, "a", Point::new(0.0, 0.0));
        mount(&mut anchors, "b", Point::new(300.0, 0.0));

        let edges = EdgeRenderer::new()
            .render(&[GraphEdge::new("a", "b")], &anchors)
            .unwrap();

        assert_eq!(edges.len(), 1);
        assert!(approx_eq!(f32, edges[0].start.x(), 50.0));
        assert!(approx_eq!(f32, edges[0].end.x(), 250.0));
    }

    #[test]
    fn test_unmounted_target_is_an_error() {
        let mut anchors = NodeAnchors::new();
        mount(&mut anchors, "a", Point::new(0.0, 0.0));

        let err = EdgeRenderer::new()
            .render(&[GraphEdge::new("a", "ghost")], &anchors)
            .unwrap_err();

        assert_eq!(
            err,
            RenderError::UnmountedAnchor {
                from: Id::new("a"),
                to: Id::new("ghost"),
                anchor: Id::new("ghost"),
            }
        );
    }

    #[test]
    fn test_rendering_twice_is_identical() {
        let mut anchors = NodeAnchors::new();
        mount(&mut anchors, "a", Point::new(0.0, 0.0));
        mount(&mut anchors, "b", Point::new(120.0, 160.0));
        let edges = [GraphEdge::new("a", "b"), GraphEdge::new("b", "a")];
        let renderer = EdgeRenderer::new();

        let first = renderer.render(&edges, &anchors).unwrap();
        let second = renderer.render(&edges, &anchors).unwrap();

        assert_eq!(first, second);
    }
}
