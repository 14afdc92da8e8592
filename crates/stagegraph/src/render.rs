//! Scene production.
//!
//! Rendering is a pure function of the graph model and the session state:
//! the same model, loaded documents and overlay visibility always produce
//! the same [`Scene`]. The scene is plain data; turning it into SVG is the
//! job of [`crate::export`].
//!
//! Elements are produced in mount order:
//!
//! ```text
//! GraphModel ── measure ──► layout ──► NodeRenderer ──► NodeAnchors
//!                                                          │
//!                                   EdgeRenderer ◄─────────┘
//!                                        │
//!                plates (member bounds) ─┤
//!                                        ▼
//!                      OverlayRenderer (Shown overlays only)
//! ```

mod edge;
mod node;
mod overlay;

pub use edge::{EdgeElement, EdgeRenderer};
pub use node::{NodeAnchors, NodeElement, NodeKind, NodeRenderer};
pub use overlay::{OverlayElement, OverlayRenderer};

use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, trace};
use thiserror::Error;

use stagegraph_core::{
    color::Color,
    draw::{ArrowDefinition, NodeBoxDefinition, PanelDefinition, PlateDefinition, TextDefinition},
    geometry::{Bounds, Insets, Point, Size},
    identifier::Id,
};

use crate::{
    config::AppConfig,
    error::StagegraphError,
    graph::{GraphModel, Plate},
    layout,
    metrics::MetricsStore,
    overlay::{Availability, OverlayController, OverlayData, OverlayKind},
    point_cloud::PointCloudViewer,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("edge `{from}` -> `{to}` resolved before node `{anchor}` was mounted")]
    UnmountedAnchor { from: Id, to: Id, anchor: Id },

    #[error("{0}")]
    Style(String),
}

// =============================================================================
// Styles
// =============================================================================

/// Drawing definitions shared by every element of a scene.
#[derive(Debug, Clone)]
pub struct Styles {
    background: Option<Color>,
    descriptive: Rc<NodeBoxDefinition>,
    trigger: Rc<NodeBoxDefinition>,
    plate: Rc<PlateDefinition>,
    arrow: Rc<ArrowDefinition>,
    panel: Rc<PanelDefinition>,
}

impl Styles {
    /// Builds the drawing definitions from the style and layout sections.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Style`] if a configured color does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, RenderError> {
        let style = config.style();
        let layout = config.layout();

        let text_color = style.text_color().map_err(RenderError::Style)?;
        let text = TextDefinition::new(style.font_family(), style.font_size())
            .with_color(text_color);
        let bold = text.clone().with_bold(true);

        let descriptive = NodeBoxDefinition::new(
            style.node_fill().map_err(RenderError::Style)?,
            style.node_stroke().map_err(RenderError::Style)?,
            text.clone(),
        )
        .with_min_size(layout.node_min_size())
        .with_padding(layout.node_padding());

        let trigger = NodeBoxDefinition::new(
            style.trigger_fill().map_err(RenderError::Style)?,
            style.trigger_stroke().map_err(RenderError::Style)?,
            bold.clone(),
        )
        .with_min_size(layout.node_min_size())
        .with_padding(layout.node_padding())
        .with_stroke_width(2.0)
        .with_corner_radius(layout.node_min_size().height() / 2.0);

        let plate = PlateDefinition::new(
            style.plate_fill().map_err(RenderError::Style)?,
            style.plate_stroke().map_err(RenderError::Style)?,
            bold.clone(),
        );

        let arrow = ArrowDefinition::new(
            style.edge_color().map_err(RenderError::Style)?,
            1.5,
            style.edge_style(),
        );

        let small = TextDefinition::new(style.font_family(), style.font_size() - 2.0)
            .with_color(text_color);
        let panel = PanelDefinition::new(
            style.panel_fill().map_err(RenderError::Style)?,
            style.node_stroke().map_err(RenderError::Style)?,
            style.plate_fill().map_err(RenderError::Style)?,
            bold,
            small,
        )
        .with_point_radius(config.viewer().point_radius());

        Ok(Self {
            background: style.background_color().map_err(RenderError::Style)?,
            descriptive: Rc::new(descriptive),
            trigger: Rc::new(trigger),
            plate: Rc::new(plate),
            arrow: Rc::new(arrow),
            panel: Rc::new(panel),
        })
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn descriptive(&self) -> &Rc<NodeBoxDefinition> {
        &self.descriptive
    }

    pub fn trigger(&self) -> &Rc<NodeBoxDefinition> {
        &self.trigger
    }

    pub fn plate(&self) -> &Rc<PlateDefinition> {
        &self.plate
    }

    pub fn arrow(&self) -> &Rc<ArrowDefinition> {
        &self.arrow
    }

    pub fn panel(&self) -> &Rc<PanelDefinition> {
        &self.panel
    }
}

// =============================================================================
// Scene
// =============================================================================

/// A plate region with its click binding.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateElement {
    pub title: String,
    pub bounds: Bounds,
    /// Bound overlay and whether a click would currently show it.
    pub overlay: Option<(OverlayKind, Availability)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneElement {
    Node(NodeElement),
    Edge(EdgeElement),
    Plate(PlateElement),
    Overlay(OverlayElement),
}

impl SceneElement {
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Node(node) => node.bounds,
            Self::Edge(edge) => {
                let span = edge.end.sub_point(edge.start).abs();
                Bounds::new_from_top_left(
                    Point::new(edge.start.x().min(edge.end.x()), edge.start.y().min(edge.end.y())),
                    Size::new(span.x(), span.y()),
                )
            }
            Self::Plate(plate) => plate.bounds,
            Self::Overlay(overlay) => overlay.bounds,
        }
    }
}

/// The ordered visual elements of one dashboard state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    elements: Vec<SceneElement>,
}

impl Scene {
    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.elements.iter().filter_map(|element| match element {
            SceneElement::Node(node) => Some(node),
            _ => None,
        })
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeElement> {
        self.elements.iter().filter_map(|element| match element {
            SceneElement::Edge(edge) => Some(edge),
            _ => None,
        })
    }

    pub fn plates(&self) -> impl Iterator<Item = &PlateElement> {
        self.elements.iter().filter_map(|element| match element {
            SceneElement::Plate(plate) => Some(plate),
            _ => None,
        })
    }

    pub fn overlays(&self) -> impl Iterator<Item = &OverlayElement> {
        self.elements.iter().filter_map(|element| match element {
            SceneElement::Overlay(overlay) => Some(overlay),
            _ => None,
        })
    }

    pub fn node(&self, anchor: &str) -> Option<&NodeElement> {
        self.nodes().find(|node| node.anchor == anchor)
    }

    pub fn overlay(&self, kind: OverlayKind) -> Option<&OverlayElement> {
        self.overlays().find(|overlay| overlay.kind == kind)
    }

    /// Union of all element bounds.
    pub fn bounds(&self) -> Bounds {
        self.elements
            .iter()
            .map(SceneElement::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default()
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Node boxes of one graph model, placed by the layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneLayout {
    bounds: IndexMap<Id, Bounds>,
}

impl SceneLayout {
    /// Bounds of the node box with the given id.
    pub fn get(&self, id: Id) -> Option<Bounds> {
        self.bounds.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

/// Session state a scene is rendered from.
pub struct SceneState<'a> {
    pub overlays: &'a OverlayController,
    pub data: &'a dyn OverlayData,
    pub metrics: &'a MetricsStore,
    pub viewer: &'a PointCloudViewer,
}

/// Produces [`Scene`]s for a fixed configuration.
#[derive(Debug, Clone)]
pub struct Renderer {
    styles: Styles,
    engine: layout::Engine,
    nodes: NodeRenderer,
    edges: EdgeRenderer,
    overlays: OverlayRenderer,
    plate_padding: Insets,
}

impl Renderer {
    /// # Errors
    ///
    /// Returns [`StagegraphError::Render`] if the style section is invalid.
    pub fn new(config: &AppConfig) -> Result<Self, StagegraphError> {
        let styles = Styles::from_config(config)?;
        Ok(Self {
            engine: layout::Engine::new(config.layout()),
            nodes: NodeRenderer::new(&styles),
            edges: EdgeRenderer::new(),
            overlays: OverlayRenderer::new(&styles, config),
            plate_padding: config.layout().plate_padding(),
            styles,
        })
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Measures every node of `model` and places it.
    ///
    /// The result only depends on the model and the configuration, so a
    /// session computes it once and reuses it through [`Self::render_laid_out`].
    ///
    /// # Errors
    ///
    /// Returns a layout error if node placement fails.
    pub fn layout(&self, model: &GraphModel) -> Result<SceneLayout, StagegraphError> {
        let sizes: IndexMap<Id, _> = model
            .nodes()
            .map(|node| (node.id(), self.nodes.measure(node)))
            .collect();
        let positions = self.engine.positions(model, &sizes)?;

        let bounds = positions
            .into_iter()
            .filter_map(|(id, center)| sizes.get(&id).map(|size| (id, center.to_bounds(*size))))
            .collect();
        Ok(SceneLayout { bounds })
    }

    /// Lays out and renders `model` in the given state.
    ///
    /// # Errors
    ///
    /// Returns a layout error if node placement fails, or a render error if
    /// an edge cannot resolve its anchors.
    pub fn render(&self, model: &GraphModel, state: &SceneState<'_>) -> Result<Scene, StagegraphError> {
        let layout = self.layout(model)?;
        self.render_laid_out(model, &layout, state)
    }

    /// Renders `model` in the given state using a layout from [`Self::layout`].
    ///
    /// # Errors
    ///
    /// Returns a layout error if `layout` misses a node of `model`, or a
    /// render error if an edge cannot resolve its anchors.
    pub fn render_laid_out(
        &self,
        model: &GraphModel,
        layout: &SceneLayout,
        state: &SceneState<'_>,
    ) -> Result<Scene, StagegraphError> {
        let mut elements = Vec::new();
        let mut anchors = NodeAnchors::new();
        for node in model.nodes() {
            let Some(bounds) = layout.get(node.id()) else {
                return Err(StagegraphError::Layout(format!(
                    "node `{}` has no position",
                    node.id()
                )));
            };
            let element = self.nodes.render(node, bounds, state.data);
            anchors.mount(&element);
            elements.push(SceneElement::Node(element));
        }

        let edges = self.edges.render(model.edges(), &anchors)?;
        elements.extend(edges.into_iter().map(SceneElement::Edge));

        for plate in model.plates() {
            elements.push(SceneElement::Plate(self.plate_element(plate, &anchors, state.data)));
        }

        let graph_bounds = elements
            .iter()
            .map(SceneElement::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default();
        let overlays = self.overlays.render(
            state.overlays,
            state.metrics,
            state.viewer,
            graph_bounds,
        );
        elements.extend(overlays.into_iter().map(SceneElement::Overlay));

        debug!(elements = elements.len(); "Scene rendered");
        trace!(elements:? = elements; "Scene elements");
        Ok(Scene { elements })
    }

    fn plate_element(
        &self,
        plate: &Plate,
        anchors: &NodeAnchors,
        data: &dyn OverlayData,
    ) -> PlateElement {
        let members = plate
            .members()
            .iter()
            .filter_map(|id| anchors.get(*id))
            .reduce(|acc, bounds| acc.merge(&bounds));

        let bounds = match members {
            Some(members) => {
                let band = self.styles.plate.title_band();
                let padding = self.plate_padding;
                members.add_padding(Insets::new(
                    padding.top() + band,
                    padding.right(),
                    padding.bottom(),
                    padding.left(),
                ))
            }
            None => plate.region().unwrap_or_default(),
        };

        PlateElement {
            title: plate.title().to_string(),
            bounds,
            overlay: plate
                .overlay()
                .map(|kind| (kind, data.availability(kind))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::GraphNode,
        overlay::{PointCloudArtifact, Transition},
    };

    struct AllReady;

    impl OverlayData for AllReady {
        fn availability(&self, _kind: OverlayKind) -> Availability {
            Availability::Ready
        }
    }

    fn render(model: &GraphModel, overlays: &OverlayController) -> Scene {
        let config = AppConfig::default();
        let renderer = Renderer::new(&config).unwrap();
        let metrics = MetricsStore::new();
        let viewer = PointCloudViewer::new(config.viewer());
        let state = SceneState {
            overlays,
            data: &AllReady,
            metrics: &metrics,
            viewer: &viewer,
        };
        renderer.render(model, &state).unwrap()
    }

    #[test]
    fn test_single_edge_scene() {
        let model = GraphModel::builder()
            .node(GraphNode::descriptive("imageInput", "Image Input"))
            .node(GraphNode::descriptive("twoViewEstimator", "Two-View Estimator"))
            .edge("imageInput", "twoViewEstimator")
            .build()
            .unwrap();

        let scene = render(&model, &OverlayController::new());

        assert_eq!(scene.nodes().count(), 2);
        let edges: Vec<_> = scene.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, "imageInput");
        assert_eq!(edges[0].target, "twoViewEstimator");
    }

    #[test]
    fn test_nodes_precede_edges() {
        let scene = render(&GraphModel::default_pipeline(), &OverlayController::new());

        let first_edge = scene
            .elements()
            .iter()
            .position(|element| matches!(element, SceneElement::Edge(_)))
            .unwrap();
        let last_node = scene
            .elements()
            .iter()
            .rposition(|element| matches!(element, SceneElement::Node(_)))
            .unwrap();
        assert!(last_node < first_edge);
    }

    #[test]
    fn test_render_is_deterministic() {
        let model = GraphModel::default_pipeline();
        let overlays = OverlayController::new();

        assert_eq!(render(&model, &overlays), render(&model, &overlays));
    }

    #[test]
    fn test_plates_enclose_members() {
        let model = GraphModel::default_pipeline();
        let scene = render(&model, &OverlayController::new());

        for plate in model.plates() {
            let element = scene.plates().find(|p| p.title == plate.title()).unwrap();
            for member in plate.members() {
                let node = scene.node(&member.as_string()).unwrap();
                assert!(element.bounds.contains(node.bounds.min_point()));
                assert!(element.bounds.contains(node.bounds.center()));
            }
            assert_eq!(
                element.overlay,
                plate.overlay().map(|kind| (kind, Availability::Ready))
            );
        }
    }

    #[test]
    fn test_cached_layout_renders_same_scene() {
        let model = GraphModel::default_pipeline();
        let config = AppConfig::default();
        let renderer = Renderer::new(&config).unwrap();
        let layout = renderer.layout(&model).unwrap();
        assert_eq!(layout.len(), model.node_count());

        let overlays = OverlayController::new();
        let metrics = MetricsStore::new();
        let viewer = PointCloudViewer::new(config.viewer());
        let state = SceneState {
            overlays: &overlays,
            data: &AllReady,
            metrics: &metrics,
            viewer: &viewer,
        };

        let cached = renderer.render_laid_out(&model, &layout, &state).unwrap();
        assert_eq!(cached, renderer.render(&model, &state).unwrap());
    }

    #[test]
    fn test_layout_missing_a_node_is_a_layout_error() {
        let model = GraphModel::default_pipeline();
        let config = AppConfig::default();
        let renderer = Renderer::new(&config).unwrap();
        let overlays = OverlayController::new();
        let metrics = MetricsStore::new();
        let viewer = PointCloudViewer::new(config.viewer());
        let state = SceneState {
            overlays: &overlays,
            data: &AllReady,
            metrics: &metrics,
            viewer: &viewer,
        };

        let err = renderer
            .render_laid_out(&model, &SceneLayout::default(), &state)
            .unwrap_err();

        assert!(matches!(err, StagegraphError::Layout(_)));
    }

    #[test]
    fn test_shown_overlays_are_placed_right_of_graph() {
        let model = GraphModel::default_pipeline();
        let mut overlays = OverlayController::new();
        let kind = OverlayKind::PointCloud(PointCloudArtifact::AdjustmentOutput);
        assert_eq!(overlays.request(kind, &AllReady), Transition::Shown);

        let scene = render(&model, &overlays);

        let graph_right = scene
            .nodes()
            .map(|node| node.bounds.max_x())
            .fold(f32::MIN, f32::max);
        let panel = scene.overlay(kind).unwrap();
        assert!(panel.bounds.min_x() > graph_right);
        assert_eq!(scene.overlays().count(), 1);
    }
}
