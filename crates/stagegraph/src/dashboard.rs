//! A dashboard session.
//!
//! [`Dashboard`] owns everything one viewing session needs: the graph
//! model, the metric documents as they arrive, the overlay visibility and
//! the point-cloud viewer. Clicks are routed to the overlay controller, and
//! point-cloud overlays keep their viewer in sync with every transition.
//!
//! ```no_run
//! # use stagegraph::{config::AppConfig, dashboard::Dashboard, graph::GraphModel};
//! let mut dashboard = Dashboard::open(
//!     GraphModel::default_pipeline(),
//!     &AppConfig::default(),
//!     "results",
//! )?;
//! dashboard.wait_for_loads();
//! dashboard.click_plate("Frontend");
//! let svg = dashboard.render_svg()?;
//! # Ok::<(), stagegraph::StagegraphError>(())
//! ```

use std::{path::Path, sync::Arc};

use log::{debug, info};

use crate::{
    config::AppConfig,
    error::StagegraphError,
    export::{Exporter, svg::SvgBuilder},
    graph::GraphModel,
    metrics::{DocumentName, LoadOutcome, MetricsDocument, MetricsLoader, MetricsStore, PendingLoads},
    overlay::{
        Availability, OverlayController, OverlayData, OverlayKind, PointCloudArtifact, Transition,
        Visibility,
    },
    point_cloud::{ColmapDirectory, PointCloudSource, PointCloudViewer, ViewerEvent},
    render::{Renderer, Scene, SceneLayout, SceneState},
};

/// Availability as seen by the overlay guard.
///
/// Metric overlays follow their bound documents; point-cloud overlays are
/// Ready when their artifact exists and Unavailable otherwise.
struct DataView<'a> {
    metrics: &'a MetricsStore,
    source: &'a dyn PointCloudSource,
}

impl OverlayData for DataView<'_> {
    fn availability(&self, kind: OverlayKind) -> Availability {
        match kind {
            OverlayKind::PointCloud(artifact) if self.source.contains(artifact) => {
                Availability::Ready
            }
            OverlayKind::PointCloud(_) => Availability::Unavailable,
            _ => self.metrics.availability(kind.bound_documents()),
        }
    }
}

pub struct Dashboard {
    model: GraphModel,
    renderer: Renderer,
    layout: SceneLayout,
    overlays: OverlayController,
    metrics: MetricsStore,
    pending: Option<PendingLoads>,
    source: Box<dyn PointCloudSource>,
    viewer: PointCloudViewer,
}

impl Dashboard {
    /// Creates a session with every document Pending and no loads attached.
    ///
    /// The model is laid out once here; every later scene reuses that layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the style section of `config` is invalid or the
    /// model cannot be laid out.
    pub fn new(
        model: GraphModel,
        config: &AppConfig,
        source: Box<dyn PointCloudSource>,
    ) -> Result<Self, StagegraphError> {
        let renderer = Renderer::new(config)?;
        let layout = renderer.layout(&model)?;
        debug!(nodes = layout.len(); "Graph laid out");
        Ok(Self {
            renderer,
            layout,
            viewer: PointCloudViewer::new(config.viewer()),
            overlays: OverlayController::new(),
            metrics: MetricsStore::new(),
            pending: None,
            source,
            model,
        })
    }

    /// Opens a session over a results directory and starts loading its
    /// metric documents in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the style section of `config` is invalid or the
    /// model cannot be laid out.
    pub fn open(
        model: GraphModel,
        config: &AppConfig,
        results_dir: impl AsRef<Path>,
    ) -> Result<Self, StagegraphError> {
        let results_dir = results_dir.as_ref();
        info!(results_dir:? = results_dir; "Opening dashboard");
        let mut dashboard = Self::new(model, config, Box::new(ColmapDirectory::new(results_dir)))?;
        dashboard.attach(MetricsLoader::new(results_dir).spawn());
        Ok(dashboard)
    }

    /// Attaches a running background load.
    pub fn attach(&mut self, pending: PendingLoads) {
        self.pending = Some(pending);
    }

    /// Applies every load outcome that has arrived, without blocking.
    /// Returns how many were applied.
    pub fn poll_loads(&mut self) -> usize {
        let Some(pending) = self.pending.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        while let Some(outcome) = pending.try_next() {
            if self.metrics.apply(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks until the attached load has delivered every outcome.
    pub fn wait_for_loads(&mut self) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        while let Some(outcome) = pending.wait() {
            self.metrics.apply(outcome);
        }
        debug!(pending = self.metrics.has_pending(); "Background loads finished");
    }

    /// Records one load outcome. Returns `false` if the document already
    /// left Pending.
    pub fn complete_load(&mut self, outcome: LoadOutcome) -> bool {
        self.metrics.apply(outcome)
    }

    /// Handles a click on the node with id `node`.
    ///
    /// Returns `None` for unknown nodes and for descriptive nodes, which
    /// are inert.
    pub fn click_node(&mut self, node: &str) -> Option<Transition> {
        let overlay = self.model.find_node(node)?.overlay()?;
        Some(self.request(overlay))
    }

    /// Handles a click on the plate titled `title`.
    ///
    /// Returns `None` for unknown plates and for plates without a binding.
    pub fn click_plate(&mut self, title: &str) -> Option<Transition> {
        let overlay = self.model.plate(title)?.overlay()?;
        Some(self.request(overlay))
    }

    /// Asks to show `kind`. The request is granted only if its data is
    /// Ready right now.
    pub fn request(&mut self, kind: OverlayKind) -> Transition {
        let data = DataView {
            metrics: &self.metrics,
            source: self.source.as_ref(),
        };
        let transition = self.overlays.request(kind, &data);
        self.sync_viewer(kind);
        transition
    }

    /// Hides `kind`. Hiding a Hidden overlay does nothing.
    pub fn dismiss(&mut self, kind: OverlayKind) -> Transition {
        let transition = self.overlays.dismiss(kind);
        self.sync_viewer(kind);
        transition
    }

    fn sync_viewer(&mut self, kind: OverlayKind) {
        let OverlayKind::PointCloud(artifact) = kind else {
            return;
        };
        let event = self
            .viewer
            .sync(artifact, self.overlays.visibility(kind), self.source.as_ref());
        if event != ViewerEvent::Unchanged {
            debug!(artifact = artifact.name(), event:? = event; "Viewer synced");
        }
    }

    /// Rotates the camera of a Shown point cloud. Returns `false` if the
    /// cloud is not mounted.
    pub fn orbit(&mut self, artifact: PointCloudArtifact, yaw: f32, pitch: f32) -> bool {
        self.viewer.orbit(artifact, yaw, pitch)
    }

    pub fn visibility(&self, kind: OverlayKind) -> Visibility {
        self.overlays.visibility(kind)
    }

    /// Current availability of the data bound to `kind`.
    pub fn availability(&self, kind: OverlayKind) -> Availability {
        self.data_view().availability(kind)
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn overlays(&self) -> &OverlayController {
        &self.overlays
    }

    pub fn metrics(&self) -> &MetricsStore {
        &self.metrics
    }

    pub fn document(&self, name: DocumentName) -> Option<Arc<MetricsDocument>> {
        self.metrics.get(name)
    }

    pub fn viewer(&self) -> &PointCloudViewer {
        &self.viewer
    }

    fn data_view(&self) -> DataView<'_> {
        DataView {
            metrics: &self.metrics,
            source: self.source.as_ref(),
        }
    }

    /// Renders the current state.
    ///
    /// # Errors
    ///
    /// Returns a render error; see [`Renderer::render_laid_out`].
    pub fn scene(&self) -> Result<Scene, StagegraphError> {
        let data = self.data_view();
        let state = SceneState {
            overlays: &self.overlays,
            data: &data,
            metrics: &self.metrics,
            viewer: &self.viewer,
        };
        self.renderer.render_laid_out(&self.model, &self.layout, &state)
    }

    /// Renders the current state to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns a layout, render or export error.
    pub fn render_svg(&self) -> Result<String, StagegraphError> {
        let scene = self.scene()?;
        let mut svg = SvgBuilder::new("")
            .with_styles(self.renderer.styles())
            .build()?;
        Ok(svg.render_scene(&scene).to_string())
    }

    /// Renders the current state and hands it to `exporter`.
    ///
    /// # Errors
    ///
    /// Returns a layout, render or export error.
    pub fn export(&self, exporter: &mut impl Exporter) -> Result<(), StagegraphError> {
        let scene = self.scene()?;
        exporter.export_scene(&scene)?;
        info!(elements = scene.elements().len(); "Dashboard exported");
        Ok(())
    }

    /// Builds an SVG exporter writing to `path` with this session's styles.
    ///
    /// # Errors
    ///
    /// Returns an export error if the exporter cannot be built.
    pub fn svg_exporter(&self, path: &str) -> Result<crate::export::svg::Svg, StagegraphError> {
        Ok(SvgBuilder::new(path)
            .with_styles(self.renderer.styles())
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point_cloud::{CloudPoint, PointCloud, PointCloudError};

    struct NoClouds;

    impl PointCloudSource for NoClouds {
        fn contains(&self, _artifact: PointCloudArtifact) -> bool {
            false
        }

        fn acquire(&self, artifact: PointCloudArtifact) -> Result<PointCloud, PointCloudError> {
            Err(PointCloudError::Missing(artifact))
        }
    }

    struct TwoPoints;

    impl PointCloudSource for TwoPoints {
        fn contains(&self, _artifact: PointCloudArtifact) -> bool {
            true
        }

        fn acquire(&self, artifact: PointCloudArtifact) -> Result<PointCloud, PointCloudError> {
            let point = |x| CloudPoint {
                position: [x, 0.0, 0.0],
                rgb: [10, 20, 30],
            };
            Ok(PointCloud::new(artifact, vec![point(-1.0), point(1.0)]))
        }
    }

    fn dashboard(source: Box<dyn PointCloudSource>) -> Dashboard {
        Dashboard::new(GraphModel::default_pipeline(), &AppConfig::default(), source).unwrap()
    }

    #[test]
    fn test_descriptive_node_click_is_inert() {
        let mut dashboard = dashboard(Box::new(NoClouds));

        assert_eq!(dashboard.click_node("imageInput"), None);
        assert_eq!(dashboard.click_node("noSuchNode"), None);
        assert_eq!(dashboard.click_plate("No Such Plate"), None);
    }

    #[test]
    fn test_missing_artifact_suppresses_request() {
        let mut dashboard = dashboard(Box::new(NoClouds));
        let kind = OverlayKind::PointCloud(PointCloudArtifact::AssociationOutput);

        assert_eq!(
            dashboard.request(kind),
            Transition::Suppressed(Availability::Unavailable)
        );
        assert_eq!(dashboard.visibility(kind), Visibility::Hidden);
        assert!(!dashboard.viewer().is_mounted(PointCloudArtifact::AssociationOutput));
    }

    #[test]
    fn test_point_cloud_mounts_and_releases_with_overlay() {
        let mut dashboard = dashboard(Box::new(TwoPoints));
        let artifact = PointCloudArtifact::AdjustmentOutput;
        let kind = OverlayKind::PointCloud(artifact);

        assert_eq!(dashboard.click_node("adjustmentOutput"), Some(Transition::Shown));
        assert!(dashboard.viewer().is_mounted(artifact));
        assert!(dashboard.orbit(artifact, 15.0, 0.0));

        assert_eq!(dashboard.dismiss(kind), Transition::Hidden);
        assert!(!dashboard.viewer().is_mounted(artifact));
        assert!(!dashboard.orbit(artifact, 15.0, 0.0));
    }

    #[test]
    fn test_failed_document_makes_overlay_unavailable() {
        let mut dashboard = dashboard(Box::new(NoClouds));
        dashboard.complete_load(LoadOutcome {
            name: DocumentName::RotationAveraging,
            result: MetricsDocument::from_json_str(DocumentName::RotationAveraging, "{"),
        });

        assert_eq!(
            dashboard.availability(OverlayKind::AveragingMetrics),
            Availability::Unavailable
        );
        assert_eq!(
            dashboard.request(OverlayKind::AveragingMetrics),
            Transition::Suppressed(Availability::Unavailable)
        );
    }

    #[test]
    fn test_render_svg_reflects_shown_overlay() {
        let mut dashboard = dashboard(Box::new(TwoPoints));
        dashboard.click_node("associationOutput");

        let svg = dashboard.render_svg().unwrap();

        assert!(svg.contains(r#"data-overlay="point_cloud:association-output""#));
        assert!(svg.contains("<circle"));
    }
}
