use std::rc::Rc;

use log::debug;

use stagegraph_core::{
    draw::{Drawable, Panel, PanelBody, PanelDefinition},
    geometry::{Bounds, Point, Size},
};

use crate::{
    config::AppConfig,
    metrics::{DocumentName, MetricsStore},
    overlay::{OverlayController, OverlayKind, PointCloudArtifact},
    point_cloud::PointCloudViewer,
    render::Styles,
};

/// Vertical gap between stacked panels.
const PANEL_SPACING: f32 = 16.0;

/// A Shown overlay, ready to be drawn as a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayElement {
    pub kind: OverlayKind,
    pub title: String,
    pub body: PanelBody,
    pub bounds: Bounds,
}

/// Builds panels for the Shown overlays.
///
/// Panels are stacked top to bottom to the right of the graph, in
/// [`OverlayKind`] order.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    definition: Rc<PanelDefinition>,
    width: f32,
    cloud_height: f32,
    gap: f32,
}

impl OverlayRenderer {
    pub fn new(styles: &Styles, config: &AppConfig) -> Self {
        Self {
            definition: Rc::clone(styles.panel()),
            width: config.viewer().panel_width(),
            cloud_height: config.viewer().cloud_size().height(),
            gap: config.layout().panel_gap(),
        }
    }

    pub fn render(
        &self,
        overlays: &OverlayController,
        metrics: &MetricsStore,
        viewer: &PointCloudViewer,
        graph_bounds: Bounds,
    ) -> Vec<OverlayElement> {
        let left = graph_bounds.max_x() + self.gap;
        let mut top = graph_bounds.min_y();

        let mut elements = Vec::new();
        for kind in overlays.shown() {
            let (title, body) = match kind {
                OverlayKind::FrontendSummary => (kind.title().to_string(), frontend_body(metrics)),
                OverlayKind::AveragingMetrics => {
                    (kind.title().to_string(), averaging_body(metrics))
                }
                OverlayKind::PointCloud(artifact) => self.point_cloud(artifact, viewer),
            };

            let panel = Panel::new(Rc::clone(&self.definition), title.as_str(), body.clone(), self.width);
            let bounds = Bounds::new_from_top_left(Point::new(left, top), panel.size());
            top = bounds.max_y() + PANEL_SPACING;

            debug!(overlay = kind.to_string(); "Overlay panel placed");
            elements.push(OverlayElement {
                kind,
                title,
                body,
                bounds,
            });
        }
        elements
    }

    /// Drawing area of a point cloud inside a panel body.
    pub fn cloud_area(&self) -> Size {
        Size::new(
            self.width - 2.0 * self.definition.padding(),
            self.cloud_height,
        )
    }

    fn point_cloud(
        &self,
        artifact: PointCloudArtifact,
        viewer: &PointCloudViewer,
    ) -> (String, PanelBody) {
        if let Some(message) = viewer.failure(artifact) {
            return (artifact.title().to_string(), PanelBody::Message(message.to_string()));
        }

        let size = self.cloud_area();
        match (viewer.cloud(artifact), viewer.project(artifact, size)) {
            (Some(cloud), Some(dots)) => (
                format!("{}: {} points", artifact.title(), cloud.len()),
                PanelBody::Scatter { size, dots },
            ),
            _ => (
                artifact.title().to_string(),
                PanelBody::Message("Point cloud not mounted".to_string()),
            ),
        }
    }
}

fn frontend_body(metrics: &MetricsStore) -> PanelBody {
    match metrics.get(DocumentName::FrontendSummary) {
        Some(document) if !document.is_empty() => PanelBody::Table(document.rows()),
        Some(_) => PanelBody::Message("No frontend metrics recorded".to_string()),
        None => PanelBody::Message("Frontend summary not loaded".to_string()),
    }
}

fn averaging_body(metrics: &MetricsStore) -> PanelBody {
    let sections = [
        ("Rotation averaging", DocumentName::RotationAveraging),
        ("Translation averaging", DocumentName::TranslationAveraging),
    ];

    let mut rows = Vec::new();
    for (heading, name) in sections {
        let Some(document) = metrics.get(name) else {
            continue;
        };
        rows.push((heading.to_string(), String::new()));
        rows.extend(document.rows());
    }

    if rows.is_empty() {
        PanelBody::Message("Averaging metrics not loaded".to_string())
    } else {
        PanelBody::Table(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metrics::{LoadOutcome, MetricsDocument},
        overlay::{Availability, OverlayData},
        point_cloud::{CloudPoint, PointCloud, PointCloudError, PointCloudSource},
    };

    struct Ready;

    impl OverlayData for Ready {
        fn availability(&self, _kind: OverlayKind) -> Availability {
            Availability::Ready
        }
    }

    struct OnePoint;

    impl PointCloudSource for OnePoint {
        fn contains(&self, _artifact: PointCloudArtifact) -> bool {
            true
        }

        fn acquire(&self, artifact: PointCloudArtifact) -> Result<PointCloud, PointCloudError> {
            Ok(PointCloud::new(
                artifact,
                vec![CloudPoint {
                    position: [0.0, 0.0, 0.0],
                    rgb: [255, 0, 0],
                }],
            ))
        }
    }

    fn renderer(config: &AppConfig) -> OverlayRenderer {
        OverlayRenderer::new(&Styles::from_config(config).unwrap(), config)
    }

    fn loaded(name: DocumentName, json: &str) -> LoadOutcome {
        LoadOutcome {
            name,
            result: MetricsDocument::from_json_str(name, json),
        }
    }

    #[test]
    fn test_hidden_overlays_produce_no_panels() {
        let config = AppConfig::default();

        let panels = renderer(&config).render(
            &OverlayController::new(),
            &MetricsStore::new(),
            &PointCloudViewer::new(config.viewer()),
            Bounds::default(),
        );

        assert!(panels.is_empty());
    }

    #[test]
    fn test_frontend_summary_rows() {
        let config = AppConfig::default();
        let mut metrics = MetricsStore::new();
        metrics.apply(loaded(
            DocumentName::FrontendSummary,
            r#"{"frontend_summary": {"pair_0_1": {"inlier_ratio": 0.92}}}"#,
        ));
        let mut overlays = OverlayController::new();
        overlays.request(OverlayKind::FrontendSummary, &Ready);

        let panels = renderer(&config).render(
            &overlays,
            &metrics,
            &PointCloudViewer::new(config.viewer()),
            Bounds::default(),
        );

        assert_eq!(panels.len(), 1);
        assert_eq!(
            panels[0].body,
            PanelBody::Table(vec![(
                "pair_0_1.inlier_ratio".to_string(),
                "0.92".to_string()
            )])
        );
    }

    #[test]
    fn test_averaging_metrics_are_sectioned() {
        let config = AppConfig::default();
        let mut metrics = MetricsStore::new();
        metrics.apply(loaded(
            DocumentName::RotationAveraging,
            r#"{"rotation_averaging_metrics": {"num_rotations": 5}}"#,
        ));
        metrics.apply(loaded(
            DocumentName::TranslationAveraging,
            r#"{"translation_averaging_metrics": {"num_translations": 4}}"#,
        ));
        let mut overlays = OverlayController::new();
        overlays.request(OverlayKind::AveragingMetrics, &Ready);

        let panels = renderer(&config).render(
            &overlays,
            &metrics,
            &PointCloudViewer::new(config.viewer()),
            Bounds::default(),
        );

        let PanelBody::Table(rows) = &panels[0].body else {
            panic!("expected a table body");
        };
        let keys: Vec<&str> = rows.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Rotation averaging",
                "num_rotations",
                "Translation averaging",
                "num_translations"
            ]
        );
    }

    #[test]
    fn test_point_cloud_panels_stack() {
        let config = AppConfig::default();
        let mut overlays = OverlayController::new();
        let mut viewer = PointCloudViewer::new(config.viewer());
        for artifact in PointCloudArtifact::ALL {
            let kind = OverlayKind::PointCloud(artifact);
            overlays.request(kind, &Ready);
            viewer.sync(artifact, overlays.visibility(kind), &OnePoint);
        }
        let graph = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(500.0, 400.0));

        let panels = renderer(&config).render(&overlays, &MetricsStore::new(), &viewer, graph);

        assert_eq!(panels.len(), 2);
        assert!(panels[0].title.ends_with(": 1 points"));
        assert!(matches!(&panels[0].body, PanelBody::Scatter { dots, .. } if dots.len() == 1));
        assert_eq!(panels[0].bounds.min_x(), 500.0 + config.layout().panel_gap());
        assert!(panels[1].bounds.min_y() > panels[0].bounds.max_y());
    }
}
