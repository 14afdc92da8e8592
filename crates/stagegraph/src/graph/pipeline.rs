//! The standard structure-from-motion pipeline.

use super::{GraphModel, GraphNode, Plate};
use crate::overlay::{OverlayKind, PointCloudArtifact};

const COLUMN: f32 = 240.0;
const STAGE_ROW: f32 = 240.0;
const TRIGGER_DROP: f32 = 90.0;

fn column(index: u8) -> f32 {
    120.0 + COLUMN * f32::from(index)
}

fn row(index: u8) -> f32 {
    90.0 + STAGE_ROW * f32::from(index)
}

impl GraphModel {
    /// The pipeline as shown by default: frontend, averaging, data
    /// association and bundle adjustment, each with its result trigger.
    pub fn default_pipeline() -> Self {
        let association = OverlayKind::PointCloud(PointCloudArtifact::AssociationOutput);
        let adjustment = OverlayKind::PointCloud(PointCloudArtifact::AdjustmentOutput);

        let model = GraphModel::builder()
            .node(GraphNode::descriptive("imageInput", "Image Input").at(column(0), row(0)))
            .node(
                GraphNode::descriptive("detectorDescriptor", "Detector-Descriptor")
                    .at(column(1), row(0)),
            )
            .node(
                GraphNode::descriptive("correspondenceGenerator", "Correspondence Generator")
                    .at(column(2), row(0)),
            )
            .node(
                GraphNode::descriptive("twoViewEstimator", "Two-View Estimator")
                    .at(column(3), row(0)),
            )
            .node(
                GraphNode::trigger(
                    "frontendSummary",
                    "Frontend Summary",
                    OverlayKind::FrontendSummary,
                )
                .at(column(3), row(0) + TRIGGER_DROP),
            )
            .node(
                GraphNode::descriptive("viewGraphEstimator", "View Graph Estimator")
                    .at(column(0), row(1)),
            )
            .node(
                GraphNode::descriptive("rotationAveraging", "Rotation Averaging")
                    .at(column(1), row(1)),
            )
            .node(
                GraphNode::descriptive("translationAveraging", "Translation Averaging")
                    .at(column(2), row(1)),
            )
            .node(
                GraphNode::trigger(
                    "averagingMetrics",
                    "Averaging Metrics",
                    OverlayKind::AveragingMetrics,
                )
                .at(column(2), row(1) + TRIGGER_DROP),
            )
            .node(
                GraphNode::descriptive("dataAssociation", "Data Association")
                    .at(column(0), row(2)),
            )
            .node(
                GraphNode::trigger("associationOutput", "Associated Points", association)
                    .at(column(0), row(2) + TRIGGER_DROP),
            )
            .node(
                GraphNode::descriptive("bundleAdjustment", "Bundle Adjustment")
                    .at(column(1), row(2)),
            )
            .node(
                GraphNode::trigger("adjustmentOutput", "Adjusted Points", adjustment)
                    .at(column(1), row(2) + TRIGGER_DROP),
            )
            .edge("imageInput", "detectorDescriptor")
            .edge("detectorDescriptor", "correspondenceGenerator")
            .edge("correspondenceGenerator", "twoViewEstimator")
            .edge("twoViewEstimator", "frontendSummary")
            .edge("twoViewEstimator", "viewGraphEstimator")
            .edge("viewGraphEstimator", "rotationAveraging")
            .edge("rotationAveraging", "translationAveraging")
            .edge("translationAveraging", "averagingMetrics")
            .edge("translationAveraging", "dataAssociation")
            .edge("dataAssociation", "associationOutput")
            .edge("dataAssociation", "bundleAdjustment")
            .edge("bundleAdjustment", "adjustmentOutput")
            .plate(
                Plate::new("Frontend")
                    .with_overlay(OverlayKind::FrontendSummary)
                    .with_members([
                        "detectorDescriptor",
                        "correspondenceGenerator",
                        "twoViewEstimator",
                        "frontendSummary",
                    ]),
            )
            .plate(
                Plate::new("Averaging")
                    .with_overlay(OverlayKind::AveragingMetrics)
                    .with_members([
                        "viewGraphEstimator",
                        "rotationAveraging",
                        "translationAveraging",
                        "averagingMetrics",
                    ]),
            )
            .plate(
                Plate::new("Data Association")
                    .with_overlay(association)
                    .with_members(["dataAssociation", "associationOutput"]),
            )
            .plate(
                Plate::new("Bundle Adjustment")
                    .with_overlay(adjustment)
                    .with_members(["bundleAdjustment", "adjustmentOutput"]),
            )
            .build();

        match model {
            Ok(model) => model,
            Err(err) => unreachable!("built-in pipeline is invalid: {err}"),
        }
    }
}
