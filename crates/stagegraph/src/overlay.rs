//! Overlay kinds and the visibility state machine that guards them.
//!
//! Every overlay kind is an independent two-state machine:
//!
//! ```text
//!            request (data Ready)
//!   Hidden ─────────────────────────► Shown
//!     ▲                                 │
//!     └──────────── dismiss ────────────┘
//! ```
//!
//! A request whose data is not ready leaves the state untouched and reports
//! [`Transition::Suppressed`]. Showing one kind never changes another.

use std::{collections::BTreeMap, fmt, str::FromStr};

use log::{debug, info};

use crate::metrics::DocumentName;

/// The two point-cloud artifacts a pipeline run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointCloudArtifact {
    /// Points after data association, before global optimization.
    AssociationOutput,
    /// Points after bundle adjustment.
    AdjustmentOutput,
}

impl PointCloudArtifact {
    pub const ALL: [PointCloudArtifact; 2] = [Self::AssociationOutput, Self::AdjustmentOutput];

    /// Stable artifact name.
    pub fn name(self) -> &'static str {
        match self {
            Self::AssociationOutput => "association-output",
            Self::AdjustmentOutput => "adjustment-output",
        }
    }

    /// Human readable title used for overlay headers.
    pub fn title(self) -> &'static str {
        match self {
            Self::AssociationOutput => "Associated Points (before BA)",
            Self::AdjustmentOutput => "Adjusted Points (after BA)",
        }
    }
}

impl FromStr for PointCloudArtifact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|artifact| artifact.name() == s)
            .ok_or_else(|| format!("unknown point cloud artifact `{s}`"))
    }
}

/// A kind of result overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverlayKind {
    FrontendSummary,
    AveragingMetrics,
    PointCloud(PointCloudArtifact),
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 4] = [
        Self::FrontendSummary,
        Self::AveragingMetrics,
        Self::PointCloud(PointCloudArtifact::AssociationOutput),
        Self::PointCloud(PointCloudArtifact::AdjustmentOutput),
    ];

    /// Metric documents whose presence gates this overlay.
    ///
    /// Point-cloud overlays are gated by their artifact instead and return
    /// an empty slice.
    pub fn bound_documents(self) -> &'static [DocumentName] {
        match self {
            Self::FrontendSummary => &[DocumentName::FrontendSummary],
            Self::AveragingMetrics => &[
                DocumentName::RotationAveraging,
                DocumentName::TranslationAveraging,
            ],
            Self::PointCloud(_) => &[],
        }
    }

    /// Title used for the overlay header.
    pub fn title(self) -> &'static str {
        match self {
            Self::FrontendSummary => "Frontend Summary",
            Self::AveragingMetrics => "Averaging Metrics",
            Self::PointCloud(artifact) => artifact.title(),
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontendSummary => f.write_str("frontend_summary"),
            Self::AveragingMetrics => f.write_str("averaging_metrics"),
            Self::PointCloud(artifact) => write!(f, "point_cloud:{}", artifact.name()),
        }
    }
}

impl FromStr for OverlayKind {
    type Err = String;

    /// Parses `frontend_summary`, `averaging_metrics` or
    /// `point_cloud:<artifact>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frontend_summary" => Ok(Self::FrontendSummary),
            "averaging_metrics" => Ok(Self::AveragingMetrics),
            other => match other.strip_prefix("point_cloud:") {
                Some(artifact) => artifact.parse().map(Self::PointCloud),
                None => Err(format!("unknown overlay kind `{other}`")),
            },
        }
    }
}

/// Whether the data bound to an overlay can be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Every bound input is present.
    Ready,
    /// At least one bound input is still loading.
    Loading,
    /// A bound input failed to load or does not exist; this is permanent.
    Unavailable,
}

impl Availability {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ready => "available",
            Self::Loading => "loading",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Source of truth for the `request` guard.
pub trait OverlayData {
    /// Availability of the data bound to `kind`.
    fn availability(&self, kind: OverlayKind) -> Availability;
}

/// Visibility of one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Shown,
}

/// Result of a `request` or `dismiss` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Hidden → Shown.
    Shown,
    /// Shown → Hidden.
    Hidden,
    /// The overlay was already in the target state.
    Unchanged,
    /// The guard rejected the request; the overlay stays Hidden.
    Suppressed(Availability),
}

impl Transition {
    /// Returns `true` if the call changed the visibility.
    pub fn changed(self) -> bool {
        matches!(self, Self::Shown | Self::Hidden)
    }
}

/// Owns the visibility of every overlay kind.
#[derive(Debug, Clone)]
pub struct OverlayController {
    states: BTreeMap<OverlayKind, Visibility>,
}

impl Default for OverlayController {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayController {
    /// Creates a controller with every overlay Hidden.
    pub fn new() -> Self {
        Self {
            states: OverlayKind::ALL
                .into_iter()
                .map(|kind| (kind, Visibility::Hidden))
                .collect(),
        }
    }

    pub fn visibility(&self, kind: OverlayKind) -> Visibility {
        self.states.get(&kind).copied().unwrap_or_default()
    }

    pub fn is_shown(&self, kind: OverlayKind) -> bool {
        self.visibility(kind) == Visibility::Shown
    }

    /// Overlays currently Shown, in [`OverlayKind`] order.
    pub fn shown(&self) -> impl Iterator<Item = OverlayKind> + '_ {
        self.states
            .iter()
            .filter(|(_, visibility)| **visibility == Visibility::Shown)
            .map(|(kind, _)| *kind)
    }

    /// Asks to show `kind`.
    ///
    /// The guard is evaluated before any state change: unless `data`
    /// reports [`Availability::Ready`] the call is a no-op.
    pub fn request(&mut self, kind: OverlayKind, data: &(impl OverlayData + ?Sized)) -> Transition {
        if self.is_shown(kind) {
            return Transition::Unchanged;
        }

        match data.availability(kind) {
            Availability::Ready => {
                self.states.insert(kind, Visibility::Shown);
                info!(overlay = kind.to_string(); "Overlay shown");
                Transition::Shown
            }
            availability => {
                debug!(
                    overlay = kind.to_string(),
                    availability = availability.name();
                    "Overlay request suppressed"
                );
                Transition::Suppressed(availability)
            }
        }
    }

    /// Hides `kind`. Dismissing a Hidden overlay is a no-op.
    pub fn dismiss(&mut self, kind: OverlayKind) -> Transition {
        if !self.is_shown(kind) {
            return Transition::Unchanged;
        }

        self.states.insert(kind, Visibility::Hidden);
        info!(overlay = kind.to_string(); "Overlay dismissed");
        Transition::Hidden
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct FixedData(HashMap<OverlayKind, Availability>);

    impl FixedData {
        fn all(availability: Availability) -> Self {
            Self(
                OverlayKind::ALL
                    .into_iter()
                    .map(|kind| (kind, availability))
                    .collect(),
            )
        }

        fn with(mut self, kind: OverlayKind, availability: Availability) -> Self {
            self.0.insert(kind, availability);
            self
        }
    }

    impl OverlayData for FixedData {
        fn availability(&self, kind: OverlayKind) -> Availability {
            self.0[&kind]
        }
    }

    const ASSOCIATION: OverlayKind = OverlayKind::PointCloud(PointCloudArtifact::AssociationOutput);
    const ADJUSTMENT: OverlayKind = OverlayKind::PointCloud(PointCloudArtifact::AdjustmentOutput);

    #[test]
    fn test_initial_state_all_hidden() {
        let controller = OverlayController::new();
        for kind in OverlayKind::ALL {
            assert_eq!(controller.visibility(kind), Visibility::Hidden);
        }
        assert_eq!(controller.shown().count(), 0);
    }

    #[test]
    fn test_request_suppressed_while_loading() {
        let mut controller = OverlayController::new();
        let data = FixedData::all(Availability::Loading);

        let transition = controller.request(OverlayKind::FrontendSummary, &data);

        assert_eq!(transition, Transition::Suppressed(Availability::Loading));
        assert!(!transition.changed());
        assert_eq!(
            controller.visibility(OverlayKind::FrontendSummary),
            Visibility::Hidden
        );
    }

    #[test]
    fn test_request_shows_once_ready() {
        let mut controller = OverlayController::new();

        let loading = FixedData::all(Availability::Loading);
        controller.request(OverlayKind::FrontendSummary, &loading);
        assert!(!controller.is_shown(OverlayKind::FrontendSummary));

        let ready = loading.with(OverlayKind::FrontendSummary, Availability::Ready);
        assert_eq!(
            controller.request(OverlayKind::FrontendSummary, &ready),
            Transition::Shown
        );
        assert!(controller.is_shown(OverlayKind::FrontendSummary));

        assert_eq!(
            controller.request(OverlayKind::FrontendSummary, &ready),
            Transition::Unchanged
        );
    }

    #[test]
    fn test_request_suppressed_when_unavailable() {
        let mut controller = OverlayController::new();
        let data = FixedData::all(Availability::Unavailable);

        assert_eq!(
            controller.request(OverlayKind::AveragingMetrics, &data),
            Transition::Suppressed(Availability::Unavailable)
        );
        assert!(!controller.is_shown(OverlayKind::AveragingMetrics));
    }

    #[test]
    fn test_dismiss_hidden_is_noop() {
        let mut controller = OverlayController::new();

        assert_eq!(
            controller.dismiss(OverlayKind::AveragingMetrics),
            Transition::Unchanged
        );
        assert_eq!(
            controller.visibility(OverlayKind::AveragingMetrics),
            Visibility::Hidden
        );
    }

    #[test]
    fn test_dismiss_shown_hides() {
        let mut controller = OverlayController::new();
        let data = FixedData::all(Availability::Ready);

        controller.request(OverlayKind::AveragingMetrics, &data);
        assert_eq!(
            controller.dismiss(OverlayKind::AveragingMetrics),
            Transition::Hidden
        );
        assert_eq!(
            controller.dismiss(OverlayKind::AveragingMetrics),
            Transition::Unchanged
        );
    }

    #[test]
    fn test_overlays_are_independent() {
        let mut controller = OverlayController::new();
        let data = FixedData::all(Availability::Ready);

        controller.request(ADJUSTMENT, &data);
        controller.request(ASSOCIATION, &data);
        assert!(controller.is_shown(ADJUSTMENT));
        assert!(controller.is_shown(ASSOCIATION));
        assert!(!controller.is_shown(OverlayKind::FrontendSummary));

        controller.dismiss(ASSOCIATION);
        assert!(controller.is_shown(ADJUSTMENT));
        assert!(!controller.is_shown(ASSOCIATION));

        let shown: Vec<_> = controller.shown().collect();
        assert_eq!(shown, vec![ADJUSTMENT]);
    }

    #[test]
    fn test_overlay_kind_names_round_trip() {
        for kind in OverlayKind::ALL {
            assert_eq!(kind.to_string().parse::<OverlayKind>(), Ok(kind));
        }
        assert_eq!(
            "point_cloud:association-output".parse::<OverlayKind>(),
            Ok(ASSOCIATION)
        );
        assert!("point_cloud:mesh".parse::<OverlayKind>().is_err());
        assert!("summary".parse::<OverlayKind>().is_err());
    }

    #[test]
    fn test_bound_documents() {
        assert_eq!(
            OverlayKind::FrontendSummary.bound_documents(),
            &[DocumentName::FrontendSummary]
        );
        assert_eq!(OverlayKind::AveragingMetrics.bound_documents().len(), 2);
        assert!(ADJUSTMENT.bound_documents().is_empty());
    }
}
