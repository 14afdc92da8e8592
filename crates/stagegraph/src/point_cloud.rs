//! Point-cloud artifacts and the viewer that shows them.
//!
//! A pipeline run leaves two point clouds behind, one after data association
//! and one after bundle adjustment. [`ColmapDirectory`] reads them from the
//! COLMAP text models under `<results>/ba_input` and `<results>/ba_output`.
//!
//! [`PointCloudViewer`] owns a cloud only while its overlay is Shown. Hiding
//! the overlay drops the cloud together with its camera, so showing it again
//! starts from a fresh acquisition and the default camera.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use thiserror::Error;

use stagegraph_core::{draw::ScatterDot, geometry::Size};

use crate::{
    config::ViewerConfig,
    overlay::{PointCloudArtifact, Visibility},
};

/// File name of the COLMAP point table.
pub const POINTS3D_FILE: &str = "points3D.txt";

/// Inset of the projected cloud inside its drawing area.
const MARGIN: f32 = 8.0;

#[derive(Debug, Error)]
pub enum PointCloudError {
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("artifact `{}` is not available", .0.name())]
    Missing(PointCloudArtifact),
}

/// A colored 3-D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub position: [f32; 3],
    pub rgb: [u8; 3],
}

/// The points of one artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    artifact: PointCloudArtifact,
    points: Vec<CloudPoint>,
}

impl PointCloud {
    pub fn new(artifact: PointCloudArtifact, points: Vec<CloudPoint>) -> Self {
        Self { artifact, points }
    }

    pub fn artifact(&self) -> PointCloudArtifact {
        self.artifact
    }

    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Parses a COLMAP `points3D.txt` table.
///
/// Each data line is `POINT3D_ID X Y Z R G B ERROR TRACK...`; lines starting
/// with `#` and blank lines are skipped. Only position and color are kept.
///
/// # Errors
///
/// Returns [`PointCloudError::Parse`] with the 1-based line number of the
/// first malformed line.
pub fn parse_points3d(text: &str) -> Result<Vec<CloudPoint>, PointCloudError> {
    let mut points = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parse_error = |message: String| PointCloudError::Parse {
            line: index + 1,
            message,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            return Err(parse_error(format!(
                "expected at least 8 fields, found {}",
                fields.len()
            )));
        }

        let mut position = [0.0f32; 3];
        for (axis, field) in position.iter_mut().zip(&fields[1..4]) {
            *axis = field
                .parse()
                .map_err(|_| parse_error(format!("invalid coordinate `{field}`")))?;
        }
        let mut rgb = [0u8; 3];
        for (channel, field) in rgb.iter_mut().zip(&fields[4..7]) {
            *channel = field
                .parse()
                .map_err(|_| parse_error(format!("invalid color channel `{field}`")))?;
        }

        points.push(CloudPoint { position, rgb });
    }

    Ok(points)
}

/// Where point clouds come from.
pub trait PointCloudSource {
    /// Returns `true` if `artifact` can be acquired.
    fn contains(&self, artifact: PointCloudArtifact) -> bool;

    /// Loads `artifact`.
    fn acquire(&self, artifact: PointCloudArtifact) -> Result<PointCloud, PointCloudError>;
}

/// A results directory holding COLMAP text models.
#[derive(Debug, Clone)]
pub struct ColmapDirectory {
    root: PathBuf,
}

impl ColmapDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the point table of `artifact`.
    pub fn points_path(&self, artifact: PointCloudArtifact) -> PathBuf {
        let model = match artifact {
            PointCloudArtifact::AssociationOutput => "ba_input",
            PointCloudArtifact::AdjustmentOutput => "ba_output",
        };
        self.root.join(model).join(POINTS3D_FILE)
    }
}

impl PointCloudSource for ColmapDirectory {
    fn contains(&self, artifact: PointCloudArtifact) -> bool {
        self.points_path(artifact).is_file()
    }

    fn acquire(&self, artifact: PointCloudArtifact) -> Result<PointCloud, PointCloudError> {
        let path = self.points_path(artifact);
        let text = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => PointCloudError::Missing(artifact),
            _ => PointCloudError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let points = parse_points3d(&text)?;
        debug!(artifact = artifact.name(), points = points.len(); "Point cloud read");
        Ok(PointCloud::new(artifact, points))
    }
}

/// Orthographic camera orbiting the cloud centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Rotation about the vertical axis, in degrees.
    pub yaw: f32,
    /// Elevation, in degrees.
    pub pitch: f32,
}

impl Camera {
    fn rotate(self, [x, y, z]: [f32; 3]) -> (f32, f32) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();

        let x1 = x * cos_yaw + z * sin_yaw;
        let z1 = -x * sin_yaw + z * cos_yaw;
        let y1 = y * cos_pitch - z1 * sin_pitch;
        (x1, y1)
    }
}

/// What a [`PointCloudViewer::sync`] call did.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Mounted { points: usize },
    Released,
    /// Acquisition failed; the viewer shows the message instead.
    Failed(String),
    Unchanged,
}

#[derive(Debug)]
struct MountedCloud {
    cloud: PointCloud,
    camera: Camera,
}

/// Renders point clouds whose overlay is Shown.
#[derive(Debug)]
pub struct PointCloudViewer {
    default_camera: Camera,
    max_points: usize,
    mounted: BTreeMap<PointCloudArtifact, MountedCloud>,
    failures: BTreeMap<PointCloudArtifact, String>,
}

impl PointCloudViewer {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            default_camera: Camera {
                yaw: config.yaw_degrees(),
                pitch: config.pitch_degrees(),
            },
            max_points: config.max_points(),
            mounted: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }

    /// Brings the viewer for `artifact` in line with its overlay visibility.
    ///
    /// Shown mounts the cloud (acquiring it from `source`); Hidden releases
    /// it. Calls that match the current state do nothing.
    pub fn sync(
        &mut self,
        artifact: PointCloudArtifact,
        visibility: Visibility,
        source: &dyn PointCloudSource,
    ) -> ViewerEvent {
        match visibility {
            Visibility::Shown if self.is_active(artifact) => ViewerEvent::Unchanged,
            Visibility::Shown => match source.acquire(artifact) {
                Ok(cloud) => {
                    let points = cloud.len();
                    info!(artifact = artifact.name(), points = points; "Point cloud mounted");
                    self.mounted.insert(
                        artifact,
                        MountedCloud {
                            cloud,
                            camera: self.default_camera,
                        },
                    );
                    ViewerEvent::Mounted { points }
                }
                Err(err) => {
                    warn!(artifact = artifact.name(), err:err; "Point cloud unavailable");
                    let message = err.to_string();
                    self.failures.insert(artifact, message.clone());
                    ViewerEvent::Failed(message)
                }
            },
            Visibility::Hidden => {
                let released = self.mounted.remove(&artifact).is_some();
                let cleared = self.failures.remove(&artifact).is_some();
                if released || cleared {
                    debug!(artifact = artifact.name(); "Point cloud released");
                    ViewerEvent::Released
                } else {
                    ViewerEvent::Unchanged
                }
            }
        }
    }

    fn is_active(&self, artifact: PointCloudArtifact) -> bool {
        self.mounted.contains_key(&artifact) || self.failures.contains_key(&artifact)
    }

    pub fn is_mounted(&self, artifact: PointCloudArtifact) -> bool {
        self.mounted.contains_key(&artifact)
    }

    pub fn cloud(&self, artifact: PointCloudArtifact) -> Option<&PointCloud> {
        self.mounted.get(&artifact).map(|mounted| &mounted.cloud)
    }

    /// The acquisition error shown in place of the cloud, if any.
    pub fn failure(&self, artifact: PointCloudArtifact) -> Option<&str> {
        self.failures.get(&artifact).map(String::as_str)
    }

    pub fn camera(&self, artifact: PointCloudArtifact) -> Option<Camera> {
        self.mounted.get(&artifact).map(|mounted| mounted.camera)
    }

    /// Rotates the camera of a mounted cloud. Returns `false` if the cloud
    /// is not mounted.
    pub fn orbit(&mut self, artifact: PointCloudArtifact, yaw: f32, pitch: f32) -> bool {
        match self.mounted.get_mut(&artifact) {
            Some(mounted) => {
                mounted.camera.yaw += yaw;
                mounted.camera.pitch = (mounted.camera.pitch + pitch).clamp(-90.0, 90.0);
                true
            }
            None => false,
        }
    }

    /// Projects a mounted cloud into a drawing area of `size`.
    ///
    /// Clouds larger than the configured maximum are subsampled with a
    /// fixed stride, so the result is deterministic.
    pub fn project(&self, artifact: PointCloudArtifact, size: Size) -> Option<Vec<ScatterDot>> {
        let mounted = self.mounted.get(&artifact)?;
        let points = mounted.cloud.points();
        if points.is_empty() {
            return Some(Vec::new());
        }

        let count = points.len() as f32;
        let mut centroid = [0.0f32; 3];
        for point in points {
            for (sum, value) in centroid.iter_mut().zip(point.position) {
                *sum += value / count;
            }
        }

        let stride = points.len().div_ceil(self.max_points);
        let projected: Vec<(f32, f32, [u8; 3])> = points
            .iter()
            .step_by(stride)
            .map(|point| {
                let [x, y, z] = point.position;
                let relative = [x - centroid[0], y - centroid[1], z - centroid[2]];
                let (u, v) = mounted.camera.rotate(relative);
                (u, v, point.rgb)
            })
            .collect();

        let (mut min_u, mut max_u) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f32::INFINITY, f32::NEG_INFINITY);
        for (u, v, _) in &projected {
            min_u = min_u.min(*u);
            max_u = max_u.max(*u);
            min_v = min_v.min(*v);
            max_v = max_v.max(*v);
        }

        let usable_w = (size.width() - 2.0 * MARGIN).max(1.0);
        let usable_h = (size.height() - 2.0 * MARGIN).max(1.0);
        let span_u = max_u - min_u;
        let span_v = max_v - min_v;
        let scale = match (span_u > f32::EPSILON, span_v > f32::EPSILON) {
            (true, true) => (usable_w / span_u).min(usable_h / span_v),
            (true, false) => usable_w / span_u,
            (false, true) => usable_h / span_v,
            (false, false) => 1.0,
        };
        let mid_u = (min_u + max_u) / 2.0;
        let mid_v = (min_v + max_v) / 2.0;

        let dots = projected
            .into_iter()
            .map(|(u, v, rgb)| ScatterDot {
                x: size.width() / 2.0 + (u - mid_u) * scale,
                y: size.height() / 2.0 + (v - mid_v) * scale,
                rgb,
            })
            .collect();
        Some(dots)
    }
}
