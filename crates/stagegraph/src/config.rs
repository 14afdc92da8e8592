//! Configuration types for dashboard rendering.
//!
//! All types implement [`serde::Deserialize`] and every field has a default,
//! so a configuration file only needs the values it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Node sizes, spacing and margins.
//! - [`StyleConfig`] - Colors, fonts and the edge style.
//! - [`ViewerConfig`] - Overlay panel and point-cloud settings.
//!
//! # Example
//!
//! ```
//! # use stagegraph::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.style().node_fill().is_ok());
//! assert_eq!(config.viewer().max_points(), 4000);
//! ```

use serde::Deserialize;

use stagegraph_core::{
    color::Color,
    draw::ArrowStyle,
    geometry::{Insets, Size},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    viewer: ViewerConfig,
}

impl AppConfig {
    pub fn new(layout: LayoutConfig, style: StyleConfig, viewer: ViewerConfig) -> Self {
        Self {
            layout,
            style,
            viewer,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn viewer(&self) -> &ViewerConfig {
        &self.viewer
    }
}

/// Sizes and spacing used by the layout pass and the scene.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    node_min_width: f32,
    node_min_height: f32,
    node_padding: f32,
    /// Horizontal gap between layout columns.
    column_spacing: f32,
    /// Vertical gap between nodes in one column.
    row_spacing: f32,
    plate_padding: f32,
    /// Gap between the graph and the overlay panels.
    panel_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_min_width: 120.0,
            node_min_height: 44.0,
            node_padding: 12.0,
            column_spacing: 80.0,
            row_spacing: 40.0,
            plate_padding: 18.0,
            panel_gap: 60.0,
        }
    }
}

impl LayoutConfig {
    pub fn node_min_size(&self) -> Size {
        Size::new(self.node_min_width, self.node_min_height)
    }

    pub fn node_padding(&self) -> Insets {
        Insets::uniform(self.node_padding)
    }

    pub fn column_spacing(&self) -> f32 {
        self.column_spacing
    }

    pub fn row_spacing(&self) -> f32 {
        self.row_spacing
    }

    pub fn plate_padding(&self) -> Insets {
        Insets::uniform(self.plate_padding)
    }

    pub fn panel_gap(&self) -> f32 {
        self.panel_gap
    }
}

/// Visual styling. Colors are CSS color strings parsed on access.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    background_color: Option<String>,
    node_fill: String,
    node_stroke: String,
    trigger_fill: String,
    trigger_stroke: String,
    plate_fill: String,
    plate_stroke: String,
    edge_color: String,
    text_color: String,
    panel_fill: String,
    font_family: String,
    font_size: f32,
    edge_style: ArrowStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            node_fill: "#f7f9fc".to_string(),
            node_stroke: "#4a5568".to_string(),
            trigger_fill: "#fff4e0".to_string(),
            trigger_stroke: "#c97a00".to_string(),
            plate_fill: "#eaf1fb".to_string(),
            plate_stroke: "#8fa8cc".to_string(),
            edge_color: "#4a5568".to_string(),
            text_color: "#1a202c".to_string(),
            panel_fill: "white".to_string(),
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 14.0,
            edge_style: ArrowStyle::Straight,
        }
    }
}

fn parse_color(field: &str, value: &str) -> Result<Color, String> {
    Color::new(value).map_err(|err| format!("Invalid {field} in config: {err}"))
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_deref()
            .map(|color| parse_color("background color", color))
            .transpose()
    }

    pub fn node_fill(&self) -> Result<Color, String> {
        parse_color("node fill", &self.node_fill)
    }

    pub fn node_stroke(&self) -> Result<Color, String> {
        parse_color("node stroke", &self.node_stroke)
    }

    pub fn trigger_fill(&self) -> Result<Color, String> {
        parse_color("trigger fill", &self.trigger_fill)
    }

    pub fn trigger_stroke(&self) -> Result<Color, String> {
        parse_color("trigger stroke", &self.trigger_stroke)
    }

    pub fn plate_fill(&self) -> Result<Color, String> {
        parse_color("plate fill", &self.plate_fill)
    }

    pub fn plate_stroke(&self) -> Result<Color, String> {
        parse_color("plate stroke", &self.plate_stroke)
    }

    pub fn edge_color(&self) -> Result<Color, String> {
        parse_color("edge color", &self.edge_color)
    }

    pub fn text_color(&self) -> Result<Color, String> {
        parse_color("text color", &self.text_color)
    }

    pub fn panel_fill(&self) -> Result<Color, String> {
        parse_color("panel fill", &self.panel_fill)
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn edge_style(&self) -> ArrowStyle {
        self.edge_style
    }
}

/// Overlay panels and the point-cloud projection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    panel_width: f32,
    /// Height of the point-cloud drawing area.
    cloud_height: f32,
    point_radius: f32,
    /// Points beyond this count are subsampled with a fixed stride.
    max_points: usize,
    /// Camera rotation about the vertical axis, in degrees.
    yaw_degrees: f32,
    /// Camera elevation, in degrees.
    pitch_degrees: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            panel_width: 380.0,
            cloud_height: 300.0,
            point_radius: 1.5,
            max_points: 4000,
            yaw_degrees: 30.0,
            pitch_degrees: 20.0,
        }
    }
}

impl ViewerConfig {
    pub fn panel_width(&self) -> f32 {
        self.panel_width
    }

    /// Size of the point-cloud drawing area inside a panel.
    pub fn cloud_size(&self) -> Size {
        Size::new(self.panel_width, self.cloud_height)
    }

    pub fn point_radius(&self) -> f32 {
        self.point_radius
    }

    pub fn max_points(&self) -> usize {
        self.max_points.max(1)
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw_degrees
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch_degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_colors_parse() {
        let style = StyleConfig::default();

        assert!(style.background_color().unwrap().is_none());
        for color in [
            style.node_fill(),
            style.node_stroke(),
            style.trigger_fill(),
            style.trigger_stroke(),
            style.plate_fill(),
            style.plate_stroke(),
            style.edge_color(),
            style.text_color(),
            style.panel_fill(),
        ] {
            assert!(color.is_ok());
        }
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r##"
            [style]
            background_color = "#ffffff"
            edge_style = "curved"

            [viewer]
            max_points = 0
            "##,
        )
        .unwrap();

        assert!(config.style().background_color().unwrap().is_some());
        assert_eq!(config.style().edge_style(), ArrowStyle::Curved);
        assert_eq!(config.style().font_size(), 14.0);
        assert_eq!(config.viewer().max_points(), 1);
        assert_eq!(config.layout().column_spacing(), 80.0);
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let config: AppConfig = toml::from_str("[style]\nnode_fill = \"not-a-color\"\n").unwrap();

        let err = config.style().node_fill().unwrap_err();
        assert!(err.contains("node fill"));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(toml::from_str::<AppConfig>("[theme]\nname = \"dark\"\n").is_err());
    }
}
