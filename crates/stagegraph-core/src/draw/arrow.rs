//! Directed connectors between node anchors.

use std::{fmt, rc::Rc, str::FromStr};

use serde::Deserialize;
use svg::node::element as svg_element;
use thiserror::Error;

use crate::{
    color::Color,
    draw::{LayeredOutput, RenderLayer},
    geometry::Point,
};

/// Path shape of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    #[default]
    Straight,
    Orthogonal,
    Curved,
}

/// Returned when an arrow style name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown arrow style `{0}` (expected straight, orthogonal or curved)")]
pub struct ParseArrowStyleError(String);

impl FromStr for ArrowStyle {
    type Err = ParseArrowStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "straight" => Ok(Self::Straight),
            "orthogonal" => Ok(Self::Orthogonal),
            "curved" => Ok(Self::Curved),
            other => Err(ParseArrowStyleError(other.to_string())),
        }
    }
}

impl fmt::Display for ArrowStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Straight => "straight",
            Self::Orthogonal => "orthogonal",
            Self::Curved => "curved",
        };
        f.write_str(name)
    }
}

/// Stroke settings for connectors.
#[derive(Debug, Clone)]
pub struct ArrowDefinition {
    color: Color,
    width: f32,
    style: ArrowStyle,
}

impl ArrowDefinition {
    pub fn new(color: Color, width: f32, style: ArrowStyle) -> Self {
        Self {
            color,
            width,
            style,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// A directed connector. The head marker sits at the target end.
#[derive(Debug, Clone)]
pub struct Arrow {
    definition: Rc<ArrowDefinition>,
}

impl Arrow {
    pub fn new(definition: Rc<ArrowDefinition>) -> Self {
        Self { definition }
    }

    /// Path data for a connector from `start` to `end` in the given style.
    pub fn path_data(start: Point, end: Point, style: ArrowStyle) -> String {
        match style {
            ArrowStyle::Straight => {
                format!("M {} {} L {} {}", start.x(), start.y(), end.x(), end.y())
            }
            ArrowStyle::Orthogonal => {
                let mid = start.midpoint(end);
                let distance = end.sub_point(start).abs();
                if distance.x() >= distance.y() {
                    format!(
                        "M {} {} L {} {} L {} {} L {} {}",
                        start.x(),
                        start.y(),
                        mid.x(),
                        start.y(),
                        mid.x(),
                        end.y(),
                        end.x(),
                        end.y()
                    )
                } else {
                    format!(
                        "M {} {} L {} {} L {} {} L {} {}",
                        start.x(),
                        start.y(),
                        start.x(),
                        mid.y(),
                        end.x(),
                        mid.y(),
                        end.x(),
                        end.y()
                    )
                }
            }
            ArrowStyle::Curved => {
                // Horizontal tangents at both ends, matching a left-to-right flow.
                let bend = (end.x() - start.x()) / 2.0;
                format!(
                    "M {} {} C {} {}, {} {}, {} {}",
                    start.x(),
                    start.y(),
                    start.x() + bend,
                    start.y(),
                    end.x() - bend,
                    end.y(),
                    end.x(),
                    end.y()
                )
            }
        }
    }

    /// Renders the connector with `data-source`/`data-target` naming its anchors.
    pub fn render(
        &self,
        source_anchor: &str,
        target_anchor: &str,
        start: Point,
        end: Point,
    ) -> LayeredOutput {
        let color = self.definition.color;
        let path = svg_element::Path::new()
            .set("class", "edge")
            .set("data-source", source_anchor)
            .set("data-target", target_anchor)
            .set("d", Self::path_data(start, end, self.definition.style))
            .set("fill", "none")
            .set("stroke", color.to_string())
            .set("stroke-opacity", color.alpha())
            .set("stroke-width", self.definition.width)
            .set("marker-end", format!("url(#{})", marker_id(color)));

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Edge, Box::new(path));
        output
    }
}

fn marker_id(color: Color) -> String {
    format!("arrow-head-{}", color.to_id_safe_string())
}

/// Draws connectors and remembers which head markers they reference.
#[derive(Debug, Default)]
pub struct ArrowDrawer {
    colors: Vec<Color>,
}

impl ArrowDrawer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `arrow` and registers its marker color.
    pub fn draw(
        &mut self,
        arrow: &Arrow,
        source_anchor: &str,
        target_anchor: &str,
        start: Point,
        end: Point,
    ) -> LayeredOutput {
        let color = arrow.definition.color;
        if !self.colors.contains(&color) {
            self.colors.push(color);
        }
        arrow.render(source_anchor, target_anchor, start, end)
    }

    /// One `<marker>` per color used by drawn connectors.
    pub fn marker_definitions(&self) -> svg_element::Definitions {
        self.colors
            .iter()
            .fold(svg_element::Definitions::new(), |defs, color| {
                defs.add(
                    svg_element::Marker::new()
                        .set("id", marker_id(*color))
                        .set("viewBox", "0 0 10 10")
                        .set("refX", 9)
                        .set("refY", 5)
                        .set("markerWidth", 7)
                        .set("markerHeight", 7)
                        .set("orient", "auto")
                        .add(
                            svg_element::Path::new()
                                .set("d", "M 0 0 L 10 5 L 0 10 z")
                                .set("fill", color.to_string())
                                .set("fill-opacity", color.alpha()),
                        ),
                )
            })
    }
}
