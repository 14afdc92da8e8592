//! Overlay panels: popups drawn above the graph to show bound result data.

use std::rc::Rc;

use svg::node::element as svg_element;

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, Text, TextDefinition},
    geometry::{Point, Size},
};

/// A projected point of a point cloud, relative to the top-left corner of
/// the panel body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterDot {
    pub x: f32,
    pub y: f32,
    pub rgb: [u8; 3],
}

/// Content shown under the panel header.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    /// Key/value rows.
    Table(Vec<(String, String)>),
    /// A scatter plot filling a body of the given size.
    Scatter { size: Size, dots: Vec<ScatterDot> },
    /// A single line of text.
    Message(String),
}

/// Styling for overlay panels.
#[derive(Debug, Clone)]
pub struct PanelDefinition {
    background: Color,
    border: Color,
    header_fill: Color,
    title: TextDefinition,
    text: TextDefinition,
    padding: f32,
    point_radius: f32,
}

impl PanelDefinition {
    pub fn new(
        background: Color,
        border: Color,
        header_fill: Color,
        title: TextDefinition,
        text: TextDefinition,
    ) -> Self {
        Self {
            background,
            border,
            header_fill,
            title,
            text,
            padding: 12.0,
            point_radius: 1.5,
        }
    }

    pub fn with_point_radius(mut self, radius: f32) -> Self {
        self.point_radius = radius;
        self
    }

    /// Inset of the panel body from the frame.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    fn header_height(&self) -> f32 {
        self.title.line_height() + self.padding
    }

    fn row_height(&self) -> f32 {
        self.text.line_height() + 4.0
    }
}

/// An overlay panel of fixed width.
#[derive(Debug, Clone)]
pub struct Panel {
    definition: Rc<PanelDefinition>,
    title: String,
    body: PanelBody,
    width: f32,
    attributes: Vec<(String, String)>,
}

impl Panel {
    pub fn new(
        definition: Rc<PanelDefinition>,
        title: impl Into<String>,
        body: PanelBody,
        width: f32,
    ) -> Self {
        Self {
            definition,
            title: title.into(),
            body,
            width,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    fn body_height(&self) -> f32 {
        match &self.body {
            PanelBody::Table(rows) => rows.len().max(1) as f32 * self.definition.row_height(),
            PanelBody::Scatter { size, .. } => size.height(),
            PanelBody::Message(_) => self.definition.row_height(),
        }
    }

    fn render_body(&self, mut group: svg_element::Group, body_origin: Point) -> svg_element::Group {
        let definition = &self.definition;
        let row_height = definition.row_height();
        let inner_width = self.width - 2.0 * definition.padding;

        match &self.body {
            PanelBody::Table(rows) => {
                for (index, (key, value)) in rows.iter().enumerate() {
                    let y = body_origin.y() + row_height * (index as f32 + 0.5);
                    let key_text = Text::new(definition.text.clone(), key.as_str());
                    let value_text = Text::new(definition.text.clone(), value.as_str());
                    group = group
                        .add(key_text.to_svg(Point::new(body_origin.x(), y), "start"))
                        .add(value_text.to_svg(Point::new(body_origin.x() + inner_width, y), "end"));
                }
            }
            PanelBody::Scatter { dots, .. } => {
                for dot in dots {
                    let [r, g, b] = dot.rgb;
                    group = group.add(
                        svg_element::Circle::new()
                            .set("cx", body_origin.x() + dot.x)
                            .set("cy", body_origin.y() + dot.y)
                            .set("r", definition.point_radius)
                            .set("fill", format!("rgb({r},{g},{b})")),
                    );
                }
            }
            PanelBody::Message(message) => {
                let text = Text::new(definition.text.clone(), message.as_str());
                group = group.add(text.to_svg(
                    Point::new(body_origin.x(), body_origin.y() + row_height / 2.0),
                    "start",
                ));
            }
        }

        group
    }
}

impl Drawable for Panel {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let definition = &self.definition;
        let bounds = position.to_bounds(self.size());
        let header_height = definition.header_height();

        let mut group = svg_element::Group::new().set("class", "overlay");
        for (name, value) in &self.attributes {
            group = group.set(name.as_str(), value.as_str());
        }

        let frame = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", 8)
            .set("fill", definition.background.to_string())
            .set("fill-opacity", definition.background.alpha())
            .set("stroke", definition.border.to_string());

        let header = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", header_height)
            .set("rx", 8)
            .set("fill", definition.header_fill.to_string());

        let title = Text::new(definition.title.clone(), self.title.as_str()).to_svg(
            Point::new(
                bounds.min_x() + definition.padding,
                bounds.min_y() + header_height / 2.0,
            ),
            "start",
        );

        let dismiss = Text::new(definition.title.clone(), "×").to_svg(
            Point::new(
                bounds.max_x() - definition.padding,
                bounds.min_y() + header_height / 2.0,
            ),
            "end",
        );

        group = group
            .add(frame)
            .add(header)
            .add(title)
            .add(dismiss.set("class", "dismiss"));

        let body_origin = Point::new(
            bounds.min_x() + definition.padding,
            bounds.min_y() + header_height + definition.padding / 2.0,
        );
        let group = self.render_body(group, body_origin);

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Overlay, Box::new(group));
        output
    }

    fn size(&self) -> Size {
        let definition = &self.definition;
        Size::new(
            self.width,
            definition.header_height() + self.body_height() + 1.5 * definition.padding,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> Rc<PanelDefinition> {
        Rc::new(PanelDefinition::new(
            Color::new("white").unwrap(),
            Color::new("gray").unwrap(),
            Color::new("#dde").unwrap(),
            TextDefinition::new("sans-serif", 14.0).with_bold(true),
            TextDefinition::new("sans-serif", 12.0),
        ))
    }

    #[test]
    fn test_table_rows_grow_panel() {
        let one = Panel::new(
            definition(),
            "Frontend Summary",
            PanelBody::Table(vec![("a".into(), "1".into())]),
            320.0,
        );
        let three = Panel::new(
            definition(),
            "Frontend Summary",
            PanelBody::Table(vec![
                ("a".into(), "1".into()),
                ("b".into(), "2".into()),
                ("c".into(), "3".into()),
            ]),
            320.0,
        );
        assert!(three.size().height() > one.size().height());
        assert_eq!(one.size().width(), 320.0);
    }

    #[test]
    fn test_table_renders_keys_and_values() {
        let panel = Panel::new(
            definition(),
            "Frontend Summary",
            PanelBody::Table(vec![("pair_0_1.inlier_ratio".into(), "0.92".into())]),
            320.0,
        )
        .with_attribute("data-overlay", "frontend_summary");

        let groups = panel.render_to_layers(Point::new(200.0, 100.0)).render();
        let svg = groups[0].to_string();
        assert!(svg.contains("data-layer=\"overlay\""));
        assert!(svg.contains("pair_0_1.inlier_ratio"));
        assert!(svg.contains("0.92"));
        assert!(svg.contains("class=\"dismiss\""));
    }

    #[test]
    fn test_scatter_renders_one_circle_per_dot() {
        let dots = vec![
            ScatterDot {
                x: 1.0,
                y: 2.0,
                rgb: [255, 0, 0],
            },
            ScatterDot {
                x: 3.0,
                y: 4.0,
                rgb: [0, 255, 0],
            },
        ];
        let panel = Panel::new(
            definition(),
            "Associated Points",
            PanelBody::Scatter {
                size: Size::new(200.0, 150.0),
                dots,
            },
            224.0,
        );

        let svg = panel.render_to_layers(Point::new(0.0, 0.0)).render()[0].to_string();
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("rgb(255,0,0)"));
    }
}
