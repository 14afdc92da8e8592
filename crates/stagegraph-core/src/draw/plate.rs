//! Plates: titled regions drawn behind the nodes of one pipeline stage.

use std::rc::Rc;

use svg::node::element as svg_element;

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, Text, TextDefinition},
    geometry::{Point, Size},
};

/// Styling for plate regions.
#[derive(Debug, Clone)]
pub struct PlateDefinition {
    fill: Color,
    stroke: Color,
    corner_radius: f32,
    title: TextDefinition,
}

impl PlateDefinition {
    pub fn new(fill: Color, stroke: Color, title: TextDefinition) -> Self {
        Self {
            fill,
            stroke,
            corner_radius: 10.0,
            title,
        }
    }

    pub fn title(&self) -> &TextDefinition {
        &self.title
    }

    /// Vertical room reserved above member nodes for the title.
    pub fn title_band(&self) -> f32 {
        self.title.line_height() + 8.0
    }
}

/// A plate of a given size; the position passed when rendering is its center.
#[derive(Debug, Clone)]
pub struct Plate {
    definition: Rc<PlateDefinition>,
    title: Text,
    size: Size,
    attributes: Vec<(String, String)>,
}

impl Plate {
    pub fn new(definition: Rc<PlateDefinition>, title: impl Into<String>, size: Size) -> Self {
        let title = Text::new(definition.title().clone(), title);
        Self {
            definition,
            title,
            size,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }
}

impl Drawable for Plate {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let bounds = position.to_bounds(self.size);
        let definition = &self.definition;

        let mut rect = svg_element::Rectangle::new()
            .set("class", "plate")
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", definition.corner_radius)
            .set("fill", definition.fill.to_string())
            .set("fill-opacity", definition.fill.alpha())
            .set("stroke", definition.stroke.to_string())
            .set("stroke-dasharray", "4,3");
        for (name, value) in &self.attributes {
            rect = rect.set(name.as_str(), value.as_str());
        }

        let title_position = Point::new(
            bounds.min_x() + 10.0,
            bounds.min_y() + definition.title_band() / 2.0,
        );

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Plate, Box::new(rect));
        output.add_to_layer(
            RenderLayer::Text,
            Box::new(self.title.to_svg(title_position, "start")),
        );
        output
    }

    fn size(&self) -> Size {
        self.size
    }
}
