//! Node boxes: the visual element mounted for every graph node.

use std::rc::Rc;

use svg::node::element as svg_element;

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, Text, TextDefinition},
    geometry::{Bounds, Insets, Point, Size},
};

/// Shared styling for a family of node boxes.
#[derive(Debug, Clone)]
pub struct NodeBoxDefinition {
    fill: Color,
    stroke: Color,
    stroke_width: f32,
    stroke_dasharray: Option<String>,
    corner_radius: f32,
    min_size: Size,
    padding: Insets,
    text: TextDefinition,
}

impl NodeBoxDefinition {
    pub fn new(fill: Color, stroke: Color, text: TextDefinition) -> Self {
        Self {
            fill,
            stroke,
            stroke_width: 1.5,
            stroke_dasharray: None,
            corner_radius: 6.0,
            min_size: Size::new(120.0, 44.0),
            padding: Insets::new(8.0, 14.0, 8.0, 14.0),
            text,
        }
    }

    pub fn with_min_size(mut self, min_size: Size) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }

    /// Dash pattern for the border, e.g. `"6,4"`.
    pub fn with_dasharray(mut self, pattern: impl Into<String>) -> Self {
        self.stroke_dasharray = Some(pattern.into());
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn text(&self) -> &TextDefinition {
        &self.text
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    /// Size of a box holding `label`: the label plus padding, never smaller
    /// than the minimum size.
    pub fn measure(&self, label: &str) -> Size {
        Text::new(self.text.clone(), label)
            .size()
            .add_padding(self.padding)
            .max(self.min_size)
    }
}

/// A labelled, anchored node box.
///
/// The box is emitted as one `<g>` whose `id` is the anchor key, so that the
/// SVG carries the same anchors the connectors were resolved against.
#[derive(Debug, Clone)]
pub struct NodeBox {
    definition: Rc<NodeBoxDefinition>,
    label: Text,
    anchor: String,
    class: String,
    attributes: Vec<(String, String)>,
}

impl NodeBox {
    pub fn new(
        definition: Rc<NodeBoxDefinition>,
        anchor: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        let label = Text::new(definition.text().clone(), label);
        Self {
            definition,
            label,
            anchor: anchor.into(),
            class: "node".to_string(),
            attributes: Vec::new(),
        }
    }

    /// Adds a CSS class to the node group.
    pub fn with_class(mut self, class: &str) -> Self {
        self.class.push(' ');
        self.class.push_str(class);
        self
    }

    /// Adds a `data-*` or other attribute to the node group.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    /// Bounds of the box when centered at `position`.
    pub fn bounds_at(&self, position: Point) -> Bounds {
        position.to_bounds(self.size())
    }
}

impl Drawable for NodeBox {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let bounds = self.bounds_at(position);
        let definition = &self.definition;

        let mut rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", definition.corner_radius)
            .set("fill", definition.fill.to_string())
            .set("fill-opacity", definition.fill.alpha())
            .set("stroke", definition.stroke.to_string())
            .set("stroke-width", definition.stroke_width);

        if let Some(pattern) = &definition.stroke_dasharray {
            rect = rect.set("stroke-dasharray", pattern.as_str());
        }

        let mut group = svg_element::Group::new()
            .set("id", self.anchor.as_str())
            .set("class", self.class.as_str());
        for (name, value) in &self.attributes {
            group = group.set(name.as_str(), value.as_str());
        }

        let group = group
            .add(rect)
            .add(self.label.to_svg(position, "middle"));

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Node, Box::new(group));
        output
    }

    fn size(&self) -> Size {
        self.definition.measure(self.label.content())
    }
}
