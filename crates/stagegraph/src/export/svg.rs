//! SVG export of dashboard scenes.

use std::{fs::File, io::Write, rc::Rc};

use log::{debug, error, info};
use svg::{Document, node::element as svg_element};

use stagegraph_core::{
    draw::{Arrow, ArrowDrawer, Drawable as _, LayeredOutput, NodeBox, Panel, Plate},
    geometry::Size,
};

use crate::{
    export,
    render::{
        EdgeElement, NodeElement, NodeKind, OverlayElement, PlateElement, Scene, SceneElement,
        Styles,
    },
};

/// Space left around the scene content.
const MARGIN: f32 = 50.0;

/// Builder for [`Svg`].
#[derive(Debug)]
pub struct SvgBuilder {
    file_name: String,
    styles: Option<Styles>,
}

impl SvgBuilder {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            styles: None,
        }
    }

    pub fn with_styles(mut self, styles: &Styles) -> Self {
        self.styles = Some(styles.clone());
        self
    }

    /// # Errors
    ///
    /// Returns [`export::Error::Render`] if no styles were set.
    pub fn build(self) -> Result<Svg, export::Error> {
        let styles = self
            .styles
            .ok_or_else(|| export::Error::Render("SVG exporter requires styles".to_string()))?;
        Ok(Svg {
            file_name: self.file_name,
            styles,
            arrow_drawer: ArrowDrawer::new(),
        })
    }
}

/// Writes scenes as standalone SVG documents.
#[derive(Debug)]
pub struct Svg {
    file_name: String,
    styles: Styles,
    arrow_drawer: ArrowDrawer,
}

impl Svg {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Renders `scene` into an SVG document.
    ///
    /// Element groups follow the layer order, so overlay panels always sit
    /// above the graph.
    pub fn render_scene(&mut self, scene: &Scene) -> Document {
        let content_bounds = scene.bounds();
        let content_size = content_bounds.to_size();
        let svg_size = Self::calculate_svg_dimensions(content_size);

        let doc = Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", svg_size.width(), svg_size.height()),
            )
            .set("width", svg_size.width())
            .set("height", svg_size.height());
        let doc = self.add_background(doc, svg_size);

        let mut output = LayeredOutput::new();
        for element in scene.elements() {
            let element_output = match element {
                SceneElement::Node(node) => self.render_node(node),
                SceneElement::Edge(edge) => self.render_edge(edge),
                SceneElement::Plate(plate) => self.render_plate(plate),
                SceneElement::Overlay(overlay) => self.render_overlay(overlay),
            };
            output.merge(element_output);
        }

        let main_group = svg_element::Group::new().set(
            "transform",
            format!(
                "translate({}, {})",
                MARGIN - content_bounds.min_x(),
                MARGIN - content_bounds.min_y()
            ),
        );
        let main_group = output
            .render()
            .into_iter()
            .fold(main_group, |group, layer| group.add(layer));

        doc.add(self.arrow_drawer.marker_definitions())
            .add(main_group)
    }

    fn calculate_svg_dimensions(content_size: Size) -> Size {
        let width = MARGIN.mul_add(2.0, content_size.width());
        let height = MARGIN.mul_add(2.0, content_size.height());
        debug!(width = width, height = height; "SVG dimensions");
        Size::new(width, height)
    }

    fn add_background(&self, doc: Document, size: Size) -> Document {
        let Some(color) = self.styles.background() else {
            return doc;
        };
        doc.add(
            svg_element::Rectangle::new()
                .set("class", "background")
                .set("width", size.width())
                .set("height", size.height())
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha()),
        )
    }

    fn render_node(&self, node: &NodeElement) -> LayeredOutput {
        let anchor = node.anchor.to_string();
        let node_box = match node.kind {
            NodeKind::Descriptive => {
                NodeBox::new(Rc::clone(self.styles.descriptive()), anchor, node.label.as_str())
            }
            NodeKind::Trigger {
                overlay,
                availability,
            } => NodeBox::new(Rc::clone(self.styles.trigger()), anchor, node.label.as_str())
                .with_class("trigger")
                .with_attribute("data-overlay", overlay.to_string())
                .with_attribute("data-availability", availability.name()),
        };
        node_box.render_to_layers(node.bounds.center())
    }

    fn render_edge(&mut self, edge: &EdgeElement) -> LayeredOutput {
        let arrow = Arrow::new(Rc::clone(self.styles.arrow()));
        self.arrow_drawer.draw(
            &arrow,
            &edge.source.to_string(),
            &edge.target.to_string(),
            edge.start,
            edge.end,
        )
    }

    fn render_plate(&self, plate: &PlateElement) -> LayeredOutput {
        let mut drawable = Plate::new(
            Rc::clone(self.styles.plate()),
            plate.title.as_str(),
            plate.bounds.to_size(),
        );
        if let Some((overlay, availability)) = plate.overlay {
            drawable = drawable
                .with_attribute("data-overlay", overlay.to_string())
                .with_attribute("data-availability", availability.name());
        }
        drawable.render_to_layers(plate.bounds.center())
    }

    fn render_overlay(&self, overlay: &OverlayElement) -> LayeredOutput {
        let panel = Panel::new(
            Rc::clone(self.styles.panel()),
            overlay.title.as_str(),
            overlay.body.clone(),
            overlay.bounds.width(),
        )
        .with_attribute("data-overlay", overlay.kind.to_string());
        panel.render_to_layers(overlay.bounds.center())
    }

    /// Writes an SVG document to the configured file.
    pub fn write_document(&self, doc: Document) -> Result<(), export::Error> {
        info!(file_name = self.file_name; "Creating SVG file");
        let f = match File::create(&self.file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = self.file_name, err:err; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(&f, "{doc}") {
            error!(file_name = self.file_name, err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }
}

impl export::Exporter for Svg {
    fn export_scene(&mut self, scene: &Scene) -> Result<(), export::Error> {
        let doc = self.render_scene(scene);
        debug!(elements = scene.elements().len(); "SVG document rendered");

        self.write_document(doc)
    }
}
