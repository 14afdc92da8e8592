//! Text labels.
//!
//! Label widths are measured by shaping the text with `cosmic-text` against
//! the system fonts. When no font resolves (for example in a bare container)
//! the width falls back to an estimate from the character count. Line height
//! is always derived from the font size so that panel rows stay on a fixed
//! grid.

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::{info, warn};
use svg::{node::Text as SvgText, node::element as svg_element};

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Average glyph advance as a fraction of the font size, used when shaping
/// yields no glyphs.
const GLYPH_WIDTH_RATIO: f32 = 0.6;

/// Line height as a fraction of the font size.
const LINE_HEIGHT_RATIO: f32 = 1.25;

/// Font settings shared by every label drawn with it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefinition {
    font_family: String,
    font_size: f32,
    color: Option<Color>,
    bold: bool,
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 14.0,
            color: None,
            bold: false,
        }
    }
}

impl TextDefinition {
    pub fn new(font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Height of one line of text.
    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_RATIO
    }
}

/// A possibly multi-line label.
#[derive(Debug, Clone)]
pub struct Text {
    definition: TextDefinition,
    content: String,
}

impl Text {
    pub fn new(definition: TextDefinition, content: impl Into<String>) -> Self {
        Self {
            definition,
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn definition(&self) -> &TextDefinition {
        &self.definition
    }

    /// Renders a single `<text>` element without layering it.
    ///
    /// `anchor` is the SVG `text-anchor` value; for `"start"` the position is
    /// the left end of the baseline block instead of its center.
    pub fn to_svg(&self, position: Point, anchor: &str) -> svg_element::Text {
        let lines: Vec<&str> = self.content.lines().collect();
        let line_height = self.definition.line_height();
        let first_line_y = position.y() - line_height * (lines.len().max(1) as f32 - 1.0) / 2.0;

        let mut text = svg_element::Text::new("")
            .set("x", position.x())
            .set("y", first_line_y)
            .set("text-anchor", anchor)
            .set("dominant-baseline", "central")
            .set("font-family", self.definition.font_family())
            .set("font-size", self.definition.font_size());

        if self.definition.bold {
            text = text.set("font-weight", "bold");
        }

        if let Some(color) = self.definition.color() {
            text = text
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha());
        }

        for (index, line) in lines.into_iter().enumerate() {
            let dy = if index == 0 { 0.0 } else { line_height };
            let tspan = svg_element::TSpan::new("")
                .set("x", position.x())
                .set("dy", dy)
                .add(SvgText::new(line));
            text = text.add(tspan);
        }

        text
    }
}

impl Drawable for Text {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Text, Box::new(self.to_svg(position, "middle")));
        output
    }

    fn size(&self) -> Size {
        let line_count = self.content.lines().count().max(1);
        let width = TEXT_MEASURER
            .get_or_init(TextMeasurer::new)
            .measure_width(&self.content, &self.definition);

        Size::new(width, line_count as f32 * self.definition.line_height())
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// Shapes labels with a shared [`FontSystem`].
///
/// Loading the system font database is slow, so one instance is created on
/// first use and reused for every label.
struct TextMeasurer {
    font_system: Mutex<FontSystem>,
}

impl TextMeasurer {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    /// Width of the widest line of `text`.
    fn measure_width(&self, text: &str, definition: &TextDefinition) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        let Ok(mut font_system) = self.font_system.lock() else {
            warn!("FontSystem lock poisoned, estimating text width");
            return estimate_width(text, definition);
        };

        let font_size = definition.font_size();
        let metrics = Metrics::new(font_size, definition.line_height());
        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let mut attrs = Attrs::new().family(Family::Name(definition.font_family()));
        if definition.bold {
            attrs = attrs.weight(cosmic_text::Weight::BOLD);
        }

        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let width = buffer
            .layout_runs()
            .filter_map(|run| run.glyphs.last().map(|glyph| glyph.x + glyph.w))
            .fold(0.0_f32, f32::max);

        if width > 0.0 {
            width
        } else {
            estimate_width(text, definition)
        }
    }
}

static TEXT_MEASURER: OnceLock<TextMeasurer> = OnceLock::new();

fn estimate_width(text: &str, definition: &TextDefinition) -> f32 {
    let longest = text
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    longest as f32 * definition.font_size() * GLYPH_WIDTH_RATIO
}
