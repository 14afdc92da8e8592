//! Drawing primitives that turn positioned dashboard elements into SVG.
//!
//! Every primitive implements [`Drawable`]: given the center position it
//! emits SVG nodes into a [`LayeredOutput`], which keeps plates below
//! connectors, connectors below nodes, and overlay panels on top.

mod arrow;
mod layer;
mod node_box;
mod panel;
mod plate;
mod positioned;
mod text;

pub use arrow::{Arrow, ArrowDefinition, ArrowDrawer, ArrowStyle, ParseArrowStyleError};
pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use node_box::{NodeBox, NodeBoxDefinition};
pub use panel::{Panel, PanelBody, PanelDefinition, ScatterDot};
pub use plate::{Plate, PlateDefinition};
pub use positioned::PositionedDrawable;
pub use text::{Text, TextDefinition};

use crate::geometry::{Point, Size};

/// Anything that can be rendered at a position.
pub trait Drawable {
    /// Renders the element centered at `position`.
    fn render_to_layers(&self, position: Point) -> LayeredOutput;

    /// The size the element occupies.
    fn size(&self) -> Size;
}
