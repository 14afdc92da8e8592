//! Provides [`PositionedDrawable`], a drawable paired with its center position.

use crate::{
    draw::{Drawable, LayeredOutput},
    geometry::{Bounds, Point, Size},
};

/// A drawable together with the center position it was placed at.
#[derive(Debug, Clone)]
pub struct PositionedDrawable<D: Drawable> {
    drawable: D,
    position: Point,
}

impl<D: Drawable> PositionedDrawable<D> {
    /// Wraps a drawable placed at the origin.
    pub fn new(drawable: D) -> Self {
        Self {
            drawable,
            position: Point::default(),
        }
    }

    /// Sets the center position (builder style).
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Renders the inner drawable at the stored position.
    pub fn render_to_layers(&self) -> LayeredOutput {
        self.drawable.render_to_layers(self.position)
    }

    /// Bounds occupied at the stored position.
    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(self.drawable.size())
    }

    pub fn inner(&self) -> &D {
        &self.drawable
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

impl<D: Drawable> Drawable for PositionedDrawable<D> {
    fn render_to_layers(&self, _position: Point) -> LayeredOutput {
        // The stored position wins over the one passed in.
        self.render_to_layers()
    }

    fn size(&self) -> Size {
        self.drawable.size()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        color::Color,
        draw::{NodeBox, NodeBoxDefinition, TextDefinition},
    };

    #[test]
    fn test_bounds_follow_position() {
        let definition = Rc::new(NodeBoxDefinition::new(
            Color::default(),
            Color::default(),
            TextDefinition::default(),
        ));
        let node = NodeBox::new(definition, "a", "A");
        let size = node.size();

        let positioned = PositionedDrawable::new(node).with_position(Point::new(100.0, 40.0));
        assert_eq!(positioned.position(), Point::new(100.0, 40.0));
        assert_eq!(positioned.bounds().center(), Point::new(100.0, 40.0));
        assert_eq!(positioned.bounds().to_size(), size);
        assert_eq!(positioned.inner().anchor(), "a");
    }
}
