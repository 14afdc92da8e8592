//! Geometric primitives for dashboard layout.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in dashboard space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned rectangle given by its min and max corners
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! The coordinate system matches SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Node positions are the *center* of the node's box.

/// A 2D point in dashboard coordinate space.
///
/// # Examples
///
/// ```
/// # use stagegraph_core::geometry::Point;
/// let a = Point::new(10.0, 20.0);
/// let b = Point::new(30.0, 40.0);
///
/// let mid = a.midpoint(b);
/// assert_eq!(mid, Point::new(20.0, 30.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point component-wise
    pub fn add_point(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Subtracts another point component-wise
    pub fn sub_point(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Returns the point halfway between `self` and `other`
    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Euclidean length of the vector from the origin to this point
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Returns a copy with both components taken as absolute values
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Bounds of the given size centered on this point
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_center(self, size)
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height
    pub fn height(self) -> f32 {
        self.height
    }

    /// Component-wise maximum of two sizes
    pub fn max(self, other: Size) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Grows the size by the given insets
    pub fn add_padding(self, insets: Insets) -> Self {
        Self::new(
            self.width + insets.horizontal_sum(),
            self.height + insets.vertical_sum(),
        )
    }
}

/// An axis-aligned rectangle.
///
/// # Examples
///
/// ```
/// # use stagegraph_core::geometry::{Bounds, Point, Size};
/// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
/// let b = Bounds::new_from_top_left(Point::new(20.0, 5.0), Size::new(10.0, 10.0));
///
/// let merged = a.merge(&b);
/// assert_eq!(merged.width(), 30.0);
/// assert_eq!(merged.height(), 15.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds of the given size centered on `center`
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width() / 2.0;
        let half_height = size.height() / 2.0;
        Self {
            min_x: center.x() - half_width,
            min_y: center.y() - half_height,
            max_x: center.x() + half_width,
            max_y: center.y() + half_height,
        }
    }

    /// Creates bounds of the given size with `top_left` as the min corner
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x(),
            min_y: top_left.y(),
            max_x: top_left.x() + size.width(),
            max_y: top_left.y() + size.height(),
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Center point of the rectangle
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// The top-left corner
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Smallest bounds containing both `self` and `other`
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the rectangle by `offset`
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x(),
            min_y: self.min_y + offset.y(),
            max_x: self.max_x + offset.x(),
            max_y: self.max_y + offset.y(),
        }
    }

    /// Grows the rectangle outward by `insets`
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }

    /// Returns `true` if the point lies inside or on the border
    pub fn contains(&self, point: Point) -> bool {
        point.x() >= self.min_x
            && point.x() <= self.max_x
            && point.y() >= self.min_y
            && point.y() <= self.max_y
    }

    /// Returns the point where a ray from the center toward `toward` leaves
    /// the rectangle.
    ///
    /// Connectors are anchored at this point so that arrow heads touch the
    /// node border instead of disappearing under the node box. If `toward`
    /// coincides with the center, the center is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stagegraph_core::geometry::{Bounds, Point, Size};
    /// let node = Bounds::new_from_center(Point::new(0.0, 0.0), Size::new(40.0, 20.0));
    /// let exit = node.ray_exit(Point::new(100.0, 0.0));
    /// assert_eq!(exit, Point::new(20.0, 0.0));
    /// ```
    pub fn ray_exit(&self, toward: Point) -> Point {
        let center = self.center();
        let delta = toward.sub_point(center);
        let half_width = self.width() / 2.0;
        let half_height = self.height() / 2.0;

        if delta.x() == 0.0 && delta.y() == 0.0 {
            return center;
        }

        let scale_x = if delta.x() == 0.0 {
            f32::INFINITY
        } else {
            half_width / delta.x().abs()
        };
        let scale_y = if delta.y() == 0.0 {
            f32::INFINITY
        } else {
            half_height / delta.y().abs()
        };
        let scale = scale_x.min(scale_y);

        Point::new(
            center.x() + delta.x() * scale,
            center.y() + delta.y() * scale,
        )
    }
}

/// Padding for four sides of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates insets in CSS order: top, right, bottom, left.
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same padding on every side
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    /// Left plus right padding
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom padding
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_bounds_from_center() {
        let bounds = Bounds::new_from_center(Point::new(50.0, 20.0), Size::new(100.0, 40.0));
        assert_eq!(bounds.min_point(), Point::new(0.0, 0.0));
        assert_eq!(bounds.max_x(), 100.0);
        assert_eq!(bounds.max_y(), 40.0);
        assert_eq!(bounds.center(), Point::new(50.0, 20.0));
    }

    #[test]
    fn test_add_padding_and_translate() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(20.0, 20.0))
            .add_padding(Insets::new(1.0, 2.0, 3.0, 4.0))
            .translate(Point::new(-6.0, 1.0));

        assert_eq!(bounds.min_x(), 0.0);
        assert_eq!(bounds.min_y(), 10.0);
        assert_eq!(bounds.width(), 26.0);
        assert_eq!(bounds.height(), 24.0);
    }

    #[test]
    fn test_contains() {
        let bounds = Bounds::new_from_top_left(Point::default(), Size::new(10.0, 10.0));
        assert!(bounds.contains(Point::new(5.0, 5.0)));
        assert!(bounds.contains(Point::new(10.0, 0.0)));
        assert!(!bounds.contains(Point::new(10.5, 5.0)));
    }

    #[test]
    fn test_ray_exit_vertical_and_diagonal() {
        let bounds = Bounds::new_from_center(Point::new(0.0, 0.0), Size::new(40.0, 20.0));

        assert_eq!(bounds.ray_exit(Point::new(0.0, -50.0)), Point::new(0.0, -10.0));

        let diagonal = bounds.ray_exit(Point::new(100.0, 100.0));
        assert!(approx_eq!(f32, diagonal.x(), 10.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, diagonal.y(), 10.0, epsilon = 1e-4));
    }

    #[test]
    fn test_ray_exit_toward_center() {
        let bounds = Bounds::new_from_center(Point::new(3.0, 4.0), Size::new(10.0, 10.0));
        assert_eq!(bounds.ray_exit(Point::new(3.0, 4.0)), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_size_max_and_padding() {
        let size = Size::new(10.0, 30.0).max(Size::new(20.0, 5.0));
        assert_eq!(size, Size::new(20.0, 30.0));
        assert_eq!(
            size.add_padding(Insets::uniform(5.0)),
            Size::new(30.0, 40.0)
        );
    }

    proptest! {
        #[test]
        fn prop_ray_exit_lies_on_border(
            cx in -500.0f32..500.0,
            cy in -500.0f32..500.0,
            w in 1.0f32..300.0,
            h in 1.0f32..300.0,
            tx in -1000.0f32..1000.0,
            ty in -1000.0f32..1000.0,
        ) {
            let bounds = Bounds::new_from_center(Point::new(cx, cy), Size::new(w, h));
            let target = Point::new(tx, ty);
            prop_assume!(target.sub_point(bounds.center()).hypot() > 1e-2);

            let exit = bounds.ray_exit(target);
            let on_vertical_edge = (exit.x() - bounds.min_x()).abs() < 1e-2
                || (exit.x() - bounds.max_x()).abs() < 1e-2;
            let on_horizontal_edge = (exit.y() - bounds.min_y()).abs() < 1e-2
                || (exit.y() - bounds.max_y()).abs() < 1e-2;

            prop_assert!(on_vertical_edge || on_horizontal_edge);
            prop_assert!(bounds.add_padding(Insets::uniform(1e-2)).contains(exit));
        }
    }
}
