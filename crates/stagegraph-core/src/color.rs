//! Color handling for dashboard styling.
//!
//! [`Color`] wraps `DynamicColor` from the `color` crate so that style
//! settings can be written as any CSS color string.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;

/// A parsed CSS color.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Parses a CSS color string such as `"#1f77b4"`, `"rgb(0, 0, 0)"` or `"teal"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagegraph_core::color::Color;
    ///
    /// assert!(Color::new("#1f77b4").is_ok());
    /// assert!(Color::new("no-such-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        DynamicColor::from_str(color_str)
            .map(|color| Self { color })
            .map_err(|err| format!("invalid color `{color_str}`: {err}"))
    }

    /// Returns a string usable inside an SVG `id` attribute.
    ///
    /// Marker definitions are keyed per color, so the id has to survive
    /// colors written as `#rrggbb` or `rgb(...)`.
    pub fn to_id_safe_string(self) -> String {
        let mut sanitized: String = self
            .to_string()
            .replace('#', "hex")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            sanitized = format!("c_{sanitized}");
        }

        sanitized
    }

    /// Returns a copy of this color with the given alpha.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Color {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Returns the alpha component between 0.0 and 1.0.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        Self::from(color.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_parse_valid_and_invalid() {
        assert!(Color::new("#4c78a8").is_ok());
        assert!(Color::new("rgb(10, 20, 30)").is_ok());

        let err = Color::new("not-a-color").unwrap_err();
        assert!(err.contains("not-a-color"));
    }

    #[test]
    fn test_with_alpha() {
        let color = Color::new("steelblue").unwrap().with_alpha(0.25);
        assert!((color.alpha() - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_id_safe_string() {
        let color = Color::new("rgb(10, 20, 30)").unwrap();
        let id = color.to_id_safe_string();
        assert!(id.chars().all(|c| c.is_alphanumeric() || c == '_'));
        assert!(id.chars().next().is_some_and(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn test_hash_follows_equality() {
        let a = Color::new("orange").unwrap();
        let b = Color::new("orange").unwrap();
        let c = Color::new("gray").unwrap();

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }
}
