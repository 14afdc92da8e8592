//! Identifier management using string interning.
//!
//! Node ids double as anchor keys: the edge renderer resolves connectors by
//! looking up the [`Id`] of each endpoint, so comparisons need to be cheap.

use std::{
    convert::Infallible,
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// Access is serialized through a `Mutex`.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Interned identifier of a graph node.
///
/// # Examples
///
/// ```
/// use stagegraph_core::identifier::Id;
///
/// let a = Id::new("imageInput");
/// let b = Id::new("imageInput");
/// assert_eq!(a, b);
/// assert_eq!(a, "imageInput");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its string form, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates an `Id` only if `name` has already been interned.
    ///
    /// Lookups by user-supplied names use this so that probing for an
    /// unknown node does not grow the interner.
    pub fn existing(name: &str) -> Option<Self> {
        with_interner(|interner| interner.get(name)).map(Self)
    }

    /// Returns the string form of this identifier.
    pub fn as_string(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl std::str::FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        Id::existing(other) == Some(*self)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_id() {
        let a = Id::new("twoViewEstimator");
        let b: Id = "twoViewEstimator".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Id::new("imageInput"));
    }

    #[test]
    fn test_display_round_trips_name() {
        let id = Id::new("bundleAdjustment");
        assert_eq!(id.to_string(), "bundleAdjustment");
        assert_eq!(id.as_string(), "bundleAdjustment");
    }

    #[test]
    fn test_existing_does_not_intern() {
        assert_eq!(Id::existing("never-interned-identifier-xyz"), None);
        let id = Id::new("interned-identifier-xyz");
        assert_eq!(Id::existing("interned-identifier-xyz"), Some(id));
    }

    #[test]
    fn test_compare_with_str() {
        let id = Id::new("dataAssociation");
        assert_eq!(id, "dataAssociation");
        assert!(id != "bundleAdjustment");
    }
}
