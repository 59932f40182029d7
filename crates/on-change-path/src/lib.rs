//! Hierarchical locations inside an observed object graph.
//!
//! A [`Path`] is an ordered list of segments leading from the observed root
//! to a nested value. Paths are immutable values: every operation returns a
//! new path. When a path leaves the library (for example inside a change
//! notification) it is rendered into a [`PathRepr`], either as the list of
//! keys or as a single string joined with `.`.
//!
//! # Example
//!
//! ```
//! use on_change_path::{Path, PathFormat, PathRepr};
//!
//! let path = Path::root().concat("users").concat("0").concat("name");
//! assert_eq!(path.len(), 3);
//! assert_eq!(path.last(), Some(&"name"));
//! assert_eq!(path.initial().to_dotted(), "users.0");
//!
//! assert_eq!(path.render(PathFormat::Dotted), PathRepr::Dotted("users.0.name".to_string()));
//! assert_eq!(path.render(PathFormat::Keys), PathRepr::Keys(vec!["users", "0", "name"]));
//! ```

use std::fmt;

pub mod types;
pub use types::{PathFormat, PathRepr, SEPARATOR};

/// An ordered sequence of keys describing a location relative to a root.
///
/// The empty path is the root itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path<K> {
    keys: Vec<K>,
}

impl<K> Default for Path<K> {
    fn default() -> Self {
        Self::root()
    }
}

impl<K> Path<K> {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self { keys: Vec::new() }
    }

    /// Build a path from its segments, outermost first.
    pub fn from_keys(keys: Vec<K>) -> Self {
        Self { keys }
    }

    /// The segments of this path, outermost first.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Consume the path and return its segments.
    pub fn into_keys(self) -> Vec<K> {
        self.keys
    }

    /// Whether this path points at the root.
    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The final segment, or `None` for the root path.
    pub fn last(&self) -> Option<&K> {
        self.keys.last()
    }
}

impl<K: Clone> Path<K> {
    /// Return a new path with `key` appended.
    pub fn concat(&self, key: K) -> Self {
        let mut keys = Vec::with_capacity(self.keys.len() + 1);
        keys.extend_from_slice(&self.keys);
        keys.push(key);
        Self { keys }
    }

    /// Return the path with its last segment removed.
    ///
    /// The root path has no parent and is returned unchanged.
    pub fn initial(&self) -> Self {
        match self.keys.split_last() {
            Some((_, rest)) => Self {
                keys: rest.to_vec(),
            },
            None => Self::root(),
        }
    }

    /// Render the path in the requested representation.
    pub fn render(&self, format: PathFormat) -> PathRepr<K>
    where
        K: fmt::Display,
    {
        match format {
            PathFormat::Keys => PathRepr::Keys(self.keys.clone()),
            PathFormat::Dotted => PathRepr::Dotted(self.to_dotted()),
        }
    }
}

impl<K: PartialEq> Path<K> {
    /// Check whether `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &Path<K>) -> bool {
        self.keys.starts_with(&prefix.keys)
    }

    /// Check whether this path lies strictly below `parent`.
    pub fn is_child_of(&self, parent: &Path<K>) -> bool {
        self.keys.len() > parent.keys.len() && self.starts_with(parent)
    }
}

impl<K: PartialEq + Clone> Path<K> {
    /// The part of this path below `base`.
    ///
    /// Returns `None` when `base` is not a prefix of this path.
    ///
    /// ```
    /// use on_change_path::Path;
    ///
    /// let full = Path::from_keys(vec!["a", "b", "c"]);
    /// let base = Path::from_keys(vec!["a"]);
    /// assert_eq!(full.after(&base), Some(Path::from_keys(vec!["b", "c"])));
    /// assert_eq!(base.after(&full), None);
    /// ```
    pub fn after(&self, base: &Path<K>) -> Option<Path<K>> {
        if !self.starts_with(base) {
            return None;
        }
        Some(Self {
            keys: self.keys[base.keys.len()..].to_vec(),
        })
    }
}

impl<K: fmt::Display> Path<K> {
    /// Join the segments with [`SEPARATOR`]. The root renders as `""`.
    pub fn to_dotted(&self) -> String {
        let mut out = String::new();
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                out.push_str(SEPARATOR);
            }
            out.push_str(&key.to_string());
        }
        out
    }
}

impl Path<String> {
    /// Split a dotted string into a path of string segments.
    ///
    /// ```
    /// use on_change_path::Path;
    ///
    /// assert!(Path::parse_dotted("").is_root());
    /// assert_eq!(Path::parse_dotted("a.0.b").keys(), ["a", "0", "b"]);
    /// ```
    pub fn parse_dotted(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self {
            keys: dotted.split(SEPARATOR).map(str::to_string).collect(),
        }
    }
}

impl<K: fmt::Display> fmt::Display for Path<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl<K> From<Vec<K>> for Path<K> {
    fn from(keys: Vec<K>) -> Self {
        Self::from_keys(keys)
    }
}

impl<K> FromIterator<K> for Path<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
