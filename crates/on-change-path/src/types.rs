//! Rendered forms of a [`Path`](crate::Path).

use std::fmt;

/// Separator used by the dotted representation.
pub const SEPARATOR: &str = ".";

/// Which representation a rendered path uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PathFormat {
    /// A single string, segments joined with [`SEPARATOR`].
    #[default]
    Dotted,
    /// The ordered list of keys.
    Keys,
}

impl PathFormat {
    /// Pick the representation from an "emit paths as arrays" flag.
    pub fn from_array_flag(as_array: bool) -> Self {
        if as_array {
            PathFormat::Keys
        } else {
            PathFormat::Dotted
        }
    }
}

/// A path as handed out to callers.
#[derive(Clone, Debug, PartialEq)]
pub enum PathRepr<K> {
    Keys(Vec<K>),
    Dotted(String),
}

impl<K> PathRepr<K> {
    /// The dotted string, if this is the dotted representation.
    pub fn as_dotted(&self) -> Option<&str> {
        match self {
            PathRepr::Dotted(s) => Some(s),
            PathRepr::Keys(_) => None,
        }
    }

    /// The key list, if this is the list representation.
    pub fn as_keys(&self) -> Option<&[K]> {
        match self {
            PathRepr::Keys(keys) => Some(keys),
            PathRepr::Dotted(_) => None,
        }
    }

    /// Whether the rendered path points at the root.
    pub fn is_root(&self) -> bool {
        match self {
            PathRepr::Keys(keys) => keys.is_empty(),
            PathRepr::Dotted(s) => s.is_empty(),
        }
    }
}

impl<K: fmt::Display> fmt::Display for PathRepr<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathRepr::Dotted(s) => f.write_str(s),
            PathRepr::Keys(keys) => {
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(SEPARATOR)?;
                    }
                    write!(f, "{key}")?;
                }
                Ok(())
            }
        }
    }
}

impl<K: fmt::Display> PartialEq<str> for PathRepr<K> {
    fn eq(&self, other: &str) -> bool {
        match self {
            PathRepr::Dotted(s) => s == other,
            PathRepr::Keys(_) => self.to_string() == other,
        }
    }
}

impl<K: fmt::Display> PartialEq<&str> for PathRepr<K> {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
