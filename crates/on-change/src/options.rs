//! Observer configuration.

use std::fmt;
use std::rc::Rc;

use on_change_path::PathFormat;
use on_change_value::{same_value, Value};
use serde::Deserialize;
use thiserror::Error;

/// The value-equality predicate used to decide whether a write changed
/// anything.
#[derive(Clone)]
pub struct Equals(Rc<dyn Fn(&Value, &Value) -> bool>);

impl Equals {
    pub fn new(f: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// SameValue: `NaN` equals itself, `+0` and `-0` differ.
    pub fn same_value() -> Self {
        Self::new(same_value)
    }

    pub fn call(&self, a: &Value, b: &Value) -> bool {
        (self.0)(a, b)
    }
}

impl Default for Equals {
    fn default() -> Self {
        Self::same_value()
    }
}

impl fmt::Debug for Equals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Equals(..)")
    }
}

/// Whether method calls on lists report their individual element writes
/// instead of one bracketed change with call metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "DetailsRepr")]
pub enum Details {
    #[default]
    Off,
    All,
    Methods(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetailsRepr {
    Flag(bool),
    Methods(Vec<String>),
}

impl From<DetailsRepr> for Details {
    fn from(repr: DetailsRepr) -> Self {
        match repr {
            DetailsRepr::Flag(false) => Details::Off,
            DetailsRepr::Flag(true) => Details::All,
            DetailsRepr::Methods(names) => Details::Methods(names),
        }
    }
}

impl Details {
    /// Whether calls to `method` are reported in detail.
    pub fn includes(&self, method: &str) -> bool {
        match self {
            Details::Off => false,
            Details::All => true,
            Details::Methods(names) => names.iter().any(|n| n == method),
        }
    }
}

/// Options accepted by [`observe`](crate::observe).
///
/// Build them with the chained setters, or deserialize them from the
/// camelCase option names:
///
/// ```
/// use on_change::{Details, Options};
///
/// let options = Options::from_json(r#"{"pathAsArray": true, "details": ["push"]}"#).unwrap();
/// assert!(options.path_as_array);
/// assert_eq!(options.details, Details::Methods(vec!["push".to_string()]));
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    #[serde(skip)]
    pub equals: Equals,
    /// Only observe the root itself: nested values are handed out
    /// unwrapped, but container methods called on the root are reported.
    pub is_shallow: bool,
    /// Emit paths as key lists instead of dotted strings.
    pub path_as_array: bool,
    pub ignore_symbols: bool,
    /// Ignore keys starting with `_`.
    pub ignore_underscores: bool,
    /// Stop reporting changes on values no longer reachable from the root.
    pub ignore_detached: bool,
    /// String keys that are never observed.
    pub ignore_keys: Vec<String>,
    pub details: Details,
}

/// Error returned when options cannot be parsed.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid options: {0}")]
    Json(#[from] serde_json::Error),
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn equals(mut self, f: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        self.equals = Equals::new(f);
        self
    }

    pub fn shallow(mut self, is_shallow: bool) -> Self {
        self.is_shallow = is_shallow;
        self
    }

    pub fn path_as_array(mut self, path_as_array: bool) -> Self {
        self.path_as_array = path_as_array;
        self
    }

    pub fn ignore_symbols(mut self, ignore: bool) -> Self {
        self.ignore_symbols = ignore;
        self
    }

    pub fn ignore_underscores(mut self, ignore: bool) -> Self {
        self.ignore_underscores = ignore;
        self
    }

    pub fn ignore_detached(mut self, ignore: bool) -> Self {
        self.ignore_detached = ignore;
        self
    }

    pub fn ignore_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    pub(crate) fn path_format(&self) -> PathFormat {
        PathFormat::from_array_flag(self.path_as_array)
    }
}
