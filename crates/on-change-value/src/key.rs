//! Property keys and symbols.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::Value;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static REGISTRY: RefCell<HashMap<String, Symbol>> = RefCell::new(HashMap::new());
}

/// A unique, non-string property key.
///
/// Two symbols are equal only if they come from the same [`Symbol::new`]
/// call, or from [`Symbol::for_key`] with the same key.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Rc<str>>,
}

impl Symbol {
    /// Create a fresh symbol.
    pub fn new(description: &str) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Some(Rc::from(description)),
        }
    }

    /// Return the symbol registered under `key`, creating it on first use.
    pub fn for_key(key: &str) -> Self {
        REGISTRY.with(|registry| {
            registry
                .borrow_mut()
                .entry(key.to_string())
                .or_insert_with(|| Symbol::new(key))
                .clone()
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description.as_deref().unwrap_or(""))
    }
}

/// A property key.
///
/// Canonical array-index strings (`"0"`, `"17"`, but not `"01"`) are always
/// normalized to [`PropertyKey::Index`], so `"3"` and `3` name the same
/// property.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(usize),
    String(Rc<str>),
    Symbol(Symbol),
}

impl PropertyKey {
    /// Convert an arbitrary value to a key (strings and numbers become
    /// string keys, symbols stay symbols, everything else is stringified).
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Symbol(symbol) => PropertyKey::Symbol(symbol.clone()),
            Value::String(s) => PropertyKey::from(&**s),
            Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n < u32::MAX as f64 => {
                PropertyKey::Index(*n as usize)
            }
            other => PropertyKey::from(other.to_string().as_str()),
        }
    }

    /// The key as a value (indices become numbers).
    pub fn to_value(&self) -> Value {
        match self {
            PropertyKey::Index(i) => Value::Number(*i as f64),
            PropertyKey::String(s) => Value::String(s.clone()),
            PropertyKey::Symbol(symbol) => Value::Symbol(symbol.clone()),
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// The string form of a string key. Indices and symbols return `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyKey::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    /// Whether this is the string key `name`.
    pub fn is(&self, name: &str) -> bool {
        self.as_str() == Some(name)
    }
}

/// Parse a canonical array index: digits only, no leading zeros.
fn canonical_index(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return None;
    }
    if !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    s.parse::<u32>().ok().filter(|i| *i < u32::MAX).map(|i| i as usize)
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        match canonical_index(s) {
            Some(i) => PropertyKey::Index(i),
            None => PropertyKey::String(Rc::from(s)),
        }
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::from(s.as_str())
    }
}

impl From<usize> for PropertyKey {
    fn from(i: usize) -> Self {
        PropertyKey::Index(i)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        PropertyKey::Symbol(symbol)
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(key: &PropertyKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Index(i) => write!(f, "{i}"),
            PropertyKey::String(s) => f.write_str(s),
            PropertyKey::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Index(i) => write!(f, "{i}"),
            PropertyKey::String(s) => write!(f, "{s:?}"),
            PropertyKey::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}
