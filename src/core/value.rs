//! Runtime value model for evaluator results.
//!
//! Values mirror what a dynamic-language evaluator can hand back: primitives,
//! ordered sequences, keyed mappings, functions, and opaque host objects.
//! Composites are shared behind `Arc<RwLock<..>>` so a value graph can contain
//! the same node twice or reference itself; the inspector detects that by
//! pointer identity.

use std::sync::{Arc, RwLock};

/// Shared handle to an ordered sequence of values.
pub type ListRef = Arc<RwLock<Vec<Value>>>;

/// Shared handle to a keyed mapping, stored in insertion order.
pub type MapRef = Arc<RwLock<Vec<(String, Value)>>>;

/// Shared handle to an opaque host object.
pub type OpaqueRef = Arc<OpaqueValue>;

/// A runtime value produced by the evaluator.
///
/// # Examples
///
/// ```
/// use bevy_repl::core::Value;
///
/// let v = Value::list(vec![Value::number(1.0), Value::str("two")]);
/// assert!(v.identity().is_some());
/// assert!(Value::Null.identity().is_none());
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// The "no value" marker (`undefined`).
    Undefined,
    /// The null marker.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. Evaluators hand back a single numeric type.
    Number(f64),
    /// A text string.
    Str(String),
    /// An ordered sequence.
    List(ListRef),
    /// A keyed mapping in insertion order.
    Map(MapRef),
    /// A function-like value, rendered by its source text.
    Function {
        /// The definition text, as the evaluator reports it.
        source: String,
    },
    /// An opaque host object with introspectable properties.
    Opaque(OpaqueRef),
}

impl Value {
    /// Create a string value.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Create a number value.
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Create a list value from its elements.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items)))
    }

    /// Create a mapping value from key-value pairs in insertion order.
    pub fn map(pairs: Vec<(String, Value)>) -> Self {
        Value::Map(Arc::new(RwLock::new(pairs)))
    }

    /// Create a function value from its source text.
    pub fn function(source: impl Into<String>) -> Self {
        Value::Function {
            source: source.into(),
        }
    }

    /// Create an opaque host object value.
    pub fn opaque(object: OpaqueValue) -> Self {
        Value::Opaque(Arc::new(object))
    }

    /// Identity of a composite value, used for cycle detection.
    ///
    /// Primitives have no identity; two clones of the same composite share one.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::List(list) => Some(Arc::as_ptr(list) as *const () as usize),
            Value::Map(map) => Some(Arc::as_ptr(map) as *const () as usize),
            Value::Opaque(object) => Some(Arc::as_ptr(object) as *const () as usize),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Why reading a property of an opaque object failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The host does not implement access to this property.
    NotImplemented,
    /// Any other access failure, with the host's message.
    Access(String),
}

impl std::fmt::Display for PropertyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyError::NotImplemented => write!(f, "property access not implemented"),
            PropertyError::Access(msg) => write!(f, "property access failed: {}", msg),
        }
    }
}

impl std::error::Error for PropertyError {}

/// An opaque host object: a display type tag, a native string conversion,
/// and a property list where each read is a `Result`.
///
/// `tag` is `None` when the host threw while the tag was computed; the
/// inspector then falls back to the generic object tag. Properties are held
/// behind a lock so an object can be made to reference itself after creation.
#[derive(Debug)]
pub struct OpaqueValue {
    tag: Option<Box<str>>,
    display: String,
    props: RwLock<Vec<(String, Result<Value, PropertyError>)>>,
}

impl OpaqueValue {
    /// Create an opaque object with a display type tag like `[object Window]`.
    pub fn new(tag: impl Into<Box<str>>, display: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            display: display.into(),
            props: RwLock::new(Vec::new()),
        }
    }

    /// Create an opaque object whose tag computation failed.
    pub fn untagged(display: impl Into<String>) -> Self {
        Self {
            tag: None,
            display: display.into(),
            props: RwLock::new(Vec::new()),
        }
    }

    /// Add a readable property.
    pub fn with_prop(mut self, name: impl Into<String>, value: Value) -> Self {
        if let Ok(props) = self.props.get_mut() {
            props.push((name.into(), Ok(value)));
        }
        self
    }

    /// Add a property whose read fails.
    pub fn with_failed_prop(mut self, name: impl Into<String>, error: PropertyError) -> Self {
        if let Ok(props) = self.props.get_mut() {
            props.push((name.into(), Err(error)));
        }
        self
    }

    /// The display type tag, if it could be computed.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The native string conversion.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Shared access to the property list, for post-creation mutation.
    pub fn props(&self) -> &RwLock<Vec<(String, Result<Value, PropertyError>)>> {
        &self.props
    }
}
