use std::fmt;
use std::sync::Arc;

/// Format options for rendering and truncating a [`Value`].
///
/// Carried per-request (from the DAP `format` argument) rather than read
/// from ambient configuration, so a session never needs process-wide state
/// to decide how to print something.
#[derive(Debug, Clone)]
pub struct RenderFormat {
    /// Hard upper bound, in characters, on a rendered string.
    pub max_length: usize,
    /// Render integers as `0x...` instead of decimal.
    pub hex: bool,
    /// Marker substituted in place of a value already on the render path.
    /// `None` disables cycle detection (only `max_length` bounds output).
    pub circular_ref_marker: Option<&'static str>,
    /// Marker appended when a rendering is cut short by `max_length`.
    /// Distinct from `circular_ref_marker`: the two mark different
    /// conditions and either can be configured independently of the other.
    pub truncation_marker: &'static str,
}

impl Default for RenderFormat {
    fn default() -> Self {
        RenderFormat {
            max_length: 1000,
            hex: false,
            circular_ref_marker: Some("..."),
            truncation_marker: "...",
        }
    }
}

/// How a [`Value::Object`] should be treated by the renderer/inspector when
/// no exact-type rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralCategory {
    /// Exposes key/value pairs (a dict-like object).
    Mapping,
    /// Exposes a sequence of items but is not itself an iterator.
    Iterable,
    /// No structural shape is known; only attributes apply.
    Scalar,
}

/// A single attribute-or-item pair as handed back by [`ObjectHandle`].
pub struct Member {
    pub name: String,
    pub value: Value,
    /// The runtime says this member is itself invocable; the inspector
    /// filters these out of the named-children view.
    pub is_callable: bool,
}

/// The reflective surface a language runtime exposes for one of its values.
///
/// Anything that isn't one of [`Value`]'s closed built-in shapes is wrapped
/// as `Value::Object(Arc<dyn ObjectHandle>)`; the renderer and inspector
/// fall back to this trait's methods once exact-type dispatch has failed.
pub trait ObjectHandle: Send + Sync {
    /// The runtime's own name for this value's type.
    fn type_name(&self) -> String;

    /// The runtime's own textual representation. May fail (the runtime's
    /// own repr hook raised); callers must not propagate the failure.
    fn native_repr(&self) -> Result<String, String>;

    fn category(&self) -> StructuralCategory;

    /// Length, if this value has one (`len()`-like).
    fn length(&self) -> Option<usize>;

    /// Attributes reachable by name (the `dir()`-like surface). Filtering
    /// of dunder/callable members is the inspector's job, not this trait's.
    fn attributes(&self) -> Result<Vec<Member>, String>;

    /// Key/value pairs, for `StructuralCategory::Mapping` handles.
    fn mapping_items(&self) -> Box<dyn Iterator<Item = Result<(Value, Value), String>> + '_>;

    /// Elements in order, for `StructuralCategory::Iterable` handles.
    fn iterable_items(&self) -> Box<dyn Iterator<Item = Result<Value, String>> + '_>;
}

impl fmt::Debug for dyn ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<object {}>", self.type_name())
    }
}

/// A value observed in the debuggee, as handed to the renderer/inspector.
///
/// The closed built-in shapes get exact-type dispatch in the renderer
/// (matching repr output a user would recognize); anything else is an
/// opaque [`ObjectHandle`] the embedding runtime supplies.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    Set(Vec<Value>),
    /// An exception/error value raised during evaluation or inspection.
    Exception { type_name: String, message: String },
    Object(Arc<dyn ObjectHandle>),
}

impl Value {
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::Bytes(_) => "bytes".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Dict(_) => "dict".to_string(),
            Value::Set(_) => "set".to_string(),
            Value::Exception { type_name, .. } => type_name.clone(),
            Value::Object(obj) => obj.type_name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Tuple(v) | Value::List(v) | Value::Set(v) => !v.is_empty(),
            Value::Dict(v) => !v.is_empty(),
            Value::Exception { .. } => true,
            Value::Object(obj) => obj.length().map(|len| len != 0).unwrap_or(true),
        }
    }

    pub fn length(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            Value::Tuple(v) | Value::List(v) | Value::Set(v) => Some(v.len()),
            Value::Dict(v) => Some(v.len()),
            Value::Object(obj) => obj.length(),
            _ => None,
        }
    }

    /// Identity used for cycle detection on the render path. Built-in
    /// shapes don't share storage so they can't participate in a cycle on
    /// their own; only `Value::Object` handles can.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => Some(Arc::as_ptr(obj) as *const () as usize),
            _ => None,
        }
    }
}
