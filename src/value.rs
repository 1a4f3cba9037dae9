//! Dynamic values handed to checkers.
//!
//! A [`Value`] carries enough runtime shape for the checkers to name its type,
//! decide whether it is nil, compare it against another value and pretty-print
//! it. The `Debug` implementation is the structural printer: `{:?}` gives the
//! compact form used inside messages, `{:#?}` the indented form used in
//! failure report dumps.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Represents a value under test.
///
/// # Examples
///
/// ```rust
/// use verdict::value::Value;
/// let n = Value::from(42);
/// assert_eq!(n.type_name(), "int");
/// assert!(Value::Nil.is_nil());
/// assert!(Value::nil_list().is_nil());
/// assert!(!Value::list(Vec::<Value>::new()).is_nil());
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// The literal absence of a value.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// An opaque value that only exposes its `Display` form.
    Stringer(Stringer),
    Error(Rc<dyn StdError>),
    List(Option<Vec<Value>>),
    Map(Option<BTreeMap<String, Value>>),
    Struct(Struct),
    Pointer(Option<Rc<Value>>),
    Func(Option<Func>),
}

/// Raised when equality reaches a value that cannot be compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("runtime error: comparing uncomparable type {type_name}")]
pub struct Uncomparable {
    pub type_name: String,
}

impl Value {
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(Some(items.into_iter().map(Into::into).collect()))
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(Some(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn pointer(target: impl Into<Value>) -> Self {
        Value::Pointer(Some(Rc::new(target.into())))
    }

    /// Wraps a zero-argument function.
    pub fn func(body: impl Fn() + 'static) -> Self {
        Value::Func(Some(Func::new(body)))
    }

    pub fn error(err: impl StdError + 'static) -> Self {
        Value::Error(Rc::new(err))
    }

    /// Builds an error value carrying only a message.
    pub fn error_msg(message: impl Into<String>) -> Self {
        Value::error(MessageError(message.into()))
    }

    pub fn stringer(type_name: impl Into<String>, inner: impl fmt::Display + 'static) -> Self {
        Value::Stringer(Stringer {
            type_name: type_name.into(),
            inner: Rc::new(inner),
        })
    }

    pub fn nil_list() -> Self {
        Value::List(None)
    }

    pub fn nil_map() -> Self {
        Value::Map(None)
    }

    pub fn nil_pointer() -> Self {
        Value::Pointer(None)
    }

    pub fn nil_func() -> Self {
        Value::Func(None)
    }

    /// Returns the runtime type name used in checker messages.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use verdict::value::{Func, Value};
    /// assert_eq!(Value::from("x").type_name(), "string");
    /// assert_eq!(Value::from(Func::new(|| {}).with_params(["int"])).type_name(), "func(int)");
    /// ```
    pub fn type_name(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Stringer(s) => s.type_name.clone(),
            Value::Error(_) => "error".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Struct(s) => s.name.clone(),
            Value::Pointer(Some(target)) => format!("*{}", target.type_name()),
            Value::Pointer(None) => "pointer".to_string(),
            Value::Func(Some(func)) => func.signature(),
            Value::Func(None) => "func".to_string(),
        }
    }

    /// Reports nilness in the broad sense: the absence of a value, or a nil
    /// list, map, pointer or func.
    pub fn is_nil(&self) -> bool {
        matches!(
            self,
            Value::Nil
                | Value::List(None)
                | Value::Map(None)
                | Value::Pointer(None)
                | Value::Func(None)
        )
    }

    /// Compares two values element by element.
    ///
    /// Values of different variants are simply unequal. Reaching a non-nil
    /// function on either side is a fault.
    pub fn try_eq(&self, other: &Value) -> Result<bool, Uncomparable> {
        Ok(match (self, other) {
            (Value::Func(a), Value::Func(b)) => {
                if let Some(func) = a.as_ref().or(b.as_ref()) {
                    return Err(Uncomparable {
                        type_name: func.signature(),
                    });
                }
                true
            }
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Stringer(a), Value::Stringer(b)) => {
                a.type_name == b.type_name && a.to_string() == b.to_string()
            }
            (Value::Error(a), Value::Error(b)) => a.to_string() == b.to_string(),
            (Value::List(a), Value::List(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.len() == b.len() && all_eq(a.iter().zip(b))?,
                _ => false,
            },
            (Value::Map(a), Value::Map(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => {
                    a.len() == b.len()
                        && a.keys().eq(b.keys())
                        && all_eq(a.values().zip(b.values()))?
                }
                _ => false,
            },
            (Value::Struct(a), Value::Struct(b)) => {
                a.name == b.name
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(&b.fields).all(|(x, y)| x.0 == y.0)
                    && all_eq(a.fields.iter().map(|f| &f.1).zip(b.fields.iter().map(|f| &f.1)))?
            }
            (Value::Pointer(a), Value::Pointer(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.try_eq(b)?,
                _ => false,
            },
            _ => false,
        })
    }
}

impl Value {
    /// Compares two values the way a plain `==` on dynamic values would.
    ///
    /// Values of different types are unequal. Lists, maps and functions,
    /// and structs holding any of them, cannot be compared at all. Pointers
    /// are equal when both are nil or both share a target.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use verdict::value::Value;
    /// let target = Value::pointer(42);
    /// assert_eq!(target.shallow_eq(&target.clone()), Ok(true));
    /// assert_eq!(target.shallow_eq(&Value::pointer(42)), Ok(false));
    /// assert!(Value::list([1]).shallow_eq(&Value::list([1])).is_err());
    /// ```
    pub fn shallow_eq(&self, other: &Value) -> Result<bool, Uncomparable> {
        if self.type_name() != other.type_name() {
            return Ok(false);
        }
        if !self.is_comparable() {
            return Err(Uncomparable {
                type_name: self.type_name(),
            });
        }
        Ok(match (self, other) {
            (Value::Struct(a), Value::Struct(b)) => {
                if a.fields.len() != b.fields.len() {
                    return Ok(false);
                }
                for ((name_a, a), (name_b, b)) in a.fields.iter().zip(&b.fields) {
                    if name_a != name_b || !a.shallow_eq(b)? {
                        return Ok(false);
                    }
                }
                true
            }
            (Value::Pointer(Some(a)), Value::Pointer(Some(b))) => Rc::ptr_eq(a, b),
            _ => self.try_eq(other)?,
        })
    }

    fn is_comparable(&self) -> bool {
        match self {
            Value::List(_) | Value::Map(_) | Value::Func(_) => false,
            Value::Struct(s) => s.fields.iter().all(|(_, v)| v.is_comparable()),
            _ => true,
        }
    }
}

fn all_eq<'a>(pairs: impl Iterator<Item = (&'a Value, &'a Value)>) -> Result<bool, Uncomparable> {
    for (a, b) in pairs {
        if !a.try_eq(b)? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Stringer(s) => f.debug_tuple(&s.type_name).field(&s.to_string()).finish(),
            Value::Error(err) => f.debug_tuple("error").field(&err.to_string()).finish(),
            Value::List(None) => write!(f, "list(nil)"),
            Value::List(Some(items)) => f.debug_list().entries(items).finish(),
            Value::Map(None) => write!(f, "map(nil)"),
            Value::Map(Some(entries)) => f.debug_map().entries(entries).finish(),
            Value::Struct(s) => {
                let mut dbg = f.debug_struct(&s.name);
                for (name, value) in &s.fields {
                    dbg.field(name, value);
                }
                dbg.finish()
            }
            Value::Pointer(None) => write!(f, "pointer(nil)"),
            Value::Pointer(Some(target)) => {
                write!(f, "&")?;
                fmt::Debug::fmt(target.as_ref(), f)
            }
            Value::Func(None) => write!(f, "func(nil)"),
            Value::Func(Some(func)) => write!(f, "{} {{...}}", func.signature()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::list(items)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Value::Struct(s)
    }
}

impl From<Func> for Value {
    fn from(func: Func) -> Self {
        Value::Func(Some(func))
    }
}

/// A value known only through `Display`.
#[derive(Clone)]
pub struct Stringer {
    type_name: String,
    inner: Rc<dyn fmt::Display>,
}

impl fmt::Display for Stringer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// A named record with ordered fields.
#[derive(Clone, Debug)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl Struct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// A callable value with a declared signature.
///
/// Only functions without parameters are ever invoked; the parameter and
/// result type names exist so checkers can describe what they were given.
#[derive(Clone)]
pub struct Func {
    params: Vec<String>,
    results: Vec<String>,
    body: Rc<dyn Fn()>,
}

impl Func {
    pub fn new(body: impl Fn() + 'static) -> Self {
        Self {
            params: Vec::new(),
            results: Vec::new(),
            body: Rc::new(body),
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_results<I, S>(mut self, results: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.results = results.into_iter().map(Into::into).collect();
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn call(&self) {
        (self.body)()
    }

    /// Renders the signature, e.g. `func(int)` or `func() (int, error)`.
    pub fn signature(&self) -> String {
        let params = self.params.join(", ");
        match self.results.as_slice() {
            [] => format!("func({params})"),
            [single] => format!("func({params}) {single}"),
            many => format!("func({params}) ({})", many.join(", ")),
        }
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for MessageError {}
