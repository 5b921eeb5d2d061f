//! The parsed result that flows from the parser through the hooks to the
//! selected handler.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::definitions::CommandFunc;

/// A single parsed flag value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
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

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Value::Path(p)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Mutable record produced by one parse.
///
/// Hooks may add, change or remove entries before the handler sees it. The
/// `func` slot holds the handler of the deepest selected command that has
/// one; it is empty when no command resolved.
#[derive(Clone, Default, Serialize)]
pub struct Namespace {
    #[serde(flatten)]
    values: BTreeMap<String, Value>,
    #[serde(skip)]
    command_path: Vec<String>,
    #[serde(skip)]
    func: Option<CommandFunc>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the deepest selected command, if any.
    pub fn name(&self) -> Option<&str> {
        self.command_path.last().map(String::as_str)
    }

    /// Selected command names, outermost first.
    pub fn command_path(&self) -> &[String] {
        &self.command_path
    }

    pub(crate) fn push_command(&mut self, name: &str) {
        self.command_path.push(name.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Path values; string values are accepted as paths too.
    pub fn get_path(&self, key: &str) -> Option<&Path> {
        match self.values.get(key)? {
            Value::Path(p) => Some(p),
            Value::Str(s) => Some(Path::new(s)),
            _ => None,
        }
    }

    pub fn get_list(&self, key: &str) -> Option<&[Value]> {
        match self.values.get(key)? {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// String items of a list value; `None` unless every item is a string.
    pub fn get_strings(&self, key: &str) -> Option<Vec<&str>> {
        self.get_list(key)?
            .iter()
            .map(|item| match item {
                Value::Str(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Iterates over stored values in key order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn func(&self) -> Option<&CommandFunc> {
        self.func.as_ref()
    }

    pub fn set_func(&mut self, func: CommandFunc) {
        self.func = Some(func);
    }

    /// Removes the handler so dispatch falls back to printing help.
    pub fn take_func(&mut self) -> Option<CommandFunc> {
        self.func.take()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("command_path", &self.command_path)
            .field("values", &self.values)
            .field("func", &self.func.is_some())
            .finish()
    }
}
