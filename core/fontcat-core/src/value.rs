//! Structured values shared by every catalog table.
//!
//! Everything the catalog persists is a [`Value`]: either an atom or a tuple of
//! further values. Typed views such as [`FontKey`] and [`Location`] convert to
//! and from that shape through the [`Record`] trait, which is where malformed
//! records get rejected.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A node of the nested key/value tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Atom(String),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn atom(label: impl Into<String>) -> Self {
        Value::Atom(label.into())
    }

    pub fn tuple<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Value::Atom(label) => Some(label),
            Value::Tuple(_) => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Atom(_) => None,
            Value::Tuple(items) => Some(items),
        }
    }

    /// True when this is a tuple with exactly `arity` children.
    pub fn is_tuple_of(&self, arity: usize) -> bool {
        self.as_tuple().is_some_and(|items| items.len() == arity)
    }
}

impl From<&str> for Value {
    fn from(label: &str) -> Self {
        Value::Atom(label.to_string())
    }
}

impl From<String> for Value {
    fn from(label: String) -> Self {
        Value::Atom(label)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::print_value(self))
    }
}

/// Conversion between a typed table component and its tree shape.
pub trait Record: Sized {
    fn to_value(&self) -> Value;

    /// Decode a value, or `None` when its shape does not match.
    fn from_value(value: &Value) -> Option<Self>;
}

impl Record for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl Record for String {
    fn to_value(&self) -> Value {
        Value::Atom(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_atom().map(str::to_string)
    }
}

/// Sequences decode element-wise; elements of the wrong shape are dropped.
impl<T: Record> Record for Vec<T> {
    fn to_value(&self) -> Value {
        Value::tuple(self.iter().map(Record::to_value))
    }

    fn from_value(value: &Value) -> Option<Self> {
        let items = value.as_tuple()?;
        Some(items.iter().filter_map(T::from_value).collect())
    }
}

/// Logical face identifier: a `(family, style)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontKey {
    pub family: String,
    pub style: String,
}

impl FontKey {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl Record for FontKey {
    fn to_value(&self) -> Value {
        Value::tuple([Value::atom(&self.family), Value::atom(&self.style)])
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_tuple()? {
            [Value::Atom(family), Value::Atom(style)] => Some(FontKey::new(family, style)),
            _ => None,
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

/// Physical occurrence of a face: file name, subfont index and (usually) size.
///
/// Catalogs written by older builds may lack the size; such locations still
/// match by `(file, index)` during filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub index: u32,
    #[serde(default)]
    pub size: Option<u64>,
}

impl Location {
    pub fn new(file: impl Into<String>, index: u32, size: u64) -> Self {
        Self {
            file: file.into(),
            index,
            size: Some(size),
        }
    }

    pub fn without_size(file: impl Into<String>, index: u32) -> Self {
        Self {
            file: file.into(),
            index,
            size: None,
        }
    }

    pub fn is_sized(&self) -> bool {
        self.size.is_some()
    }

    /// The `(file, index)` part of this location.
    pub fn prefix(&self) -> Location {
        Location::without_size(self.file.clone(), self.index)
    }

    /// Lower-cased file suffix, if any.
    pub fn suffix(&self) -> Option<String> {
        crate::paths::file_suffix(Path::new(&self.file))
    }

    /// File name under which this face can be addressed on its own.
    ///
    /// Members of a `.ttc` collection become `<stem>.<index>.ttf`.
    pub fn face_file_name(&self) -> String {
        match self.file.strip_suffix(".ttc") {
            Some(stem) => format!("{stem}.{}.ttf", self.index),
            None => self.file.clone(),
        }
    }
}

impl Record for Location {
    fn to_value(&self) -> Value {
        let mut items = vec![Value::atom(&self.file), Value::atom(self.index.to_string())];
        if let Some(size) = self.size {
            items.push(Value::atom(size.to_string()));
        }
        Value::Tuple(items)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_tuple()? {
            [Value::Atom(file), Value::Atom(index)] => {
                Some(Location::without_size(file, index.parse().ok()?))
            }
            [Value::Atom(file), Value::Atom(index), Value::Atom(size)] => {
                Some(Location::new(file, index.parse().ok()?, size.parse().ok()?))
            }
            _ => None,
        }
    }
}
