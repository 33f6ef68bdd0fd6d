// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::kind::Kind;
use crate::number::Number;
use crate::{InferError, Result};

use core::fmt;
use std::ops;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Key under which non-JSON values are tagged in the wire format.
pub const KIND_TAG: &str = "$kind";

pub type Record = IndexMap<Rc<str>, Value>;

/// Opaque handle to a traced function value.
///
/// Functions are only ever compared by identity; the inference never calls
/// into a function value it finds inside an argument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FunctionValue {
    name: Rc<str>,
}

impl FunctionValue {
    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }

    /// The function substituted by the oracle when probing whether a
    /// position accepts callables.
    pub fn identity() -> Self {
        Self::new("identity")
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// Values are copy-on-write: every container sits behind an Rc and is only
// ever mutated through Rc::make_mut, so a clone is observably a deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(Number),
    String(Rc<str>),
    Function(FunctionValue),
    Array(Rc<Vec<Value>>),

    // Records keep the key order in which the tracer saw them.
    Object(Rc<Record>),
}

/// One step of a path into a nested value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathSegment {
    Index(usize),
    Key(Rc<str>),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Key(k) => write!(f, ".{k}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s.as_ref()),
            Value::Number(n) => n.serialize(serializer),
            Value::Array(a) => a.serialize(serializer),
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields.iter() {
                    map.serialize_entry(k.as_ref(), v)?;
                }
                map.end()
            }

            // Values without a JSON counterpart are written tagged.
            Value::Undefined => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(KIND_TAG, "undefined")?;
                map.end()
            }
            Value::Function(f) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(KIND_TAG, "function")?;
                map.serialize_entry("name", f.name())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Value::from_wire(&raw).map_err(de::Error::custom)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{s}"),
            Err(_e) => Err(std::fmt::Error),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl Value {
    pub fn new_object() -> Value {
        Value::from(Record::new())
    }

    pub fn new_array() -> Value {
        Value::from(vec![])
    }

    pub fn function(name: &str) -> Value {
        Value::Function(FunctionValue::new(name))
    }

    /// Converts a wire-encoded value, rejecting unknown `$kind` tags.
    pub fn from_wire(raw: &serde_json::Value) -> Result<Value> {
        Ok(match Kind::classify(raw)? {
            Kind::Null => Value::Null,
            Kind::Undefined => Value::Undefined,
            Kind::Boolean => Value::Bool(raw.as_bool().unwrap_or_default()),
            Kind::Number => match raw.as_f64() {
                Some(f) => Value::from(f),
                None => {
                    return Err(InferError::UnsupportedValueKind {
                        kind: format!("number {raw}"),
                    })
                }
            },
            Kind::String => Value::String(raw.as_str().unwrap_or_default().into()),
            Kind::Function => {
                let name = raw
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("anonymous");
                Value::function(name)
            }
            Kind::Array => {
                let mut items = vec![];
                for item in raw.as_array().into_iter().flatten() {
                    items.push(Value::from_wire(item)?);
                }
                Value::from(items)
            }
            Kind::Object => {
                let mut record = Record::new();
                for (k, v) in raw.as_object().into_iter().flatten() {
                    record.insert(k.as_str().into(), Value::from_wire(v)?);
                }
                Value::from(record)
            }
        })
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Value> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Value> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(Rc::new(a))
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Object(Rc::new(r))
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_array(&self) -> anyhow::Result<&Vec<Value>> {
        match self {
            Value::Array(a) => Ok(a),
            _ => Err(anyhow::anyhow!("not an array")),
        }
    }

    pub fn as_array_mut(&mut self) -> anyhow::Result<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Ok(Rc::make_mut(a)),
            _ => Err(anyhow::anyhow!("not an array")),
        }
    }
}

impl Value {
    /// Whether this value is the kind of container `segment` indexes into.
    pub fn is_container_for(&self, segment: &PathSegment) -> bool {
        matches!(
            (self, segment),
            (Value::Array(_), PathSegment::Index(_)) | (Value::Object(_), PathSegment::Key(_))
        )
    }

    pub fn get_segment(&self, segment: &PathSegment) -> &Value {
        match segment {
            PathSegment::Index(i) => &self[*i],
            PathSegment::Key(k) => &self[k.as_ref()],
        }
    }

    pub fn get_path(&self, path: &[PathSegment]) -> &Value {
        path.iter().fold(self, |v, segment| v.get_segment(segment))
    }

    /// Mutable access to the slot at `path`, creating missing containers and
    /// padding arrays with `undefined` along the way.
    pub fn make_or_get_value_mut(&mut self, path: &[PathSegment]) -> &mut Value {
        let Some((segment, rest)) = path.split_first() else {
            return self;
        };

        if !self.is_container_for(segment) {
            *self = match segment {
                PathSegment::Index(_) => Value::new_array(),
                PathSegment::Key(_) => Value::new_object(),
            };
        }

        let slot = match (self, segment) {
            (Value::Array(a), PathSegment::Index(i)) => {
                let a = Rc::make_mut(a);
                if a.len() <= *i {
                    a.resize(*i + 1, Value::Undefined);
                }
                &mut a[*i]
            }
            (Value::Object(o), PathSegment::Key(k)) => Rc::make_mut(o)
                .entry(k.clone())
                .or_insert(Value::Undefined),
            // Replaced with a matching container above.
            (v, _) => v,
        };
        slot.make_or_get_value_mut(rest)
    }

    /// A copy of this value with the element at `segment` removed. Removing
    /// an array position drops it and everything after it, so the remaining
    /// positions keep their meaning.
    pub fn without_segment(&self, segment: &PathSegment) -> Value {
        let mut copy = self.clone();
        match (&mut copy, segment) {
            (Value::Array(a), PathSegment::Index(i)) => {
                let a = Rc::make_mut(a);
                if *i < a.len() {
                    a.truncate(*i);
                }
            }
            (Value::Object(o), PathSegment::Key(k)) => {
                Rc::make_mut(o).shift_remove(k);
            }
            _ => (),
        }
        copy
    }
}

impl ops::Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        match self {
            Value::Array(a) if index < a.len() => &a[index],
            _ => &Value::Undefined,
        }
    }
}

impl ops::Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Self::Output {
        match self {
            Value::Object(o) => match o.get(key) {
                Some(v) => v,
                _ => &Value::Undefined,
            },
            _ => &Value::Undefined,
        }
    }
}
