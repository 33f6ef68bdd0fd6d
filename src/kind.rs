// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::{Value, KIND_TAG};
use crate::{InferError, Result};

use core::fmt;

use serde::{Deserialize, Serialize};

/// The eight kinds of traced value. Each one owns an independent component
/// of a [`Type`](crate::Type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Kind {
    Null,
    Undefined,
    Boolean,
    Number,
    String,
    Function,
    Array,
    Object,
}

impl Kind {
    pub const ALL: [Kind; 8] = [
        Kind::Null,
        Kind::Undefined,
        Kind::Boolean,
        Kind::Number,
        Kind::String,
        Kind::Function,
        Kind::Array,
        Kind::Object,
    ];

    /// Classifies a wire-encoded value.
    ///
    /// Plain JSON maps onto the obvious kinds. Values JSON cannot express
    /// arrive as objects tagged with `$kind`; a tag outside the closed set
    /// is a modeling gap and fails with `UnsupportedValueKind`.
    pub fn classify(raw: &serde_json::Value) -> Result<Kind> {
        use serde_json::Value as Json;
        Ok(match raw {
            Json::Null => Kind::Null,
            Json::Bool(_) => Kind::Boolean,
            Json::Number(_) => Kind::Number,
            Json::String(_) => Kind::String,
            Json::Array(_) => Kind::Array,
            Json::Object(fields) => match fields.get(KIND_TAG) {
                None => Kind::Object,
                Some(Json::String(tag)) if tag == "undefined" => Kind::Undefined,
                Some(Json::String(tag)) if tag == "function" => Kind::Function,
                Some(Json::String(tag)) => {
                    return Err(InferError::UnsupportedValueKind { kind: tag.clone() })
                }
                Some(other) => {
                    return Err(InferError::UnsupportedValueKind {
                        kind: other.to_string(),
                    })
                }
            },
        })
    }

    /// The `typeof` category this kind falls under. Null, arrays and records
    /// all report `object`.
    pub fn typeof_tag(&self) -> &'static str {
        match self {
            Kind::Null | Kind::Array | Kind::Object => "object",
            Kind::Undefined => "undefined",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Function => "function",
        }
    }

    /// Kinds covered by a `typeof` tag. Tags the traced language can produce
    /// but this model has no component for (`symbol`, `bigint`) cover
    /// nothing.
    pub fn from_typeof_tag(tag: &str) -> &'static [Kind] {
        match tag {
            "object" => &[Kind::Null, Kind::Array, Kind::Object],
            "undefined" => &[Kind::Undefined],
            "boolean" => &[Kind::Boolean],
            "number" => &[Kind::Number],
            "string" => &[Kind::String],
            "function" => &[Kind::Function],
            _ => &[],
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Function => "function",
            Kind::Array => "array",
            Kind::Object => "object",
        };
        f.write_str(name)
    }
}

impl Value {
    /// In-memory values are already confined to the closed set of kinds, so
    /// this never fails.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Undefined => Kind::Undefined,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Function(_) => Kind::Function,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }
}
