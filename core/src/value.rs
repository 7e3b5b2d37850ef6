// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parameter and key values
//!
//! [`Value`] is the value model for keys, query options and method
//! parameters. It keeps the distinctions that OData URI literals need
//! (integral vs. other numbers, `Edm.Guid`, `Edm.DateTimeOffset`) and
//! carries structured objects (for example Redfish resources bound to a
//! method call) as [`serde_json::Value`].
//!
//! Literal rules used in key predicates:
//! - integral types render bare: `7`
//! - GUIDs render as `guid'…'`
//! - all other scalars render single-quoted: `'apple'`
//!
//! ```rust
//! use odata_proxy_core::Value;
//!
//! assert_eq!(Value::from(7).key_literal().as_deref(), Some("7"));
//! assert_eq!(Value::from("apple").key_literal().as_deref(), Some("'apple'"));
//! assert_eq!(Value::Null.key_literal(), None);
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value as JsonValue;
use std::fmt::Display;
use std::fmt::Error as FmtError;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// Value of a key, query option or method parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value.
    Null,
    /// `Edm.Boolean`.
    Boolean(bool),
    /// `Edm.Int16`.
    Int16(i16),
    /// `Edm.Int32`.
    Int32(i32),
    /// `Edm.Int64`.
    Int64(i64),
    /// `Edm.Decimal`.
    Decimal(Decimal),
    /// `Edm.Double`.
    Double(f64),
    /// `Edm.Guid`.
    Guid(Uuid),
    /// `Edm.DateTimeOffset`, rendered as RFC 3339.
    DateTimeOffset(OffsetDateTime),
    /// `Edm.String`.
    String(String),
    /// Multi-valued parameter.
    Collection(Vec<Value>),
    /// Structured object (complex value or bound resource).
    Object(JsonValue),
}

impl Value {
    /// Returns true if the value is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for `Edm.Int16`, `Edm.Int32` and `Edm.Int64`.
    #[must_use]
    pub const fn is_integral(&self) -> bool {
        matches!(self, Self::Int16(_) | Self::Int32(_) | Self::Int64(_))
    }

    /// Value as string slice if it is [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Structured object if value is [`Value::Object`].
    #[must_use]
    pub const fn as_object(&self) -> Option<&JsonValue> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// OData URI literal of the value. `None` for [`Value::Null`].
    ///
    /// Quotes inside quoted literals are doubled.
    #[must_use]
    pub fn key_literal(&self) -> Option<String> {
        match self {
            Self::Null => None,
            v if v.is_integral() => Some(v.to_string()),
            Self::Guid(g) => Some(format!("guid'{g}'")),
            v => Some(format!("'{}'", v.to_string().replace('\'', "''"))),
        }
    }

    /// Convert JSON value into parameter value.
    ///
    /// Integers that fit `i64` become [`Value::Int64`], other numbers
    /// [`Value::Double`], arrays become collections and objects stay
    /// structured.
    #[must_use]
    pub fn from_json(v: JsonValue) -> Self {
        match v {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Boolean(b),
            JsonValue::Number(n) => n
                .as_i64()
                .map(Self::Int64)
                .or_else(|| n.as_f64().map(Self::Double))
                .unwrap_or_else(|| Self::String(n.to_string())),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => {
                Self::Collection(items.into_iter().map(Self::from_json).collect())
            }
            v @ JsonValue::Object(_) => Self::Object(v),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(v) => v.fmt(f),
            Self::Int16(v) => v.fmt(f),
            Self::Int32(v) => v.fmt(f),
            Self::Int64(v) => v.fmt(f),
            Self::Decimal(v) => v.fmt(f),
            Self::Double(v) => v.fmt(f),
            Self::Guid(v) => v.hyphenated().fmt(f),
            Self::DateTimeOffset(v) => {
                let s = v.format(&Rfc3339).map_err(|_| FmtError)?;
                f.write_str(&s)
            }
            Self::String(v) => v.fmt(f),
            Self::Collection(items) => {
                let mut delimiter = "";
                items.iter().try_for_each(|v| {
                    write!(f, "{delimiter}{v}")?;
                    delimiter = ",";
                    Ok(())
                })
            }
            Self::Object(v) => v.fmt(f),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::Int16(v) => serializer.serialize_i16(*v),
            Self::Int32(v) => serializer.serialize_i32(*v),
            Self::Int64(v) => serializer.serialize_i64(*v),
            Self::Decimal(v) => Serialize::serialize(v, serializer),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::Guid(v) => v.serialize(serializer),
            Self::DateTimeOffset(v) => time::serde::rfc3339::serialize(v, serializer),
            Self::String(v) => serializer.serialize_str(v),
            Self::Collection(items) => items.serialize(serializer),
            Self::Object(v) => v.serialize(serializer),
        }
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Guid(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Self::DateTimeOffset(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Collection(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Self::from_json(v)
    }
}
