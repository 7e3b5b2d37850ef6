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

//! Response records
//!
//! The transport returns a stream of records. Objects are coerced to the
//! expected entity type and written to a [`RecordSink`]; all other records
//! are forwarded unchanged. Order is preserved.

use crate::error::BoxError;
use crate::Error;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;
use tracing::warn;

/// Tag of the information record that carries collection metadata.
pub const ADDITIONAL_INFO_TAG: &str = "AdditionalInfo";

const ODATA_ID: &str = "@odata.id";
const ODATA_ID_FIELD: &str = "odataId";
const COLLECTION_MEMBERS: &str = "value";

/// Record produced by the transport for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseRecord {
    /// Response object.
    Object(JsonValue),
    /// Non-terminating error.
    Error(String),
    /// Verbose message.
    Verbose(String),
    /// Warning.
    Warning(String),
    /// Debug message.
    Debug(String),
    /// Informational record.
    Information {
        /// Tags of the record.
        tags: Vec<String>,
        /// Payload.
        data: JsonValue,
    },
}

/// Receiver of mapped response records.
pub trait RecordSink {
    /// Output object.
    fn write_object(&mut self, object: JsonValue);
    /// Non-terminating error.
    fn write_error(&mut self, message: String);
    /// Warning.
    fn write_warning(&mut self, message: String);
    /// Verbose message.
    fn write_verbose(&mut self, message: String);
    /// Debug message.
    fn write_debug(&mut self, message: String);
    /// Informational record.
    fn write_information(&mut self, tags: Vec<String>, data: JsonValue);
}

/// Sink that keeps records in memory.
impl RecordSink for Vec<ResponseRecord> {
    fn write_object(&mut self, object: JsonValue) {
        self.push(ResponseRecord::Object(object));
    }

    fn write_error(&mut self, message: String) {
        self.push(ResponseRecord::Error(message));
    }

    fn write_warning(&mut self, message: String) {
        self.push(ResponseRecord::Warning(message));
    }

    fn write_verbose(&mut self, message: String) {
        self.push(ResponseRecord::Verbose(message));
    }

    fn write_debug(&mut self, message: String) {
        self.push(ResponseRecord::Debug(message));
    }

    fn write_information(&mut self, tags: Vec<String>, data: JsonValue) {
        self.push(ResponseRecord::Information { tags, data });
    }
}

/// Conversion of response objects to the expected entity type.
pub trait TypeCoercer {
    /// Coerce `object` to `type_name`.
    ///
    /// `Ok(None)` means the object cannot be represented as `type_name`
    /// and is written as received with a warning.
    ///
    /// # Errors
    ///
    /// Object conflicts with the type. This ends the invocation.
    fn coerce(&self, type_name: &str, object: &JsonValue) -> Result<Option<JsonValue>, BoxError>;
}

/// Coercer that accepts every object as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Untyped;

impl TypeCoercer for Untyped {
    fn coerce(&self, _: &str, object: &JsonValue) -> Result<Option<JsonValue>, BoxError> {
        Ok(Some(object.clone()))
    }
}

/// Maps the records of one request onto a sink.
#[derive(Debug, Clone)]
pub struct ResponseMapper<'a> {
    /// Requested URI, used in error reports.
    pub uri: &'a str,
    /// Type objects are coerced to.
    pub type_name: &'a str,
    /// Skip coercion and write objects as received.
    pub allow_additional_data: bool,
    /// Response is a single instance.
    pub single_instance: bool,
}

impl ResponseMapper<'_> {
    /// Forward `records` to `sink`.
    ///
    /// # Errors
    ///
    /// `Error::TypeCoercion` if an object conflicts with the expected type
    /// and additional data is not allowed. Records before the failing
    /// object are already written.
    pub fn forward<S, C>(&self, records: Vec<ResponseRecord>, sink: &mut S, coercer: &C) -> Result<(), Error>
    where
        S: RecordSink + ?Sized,
        C: TypeCoercer + ?Sized,
    {
        for record in records {
            match record {
                ResponseRecord::Object(object) if self.single_instance => {
                    self.write_object(object, sink, coercer)?;
                }
                ResponseRecord::Object(object) => self.write_collection(object, sink, coercer)?,
                ResponseRecord::Error(message) => sink.write_error(message),
                ResponseRecord::Verbose(message) => sink.write_verbose(message),
                ResponseRecord::Warning(message) => sink.write_warning(message),
                ResponseRecord::Debug(message) => sink.write_debug(message),
                ResponseRecord::Information { tags, data } => sink.write_information(tags, data),
            }
        }
        Ok(())
    }

    fn write_collection<S, C>(&self, object: JsonValue, sink: &mut S, coercer: &C) -> Result<(), Error>
    where
        S: RecordSink + ?Sized,
        C: TypeCoercer + ?Sized,
    {
        let JsonValue::Object(mut members) = object else {
            return self.write_object(object, sink, coercer);
        };
        let Some(items) = members.shift_remove(COLLECTION_MEMBERS) else {
            return self.write_object(JsonValue::Object(members), sink, coercer);
        };
        if !members.is_empty() {
            sink.write_information(vec![ADDITIONAL_INFO_TAG.into()], JsonValue::Object(members));
        }
        match items {
            JsonValue::Array(items) => items
                .into_iter()
                .try_for_each(|item| self.write_object(item, sink, coercer)),
            item => self.write_object(item, sink, coercer),
        }
    }

    fn write_object<S, C>(&self, object: JsonValue, sink: &mut S, coercer: &C) -> Result<(), Error>
    where
        S: RecordSink + ?Sized,
        C: TypeCoercer + ?Sized,
    {
        if self.allow_additional_data {
            sink.write_object(object);
            return Ok(());
        }
        match coercer.coerce(self.type_name, &object) {
            Ok(Some(coerced)) => sink.write_object(copy_odata_id(&object, coerced)),
            Ok(None) => {
                warn!(type_name = self.type_name, uri = self.uri, "response object is not coerced");
                sink.write_warning(format!(
                    "response object cannot be converted to {}; it is written as received",
                    self.type_name
                ));
                sink.write_object(object);
            }
            Err(source) => {
                return Err(Error::TypeCoercion {
                    type_name: self.type_name.to_string(),
                    uri: self.uri.to_string(),
                    source,
                })
            }
        }
        Ok(())
    }
}

fn copy_odata_id(source: &JsonValue, mut coerced: JsonValue) -> JsonValue {
    if let (Some(id), Some(target)) = (source.get(ODATA_ID), coerced.as_object_mut()) {
        target.insert(ODATA_ID_FIELD.into(), id.clone());
    }
    coerced
}

/// Remove members whose names are not in `allowed`.
///
/// Helper for coercers that project objects onto declared properties.
#[must_use]
pub fn project(object: &JsonMap<String, JsonValue>, allowed: &[&str]) -> JsonMap<String, JsonValue> {
    object
        .iter()
        .filter(|(name, _)| allowed.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
