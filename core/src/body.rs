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

//! Request body construction.
//!
//! Bodies are JSON objects that keep parameter order. Null values are
//! skipped, collections are wrapped as `{"results": [...]}` and the
//! optional `__metadata` member carries the entity type name.

use crate::path::Key;
use crate::Error;
use crate::Value;
use serde_json::json;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;

/// Content type of requests that carry a body.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

fn member(value: &Value) -> Result<JsonValue, Error> {
    let v = serde_json::to_value(value).map_err(Error::Body)?;
    Ok(match value {
        Value::Collection(_) => json!({ "results": v }),
        _ => v,
    })
}

/// Serialize keys and parameters into a request body.
///
/// Keys come first, followed by `parameters` in their order. A later
/// member with the same name replaces an earlier one in place.
///
/// # Errors
///
/// `Error::Body` if a value cannot be represented as JSON.
pub fn serialize_parameters<'a, I>(
    keys: &'a [Key],
    parameters: I,
    type_name: Option<&str>,
) -> Result<JsonValue, Error>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut body = JsonMap::new();
    let members = keys
        .iter()
        .map(|k| (k.name.as_str(), &k.value))
        .chain(parameters);
    for (name, value) in members {
        if !value.is_null() {
            body.insert(name.to_string(), member(value)?);
        }
    }
    if let Some(type_name) = type_name {
        body.insert("__metadata".into(), json!({ "type": type_name }));
    }
    Ok(JsonValue::Object(body))
}

/// Association link body: `{"url": "<target>"}`.
#[must_use]
pub fn link_body(target: &str) -> JsonValue {
    json!({ "url": target })
}
