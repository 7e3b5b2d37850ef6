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

//! Redfish object-graph traversal
//!
//! Redfish resources link to each other with `@odata.id` members and
//! publish their actions under `Actions`:
//!
//! ```json
//! {
//!   "@odata.id": "/redfish/v1/Systems/1",
//!   "Storage": { "@odata.id": "/redfish/v1/Systems/1/Storage" },
//!   "Actions": {
//!     "#ComputerSystem.Reset": {
//!       "target": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"
//!     }
//!   }
//! }
//! ```
//!
//! Functions of this module resolve request targets from such objects.

use crate::metadata::NavigationLink;
use crate::Error;
use serde_json::Value as JsonValue;
use url::Url;

const ODATA_ID: &str = "@odata.id";
const ACTIONS: &str = "Actions";
const ACTION_TARGET: &str = "target";

/// `@odata.id` of `object`.
///
/// # Errors
///
/// `Error::RedfishTarget` if member is absent or not a string.
pub fn odata_id(object: &JsonValue) -> Result<&str, Error> {
    object
        .get(ODATA_ID)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::RedfishTarget(format!("object has no {ODATA_ID}")))
}

/// Target of action `#<action>` in `Actions` of `object`.
///
/// # Errors
///
/// `Error::RedfishTarget` if action or its target is absent.
pub fn action_target<'a>(object: &'a JsonValue, action: &str) -> Result<&'a str, Error> {
    object
        .get(ACTIONS)
        .and_then(|actions| actions.get(format!("#{action}")))
        .and_then(|action| action.get(ACTION_TARGET))
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::RedfishTarget(format!("object has no target of action #{action}")))
}

/// `@odata.id` values referenced by navigation property `link` of
/// `parent`.
///
/// # Errors
///
/// `Error::RedfishTarget` if property is absent, has unexpected shape or a
/// member lacks `@odata.id`.
pub fn navigation_targets<'a>(
    parent: &'a JsonValue,
    link: &NavigationLink,
) -> Result<Vec<&'a str>, Error> {
    let property = parent.get(&link.property).ok_or_else(|| {
        Error::RedfishTarget(format!("object has no navigation property {}", link.property))
    })?;
    if link.is_collection {
        property
            .as_array()
            .ok_or_else(|| {
                Error::RedfishTarget(format!("navigation property {} is not a collection", link.property))
            })?
            .iter()
            .map(odata_id)
            .collect()
    } else {
        odata_id(property).map(|id| vec![id])
    }
}

/// Replace path of `host` with `odata_id`.
///
/// # Errors
///
/// `Error::InvalidUri` if `host` is not an absolute URI.
pub fn resolve(host: &str, odata_id: &str) -> Result<String, Error> {
    let mut url = Url::parse(host).map_err(|err| Error::InvalidUri(host.to_string(), err))?;
    url.set_path(odata_id);
    Ok(url.into())
}
