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

use odata_proxy_core::error::BoxError;
use odata_proxy_core::metadata::ACTION_TARGETS;
use odata_proxy_core::metadata::CREATE_REQUEST_METHOD;
use odata_proxy_core::metadata::ENTITY_SET_NAME;
use odata_proxy_core::metadata::ENTITY_TYPE_NAME;
use odata_proxy_core::metadata::NAMESPACE;
use odata_proxy_core::metadata::NAVIGATION_LINK_PREFIX;
use odata_proxy_core::metadata::UPDATE_REQUEST_METHOD;
use odata_proxy_core::response::project;
use odata_proxy_core::EntityMetadata;
use odata_proxy_core::TypeCoercer;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Service root of the demo OData service.
pub const DEMO_SERVICE: &str = "http://services.example/OData/OData.svc";
/// Redfish service host.
pub const BMC: &str = "https://bmc.example";

/// `ODataDemo.Product` declared as `Product.cdxml`.
#[must_use]
pub fn product() -> EntityMetadata {
    EntityMetadata::new("Product.cdxml")
        .with(ENTITY_TYPE_NAME, "ODataDemo.Product")
        .with(ENTITY_SET_NAME, "Products")
        .with(NAMESPACE, "ODataDemo")
        .with(CREATE_REQUEST_METHOD, "Post")
        .with(UPDATE_REQUEST_METHOD, "Merge")
}

/// Redfish `ComputerSystem` with reset action and processors link.
#[must_use]
pub fn computer_system() -> EntityMetadata {
    EntityMetadata::new("ComputerSystem.cdxml")
        .with(ENTITY_TYPE_NAME, "ComputerSystem.ComputerSystem")
        .with(ENTITY_SET_NAME, "Systems")
        .with(NAMESPACE, "ComputerSystem")
        .with(CREATE_REQUEST_METHOD, "Post")
        .with(UPDATE_REQUEST_METHOD, "Patch")
        .with(ACTION_TARGETS, "ComputerSystem.Reset=System")
}

/// Redfish `Processor` reached from `ComputerSystem.Processors`.
#[must_use]
pub fn processor() -> EntityMetadata {
    EntityMetadata::new("Processor.cdxml")
        .with(ENTITY_TYPE_NAME, "Processor.Processor")
        .with(ENTITY_SET_NAME, "Processors")
        .with(
            format!("{NAVIGATION_LINK_PREFIX}ComputerSystem"),
            "ComputerSystem|Processor|Processors|Collection",
        )
}

/// Coercer that knows a fixed set of types.
///
/// Objects of unknown types are not coerced. Objects of known types are
/// projected onto declared properties; undeclared members other than
/// annotations (`@...`, `odata.`) are an error.
#[derive(Debug, Default)]
pub struct Schema {
    types: HashMap<String, Vec<&'static str>>,
}

impl Schema {
    #[must_use]
    pub fn with(mut self, type_name: &str, properties: &[&'static str]) -> Self {
        self.types.insert(type_name.to_string(), properties.to_vec());
        self
    }

    #[must_use]
    pub fn demo() -> Self {
        Self::default().with("ODataDemo.Product", &["Id", "Name", "Price", "Rating"])
    }
}

impl TypeCoercer for Schema {
    fn coerce(&self, type_name: &str, object: &JsonValue) -> Result<Option<JsonValue>, BoxError> {
        let (Some(properties), Some(members)) = (self.types.get(type_name), object.as_object())
        else {
            return Ok(None);
        };
        let undeclared = members
            .keys()
            .filter(|name| !name.starts_with('@') && !name.starts_with("odata."))
            .find(|name| !properties.contains(&name.as_str()));
        if let Some(name) = undeclared {
            return Err(format!("member {name} is not declared by {type_name}").into());
        }
        Ok(Some(JsonValue::Object(project(members, properties))))
    }
}
