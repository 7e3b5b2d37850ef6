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

//! Per-entity metadata
//!
//! Read-only string map declared next to every proxied entity. It names
//! the entity type and set, the HTTP verbs used for create and update,
//! and the protocol-specific hints described on the accessors below.
//!
//! Metadata can be loaded from TOML:
//!
//! ```rust
//! use odata_proxy_core::metadata::EntityMetadata;
//!
//! let metadata: EntityMetadata = toml::from_str(
//!     r#"
//!     source = "Product.cdxml"
//!     [entries]
//!     EntityTypeName = "ODataDemo.Product"
//!     EntitySetName = "Products"
//!     CreateRequestMethod = "Post"
//!     "#,
//! )?;
//! assert_eq!(metadata.entity_type_name()?, "ODataDemo.Product");
//! assert_eq!(metadata.create_request_method()?, http::Method::POST);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::path::KeyFormat;
use crate::Error;
use http::Method;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Entity type name.
pub const ENTITY_TYPE_NAME: &str = "EntityTypeName";
/// Entity set name.
pub const ENTITY_SET_NAME: &str = "EntitySetName";
/// HTTP verb of create and action requests.
pub const CREATE_REQUEST_METHOD: &str = "CreateRequestMethod";
/// HTTP verb of update requests.
pub const UPDATE_REQUEST_METHOD: &str = "UpdateRequestMethod";
/// Key placement in resource path.
pub const URI_RESOURCE_PATH_KEY_FORMAT: &str = "UriResourcePathKeyFormat";
/// Entity is a singleton.
pub const IS_SINGLETON: &str = "IsSingleton";
/// Schema namespace of actions.
pub const NAMESPACE: &str = "Namespace";
/// Action name to target parameter mapping.
pub const ACTION_TARGETS: &str = "ActionTargets";
/// Prefix of navigation-link descriptors.
pub const NAVIGATION_LINK_PREFIX: &str = "NavigationLink";
/// Pass transport errors through unwrapped.
pub const PASS_INNER_EXCEPTION: &str = "PassInnerException";

/// Navigation-link descriptor of a parent type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLink {
    /// Property of the parent object that holds the link.
    pub property: String,
    /// Property holds a collection of links.
    pub is_collection: bool,
}

/// Metadata of one proxied entity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityMetadata {
    /// Declaration the metadata comes from. Used in error reports.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl EntityMetadata {
    /// Empty metadata of the declaration `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Add entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Raw entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// True if entry is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entry that must be present.
    ///
    /// # Errors
    ///
    /// `Error::MissingMetadata` if entry is absent.
    pub fn require(&self, key: &str) -> Result<&str, Error> {
        self.get(key).ok_or_else(|| Error::MissingMetadata {
            key: key.to_string(),
            command: self.source.clone(),
        })
    }

    /// `EntityTypeName`.
    ///
    /// # Errors
    ///
    /// `Error::MissingMetadata` if entry is absent.
    pub fn entity_type_name(&self) -> Result<&str, Error> {
        self.require(ENTITY_TYPE_NAME)
    }

    /// `EntitySetName`.
    ///
    /// # Errors
    ///
    /// `Error::MissingMetadata` if entry is absent.
    pub fn entity_set_name(&self) -> Result<&str, Error> {
        self.require(ENTITY_SET_NAME)
    }

    /// `Namespace`.
    ///
    /// # Errors
    ///
    /// `Error::MissingMetadata` if entry is absent.
    pub fn namespace(&self) -> Result<&str, Error> {
        self.require(NAMESPACE)
    }

    /// `CreateRequestMethod`, upper-cased.
    ///
    /// # Errors
    ///
    /// - `Error::MissingMetadata` if entry is absent
    /// - `Error::InvalidMetadata` if entry is not an HTTP method
    pub fn create_request_method(&self) -> Result<Method, Error> {
        self.request_method(CREATE_REQUEST_METHOD)
    }

    /// `UpdateRequestMethod`, upper-cased.
    ///
    /// # Errors
    ///
    /// - `Error::MissingMetadata` if entry is absent
    /// - `Error::InvalidMetadata` if entry is not an HTTP method
    pub fn update_request_method(&self) -> Result<Method, Error> {
        self.request_method(UPDATE_REQUEST_METHOD)
    }

    fn request_method(&self, key: &str) -> Result<Method, Error> {
        let value = self.require(key)?;
        Method::from_bytes(value.to_ascii_uppercase().as_bytes()).map_err(|_| {
            Error::InvalidMetadata {
                key: key.to_string(),
                value: value.to_string(),
            }
        })
    }

    /// Key format selected by `UriResourcePathKeyFormat`. Anything other
    /// than `EmbeddedKey` selects separate keys.
    #[must_use]
    pub fn key_format(&self) -> KeyFormat {
        match self.get(URI_RESOURCE_PATH_KEY_FORMAT) {
            Some(v) if v != KeyFormat::Embedded.as_str() => KeyFormat::Separate,
            _ => KeyFormat::Embedded,
        }
    }

    /// `IsSingleton` parsed as boolean. Unparsable values are `false`.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.get(IS_SINGLETON).is_some_and(parse_bool)
    }

    /// `PassInnerException` equals `True` (case-insensitive).
    #[must_use]
    pub fn pass_inner_exception(&self) -> bool {
        self.get(PASS_INNER_EXCEPTION)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Parameter that holds the object with the action, looked up in
    /// `ActionTargets` (`Name=Parameter|Name2=Parameter2`). Names are
    /// compared case-insensitively; the last matching entry wins.
    #[must_use]
    pub fn action_target(&self, action: &str) -> Option<&str> {
        self.get(ACTION_TARGETS)?
            .split('|')
            .filter_map(|entry| entry.split_once('='))
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(action))
            .map(|(_, parameter)| parameter.trim())
            .last()
    }

    /// Navigation-link descriptor `NavigationLink<parent_type>`.
    ///
    /// The descriptor is `|`-separated; third part is the property name and
    /// last part `Collection` marks a collection of links.
    ///
    /// # Errors
    ///
    /// `Error::InvalidMetadata` if descriptor has fewer than three parts.
    pub fn navigation_link(&self, parent_type: &str) -> Result<Option<NavigationLink>, Error> {
        let key = format!("{NAVIGATION_LINK_PREFIX}{parent_type}");
        let Some(descriptor) = self.get(&key) else {
            return Ok(None);
        };
        let parts = descriptor.split('|').collect::<Vec<_>>();
        match parts.as_slice() {
            [_, _, property, ..] => Ok(Some(NavigationLink {
                property: (*property).to_string(),
                is_collection: parts
                    .last()
                    .is_some_and(|last| last.eq_ignore_ascii_case("Collection")),
            })),
            _ => Err(Error::InvalidMetadata {
                key,
                value: descriptor.to_string(),
            }),
        }
    }
}

fn parse_bool(v: &str) -> bool {
    v.trim().eq_ignore_ascii_case("true")
}
