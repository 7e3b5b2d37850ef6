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

//! Protocol policy
//!
//! OData v1-v3, OData v4 and Redfish differ in a fixed set of points.
//! [`Protocol`] is selected once per adapter and answers each of them:
//!
//! | Policy point | `ODataV3` | `ODataV4` | `Redfish` |
//! |--------------|-----------|-----------|-----------|
//! | Key predicate | embedded | embedded or separate (`UriResourcePathKeyFormat`) | as `ODataV4` |
//! | Default headers | none | `Accept`, `OData-Version` if absent | as `ODataV4` |
//! | `$format=json` | appended | never | never |
//! | Single instance | key predicate | key predicate or `IsSingleton` | as `ODataV4` |
//! | Unbound actions | static path | parameter list call form | `Actions` target |
//! | Navigation base | last segment rewritten | unchanged, given name | not used |
//! | Endpoint override | entity segment kept | as `ODataV3` | override used verbatim |

use crate::metadata::EntityMetadata;
use crate::path::build_endpoint;
use crate::path::format_key_predicate;
use crate::path::rewrite_base_uri;
use crate::path::Key;
use crate::path::KeyFormat;
use crate::Error;
use http::header::ACCEPT;
use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;

/// `OData-Version` header.
pub const ODATA_VERSION: HeaderName = HeaderName::from_static("odata-version");

const DEFAULT_ODATA_VERSION: &str = "4.0";
const DEFAULT_ACCEPT: &str = "application/json";
const FORMAT_OPTION: &str = "$format=json";

/// Protocol variant of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// OData versions 1 to 3.
    #[default]
    ODataV3,
    /// OData version 4.
    ODataV4,
    /// DMTF Redfish (OData v4 based).
    Redfish,
}

impl Protocol {
    /// True for OData v4 and Redfish.
    #[must_use]
    pub const fn is_v4(self) -> bool {
        matches!(self, Self::ODataV4 | Self::Redfish)
    }

    /// Endpoint of the entity for the declared `default_uri`.
    ///
    /// # Errors
    ///
    /// `Error::MalformedUri` if `default_uri` cannot be relocated.
    pub fn endpoint(self, default_uri: &str, connection: Option<&str>) -> Result<String, Error> {
        match (self, connection) {
            (Self::Redfish, Some(connection)) => Ok(connection.to_string()),
            _ => build_endpoint(default_uri, connection),
        }
    }

    /// Key format of the entity.
    #[must_use]
    pub fn key_format(self, metadata: &EntityMetadata) -> KeyFormat {
        if self.is_v4() {
            metadata.key_format()
        } else {
            KeyFormat::Embedded
        }
    }

    /// Key predicate of the entity instance.
    ///
    /// # Errors
    ///
    /// `Error::NullKeyValue` if any key is null.
    pub fn key_predicate(self, keys: &[Key], metadata: &EntityMetadata) -> Result<String, Error> {
        format_key_predicate(keys, self.key_format(metadata))
    }

    /// Headers with protocol defaults added where missing. Header names are
    /// compared case-insensitively.
    #[must_use]
    pub fn default_headers(self, mut headers: HeaderMap) -> HeaderMap {
        if self.is_v4() {
            if !headers.contains_key(ACCEPT) {
                headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
            }
            if !headers.contains_key(&ODATA_VERSION) {
                headers.insert(ODATA_VERSION, HeaderValue::from_static(DEFAULT_ODATA_VERSION));
            }
        }
        headers
    }

    /// True if `$format=json` is requested explicitly.
    #[must_use]
    pub const fn appends_format(self) -> bool {
        matches!(self, Self::ODataV3)
    }

    /// Append default query parameters to a request URI.
    #[must_use]
    pub fn build_odata_uri(self, uri: &str) -> String {
        if self.appends_format() {
            format!("{uri}?{FORMAT_OPTION}")
        } else {
            uri.to_string()
        }
    }

    /// True if a read returns one instance instead of a collection.
    #[must_use]
    pub fn is_single_instance(self, predicate: &str, metadata: &EntityMetadata) -> bool {
        !predicate.is_empty() || (self.is_v4() && metadata.is_singleton())
    }

    /// Base URI and trailing segment of an association read.
    ///
    /// # Errors
    ///
    /// `Error::MalformedUri` if `endpoint` has no last segment to rewrite.
    pub fn navigation_base_uri(
        self,
        endpoint: &str,
        referred: &str,
    ) -> Result<(String, String), Error> {
        if self.is_v4() {
            Ok((endpoint.to_string(), referred.to_string()))
        } else {
            rewrite_base_uri(endpoint, referred)
        }
    }

    /// True if unbound actions pass ordinary parameters in the path.
    #[must_use]
    pub const fn wraps_parameter_list_for_unbound_actions(self) -> bool {
        matches!(self, Self::ODataV4)
    }
}
