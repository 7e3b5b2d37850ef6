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

//! Outbound request description handed to the transport.

use crate::body::JSON_CONTENT_TYPE;
use crate::query::apply_query_options;
use crate::query::QuerySpec;
use http::HeaderMap;
use http::Method;
use serde_json::Value as JsonValue;

/// Query options of a read request, kept apart from its composed URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestQuery {
    /// URI the options were appended to.
    pub base_uri: String,
    /// Unencoded option name / value pairs in emission order.
    pub options: Vec<(String, String)>,
}

/// HTTP request built by the adapter.
///
/// `uri` is kept as composed text and query clauses in it are not
/// percent-encoded. Transports that send over the wire build the URL from
/// `query` when it is present.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URI.
    pub uri: String,
    /// Query options appended to `uri`.
    pub query: Option<RequestQuery>,
    /// JSON body.
    pub body: Option<JsonValue>,
    /// Content type of the body.
    pub content_type: Option<String>,
    /// Request headers.
    pub headers: HeaderMap,
}

impl HttpRequest {
    /// Request without body.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            query: None,
            body: None,
            content_type: None,
            headers: HeaderMap::new(),
        }
    }

    /// `GET` request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// `GET` request of `base_uri` with query options of `spec`.
    pub fn get_with_query(base_uri: &str, spec: &QuerySpec) -> Self {
        let mut request = Self::get(apply_query_options(base_uri, spec));
        if !spec.is_empty() {
            request.query = Some(RequestQuery {
                base_uri: base_uri.to_string(),
                options: spec.pairs(),
            });
        }
        request
    }

    /// Attach JSON body with the JSON content type.
    #[must_use]
    pub fn with_json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self.content_type = Some(JSON_CONTENT_TYPE.to_string());
        self
    }

    /// Replace headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Request together with the expected shape of its response.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Request to send.
    pub request: HttpRequest,
    /// Entity type response objects are coerced to.
    pub expected_type: String,
    /// Response is a single instance. Otherwise it is a collection that is
    /// unwrapped from its `value` member.
    pub single_instance: bool,
}
