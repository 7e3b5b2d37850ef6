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

//! Expectations for Transport Mock.

use http::Method;
use odata_proxy_core::ResponseRecord;
use serde_json::from_str;
use serde_json::Value as JsonValue;
use std::fmt::Display;

pub type Response<E> = Result<Vec<ResponseRecord>, E>;

/// Request expected by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedRequest {
    /// Expected method.
    pub method: Method,
    /// Expected URI, compared verbatim.
    pub uri: String,
    /// Expected JSON body.
    pub body: Option<JsonValue>,
}

/// Expectation for the tests.
#[derive(Debug)]
pub struct Expect<E> {
    pub request: ExpectedRequest,
    pub response: Response<E>,
}

fn json(v: impl Display) -> JsonValue {
    from_str(&v.to_string()).expect("invalid json")
}

impl<E> Expect<E> {
    fn new(method: Method, uri: impl Display, body: Option<JsonValue>, response: Response<E>) -> Self {
        Self {
            request: ExpectedRequest {
                method,
                uri: uri.to_string(),
                body,
            },
            response,
        }
    }

    pub fn get(uri: impl Display, response: impl Display) -> Self {
        Self::new(
            Method::GET,
            uri,
            None,
            Ok(vec![ResponseRecord::Object(json(response))]),
        )
    }

    pub fn create(uri: impl Display, request: impl Display, response: impl Display) -> Self {
        Self::new(
            Method::POST,
            uri,
            Some(json(request)),
            Ok(vec![ResponseRecord::Object(json(response))]),
        )
    }

    pub fn update(uri: impl Display, request: impl Display, response: impl Display) -> Self {
        Self::new(
            Method::PATCH,
            uri,
            Some(json(request)),
            Ok(vec![ResponseRecord::Object(json(response))]),
        )
    }

    pub fn action(uri: impl Display, request: impl Display, response: impl Display) -> Self {
        Self::create(uri, request, response)
    }

    /// Request that completes without content.
    pub fn no_content(method: Method, uri: impl Display, request: Option<&str>) -> Self {
        Self::new(method, uri, request.map(json), Ok(Vec::new()))
    }

    pub fn delete(uri: impl Display) -> Self {
        Self::no_content(Method::DELETE, uri, None)
    }

    /// Request that fails in transport.
    pub fn error(method: Method, uri: impl Display, err: E) -> Self {
        Self::new(method, uri, None, Err(err))
    }

    /// Expect request body. Used together with [`Self::error`].
    #[must_use]
    pub fn with_body(mut self, request: impl Display) -> Self {
        self.request.body = Some(json(request));
        self
    }

    /// Append record to a successful response.
    #[must_use]
    pub fn with_record(mut self, record: ResponseRecord) -> Self {
        if let Ok(records) = &mut self.response {
            records.push(record);
        }
        self
    }
}
