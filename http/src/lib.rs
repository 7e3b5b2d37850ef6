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

//! HTTP transport of the proxy core.
//!
//! [`reqwest::Client`] implements [`Transport`] on top of a shared
//! `reqwest` connection pool. Each successful response with a JSON body
//! becomes one [`ResponseRecord::Object`]; empty bodies produce no records.

#[cfg(feature = "reqwest")]
pub mod reqwest;

use http::HeaderMap;
use http::HeaderValue;
use odata_proxy_core::ResponseRecord;
use serde_json::Value as JsonValue;
use url::Url;

#[doc(inline)]
pub use odata_proxy_core::RequestContext;
#[doc(inline)]
pub use odata_proxy_core::Transport;

const ODATA_ETAG: &str = "@odata.etag";

/// Turn decoded response body into records.
///
/// The `ETag` header, if present, is copied into `@odata.etag` of an
/// object body so that callers can use it for conditional updates.
#[must_use]
pub fn body_records(body: Option<JsonValue>, headers: &HeaderMap) -> Vec<ResponseRecord> {
    let Some(mut body) = body else {
        return Vec::new();
    };
    if let Some(etag) = headers.get(http::header::ETAG).and_then(etag_value) {
        if let Some(object) = body.as_object_mut() {
            object.insert(ODATA_ETAG.into(), JsonValue::String(etag));
        }
    }
    vec![ResponseRecord::Object(body)]
}

fn etag_value(header: &HeaderValue) -> Option<String> {
    header.to_str().ok().map(str::to_string)
}

/// Strip user info from `uri` before it is written to logs.
#[must_use]
pub fn redacted_uri(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            // Cannot fail for URLs that already carry user info.
            let _ = url.set_username("");
            let _ = url.set_password(None);
            url.into()
        }
        Err(_) => uri.to_string(),
    }
}
