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

//! Transport collaborator
//!
//! The adapter does not perform I/O itself. A [`Transport`] sends one
//! [`HttpRequest`] and returns the records produced for it. Implementors
//! return `Send` futures so adapters can be used from multithreaded async
//! runtimes.

use crate::config::ConnectionConfig;
use crate::config::Credentials;
use crate::request::HttpRequest;
use crate::response::ResponseRecord;
use std::error::Error as StdError;
use std::future::Future;

/// Authentication and TLS settings of a request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Basic authentication credentials.
    pub credentials: Option<Credentials>,
    /// Client certificate thumbprint.
    pub certificate_thumbprint: Option<String>,
    /// Do not validate server certificate.
    pub skip_certificate_check: bool,
}

impl From<&ConnectionConfig> for RequestContext {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            credentials: config.credentials.clone(),
            certificate_thumbprint: config.certificate_thumbprint.clone(),
            skip_certificate_check: config.skip_certificate_check,
        }
    }
}

/// HTTP transport.
pub trait Transport: Send + Sync {
    /// Transport error.
    type Error: StdError + Send + Sync + 'static;

    /// Send request and collect response records.
    fn send(
        &self,
        request: &HttpRequest,
        context: &RequestContext,
    ) -> impl Future<Output = Result<Vec<ResponseRecord>, Self::Error>> + Send;
}
