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

use crate::body_records;
use crate::redacted_uri;
use http::header;
use odata_proxy_core::HttpRequest;
use odata_proxy_core::RequestContext;
use odata_proxy_core::ResponseRecord;
use odata_proxy_core::Transport;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub enum ProxyHttpError {
    ReqwestError(reqwest::Error),
    JsonError(serde_path_to_error::Error<serde_json::Error>),
    BodyError(serde_json::Error),
    ErrorResponse {
        status: reqwest::StatusCode,
        body: String,
    },
    NotSupported(&'static str),
    InvalidUrl(url::ParseError),
}

impl From<reqwest::Error> for ProxyHttpError {
    fn from(value: reqwest::Error) -> Self {
        Self::ReqwestError(value)
    }
}

#[allow(clippy::absolute_paths)]
impl std::fmt::Display for ProxyHttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReqwestError(e) => write!(f, "HTTP client error: {e:?}"),
            Self::ErrorResponse { status, body } if body.is_empty() => {
                write!(f, "Invalid HTTP response: {status}")
            }
            Self::ErrorResponse { status, body } => {
                write!(f, "Invalid HTTP response: {status}: {body}")
            }
            Self::NotSupported(what) => {
                write!(f, "Operation is not supported by this client build: {what}")
            }
            Self::JsonError(e) => write!(
                f,
                "JSON deserialization error at line {} column {} path {}: {e}",
                e.inner().line(),
                e.inner().column(),
                e.path(),
            ),
            Self::BodyError(e) => write!(f, "JSON serialization error: {e}"),
            Self::InvalidUrl(e) => write!(f, "Invalid request URL: {e}"),
        }
    }
}

#[allow(clippy::absolute_paths)]
impl std::error::Error for ProxyHttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReqwestError(e) => Some(e),
            Self::JsonError(e) => Some(e.inner()),
            Self::BodyError(e) => Some(e),
            Self::InvalidUrl(e) => Some(e),
            _ => None,
        }
    }
}

/// Configuration parameters for the reqwest HTTP client.
///
/// # Examples
///
/// ```rust
/// use odata_proxy_http::reqwest::ClientParams;
/// use std::time::Duration;
///
/// let params = ClientParams::new()
///     .timeout(Duration::from_secs(30))
///     .connect_timeout(Duration::from_secs(10))
///     .user_agent("MyApp/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientParams {
    /// HTTP request timeout
    pub timeout: Option<Duration>,
    /// TCP connection timeout
    pub connect_timeout: Option<Duration>,
    /// User-Agent header value
    pub user_agent: Option<String>,
    /// Maximum number of HTTP redirects to follow
    pub max_redirects: Option<usize>,
    /// TCP keep-alive timeout
    pub tcp_keepalive: Option<Duration>,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: Option<usize>,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(120)),
            connect_timeout: Some(Duration::from_secs(5)),
            user_agent: Some("odata-proxy/v1".to_string()),
            max_redirects: Some(10),
            tcp_keepalive: Some(Duration::from_secs(60)),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: Some(1),
        }
    }
}

impl ClientParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub const fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    #[must_use]
    pub const fn tcp_keepalive(mut self, keepalive: Duration) -> Self {
        self.tcp_keepalive = Some(keepalive);
        self
    }

    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    fn builder(&self, accept_invalid_certs: bool) -> reqwest::ClientBuilder {
        let mut builder = reqwest::Client::builder().use_rustls_tls();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        if let Some(max_redirects) = self.max_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(max_redirects));
        }

        if let Some(keepalive) = self.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            builder = builder.pool_idle_timeout(idle_timeout);
        }

        if let Some(max_idle) = self.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max_idle);
        }

        builder.danger_accept_invalid_certs(accept_invalid_certs)
    }
}

/// HTTP transport implementation using the reqwest library.
///
/// Requests of connections with `skip_certificate_check` go through a
/// second pool that accepts invalid certificates.
///
/// # Examples
///
/// ```rust,no_run
/// use odata_proxy_core::{Adapter, ConnectionConfig, EntityMetadata, Protocol, QueryBuilder};
/// use odata_proxy_core::response::Untyped;
/// use odata_proxy_http::reqwest::{Client, ClientParams};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::with_params(ClientParams::new().timeout(Duration::from_secs(60)))?;
/// let metadata = EntityMetadata::new("Product.cdxml")
///     .with("EntityTypeName", "ODataDemo.Product");
/// let adapter = Adapter::new(
///     Protocol::ODataV4,
///     "https://services.example/V4/OData.svc/Products",
///     metadata,
///     ConnectionConfig::default(),
/// );
/// let mut records = Vec::new();
/// adapter
///     .process_query(&client, &QueryBuilder::new(), None, &mut records, &Untyped)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    insecure: reqwest::Client,
}

#[allow(clippy::missing_errors_doc)]
impl Client {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_params(ClientParams::default())
    }

    pub fn with_params(params: ClientParams) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: params.builder(false).build()?,
            insecure: params.builder(true).build()?,
        })
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Vec<ResponseRecord>, ProxyHttpError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProxyHttpError::ErrorResponse { status, body });
        }

        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_path_to_error::deserialize::<_, JsonValue>(
                    &mut serde_json::Deserializer::from_slice(&bytes),
                )
                .map_err(ProxyHttpError::JsonError)?,
            )
        };
        Ok(body_records(body, &headers))
    }

    async fn execute(
        &self,
        request: &HttpRequest,
        context: &RequestContext,
    ) -> Result<Vec<ResponseRecord>, ProxyHttpError> {
        if context.certificate_thumbprint.is_some() {
            return Err(ProxyHttpError::NotSupported("client certificate thumbprint"));
        }
        let client = if context.skip_certificate_check {
            &self.insecure
        } else {
            &self.client
        };

        let mut builder = client
            .request(request.method.clone(), request_url(request)?)
            .headers(request.headers.clone());

        if let Some(credentials) = &context.credentials {
            builder = builder.basic_auth(&credentials.username, Some(credentials.password()));
        }

        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(ProxyHttpError::BodyError)?;
            if let Some(content_type) = &request.content_type {
                builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
            }
            builder = builder.body(bytes);
        }

        debug!(method = %request.method, uri = %redacted_uri(&request.uri), "sending request");
        let response = builder.send().await?;
        debug!(status = %response.status(), "response status");
        self.handle_response(response).await
    }
}

// Query options are encoded here; the composed `uri` carries them raw.
fn request_url(request: &HttpRequest) -> Result<Url, ProxyHttpError> {
    match &request.query {
        Some(query) => {
            let mut url = Url::parse(&query.base_uri).map_err(ProxyHttpError::InvalidUrl)?;
            url.query_pairs_mut().extend_pairs(&query.options);
            Ok(url)
        }
        None => Url::parse(&request.uri).map_err(ProxyHttpError::InvalidUrl),
    }
}

impl Transport for Client {
    type Error = ProxyHttpError;

    async fn send(
        &self,
        request: &HttpRequest,
        context: &RequestContext,
    ) -> Result<Vec<ResponseRecord>, Self::Error> {
        self.execute(request, context).await
    }
}
