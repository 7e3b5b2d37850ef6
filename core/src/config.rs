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

//! Connection configuration.
//!
//! Settings supplied by the caller for every request of an adapter:
//! connection override, authentication material and the switches that
//! relax transport and response checks. The configuration can be read
//! from a TOML file:
//!
//! ```toml
//! connection_uri = "https://bmc.example.com/redfish/v1"
//! certificate_thumbprint = "8c6d2a0f"
//! allow_additional_data = true
//!
//! [credentials]
//! username = "admin"
//! password = "secret"
//!
//! [headers]
//! X-Request-Source = "inventory"
//! ```

use crate::Error;
use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read as _;
use std::path::Path;

/// Basic authentication credentials.
///
/// `Debug` and `Display` never show the password.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// User name.
    pub username: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    /// Password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials(username: {}, password: [REDACTED])", self.username)
    }
}

/// Connection settings of an adapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionConfig {
    /// Service URI that replaces the declared one.
    pub connection_uri: Option<String>,
    /// Credentials passed to the transport.
    pub credentials: Option<Credentials>,
    /// Client certificate thumbprint passed to the transport.
    pub certificate_thumbprint: Option<String>,
    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Permit `http` URIs.
    #[serde(default)]
    pub allow_unsecure_connection: bool,
    /// Skip response type coercion.
    #[serde(default)]
    pub allow_additional_data: bool,
    /// Pass transport errors through unwrapped.
    #[serde(default)]
    pub pass_inner_exception: bool,
    /// Do not validate server certificate.
    #[serde(default)]
    pub skip_certificate_check: bool,
}

impl ConnectionConfig {
    /// Read configuration from TOML file.
    ///
    /// # Errors
    ///
    /// - `Error::ConfigIo` if failed to read file
    /// - `Error::ConfigFormat` if content is not a valid configuration
    pub fn read(fname: &Path) -> Result<Self, Error> {
        let mut file = File::open(fname).map_err(Error::ConfigIo)?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(Error::ConfigIo)?;
        toml::from_str(&content).map_err(Error::ConfigFormat)
    }

    /// Set connection override.
    #[must_use]
    pub fn with_connection_uri(mut self, uri: impl Into<String>) -> Self {
        self.connection_uri = Some(uri.into());
        self
    }

    /// Set credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Add request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Permit `http` URIs.
    #[must_use]
    pub const fn allow_unsecure_connection(mut self, allow: bool) -> Self {
        self.allow_unsecure_connection = allow;
        self
    }

    /// Skip response type coercion.
    #[must_use]
    pub const fn allow_additional_data(mut self, allow: bool) -> Self {
        self.allow_additional_data = allow;
        self
    }

    /// Pass transport errors through unwrapped.
    #[must_use]
    pub const fn pass_inner_exception(mut self, pass: bool) -> Self {
        self.pass_inner_exception = pass;
        self
    }

    /// Configured headers as HTTP header map.
    ///
    /// # Errors
    ///
    /// `Error::InvalidHeader` if a name or value is not valid HTTP.
    pub fn header_map(&self) -> Result<HeaderMap, Error> {
        self.headers
            .iter()
            .map(|(name, value)| {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| Error::InvalidHeader(name.clone()))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|_| Error::InvalidHeader(name.to_string()))?;
                Ok((name, value))
            })
            .collect()
    }
}
