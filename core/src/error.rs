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

//! Errors of the proxy core.
//!
//! Structural errors (malformed URI, method name, property name, null
//! key) are raised before any request leaves the adapter. Runtime errors
//! come from the transport collaborator or from response coercion and
//! are raised at the single invocation boundary in [`crate::Adapter`].

use serde_json::Error as JsonError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;
use toml::de::Error as TomlError;

/// Boxed error of an external collaborator (transport, type coercer).
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Proxy core errors.
#[derive(Debug)]
pub enum Error {
    /// Endpoint string has no usable `/` separator.
    MalformedUri(String),
    /// Method name does not follow `Verb` or `Category:Qualifier:Target`.
    MalformedMethodName(String),
    /// Property filter name does not split into 1, 2 or 3 segments.
    MalformedPropertyName(String),
    /// Key with a null value. Contains the key name.
    NullKeyValue(String),
    /// Bare method name that is not one of `Create`, `Update`, `Delete`.
    UnsupportedMethod(String),
    /// Query option was set more than once for the same request.
    QueryOptionAlreadySet(&'static str),
    /// Required entity metadata entry is absent.
    MissingMetadata {
        /// Metadata key.
        key: String,
        /// Hosting command that carries the metadata.
        command: String,
    },
    /// Entity metadata entry has a value that cannot be used.
    InvalidMetadata {
        /// Metadata key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// Configured header name or value is not valid HTTP.
    InvalidHeader(String),
    /// Request body cannot be serialized.
    Body(JsonError),
    /// Required method parameter is absent.
    MissingParameter(String),
    /// Resulting URI is not a valid absolute URI.
    InvalidUri(String, url::ParseError),
    /// Target URI uses `http` and unsecure connections are not allowed.
    UnsecureConnection {
        /// Hosting command.
        command: String,
        /// Rejected URI.
        uri: String,
    },
    /// Redfish object graph does not contain expected link.
    RedfishTarget(String),
    /// Transport failed; the failure is wrapped with request context.
    RequestInvocation {
        /// Hosting command.
        command: String,
        /// Requested URI.
        uri: String,
        /// Transport error.
        source: BoxError,
    },
    /// Transport failed; the failure is passed through untouched.
    Transport(BoxError),
    /// Response object cannot be converted to the expected entity type.
    TypeCoercion {
        /// Expected type name.
        type_name: String,
        /// Requested URI.
        uri: String,
        /// Coercion error.
        source: BoxError,
    },
    /// Configuration file cannot be read.
    ConfigIo(IoError),
    /// Configuration file cannot be parsed.
    ConfigFormat(TomlError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MalformedUri(uri) => write!(f, "resource uri is not in expected format: {uri}"),
            Self::MalformedMethodName(name) => {
                write!(f, "method name is not in expected format: {name}")
            }
            Self::MalformedPropertyName(name) => {
                write!(f, "property name is not in expected format: {name}")
            }
            Self::NullKeyValue(key) => write!(f, "null value for key: {key}"),
            Self::UnsupportedMethod(name) => write!(f, "unsupported method: {name}"),
            Self::QueryOptionAlreadySet(option) => {
                write!(f, "query option is specified more than once: {option}")
            }
            Self::MissingMetadata { key, command } => write!(
                f,
                "entity metadata of {command} does not contain required entry: {key}"
            ),
            Self::InvalidMetadata { key, value } => {
                write!(f, "invalid value of entity metadata entry {key}: {value}")
            }
            Self::InvalidHeader(name) => write!(f, "invalid header: {name}"),
            Self::Body(err) => write!(f, "cannot serialize request body: {err}"),
            Self::MissingParameter(name) => write!(f, "missing required parameter: {name}"),
            Self::InvalidUri(uri, err) => write!(f, "invalid uri: {uri}: {err}"),
            Self::UnsecureConnection { command, uri } => write!(
                f,
                "{command}: refusing to connect to {uri} over unencrypted connection; \
                 allow unsecure connections or use an https connection uri"
            ),
            Self::RedfishTarget(reason) => write!(f, "cannot resolve redfish target: {reason}"),
            Self::RequestInvocation {
                command,
                uri,
                source,
            } => write!(f, "{command}: request to {uri} failed: {source}"),
            Self::Transport(err) => err.fmt(f),
            Self::TypeCoercion {
                type_name, uri, ..
            } => write!(
                f,
                "response of {uri} cannot be converted to {type_name}: it has members \
                 that are not defined by {type_name}"
            ),
            Self::ConfigIo(err) => write!(f, "input/output error: {err}"),
            Self::ConfigFormat(err) => write!(f, "configuration file format error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidUri(_, err) => Some(err),
            Self::RequestInvocation { source, .. } | Self::TypeCoercion { source, .. } => {
                Some(source.as_ref())
            }
            Self::Transport(err) => err.source(),
            Self::Body(err) => Some(err),
            Self::ConfigIo(err) => Some(err),
            Self::ConfigFormat(err) => Some(err),
            _ => None,
        }
    }
}

impl Error {
    /// Returns true for errors that are raised before any I/O.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MalformedUri(_)
                | Self::MalformedMethodName(_)
                | Self::MalformedPropertyName(_)
                | Self::NullKeyValue(_)
                | Self::UnsupportedMethod(_)
                | Self::QueryOptionAlreadySet(_)
        )
    }
}
