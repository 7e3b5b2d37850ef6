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

//! Resource-path builder
//!
//! Builds the resource URI of an entity set (or singleton) and the key
//! predicate that addresses one instance in it.
//!
//! - [`build_endpoint`] relocates the declared entity URI onto a connection
//!   override, keeping the trailing entity segment.
//! - [`format_key_predicate`] renders keys either embedded
//!   (`(Id=7, Name='apple')`) or as separate segments (`/7/apple`).
//! - [`rewrite_base_uri`] swaps the last path segment for navigation and
//!   association targets.
//!
//! ```rust
//! use odata_proxy_core::path::{format_key_predicate, Key, KeyFormat};
//!
//! let keys = vec![Key::new("Id", 7), Key::new("Name", "apple")];
//! assert_eq!(
//!     format_key_predicate(&keys, KeyFormat::Embedded).unwrap(),
//!     "(Id=7, Name='apple')"
//! );
//! assert_eq!(
//!     format_key_predicate(&keys, KeyFormat::Separate).unwrap(),
//!     "/7/apple"
//! );
//! ```

use crate::Error;
use crate::Value;

/// Key of an entity instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Key property name.
    pub name: String,
    /// Key value. Must not be null when rendered.
    pub value: Value,
}

impl Key {
    /// Create new key.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Reference to an entity set, singleton or entity instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityRef {
    /// Entity set or singleton name.
    pub name: String,
    /// Ordered keys. Empty for set- or singleton-level operations.
    pub keys: Vec<Key>,
}

impl EntityRef {
    /// Reference without keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
        }
    }

    /// Add key to the reference.
    #[must_use]
    pub fn key(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keys.push(Key::new(name, value));
        self
    }

    /// True if reference addresses a single instance.
    #[must_use]
    pub fn is_instance(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// How key values are placed in the resource path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFormat {
    /// `Entity(Key1=v1, Key2=v2)`.
    #[default]
    Embedded,
    /// `Entity/v1/v2`.
    Separate,
}

impl KeyFormat {
    /// Name used in entity metadata (`UriResourcePathKeyFormat`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Embedded => "EmbeddedKey",
            Self::Separate => "SeparateKey",
        }
    }
}

fn last_separator(uri: &str) -> Result<usize, Error> {
    match uri.rfind('/') {
        Some(index) if index > 0 => Ok(index),
        _ => Err(Error::MalformedUri(uri.to_string())),
    }
}

/// Build endpoint URI of the entity.
///
/// Without `connection_override` the declared `default_uri` is returned
/// unchanged. Otherwise the last path segment of `default_uri` (the
/// entity name) is appended to the override.
///
/// # Errors
///
/// `Error::MalformedUri` if `default_uri` has no `/` past its first
/// character.
pub fn build_endpoint(default_uri: &str, connection_override: Option<&str>) -> Result<String, Error> {
    let Some(connection) = connection_override else {
        return Ok(default_uri.to_string());
    };
    let index = last_separator(default_uri)?;
    let entity_name = &default_uri[index + 1..];
    Ok(format!("{}/{entity_name}", connection.trim_end_matches('/')))
}

/// Render the key predicate.
///
/// # Errors
///
/// `Error::NullKeyValue` if any key value is null. The check is done for
/// all keys before anything is rendered.
pub fn format_key_predicate(keys: &[Key], format: KeyFormat) -> Result<String, Error> {
    if let Some(key) = keys.iter().find(|k| k.value.is_null()) {
        return Err(Error::NullKeyValue(key.name.clone()));
    }
    if keys.is_empty() {
        return Ok(String::new());
    }
    match format {
        KeyFormat::Separate => Ok(keys.iter().map(|k| format!("/{}", k.value)).collect()),
        KeyFormat::Embedded => {
            let pairs = keys
                .iter()
                .filter_map(|k| k.value.key_literal().map(|v| format!("{}={v}", k.name)))
                .collect::<Vec<_>>();
            Ok(format!("({})", pairs.join(", ")))
        }
    }
}

/// Replace last segment of `uri` with `replacement`.
///
/// Returns new URI and the segment that was replaced.
///
/// # Errors
///
/// `Error::MalformedUri` under the same condition as [`build_endpoint`].
pub fn rewrite_base_uri(uri: &str, replacement: &str) -> Result<(String, String), Error> {
    let index = last_separator(uri)?;
    Ok((
        format!("{}{replacement}", &uri[..=index]),
        uri[index + 1..].to_string(),
    ))
}

/// Parse embedded key predicate back into name / literal pairs.
///
/// Literals are returned as rendered: integral values bare, others with
/// quotes (and `guid` prefix). Returns `None` if `predicate` is not an
/// embedded predicate.
#[must_use]
pub fn parse_key_predicate(predicate: &str) -> Option<Vec<(String, String)>> {
    let inner = predicate.strip_prefix('(')?.strip_suffix(')')?;
    let mut result = Vec::new();
    let mut rest = inner;
    while !rest.is_empty() {
        let (name, tail) = rest.split_once('=')?;
        let (literal, tail) = split_literal(tail)?;
        result.push((name.to_string(), literal.to_string()));
        rest = match tail.strip_prefix(", ") {
            Some(next) if !next.is_empty() => next,
            Some(_) => return None,
            None if tail.is_empty() => tail,
            None => return None,
        };
    }
    Some(result)
}

// Literal is either bare (up to next ", ") or quoted (up to closing quote).
// Doubled quotes inside a quoted literal are part of it. Quoted literals may
// carry a `guid` prefix.
fn split_literal(s: &str) -> Option<(&str, &str)> {
    let quote = s.find('\'');
    let bare_end = s.find(", ").unwrap_or(s.len());
    match quote {
        Some(start) if start < bare_end => {
            let mut search = start + 1;
            loop {
                let end = search + s[search..].find('\'')?;
                let tail = &s[end + 1..];
                match tail.strip_prefix('\'') {
                    Some(_) => search = end + 2,
                    None => return Some((&s[..=end], tail)),
                }
            }
        }
        _ => Some((&s[..bare_end], &s[bare_end..])),
    }
}
