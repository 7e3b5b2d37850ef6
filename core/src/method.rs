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

//! Method invocations
//!
//! A method invocation is a mutating request bound by the hosting
//! framework: a method name and an ordered list of named parameters.
//!
//! Method names follow `Verb` or `Category:Qualifier:Target`:
//!
//! | Method name | Meaning |
//! |-------------|---------|
//! | `Create`, `Update`, `Delete` | CRUD on the entity set |
//! | `Action:<Name>:<EntityType>` | action call; `<EntityType>` may be empty |
//! | `Association:Create:<Referred>` | link instance to referred resource |
//! | `Association:Delete:<Referred>` | unlink instance from referred resource |
//!
//! Parameters named `<Property>:Key` address the instance, parameters
//! without `:` are ordinary and form the request body or action arguments.

use crate::path::Key;
use crate::Error;
use crate::Value;
use std::str::FromStr;

/// Name of the client-only confirmation override parameter.
pub const FORCE_PARAMETER: &str = "Force";

const KEY_SUFFIX: &str = "Key";

/// Ordered named parameters of a method invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(Vec<(String, Value)>);

impl Parameters {
    /// Empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append parameter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Append parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of parameter with exactly this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Remove all parameters with exactly this name and return the first
    /// removed value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.0.iter().position(|(n, _)| n == name)?;
        let (_, value) = self.0.remove(index);
        self.0.retain(|(n, _)| n != name);
        Some(value)
    }

    /// All parameters in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key parameters (`<Property>:Key`) with the suffix stripped.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.iter()
            .filter_map(|(name, value)| {
                let mut parts = name.split(':');
                let property = parts.next()?;
                (parts.next()? == KEY_SUFFIX).then(|| Key::new(property, value.clone()))
            })
            .collect()
    }

    /// Ordinary parameters (names without `:`).
    pub fn ordinary(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().filter(|(name, _)| !name.contains(':'))
    }

    /// Ordinary parameters as keys, used to address a referred resource.
    #[must_use]
    pub fn ordinary_keys(&self) -> Vec<Key> {
        self.ordinary()
            .map(|(name, value)| Key::new(name, value.clone()))
            .collect()
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

/// Association operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationOp {
    /// Create link.
    Create,
    /// Delete link.
    Delete,
}

/// Classified method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodKind {
    /// `Create`.
    Create,
    /// `Update`.
    Update,
    /// `Delete`.
    Delete,
    /// `Action:<name>:<entity_type>`.
    Action {
        /// Action name.
        name: String,
        /// Type of returned entities. `None` if third token is empty.
        entity_type: Option<String>,
    },
    /// `Association:<op>:<referred>`.
    Association {
        /// Operation on the link.
        op: AssociationOp,
        /// Name of the referred resource.
        referred: String,
    },
}

impl MethodKind {
    /// True for operations that need the action confirmation message.
    #[must_use]
    pub const fn is_action(&self) -> bool {
        matches!(self, Self::Action { .. })
    }
}

impl FromStr for MethodKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedMethodName(name.to_string());
        match name.split(':').collect::<Vec<_>>().as_slice() {
            ["Create"] => Ok(Self::Create),
            ["Update"] => Ok(Self::Update),
            ["Delete"] => Ok(Self::Delete),
            [_] => Err(Error::UnsupportedMethod(name.to_string())),
            ["Action", action, entity_type] => Ok(Self::Action {
                name: (*action).to_string(),
                entity_type: (!entity_type.is_empty()).then(|| (*entity_type).to_string()),
            }),
            ["Association", op, referred] => {
                let op = match *op {
                    "Create" => AssociationOp::Create,
                    "Delete" => AssociationOp::Delete,
                    _ => return Err(malformed()),
                };
                Ok(Self::Association {
                    op,
                    referred: (*referred).to_string(),
                })
            }
            _ => Err(malformed()),
        }
    }
}

/// Mutating request bound by the hosting framework.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvocation {
    /// Method name.
    pub method_name: String,
    /// Parameters without the client-only `Force` switch.
    pub parameters: Parameters,
    /// Skip the second confirmation step.
    pub force: bool,
}

impl MethodInvocation {
    /// Create invocation. A parameter named `Force` is removed from the
    /// list; any non-null value other than `false` sets [`Self::force`].
    pub fn new(method_name: impl Into<String>, mut parameters: Parameters) -> Self {
        let force = parameters
            .remove(FORCE_PARAMETER)
            .is_some_and(|v| !matches!(v, Value::Null | Value::Boolean(false)));
        Self {
            method_name: method_name.into(),
            parameters,
            force,
        }
    }

    /// Set the force flag.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Classify the method name.
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedMethod` for an unknown bare name
    /// - `Error::MalformedMethodName` for any other unexpected form
    pub fn kind(&self) -> Result<MethodKind, Error> {
        self.method_name.parse()
    }
}
