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

//! Confirmation gate
//!
//! Every mutating request is confirmed by the hosting framework before it
//! is built. Confirmation has two steps: `should_process` and, unless the
//! invocation is forced, `should_continue`. A declined request is skipped
//! without error.

use crate::metadata::EntityMetadata;
use crate::Error;

/// Confirmation collaborator.
pub trait ConfirmationGate {
    /// First confirmation step.
    fn should_process(&mut self, message: &str) -> bool;

    /// Second confirmation step. Not asked for forced invocations.
    fn should_continue(&mut self, message: &str) -> bool;
}

/// Gate that confirms everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unattended;

impl ConfirmationGate for Unattended {
    fn should_process(&mut self, _: &str) -> bool {
        true
    }

    fn should_continue(&mut self, _: &str) -> bool {
        true
    }
}

/// Messages of both confirmation steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Message of `should_process`.
    pub process: String,
    /// Message of `should_continue`.
    pub proceed: String,
}

impl Confirmation {
    /// Messages for an action call.
    ///
    /// # Errors
    ///
    /// `Error::MissingMetadata` if `Namespace` is absent.
    pub fn action(metadata: &EntityMetadata, uri: &str) -> Result<Self, Error> {
        let namespace = metadata.namespace()?;
        Ok(Self {
            process: format!("Invoke action of namespace {namespace} at {uri}"),
            proceed: format!(
                "{}: do you want to invoke action of namespace {namespace} at {uri}?",
                metadata.source
            ),
        })
    }

    /// Messages for CRUD and association requests.
    ///
    /// # Errors
    ///
    /// `Error::MissingMetadata` if `EntityTypeName` or `EntitySetName` is
    /// absent.
    pub fn crud(metadata: &EntityMetadata, uri: &str) -> Result<Self, Error> {
        let type_name = metadata.entity_type_name()?;
        let set_name = metadata.entity_set_name()?;
        Ok(Self {
            process: format!("Modify {type_name} in {set_name} at {uri}"),
            proceed: format!(
                "{}: do you want to modify {type_name} in {set_name} at {uri}?",
                metadata.source
            ),
        })
    }

    /// Run both confirmation steps.
    pub fn ask<G: ConfirmationGate + ?Sized>(&self, gate: &mut G, force: bool) -> bool {
        gate.should_process(&self.process) && (force || gate.should_continue(&self.proceed))
    }
}
