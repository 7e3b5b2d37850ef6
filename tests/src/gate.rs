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

use odata_proxy_core::ConfirmationGate;

/// Gate with fixed answers that records every prompt.
#[derive(Debug, Default)]
pub struct ScriptedGate {
    /// Answer of the first step.
    pub process: bool,
    /// Answer of the second step.
    pub proceed: bool,
    /// Prompts in the order they were shown.
    pub prompts: Vec<String>,
}

impl ScriptedGate {
    #[must_use]
    pub fn answering(process: bool, proceed: bool) -> Self {
        Self {
            process,
            proceed,
            prompts: Vec::new(),
        }
    }
}

impl ConfirmationGate for ScriptedGate {
    fn should_process(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.process
    }

    fn should_continue(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.proceed
    }
}
