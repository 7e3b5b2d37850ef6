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

//! Request shaping for declarative OData and Redfish entity proxies.
//!
//! The crate does not talk to the network. It turns reads and method
//! invocations of a declared entity into [`PreparedRequest`] values and
//! maps records returned by a [`Transport`] back into output objects.

/// Request bodies.
pub mod body;
/// Connection settings.
pub mod config;
/// Two-step confirmation of mutating requests.
pub mod confirm;
/// Request dispatcher.
pub mod dispatch;
/// Errors.
pub mod error;
/// Entity metadata.
pub mod metadata;
/// Method names and parameters.
pub mod method;
/// Resource paths and key predicates.
pub mod path;
/// Protocol version policy.
pub mod policy;
/// Query options and filter expressions.
pub mod query;
/// Redfish `@odata.id` helpers.
pub mod redfish;
/// Outbound requests.
pub mod request;
/// Response records and coercion.
pub mod response;
/// Transport abstraction.
pub mod transport;
/// Parameter and key values.
pub mod value;

#[doc(inline)]
pub use config::ConnectionConfig;
#[doc(inline)]
pub use config::Credentials;
#[doc(inline)]
pub use confirm::ConfirmationGate;
#[doc(inline)]
pub use confirm::Unattended;
#[doc(inline)]
pub use dispatch::Adapter;
#[doc(inline)]
pub use dispatch::Navigation;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use metadata::EntityMetadata;
#[doc(inline)]
pub use method::MethodInvocation;
#[doc(inline)]
pub use method::Parameters;
#[doc(inline)]
pub use path::Key;
#[doc(inline)]
pub use policy::Protocol;
#[doc(inline)]
pub use query::FilterExpression;
#[doc(inline)]
pub use query::QueryBuilder;
#[doc(inline)]
pub use query::QuerySpec;
#[doc(inline)]
pub use request::HttpRequest;
#[doc(inline)]
pub use request::PreparedRequest;
#[doc(inline)]
pub use request::RequestQuery;
#[doc(inline)]
pub use response::RecordSink;
#[doc(inline)]
pub use response::ResponseRecord;
#[doc(inline)]
pub use response::TypeCoercer;
#[doc(inline)]
pub use transport::RequestContext;
#[doc(inline)]
pub use transport::Transport;
#[doc(inline)]
pub use value::Value;
