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

//! Request dispatcher
//!
//! [`Adapter`] turns reads ([`QueryBuilder`]) and method invocations
//! ([`MethodInvocation`]) into [`PreparedRequest`] values and executes them
//! through a [`Transport`].
//!
//! ```rust
//! use odata_proxy_core::{Adapter, ConnectionConfig, EntityMetadata, Protocol, QueryBuilder};
//!
//! let metadata = EntityMetadata::new("Product.cdxml")
//!     .with("EntityTypeName", "ODataDemo.Product");
//! let adapter = Adapter::new(
//!     Protocol::ODataV3,
//!     "http://h/s.svc/Product",
//!     metadata,
//!     ConnectionConfig::default(),
//! );
//! let query = QueryBuilder::new().filter_by_property("Filter", ["Price gt 10"])?;
//! let read = adapter.read(&query)?;
//! assert_eq!(
//!     read.request.uri,
//!     "http://h/s.svc/Product?$format=json&$filter=Price gt 10"
//! );
//! # Ok::<(), odata_proxy_core::Error>(())
//! ```

use crate::body::link_body;
use crate::body::serialize_parameters;
use crate::config::ConnectionConfig;
use crate::confirm::Confirmation;
use crate::confirm::ConfirmationGate;
use crate::metadata::EntityMetadata;
use crate::method::AssociationOp;
use crate::method::MethodInvocation;
use crate::method::MethodKind;
use crate::method::Parameters;
use crate::path::rewrite_base_uri;
use crate::policy::Protocol;
use crate::query::QueryBuilder;
use crate::redfish;
use crate::request::HttpRequest;
use crate::request::PreparedRequest;
use crate::response::RecordSink;
use crate::response::ResponseMapper;
use crate::response::TypeCoercer;
use crate::transport::RequestContext;
use crate::transport::Transport;
use crate::Error;
use crate::Value;
use http::Method;
use serde_json::Value as JsonValue;
use tracing::debug;
use tracing::trace;
use url::Url;

/// Parameter that carries the `@odata.id` of a Redfish target.
pub const ODATA_ID_PARAMETER: &str = "OdataId";
/// Parameter that carries the Redfish resource of a delete request.
pub const RESOURCE_PARAMETER: &str = "Resource";

/// Parent objects of a Redfish navigation read.
#[derive(Debug, Clone, Copy)]
pub struct Navigation<'a> {
    /// Type of the parent objects. Selects `NavigationLink<ParentType>`.
    pub parent_type: &'a str,
    /// Parent objects bound by the caller.
    pub parents: &'a [JsonValue],
}

struct Plan {
    confirm_uri: String,
    request: HttpRequest,
    expected_type: String,
}

/// Proxy of one declared entity.
#[derive(Debug, Clone)]
pub struct Adapter {
    protocol: Protocol,
    default_uri: String,
    metadata: EntityMetadata,
    config: ConnectionConfig,
}

impl Adapter {
    /// Create adapter of the entity declared at `default_uri`.
    pub fn new(
        protocol: Protocol,
        default_uri: impl Into<String>,
        metadata: EntityMetadata,
        config: ConnectionConfig,
    ) -> Self {
        Self {
            protocol,
            default_uri: default_uri.into(),
            metadata,
            config,
        }
    }

    /// Protocol variant.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Entity metadata.
    #[must_use]
    pub const fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    /// Connection configuration.
    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn endpoint(&self) -> Result<String, Error> {
        self.protocol
            .endpoint(&self.default_uri, self.config.connection_uri.as_deref())
    }

    fn prepare(
        &self,
        request: HttpRequest,
        expected_type: String,
        single_instance: bool,
    ) -> Result<PreparedRequest, Error> {
        let headers = self.protocol.default_headers(self.config.header_map()?);
        Ok(PreparedRequest {
            request: request.with_headers(headers),
            expected_type,
            single_instance,
        })
    }

    /// Build read request.
    ///
    /// # Errors
    ///
    /// - `Error::MissingMetadata` if `EntityTypeName` is absent
    /// - `Error::NullKeyValue` if any key is null
    /// - `Error::MalformedUri` if endpoint cannot be built
    pub fn read(&self, query: &QueryBuilder) -> Result<PreparedRequest, Error> {
        let expected_type = self.metadata.entity_type_name()?.to_string();
        let predicate = self.protocol.key_predicate(&query.keys, &self.metadata)?;
        let endpoint = self.endpoint()?;
        let (uri, single_instance) = match &query.referred_resource {
            Some(referred) => {
                let (base, segment) = self.protocol.navigation_base_uri(&endpoint, referred)?;
                let uri = format!("{base}{predicate}/{segment}");
                (self.protocol.build_odata_uri(&uri), false)
            }
            None => (
                self.protocol.build_odata_uri(&format!("{endpoint}{predicate}")),
                self.protocol.is_single_instance(&predicate, &self.metadata),
            ),
        };
        let request = HttpRequest::get_with_query(&uri, &query.spec);
        debug!(uri = %request.uri, single_instance, "read request");
        self.prepare(request, expected_type, single_instance)
    }

    /// Build reads of resources linked from Redfish parent objects.
    ///
    /// Every `@odata.id` referenced by the `NavigationLink<ParentType>`
    /// property of every parent becomes a single-instance read. Without
    /// such descriptor, or for other protocols, this is [`Self::read`].
    ///
    /// # Errors
    ///
    /// - `Error::RedfishTarget` if a parent lacks the linked property
    /// - errors of [`Self::read`]
    pub fn navigation_reads(
        &self,
        query: &QueryBuilder,
        navigation: Navigation<'_>,
    ) -> Result<Vec<PreparedRequest>, Error> {
        let link = match self.protocol {
            Protocol::Redfish => self.metadata.navigation_link(navigation.parent_type)?,
            _ => None,
        };
        let Some(link) = link else {
            return self.read(query).map(|read| vec![read]);
        };
        let expected_type = self.metadata.entity_type_name()?;
        let host = self.endpoint()?;
        let mut reads = Vec::new();
        for parent in navigation.parents {
            for id in redfish::navigation_targets(parent, &link)? {
                let target = redfish::resolve(&host, id)?;
                let request = HttpRequest::get_with_query(&target, &query.spec);
                debug!(uri = %request.uri, property = %link.property, "navigation read request");
                reads.push(self.prepare(request, expected_type.to_string(), true)?);
            }
        }
        Ok(reads)
    }

    /// Build request of a method invocation and confirm it through `gate`.
    ///
    /// Returns `None` if confirmation is declined.
    ///
    /// # Errors
    ///
    /// - `Error::MalformedMethodName`, `Error::UnsupportedMethod` for
    ///   unexpected method names
    /// - `Error::NullKeyValue` if any key is null
    /// - `Error::MissingMetadata` if required metadata is absent
    /// - `Error::RedfishTarget`, `Error::MissingParameter` if Redfish target
    ///   cannot be resolved
    pub fn dispatch<G>(
        &self,
        invocation: &MethodInvocation,
        gate: &mut G,
    ) -> Result<Option<PreparedRequest>, Error>
    where
        G: ConfirmationGate + ?Sized,
    {
        let kind = invocation.kind()?;
        let plan = match self.protocol {
            Protocol::Redfish => self.plan_redfish(&kind, invocation)?,
            Protocol::ODataV3 | Protocol::ODataV4 => self.plan_odata(&kind, &invocation.parameters)?,
        };
        let confirmation = if kind.is_action() {
            Confirmation::action(&self.metadata, &plan.confirm_uri)?
        } else {
            Confirmation::crud(&self.metadata, &plan.confirm_uri)?
        };
        if !confirmation.ask(gate, invocation.force) {
            debug!(
                method = %invocation.method_name,
                uri = %plan.confirm_uri,
                "request declined"
            );
            return Ok(None);
        }
        debug!(
            method = %plan.request.method,
            uri = %plan.request.uri,
            "method request"
        );
        self.prepare(plan.request, plan.expected_type, true).map(Some)
    }

    fn action_type(&self, entity_type: Option<&String>) -> Result<String, Error> {
        match (self.metadata.entity_type_name(), entity_type) {
            (Ok(type_name), _) => Ok(type_name.to_string()),
            (Err(_), Some(type_name)) if self.protocol.is_v4() => Ok(type_name.clone()),
            (Err(err), _) => Err(err),
        }
    }

    fn plan_odata(&self, kind: &MethodKind, params: &Parameters) -> Result<Plan, Error> {
        let keys = params.keys();
        let predicate = self.protocol.key_predicate(&keys, &self.metadata)?;
        let endpoint = self.endpoint()?;
        let instance_uri = || self.protocol.build_odata_uri(&format!("{endpoint}{predicate}"));
        let plan = match kind {
            MethodKind::Create => {
                let type_name = self.metadata.entity_type_name()?;
                let body = serialize_parameters(&keys, params.ordinary(), Some(type_name))?;
                Plan {
                    request: HttpRequest::new(self.metadata.create_request_method()?, &endpoint)
                        .with_json(body),
                    confirm_uri: endpoint.clone(),
                    expected_type: type_name.to_string(),
                }
            }
            MethodKind::Update => {
                let type_name = self.metadata.entity_type_name()?;
                let body = serialize_parameters(&[], params.ordinary(), Some(type_name))?;
                let uri = instance_uri();
                Plan {
                    request: HttpRequest::new(self.metadata.update_request_method()?, &uri)
                        .with_json(body),
                    confirm_uri: uri,
                    expected_type: type_name.to_string(),
                }
            }
            MethodKind::Delete => {
                let uri = instance_uri();
                Plan {
                    request: HttpRequest::new(Method::DELETE, &uri),
                    confirm_uri: uri,
                    expected_type: self.metadata.entity_type_name()?.to_string(),
                }
            }
            MethodKind::Action { name, entity_type } => {
                let uri = if predicate.is_empty()
                    && self.protocol.wraps_parameter_list_for_unbound_actions()
                {
                    let args = params
                        .ordinary()
                        .map(|(name, value)| format!("{name}={value}"))
                        .collect::<Vec<_>>();
                    let call = if args.is_empty() {
                        String::new()
                    } else {
                        format!("({})", args.join(","))
                    };
                    self.protocol.build_odata_uri(&format!("{endpoint}{name}{call}"))
                } else {
                    self.protocol
                        .build_odata_uri(&format!("{endpoint}{predicate}/{name}"))
                };
                let body = serialize_parameters(&[], params.ordinary(), None)?;
                Plan {
                    request: HttpRequest::new(self.metadata.create_request_method()?, &uri)
                        .with_json(body),
                    confirm_uri: uri,
                    expected_type: self.action_type(entity_type.as_ref())?,
                }
            }
            MethodKind::Association { op, referred } => {
                let (base, original) = rewrite_base_uri(&endpoint, referred)?;
                let uri = format!("{base}{predicate}");
                let referred_predicate = self
                    .protocol
                    .key_predicate(&params.ordinary_keys(), &self.metadata)?;
                let links = format!("{uri}/$links/{original}");
                let request = match op {
                    AssociationOp::Create => HttpRequest::new(Method::POST, links)
                        .with_json(link_body(&format!("{endpoint}{referred_predicate}"))),
                    AssociationOp::Delete => {
                        HttpRequest::new(Method::DELETE, format!("{links}{referred_predicate}"))
                    }
                };
                Plan {
                    request,
                    confirm_uri: uri,
                    expected_type: self.metadata.entity_type_name()?.to_string(),
                }
            }
        };
        Ok(plan)
    }

    fn plan_redfish(&self, kind: &MethodKind, invocation: &MethodInvocation) -> Result<Plan, Error> {
        if matches!(kind, MethodKind::Association { .. }) {
            return Err(Error::UnsupportedMethod(invocation.method_name.clone()));
        }
        let params = &invocation.parameters;
        let action = match kind {
            MethodKind::Action { name, .. } => Some(name.as_str()),
            _ => None,
        };
        let target_parameter = action.and_then(|name| self.metadata.action_target(name));

        let mut target = None;
        let mut body_params = Vec::new();
        for (name, value) in params.iter() {
            if name.eq_ignore_ascii_case(ODATA_ID_PARAMETER) {
                target = Some(parameter_odata_id(name, value)?.to_string());
            } else if matches!(kind, MethodKind::Delete)
                && name.eq_ignore_ascii_case(RESOURCE_PARAMETER)
            {
                target = Some(resource_odata_id(name, value)?.to_string());
            } else if let (Some(action), Some(_)) = (
                action,
                target_parameter.filter(|p| name.eq_ignore_ascii_case(p)),
            ) {
                let object = value.as_object().ok_or_else(|| {
                    Error::RedfishTarget(format!("parameter {name} is not a resource"))
                })?;
                target = Some(redfish::action_target(object, action)?.to_string());
            } else if !value.is_null() {
                body_params.push((name, value));
            }
        }
        let target = target.ok_or_else(|| Error::MissingParameter(ODATA_ID_PARAMETER.into()))?;
        let uri = redfish::resolve(&self.endpoint()?, &target)?;

        let request = match kind {
            MethodKind::Create => HttpRequest::new(self.metadata.create_request_method()?, &uri)
                .with_json(serialize_parameters(&[], body_params, None)?),
            MethodKind::Update => HttpRequest::new(self.metadata.update_request_method()?, &uri)
                .with_json(serialize_parameters(&[], body_params, None)?),
            MethodKind::Delete => HttpRequest::new(Method::DELETE, &uri),
            MethodKind::Action { .. } => {
                HttpRequest::new(self.metadata.create_request_method()?, &uri)
                    .with_json(serialize_parameters(&[], body_params, None)?)
            }
            MethodKind::Association { .. } => {
                return Err(Error::UnsupportedMethod(invocation.method_name.clone()))
            }
        };
        let expected_type = match kind {
            MethodKind::Action { entity_type, .. } => self.action_type(entity_type.as_ref())?,
            _ => self.metadata.entity_type_name()?.to_string(),
        };
        Ok(Plan {
            confirm_uri: uri,
            request,
            expected_type,
        })
    }

    fn check_connection(&self, uri: &str) -> Result<(), Error> {
        let url = Url::parse(uri).map_err(|err| Error::InvalidUri(uri.to_string(), err))?;
        if url.scheme() == "http" && !self.config.allow_unsecure_connection {
            return Err(Error::UnsecureConnection {
                command: self.metadata.source.clone(),
                uri: uri.to_string(),
            });
        }
        Ok(())
    }

    fn pass_inner_exception(&self) -> bool {
        self.config.pass_inner_exception
            || (self.protocol == Protocol::Redfish && self.metadata.pass_inner_exception())
    }

    /// Send prepared request and write mapped response to `sink`.
    ///
    /// # Errors
    ///
    /// - `Error::UnsecureConnection` for `http` URIs unless allowed
    /// - `Error::RequestInvocation` if transport fails, or
    ///   `Error::Transport` if inner errors are passed through
    /// - `Error::TypeCoercion` if a response object conflicts with the
    ///   expected type
    pub async fn invoke<T, S, C>(
        &self,
        transport: &T,
        prepared: &PreparedRequest,
        sink: &mut S,
        coercer: &C,
    ) -> Result<(), Error>
    where
        T: Transport,
        S: RecordSink + ?Sized,
        C: TypeCoercer + ?Sized,
    {
        let request = &prepared.request;
        self.check_connection(&request.uri)?;
        if let Some(body) = &request.body {
            trace!(%body, "request body");
        }
        let context = RequestContext::from(&self.config);
        let records = transport.send(request, &context).await.map_err(|err| {
            if self.pass_inner_exception() {
                Error::Transport(Box::new(err))
            } else {
                Error::RequestInvocation {
                    command: self.metadata.source.clone(),
                    uri: request.uri.clone(),
                    source: Box::new(err),
                }
            }
        })?;
        debug!(uri = %request.uri, records = records.len(), "response received");
        ResponseMapper {
            uri: &request.uri,
            type_name: &prepared.expected_type,
            allow_additional_data: self.config.allow_additional_data,
            single_instance: prepared.single_instance,
        }
        .forward(records, sink, coercer)
    }

    /// Read and write the results to `sink`.
    ///
    /// # Errors
    ///
    /// Errors of [`Self::navigation_reads`] and [`Self::invoke`].
    pub async fn process_query<T, S, C>(
        &self,
        transport: &T,
        query: &QueryBuilder,
        navigation: Option<Navigation<'_>>,
        sink: &mut S,
        coercer: &C,
    ) -> Result<(), Error>
    where
        T: Transport,
        S: RecordSink + ?Sized,
        C: TypeCoercer + ?Sized,
    {
        let reads = match navigation {
            Some(navigation) => self.navigation_reads(query, navigation)?,
            None => vec![self.read(query)?],
        };
        for read in &reads {
            self.invoke(transport, read, sink, coercer).await?;
        }
        Ok(())
    }

    /// Dispatch method invocation and write the results to `sink`.
    ///
    /// Declined invocations send nothing and succeed.
    ///
    /// # Errors
    ///
    /// Errors of [`Self::dispatch`] and [`Self::invoke`].
    pub async fn process_invocation<T, G, S, C>(
        &self,
        transport: &T,
        invocation: &MethodInvocation,
        gate: &mut G,
        sink: &mut S,
        coercer: &C,
    ) -> Result<(), Error>
    where
        T: Transport,
        G: ConfirmationGate + ?Sized,
        S: RecordSink + ?Sized,
        C: TypeCoercer + ?Sized,
    {
        match self.dispatch(invocation, gate)? {
            Some(prepared) => self.invoke(transport, &prepared, sink, coercer).await,
            None => Ok(()),
        }
    }
}

fn parameter_odata_id<'a>(name: &str, value: &'a Value) -> Result<&'a str, Error> {
    value
        .as_str()
        .ok_or_else(|| Error::RedfishTarget(format!("parameter {name} is not a string")))
}

fn resource_odata_id<'a>(name: &str, value: &'a Value) -> Result<&'a str, Error> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::RedfishTarget(format!("parameter {name} is not a resource")))?;
    redfish::odata_id(object)
}
