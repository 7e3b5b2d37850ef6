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

use odata_proxy_core::metadata::PASS_INNER_EXCEPTION;
use odata_proxy_core::Adapter;
use odata_proxy_core::ConnectionConfig;
use odata_proxy_core::Credentials;
use odata_proxy_core::EntityMetadata;
use odata_proxy_core::Error as ProxyError;
use odata_proxy_core::MethodInvocation;
use odata_proxy_core::Navigation;
use odata_proxy_core::Parameters;
use odata_proxy_core::Protocol;
use odata_proxy_core::QueryBuilder;
use odata_proxy_core::ResponseRecord;
use odata_proxy_core::Unattended;
use odata_proxy_core::Value;
use odata_proxy_tests::entity::computer_system;
use odata_proxy_tests::entity::processor;
use odata_proxy_tests::entity::Schema;
use odata_proxy_tests::entity::BMC;
use odata_proxy_tests::error::TestError;
use odata_proxy_tests::Error;
use odata_proxy_tests::Expect;
use odata_proxy_tests::ScriptedGate;
use odata_proxy_tests::Transport;
use odata_proxy_tests::ODATA_ID;

use http::Method;
use serde_json::json;
use tokio::test;

fn adapter(metadata: EntityMetadata) -> Adapter {
    Adapter::new(
        Protocol::Redfish,
        format!("{BMC}/redfish/v1/Systems"),
        metadata,
        ConnectionConfig::default()
            .with_credentials(Credentials::new("root".into(), "password".into())),
    )
}

fn system() -> serde_json::Value {
    json!({
        ODATA_ID: "/redfish/v1/Systems/1",
        "Id": "1",
        "Processors": [
            { ODATA_ID: "/redfish/v1/Systems/1/Processors/CPU0" },
            { ODATA_ID: "/redfish/v1/Systems/1/Processors/CPU1" }
        ],
        "Actions": {
            "#ComputerSystem.Reset": {
                "target": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"
            }
        }
    })
}

// Check that every linked processor of every system is read and that
// `@odata.id` survives coercion as `odataId`.
#[test]
async fn navigation_read_test() -> Result<(), Error> {
    let transport = Transport::default();
    for cpu in ["CPU0", "CPU1"] {
        let id = format!("/redfish/v1/Systems/1/Processors/{cpu}");
        transport.expect(Expect::get(
            format!("{BMC}{id}"),
            json!({ODATA_ID: &id, "Id": cpu, "TotalCores": 8}),
        ));
    }
    let parents = [system()];
    let mut records = Vec::new();
    let coercer = Schema::default().with("Processor.Processor", &["Id", "TotalCores"]);
    adapter(processor())
        .process_query(
            &transport,
            &QueryBuilder::new(),
            Some(Navigation {
                parent_type: "ComputerSystem",
                parents: &parents,
            }),
            &mut records,
            &coercer,
        )
        .await?;
    assert_eq!(
        records,
        vec![
            ResponseRecord::Object(json!({
                "Id": "CPU0",
                "TotalCores": 8,
                "odataId": "/redfish/v1/Systems/1/Processors/CPU0"
            })),
            ResponseRecord::Object(json!({
                "Id": "CPU1",
                "TotalCores": 8,
                "odataId": "/redfish/v1/Systems/1/Processors/CPU1"
            })),
        ]
    );
    assert!(transport.is_done());
    let contexts = transport.contexts();
    assert_eq!(contexts.len(), 2);
    assert!(contexts.iter().all(|c| c.credentials.is_some()));
    Ok(())
}

// Check that reset is posted to the target advertised by the system.
#[test]
async fn reset_action_test() -> Result<(), Error> {
    let transport = Transport::default();
    transport.expect(Expect::no_content(
        Method::POST,
        format!("{BMC}/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"),
        Some(r#"{"ResetType": "GracefulRestart"}"#),
    ));
    let invocation = MethodInvocation::new(
        "Action:ComputerSystem.Reset:ComputerSystem.ComputerSystem",
        Parameters::new()
            .with("System", Value::Object(system()))
            .with("ResetType", "GracefulRestart")
            .with("Force", true),
    );
    let mut records = Vec::new();
    adapter(computer_system())
        .process_invocation(&transport, &invocation, &mut Unattended, &mut records, &Schema::default())
        .await?;
    assert!(records.is_empty());
    assert!(transport.is_done());
    Ok(())
}

// Check that update and delete address the resource by `@odata.id`.
#[test]
async fn update_and_delete_test() -> Result<(), Error> {
    let transport = Transport::default();
    transport.expect(Expect::update(
        format!("{BMC}/redfish/v1/Systems/1"),
        json!({"AssetTag": "rack-7"}),
        json!({ODATA_ID: "/redfish/v1/Systems/1", "Id": "1", "AssetTag": "rack-7"}),
    ));
    transport.expect(Expect::delete(format!("{BMC}/redfish/v1/Systems/1")));

    let adapter = adapter(computer_system());
    let coercer = Schema::default().with("ComputerSystem.ComputerSystem", &["Id", "AssetTag"]);
    let mut records = Vec::new();
    let update = MethodInvocation::new(
        "Update",
        Parameters::new()
            .with("OdataId", "/redfish/v1/Systems/1")
            .with("AssetTag", "rack-7")
            .with("HostName", Value::Null),
    );
    adapter
        .process_invocation(&transport, &update, &mut Unattended, &mut records, &coercer)
        .await?;

    let delete = MethodInvocation::new(
        "Delete",
        Parameters::new().with("Resource", Value::Object(system())),
    );
    adapter
        .process_invocation(&transport, &delete, &mut Unattended, &mut records, &coercer)
        .await?;

    assert_eq!(
        records,
        vec![ResponseRecord::Object(json!({
            "Id": "1",
            "AssetTag": "rack-7",
            "odataId": "/redfish/v1/Systems/1"
        }))]
    );
    assert!(transport.is_done());
    Ok(())
}

// Check that declared `PassInnerException` surfaces the transport error
// unchanged.
#[test]
async fn pass_inner_exception_test() -> Result<(), Error> {
    let transport = Transport::default();
    transport.expect(Expect::error(
        Method::GET,
        format!("{BMC}/redfish/v1/Systems"),
        TestError::ConnectionRefused,
    ));
    let mut records = Vec::new();
    let result = adapter(computer_system().with(PASS_INNER_EXCEPTION, "True"))
        .process_query(&transport, &QueryBuilder::new(), None, &mut records, &Schema::default())
        .await;
    let Err(ProxyError::Transport(err)) = result else {
        return Err(Error::ExpectedRequest("transport error"));
    };
    assert!(err.to_string().contains("connection refused"));
    Ok(())
}

// Check that association methods are not available for Redfish.
#[test]
async fn association_is_unsupported_test() -> Result<(), Error> {
    let invocation = MethodInvocation::new("Association:Create:Chassis", Parameters::new());
    let result = adapter(computer_system()).dispatch(&invocation, &mut Unattended);
    assert!(matches!(result, Err(ProxyError::UnsupportedMethod(_))));

    let invocation = MethodInvocation::new(
        "Association:Delete:Chassis",
        Parameters::new().with("OdataId", "/redfish/v1/Chassis/1"),
    );
    let result = adapter(computer_system()).dispatch(&invocation, &mut Unattended);
    assert!(matches!(result, Err(ProxyError::UnsupportedMethod(_))));
    Ok(())
}

// Check that a declined update of a Redfish resource sends nothing.
#[test]
async fn declined_update_test() -> Result<(), Error> {
    let transport = Transport::default();
    let mut gate = ScriptedGate::answering(true, false);
    let update = MethodInvocation::new(
        "Update",
        Parameters::new()
            .with("OdataId", "/redfish/v1/Systems/1")
            .with("AssetTag", "rack-7"),
    );
    let mut records = Vec::new();
    adapter(computer_system())
        .process_invocation(&transport, &update, &mut gate, &mut records, &Schema::default())
        .await?;
    assert_eq!(
        gate.prompts,
        vec![
            format!("Modify ComputerSystem.ComputerSystem in Systems at {BMC}/redfish/v1/Systems/1"),
            format!(
                "ComputerSystem.cdxml: do you want to modify ComputerSystem.ComputerSystem in Systems at {BMC}/redfish/v1/Systems/1?"
            ),
        ]
    );
    assert!(records.is_empty());
    assert!(transport.contexts().is_empty());
    Ok(())
}
