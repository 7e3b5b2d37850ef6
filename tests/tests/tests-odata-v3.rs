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

use http::Method;
use odata_proxy_core::Adapter;
use odata_proxy_core::ConnectionConfig;
use odata_proxy_core::MethodInvocation;
use odata_proxy_core::Parameters;
use odata_proxy_core::Protocol;
use odata_proxy_core::QueryBuilder;
use odata_proxy_core::ResponseRecord;
use odata_proxy_core::Unattended;
use odata_proxy_core::Error as ProxyError;
use odata_proxy_mock::Expect as MockExpect;
use odata_proxy_tests::entity::product;
use odata_proxy_tests::entity::Schema;
use odata_proxy_tests::entity::DEMO_SERVICE;
use odata_proxy_tests::error::TestError;
use odata_proxy_tests::Error;
use odata_proxy_tests::Expect;
use odata_proxy_tests::ScriptedGate;
use odata_proxy_tests::Transport;

use serde_json::json;
use tokio::test;

fn products() -> Adapter {
    Adapter::new(
        Protocol::ODataV3,
        format!("{DEMO_SERVICE}/Products"),
        product(),
        ConnectionConfig::default().allow_unsecure_connection(true),
    )
}

// Check that filter and paging options are appended after `$format`
// and that collection metadata is reported separately from members.
#[test]
async fn filtered_collection_read_test() -> Result<(), Error> {
    let transport = Transport::default();
    let uri = format!("{DEMO_SERVICE}/Products?$format=json&$filter=Price gt 10&$skip=1&$top=2");
    transport.expect(Expect::get(
        &uri,
        json!({
            "odata.metadata": format!("{DEMO_SERVICE}/$metadata#Products"),
            "value": [
                {"Id": 1, "Name": "Milk", "Price": 11.5},
                {"Id": 2, "Name": "Wine", "Price": 20.0}
            ]
        }),
    ));
    let query = QueryBuilder::new()
        .filter_by_property("Top", [2])?
        .filter_by_property("Filter", ["Price gt 10"])?
        .filter_by_property("Skip", [1])?;
    let mut records = Vec::new();
    products()
        .process_query(&transport, &query, None, &mut records, &Schema::demo())
        .await?;

    assert_eq!(
        records,
        vec![
            ResponseRecord::Information {
                tags: vec!["AdditionalInfo".into()],
                data: json!({"odata.metadata": format!("{DEMO_SERVICE}/$metadata#Products")}),
            },
            ResponseRecord::Object(json!({"Id": 1, "Name": "Milk", "Price": 11.5})),
            ResponseRecord::Object(json!({"Id": 2, "Name": "Wine", "Price": 20.0})),
        ]
    );
    assert!(transport.is_done());
    Ok(())
}

// Check that a read by key is a single instance and is not unwrapped.
#[test]
async fn read_by_key_test() -> Result<(), Error> {
    let transport = Transport::default();
    transport.expect(Expect::get(
        format!("{DEMO_SERVICE}/Products(Id=1)?$format=json"),
        json!({"Id": 1, "Name": "Milk", "value": 3}),
    ));
    let query = QueryBuilder::new().filter_by_property("Id", [1])?;
    let mut records = Vec::new();
    let coercer = Schema::demo().with("ODataDemo.Product", &["Id", "Name", "value"]);
    products()
        .process_query(&transport, &query, None, &mut records, &coercer)
        .await?;
    assert_eq!(
        records,
        vec![ResponseRecord::Object(json!({"Id": 1, "Name": "Milk", "value": 3}))]
    );
    Ok(())
}

// Check that undeclared members end the invocation unless additional
// data is allowed.
#[test]
async fn additional_data_test() -> Result<(), Error> {
    let response = json!({"Id": 1, "Name": "Milk", "Discontinued": true});
    let transport = Transport::default();
    transport.expect(Expect::get(
        format!("{DEMO_SERVICE}/Products(Id=1)?$format=json"),
        &response,
    ));
    let query = QueryBuilder::new().filter_by_property("Id", [1])?;
    let mut records = Vec::new();
    let result = products()
        .process_query(&transport, &query, None, &mut records, &Schema::demo())
        .await;
    assert!(matches!(result, Err(ProxyError::TypeCoercion { .. })));
    assert!(records.is_empty());

    transport.expect(Expect::get(
        format!("{DEMO_SERVICE}/Products(Id=1)?$format=json"),
        &response,
    ));
    let adapter = Adapter::new(
        Protocol::ODataV3,
        format!("{DEMO_SERVICE}/Products"),
        product(),
        ConnectionConfig::default()
            .allow_unsecure_connection(true)
            .allow_additional_data(true),
    );
    adapter
        .process_query(&transport, &query, None, &mut records, &Schema::demo())
        .await?;
    assert_eq!(records, vec![ResponseRecord::Object(response)]);
    Ok(())
}

// Check that objects of unknown types are written as received with a
// warning.
#[test]
async fn unknown_type_test() -> Result<(), Error> {
    let transport = Transport::default();
    transport.expect(Expect::get(
        format!("{DEMO_SERVICE}/Products(Id=1)?$format=json"),
        json!({"Id": 1}),
    ));
    let query = QueryBuilder::new().filter_by_property("Id", [1])?;
    let mut records = Vec::new();
    products()
        .process_query(&transport, &query, None, &mut records, &Schema::default())
        .await?;
    assert!(matches!(&records[0], ResponseRecord::Warning(_)));
    assert_eq!(records[1], ResponseRecord::Object(json!({"Id": 1})));
    Ok(())
}

// Check create, update and delete of one product.
#[test]
async fn crud_test() -> Result<(), Error> {
    let transport = Transport::default();
    let adapter = products();
    let mut records = Vec::new();

    transport.expect(Expect::create(
        format!("{DEMO_SERVICE}/Products"),
        json!({"Id": 9, "Name": "Tea", "__metadata": {"type": "ODataDemo.Product"}}),
        json!({"Id": 9, "Name": "Tea"}),
    ));
    let create = MethodInvocation::new(
        "Create",
        Parameters::new()
            .with("Id:Key", 9)
            .with("Name", "Tea")
            .with("Force", true),
    );
    adapter
        .process_invocation(&transport, &create, &mut Unattended, &mut records, &Schema::demo())
        .await?;

    transport.expect(MockExpect::no_content(
        Method::from_bytes(b"MERGE").unwrap(),
        format!("{DEMO_SERVICE}/Products(Id=9)?$format=json"),
        Some(r#"{"Price": 3, "__metadata": {"type": "ODataDemo.Product"}}"#),
    ));
    let update = MethodInvocation::new(
        "Update",
        Parameters::new().with("Id:Key", 9).with("Price", 3),
    );
    adapter
        .process_invocation(&transport, &update, &mut Unattended, &mut records, &Schema::demo())
        .await?;

    transport.expect(Expect::delete(format!("{DEMO_SERVICE}/Products(Id=9)?$format=json")));
    let delete = MethodInvocation::new("Delete", Parameters::new().with("Id:Key", 9));
    adapter
        .process_invocation(&transport, &delete, &mut Unattended, &mut records, &Schema::demo())
        .await?;

    assert_eq!(
        records,
        vec![ResponseRecord::Object(json!({"Id": 9, "Name": "Tea"}))]
    );
    assert!(transport.is_done());
    Ok(())
}


// Check that association links are created and removed through the
// referred entity.
#[test]
async fn association_test() -> Result<(), Error> {
    let transport = Transport::default();
    let adapter = products();
    let mut records = Vec::new();
    let parameters = Parameters::new().with("ID:Key", 4).with("Id", 1);

    transport.expect(MockExpect::no_content(
        Method::POST,
        format!("{DEMO_SERVICE}/Suppliers(ID=4)/$links/Products"),
        Some(json!({"url": format!("{DEMO_SERVICE}/Products(Id=1)")}).to_string().as_str()),
    ));
    let link = MethodInvocation::new("Association:Create:Suppliers", parameters.clone());
    adapter
        .process_invocation(&transport, &link, &mut Unattended, &mut records, &Schema::demo())
        .await?;

    transport.expect(Expect::delete(format!(
        "{DEMO_SERVICE}/Suppliers(ID=4)/$links/Products(Id=1)"
    )));
    let unlink = MethodInvocation::new("Association:Delete:Suppliers", parameters);
    adapter
        .process_invocation(&transport, &unlink, &mut Unattended, &mut records, &Schema::demo())
        .await?;

    assert!(records.is_empty());
    assert!(transport.is_done());
    Ok(())
}

// Check that association reads go through the referred resource.
#[test]
async fn association_read_test() -> Result<(), Error> {
    let transport = Transport::default();
    transport.expect(Expect::get(
        format!("{DEMO_SERVICE}/Suppliers(ID=4)/Products?$format=json&$select=Id,Name"),
        json!({"value": [{"Id": 1, "Name": "Milk"}]}),
    ));
    let query = QueryBuilder::new()
        .filter_by_property("Suppliers:ID:Key", [4])?
        .filter_by_property("QueryOption:Select", ["Id", "Name"])?;
    let mut records = Vec::new();
    products()
        .process_query(&transport, &query, None, &mut records, &Schema::demo())
        .await?;
    assert_eq!(records, vec![ResponseRecord::Object(json!({"Id": 1, "Name": "Milk"}))]);
    Ok(())
}

// Check that a declined confirmation sends nothing, and that `Force`
// skips the second prompt.
#[test]
async fn confirmation_test() -> Result<(), Error> {
    let transport = Transport::default();
    let adapter = products();
    let mut records = Vec::new();

    let mut gate = ScriptedGate::answering(true, false);
    let delete = MethodInvocation::new("Delete", Parameters::new().with("Id:Key", 1));
    adapter
        .process_invocation(&transport, &delete, &mut gate, &mut records, &Schema::demo())
        .await?;
    assert_eq!(gate.prompts.len(), 2);
    assert!(gate.prompts[1].starts_with("Product.cdxml:"));
    assert!(transport.contexts().is_empty());

    let mut gate = ScriptedGate::answering(true, false);
    transport.expect(Expect::delete(format!("{DEMO_SERVICE}/Products(Id=1)?$format=json")));
    let forced = MethodInvocation::new(
        "Delete",
        Parameters::new().with("Id:Key", 1).with("Force", true),
    );
    adapter
        .process_invocation(&transport, &forced, &mut gate, &mut records, &Schema::demo())
        .await?;
    assert_eq!(gate.prompts.len(), 1);
    assert!(transport.is_done());
    Ok(())
}

// Check that declined actions and association links send nothing.
#[test]
async fn declined_action_and_association_test() -> Result<(), Error> {
    let transport = Transport::default();
    let adapter = products();
    let mut records = Vec::new();

    let mut gate = ScriptedGate::answering(false, true);
    let rate = MethodInvocation::new(
        "Action:Rate:ODataDemo.Product",
        Parameters::new().with("Id:Key", 1).with("Rating", 5),
    );
    adapter
        .process_invocation(&transport, &rate, &mut gate, &mut records, &Schema::demo())
        .await?;
    assert_eq!(gate.prompts.len(), 1);
    assert!(gate.prompts[0].starts_with("Invoke action of namespace ODataDemo at "));

    let mut gate = ScriptedGate::answering(true, false);
    let link = MethodInvocation::new(
        "Association:Create:Suppliers",
        Parameters::new().with("ID:Key", 4).with("Id", 1),
    );
    adapter
        .process_invocation(&transport, &link, &mut gate, &mut records, &Schema::demo())
        .await?;
    assert_eq!(gate.prompts.len(), 2);
    assert!(gate.prompts[0].starts_with("Modify ODataDemo.Product in Products at "));

    assert!(records.is_empty());
    assert!(transport.contexts().is_empty());
    Ok(())
}

// Check that transport failures are reported with the hosting command.
#[test]
async fn transport_failure_test() -> Result<(), Error> {
    let transport = Transport::default();
    let uri = format!("{DEMO_SERVICE}/Products?$format=json");
    transport.expect(Expect::error(Method::GET, &uri, TestError::ConnectionRefused));
    let mut records = Vec::new();
    let result = products()
        .process_query(&transport, &QueryBuilder::new(), None, &mut records, &Schema::demo())
        .await;
    let Err(ProxyError::RequestInvocation {
        command,
        uri: failed,
        ..
    }) = result
    else {
        return Err(Error::ExpectedRequest("failed request"));
    };
    assert_eq!(command, "Product.cdxml");
    assert_eq!(failed, uri);
    Ok(())
}

// Check that plain `http` is refused unless unsecure connections are
// allowed.
#[test]
async fn unsecure_connection_test() -> Result<(), Error> {
    let transport = Transport::default();
    let adapter = Adapter::new(
        Protocol::ODataV3,
        format!("{DEMO_SERVICE}/Products"),
        product(),
        ConnectionConfig::default(),
    );
    let mut records = Vec::new();
    let result = adapter
        .process_query(&transport, &QueryBuilder::new(), None, &mut records, &Schema::demo())
        .await;
    assert!(matches!(result, Err(ProxyError::UnsecureConnection { .. })));
    assert!(transport.contexts().is_empty());
    Ok(())
}
