use commons::resource::{
    CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest, UpdateResourceRequest,
    ValidateResourceConfigRequest,
};
use commons::{Dynamic, Resource};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use spotinst::provider::ConfigureRequest;
use spotinst::SpotinstProvider;
use std::collections::HashMap;

const OCEAN: &str = "spotinst_ocean_aws";

fn object(entries: &[(&str, Dynamic)]) -> Dynamic {
    Dynamic::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

async fn configured_resource(server: &ServerGuard, type_name: &str) -> Box<dyn Resource> {
    let mut provider = SpotinstProvider::new();
    let config = object(&[
        ("token", Dynamic::from("test-token")),
        ("account", Dynamic::from("act-1")),
        ("base_url", Dynamic::from(server.url())),
    ]);

    let response = provider.configure(ConfigureRequest { config }).await;
    assert!(!response.diagnostics.has_errors());

    provider.create_resource(type_name).await.unwrap()
}

fn ocean_config() -> Dynamic {
    object(&[
        ("name", Dynamic::from("ocean-1")),
        ("controller_id", Dynamic::from("ctrl-1")),
        ("region", Dynamic::from("us-west-2")),
        ("subnet_ids", Dynamic::from(vec!["subnet-1"])),
        ("max_size", Dynamic::from(10i64)),
        ("image_id", Dynamic::from("ami-1")),
        ("security_groups", Dynamic::from(vec!["sg-1"])),
        ("user_data", Dynamic::from("echo hi")),
    ])
}

const OCEAN_ITEM: &str = r#"{
    "id": "o-123",
    "name": "ocean-1",
    "controllerClusterId": "ctrl-1",
    "region": "us-west-2",
    "capacity": {"maximum": 10, "minimum": 0, "target": 1},
    "compute": {
        "subnetIds": ["subnet-1"],
        "launchSpecification": {
            "imageId": "ami-1",
            "userData": "ZWNobyBoaQ==",
            "securityGroupIds": ["sg-1"],
            "associatePublicIpAddress": false
        }
    }
}"#;

fn items(item: &str) -> String {
    format!(r#"{{"response":{{"items":[{}]}}}}"#, item)
}

fn state_value<'a>(state: &'a Dynamic, key: &str) -> Option<&'a Dynamic> {
    state.as_map().and_then(|values| values.get(key))
}

#[tokio::test(flavor = "multi_thread")]
async fn ocean_lifecycle_with_mock_server() {
    let mut server = Server::new_async().await;

    let create_mock = server
        .mock("POST", "/ocean/aws/k8s/cluster")
        .match_query(Matcher::UrlEncoded("accountId".into(), "act-1".into()))
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(json!({
            "cluster": {
                "name": "ocean-1",
                "region": "us-west-2",
                "capacity": {"maximum": 10},
                "compute": {
                    "subnetIds": ["subnet-1"],
                    "launchSpecification": {"imageId": "ami-1", "userData": "ZWNobyBoaQ=="}
                }
            }
        })))
        .with_body(items(OCEAN_ITEM))
        .create_async()
        .await;

    let resource = configured_resource(&server, OCEAN).await;

    let created = resource
        .create(CreateResourceRequest {
            type_name: OCEAN.to_string(),
            config: ocean_config(),
        })
        .await;
    create_mock.assert_async().await;
    assert!(!created.diagnostics.has_errors());

    let state = created.new_state;
    assert_eq!(state_value(&state, "id"), Some(&Dynamic::from("o-123")));
    assert_eq!(state_value(&state, "max_size"), Some(&Dynamic::from(10i64)));
    assert_eq!(state_value(&state, "desired_capacity"), Some(&Dynamic::from(1i64)));

    let read_mock = server
        .mock("GET", "/ocean/aws/k8s/cluster/o-123")
        .match_query(Matcher::UrlEncoded("accountId".into(), "act-1".into()))
        .with_body(items(OCEAN_ITEM))
        .create_async()
        .await;

    let read = resource
        .read(ReadResourceRequest {
            type_name: OCEAN.to_string(),
            current_state: state.clone(),
        })
        .await;
    read_mock.assert_async().await;
    assert!(!read.diagnostics.has_errors());
    assert_eq!(read.new_state.as_ref(), Some(&state));

    // only the renamed field goes out
    let renamed = OCEAN_ITEM.replace("\"ocean-1\"", "\"ocean-2\"");
    let update_mock = server
        .mock("PUT", "/ocean/aws/k8s/cluster/o-123")
        .match_query(Matcher::UrlEncoded("accountId".into(), "act-1".into()))
        .match_body(Matcher::Json(json!({"cluster": {"name": "ocean-2"}})))
        .with_body(items(&renamed))
        .create_async()
        .await;

    let mut planned = state.as_map().cloned().unwrap_or_default();
    planned.insert("name".to_string(), Dynamic::from("ocean-2"));
    let updated = resource
        .update(UpdateResourceRequest {
            type_name: OCEAN.to_string(),
            prior_state: state.clone(),
            config: Dynamic::Map(planned),
        })
        .await;
    update_mock.assert_async().await;
    assert!(!updated.diagnostics.has_errors());
    assert_eq!(
        state_value(&updated.new_state, "name"),
        Some(&Dynamic::from("ocean-2"))
    );

    let delete_mock = server
        .mock("DELETE", "/ocean/aws/k8s/cluster/o-123")
        .match_query(Matcher::UrlEncoded("accountId".into(), "act-1".into()))
        .with_body(r#"{"response":{"status":{"code":200}}}"#)
        .create_async()
        .await;

    let deleted = resource
        .delete(DeleteResourceRequest {
            type_name: OCEAN.to_string(),
            prior_state: updated.new_state,
        })
        .await;
    delete_mock.assert_async().await;
    assert!(!deleted.diagnostics.has_errors());
}

#[tokio::test(flavor = "multi_thread")]
async fn unchanged_update_makes_no_api_call() {
    let mut server = Server::new_async().await;
    let put_mock = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resource = configured_resource(&server, OCEAN).await;
    let state = object(&[
        ("id", Dynamic::from("o-123")),
        ("name", Dynamic::from("ocean-1")),
        ("region", Dynamic::from("us-west-2")),
        ("max_size", Dynamic::from(-1i64)),
        ("desired_capacity", Dynamic::from(2i64)),
        ("ebs_optimized", Dynamic::from(true)),
    ]);
    // the default fills in max_size and the API owns the computed values,
    // so leaving them out is not a change
    let config = object(&[
        ("name", Dynamic::from("ocean-1")),
        ("region", Dynamic::from("us-west-2")),
    ]);

    let updated = resource
        .update(UpdateResourceRequest {
            type_name: OCEAN.to_string(),
            prior_state: state.clone(),
            config,
        })
        .await;

    put_mock.assert_async().await;
    assert!(!updated.diagnostics.has_errors());
    assert_eq!(updated.new_state, state);
}

#[tokio::test(flavor = "multi_thread")]
async fn launch_spec_update_keeps_computed_security_groups() {
    let mut server = Server::new_async().await;
    let put_mock = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resource = configured_resource(&server, "spotinst_ocean_aws_launch_spec").await;
    let state = object(&[
        ("id", Dynamic::from("ols-1")),
        ("ocean_id", Dynamic::from("o-123")),
        ("image_id", Dynamic::from("ami-1")),
        ("security_groups", Dynamic::from(vec!["sg-1"])),
    ]);
    let config = object(&[
        ("ocean_id", Dynamic::from("o-123")),
        ("image_id", Dynamic::from("ami-1")),
    ]);

    let updated = resource
        .update(UpdateResourceRequest {
            type_name: "spotinst_ocean_aws_launch_spec".to_string(),
            prior_state: state.clone(),
            config,
        })
        .await;

    put_mock.assert_async().await;
    assert!(!updated.diagnostics.has_errors());
    assert_eq!(updated.new_state, state);
}

#[tokio::test(flavor = "multi_thread")]
async fn immutable_field_change_is_reported_without_api_call() {
    let mut server = Server::new_async().await;
    let put_mock = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resource = configured_resource(&server, OCEAN).await;
    let state = object(&[
        ("id", Dynamic::from("o-123")),
        ("name", Dynamic::from("ocean-1")),
        ("region", Dynamic::from("us-west-2")),
    ]);
    let config = object(&[
        ("name", Dynamic::from("ocean-1")),
        ("region", Dynamic::from("eu-west-1")),
    ]);

    let updated = resource
        .update(UpdateResourceRequest {
            type_name: OCEAN.to_string(),
            prior_state: state.clone(),
            config,
        })
        .await;

    put_mock.assert_async().await;
    assert_eq!(updated.diagnostics.errors.len(), 1);
    assert_eq!(
        updated.diagnostics.errors[0].detail,
        "field update not allowed: region"
    );
    assert_eq!(updated.new_state, state);
}

#[tokio::test(flavor = "multi_thread")]
async fn read_of_deleted_object_drops_state() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/ocean/aws/k8s/cluster/o-gone")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"response":{"errors":[{"code":"CLUSTER_DOESNT_EXIST","message":"not found"}]}}"#)
        .create_async()
        .await;

    let resource = configured_resource(&server, OCEAN).await;
    let read = resource
        .read(ReadResourceRequest {
            type_name: OCEAN.to_string(),
            current_state: object(&[("id", Dynamic::from("o-gone"))]),
        })
        .await;

    assert!(!read.diagnostics.has_errors());
    assert!(read.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn elastigroup_create_leaves_sentinels_out_of_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/azure/compute/group")
        .match_query(Matcher::Any)
        .match_body(Matcher::Json(json!({
            "group": {
                "name": "workers",
                "region": "eastus",
                "resourceGroupName": "rg-1",
                "strategy": {"fallbackToOd": true}
            }
        })))
        .with_body(items(
            r#"{"id":"sig-1","name":"workers","region":"eastus","resourceGroupName":"rg-1","strategy":{"fallbackToOd":true,"drainingTimeout":120}}"#,
        ))
        .create_async()
        .await;

    let resource = configured_resource(&server, "spotinst_elastigroup_azure_v3").await;
    let created = resource
        .create(CreateResourceRequest {
            type_name: "spotinst_elastigroup_azure_v3".to_string(),
            config: object(&[
                ("name", Dynamic::from("workers")),
                ("region", Dynamic::from("eastus")),
                ("resource_group_name", Dynamic::from("rg-1")),
                ("on_demand_count", Dynamic::from(-1i64)),
            ]),
        })
        .await;

    mock.assert_async().await;
    assert!(!created.diagnostics.has_errors());
    let state = &created.new_state;
    assert_eq!(state_value(state, "spot_percentage"), Some(&Dynamic::from(-1i64)));
    assert_eq!(state_value(state, "draining_timeout"), Some(&Dynamic::from(120i64)));
}

#[tokio::test(flavor = "multi_thread")]
async fn api_error_becomes_diagnostic() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/ocean/cd/rolloutSpec")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"response":{"errors":[{"code":"VALIDATION_ERROR","message":"strategy not found"}]}}"#)
        .create_async()
        .await;

    let resource = configured_resource(&server, "spotinst_oceancd_rollout_spec").await;
    let strategy = Dynamic::List(vec![object(&[("strategy_name", Dynamic::from("missing"))])]);
    let created = resource
        .create(CreateResourceRequest {
            type_name: "spotinst_oceancd_rollout_spec".to_string(),
            config: object(&[
                ("rollout_spec_name", Dynamic::from("web")),
                ("strategy", strategy),
            ]),
        })
        .await;

    assert_eq!(created.new_state, Dynamic::Null);
    assert_eq!(created.diagnostics.errors.len(), 1);
    assert_eq!(
        created.diagnostics.errors[0].summary,
        "Failed to create spotinst_oceancd_rollout_spec"
    );
    assert!(created.diagnostics.errors[0]
        .detail
        .contains("strategy not found"));
}

#[tokio::test]
async fn validate_reports_missing_required_attributes() {
    let server = Server::new_async().await;
    let resource = configured_resource(&server, "spotinst_ocean_aws_launch_spec").await;

    let response = resource
        .validate(ValidateResourceConfigRequest {
            type_name: "spotinst_ocean_aws_launch_spec".to_string(),
            config: Dynamic::Map(HashMap::from([(
                "name".to_string(),
                Dynamic::from("spec-1"),
            )])),
        })
        .await;

    let missing: Vec<_> = response
        .diagnostics
        .errors
        .iter()
        .filter_map(|d| d.attribute.as_ref().map(ToString::to_string))
        .collect();
    assert!(missing.contains(&"ocean_id".to_string()));
    assert!(missing.contains(&"image_id".to_string()));
}
