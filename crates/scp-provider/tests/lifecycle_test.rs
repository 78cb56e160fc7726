mod common;

use common::{FakeCloud, Step, context};
use scp_cloud::api::{Bucket, SecurityGroupRule, VirtualServer};
use scp_cloud::{ApiError, CancelHandle, CloudError, ResourceData, ResourceHandler};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn handler(name: &str) -> Arc<dyn ResourceHandler> {
    scp_provider::provider().unwrap().resource(name).unwrap()
}

fn planned(value: Value) -> ResourceData {
    ResourceData::from_value(value).unwrap()
}

fn a_record(value: &str) -> ResourceData {
    planned(json!({
        "dns_domain_id": "DOMAIN-1",
        "record_name": "www",
        "record_type": "A",
        "record_value": value,
    }))
}

#[tokio::test(start_paused = true)]
async fn test_create_waits_until_active() {
    let cloud = FakeCloud::new();
    cloud.queue_ids(&["abc"]);
    cloud.script(
        "abc",
        &[
            Step::State("CREATING"),
            Step::State("CREATING"),
            Step::State("ACTIVE"),
        ],
    );
    let ctx = context(&cloud);

    let start = Instant::now();
    let state = handler("scp_dns_record")
        .create(&ctx, a_record("10.0.0.1"))
        .await
        .unwrap();

    assert_eq!(state.id, "abc");
    assert_eq!(state.get_str("state"), Some("ACTIVE"));
    assert_eq!(state.get("ttl"), Some(&json!(300)));
    assert_eq!(start.elapsed(), Duration::from_secs(6));
    // three polls plus the final read
    assert_eq!(cloud.count("get_dns_record"), 4);
}

#[tokio::test(start_paused = true)]
async fn test_delete_treats_not_found_as_deleted() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);
    let handler = handler("scp_dns_record");

    let state = handler.create(&ctx, a_record("10.0.0.1")).await.unwrap();
    handler.delete(&ctx, &state.id).await.unwrap();

    assert!(cloud.record(&state.id).is_none());
    let calls = cloud.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        &[
            format!("delete_dns_record:{}", state.id),
            format!("get_dns_record:{}", state.id),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_delete_of_missing_resource_succeeds() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);

    handler("scp_dns_record")
        .delete(&ctx, "record-404")
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_delete_waits_through_terminating() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);
    let handler = handler("scp_dns_record");

    let state = handler.create(&ctx, a_record("10.0.0.1")).await.unwrap();
    cloud.script(
        &state.id,
        &[Step::State("TERMINATING"), Step::State("TERMINATING"), Step::Gone],
    );

    let start = Instant::now();
    handler.delete(&ctx, &state.id).await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_failed_follow_up_rolls_back() {
    let cloud = FakeCloud::new();
    cloud.queue_ids(&["db-1"]);
    cloud.fail_next("enable_disaster_recovery", ApiError::new(500, "replication unavailable"));
    let ctx = context(&cloud);

    let result = handler("scp_database")
        .create(
            &ctx,
            planned(json!({
                "name": "orders",
                "engine": "mysql",
                "engine_version": "8.0",
                "subnet_id": "SUBNET-1",
                "dr_enabled": true,
            })),
        )
        .await;

    match result {
        Err(CloudError::Transport { status, message }) => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "replication unavailable");
        }
        other => panic!("Expected the follow-up error, got {:?}", other),
    }
    assert!(cloud.database("db-1").is_none());
    assert!(cloud.calls().contains(&"delete_database:db-1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_database_follow_up_enables_dr() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);

    let state = handler("scp_database")
        .create(
            &ctx,
            planned(json!({
                "name": "orders",
                "engine": "postgresql",
                "engine_version": "16",
                "contract_period": "1-year",
                "subnet_id": "SUBNET-1",
                "dr_enabled": true,
            })),
        )
        .await
        .unwrap();

    assert_eq!(state.get("dr_enabled"), Some(&json!(true)));
    assert_eq!(state.get_str("contract_period"), Some("1-year"));
    assert_eq!(cloud.count("enable_disaster_recovery"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_database_rejects_disabling_dr() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);
    let handler = handler("scp_database");

    let prior = handler
        .create(
            &ctx,
            planned(json!({
                "name": "orders",
                "engine": "mysql",
                "engine_version": "8.0",
                "subnet_id": "SUBNET-1",
                "dr_enabled": true,
            })),
        )
        .await
        .unwrap();

    let mut next = prior.clone();
    next.attributes.insert("dr_enabled".to_string(), json!(false));
    match handler.update(&ctx, &prior, next).await {
        Err(CloudError::InvalidInput { path, .. }) => assert_eq!(path, "dr_enabled"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_read_of_vanished_resource() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);
    let handler = handler("scp_dns_record");

    let state = handler.create(&ctx, a_record("10.0.0.1")).await.unwrap();
    cloud.script(&state.id, &[Step::Gone]);

    let read = handler.read(&ctx, &state.id).await.unwrap();
    assert!(read.is_gone());
    assert!(read.attributes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_bucket_forbidden_means_vanished() {
    let cloud = FakeCloud::new();
    cloud.add_bucket(Bucket {
        id: "bucket-1".to_string(),
        name: "logs".to_string(),
        state: "ACTIVE".to_string(),
        object_storage_id: "OS-1".to_string(),
        versioning_enabled: false,
    });
    cloud.fail_next("get_bucket", ApiError::forbidden("access denied"));
    let ctx = context(&cloud);

    let read = handler("scp_object_storage_bucket")
        .read(&ctx, "bucket-1")
        .await
        .unwrap();
    assert!(read.is_gone());
}

#[tokio::test(start_paused = true)]
async fn test_server_forbidden_is_an_error() {
    let cloud = FakeCloud::new();
    cloud.fail_next("get_virtual_server", ApiError::forbidden("access denied"));
    let ctx = context(&cloud);

    match handler("scp_virtual_server").read(&ctx, "vs-1").await {
        Err(CloudError::Transport { status, .. }) => assert_eq!(status, Some(403)),
        other => panic!("Expected a transport error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_bucket_versioning_update() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);
    let handler = handler("scp_object_storage_bucket");

    let prior = handler
        .create(
            &ctx,
            planned(json!({ "name": "app-logs", "object_storage_id": "OS-1" })),
        )
        .await
        .unwrap();
    assert_eq!(prior.get("versioning_enabled"), Some(&json!(false)));

    let mut next = prior.clone();
    next.attributes
        .insert("versioning_enabled".to_string(), json!(true));
    let updated = handler.update(&ctx, &prior, next).await.unwrap();

    assert_eq!(updated.get("versioning_enabled"), Some(&json!(true)));
    assert_eq!(cloud.count("set_bucket_versioning"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_bucket_name_is_validated() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);

    let result = handler("scp_object_storage_bucket")
        .create(
            &ctx,
            planned(json!({ "name": "Bad_Name", "object_storage_id": "OS-1" })),
        )
        .await;
    assert!(matches!(result, Err(CloudError::InvalidInput { path, .. }) if path == "name"));
    assert!(cloud.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_server_update_resizes_and_swaps_groups() {
    let cloud = FakeCloud::new();
    cloud.add_server(VirtualServer {
        id: "vs-1".to_string(),
        name: "web".to_string(),
        state: "ACTIVE".to_string(),
        server_type: "s1v1m2".to_string(),
        image_id: "IMAGE-1".to_string(),
        security_group_ids: vec!["sg-a".to_string()],
        ip: Some("10.0.0.5".to_string()),
        delete_protection_enabled: false,
    });
    let ctx = context(&cloud);
    let handler = handler("scp_virtual_server");

    let prior = handler.read(&ctx, "vs-1").await.unwrap();
    let mut next = prior.clone();
    next.attributes
        .insert("server_type".to_string(), json!("s1v2m4"));
    next.attributes
        .insert("security_group_ids".to_string(), json!(["sg-b"]));

    let updated = handler.update(&ctx, &prior, next).await.unwrap();

    assert_eq!(updated.get_str("server_type"), Some("s1v2m4"));
    assert_eq!(updated.get("security_group_ids"), Some(&json!(["sg-b"])));
    assert_eq!(cloud.count("resize_virtual_server"), 1);
    assert!(cloud.calls().contains(&"attach_security_group:sg-b".to_string()));
    assert!(cloud.calls().contains(&"detach_security_group:sg-a".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_force_new_change_is_rejected() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);
    let handler = handler("scp_dns_record");

    let prior = handler.create(&ctx, a_record("10.0.0.1")).await.unwrap();
    let mut next = prior.clone();
    next.attributes
        .insert("record_name".to_string(), json!("api"));

    match handler.update(&ctx, &prior, next).await {
        Err(CloudError::InvalidInput { path, .. }) => assert_eq!(path, "record_name"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
    assert_eq!(cloud.count("update_dns_record"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dns_record_value_update() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);
    let handler = handler("scp_dns_record");

    let prior = handler.create(&ctx, a_record("10.0.0.1")).await.unwrap();
    let mut next = prior.clone();
    next.attributes
        .insert("record_value".to_string(), json!("10.0.0.2"));
    next.attributes.insert("ttl".to_string(), json!(600));

    let updated = handler.update(&ctx, &prior, next).await.unwrap();
    assert_eq!(updated.get_str("record_value"), Some("10.0.0.2"));
    assert_eq!(cloud.record(&prior.id).unwrap().ttl, 600);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_ipv4_makes_no_remote_call() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);

    let result = handler("scp_dns_record")
        .create(&ctx, a_record("999.1.1.1"))
        .await;

    assert!(matches!(result, Err(CloudError::InvalidInput { path, .. }) if path == "record_value"));
    assert!(cloud.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cname_value_is_not_an_address() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);

    let state = handler("scp_dns_record")
        .create(
            &ctx,
            planned(json!({
                "dns_domain_id": "DOMAIN-1",
                "record_name": "www",
                "record_type": "CNAME",
                "record_value": "web.example.com",
                "ttl": 60,
            })),
        )
        .await
        .unwrap();
    assert_eq!(state.get_str("record_type"), Some("CNAME"));
}

#[tokio::test(start_paused = true)]
async fn test_security_group_rule_identity() {
    let cloud = FakeCloud::new();
    cloud.queue_ids(&["sg-1", "rule-1"]);
    let ctx = context(&cloud);

    let group = handler("scp_security_group")
        .create(&ctx, planned(json!({ "name": "web", "vpc_id": "VPC-1" })))
        .await
        .unwrap();
    assert_eq!(group.id, "sg-1");

    let rules = handler("scp_security_group_rule");
    let rule = rules
        .create(
            &ctx,
            planned(json!({
                "security_group_id": "sg-1",
                "direction": "ingress",
                "protocol": "tcp",
                "port": 443,
                "remote_ip_prefix": "10.0.0.0/8",
            })),
        )
        .await
        .unwrap();
    assert_eq!(rule.id, "sg-1:rule-1");
    assert_eq!(rule.get_str("security_group_id"), Some("sg-1"));

    let imported = rules.import(&ctx, "sg-1:rule-1").await.unwrap();
    assert_eq!(imported.get("port"), Some(&json!(443)));

    rules.delete(&ctx, &rule.id).await.unwrap();
    assert!(cloud
        .calls()
        .contains(&"delete_security_group_rule:sg-1/rule-1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_removing_rule_port_requires_replacement() {
    let cloud = FakeCloud::new();
    cloud.queue_ids(&["sg-1", "rule-1"]);
    let ctx = context(&cloud);

    handler("scp_security_group")
        .create(&ctx, planned(json!({ "name": "web", "vpc_id": "VPC-1" })))
        .await
        .unwrap();

    let rules = handler("scp_security_group_rule");
    let prior = rules
        .create(
            &ctx,
            planned(json!({
                "security_group_id": "sg-1",
                "direction": "ingress",
                "protocol": "tcp",
                "port": 443,
                "remote_ip_prefix": "10.0.0.0/8",
            })),
        )
        .await
        .unwrap();

    let mut next = prior.clone();
    next.attributes.remove("port");

    match rules.update(&ctx, &prior, next).await {
        Err(CloudError::InvalidInput { path, .. }) => assert_eq!(path, "port"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
    let current = rules.read(&ctx, &prior.id).await.unwrap();
    assert_eq!(current.get("port"), Some(&json!(443)));
}

#[tokio::test(start_paused = true)]
async fn test_rule_import_requires_composite_id() {
    let cloud = FakeCloud::new();
    cloud.add_rule(
        "sg-1",
        SecurityGroupRule {
            id: "rule-1".to_string(),
            state: "ACTIVE".to_string(),
            direction: "egress".to_string(),
            protocol: "all".to_string(),
            port: None,
            remote_ip_prefix: "0.0.0.0/0".to_string(),
        },
    );
    let ctx = context(&cloud);
    let rules = handler("scp_security_group_rule");

    assert!(matches!(
        rules.import(&ctx, "rule-1").await,
        Err(CloudError::InvalidInput { .. })
    ));
    assert!(matches!(
        rules.import(&ctx, "sg-2:rule-1").await,
        Err(CloudError::NotFound(_))
    ));
    assert!(rules.import(&ctx, "sg-1:rule-1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_rule_attributes_are_validated() {
    let cloud = FakeCloud::new();
    let ctx = context(&cloud);

    let result = handler("scp_security_group_rule")
        .create(
            &ctx,
            planned(json!({
                "security_group_id": "sg-1",
                "direction": "sideways",
                "protocol": "tcp",
                "remote_ip_prefix": "10.0.0.0/8",
            })),
        )
        .await;
    assert!(matches!(result, Err(CloudError::InvalidInput { path, .. }) if path == "direction"));
    assert!(cloud.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_create_gives_up_at_deadline() {
    let cloud = FakeCloud::new();
    cloud.queue_ids(&["slow"]);
    cloud.script("slow", &[Step::State("CREATING")]);
    let ctx = context(&cloud).with_timeout(Duration::from_secs(10));

    let result = handler("scp_dns_record")
        .create(&ctx, a_record("10.0.0.1"))
        .await;

    assert!(matches!(result, Err(CloudError::Timeout(_))));
    // polls at 0, 3, 6, 9 and 10 seconds
    assert_eq!(cloud.count("get_dns_record"), 5);
}

#[tokio::test(start_paused = true)]
async fn test_create_can_be_cancelled() {
    let cloud = FakeCloud::new();
    cloud.queue_ids(&["slow"]);
    cloud.script("slow", &[Step::State("CREATING")]);
    let cancel = CancelHandle::new();
    let ctx = context(&cloud).with_cancel(cancel.token());
    let handler = handler("scp_dns_record");

    let start = Instant::now();
    let (result, ()) = tokio::join!(handler.create(&ctx, a_record("10.0.0.1")), async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();
    });

    assert!(matches!(result, Err(CloudError::Cancelled)));
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_virtual_servers_data_source() {
    let cloud = FakeCloud::new();
    for (id, name) in [("vs-1", "web-1"), ("vs-2", "db-1"), ("vs-3", "web-2")] {
        cloud.add_server(VirtualServer {
            id: id.to_string(),
            name: name.to_string(),
            state: "ACTIVE".to_string(),
            server_type: "s1v1m2".to_string(),
            image_id: "IMAGE-1".to_string(),
            ..Default::default()
        });
    }
    let ctx = context(&cloud);
    let source = scp_provider::provider()
        .unwrap()
        .data_source("scp_virtual_servers")
        .unwrap();

    let output = source
        .read(&ctx, planned(json!({ "name": "web" })))
        .await
        .unwrap();

    assert_eq!(output.id, "PROJECT-1");
    let servers = output.get("virtual_servers").unwrap().as_array().unwrap();
    let ids: Vec<&str> = servers.iter().filter_map(|s| s["id"].as_str()).collect();
    assert_eq!(ids, vec!["vs-1", "vs-3"]);
}
