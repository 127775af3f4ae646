//! Long-running operation handling against a local Resource Manager stand-in

mod common;

use common::{ArmServer, Reply};
use netrep_cloud::CloudError;
use netrep_cloud_azure::models::ArmResource;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio_test::{assert_err, assert_ok};

const API_VERSION: &str = "2019-11-01";
const ACCOUNT: &str =
    "/subscriptions/0000-1111/resourceGroups/rg/providers/Microsoft.NetApp/netAppAccounts/acct";
const VOLUME: &str = "/subscriptions/0000-1111/resourceGroups/rg/providers/Microsoft.NetApp/netAppAccounts/acct/capacityPools/pool/volumes/vol";

fn account_body(provisioning_state: &str) -> serde_json::Value {
    json!({
        "id": ACCOUNT,
        "name": "acct",
        "location": "westus",
        "properties": {"provisioningState": provisioning_state}
    })
}

#[tokio::test]
async fn test_put_without_operation_returns_echoed_body() {
    let server = ArmServer::start().await;
    server.on("PUT", ACCOUNT, vec![Reply::json(200, account_body("Succeeded"))]);

    let client = server.client();
    let echoed = assert_ok!(
        client
            .put::<_, ArmResource>("create account", ACCOUNT, API_VERSION, &json!({}))
            .await
    );

    assert_eq!(echoed.map(|r| r.name).as_deref(), Some("acct"));
    assert_eq!(server.requests(), vec![format!("PUT {}", ACCOUNT)]);
}

#[tokio::test]
async fn test_async_operation_polled_until_succeeded() {
    let server = ArmServer::start().await;
    server.on(
        "PUT",
        ACCOUNT,
        vec![
            Reply::json(201, account_body("Creating"))
                .header("azure-asyncoperation", server.url("/operations/op1"))
                .retry_after(0),
        ],
    );
    server.on(
        "GET",
        "/operations/op1",
        vec![
            Reply::operation("InProgress"),
            Reply::operation("InProgress"),
            Reply::operation("Succeeded"),
        ],
    );

    let client = server.client();
    let echoed = assert_ok!(
        client
            .put::<_, ArmResource>("create account", ACCOUNT, API_VERSION, &json!({}))
            .await
    );

    let echoed = echoed.unwrap();
    assert_eq!(echoed.properties["provisioningState"], "Creating");
    assert_eq!(server.count("GET /operations/op1"), 3);
    assert_eq!(server.count(&format!("GET {}", ACCOUNT)), 0);
}

#[tokio::test]
async fn test_failed_operation_is_a_mutation_error() {
    let server = ArmServer::start().await;
    server.on(
        "DELETE",
        VOLUME,
        vec![
            Reply::empty(202)
                .header("azure-asyncoperation", server.url("/operations/op2"))
                .retry_after(0),
        ],
    );
    server.on(
        "GET",
        "/operations/op2",
        vec![
            Reply::operation("InProgress"),
            Reply::json(
                200,
                json!({"status": "Failed", "error": {"code": "InternalError", "message": "volume is busy"}}),
            ),
        ],
    );

    let client = server.client();
    let err = assert_err!(client.delete("delete volume", VOLUME, API_VERSION).await);
    match CloudError::from(err) {
        CloudError::MutationFailed { operation, message } => {
            assert_eq!(operation, "delete volume");
            assert!(message.contains("InternalError"));
            assert!(message.contains("volume is busy"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(server.count("GET /operations/op2"), 2);
}

#[tokio::test]
async fn test_canceled_operation_is_a_mutation_error() {
    let server = ArmServer::start().await;
    let action = format!("{}/breakReplication", VOLUME);
    server.on(
        "POST",
        &action,
        vec![
            Reply::empty(202)
                .header("azure-asyncoperation", server.url("/operations/op3"))
                .retry_after(0),
        ],
    );
    server.on("GET", "/operations/op3", vec![Reply::operation("Canceled")]);

    let client = server.client();
    let err = assert_err!(
        client
            .post::<()>("break replication", &action, API_VERSION, None)
            .await
    );
    assert!(matches!(
        CloudError::from(err),
        CloudError::MutationFailed { ref message, .. } if message.contains("Canceled")
    ));
}

#[tokio::test]
async fn test_location_followed_until_done() {
    let server = ArmServer::start().await;
    let action = format!("{}/authorizeReplication", VOLUME);
    server.on(
        "POST",
        &action,
        vec![
            Reply::empty(202)
                .header("location", server.url("/operations/loc1"))
                .retry_after(0),
        ],
    );
    server.on(
        "GET",
        "/operations/loc1",
        vec![Reply::empty(202).retry_after(0), Reply::empty(200)],
    );

    let client = server.client();
    let body = json!({"remoteVolumeResourceId": "/remote"});
    assert_ok!(
        client
            .post("authorize replication", &action, API_VERSION, Some(&body))
            .await
    );
    assert_eq!(server.count("GET /operations/loc1"), 2);
}

#[tokio::test]
async fn test_location_failure_is_a_mutation_error() {
    let server = ArmServer::start().await;
    server.on(
        "DELETE",
        VOLUME,
        vec![
            Reply::empty(202)
                .header("location", server.url("/operations/loc2"))
                .retry_after(0),
        ],
    );
    server.on(
        "GET",
        "/operations/loc2",
        vec![Reply::json(
            409,
            json!({"error": {"code": "Conflict", "message": "pool not empty"}}),
        )],
    );

    let client = server.client();
    let err = assert_err!(client.delete("delete volume", VOLUME, API_VERSION).await);
    assert!(matches!(
        CloudError::from(err),
        CloudError::MutationFailed { ref message, .. } if message.contains("pool not empty")
    ));
}

#[tokio::test]
async fn test_retry_after_delays_next_poll() {
    let server = ArmServer::start().await;
    server.on(
        "DELETE",
        VOLUME,
        vec![
            Reply::empty(202)
                .header("azure-asyncoperation", server.url("/operations/op4"))
                .retry_after(1),
        ],
    );
    server.on("GET", "/operations/op4", vec![Reply::operation("Succeeded")]);

    let client = server.client();
    let start = Instant::now();
    assert_ok!(client.delete("delete volume", VOLUME, API_VERSION).await);
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_operation_deadline() {
    let server = ArmServer::start().await;
    server.on(
        "DELETE",
        VOLUME,
        vec![
            Reply::empty(202)
                .header("azure-asyncoperation", server.url("/operations/op5"))
                .retry_after(0),
        ],
    );
    server.on("GET", "/operations/op5", vec![Reply::operation("InProgress")]);

    let client = server.client().with_operation_timeout(Duration::ZERO);
    let err = assert_err!(client.delete("delete volume", VOLUME, API_VERSION).await);
    assert!(matches!(
        CloudError::from(err),
        CloudError::MutationFailed { ref message, .. } if message.contains("did not complete in time")
    ));
    assert_eq!(server.count("GET /operations/op5"), 0);
}

#[tokio::test]
async fn test_rejected_request_is_not_followed() {
    let server = ArmServer::start().await;
    server.on(
        "PUT",
        ACCOUNT,
        vec![Reply::json(
            400,
            json!({"error": {"code": "InvalidParameter", "message": "bad location"}}),
        )],
    );

    let client = server.client();
    let err = assert_err!(
        client
            .put::<_, ArmResource>("create account", ACCOUNT, API_VERSION, &json!({}))
            .await
    );
    assert!(matches!(
        CloudError::from(err),
        CloudError::Api { status: 400, ref code, .. } if code == "InvalidParameter"
    ));
    assert_eq!(server.requests().len(), 1);
}
