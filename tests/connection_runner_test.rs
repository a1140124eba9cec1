use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_auth::auth::NoAuthTokenProvider;
use catalog_auth::connection::{
    ConnectionStatus, StepFn, TestConnectionDefinition, TestStatus, step_fn,
};
use catalog_auth::{ConnectionTestRunner, ProviderConfig, RestClient, TestStep};

async fn catalog_client(server: &MockServer) -> RestClient {
    let config = ProviderConfig::new(format!("{}/api", server.uri())).with_retry(0, 0);
    RestClient::new(&config, Arc::new(NoAuthTokenProvider::new()), reqwest::Client::new()).unwrap()
}

fn check_steps(client: RestClient, profile_called: Arc<AtomicBool>) -> Vec<TestStep> {
    let reachable = client.clone();
    vec![
        TestStep::new("reachable", move || async move {
            reachable.get("system/version").await.map(|_| ())
        })
        .mandatory()
        .with_description("Catalog API answers"),
        TestStep::new("profile", move || async move {
            profile_called.store(true, Ordering::SeqCst);
            client.get("users/loggedInUser").await.map(|_| ())
        }),
    ]
}

#[tokio::test]
async fn unreachable_backend_skips_dependent_steps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/system/version"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let profile_called = Arc::new(AtomicBool::new(false));
    let steps = check_steps(catalog_client(&server).await, profile_called.clone());
    let summary = ConnectionTestRunner::new().run(steps).await;

    assert!(!summary.success);
    assert_eq!(summary.status(), ConnectionStatus::Failed);
    assert_eq!(summary.status_of("reachable"), Some(TestStatus::Failed));
    assert_eq!(summary.status_of("profile"), Some(TestStatus::Skipped));
    assert!(!profile_called.load(Ordering::SeqCst));
    assert!(
        summary.result("reachable").unwrap().error_message.as_deref().unwrap().contains("maintenance")
    );
}

#[tokio::test]
async fn optional_step_failure_keeps_connection_successful() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/system/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "version": "1.4.0"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/loggedInUser"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "code": 403, "message": "principal has no access"
        })))
        .mount(&server)
        .await;

    let profile_called = Arc::new(AtomicBool::new(false));
    let steps = check_steps(catalog_client(&server).await, profile_called.clone());
    let summary = ConnectionTestRunner::new().run(steps).await;

    assert!(summary.success);
    assert!(profile_called.load(Ordering::SeqCst));
    let profile = summary.result("profile").unwrap();
    assert_eq!(profile.status, TestStatus::Failed);
    assert_eq!(
        profile.error_message.as_deref(),
        Some("API error 403: principal has no access")
    );
    assert_eq!(
        summary.result("reachable").unwrap().description.as_deref(),
        Some("Catalog API answers")
    );
}

#[tokio::test]
async fn definition_from_catalog_drives_the_run() {
    let definition: TestConnectionDefinition = serde_json::from_str(
        r#"{
            "name": "Salesforce",
            "steps": [
                {"name": "CheckAccess", "description": "Describe the org", "mandatory": true},
                {"name": "GetTables", "mandatory": true},
                {"name": "GetViews", "mandatory": false}
            ]
        }"#,
    )
    .unwrap();

    let views_called = Arc::new(AtomicBool::new(false));
    let flag = views_called.clone();
    let mut test_fns: HashMap<String, StepFn> = HashMap::new();
    test_fns.insert(
        "CheckAccess".into(),
        step_fn(|| async { Ok::<(), String>(()) }),
    );
    test_fns.insert(
        "GetTables".into(),
        step_fn(|| async { Err::<(), _>("INVALID_SESSION_ID".to_string()) }),
    );
    test_fns.insert(
        "GetViews".into(),
        step_fn(move || async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<(), String>(())
        }),
    );

    let summary = ConnectionTestRunner::new()
        .run_definition(&definition, test_fns)
        .await;

    assert!(!summary.success);
    assert_eq!(summary.status_of("CheckAccess"), Some(TestStatus::Passed));
    assert_eq!(summary.status_of("GetTables"), Some(TestStatus::Failed));
    assert_eq!(summary.status_of("GetViews"), Some(TestStatus::Skipped));
    assert!(!views_called.load(Ordering::SeqCst));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["results"][2]["status"], "skipped");
}

#[tokio::test]
async fn results_keep_step_order() {
    let names = ["a", "b", "c", "d"];
    let steps = names
        .iter()
        .map(|name| TestStep::new(*name, || async { Ok::<(), String>(()) }))
        .collect();
    let summary = ConnectionTestRunner::new().run(steps).await;

    let reported: Vec<&str> = summary.results.iter().map(|r| r.step_name.as_str()).collect();
    assert_eq!(reported, names);
    assert!(summary.success);
}
