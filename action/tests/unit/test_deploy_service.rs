//! Deploy requests against a local CES

use axum::http::StatusCode;
use url::Url;

use ispw_deploy::authn::{AuthMode, CERTIFICATE_HEADER, HOST_HEADER, PORT_HEADER};
use ispw_deploy::deploy::invoker::{submit_deploy, DeployReply, DeployServiceExt};
use ispw_deploy::deploy::params::DeployParms;
use ispw_deploy::deploy::request::{assemble_request_url, deploy_task_path, DeployRequestBody};
use ispw_deploy::deploy::response::NO_RESPONSE_MESSAGE;
use ispw_deploy::deploy::set_state::SetState;
use ispw_deploy::errors::DeployError;
use ispw_deploy::http::client::HttpClient;
use ispw_deploy::outputs::{MemoryOutputs, OUTPUT_SET_ID, OUTPUT_URL};

use crate::fake_ces::{FakeCes, SRID};

fn token_client() -> HttpClient {
    let auth = AuthMode::select(Some("ces-token-1"), None, SRID).unwrap();
    HttpClient::new(&auth).unwrap()
}

fn deploy_url(ces: &FakeCes) -> Url {
    let parms = DeployParms::from_inputs(Some("PLAY000001"), Some("DEV1"), Some("t1,t2"));
    assemble_request_url(&ces.base_url, &deploy_task_path(SRID, &parms)).unwrap()
}

fn body() -> DeployRequestBody {
    DeployRequestBody::assemble(None, Some("S"), Some("I"), Some(""), None)
}

#[tokio::test]
async fn test_deploy_accepted() {
    let ces = FakeCes::start().await;
    ces.reply_with_set("S000241246");
    let outputs = MemoryOutputs::new();

    let response = submit_deploy(&token_client(), &outputs, &deploy_url(&ces), &body())
        .await
        .unwrap();

    assert_eq!(response.set_id.as_deref(), Some("S000241246"));
    assert_eq!(outputs.get(OUTPUT_SET_ID).as_deref(), Some("S000241246"));
    assert_eq!(outputs.get(OUTPUT_URL), Some(ces.set_url("S000241246")));

    let requests = ces.deploy_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].uri,
        "/ispw/cw09-47623/assignments/PLAY000001/taskIds/deploy?taskId=t1&taskId=t2&level=DEV1"
    );
    assert_eq!(requests[0].header("authorization").as_deref(), Some("ces-token-1"));
    assert_eq!(
        requests[0].header("content-type").as_deref(),
        Some("application/json")
    );
    let sent: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(
        sent,
        serde_json::json!({"changeType": "S", "executionStatus": "I"})
    );
}

#[tokio::test]
async fn test_deploy_accepted_without_body() {
    let ces = FakeCes::start().await;
    ces.reply_raw(StatusCode::OK, "application/json", String::new());
    let outputs = MemoryOutputs::new();

    let err = submit_deploy(&token_client(), &outputs, &deploy_url(&ces), &body())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::DeployFailure(_)));
    assert_eq!(err.to_string(), NO_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn test_deploy_accepted_with_text_body() {
    let ces = FakeCes::start().await;
    ces.reply_raw(StatusCode::OK, "text/plain", "Deploy accepted".to_string());
    let outputs = MemoryOutputs::new();

    let response = submit_deploy(&token_client(), &outputs, &deploy_url(&ces), &body())
        .await
        .unwrap();

    assert_eq!(response.raw, serde_json::json!("Deploy accepted"));
    assert!(response.set_location().is_none());
    assert!(outputs.is_empty());
}

#[tokio::test]
async fn test_deploy_rejected_with_unexpected_field_types() {
    let ces = FakeCes::start().await;
    ces.reply_json(
        StatusCode::BAD_REQUEST,
        serde_json::json!({"setId": "S9", "message": ["bad", "level"]}),
    );
    let outputs = MemoryOutputs::new();

    let err = submit_deploy(&token_client(), &outputs, &deploy_url(&ces), &body())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::DeployFailure(_)));
    assert_eq!(err.to_string(), "The deploy request failed with status 400.");
    assert_eq!(outputs.get(OUTPUT_SET_ID).as_deref(), Some("S9"));
}

#[tokio::test]
async fn test_deploy_rejected_with_json_body() {
    let ces = FakeCes::start().await;
    ces.reply_json(
        StatusCode::BAD_REQUEST,
        serde_json::json!({"setId": "S000241247", "message": "Task t2 is checked out by another user"}),
    );
    let outputs = MemoryOutputs::new();

    let err = submit_deploy(&token_client(), &outputs, &deploy_url(&ces), &body())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::DeployFailure(_)));
    assert_eq!(err.to_string(), "Task t2 is checked out by another user");
    assert_eq!(outputs.get(OUTPUT_SET_ID).as_deref(), Some("S000241247"));
    assert!(outputs.get(OUTPUT_URL).is_none());
}

#[tokio::test]
async fn test_deploy_error_without_structured_body() {
    let ces = FakeCes::start().await;
    ces.reply_raw(
        StatusCode::BAD_GATEWAY,
        "text/html",
        "<html>Bad Gateway</html>".to_string(),
    );

    let reply = token_client()
        .post_deploy(&deploy_url(&ces), &body())
        .await;

    assert!(matches!(reply, Err(DeployError::Transport(_))));
}

#[tokio::test]
async fn test_deploy_reply_classification() {
    let ces = FakeCes::start().await;
    ces.reply_json(StatusCode::UNAUTHORIZED, serde_json::json!({"message": "bad token"}));

    let reply = token_client()
        .post_deploy(&deploy_url(&ces), &body())
        .await
        .unwrap();

    match reply {
        DeployReply::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body.message.as_deref(), Some("bad token"));
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test]
async fn test_deploy_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!(
        "http://{}/ispw/{}/assignments/A/taskIds/deploy?taskId=t1&level=DEV1",
        addr, SRID
    ))
    .unwrap();
    let outputs = MemoryOutputs::new();

    let err = submit_deploy(&token_client(), &outputs, &url, &body())
        .await
        .unwrap_err();

    match &err {
        DeployError::Http(source) => assert_eq!(err.to_string(), source.to_string()),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!err.is_recoverable());
    assert!(outputs.is_empty());
}

#[tokio::test]
async fn test_certificate_auth_headers() {
    let ces = FakeCes::start().await;
    ces.reply_with_set("S000241246");
    let auth = AuthMode::select(None, Some("MIIBCERT"), SRID).unwrap();
    let client = HttpClient::new(&auth).unwrap();

    submit_deploy(&client, &MemoryOutputs::new(), &deploy_url(&ces), &body())
        .await
        .unwrap();

    let request = &ces.deploy_requests()[0];
    assert!(request.header("authorization").is_none());
    assert_eq!(request.header(CERTIFICATE_HEADER).as_deref(), Some("MIIBCERT"));
    assert_eq!(request.header(HOST_HEADER).as_deref(), Some("cw09"));
    assert_eq!(request.header(PORT_HEADER).as_deref(), Some("47623"));
}

#[tokio::test]
async fn test_set_status_request() {
    let ces = FakeCes::start().await;
    ces.push_states(&["Waiting-Lock"]);

    let status = token_client()
        .get_set_status(&ces.set_url("S000241246"))
        .await
        .unwrap();

    assert_eq!(status.state, SetState::WaitingLock);
    let request = &ces.status_requests()[0];
    assert_eq!(request.uri, "/ispw/cw09-47623/sets/S000241246");
    assert_eq!(request.header("authorization").as_deref(), Some("ces-token-1"));
}
