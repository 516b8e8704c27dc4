//! Session endpoints against a mock service.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xeroml::{Error, ParseOptions, UpdateOptions};

use common::{client, error_json, graph_json, API_KEY};

#[tokio::test]
async fn test_session_parse() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/sess_1/parse"))
        .and(header("X-API-Key", API_KEY))
        .and(body_json(json!({"message": "book a flight", "provider": "anthropic"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "graph": graph_json(),
            "session_id": "sess_1",
            "turn_number": 2,
            "request_id": "r1",
            "latency_ms": 120
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server).session("sess_1");
    let response = session
        .parse_detailed("book a flight", ParseOptions::provider("anthropic"))
        .await
        .unwrap();

    assert_eq!(response.turn_number, 2);
    assert_eq!(response.session_id, "sess_1");
    assert_eq!(response.graph.root_goal, "book a flight");
}

#[tokio::test]
async fn test_session_update_with_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/sess_1/update"))
        .and(body_json(json!({"message": "Here are some flights", "role": "assistant"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "session_id": "sess_1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .session("sess_1")
        .update("Here are some flights", UpdateOptions::role("assistant"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_session_update_omits_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/sess_1/update"))
        .and(body_json(json!({"message": "ok"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "session_id": "sess_1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .session("sess_1")
        .update("ok", UpdateOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_check_drift() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions/sess_1/drift"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "detected": true,
            "drift_type": "goal_shift",
            "severity": 0.7,
            "description": "User moved from flights to hotels.",
            "previous_goal": "book a flight",
            "current_goal": "book a hotel"
        })))
        .mount(&server)
        .await;

    let drift = client(&server).session("sess_1").check_drift().await.unwrap();

    assert!(drift.detected);
    assert_eq!(drift.drift_type.as_deref(), Some("goal_shift"));
    assert_eq!(drift.current_goal.as_deref(), Some("book a hotel"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_check_drift_none_detected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions/sess_1/drift"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "detected": false,
            "drift_type": null,
            "severity": 0.0,
            "description": "No drift.",
            "previous_goal": null,
            "current_goal": null
        })))
        .mount(&server)
        .await;

    let drift = client(&server).session("sess_1").check_drift().await.unwrap();
    assert!(!drift.detected);
    assert!(drift.drift_type.is_none());
}

#[tokio::test]
async fn test_get_graph() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions/sess_1/graph"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "graph": graph_json(),
            "session_id": "sess_1",
            "turn_count": 1
        })))
        .mount(&server)
        .await;

    let graph = client(&server).session("sess_1").get_graph().await.unwrap();
    assert_eq!(graph.unwrap().root_goal, "book a flight");
}

#[tokio::test]
async fn test_get_graph_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions/sess_1/graph"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "graph": null,
            "session_id": "sess_1",
            "turn_count": 0
        })))
        .mount(&server)
        .await;

    let session = client(&server).session("sess_1");
    assert!(session.get_graph().await.unwrap().is_none());

    let snapshot = session.graph_snapshot().await.unwrap();
    assert_eq!(snapshot.turn_count, 0);
}

#[tokio::test]
async fn test_get_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions/sess_1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "sess_1",
            "status": "active",
            "turn_count": 2,
            "current_graph": graph_json(),
            "graphs": [{
                "turn_number": 1,
                "graph": graph_json(),
                "root_goal": "book a flight",
                "confidence": 0.95,
                "sub_goal_count": 2,
                "provider": "openai",
                "latency_ms": 300,
                "created_at": "2026-02-01T00:00:00Z"
            }],
            "drift_events": [{
                "turn_number": 2,
                "drift_type": "refinement",
                "severity": 0.2,
                "description": "Added a budget.",
                "previous_goal": "book a flight",
                "current_goal": "book a cheap flight",
                "created_at": "2026-02-01T00:05:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let history = client(&server).session("sess_1").get_history().await.unwrap();

    assert_eq!(history.turn_count, 2);
    assert_eq!(history.graphs.len(), 1);
    assert_eq!(history.graphs[0].provider, "openai");
    assert_eq!(history.drift_events[0].drift_type, "refinement");
    assert!(history.current_graph.is_some());
}

#[tokio::test]
async fn test_end_sends_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/sess_1/end"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ended", "session_id": "sess_1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    client(&server).session("sess_1").end().await.unwrap();
}

#[tokio::test]
async fn test_parse_on_ended_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/sess_1/parse"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(error_json("session_ended", "Session already ended.")),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .session("sess_1")
        .parse("hello", ParseOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SessionEnded(_)));
}

#[tokio::test]
async fn test_unknown_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions/missing/drift"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client(&server).session("missing").check_drift().await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.code(), Some("session_not_found"));
}
