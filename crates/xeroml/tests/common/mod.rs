//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::MockServer;
use xeroml::XeroMlClient;

pub const API_KEY: &str = "test_key";

/// A client pointed at the mock server.
pub fn client(server: &MockServer) -> XeroMlClient {
    XeroMlClient::builder()
        .api_key(API_KEY)
        .base_url(server.uri())
        .build()
        .expect("client should build")
}

pub fn graph_json() -> Value {
    json!({
        "schema_version": "1.0",
        "root_goal": "book a flight",
        "sub_goals": [{
            "id": "sg_1",
            "goal": "pick dates",
            "status": "active",
            "priority": 1,
            "success_criteria": ["dates confirmed"],
            "constraints": ["under $500"],
            "uncertainty": 0.3,
            "context_requirements": [],
            "modality": "text",
            "dependencies": [],
            "children": [{
                "id": "sg_1_1",
                "goal": "check calendar",
                "status": "pending",
                "priority": 2,
                "success_criteria": [],
                "constraints": [],
                "uncertainty": 0.1,
                "context_requirements": ["calendar access"],
                "modality": "text",
                "dependencies": ["sg_1"],
                "children": []
            }]
        }],
        "meta": {
            "source": "openai",
            "confidence": 0.95,
            "negotiation_history": [],
            "latent_states": {
                "goal_intent": "book_flight",
                "action_readiness": "deciding",
                "ambiguity_level": "clear",
                "risk_sensitivity": "low",
                "intent_scope": "single"
            }
        }
    })
}

pub fn usage_json() -> Value {
    json!({
        "credits": {"used": 10, "total": 1000, "remaining": 990},
        "tier": "free",
        "rate_limit": 60,
        "usage": [{"month": "2026-02", "parse_calls": 10, "drift_checks": 2, "session_creates": 3}]
    })
}

pub fn session_info_json(id: &str) -> Value {
    json!({"session_id": id, "status": "active", "created_at": "2026-02-01T00:00:00Z"})
}

pub fn error_json(code: &str, message: &str) -> Value {
    json!({"error": {"code": code, "message": message, "request_id": "req_err"}})
}
