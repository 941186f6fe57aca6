// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::db;
use billfold::services::orchestrator::{execute_queries, OrchestratorRequest};
use billfold::services::spending::{insert_spending, ConsultRequest, SpendingDraft, SpendingFilter};
use rusqlite::Connection;

const USER: &str = "u1";

fn setup() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    insert_spending(
        &mut conn,
        USER,
        SpendingDraft {
            description: Some("coffee".to_string()),
            value: Some(5.0),
            kind: Some("SPENDING".to_string()),
            category: Some("FOOD".to_string()),
            date: Some("2025-06-10".to_string()),
            ..SpendingDraft::default()
        },
    )
    .unwrap();
    conn
}

#[test]
fn fans_out_to_each_named_source() {
    let conn = setup();
    let request = OrchestratorRequest {
        sources: vec!["spendings".to_string(), "profile_config".to_string()],
        consult: Some(ConsultRequest::Sum {
            filter: SpendingFilter::default(),
        }),
    };
    let result = execute_queries(&conn, USER, &request).unwrap();
    assert_eq!(result.len(), 2);

    let spendings = result["spendings"].as_array().unwrap();
    assert_eq!(spendings.len(), 1);
    assert_eq!(spendings[0]["category"], "FOOD");

    let config = &result["profile_config"];
    assert_eq!(config["budgetStrategy"], "50-30-20");
    assert_eq!(config["userId"], USER);
}

#[test]
fn unknown_sources_are_ignored_not_rejected() {
    let conn = setup();
    let request = OrchestratorRequest {
        sources: vec![
            "spendings".to_string(),
            "forecast".to_string(),
            "weather".to_string(),
        ],
        consult: None,
    };
    let result = execute_queries(&conn, USER, &request).unwrap();
    assert_eq!(result.len(), 1);
    assert!(result.contains_key("spendings"));
}

#[test]
fn empty_request_yields_empty_result() {
    let conn = setup();
    let request = OrchestratorRequest {
        sources: Vec::new(),
        consult: None,
    };
    let result = execute_queries(&conn, USER, &request).unwrap();
    assert!(result.is_empty());
}

#[test]
fn consult_request_deserializes_from_tagged_json() {
    let conn = setup();
    let request: OrchestratorRequest = serde_json::from_str(
        r#"{
            "sources": ["spendings"],
            "consult": {"op": "CATEGORY", "type": "SPENDING"}
        }"#,
    )
    .unwrap();
    let result = execute_queries(&conn, USER, &request).unwrap();
    let groups = result["spendings"].as_array().unwrap();
    assert_eq!(groups[0]["label"], "FOOD");
    assert_eq!(groups[0]["value"], 5.0);
}
