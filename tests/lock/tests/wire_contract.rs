//! Wire contract lock: exact JSON for the demo "house" problem.
//!
//! Field order is part of the contract: `status`, `solution`, `steps`; each
//! step is `type`, `node`, `color`, then `current_state` when requested.
//! `solution` keys follow the graph's key order.

use serde_json::{json, Value};

use chroma_service::config::ServerConfig;
use chroma_service::contract::SolveRequestV1;
use chroma_service::fixtures::{self, DEFAULT_COLORS};
use chroma_service::runner::run_solve;

const R: &str = DEFAULT_COLORS[0];
const B: &str = DEFAULT_COLORS[1];
const G: &str = DEFAULT_COLORS[2];

fn house_request(include_state: bool) -> SolveRequestV1 {
    SolveRequestV1 {
        adjacency: fixtures::house(),
        colors: fixtures::default_palette(3),
        include_state,
    }
}

fn step(kind: &str, node: &str, color: Option<&str>) -> Value {
    json!({"type": kind, "node": node, "color": color})
}

#[test]
fn house_three_colors_golden() {
    let response = run_solve(&house_request(false), &ServerConfig::default()).unwrap();
    let value = serde_json::to_value(&response).unwrap();

    let expected_steps = vec![
        step("try", "0", Some(R)),
        step("assign", "0", Some(R)),
        step("try", "1", Some(R)),
        step("try", "1", Some(B)),
        step("assign", "1", Some(B)),
        step("try", "2", Some(R)),
        step("try", "2", Some(B)),
        step("try", "2", Some(G)),
        step("assign", "2", Some(G)),
        step("try", "3", Some(R)),
        step("assign", "3", Some(R)),
        step("try", "4", Some(R)),
        step("try", "4", Some(B)),
        step("try", "4", Some(G)),
        step("backtrack", "3", None),
        step("try", "3", Some(B)),
        step("try", "3", Some(G)),
        step("assign", "3", Some(G)),
        step("try", "4", Some(R)),
        step("assign", "4", Some(R)),
    ];
    assert_eq!(
        value,
        json!({
            "status": "solved",
            "solution": {"0": R, "1": B, "2": G, "3": G, "4": R},
            "steps": expected_steps,
        })
    );
}

#[test]
fn field_order_is_stable() {
    let response = run_solve(&house_request(true), &ServerConfig::default()).unwrap();
    let text = serde_json::to_string(&response).unwrap();
    assert!(text.starts_with(r#"{"status":"solved","solution":{"0":"#));
    let solution_start = text.find(r#""solution":"#).unwrap();
    let steps_start = text.find(r#""steps":"#).unwrap();
    assert!(solution_start < steps_start);
    assert!(text.contains(&format!(
        r#"{{"type":"try","node":"0","color":"{R}","current_state":{{}}}}"#
    )));
    assert!(text.contains(r#"{"type":"backtrack","node":"3","color":null,"current_state":{"0":"#));
    let solution = &text[solution_start..steps_start];
    let positions: Vec<usize> = ["\"0\"", "\"1\"", "\"2\"", "\"3\"", "\"4\""]
        .iter()
        .map(|k| solution.find(k).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn impossible_has_null_solution() {
    let request = SolveRequestV1 {
        adjacency: fixtures::k4(),
        colors: fixtures::default_palette(3),
        include_state: false,
    };
    let response = run_solve(&request, &ServerConfig::default()).unwrap();
    let value = serde_json::to_value(response).unwrap();
    assert_eq!(value["status"], "impossible");
    assert_eq!(value["solution"], Value::Null);
    assert!(value["steps"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s.get("current_state").is_none()));
}

#[test]
fn request_accepts_the_demo_payload() {
    let payload = json!({
        "adjacency": {
            "0": ["1", "2"],
            "1": ["0", "2", "3", "4"],
            "2": ["0", "1", "4"],
            "3": ["1", "4"],
            "4": ["2", "3", "1"],
        },
        "colors": ["#EF4444", "#3B82F6", "#10B981"],
    });
    let request: SolveRequestV1 = serde_json::from_value(payload).unwrap();
    assert!(!request.include_state);
    assert_eq!(request.adjacency, fixtures::house());
}
