// crates/authority-gate-core/tests/promotion.rs
// ============================================================================
// Module: Promotion Checker Tests
// Description: Tests for the PROMOTE step.
// Purpose: Validate replay and staleness defenses with injected timestamps.
// Dependencies: authority-gate-core, time
// ============================================================================
//! ## Overview
//! Ensures promotion requires an approval for exactly this intent inside the
//! freshness window. Both timestamps are injected so the checks stay
//! deterministic.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use authority_gate_core::ActionIntent;
use authority_gate_core::ActionType;
use authority_gate_core::Decision;
use authority_gate_core::IntentDraft;
use authority_gate_core::Timestamp;
use authority_gate_core::Verdict;
use authority_gate_core::create_intent;
use authority_gate_core::promote;
use serde_json::Map;
use time::Duration;

/// Fixed timestamp for deterministic hashes.
fn fixed_now() -> Timestamp {
    Timestamp::parse_rfc3339("2026-01-01T00:00:00Z").expect("valid timestamp")
}

/// Builds an intent targeting the given path.
fn intent_for(target: &str) -> ActionIntent {
    create_intent(
        IntentDraft {
            skill: "test".to_string(),
            tool: "bash".to_string(),
            model: "claude".to_string(),
            action_type: ActionType::Read,
            target: target.to_string(),
            parameters: Map::new(),
            data_scope: Vec::new(),
            conversation_id: "c1".to_string(),
            message_id: "m1".to_string(),
            user_instruction: "read".to_string(),
        },
        fixed_now(),
    )
    .expect("create intent")
}

/// Builds an approval verdict for the given intent at the given instant.
fn approval_for(intent: &ActionIntent, at: Timestamp) -> Verdict {
    Verdict::new(
        Decision::Approve,
        intent.intent_hash.clone(),
        "test-rule",
        "test",
        at,
    )
    .expect("build verdict")
}

#[test]
fn fresh_matching_approval_promotes() {
    let intent = intent_for("./safe.txt");
    let verdict = approval_for(&intent, fixed_now());
    assert!(promote(&intent, &verdict, fixed_now(), Duration::seconds(30)));
}

#[test]
fn deny_verdict_never_promotes() {
    let intent = intent_for("./safe.txt");
    let verdict = Verdict::new(
        Decision::Deny,
        intent.intent_hash.clone(),
        "test-rule",
        "test",
        fixed_now(),
    )
    .expect("build verdict");
    assert!(!promote(&intent, &verdict, fixed_now(), Duration::seconds(30)));
}

#[test]
fn escalate_verdict_never_promotes() {
    let intent = intent_for("./safe.txt");
    let verdict = Verdict::new(
        Decision::Escalate,
        intent.intent_hash.clone(),
        "test-rule",
        "test",
        fixed_now(),
    )
    .expect("build verdict");
    assert!(!promote(&intent, &verdict, fixed_now(), Duration::seconds(30)));
}

#[test]
fn verdict_for_another_intent_is_replay_rejected() {
    let safe = intent_for("./safe.txt");
    let hostile = intent_for("/etc/passwd");

    let verdict = approval_for(&safe, fixed_now());
    assert!(promote(&safe, &verdict, fixed_now(), Duration::seconds(30)), "original promotes");
    assert!(
        !promote(&hostile, &verdict, fixed_now(), Duration::seconds(30)),
        "replay against a different intent must fail"
    );
}

#[test]
fn stale_verdict_is_rejected() {
    let intent = intent_for("./safe.txt");
    let verdict = approval_for(&intent, fixed_now());

    let later = fixed_now().shifted(Duration::seconds(60));
    assert!(!promote(&intent, &verdict, later, Duration::seconds(30)));
}

#[test]
fn verdict_at_the_age_boundary_still_promotes() {
    let intent = intent_for("./safe.txt");
    let verdict = approval_for(&intent, fixed_now());

    let boundary = fixed_now().shifted(Duration::seconds(30));
    assert!(promote(&intent, &verdict, boundary, Duration::seconds(30)));

    let past = fixed_now().shifted(Duration::seconds(31));
    assert!(!promote(&intent, &verdict, past, Duration::seconds(30)));
}
