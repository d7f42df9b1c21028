// crates/authority-gate-core/tests/witness.rs
// ============================================================================
// Module: Witness Chain Tests
// Description: Tests for witness record hashing and chain verification.
// Purpose: Validate that any single corruption is detected at its exact index.
// Dependencies: authority-gate-core, serde_json
// ============================================================================
//! ## Overview
//! Builds chains through the in-memory ledger and verifies genesis linking,
//! append-only sequencing, and exact break-point reporting for corrupted
//! records.

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
use authority_gate_core::ExecutionStatus;
use authority_gate_core::HashAlgorithm;
use authority_gate_core::HashDigest;
use authority_gate_core::InMemoryWitnessLedger;
use authority_gate_core::IntentDraft;
use authority_gate_core::Timestamp;
use authority_gate_core::Verdict;
use authority_gate_core::WitnessLedger;
use authority_gate_core::WitnessRecord;
use authority_gate_core::create_intent;
use authority_gate_core::genesis_hash;
use authority_gate_core::verify_chain;
use serde_json::Map;

/// Fixed timestamp for deterministic hashes.
fn fixed_now() -> Timestamp {
    Timestamp::parse_rfc3339("2026-01-01T00:00:00Z").expect("valid timestamp")
}

/// Builds an intent targeting the given path.
fn intent_for(target: &str) -> ActionIntent {
    create_intent(
        IntentDraft {
            skill: "test".to_string(),
            tool: "read".to_string(),
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

/// Builds an approval verdict for the given intent.
fn approval_for(intent: &ActionIntent) -> Verdict {
    Verdict::new(
        Decision::Approve,
        intent.intent_hash.clone(),
        "allow-reads",
        "reads permitted",
        fixed_now(),
    )
    .expect("build verdict")
}

/// Appends `count` executed records to a fresh in-memory ledger.
fn chain_of(count: usize) -> InMemoryWitnessLedger {
    let mut ledger = InMemoryWitnessLedger::new();
    for index in 0 .. count {
        let intent = intent_for(&format!("./file{index}.txt"));
        let verdict = approval_for(&intent);
        ledger
            .append(&intent, &verdict, ExecutionStatus::Executed, fixed_now())
            .expect("append");
    }
    ledger
}

#[test]
fn empty_chain_is_valid() {
    let report = verify_chain(&[]);
    assert!(report.valid);
    assert_eq!(report.broken_at, None);
}

#[test]
fn appended_chain_verifies_end_to_end() {
    let ledger = chain_of(10);
    let report = verify_chain(ledger.records());
    assert!(report.valid, "10-record chain must verify: {report:?}");
}

#[test]
fn first_record_links_to_genesis() {
    let ledger = chain_of(1);
    let first = &ledger.records()[0];
    assert_eq!(first.sequence, 0);
    assert_eq!(first.prev_hash, genesis_hash());
}

#[test]
fn records_link_in_sequence() {
    let ledger = chain_of(3);
    let records = ledger.records();
    assert!(records[1].follows(&records[0]));
    assert!(records[2].follows(&records[1]));
    assert!(!records[2].follows(&records[0]));
}

#[test]
fn corrupted_record_hash_is_reported_at_its_exact_index() {
    for corrupt_index in [0usize, 2, 4] {
        let ledger = chain_of(5);
        let mut records: Vec<WitnessRecord> = ledger.records().to_vec();
        records[corrupt_index].record_hash =
            HashDigest::new(HashAlgorithm::Sha256, &[0u8; 32]);

        let report = verify_chain(&records);
        assert!(!report.valid);
        assert_eq!(report.broken_at, Some(corrupt_index as u64), "break index must be exact");
    }
}

#[test]
fn tampered_payload_is_reported_at_its_exact_index() {
    let ledger = chain_of(5);
    let mut records: Vec<WitnessRecord> = ledger.records().to_vec();
    // Rewrite history: flip record 2's recorded outcome.
    records[2].execution_result.status = ExecutionStatus::Blocked;

    let report = verify_chain(&records);
    assert!(!report.valid);
    assert_eq!(report.broken_at, Some(2));
}

#[test]
fn broken_link_is_reported_at_its_exact_index() {
    let ledger = chain_of(4);
    let mut records: Vec<WitnessRecord> = ledger.records().to_vec();
    records[3].prev_hash = genesis_hash();

    let report = verify_chain(&records);
    assert!(!report.valid);
    assert_eq!(report.broken_at, Some(3));
}

#[test]
fn truncated_middle_breaks_the_chain() {
    let ledger = chain_of(4);
    let mut records: Vec<WitnessRecord> = ledger.records().to_vec();
    records.remove(1);

    let report = verify_chain(&records);
    assert!(!report.valid);
    assert_eq!(report.broken_at, Some(1));
}

#[test]
fn escalation_resolution_is_a_second_append() {
    let mut ledger = InMemoryWitnessLedger::new();
    let intent = intent_for("https://api.example.com");
    let verdict = Verdict::new(
        Decision::Escalate,
        intent.intent_hash.clone(),
        "escalate-network",
        "network requires approval",
        fixed_now(),
    )
    .expect("build verdict");

    ledger.append(&intent, &verdict, ExecutionStatus::Escalated, fixed_now()).expect("append");
    ledger.append(&intent, &verdict, ExecutionStatus::UserApproved, fixed_now()).expect("append");

    assert_eq!(ledger.records().len(), 2, "resolution must not mutate the original record");
    assert_eq!(ledger.records()[0].execution_result.status, ExecutionStatus::Escalated);
    assert_eq!(ledger.records()[1].execution_result.status, ExecutionStatus::UserApproved);
    assert_eq!(
        ledger.latest_for_intent(&intent.id).expect("latest").execution_result.status,
        ExecutionStatus::UserApproved,
        "latest record shadows the escalation"
    );
    assert!(verify_chain(ledger.records()).valid);
}

#[test]
fn last_returns_the_trailing_records() {
    let ledger = chain_of(5);
    let tail = ledger.last(2);
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].sequence, 3);
    assert_eq!(tail[1].sequence, 4);
    assert_eq!(ledger.last(50).len(), 5, "oversized windows clamp to the full chain");
}
