// crates/authority-gate-store-jsonl/tests/ledger.rs
// ============================================================================
// Module: JSONL Ledger Tests
// Description: Tests for the durable witness ledger.
// Purpose: Validate persistence, reopen behavior, and crash recovery rules.
// Dependencies: authority-gate-core, authority-gate-store-jsonl, tempfile
// ============================================================================
//! ## Overview
//! Exercises the JSONL backend: appends survive reopen with the chain
//! intact, a malformed trailing line is recovered, and corruption anywhere
//! earlier fails the load.

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

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use authority_gate_core::ActionIntent;
use authority_gate_core::ActionType;
use authority_gate_core::Decision;
use authority_gate_core::ExecutionStatus;
use authority_gate_core::IntentDraft;
use authority_gate_core::LedgerError;
use authority_gate_core::Timestamp;
use authority_gate_core::Verdict;
use authority_gate_core::WitnessLedger;
use authority_gate_core::create_intent;
use authority_gate_core::verify_chain;
use authority_gate_store_jsonl::JsonlWitnessLedger;

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
            parameters: serde_json::Map::new(),
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

/// Appends `count` executed records to the ledger at `path`.
fn append_records(path: &Path, count: usize) {
    let mut ledger = JsonlWitnessLedger::open(path).expect("open");
    for index in 0 .. count {
        let intent = intent_for(&format!("./file{index}.txt"));
        let verdict = approval_for(&intent);
        ledger
            .append(&intent, &verdict, ExecutionStatus::Executed, fixed_now())
            .expect("append");
    }
}

#[test]
fn open_creates_a_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested/governance/witness.jsonl");

    let ledger = JsonlWitnessLedger::open(&path).expect("open");
    assert!(path.exists(), "open must create the file");
    assert!(ledger.records().is_empty());
}

#[test]
fn appends_survive_reopen_with_the_chain_intact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("witness.jsonl");
    append_records(&path, 5);

    let reopened = JsonlWitnessLedger::open(&path).expect("reopen");
    assert_eq!(reopened.records().len(), 5);
    assert!(verify_chain(reopened.records()).valid);
    assert_eq!(reopened.records()[4].sequence, 4);
}

#[test]
fn each_append_writes_one_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("witness.jsonl");
    append_records(&path, 3);

    let content = fs::read_to_string(&path).expect("read");
    assert_eq!(content.lines().count(), 3);
    assert!(content.ends_with('\n'), "lines are newline-terminated");
}

#[test]
fn malformed_trailing_line_is_recovered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("witness.jsonl");
    append_records(&path, 3);

    // Simulate a crash mid-append.
    let mut file = OpenOptions::new().append(true).open(&path).expect("open file");
    file.write_all(b"{\"sequence\":3,\"intent\":{\"truncat").expect("write tail");
    drop(file);

    let mut ledger = JsonlWitnessLedger::open(&path).expect("open recovers");
    assert_eq!(ledger.records().len(), 3, "partial tail is dropped");

    // The next append continues the chain cleanly.
    let intent = intent_for("./after-recovery.txt");
    let verdict = approval_for(&intent);
    ledger.append(&intent, &verdict, ExecutionStatus::Executed, fixed_now()).expect("append");

    let reopened = JsonlWitnessLedger::open(&path).expect("reopen");
    assert_eq!(reopened.records().len(), 4);
    assert!(verify_chain(reopened.records()).valid);
}

#[test]
fn malformed_middle_line_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("witness.jsonl");
    append_records(&path, 3);

    let content = fs::read_to_string(&path).expect("read");
    let mut lines: Vec<&str> = content.lines().collect();
    lines[1] = "not json at all";
    fs::write(&path, format!("{}\n", lines.join("\n"))).expect("rewrite");

    let err = JsonlWitnessLedger::open(&path).expect_err("must fail");
    assert!(matches!(err, LedgerError::Corrupt(_)));
    assert!(err.to_string().contains("line 2"), "error names the offending line: {err}");
}

#[test]
fn corrupted_record_is_caught_by_chain_verification() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("witness.jsonl");
    append_records(&path, 4);

    // Flip one recorded outcome in place; the line stays valid JSON.
    let content = fs::read_to_string(&path).expect("read");
    let tampered = content.replacen("\"executed\"", "\"blocked\"", 1);
    assert_ne!(content, tampered, "tampering must change the file");
    fs::write(&path, tampered).expect("rewrite");

    let ledger = JsonlWitnessLedger::open(&path).expect("open");
    let report = verify_chain(ledger.records());
    assert!(!report.valid);
    assert_eq!(report.broken_at, Some(0));
}

#[test]
fn latest_for_intent_tracks_resolution_appends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("witness.jsonl");

    let mut ledger = JsonlWitnessLedger::open(&path).expect("open");
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
    ledger.append(&intent, &verdict, ExecutionStatus::UserDenied, fixed_now()).expect("append");

    let latest = ledger.latest_for_intent(&intent.id).expect("latest");
    assert_eq!(latest.execution_result.status, ExecutionStatus::UserDenied);
    assert_eq!(latest.sequence, 1);

    let reopened = JsonlWitnessLedger::open(&path).expect("reopen");
    let latest = reopened.latest_for_intent(&intent.id).expect("latest after reopen");
    assert_eq!(latest.execution_result.status, ExecutionStatus::UserDenied);
}

#[test]
fn unterminated_valid_tail_does_not_corrupt_the_next_append() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("witness.jsonl");
    append_records(&path, 2);

    // Strip the final newline, as if the terminator write never landed.
    let content = fs::read_to_string(&path).expect("read");
    fs::write(&path, content.trim_end_matches('\n')).expect("rewrite");

    let mut ledger = JsonlWitnessLedger::open(&path).expect("open");
    assert_eq!(ledger.records().len(), 2);

    let intent = intent_for("./appended.txt");
    let verdict = approval_for(&intent);
    ledger.append(&intent, &verdict, ExecutionStatus::Executed, fixed_now()).expect("append");

    let reopened = JsonlWitnessLedger::open(&path).expect("reopen");
    assert_eq!(reopened.records().len(), 3, "records must stay line-separated");
    assert!(verify_chain(reopened.records()).valid);
}
