// crates/authority-gate-store-jsonl/src/lib.rs
// ============================================================================
// Module: Authority Gate JSONL Store Library
// Description: Durable JSONL-backed witness ledger.
// Purpose: Persist the hash-chained audit trail one record per line.
// Dependencies: authority-gate-core, serde_json
// ============================================================================

//! ## Overview
//! The JSONL store persists witness records as newline-terminated JSON
//! lines, append-only. On open the full chain is rebuilt in memory; appends
//! write one durable line before returning. A malformed *trailing* line is
//! treated as a crashed partial append and recovered by truncation; a
//! malformed line anywhere earlier is corruption and fails the load.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::JsonlWitnessLedger;
