// crates/authority-gate-core/src/core/witness.rs
// ============================================================================
// Module: Authority Gate Witness Records
// Description: Hash-chained audit records of decisions and outcomes.
// Purpose: Make retroactive tampering with the audit trail detectable.
// Dependencies: serde, crate::core::{hashing, intent, time, verdict}
// ============================================================================

//! ## Overview
//! Every governance decision and its eventual execution outcome is recorded
//! as a [`WitnessRecord`]. Records form a hash chain: each carries the
//! `record_hash` of its predecessor (or the genesis constant at sequence 0)
//! plus its own hash over the decision-relevant fields. Breaking either link
//! anywhere invalidates the entire suffix of the chain from that point on,
//! and [`verify_chain`] reports the exact break index.
//!
//! The ledger is strictly append-only. Escalations resolve by appending a
//! second record with the same intent and verdict under a new status, never
//! by mutating history.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_bytes;
use crate::core::hashing::hash_canonical_json;
use crate::core::intent::ActionIntent;
use crate::core::time::Timestamp;
use crate::core::verdict::Verdict;

// ============================================================================
// SECTION: Genesis
// ============================================================================

/// Fixed seed string hashed into the chain's genesis link.
pub const GENESIS_SEED: &str = "authority-gate:genesis";

/// Returns the fixed genesis hash used as `prev_hash` at sequence 0.
#[must_use]
pub fn genesis_hash() -> HashDigest {
    hash_bytes(DEFAULT_HASH_ALGORITHM, GENESIS_SEED.as_bytes())
}

// ============================================================================
// SECTION: Execution Outcomes
// ============================================================================

/// Terminal-state machine for an intent's execution outcome.
///
/// Legal transitions: `escalated` resolves to `user_approved` or
/// `user_denied`; `executed` and `blocked` are terminal immediately.
///
/// # Invariants
/// - Variants are stable for serialization and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Action was promoted and handed off for execution.
    Executed,
    /// Action was refused.
    Blocked,
    /// Action awaits a human decision.
    Escalated,
    /// Human approved an escalated action.
    UserApproved,
    /// Human denied an escalated action (or the escalation timed out).
    UserDenied,
}

impl ExecutionStatus {
    /// Returns the wire form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Executed => "executed",
            Self::Blocked => "blocked",
            Self::Escalated => "escalated",
            Self::UserApproved => "user_approved",
            Self::UserDenied => "user_denied",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution outcome recorded alongside a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Outcome status.
    pub status: ExecutionStatus,
    /// When the outcome was recorded.
    pub timestamp: Timestamp,
}

// ============================================================================
// SECTION: Witness Record
// ============================================================================

/// One row of the append-only audit ledger.
///
/// # Invariants
/// - `sequence` is 0-based and strictly increasing, one per append.
/// - `prev_hash` equals the previous record's `record_hash`, or the genesis
///   constant at sequence 0.
/// - `record_hash` always equals the canonical hash of
///   `{sequence, intent_hash, verdict_hash, execution_result, prev_hash}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitnessRecord {
    /// 0-based position in the ledger.
    pub sequence: u64,
    /// The governed intent.
    pub intent: ActionIntent,
    /// The verdict rendered for the intent.
    pub verdict: Verdict,
    /// The execution outcome.
    pub execution_result: ExecutionResult,
    /// Hash of the previous record, or the genesis constant.
    pub prev_hash: HashDigest,
    /// Canonical hash over this record's chain-relevant fields.
    pub record_hash: HashDigest,
}

impl WitnessRecord {
    /// Builds a record at the given chain position and computes its hash.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the hashed view cannot be canonicalized.
    pub fn build(
        sequence: u64,
        prev_hash: HashDigest,
        intent: ActionIntent,
        verdict: Verdict,
        execution_result: ExecutionResult,
    ) -> Result<Self, HashError> {
        let record_hash = compute_record_hash(
            sequence,
            &intent.intent_hash,
            &verdict.verdict_hash,
            &execution_result,
            &prev_hash,
        )?;
        Ok(Self {
            sequence,
            intent,
            verdict,
            execution_result,
            prev_hash,
            record_hash,
        })
    }

    /// Recomputes the record hash from the record's own fields.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the hashed view cannot be canonicalized.
    pub fn compute_hash(&self) -> Result<HashDigest, HashError> {
        compute_record_hash(
            self.sequence,
            &self.intent.intent_hash,
            &self.verdict.verdict_hash,
            &self.execution_result,
            &self.prev_hash,
        )
    }

    /// Returns true when this record chains directly after `previous`.
    #[must_use]
    pub fn follows(&self, previous: &Self) -> bool {
        self.prev_hash == previous.record_hash
    }
}

// ============================================================================
// SECTION: Record Hash
// ============================================================================

/// Hashed view of a witness record's chain-relevant fields.
#[derive(Serialize)]
struct RecordHashView<'a> {
    /// 0-based chain position.
    sequence: u64,
    /// Hash of the governed intent.
    intent_hash: &'a HashDigest,
    /// Hash of the rendered verdict.
    verdict_hash: &'a HashDigest,
    /// Execution outcome.
    execution_result: &'a ExecutionResult,
    /// Hash of the previous record or genesis.
    prev_hash: &'a HashDigest,
}

/// Computes the canonical record hash.
///
/// # Errors
///
/// Returns [`HashError`] when the view cannot be canonicalized.
pub fn compute_record_hash(
    sequence: u64,
    intent_hash: &HashDigest,
    verdict_hash: &HashDigest,
    execution_result: &ExecutionResult,
    prev_hash: &HashDigest,
) -> Result<HashDigest, HashError> {
    let view = RecordHashView {
        sequence,
        intent_hash,
        verdict_hash,
        execution_result,
        prev_hash,
    };
    hash_canonical_json(DEFAULT_HASH_ALGORITHM, &view)
}

// ============================================================================
// SECTION: Chain Verification
// ============================================================================

/// Result of walking the chain and recomputing every link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReport {
    /// True when every link and record hash checks out.
    pub valid: bool,
    /// Index of the first broken record, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_at: Option<u64>,
    /// Description of the first failure, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ChainReport {
    /// Report for a fully valid chain (including the empty chain).
    #[must_use]
    pub const fn intact() -> Self {
        Self {
            valid: true,
            broken_at: None,
            reason: None,
        }
    }

    /// Report for a chain broken at the given index.
    #[must_use]
    pub fn broken(index: u64, reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            broken_at: Some(index),
            reason: Some(reason.into()),
        }
    }
}

/// Verifies the full hash chain, reporting the exact first break.
///
/// For every record the expected `prev_hash` (genesis or the prior record's
/// hash) and the recomputed `record_hash` are both checked; the first index
/// where either disagrees is reported. An empty chain is valid.
#[must_use]
pub fn verify_chain(records: &[WitnessRecord]) -> ChainReport {
    let mut expected_prev = genesis_hash();
    for (index, record) in records.iter().enumerate() {
        let index = index as u64;
        if record.sequence != index {
            return ChainReport::broken(
                index,
                format!("sequence {} does not match position {index}", record.sequence),
            );
        }
        if record.prev_hash != expected_prev {
            return ChainReport::broken(index, "prev_hash does not match previous record");
        }
        match record.compute_hash() {
            Ok(computed) if computed == record.record_hash => {}
            Ok(_) => {
                return ChainReport::broken(index, "record_hash does not match record content");
            }
            Err(err) => {
                return ChainReport::broken(index, format!("record could not be rehashed: {err}"));
            }
        }
        expected_prev = record.record_hash.clone();
    }
    ChainReport::intact()
}
