// crates/authority-gate-core/src/core/verdict.rs
// ============================================================================
// Module: Authority Gate Verdicts
// Description: Hash-bound policy decisions for single intents.
// Purpose: Make every decision tamper-evident and bound to exactly one intent.
// Dependencies: serde, crate::core::{hashing, policy, time}
// ============================================================================

//! ## Overview
//! A [`Verdict`] records the outcome of evaluating one intent against one
//! policy at one instant. It carries a copy of the intent's hash — binding
//! the decision to exactly that intent — and its own `verdict_hash` over the
//! decision-relevant fields, which makes the verdict itself usable as a
//! ledger-chain input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::policy::Decision;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Outcome of policy evaluation for one intent.
///
/// # Invariants
/// - `intent_hash` is a copy of the evaluated intent's hash.
/// - `verdict_hash` always equals the canonical hash of
///   `{decision, intent_hash, rule_matched, timestamp}`.
/// - Produced fresh by every evaluation; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Governance decision.
    pub decision: Decision,
    /// Hash of the intent this verdict authorizes or refuses.
    pub intent_hash: HashDigest,
    /// Name of the rule responsible, or a reserved sentinel.
    pub rule_matched: String,
    /// Human-readable justification.
    pub reason: String,
    /// Evaluation timestamp.
    pub timestamp: Timestamp,
    /// Canonical hash over the decision-relevant fields.
    pub verdict_hash: HashDigest,
}

impl Verdict {
    /// Builds a verdict and computes its binding hash.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the hashed view cannot be canonicalized.
    pub fn new(
        decision: Decision,
        intent_hash: HashDigest,
        rule_matched: impl Into<String>,
        reason: impl Into<String>,
        timestamp: Timestamp,
    ) -> Result<Self, HashError> {
        let rule_matched = rule_matched.into();
        let verdict_hash = compute_verdict_hash(decision, &intent_hash, &rule_matched, &timestamp)?;
        Ok(Self {
            decision,
            intent_hash,
            rule_matched,
            reason: reason.into(),
            timestamp,
            verdict_hash,
        })
    }

    /// Recomputes the verdict hash from the verdict's own fields.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the hashed view cannot be canonicalized.
    pub fn compute_hash(&self) -> Result<HashDigest, HashError> {
        compute_verdict_hash(self.decision, &self.intent_hash, &self.rule_matched, &self.timestamp)
    }
}

// ============================================================================
// SECTION: Verdict Hash
// ============================================================================

/// Hashed view of a verdict, excluding the hash field and free-text reason.
#[derive(Serialize)]
struct VerdictHashView<'a> {
    /// Governance decision.
    decision: Decision,
    /// Hash of the evaluated intent.
    intent_hash: &'a HashDigest,
    /// Rule name or sentinel responsible for the decision.
    rule_matched: &'a str,
    /// Evaluation timestamp.
    timestamp: &'a Timestamp,
}

/// Computes the canonical verdict hash.
///
/// # Errors
///
/// Returns [`HashError`] when the view cannot be canonicalized.
pub fn compute_verdict_hash(
    decision: Decision,
    intent_hash: &HashDigest,
    rule_matched: &str,
    timestamp: &Timestamp,
) -> Result<HashDigest, HashError> {
    let view = VerdictHashView {
        decision,
        intent_hash,
        rule_matched,
        timestamp,
    };
    hash_canonical_json(DEFAULT_HASH_ALGORITHM, &view)
}
