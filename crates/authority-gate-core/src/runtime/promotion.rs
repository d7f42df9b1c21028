// crates/authority-gate-core/src/runtime/promotion.rs
// ============================================================================
// Module: Authority Gate Promotion Checker
// Description: PROMOTE step verifying that a verdict licenses an intent.
// Purpose: Defeat replayed and stale verdicts before execution hand-off.
// Dependencies: subtle, crate::core
// ============================================================================

//! ## Overview
//! Promotion is the last structural check before an action is handed off for
//! execution. A verdict promotes an intent only when it is an approval, it
//! was computed for *exactly* this intent (hash equality, compared in
//! constant time), and it is still fresh. A verdict approving intent A never
//! authorizes intent B, and an old approval cannot be replayed after the
//! freshness window closes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use subtle::ConstantTimeEq;
use time::Duration;

use crate::core::ActionIntent;
use crate::core::Decision;
use crate::core::HashDigest;
use crate::core::Timestamp;
use crate::core::Verdict;

// ============================================================================
// SECTION: Promotion
// ============================================================================

/// Checks whether a verdict licenses an intent at the given instant.
///
/// True iff the verdict approves, its `intent_hash` equals the intent's
/// hash, and `now - verdict.timestamp` does not exceed `max_age`.
#[must_use]
pub fn promote(
    intent: &ActionIntent,
    verdict: &Verdict,
    now: Timestamp,
    max_age: Duration,
) -> bool {
    let authorized = verdict.decision == Decision::Approve;
    let hash_match = digests_match(&verdict.intent_hash, &intent.intent_hash);
    let fresh = now.since(verdict.timestamp) <= max_age;
    authorized && hash_match && fresh
}

/// Compares two digests without leaking the mismatch position.
fn digests_match(a: &HashDigest, b: &HashDigest) -> bool {
    a.algorithm == b.algorithm && bool::from(a.value.as_bytes().ct_eq(b.value.as_bytes()))
}
