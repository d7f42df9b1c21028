// crates/authority-gate-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Authority Gate Policy Evaluator
// Description: Deterministic DECIDE step over intents and policies.
// Purpose: Produce hash-bound verdicts with no I/O, clock reads, or model calls.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! [`evaluate`] is a pure function from `(intent, policy, now)` to a
//! [`Verdict`]. Evaluation order is fixed: sensitive-data rules first (they
//! can downgrade an otherwise-approved action and can never be overridden),
//! then ordinary rules first-match-wins in file order, then the policy's
//! default verdict. Identical inputs always produce the identical
//! `verdict_hash`.
//!
//! Fail-closed behavior for *missing or broken* policies belongs to the
//! caller: the pipeline substitutes a deny-everything policy when loading
//! fails and converts any evaluation failure into an [`RULE_ERROR`] deny.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ActionIntent;
use crate::core::Decision;
use crate::core::HashError;
use crate::core::PolicyFile;
use crate::core::Timestamp;
use crate::core::Verdict;

// ============================================================================
// SECTION: Reserved Rule Names
// ============================================================================

/// Sentinel rule name for the default-verdict path.
pub const RULE_DEFAULT: &str = "__default__";

/// Sentinel rule name for the fail-closed evaluation-error path.
pub const RULE_ERROR: &str = "__error__";

/// Prefix of sentinel rule names for sensitive-data matches.
pub const SENSITIVE_RULE_PREFIX: &str = "__sensitive_data__:";

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates one intent against one policy at one instant.
///
/// # Errors
///
/// Returns [`HashError`] only when the verdict hash cannot be computed; rule
/// matching itself cannot fail.
pub fn evaluate(
    intent: &ActionIntent,
    policy: &PolicyFile,
    now: Timestamp,
) -> Result<Verdict, HashError> {
    if let Some(rule) = policy.first_sensitive_match(intent) {
        return Verdict::new(
            rule.action.as_decision(),
            intent.intent_hash.clone(),
            format!("{SENSITIVE_RULE_PREFIX}{}", rule.category),
            format!("Sensitive data category '{}' matched", rule.category),
            now,
        );
    }

    if let Some(rule) = policy.first_rule_match(intent) {
        let reason = rule
            .reason
            .clone()
            .unwrap_or_else(|| format!("Matched rule '{}'", rule.name));
        return Verdict::new(rule.verdict, intent.intent_hash.clone(), rule.name.clone(), reason, now);
    }

    Verdict::new(
        policy.default_verdict.as_decision(),
        intent.intent_hash.clone(),
        RULE_DEFAULT,
        "No rule matched; default verdict applied",
        now,
    )
}

/// Builds the fail-closed verdict for an evaluation failure.
///
/// # Errors
///
/// Returns [`HashError`] when even the error verdict cannot be hashed.
pub fn error_verdict(intent: &ActionIntent, now: Timestamp) -> Result<Verdict, HashError> {
    Verdict::new(
        Decision::Deny,
        intent.intent_hash.clone(),
        RULE_ERROR,
        "Internal error during policy evaluation; fail-closed deny",
        now,
    )
}
