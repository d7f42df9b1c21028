// crates/authority-gate-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Authority Gate Pipeline Engine
// Description: PROPOSE → DECIDE → PROMOTE → WITNESS orchestration.
// Purpose: Provide the single canonical execution path for governance checks.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The pipeline engine composes the four governance phases over pluggable
//! policy-source and ledger backends. It is the only component that touches
//! storage, and it owns the fail-closed posture: an unloadable policy
//! becomes a deny-everything policy, and an evaluation failure becomes an
//! `__error__` deny — never an approval by omission.
//!
//! The policy is re-read on every decision. That is the hot-reload
//! mechanism, not an inefficiency to optimize away.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;
use time::Duration;

use crate::core::ActionIntent;
use crate::core::ChainReport;
use crate::core::Decision;
use crate::core::ExecutionStatus;
use crate::core::HashError;
use crate::core::IntentId;
use crate::core::PolicyFile;
use crate::core::ProposeError;
use crate::core::Timestamp;
use crate::core::Verdict;
use crate::core::WitnessRecord;
use crate::core::propose;
use crate::core::verify_chain;
use crate::interfaces::LedgerError;
use crate::interfaces::PolicySource;
use crate::interfaces::WitnessLedger;
use crate::runtime::evaluator::error_verdict;
use crate::runtime::evaluator::evaluate;
use crate::runtime::promotion::promote;

// ============================================================================
// SECTION: Pipeline Configuration
// ============================================================================

/// Default freshness window for verdicts, in seconds.
pub const DEFAULT_MAX_VERDICT_AGE_SECS: i64 = 30;

/// Default timeout for unresolved escalations, in seconds.
pub const DEFAULT_ESCALATION_TIMEOUT_SECS: i64 = 300;

/// Default number of records returned by the audit operation.
pub const DEFAULT_AUDIT_LIMIT: usize = 50;

/// Configuration for the governance pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum age a verdict may have and still promote.
    pub max_verdict_age: Duration,
    /// Age past which an unresolved escalation is force-denied.
    pub escalation_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_verdict_age: Duration::seconds(DEFAULT_MAX_VERDICT_AGE_SECS),
            escalation_timeout: Duration::seconds(DEFAULT_ESCALATION_TIMEOUT_SECS),
        }
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Outcome of one full pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// The proposed (and validated) intent.
    pub intent: ActionIntent,
    /// The verdict rendered for the intent.
    pub verdict: Verdict,
    /// Whether the verdict promoted the intent for execution.
    pub promoted: bool,
    /// The witness record appended for this run.
    pub record: WitnessRecord,
}

/// Chain verification outcome with the total record count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainVerification {
    /// Link-by-link verification report.
    pub report: ChainReport,
    /// Total number of records walked.
    pub total_records: u64,
}

/// Human decision applied to an escalated intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionDecision {
    /// Approve the escalated action.
    Approve,
    /// Deny the escalated action.
    Deny,
}

impl fmt::Display for ResolutionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("approve"),
            Self::Deny => f.write_str("deny"),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline execution errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// PROPOSE rejected the raw input.
    #[error(transparent)]
    Propose(#[from] ProposeError),
    /// Hashing failed while building a verdict.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// Witness ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// No witness record exists for the given intent id.
    #[error("no witness record found for intent {0}")]
    EscalationNotFound(String),
    /// The intent's latest record is not in the escalated state.
    #[error("intent {id} is not in escalated state (status: {status})")]
    NotEscalated {
        /// Intent identifier.
        id: String,
        /// Status actually found.
        status: ExecutionStatus,
    },
}

// ============================================================================
// SECTION: Governance Plane
// ============================================================================

/// Governance pipeline engine over pluggable backends.
pub struct GovernancePlane<S, L> {
    /// Policy source, re-read on every decision.
    policy: S,
    /// Witness ledger receiving every decision.
    ledger: L,
    /// Pipeline configuration.
    config: PipelineConfig,
}

impl<S, L> GovernancePlane<S, L>
where
    S: PolicySource,
    L: WitnessLedger,
{
    /// Creates a new governance plane.
    pub const fn new(policy: S, ledger: L, config: PipelineConfig) -> Self {
        Self {
            policy,
            ledger,
            config,
        }
    }

    /// Returns the pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the underlying ledger.
    #[must_use]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// DECIDE: evaluates an intent against the freshly loaded policy.
    ///
    /// Fail-closed on both failure modes: an unloadable policy is replaced
    /// by [`PolicyFile::fail_closed`], and an evaluation failure is replaced
    /// by the `__error__` deny verdict.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] only when even the fail-closed verdict cannot
    /// be hashed.
    pub fn decide(&self, intent: &ActionIntent, now: Timestamp) -> Result<Verdict, HashError> {
        let policy = self.policy.load().unwrap_or_else(|_| PolicyFile::fail_closed());
        match evaluate(intent, &policy, now) {
            Ok(verdict) => Ok(verdict),
            Err(_) => error_verdict(intent, now),
        }
    }

    /// Runs the full PROPOSE → DECIDE → PROMOTE → WITNESS pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when the input is not a valid intent, when
    /// hashing fails, or when the witness append fails.
    pub fn run(
        &mut self,
        raw: &serde_json::Value,
        now: Timestamp,
    ) -> Result<PipelineOutcome, PipelineError> {
        let intent = propose(raw, now)?;
        let verdict = self.decide(&intent, now)?;
        let promoted = promote(&intent, &verdict, now, self.config.max_verdict_age);

        let status = if verdict.decision == Decision::Escalate {
            ExecutionStatus::Escalated
        } else if promoted {
            ExecutionStatus::Executed
        } else {
            ExecutionStatus::Blocked
        };

        let record = self.ledger.append(&intent, &verdict, status, now)?;
        Ok(PipelineOutcome {
            intent,
            verdict,
            promoted,
            record,
        })
    }

    /// Resolves a pending escalation with a human decision.
    ///
    /// Resolution is a second append under the new status; the original
    /// escalation record is never touched. A resolution arriving after the
    /// escalation timeout is recorded as `user_denied` regardless of the
    /// requested decision.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EscalationNotFound`] when no record exists
    /// for the intent, [`PipelineError::NotEscalated`] when its latest
    /// record is not awaiting resolution, or a ledger error on append.
    pub fn resolve_escalation(
        &mut self,
        intent_id: &IntentId,
        decision: ResolutionDecision,
        now: Timestamp,
    ) -> Result<WitnessRecord, PipelineError> {
        let existing = self
            .ledger
            .latest_for_intent(intent_id)
            .cloned()
            .ok_or_else(|| PipelineError::EscalationNotFound(intent_id.to_string()))?;

        if existing.execution_result.status != ExecutionStatus::Escalated {
            return Err(PipelineError::NotEscalated {
                id: intent_id.to_string(),
                status: existing.execution_result.status,
            });
        }

        let elapsed = now.since(existing.execution_result.timestamp);
        let status = if elapsed > self.config.escalation_timeout {
            ExecutionStatus::UserDenied
        } else {
            match decision {
                ResolutionDecision::Approve => ExecutionStatus::UserApproved,
                ResolutionDecision::Deny => ExecutionStatus::UserDenied,
            }
        };

        Ok(self.ledger.append(&existing.intent, &existing.verdict, status, now)?)
    }

    /// Returns the trailing `last` witness records.
    #[must_use]
    pub fn audit(&self, last: usize) -> &[WitnessRecord] {
        self.ledger.last(last)
    }

    /// Verifies the full witness chain.
    #[must_use]
    pub fn verify(&self) -> ChainVerification {
        let records = self.ledger.records();
        ChainVerification {
            report: verify_chain(records),
            total_records: records.len() as u64,
        }
    }
}
