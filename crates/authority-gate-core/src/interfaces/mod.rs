// crates/authority-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Authority Gate Interfaces
// Description: Backend-agnostic interfaces for policy sources and ledgers.
// Purpose: Define the contract surfaces used by the governance pipeline.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the pipeline integrates with storage without
//! embedding backend details. Implementations must be deterministic given
//! their inputs and fail closed on missing or invalid data: an unavailable
//! policy becomes a deny-everything policy at the caller, never an approval
//! by omission.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::ActionIntent;
use crate::core::ExecutionStatus;
use crate::core::IntentId;
use crate::core::PolicyFile;
use crate::core::Timestamp;
use crate::core::Verdict;
use crate::core::WitnessRecord;

// ============================================================================
// SECTION: Policy Source
// ============================================================================

/// Policy source errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PolicySourceError {
    /// Policy could not be read from its backing store.
    #[error("policy unavailable: {0}")]
    Unavailable(String),
    /// Policy was read but failed parsing or validation.
    #[error("policy invalid: {0}")]
    Invalid(String),
}

/// Source of the active policy document.
///
/// Loaded fresh on every decision so that policy edits take effect without a
/// restart; callers substitute [`PolicyFile::fail_closed`] on any error.
pub trait PolicySource {
    /// Loads the current policy document.
    ///
    /// # Errors
    ///
    /// Returns [`PolicySourceError`] when the policy cannot be read or is
    /// not structurally valid.
    fn load(&self) -> Result<PolicyFile, PolicySourceError>;
}

// ============================================================================
// SECTION: Witness Ledger
// ============================================================================

/// Witness ledger errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Ledger I/O error.
    #[error("witness ledger io error: {0}")]
    Io(String),
    /// Ledger data is corrupted or fails integrity checks.
    #[error("witness ledger corruption: {0}")]
    Corrupt(String),
    /// Record serialization failed.
    #[error("witness record serialization error: {0}")]
    Serialize(String),
}

/// Append-only, hash-chained witness ledger.
///
/// Implementations own sequence assignment and chain linking; callers only
/// supply the intent, verdict, and outcome status. Appends must be durable
/// before returning — a silently dropped append breaks the audit guarantee.
pub trait WitnessLedger {
    /// Appends one record and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when hashing, serialization, or the durable
    /// write fails. Append failures must propagate to the caller.
    fn append(
        &mut self,
        intent: &ActionIntent,
        verdict: &Verdict,
        status: ExecutionStatus,
        at: Timestamp,
    ) -> Result<WitnessRecord, LedgerError>;

    /// Returns all records in chain order.
    fn records(&self) -> &[WitnessRecord];

    /// Returns the most recent record for the given intent id, if any.
    ///
    /// Later records shadow earlier ones, so a resolved escalation reports
    /// its resolution status rather than `escalated`.
    fn latest_for_intent(&self, intent_id: &IntentId) -> Option<&WitnessRecord> {
        self.records().iter().rev().find(|record| &record.intent.id == intent_id)
    }

    /// Returns the trailing `count` records in chain order.
    fn last(&self, count: usize) -> &[WitnessRecord] {
        let records = self.records();
        let start = records.len().saturating_sub(count);
        &records[start ..]
    }

    /// Returns the most recent record, if any.
    fn latest(&self) -> Option<&WitnessRecord> {
        self.records().last()
    }
}
