// crates/authority-gate-core/src/runtime/memory.rs
// ============================================================================
// Module: Authority Gate In-Memory Backends
// Description: In-memory ledger and static policy source for tests and examples.
// Purpose: Provide deterministic backends without external dependencies.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides simple in-memory implementations of
//! [`WitnessLedger`] and [`PolicySource`] for tests and local demos. They
//! preserve every chain invariant but persist nothing; production callers
//! use the JSONL store crate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ActionIntent;
use crate::core::ExecutionResult;
use crate::core::ExecutionStatus;
use crate::core::PolicyFile;
use crate::core::Timestamp;
use crate::core::Verdict;
use crate::core::WitnessRecord;
use crate::core::genesis_hash;
use crate::interfaces::LedgerError;
use crate::interfaces::PolicySource;
use crate::interfaces::PolicySourceError;
use crate::interfaces::WitnessLedger;

// ============================================================================
// SECTION: In-Memory Ledger
// ============================================================================

/// In-memory witness ledger for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWitnessLedger {
    /// Records in chain order.
    records: Vec<WitnessRecord>,
}

impl InMemoryWitnessLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl WitnessLedger for InMemoryWitnessLedger {
    fn append(
        &mut self,
        intent: &ActionIntent,
        verdict: &Verdict,
        status: ExecutionStatus,
        at: Timestamp,
    ) -> Result<WitnessRecord, LedgerError> {
        let sequence = self.records.len() as u64;
        let prev_hash = self
            .records
            .last()
            .map_or_else(genesis_hash, |record| record.record_hash.clone());
        let record = WitnessRecord::build(
            sequence,
            prev_hash,
            intent.clone(),
            verdict.clone(),
            ExecutionResult {
                status,
                timestamp: at,
            },
        )
        .map_err(|err| LedgerError::Serialize(err.to_string()))?;
        self.records.push(record.clone());
        Ok(record)
    }

    fn records(&self) -> &[WitnessRecord] {
        &self.records
    }
}

// ============================================================================
// SECTION: Static Policy Source
// ============================================================================

/// Policy source returning a fixed in-memory policy.
#[derive(Debug, Clone)]
pub struct StaticPolicySource {
    /// The policy returned by every load.
    policy: PolicyFile,
}

impl StaticPolicySource {
    /// Wraps a fixed policy document.
    #[must_use]
    pub const fn new(policy: PolicyFile) -> Self {
        Self {
            policy,
        }
    }
}

impl PolicySource for StaticPolicySource {
    fn load(&self) -> Result<PolicyFile, PolicySourceError> {
        Ok(self.policy.clone())
    }
}
