// crates/authority-gate-store-jsonl/src/store.rs
// ============================================================================
// Module: Authority Gate JSONL Witness Ledger
// Description: Append-only witness ledger persisted as JSON lines.
// Purpose: Provide the durable production backend for the witness chain.
// Dependencies: authority-gate-core, serde_json, std::fs
// ============================================================================

//! ## Overview
//! One [`WitnessRecord`] per UTF-8 JSON line, newline-terminated. The ledger
//! assumes a single writer process appending sequentially; concurrent
//! multi-process writers are unsupported and would require external locking.
//!
//! Crash recovery is deliberately asymmetric: an append can only be
//! interrupted at the very end of the file, so a malformed trailing line is
//! truncated away on open, while a malformed line anywhere earlier cannot be
//! explained by a crash and is reported as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use authority_gate_core::ActionIntent;
use authority_gate_core::ExecutionResult;
use authority_gate_core::ExecutionStatus;
use authority_gate_core::IntentId;
use authority_gate_core::LedgerError;
use authority_gate_core::Timestamp;
use authority_gate_core::Verdict;
use authority_gate_core::WitnessLedger;
use authority_gate_core::WitnessRecord;
use authority_gate_core::genesis_hash;

// ============================================================================
// SECTION: JSONL Ledger
// ============================================================================

/// Durable witness ledger backed by a JSONL file.
///
/// # Invariants
/// - The in-memory record vector mirrors the file contents in chain order.
/// - Appends are durably written (flushed and synced) before returning.
/// - Single-writer: no cross-process locking is performed.
#[derive(Debug)]
pub struct JsonlWitnessLedger {
    /// Backing file path.
    path: PathBuf,
    /// Records in chain order.
    records: Vec<WitnessRecord>,
    /// Index of the latest record per intent id.
    latest_by_intent: HashMap<String, usize>,
    /// True when the file's last line is missing its newline terminator.
    needs_newline: bool,
}

impl JsonlWitnessLedger {
    /// Opens the ledger at `path`, creating an empty file when missing.
    ///
    /// A malformed trailing line is truncated away as partial-write
    /// recovery; a malformed line anywhere earlier fails the load.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the file cannot be read or created,
    /// or [`LedgerError::Corrupt`] when a non-trailing line is malformed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| LedgerError::Io(err.to_string()))?;
        }

        if !path.exists() {
            fs::File::create(&path).map_err(|err| LedgerError::Io(err.to_string()))?;
            return Ok(Self {
                path,
                records: Vec::new(),
                latest_by_intent: HashMap::new(),
                needs_newline: false,
            });
        }

        let content = fs::read_to_string(&path).map_err(|err| LedgerError::Io(err.to_string()))?;
        let (records, recovered_at) = parse_lines(&content)?;

        let needs_newline = if let Some(keep_bytes) = recovered_at {
            truncate_file(&path, keep_bytes)?;
            false
        } else {
            !content.is_empty() && !content.ends_with('\n')
        };

        let latest_by_intent = build_intent_index(&records);
        Ok(Self {
            path,
            records,
            latest_by_intent,
            needs_newline,
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one serialized record line durably to the backing file.
    ///
    /// The record and its newline terminator go out in a single buffer so a
    /// crash can only leave a malformed tail, which open-time recovery
    /// truncates away.
    fn write_line(&mut self, line: &str) -> Result<(), LedgerError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|err| LedgerError::Io(err.to_string()))?;
        let buffer = if self.needs_newline {
            format!("\n{line}\n")
        } else {
            format!("{line}\n")
        };
        file.write_all(buffer.as_bytes()).map_err(|err| LedgerError::Io(err.to_string()))?;
        file.sync_data().map_err(|err| LedgerError::Io(err.to_string()))?;
        self.needs_newline = false;
        Ok(())
    }
}

impl WitnessLedger for JsonlWitnessLedger {
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

        let line = serde_json::to_string(&record)
            .map_err(|err| LedgerError::Serialize(err.to_string()))?;
        self.write_line(&line)?;

        self.latest_by_intent.insert(record.intent.id.to_string(), self.records.len());
        self.records.push(record.clone());
        Ok(record)
    }

    fn records(&self) -> &[WitnessRecord] {
        &self.records
    }

    fn latest_for_intent(&self, intent_id: &IntentId) -> Option<&WitnessRecord> {
        self.latest_by_intent.get(intent_id.as_str()).and_then(|index| self.records.get(*index))
    }
}

// ============================================================================
// SECTION: Load Helpers
// ============================================================================

/// Parses ledger lines, returning records plus an optional recovery offset.
///
/// The offset is the byte length of the valid prefix when the trailing line
/// is malformed and must be truncated away.
fn parse_lines(content: &str) -> Result<(Vec<WitnessRecord>, Option<u64>), LedgerError> {
    let mut records = Vec::new();
    let mut offset = 0usize;

    let lines: Vec<&str> = content.lines().collect();
    for (index, line) in lines.iter().enumerate() {
        match serde_json::from_str::<WitnessRecord>(line) {
            Ok(record) => {
                offset += line.len() + 1;
                records.push(record);
            }
            Err(err) => {
                if index + 1 == lines.len() {
                    // Partial write from a crashed append; drop the tail.
                    return Ok((records, Some(offset as u64)));
                }
                return Err(LedgerError::Corrupt(format!(
                    "malformed record at line {}: {err}",
                    index + 1
                )));
            }
        }
    }

    Ok((records, None))
}

/// Truncates the ledger file to the given byte length.
fn truncate_file(path: &Path, keep_bytes: u64) -> Result<(), LedgerError> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|err| LedgerError::Io(err.to_string()))?;
    file.set_len(keep_bytes).map_err(|err| LedgerError::Io(err.to_string()))?;
    file.sync_data().map_err(|err| LedgerError::Io(err.to_string()))?;
    Ok(())
}

/// Builds the latest-record index keyed by intent id.
fn build_intent_index(records: &[WitnessRecord]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        index.insert(record.intent.id.to_string(), position);
    }
    index
}
