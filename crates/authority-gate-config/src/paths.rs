// crates/authority-gate-config/src/paths.rs
// ============================================================================
// Module: Authority Gate Default Paths
// Description: Default policy and ledger locations under the user's home.
// Purpose: Resolve governance file paths consistently across commands.
// Dependencies: directories
// ============================================================================

//! ## Overview
//! Governance state lives under `<home>/.openclaw/governance/` by default:
//! `policy.yaml` for the active policy and `witness.jsonl` for the audit
//! ledger. Callers may override both paths explicitly; these helpers only
//! supply the defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory under the home directory holding governance state.
const GOVERNANCE_DIR: &str = ".openclaw/governance";

/// Default policy document filename.
const POLICY_FILENAME: &str = "policy.yaml";

/// Default witness ledger filename.
const WITNESS_FILENAME: &str = "witness.jsonl";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Path resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,
}

// ============================================================================
// SECTION: Default Paths
// ============================================================================

/// Returns the default governance state directory.
///
/// # Errors
///
/// Returns [`PathError::NoHomeDir`] when no home directory is available.
pub fn default_governance_dir() -> Result<PathBuf, PathError> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(GOVERNANCE_DIR))
        .ok_or(PathError::NoHomeDir)
}

/// Returns the default policy document path.
///
/// # Errors
///
/// Returns [`PathError::NoHomeDir`] when no home directory is available.
pub fn default_policy_path() -> Result<PathBuf, PathError> {
    Ok(default_governance_dir()?.join(POLICY_FILENAME))
}

/// Returns the default witness ledger path.
///
/// # Errors
///
/// Returns [`PathError::NoHomeDir`] when no home directory is available.
pub fn default_witness_path() -> Result<PathBuf, PathError> {
    Ok(default_governance_dir()?.join(WITNESS_FILENAME))
}
