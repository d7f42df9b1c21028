// crates/authority-gate-config/src/policy.rs
// ============================================================================
// Module: Authority Gate Policy Loading
// Description: Strict YAML policy parsing and fail-closed file source.
// Purpose: Load policy.yaml without ever surfacing a half-valid policy.
// Dependencies: authority-gate-core, serde_yaml
// ============================================================================

//! ## Overview
//! Policy documents are YAML, parsed with `serde_yaml` into the core
//! [`PolicyFile`] model and then structurally validated. YAML already
//! rejects tabs in indentation; the validation pass rejects empty versions
//! and unnamed rules. Any failure is reported as one typed error — callers
//! never see a partially parsed policy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use authority_gate_core::PolicyFile;
use authority_gate_core::PolicySource;
use authority_gate_core::PolicySourceError;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum policy file size in bytes.
pub const MAX_POLICY_FILE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Policy loading errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PolicyLoadError {
    /// Policy file is missing or unreadable.
    #[error("policy file unreadable: {0}")]
    Unreadable(String),
    /// Policy file exceeds the size limit.
    #[error("policy file too large: {actual} bytes (max {limit})")]
    TooLarge {
        /// Maximum allowed bytes.
        limit: usize,
        /// Actual file size in bytes.
        actual: usize,
    },
    /// Policy document failed YAML parsing.
    #[error("policy parse error: {0}")]
    Parse(String),
    /// Policy document parsed but failed structural validation.
    #[error("policy validation error: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Parsing and Loading
// ============================================================================

/// Parses and validates a policy document from YAML text.
///
/// # Errors
///
/// Returns [`PolicyLoadError::Parse`] on malformed YAML or enum values
/// outside the policy vocabulary, and [`PolicyLoadError::Invalid`] when the
/// parsed document violates structural invariants.
pub fn parse_policy(content: &str) -> Result<PolicyFile, PolicyLoadError> {
    let policy: PolicyFile =
        serde_yaml::from_str(content).map_err(|err| PolicyLoadError::Parse(err.to_string()))?;
    policy.validate().map_err(|errors| {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        PolicyLoadError::Invalid(joined)
    })?;
    Ok(policy)
}

/// Loads and validates a policy document from disk.
///
/// # Errors
///
/// Returns [`PolicyLoadError`] when the file is unreadable, oversized,
/// malformed, or structurally invalid.
pub fn load_policy_file(path: &Path) -> Result<PolicyFile, PolicyLoadError> {
    let content =
        fs::read_to_string(path).map_err(|err| PolicyLoadError::Unreadable(err.to_string()))?;
    if content.len() > MAX_POLICY_FILE_BYTES {
        return Err(PolicyLoadError::TooLarge {
            limit: MAX_POLICY_FILE_BYTES,
            actual: content.len(),
        });
    }
    parse_policy(&content)
}

// ============================================================================
// SECTION: File Policy Source
// ============================================================================

/// Policy source backed by a YAML file on disk.
///
/// The file is re-read on every load, which is what makes live policy edits
/// take effect without restarting the process.
#[derive(Debug, Clone)]
pub struct FilePolicySource {
    /// Path to the policy document.
    path: PathBuf,
}

impl FilePolicySource {
    /// Creates a policy source for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PolicySource for FilePolicySource {
    fn load(&self) -> Result<PolicyFile, PolicySourceError> {
        load_policy_file(&self.path).map_err(|err| match err {
            PolicyLoadError::Unreadable(_) | PolicyLoadError::TooLarge { .. } => {
                PolicySourceError::Unavailable(err.to_string())
            }
            PolicyLoadError::Parse(_) | PolicyLoadError::Invalid(_) => {
                PolicySourceError::Invalid(err.to_string())
            }
        })
    }
}
