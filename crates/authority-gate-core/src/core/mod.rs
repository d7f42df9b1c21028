// crates/authority-gate-core/src/core/mod.rs
// ============================================================================
// Module: Authority Gate Core Types
// Description: Canonical data model for intents, policies, verdicts, and
//              witness records.
// Purpose: Re-export the core governance model from one place.
// Dependencies: crate::core::*
// ============================================================================

//! ## Overview
//! The core model is pure data plus deterministic predicates: no file I/O,
//! no clock reads, no network. Side effects live behind the interfaces in
//! [`crate::interfaces`] and in the runtime pipeline.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod hashing;
pub mod intent;
pub mod pattern;
pub mod policy;
pub mod time;
pub mod verdict;
pub mod witness;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use intent::ActionIntent;
pub use intent::ActionSource;
pub use intent::ActionSpec;
pub use intent::ActionType;
pub use intent::FieldError;
pub use intent::FieldErrors;
pub use intent::IntentDraft;
pub use intent::IntentId;
pub use intent::ProposeError;
pub use intent::ProvenanceContext;
pub use intent::create_intent;
pub use intent::propose;
pub use intent::validate_intent;
pub use pattern::match_glob;
pub use policy::ActionTypeMatch;
pub use policy::Decision;
pub use policy::DefaultDecision;
pub use policy::MatchCriteria;
pub use policy::PolicyFile;
pub use policy::PolicyRule;
pub use policy::SensitiveAction;
pub use policy::SensitiveDataRule;
pub use time::Timestamp;
pub use time::TimestampParseError;
pub use verdict::Verdict;
pub use verdict::compute_verdict_hash;
pub use witness::ChainReport;
pub use witness::ExecutionResult;
pub use witness::ExecutionStatus;
pub use witness::GENESIS_SEED;
pub use witness::WitnessRecord;
pub use witness::genesis_hash;
pub use witness::verify_chain;
