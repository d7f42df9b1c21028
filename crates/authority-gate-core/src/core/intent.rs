// crates/authority-gate-core/src/core/intent.rs
// ============================================================================
// Module: Authority Gate Action Intents
// Description: Content-addressed descriptions of proposed agent actions.
// Purpose: Bind every proposed action to a tamper-evident canonical hash.
// Dependencies: serde, serde_json, uuid, crate::core::{hashing, time}
// ============================================================================

//! ## Overview
//! An [`ActionIntent`] is the immutable record of one action an agent wants
//! to take: who is asking, what the action is, and the conversational
//! provenance. The `intent_hash` field is a canonical hash over every field
//! except the hash itself and the random `id`, computed once at creation and
//! recomputed on validation. A forged or hand-edited intent fails the
//! recomputation check and is rejected before any policy evaluation runs.
//!
//! Raw inputs are untrusted JSON; validation walks the document explicitly
//! and accumulates field-level errors instead of stopping at the first
//! problem.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json_with_limit;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum canonical size of the hashed intent view in bytes.
pub const MAX_INTENT_CANONICAL_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Intent identifier.
///
/// # Invariants
/// - Opaque UTF-8 string; freshly created intents use a random v4 UUID.
/// - Excluded from the intent hash, so it carries no integrity weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(String);

impl IntentId {
    /// Creates an intent identifier from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Intent Structure
// ============================================================================

/// Action categories governed by the control plane.
///
/// # Invariants
/// - Variants are stable for serialization and policy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Read data from a target.
    Read,
    /// Write data to a target.
    Write,
    /// Execute a program or command.
    Execute,
    /// Perform network I/O.
    Network,
    /// Create a new resource.
    Create,
    /// Delete an existing resource.
    Delete,
}

impl ActionType {
    /// Parses an action type from its wire form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "execute" => Some(Self::Execute),
            "network" => Some(Self::Network),
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the wire form of the action type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Execute => "execute",
            Self::Network => "network",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is asking for the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSource {
    /// Skill requesting the action.
    pub skill: String,
    /// Tool the skill intends to invoke.
    pub tool: String,
    /// Model driving the request.
    pub model: String,
}

/// What the action does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Action category.
    #[serde(rename = "type")]
    pub kind: ActionType,
    /// Action target (path, URL, or other locator).
    pub target: String,
    /// Opaque action parameters supplied by the caller.
    pub parameters: Map<String, Value>,
    /// Ordered data-category tags touched by the action.
    pub data_scope: Vec<String>,
}

/// Conversational provenance recorded for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceContext {
    /// Conversation identifier.
    pub conversation_id: String,
    /// Message identifier within the conversation.
    pub message_id: String,
    /// Verbatim user instruction that motivated the action.
    pub user_instruction: String,
}

/// Immutable, content-addressed description of a proposed action.
///
/// # Invariants
/// - `intent_hash` always equals the canonical hash of the timestamp,
///   source, action, and context fields; any disagreement marks the intent
///   as tampered.
/// - Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionIntent {
    /// Random identifier, excluded from the hash.
    pub id: IntentId,
    /// Creation timestamp.
    pub timestamp: Timestamp,
    /// Requesting source.
    pub source: ActionSource,
    /// Proposed action.
    pub action: ActionSpec,
    /// Conversational provenance.
    pub context: ProvenanceContext,
    /// Canonical hash binding all fields above except `id`.
    pub intent_hash: HashDigest,
}

impl ActionIntent {
    /// Recomputes the canonical hash over the intent's own fields.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the hashed view cannot be canonicalized or
    /// exceeds [`MAX_INTENT_CANONICAL_BYTES`].
    pub fn compute_hash(&self) -> Result<HashDigest, HashError> {
        compute_intent_hash(&self.timestamp, &self.source, &self.action, &self.context)
    }

    /// Returns true when the stored hash matches the recomputed hash.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the hashed view cannot be canonicalized.
    pub fn verify_hash(&self) -> Result<bool, HashError> {
        Ok(self.compute_hash()? == self.intent_hash)
    }
}

// ============================================================================
// SECTION: Intent Hash
// ============================================================================

/// Hashed view of an intent, excluding the hash field and the random id.
#[derive(Serialize)]
struct IntentHashView<'a> {
    /// Creation timestamp.
    timestamp: &'a Timestamp,
    /// Requesting source.
    source: &'a ActionSource,
    /// Proposed action.
    action: &'a ActionSpec,
    /// Conversational provenance.
    context: &'a ProvenanceContext,
}

/// Computes the canonical intent hash over the hashed field view.
///
/// # Errors
///
/// Returns [`HashError`] when the view cannot be canonicalized or exceeds
/// [`MAX_INTENT_CANONICAL_BYTES`].
pub fn compute_intent_hash(
    timestamp: &Timestamp,
    source: &ActionSource,
    action: &ActionSpec,
    context: &ProvenanceContext,
) -> Result<HashDigest, HashError> {
    let view = IntentHashView {
        timestamp,
        source,
        action,
        context,
    };
    hash_canonical_json_with_limit(DEFAULT_HASH_ALGORITHM, &view, MAX_INTENT_CANONICAL_BYTES)
}

// ============================================================================
// SECTION: Intent Builder
// ============================================================================

/// Parameters for building a fresh intent.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentDraft {
    /// Skill requesting the action.
    pub skill: String,
    /// Tool the skill intends to invoke.
    pub tool: String,
    /// Model driving the request.
    pub model: String,
    /// Action category.
    pub action_type: ActionType,
    /// Action target.
    pub target: String,
    /// Opaque action parameters.
    pub parameters: Map<String, Value>,
    /// Ordered data-category tags.
    pub data_scope: Vec<String>,
    /// Conversation identifier.
    pub conversation_id: String,
    /// Message identifier.
    pub message_id: String,
    /// Verbatim user instruction.
    pub user_instruction: String,
}

/// Builds a complete, self-consistent intent from a draft.
///
/// Assigns a fresh random id, stamps the supplied creation time, and computes
/// the binding hash.
///
/// # Errors
///
/// Returns [`HashError`] when the hashed view cannot be canonicalized or is
/// too large.
pub fn create_intent(draft: IntentDraft, now: Timestamp) -> Result<ActionIntent, HashError> {
    let source = ActionSource {
        skill: draft.skill,
        tool: draft.tool,
        model: draft.model,
    };
    let action = ActionSpec {
        kind: draft.action_type,
        target: draft.target,
        parameters: draft.parameters,
        data_scope: draft.data_scope,
    };
    let context = ProvenanceContext {
        conversation_id: draft.conversation_id,
        message_id: draft.message_id,
        user_instruction: draft.user_instruction,
    };
    let intent_hash = compute_intent_hash(&now, &source, &action, &context)?;
    Ok(ActionIntent {
        id: IntentId::random(),
        timestamp: now,
        source,
        action,
        context,
        intent_hash,
    })
}

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Accumulated field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(
    /// The collected failures, in discovery order.
    pub Vec<FieldError>,
);

impl FieldErrors {
    /// Returns true when no failures were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true when any collected failure is for the given field.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|err| err.field == field)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        Ok(())
    }
}

/// Errors raised by the PROPOSE entry point.
#[derive(Debug, Error)]
pub enum ProposeError {
    /// Input failed structural or hash validation.
    #[error("invalid action intent: {0}")]
    Invalid(FieldErrors),
    /// Hashing the assembled intent failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a raw JSON document as a complete [`ActionIntent`].
///
/// Every required field is checked for presence and type; failures accumulate
/// rather than short-circuiting. Finally the intent hash is recomputed from
/// the candidate's own fields and compared to the supplied hash, which is the
/// mechanism that defeats forged or hand-edited intents.
///
/// # Errors
///
/// Returns the accumulated [`FieldErrors`] when the document is not a valid,
/// hash-consistent intent.
pub fn validate_intent(raw: &Value) -> Result<ActionIntent, FieldErrors> {
    let mut errors = FieldErrors::default();

    let Some(obj) = raw.as_object() else {
        errors.0.push(FieldError::new("$", "intent must be a JSON object"));
        return Err(errors);
    };

    let id = require_string(obj, "id", &mut errors).map(IntentId::new);
    let timestamp = require_timestamp(obj, "timestamp", &mut errors);
    let source = validate_source(obj, &mut errors);
    let action = validate_action(obj, &mut errors);
    let context = validate_context(obj, &mut errors);
    let supplied_hash = require_digest(obj, "intent_hash", &mut errors);

    let (Some(id), Some(timestamp), Some(source), Some(action), Some(context), Some(supplied)) =
        (id, timestamp, source, action, context, supplied_hash)
    else {
        return Err(errors);
    };

    match compute_intent_hash(&timestamp, &source, &action, &context) {
        Ok(computed) if computed == supplied => {
            if errors.is_empty() {
                Ok(ActionIntent {
                    id,
                    timestamp,
                    source,
                    action,
                    context,
                    intent_hash: supplied,
                })
            } else {
                Err(errors)
            }
        }
        Ok(_) => {
            errors
                .0
                .push(FieldError::new("intent_hash", "hash does not match intent content"));
            Err(errors)
        }
        Err(err) => {
            errors.0.push(FieldError::new("intent_hash", err.to_string()));
            Err(errors)
        }
    }
}

/// Validates the `source` sub-object.
fn validate_source(obj: &Map<String, Value>, errors: &mut FieldErrors) -> Option<ActionSource> {
    let source = require_object(obj, "source", errors)?;
    let skill = require_string(source, "source.skill", errors);
    let tool = require_string(source, "source.tool", errors);
    let model = require_string(source, "source.model", errors);
    Some(ActionSource {
        skill: skill?,
        tool: tool?,
        model: model?,
    })
}

/// Validates the `action` sub-object.
fn validate_action(obj: &Map<String, Value>, errors: &mut FieldErrors) -> Option<ActionSpec> {
    let action = require_object(obj, "action", errors)?;

    let kind = match require_string(action, "action.type", errors) {
        Some(raw) => match ActionType::parse(&raw) {
            Some(kind) => Some(kind),
            None => {
                errors
                    .0
                    .push(FieldError::new("action.type", format!("unknown action type '{raw}'")));
                None
            }
        },
        None => None,
    };
    let target = require_string(action, "action.target", errors);
    let parameters = match action.get("parameters") {
        Some(Value::Object(map)) => Some(map.clone()),
        Some(_) => {
            errors.0.push(FieldError::new("action.parameters", "expected an object"));
            None
        }
        None => {
            errors.0.push(FieldError::new("action.parameters", "missing required field"));
            None
        }
    };
    let data_scope = require_string_array(action, "action.data_scope", errors);

    Some(ActionSpec {
        kind: kind?,
        target: target?,
        parameters: parameters?,
        data_scope: data_scope?,
    })
}

/// Validates the `context` sub-object.
fn validate_context(
    obj: &Map<String, Value>,
    errors: &mut FieldErrors,
) -> Option<ProvenanceContext> {
    let context = require_object(obj, "context", errors)?;
    let conversation_id = require_string(context, "context.conversation_id", errors);
    let message_id = require_string(context, "context.message_id", errors);
    let user_instruction = require_string(context, "context.user_instruction", errors);
    Some(ProvenanceContext {
        conversation_id: conversation_id?,
        message_id: message_id?,
        user_instruction: user_instruction?,
    })
}

/// Extracts a required string field, recording an error when absent or mistyped.
fn require_string(
    obj: &Map<String, Value>,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match obj.get(leaf_key(path)) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            errors.0.push(FieldError::new(path, "expected a string"));
            None
        }
        None => {
            errors.0.push(FieldError::new(path, "missing required field"));
            None
        }
    }
}

/// Extracts a required RFC 3339 timestamp field.
fn require_timestamp(
    obj: &Map<String, Value>,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Timestamp> {
    let raw = require_string(obj, path, errors)?;
    match Timestamp::parse_rfc3339(&raw) {
        Ok(timestamp) => Some(timestamp),
        Err(err) => {
            errors.0.push(FieldError::new(path, err.to_string()));
            None
        }
    }
}

/// Extracts a required object field.
fn require_object<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<&'a Map<String, Value>> {
    match obj.get(leaf_key(path)) {
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            errors.0.push(FieldError::new(path, "expected an object"));
            None
        }
        None => {
            errors.0.push(FieldError::new(path, "missing required field"));
            None
        }
    }
}

/// Extracts a required array-of-strings field.
fn require_string_array(
    obj: &Map<String, Value>,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Vec<String>> {
    match obj.get(leaf_key(path)) {
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::String(value) => out.push(value.clone()),
                    _ => {
                        errors.0.push(FieldError::new(
                            format!("{path}[{index}]"),
                            "expected a string",
                        ));
                        return None;
                    }
                }
            }
            Some(out)
        }
        Some(_) => {
            errors.0.push(FieldError::new(path, "expected an array of strings"));
            None
        }
        None => {
            errors.0.push(FieldError::new(path, "missing required field"));
            None
        }
    }
}

/// Extracts a required hash digest field.
fn require_digest(
    obj: &Map<String, Value>,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<HashDigest> {
    match obj.get(leaf_key(path)) {
        Some(value) => match serde_json::from_value::<HashDigest>(value.clone()) {
            Ok(digest) => Some(digest),
            Err(_) => {
                errors.0.push(FieldError::new(path, "expected a hash digest object"));
                None
            }
        },
        None => {
            errors.0.push(FieldError::new(path, "missing required field"));
            None
        }
    }
}

/// Returns the final segment of a dotted field path.
fn leaf_key(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

// ============================================================================
// SECTION: PROPOSE Entry Point
// ============================================================================

/// Public PROPOSE entry point.
///
/// Inputs carrying an `intent_hash` field are treated as full intents and run
/// through [`validate_intent`]; anything else is treated as a parameter bag
/// and assembled via [`create_intent`]. Parameter bags accept both snake_case
/// and camelCase key spellings for compatibility with upstream callers.
///
/// # Errors
///
/// Returns [`ProposeError::Invalid`] when validation or draft extraction
/// fails, or [`ProposeError::Hash`] when hashing the assembled intent fails.
pub fn propose(raw: &Value, now: Timestamp) -> Result<ActionIntent, ProposeError> {
    if let Some(obj) = raw.as_object()
        && obj.contains_key("intent_hash")
    {
        return validate_intent(raw).map_err(ProposeError::Invalid);
    }

    let draft = draft_from_value(raw).map_err(ProposeError::Invalid)?;
    Ok(create_intent(draft, now)?)
}

/// Extracts an [`IntentDraft`] from a loosely-shaped parameter bag.
fn draft_from_value(raw: &Value) -> Result<IntentDraft, FieldErrors> {
    let mut errors = FieldErrors::default();

    let Some(obj) = raw.as_object() else {
        errors.0.push(FieldError::new("$", "intent parameters must be a JSON object"));
        return Err(errors);
    };

    let action_type = if obj.contains_key("action_type") || obj.contains_key("actionType") {
        match bag_string(obj, "action_type", "actionType", &mut errors) {
            Some(raw_type) => match ActionType::parse(&raw_type) {
                Some(kind) => Some(kind),
                None => {
                    errors.0.push(FieldError::new(
                        "action_type",
                        format!("unknown action type '{raw_type}'"),
                    ));
                    None
                }
            },
            None => None,
        }
    } else {
        errors.0.push(FieldError::new("action_type", "missing required field"));
        None
    };

    let parameters = match obj.get("parameters") {
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            errors.0.push(FieldError::new("parameters", "expected an object"));
            Map::new()
        }
        None => Map::new(),
    };

    let data_scope = bag_string_array(obj, "data_scope", "dataScope", &mut errors);

    let draft = IntentDraft {
        skill: bag_string_or_empty(obj, "skill", "skill"),
        tool: bag_string_or_empty(obj, "tool", "tool"),
        model: bag_string_or_empty(obj, "model", "model"),
        action_type: match action_type {
            Some(kind) => kind,
            None => return Err(errors),
        },
        target: bag_string_or_empty(obj, "target", "target"),
        parameters,
        data_scope,
        conversation_id: bag_string_or_empty(obj, "conversation_id", "conversationId"),
        message_id: bag_string_or_empty(obj, "message_id", "messageId"),
        user_instruction: bag_string_or_empty(obj, "user_instruction", "userInstruction"),
    };

    if errors.is_empty() { Ok(draft) } else { Err(errors) }
}

/// Reads an optional string from a bag under either key spelling.
fn bag_string(
    obj: &Map<String, Value>,
    snake: &str,
    camel: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match obj.get(snake).or_else(|| obj.get(camel)) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            errors.0.push(FieldError::new(snake, "expected a string"));
            None
        }
        None => None,
    }
}

/// Reads a string from a bag under either key spelling, defaulting to empty.
fn bag_string_or_empty(obj: &Map<String, Value>, snake: &str, camel: &str) -> String {
    match obj.get(snake).or_else(|| obj.get(camel)) {
        Some(Value::String(value)) => value.clone(),
        _ => String::new(),
    }
}

/// Reads an array of strings from a bag, defaulting to empty.
fn bag_string_array(
    obj: &Map<String, Value>,
    snake: &str,
    camel: &str,
    errors: &mut FieldErrors,
) -> Vec<String> {
    match obj.get(snake).or_else(|| obj.get(camel)) {
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::String(value) => out.push(value.clone()),
                    _ => {
                        errors.0.push(FieldError::new(
                            format!("{snake}[{index}]"),
                            "expected a string",
                        ));
                    }
                }
            }
            out
        }
        _ => Vec::new(),
    }
}
