// crates/authority-gate-core/src/core/policy.rs
// ============================================================================
// Module: Authority Gate Policy Model
// Description: Declarative policy document and rule-matching predicates.
// Purpose: Describe which actions are approved, denied, or escalated.
// Dependencies: serde, crate::core::{intent, pattern}
// ============================================================================

//! ## Overview
//! A [`PolicyFile`] is an ordered, versioned ruleset. Ordinary rules are
//! evaluated first-match-wins in file order; sensitive-data rules are
//! evaluated before any of them and always win, so a broad approve rule can
//! never leak a credentials file. A policy that fails structural validation
//! must never be used — callers substitute [`PolicyFile::fail_closed`]
//! instead of guessing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::intent::ActionIntent;
use crate::core::intent::ActionType;
use crate::core::intent::FieldError;
use crate::core::pattern::match_glob;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Three-valued governance decision.
///
/// # Invariants
/// - Variants are stable for serialization and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Action is authorized.
    Approve,
    /// Action is refused.
    Deny,
    /// Action requires a human decision.
    Escalate,
}

impl Decision {
    /// Returns the wire form of the decision.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Deny => "deny",
            Self::Escalate => "escalate",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default decision applied when no rule matches.
///
/// Production policies should always use `deny`; `approve` exists for
/// permissive test policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultDecision {
    /// Unmatched actions are approved.
    Approve,
    /// Unmatched actions are denied (fail-closed default).
    Deny,
}

impl DefaultDecision {
    /// Widens the default into a full [`Decision`].
    #[must_use]
    pub const fn as_decision(self) -> Decision {
        match self {
            Self::Approve => Decision::Approve,
            Self::Deny => Decision::Deny,
        }
    }
}

/// Action taken when a sensitive-data rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveAction {
    /// Refuse the action outright.
    Deny,
    /// Require a human decision.
    Escalate,
}

impl SensitiveAction {
    /// Widens the sensitive action into a full [`Decision`].
    #[must_use]
    pub const fn as_decision(self) -> Decision {
        match self {
            Self::Deny => Decision::Deny,
            Self::Escalate => Decision::Escalate,
        }
    }
}

// ============================================================================
// SECTION: Policy Document
// ============================================================================

/// Action-type match clause: a single type or a set of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionTypeMatch {
    /// Exactly one action type.
    One(ActionType),
    /// Any of the listed action types.
    Many(Vec<ActionType>),
}

impl ActionTypeMatch {
    /// Returns true when the clause covers the given action type.
    #[must_use]
    pub fn covers(&self, kind: ActionType) -> bool {
        match self {
            Self::One(single) => *single == kind,
            Self::Many(set) => set.contains(&kind),
        }
    }
}

/// Match criteria for one policy rule.
///
/// # Invariants
/// - Absent clauses do not constrain the match; a clause-free criteria set
///   matches every intent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchCriteria {
    /// Action type(s) the rule applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ActionTypeMatch>,
    /// Glob matched against the action target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pattern: Option<String>,
    /// Glob matched against the source skill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_pattern: Option<String>,
    /// Glob matched against `skill.tool` or the bare tool name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_pattern: Option<String>,
    /// Data-scope tags; matches when the intent shares at least one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_scope: Option<Vec<String>>,
}

/// One ordered policy rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Stable rule name, recorded in verdicts and audit lines.
    pub name: String,
    /// Match criteria; all present clauses must hold.
    #[serde(default, rename = "match")]
    pub criteria: MatchCriteria,
    /// Decision produced when the rule matches.
    pub verdict: Decision,
    /// Human-readable justification recorded in the verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PolicyRule {
    /// Returns true when every present clause matches the intent.
    #[must_use]
    pub fn matches(&self, intent: &ActionIntent) -> bool {
        if let Some(action_type) = &self.criteria.action_type
            && !action_type.covers(intent.action.kind)
        {
            return false;
        }
        if let Some(pattern) = &self.criteria.target_pattern
            && !match_glob(&intent.action.target, pattern)
        {
            return false;
        }
        if let Some(pattern) = &self.criteria.skill_pattern
            && !match_glob(&intent.source.skill, pattern)
        {
            return false;
        }
        if let Some(pattern) = &self.criteria.tool_pattern {
            let qualified = format!("{}.{}", intent.source.skill, intent.source.tool);
            if !match_glob(&qualified, pattern) && !match_glob(&intent.source.tool, pattern) {
                return false;
            }
        }
        if let Some(scopes) = &self.criteria.data_scope
            && !scopes.iter().any(|scope| intent.action.data_scope.contains(scope))
        {
            return false;
        }
        true
    }
}

/// Sensitive-data rule, evaluated before all ordinary rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveDataRule {
    /// Data category this rule protects.
    pub category: String,
    /// Globs matched against the action target.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Action taken when the rule matches.
    pub action: SensitiveAction,
}

impl SensitiveDataRule {
    /// Returns true when the rule covers the intent.
    ///
    /// Matches when any glob pattern covers the target, or when the intent
    /// declares the protected category in its data scope.
    #[must_use]
    pub fn matches(&self, intent: &ActionIntent) -> bool {
        self.patterns.iter().any(|pattern| match_glob(&intent.action.target, pattern))
            || intent.action.data_scope.contains(&self.category)
    }
}

/// Declarative, versioned policy document.
///
/// # Invariants
/// - `rules` order is significant: the first matching rule wins.
/// - `sensitive_data` rules always override `rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFile {
    /// Policy document version string.
    pub version: String,
    /// Decision applied when no rule matches.
    pub default_verdict: DefaultDecision,
    /// Ordered policy rules.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
    /// Ordered sensitive-data overrides.
    #[serde(default)]
    pub sensitive_data: Vec<SensitiveDataRule>,
}

impl PolicyFile {
    /// Returns the built-in fail-closed policy: no rules, deny everything.
    #[must_use]
    pub fn fail_closed() -> Self {
        Self {
            version: "0.1".to_string(),
            default_verdict: DefaultDecision::Deny,
            rules: Vec::new(),
            sensitive_data: Vec::new(),
        }
    }

    /// Checks structural invariants not already enforced by deserialization.
    ///
    /// # Errors
    ///
    /// Returns the accumulated field errors when the document is not usable.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.version.trim().is_empty() {
            errors.push(FieldError::new("version", "must be a non-empty string"));
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("rules[{index}].name"),
                    "must be a non-empty string",
                ));
            }
        }
        for (index, rule) in self.sensitive_data.iter().enumerate() {
            if rule.category.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("sensitive_data[{index}].category"),
                    "must be a non-empty string",
                ));
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Returns the first sensitive-data rule covering the intent, if any.
    #[must_use]
    pub fn first_sensitive_match(&self, intent: &ActionIntent) -> Option<&SensitiveDataRule> {
        self.sensitive_data.iter().find(|rule| rule.matches(intent))
    }

    /// Returns the first ordinary rule covering the intent, if any.
    #[must_use]
    pub fn first_rule_match(&self, intent: &ActionIntent) -> Option<&PolicyRule> {
        self.rules.iter().find(|rule| rule.matches(intent))
    }
}
