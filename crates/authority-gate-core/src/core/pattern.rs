// crates/authority-gate-core/src/core/pattern.rs
// ============================================================================
// Module: Authority Gate Pattern Matching
// Description: Glob matching for policy target, skill, and tool patterns.
// Purpose: Provide platform-independent, fail-closed pattern evaluation.
// Dependencies: directories, globset
// ============================================================================

//! ## Overview
//! Policy patterns are globs with a few extensions: `*` matches within a
//! path segment, `**` crosses segments (including zero of them), `?` matches
//! one non-separator character, `{a,b}` brace groups expand recursively, a
//! leading `!` negates the whole match, and a leading `~` expands to the
//! home directory. Targets and patterns are normalized to forward slashes
//! before comparison so matching behaves identically on every platform.
//!
//! A pattern that fails to compile matches nothing. Fail-closed, like every
//! other uncertain outcome in the gate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use globset::GlobBuilder;

// ============================================================================
// SECTION: Glob Matching
// ============================================================================

/// Matches a target string against a policy glob pattern.
#[must_use]
pub fn match_glob(target: &str, pattern: &str) -> bool {
    let (pattern, negated) = match pattern.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (pattern, false),
    };

    let target = expand_home_with(&normalize_separators(target), resolved_home());
    let pattern = expand_home_with(&normalize_separators(pattern), resolved_home());

    let matched = expand_braces(&pattern)
        .iter()
        .any(|candidate| compile_and_match(candidate, &target));

    if negated { !matched } else { matched }
}

/// Compiles one expanded glob candidate and matches it against the target.
fn compile_and_match(pattern: &str, target: &str) -> bool {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .ok()
        .is_some_and(|glob| glob.compile_matcher().is_match(target))
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes path separators to forward slashes.
fn normalize_separators(value: &str) -> String {
    value.replace('\\', "/")
}

/// Expands a leading `~` using the supplied home directory.
fn expand_home_with(value: &str, home: Option<&str>) -> String {
    let Some(home) = home else {
        return value.to_string();
    };
    if value == "~" {
        return home.to_string();
    }
    value.strip_prefix("~/").map_or_else(
        || value.to_string(),
        |rest| format!("{}/{rest}", home.trim_end_matches('/')),
    )
}

/// Returns the normalized home directory, resolved once per process.
fn resolved_home() -> Option<&'static str> {
    /// Cached home directory lookup result.
    static HOME: OnceLock<Option<String>> = OnceLock::new();
    HOME.get_or_init(|| {
        directories::BaseDirs::new()
            .map(|dirs| normalize_separators(&dirs.home_dir().to_string_lossy()))
    })
    .as_deref()
}

// ============================================================================
// SECTION: Brace Expansion
// ============================================================================

/// Expands `{a,b,c}` brace groups into the full set of alternative patterns.
///
/// Groups expand recursively, so `a{b,{c,d}}e` yields `abe`, `ace`, `ade`.
/// A pattern with unbalanced braces is returned unchanged and left to the
/// glob compiler to reject.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((start, end)) = first_group(pattern) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[.. start];
    let body = &pattern[start + 1 .. end];
    let suffix = &pattern[end + 1 ..];

    let mut out = Vec::new();
    for alternative in split_top_level(body) {
        let candidate = format!("{prefix}{alternative}{suffix}");
        out.extend(expand_braces(&candidate));
    }
    out
}

/// Finds the byte range of the first balanced top-level brace group.
fn first_group(pattern: &str) -> Option<(usize, usize)> {
    let start = pattern.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in pattern[start ..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some((start, start + offset));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits a brace-group body on commas that are not nested in inner groups.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0usize;
    for (offset, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[segment_start .. offset]);
                segment_start = offset + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[segment_start ..]);
    parts
}

// ============================================================================
// SECTION: Tests
// ============================================================================
