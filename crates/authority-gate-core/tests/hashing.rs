// crates/authority-gate-core/tests/hashing.rs
// ============================================================================
// Module: Canonical Hashing Tests
// Description: Verifies RFC 8785 canonical JSON hashing behavior.
// ============================================================================
//! ## Overview
//! Ensures canonical hashing is deterministic across key ordering, rejects
//! values without a canonical form, honors size limits, and matches known
//! SHA-256 values.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use authority_gate_core::HashAlgorithm;
use authority_gate_core::hashing::HashDigest;
use authority_gate_core::hashing::HashError;
use authority_gate_core::hashing::canonical_json_bytes;
use authority_gate_core::hashing::hash_bytes;
use authority_gate_core::hashing::hash_canonical_json;
use authority_gate_core::hashing::hash_canonical_json_with_limit;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

#[test]
fn canonical_hash_is_order_independent_for_maps() {
    let mut map_a = Map::new();
    map_a.insert("b".to_string(), json!(2));
    map_a.insert("a".to_string(), json!(1));

    let mut map_b = Map::new();
    map_b.insert("a".to_string(), json!(1));
    map_b.insert("b".to_string(), json!(2));

    let hash_a =
        hash_canonical_json(HashAlgorithm::Sha256, &Value::Object(map_a)).expect("hash a");
    let hash_b =
        hash_canonical_json(HashAlgorithm::Sha256, &Value::Object(map_b)).expect("hash b");

    assert_eq!(hash_a, hash_b);
}

#[test]
fn canonical_hash_is_deterministic_across_calls() {
    let value = json!({"a": 1, "b": [1, 2, 3], "c": {"nested": true}});
    let hash1 = hash_canonical_json(HashAlgorithm::Sha256, &value).expect("hash1");
    let hash2 = hash_canonical_json(HashAlgorithm::Sha256, &value).expect("hash2");
    assert_eq!(hash1, hash2, "Hash must be deterministic");
}

#[test]
fn canonical_hash_distinguishes_different_documents() {
    let hash_a = hash_canonical_json(HashAlgorithm::Sha256, &json!({"a": 1})).expect("hash a");
    let hash_b = hash_canonical_json(HashAlgorithm::Sha256, &json!({"a": 2})).expect("hash b");
    assert_ne!(hash_a, hash_b);
}

#[derive(Serialize)]
struct FloatWrapper {
    value: f64,
}

#[test]
fn canonical_hash_rejects_nan() {
    let value = FloatWrapper {
        value: f64::NAN,
    };
    let err = hash_canonical_json(HashAlgorithm::Sha256, &value).unwrap_err();
    assert!(matches!(err, HashError::Canonicalization(_)));
}

#[test]
fn canonical_hash_rejects_infinity() {
    let value = FloatWrapper {
        value: f64::INFINITY,
    };
    let err = hash_canonical_json(HashAlgorithm::Sha256, &value).unwrap_err();
    assert!(matches!(err, HashError::Canonicalization(_)));
}

#[test]
fn canonical_hash_respects_size_limit() {
    let payload = BTreeMap::from([("data", "x".repeat(64))]);
    let err = hash_canonical_json_with_limit(HashAlgorithm::Sha256, &payload, 16).unwrap_err();
    assert!(matches!(err, HashError::SizeLimitExceeded { .. }));
}

#[test]
fn size_limit_exact_boundary_passes() {
    let payload = BTreeMap::from([("d", "x".to_string())]);
    let bytes = canonical_json_bytes(&payload).expect("canonical bytes");
    let exact_limit = bytes.len();

    let result = hash_canonical_json_with_limit(HashAlgorithm::Sha256, &payload, exact_limit);
    assert!(result.is_ok(), "Exact boundary should succeed");
}

#[test]
fn size_limit_reports_actual_size() {
    let payload = BTreeMap::from([("data", "x".repeat(100))]);
    let result = hash_canonical_json_with_limit(HashAlgorithm::Sha256, &payload, 10);

    if let Err(HashError::SizeLimitExceeded {
        limit,
        actual,
    }) = result
    {
        assert_eq!(limit, 10, "Limit should be 10");
        assert!(actual > 10, "Actual should exceed limit");
    } else {
        panic!("Expected SizeLimitExceeded error");
    }
}

#[test]
fn golden_hash_empty_object() {
    // SHA-256 of "{}"
    let digest = hash_canonical_json(HashAlgorithm::Sha256, &json!({})).expect("hash");
    assert_eq!(
        digest.value, "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
        "Empty object hash mismatch"
    );
    assert_eq!(digest.algorithm, HashAlgorithm::Sha256);
}

#[test]
fn golden_hash_empty_array() {
    // SHA-256 of "[]"
    let digest = hash_canonical_json(HashAlgorithm::Sha256, &json!([])).expect("hash");
    assert_eq!(
        digest.value, "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945",
        "Empty array hash mismatch"
    );
}

#[test]
fn golden_hash_bytes_direct() {
    // SHA-256 of "test"
    let digest = hash_bytes(HashAlgorithm::Sha256, b"test");
    assert_eq!(
        digest.value, "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        "Direct bytes hash mismatch"
    );
}

#[test]
fn golden_hash_empty_bytes() {
    // SHA-256 of empty input
    let digest = hash_bytes(HashAlgorithm::Sha256, b"");
    assert_eq!(
        digest.value, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        "Empty bytes hash mismatch"
    );
}

#[test]
fn hash_digest_produces_lowercase_hex() {
    let bytes = [0xAB, 0xCD, 0xEF, 0x12];
    let digest = HashDigest::new(HashAlgorithm::Sha256, &bytes);
    assert_eq!(digest.value, "abcdef12", "Hex must be lowercase");
}

#[test]
fn hash_unicode_strings() {
    let value = json!({"note": "Hello, 世界!"});
    let result = hash_canonical_json(HashAlgorithm::Sha256, &value);
    assert!(result.is_ok(), "Unicode strings should hash successfully");
}
