#![forbid(unsafe_code)]

//! Snapshot normalization and comparison for record collections.
//!
//! The history engine never inspects record contents directly. Instead,
//! every collection is mapped through a normalization strategy to a
//! [`Snapshot`], a comparable stand-in used for commit deduplication and
//! dirty-flag checks. The default strategy serializes the collection to a
//! JSON tree and compares trees structurally.
//!
//! # Fallback Rule
//!
//! Normalization must be total: commit and dirty checks are not allowed to
//! fail. When a collection cannot be serialized (records holding opaque
//! handles, map keys `serde_json` rejects), [`structural`] degrades to an
//! identity token derived from the collection's allocation, and comparison
//! degrades to allocation identity. Two live collections never share an
//! allocation, so an unserializable collection compares equal only to
//! itself.

use serde::Serialize;
use serde_json::Value;

/// Comparable representation of a record collection at a point in time.
///
/// Produced by a normalization strategy (see [`structural`] for the default)
/// and consumed by a comparison strategy (see [`structural_eq`]). Snapshots
/// are precomputed once per frame and never recomputed for stored history.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// The collection serialized to a JSON tree. Compared structurally.
    Structural(Value),
    /// Identity token for a collection with no structural form. Compared by
    /// token equality, which amounts to reference equality of the source
    /// collection.
    Identity(usize),
}

impl Snapshot {
    /// Whether this snapshot carries a structural form.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}

/// Default normalization: serialize the records to a JSON tree.
///
/// Falls back to an identity token when serialization fails, per the module
/// fallback rule.
#[must_use]
pub fn structural<T: Serialize>(records: &[T]) -> Snapshot {
    match serde_json::to_value(records) {
        Ok(value) => Snapshot::Structural(value),
        Err(_) => Snapshot::Identity(records.as_ptr() as usize),
    }
}

/// Default comparison: deep equality on structural forms, token equality on
/// identity tokens. A structural form never equals an identity token.
#[must_use]
pub fn structural_eq(a: &Snapshot, b: &Snapshot) -> bool {
    match (a, b) {
        (Snapshot::Structural(x), Snapshot::Structural(y)) => x == y,
        (Snapshot::Identity(x), Snapshot::Identity(y)) => x == y,
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serializer;

    /// Record that refuses to serialize, standing in for collections holding
    /// opaque runtime handles.
    struct OpaqueHandle;

    impl Serialize for OpaqueHandle {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("opaque handle"))
        }
    }

    #[test]
    fn structural_snapshots_compare_by_content() {
        let a = structural(&[1, 2, 3]);
        let b = structural(&[1, 2, 3]);
        let c = structural(&[1, 2, 4]);

        assert!(a.is_structural());
        assert!(structural_eq(&a, &b));
        assert!(!structural_eq(&a, &c));
    }

    #[test]
    fn structural_ignores_allocation_identity() {
        let first: Vec<String> = vec!["x".into()];
        let second: Vec<String> = vec!["x".into()];
        assert!(structural_eq(&structural(&first), &structural(&second)));
    }

    #[test]
    fn empty_collections_are_equal() {
        let a: Vec<i32> = Vec::new();
        let b: Vec<i32> = Vec::new();
        assert!(structural_eq(&structural(&a), &structural(&b)));
    }

    #[test]
    fn unserializable_falls_back_to_identity() {
        let records = vec![OpaqueHandle];
        let snap = structural(&records);
        assert!(!snap.is_structural());

        // Same allocation: equal to itself.
        assert!(structural_eq(&snap, &structural(&records)));

        // Distinct allocation: never equal.
        let other = vec![OpaqueHandle];
        assert!(!structural_eq(&snap, &structural(&other)));
    }

    #[test]
    fn structural_never_equals_identity() {
        let structural_snap = structural(&[1u8]);
        let identity_snap = Snapshot::Identity(0xdead);
        assert!(!structural_eq(&structural_snap, &identity_snap));
        assert!(!structural_eq(&identity_snap, &structural_snap));
    }
}
