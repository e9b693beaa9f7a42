mod common;

use common::{catalog_package, create, store};
use owsmodel_model::{Problem, RecordStore, RegistryBuilder, Severity, ValidationConfig, Validator};
use owsmodel_types::{DataType, ModelError, Primitive};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn validator(store: &RecordStore) -> Validator {
    Validator::for_registry(Arc::clone(store.registry()), ValidationConfig::default()).unwrap()
}

fn problems(v: &Validator, store: &RecordStore, root: owsmodel_types::RecordId) -> Vec<(String, Problem)> {
    v.validate(store, root)
        .unwrap()
        .into_iter()
        .map(|d| (d.feature, d.problem))
        .collect()
}

// ── Required features ────────────────────────────────────────────

#[test]
fn missing_required_feature() {
    let mut s = store();
    let e = create(&mut s, "Entry");
    let v = validator(&s);
    assert_eq!(problems(&v, &s, e), vec![("name".to_owned(), Problem::Missing)]);
    assert!(!v.is_valid(&s, e).unwrap());

    s.set(e, "name", "Harbour").unwrap();
    assert!(v.validate(&s, e).unwrap().is_empty());
    assert!(v.is_valid(&s, e).unwrap());
}

#[test]
fn required_check_can_be_disabled() {
    let mut s = store();
    let e = create(&mut s, "Entry");
    let v = Validator::for_registry(
        Arc::clone(s.registry()),
        ValidationConfig {
            check_required: false,
            ..ValidationConfig::default()
        },
    )
    .unwrap();
    assert!(v.validate(&s, e).unwrap().is_empty());
}

// ── Facets ───────────────────────────────────────────────────────

#[test]
fn pattern_facet() {
    let mut s = store();
    let e = create(&mut s, "Entry");
    s.set(e, "name", "n").unwrap();
    s.set(e, "sku", "abc-1").unwrap();
    let v = validator(&s);
    assert_eq!(
        problems(&v, &s, e),
        vec![(
            "sku".to_owned(),
            Problem::PatternMismatch {
                lexical: "abc-1".into(),
                pattern: r"[A-Z]{3}-\d+".into(),
            }
        )]
    );
    s.set(e, "sku", "ABC-12").unwrap();
    assert!(v.validate(&s, e).unwrap().is_empty());
}

#[test]
fn pattern_is_anchored() {
    let mut s = store();
    let e = create(&mut s, "Entry");
    s.set(e, "name", "n").unwrap();
    s.set(e, "sku", "xABC-1x").unwrap();
    let v = validator(&s);
    assert_eq!(v.validate(&s, e).unwrap().len(), 1);
}

#[test]
fn list_length_counts_items() {
    let mut s = store();
    let e = create(&mut s, "Entry");
    s.set(e, "name", "n").unwrap();
    s.set(e, "location", vec![1.0, 2.0, 3.0]).unwrap();
    let v = validator(&s);
    assert_eq!(
        problems(&v, &s, e),
        vec![("location".to_owned(), Problem::TooLong { length: 3, max: 2 })]
    );
    s.set(e, "location", vec![1.0]).unwrap();
    assert_eq!(
        problems(&v, &s, e),
        vec![("location".to_owned(), Problem::TooShort { length: 1, min: 2 })]
    );
}

#[test]
fn group_entries_are_checked_against_member_facets() {
    let mut s = store();
    let d = create(&mut s, "Document");
    s.set(d, "sku", "bad").unwrap();
    let v = validator(&s);
    let found = problems(&v, &s, d);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, "mixed");
    assert!(matches!(found[0].1, Problem::PatternMismatch { .. }));
}

#[test]
fn invalid_pattern_rejected_at_construction() {
    let reg = RegistryBuilder::new()
        .package(
            catalog_package()
                .datatype(DataType::restriction("Broken", Primitive::String).with_pattern("(unclosed")),
        )
        .build()
        .unwrap();
    let err = Validator::for_registry(Arc::new(reg), ValidationConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::InvalidLiteral { ref datatype, .. } if datatype == "Broken"));
}

// ── References and recursion ─────────────────────────────────────

#[test]
fn dangling_reference_is_a_warning() {
    let mut s = store();
    let e = create(&mut s, "Entry");
    let other = create(&mut s, "Entry");
    s.set(e, "name", "n").unwrap();
    s.set(e, "related", other).unwrap();
    s.destroy(other).unwrap();

    let v = validator(&s);
    let diagnostics = v.validate(&s, e).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].problem, Problem::Dangling(other));
    assert!(v.is_valid(&s, e).unwrap());
}

#[test]
fn recursion_follows_containment() {
    let mut s = store();
    let c = create(&mut s, "Catalog");
    let e = create(&mut s, "Entry");
    s.list(c, "entries").unwrap().push(e).unwrap();

    let v = validator(&s);
    let diagnostics = v.validate(&s, c).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].record, e);
    assert_eq!(diagnostics[0].record_type, "Entry");
    assert!(diagnostics[0].to_string().starts_with("error: Entry.name"));

    let shallow = Validator::for_registry(
        Arc::clone(s.registry()),
        ValidationConfig {
            recursive: false,
            ..ValidationConfig::default()
        },
    )
    .unwrap();
    assert!(shallow.validate(&s, c).unwrap().is_empty());
}

#[test]
fn store_of_another_registry_rejected() {
    let mut s = store();
    let e = create(&mut s, "Note");
    let other = store();
    let v = validator(&other);
    assert!(matches!(v.validate(&s, e), Err(ModelError::UnsupportedOperation(_))));
}
