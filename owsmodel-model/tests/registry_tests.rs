mod common;

use common::{CAT_NS, catalog_package, registry};
use owsmodel_model::{
    Cardinality, FeatureBuilder, LazyRegistry, PackageBuilder, RecordTypeBuilder, Registry,
    RegistryBuilder, XSD_NS, XmlKind,
};
use owsmodel_types::{ModelError, ModelResult, Primitive, Value};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn names(registry: &Registry, type_name: &str) -> Vec<String> {
    let rt = registry.find_record_type(CAT_NS, type_name).unwrap();
    registry
        .describe(rt.id())
        .unwrap()
        .iter()
        .map(|f| f.name().to_owned())
        .collect()
}

// ── Feature tables ───────────────────────────────────────────────

#[test]
fn supertype_features_come_first() {
    let reg = registry();
    assert_eq!(
        names(&reg, "SpecialEntry"),
        vec![
            "name", "status", "tags", "sku", "location", "rank", "related", "note", "summary",
            "priority"
        ]
    );
}

#[test]
fn inherited_features_keep_their_index() {
    let reg = registry();
    let entry = reg.find_record_type(CAT_NS, "Entry").unwrap();
    let special = reg.find_record_type(CAT_NS, "SpecialEntry").unwrap();
    for f in entry.features() {
        let same = &special.features()[f.id().index()];
        assert_eq!(same.name(), f.name());
        assert_eq!(same.declaring_type(), f.declaring_type());
    }
    assert_eq!(special.own_features().len(), 1);
    assert_eq!(special.own_features()[0].name(), "priority");
}

#[test]
fn describe_is_deterministic() {
    let reg = registry();
    let id = reg.find_record_type(CAT_NS, "Catalog").unwrap().id();
    assert_eq!(reg.describe(id).unwrap(), reg.describe(id).unwrap());
}

#[test]
fn feature_at_out_of_range() {
    let reg = registry();
    let rt = reg.find_record_type(CAT_NS, "Note").unwrap();
    assert_eq!(reg.feature_at(rt.id(), 0).unwrap().name(), "text");
    assert_eq!(
        reg.feature_at(rt.id(), 1),
        Err(ModelError::IndexOutOfRange {
            target: "Note".into(),
            index: 1,
            count: 1,
        })
    );
}

#[test]
fn feature_named_unknown() {
    let reg = registry();
    let rt = reg.find_record_type(CAT_NS, "Note").unwrap();
    assert!(matches!(
        reg.feature_named(rt.id(), "missing"),
        Err(ModelError::UnknownFeature { .. })
    ));
}

// ── Descriptor metadata ──────────────────────────────────────────

#[test]
fn descriptor_defaults() {
    let reg = registry();
    let entry = reg.find_record_type(CAT_NS, "Entry").unwrap();

    let status = entry.feature_named("status").unwrap();
    assert_eq!(status.default_value().as_enum().unwrap().literal, "draft");
    assert!(status.is_unsettable());

    let tags = entry.feature_named("tags").unwrap();
    assert!(tags.is_many());
    assert!(tags.is_unsettable());
    assert_eq!(tags.default_value(), &Value::List(Vec::new()));

    let rank = entry.feature_named("rank").unwrap();
    assert!(!rank.is_unsettable());
    assert_eq!(rank.default_value(), &Value::Null);

    let name = entry.feature_named("name").unwrap();
    assert_eq!(name.cardinality(), Cardinality::Required);
    assert!(name.is_required());
}

#[test]
fn containment_is_unsettable() {
    let reg = registry();
    let entry = reg.find_record_type(CAT_NS, "Entry").unwrap();
    assert!(entry.feature_named("note").unwrap().is_containment());
    assert!(entry.feature_named("note").unwrap().is_unsettable());
    assert!(!entry.feature_named("related").unwrap().is_containment());
}

#[test]
fn xml_mapping() {
    let reg = registry();
    let entry = reg.find_record_type(CAT_NS, "Entry").unwrap();
    let tags = entry.feature_named("tags").unwrap().xml();
    assert_eq!(tags.kind, XmlKind::Element);
    assert_eq!(tags.namespace.as_deref(), Some(CAT_NS));
    let sku = entry.feature_named("sku").unwrap().xml();
    assert_eq!(sku.kind, XmlKind::Attribute);
    assert_eq!(sku.namespace, None);
}

#[test]
fn group_members_are_derived() {
    let reg = registry();
    let doc = reg.find_record_type(CAT_NS, "Document").unwrap();
    let mixed = doc.feature_named("mixed").unwrap();
    assert!(mixed.is_group());
    assert!(!mixed.is_derived());
    let members: Vec<_> = doc.group_members(mixed.id()).map(|f| f.name()).collect();
    assert_eq!(members, vec!["catalog", "comment", "sku"]);
    assert!(doc.group_members(mixed.id()).all(|f| f.is_derived() && f.is_changeable()));
}

// ── Lookup ───────────────────────────────────────────────────────

#[test]
fn builtin_package_is_always_present() {
    let reg = RegistryBuilder::new().build().unwrap();
    let xsd = reg.package(XSD_NS).unwrap();
    assert_eq!(xsd.prefix(), "xsd");
    assert_eq!(xsd.datatypes().len(), Primitive::ALL.len());
    assert!(reg.datatype_named("xsd:anyURI").is_ok());
    assert!(reg.datatype_named("double").is_ok());
}

#[test]
fn qualified_lookup() {
    let reg = registry();
    let by_prefix = reg.record_type_named("cat:Entry").unwrap();
    let by_ns = reg.find_record_type(CAT_NS, "Entry").unwrap();
    assert_eq!(by_prefix.id(), by_ns.id());
    assert_eq!(reg.qualified_name(by_ns.id()), "cat:Entry");
    assert!(matches!(
        reg.record_type_named("cat:Nope"),
        Err(ModelError::UnknownType(_))
    ));
    assert!(matches!(
        reg.record_type_named("zzz:Entry"),
        Err(ModelError::UnknownType(_))
    ));
}

#[test]
fn subtyping() {
    let reg = registry();
    let named = reg.find_record_type(CAT_NS, "Named").unwrap().id();
    let entry = reg.find_record_type(CAT_NS, "Entry").unwrap().id();
    let special = reg.find_record_type(CAT_NS, "SpecialEntry").unwrap().id();
    assert!(reg.is_subtype(special, named));
    assert!(reg.is_subtype(entry, entry));
    assert!(!reg.is_subtype(entry, special));
    assert_eq!(reg.supertypes(special), vec![entry, named]);
}

// ── Build errors ─────────────────────────────────────────────────

#[test]
fn duplicate_namespace_rejected() {
    let result = RegistryBuilder::new()
        .package(catalog_package())
        .package(PackageBuilder::new("again", CAT_NS, "again"))
        .build();
    assert_eq!(result.unwrap_err(), ModelError::DuplicateName(CAT_NS.into()));
}

#[test]
fn duplicate_type_rejected() {
    let result = RegistryBuilder::new()
        .package(catalog_package().record(RecordTypeBuilder::new("Note")))
        .build();
    assert!(matches!(result, Err(ModelError::DuplicateName(_))));
}

#[test]
fn duplicate_feature_rejected_across_inheritance() {
    let result = RegistryBuilder::new()
        .package(
            catalog_package().record(
                RecordTypeBuilder::new("Shadow")
                    .extends("Named")
                    .feature(FeatureBuilder::attribute("name", "string")),
            ),
        )
        .build();
    assert_eq!(result.unwrap_err(), ModelError::DuplicateName("Shadow.name".into()));
}

#[test]
fn unknown_datatype_rejected() {
    let result = RegistryBuilder::new()
        .package(
            PackageBuilder::new("p", "urn:p", "p")
                .record(RecordTypeBuilder::new("T").feature(FeatureBuilder::attribute("a", "Nope"))),
        )
        .build();
    assert_eq!(result.unwrap_err(), ModelError::UnknownType("Nope".into()));
}

#[test]
fn inheritance_cycle_rejected() {
    let result = RegistryBuilder::new()
        .package(
            PackageBuilder::new("p", "urn:p", "p")
                .record(RecordTypeBuilder::new("A").extends("B"))
                .record(RecordTypeBuilder::new("B").extends("A")),
        )
        .build();
    assert!(matches!(result, Err(ModelError::UnsupportedOperation(_))));
}

#[test]
fn group_must_precede_members() {
    let result = RegistryBuilder::new()
        .package(
            PackageBuilder::new("p", "urn:p", "p").record(
                RecordTypeBuilder::new("Doc")
                    .feature(FeatureBuilder::element("a", "string").in_group("mixed"))
                    .feature(FeatureBuilder::group("mixed")),
            ),
        )
        .build();
    assert!(matches!(result, Err(ModelError::UnknownFeature { .. })));
}

#[test]
fn invalid_default_literal_rejected() {
    let result = RegistryBuilder::new()
        .package(
            PackageBuilder::new("p", "urn:p", "p").record(
                RecordTypeBuilder::new("T")
                    .feature(FeatureBuilder::attribute("n", "int").default_literal("seven")),
            ),
        )
        .build();
    assert!(matches!(result, Err(ModelError::InvalidLiteral { .. })));
}

#[test]
fn cross_package_references_resolve_by_prefix() {
    let reg = RegistryBuilder::new()
        .package(catalog_package())
        .package(
            PackageBuilder::new("shelf", "urn:example:shelf", "shelf").record(
                RecordTypeBuilder::new("Shelf")
                    .feature(FeatureBuilder::contains("catalog", "cat:Catalog"))
                    .feature(FeatureBuilder::attribute("status", "cat:StatusType")),
            ),
        )
        .build()
        .unwrap();
    let shelf = reg.find_record_type("urn:example:shelf", "Shelf").unwrap();
    let catalog = reg.find_record_type(CAT_NS, "Catalog").unwrap();
    assert_eq!(shelf.feature_named("catalog").unwrap().target(), Some(catalog.id()));
    assert_eq!(reg.packages().len(), 3);
}

// ── LazyRegistry ─────────────────────────────────────────────────

fn build_catalog() -> ModelResult<Registry> {
    RegistryBuilder::new().package(catalog_package()).build()
}

fn build_broken() -> ModelResult<Registry> {
    Err(ModelError::UnknownType("broken".into()))
}

#[test]
fn lazy_registry_initializes_once() {
    static LAZY: LazyRegistry = LazyRegistry::new(build_catalog);
    let first = LAZY.get().unwrap();
    let second = LAZY.get().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(LAZY.is_initialized());
}

#[test]
fn lazy_registry_try_get_before_init() {
    static LAZY: LazyRegistry = LazyRegistry::new(build_catalog);
    assert!(LAZY.try_get().is_none());
    assert!(!LAZY.is_initialized());
    LAZY.get().unwrap();
    assert!(LAZY.try_get().is_some());
}

#[test]
fn lazy_registry_concurrent_first_callers_share_one_instance() {
    static LAZY: LazyRegistry = LazyRegistry::new(build_catalog);
    let handles: Vec<Arc<Registry>> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..8).map(|_| s.spawn(|| LAZY.get().unwrap())).collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });
    for h in &handles[1..] {
        assert!(Arc::ptr_eq(&handles[0], h));
    }
}

#[test]
fn lazy_registry_remembers_failure() {
    static LAZY: LazyRegistry = LazyRegistry::new(build_broken);
    assert!(LAZY.get().is_err());
    assert!(LAZY.get().is_err());
    assert!(LAZY.is_initialized());
    assert!(LAZY.try_get().is_none());
}
