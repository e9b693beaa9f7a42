use owsmodel_model::{
    FeatureBuilder, PackageBuilder, Problem, RecordStore, RecordTypeBuilder, RegistryBuilder,
    ValidationConfig, Validator,
};
use owsmodel_types::RecordId;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn validator(store: &RecordStore) -> Validator {
    Validator::for_registry(Arc::clone(store.registry()), ValidationConfig::default()).unwrap()
}

fn problems(store: &RecordStore, root: RecordId) -> Vec<(String, Problem)> {
    validator(store)
        .validate(store, root)
        .unwrap()
        .into_iter()
        .map(|d| (d.feature, d.problem))
        .collect()
}

// ── Required features ────────────────────────────────────────────

#[test]
fn empty_exception_report() {
    let factory = owsmodel_ows::factory().unwrap();
    let mut store = owsmodel_ows::store().unwrap();
    let report = factory.create(&mut store, "ExceptionReportType").unwrap();
    assert_eq!(
        problems(&store, report),
        vec![
            ("exception".to_owned(), Problem::Missing),
            ("version".to_owned(), Problem::Missing),
        ]
    );
}

#[test]
fn complete_exception_report_is_valid() {
    let factory = owsmodel_ows::factory().unwrap();
    let mut store = owsmodel_ows::store().unwrap();
    let report = factory.create(&mut store, "ExceptionReportType").unwrap();
    let exception = factory.create(&mut store, "ExceptionType").unwrap();
    store.set(exception, "exceptionCode", "MissingParameterValue").unwrap();
    store.set(exception, "locator", "service").unwrap();
    store.list(report, "exception").unwrap().push(exception).unwrap();
    store.set(report, "version", "2.0.0").unwrap();

    assert!(validator(&store).validate(&store, report).unwrap().is_empty());
}

#[test]
fn nested_problems_name_the_nested_record() {
    let factory = owsmodel_ows::factory().unwrap();
    let mut store = owsmodel_ows::store().unwrap();
    let report = factory.create(&mut store, "ExceptionReportType").unwrap();
    let exception = factory.create(&mut store, "ExceptionType").unwrap();
    store.list(report, "exception").unwrap().push(exception).unwrap();
    store.set(report, "version", "2.0.0").unwrap();

    let diagnostics = validator(&store).validate(&store, report).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].record, exception);
    assert_eq!(diagnostics[0].record_type, "ExceptionType");
    assert_eq!(diagnostics[0].feature, "exceptionCode");
}

// ── Patterns ─────────────────────────────────────────────────────

#[test]
fn version_pattern() {
    let factory = owsmodel_ows::factory().unwrap();
    let mut store = owsmodel_ows::store().unwrap();
    let versions = factory.create(&mut store, "AcceptVersionsType").unwrap();
    {
        let mut list = store.list(versions, "version").unwrap();
        list.push("2.0.0").unwrap();
        list.push("1.10.2").unwrap();
        list.push("2.0").unwrap();
    }
    let found = problems(&store, versions);
    assert_eq!(found.len(), 1);
    assert!(matches!(
        &found[0].1,
        Problem::PatternMismatch { lexical, .. } if lexical == "2.0"
    ));
}

#[test]
fn mime_type_pattern() {
    let factory = owsmodel_ows::factory().unwrap();
    let mut store = owsmodel_ows::store().unwrap();
    let formats = factory.create(&mut store, "AcceptFormatsType").unwrap();
    {
        let mut list = store.list(formats, "outputFormat").unwrap();
        list.push("text/xml").unwrap();
        list.push("application/gml+xml; version=3.2").unwrap();
        list.push("xml").unwrap();
        list.push("font/woff").unwrap();
    }
    let rejected: Vec<String> = problems(&store, formats)
        .into_iter()
        .filter_map(|(_, p)| match p {
            Problem::PatternMismatch { lexical, .. } => Some(lexical),
            _ => None,
        })
        .collect();
    assert_eq!(rejected, vec!["xml".to_owned(), "font/woff".to_owned()]);
}

#[test]
fn document_root_members_are_checked() {
    let factory = owsmodel_ows::factory().unwrap();
    let mut store = owsmodel_ows::store().unwrap();
    let root = factory.create(&mut store, "DocumentRoot").unwrap();
    store.set(root, "outputFormat", "not-a-mime-type").unwrap();
    let found = problems(&store, root);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, "mixed");
}

// ── Extension packages ───────────────────────────────────────────

#[test]
fn two_dimensional_positions() {
    let registry = RegistryBuilder::new()
        .package(owsmodel_ows::xlink_package())
        .package(owsmodel_ows::ows_package())
        .package(
            PackageBuilder::new("probe", "urn:example:probe", "probe").record(
                RecordTypeBuilder::new("Point")
                    .feature(FeatureBuilder::element("pos", "ows:PositionType2D").required()),
            ),
        )
        .build()
        .unwrap();
    let mut store = RecordStore::new(Arc::new(registry));
    let point_type = store.registry().record_type_named("probe:Point").unwrap().id();
    let point = store.create(point_type).unwrap();

    store.set(point, "pos", vec![1.0, 2.0, 3.0]).unwrap();
    assert_eq!(
        problems(&store, point),
        vec![("pos".to_owned(), Problem::TooLong { length: 3, max: 2 })]
    );
    store.set(point, "pos", vec![1.0, 2.0]).unwrap();
    assert!(problems(&store, point).is_empty());
}
