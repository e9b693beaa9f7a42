use owsmodel_model::{StoreConfig, ValidationConfig};
use owsmodel_types::ModelError;
use pretty_assertions::assert_eq;
use std::path::Path;

/// Routes the loader's `info!`/`warn!` output to the test harness.
/// Set `RUST_LOG=owsmodel_model=debug` to see it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Writes TOML content to a temp file and returns the directory guard and path.
fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

// ── Defaults ─────────────────────────────────────────────────────

#[test]
fn defaults() {
    let config = StoreConfig::default();
    assert!(config.notify_touch);
    assert_eq!(
        config.validation,
        ValidationConfig {
            check_required: true,
            check_facets: true,
            recursive: true,
            report_dangling: true,
        }
    );
}

#[test]
fn empty_document_is_default() {
    assert_eq!(StoreConfig::from_toml_str("").unwrap(), StoreConfig::default());
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn partial_document_keeps_other_defaults() {
    let config = StoreConfig::from_toml_str(
        r#"
notify_touch = false

[validation]
recursive = false
"#,
    )
    .unwrap();
    assert!(!config.notify_touch);
    assert!(!config.validation.recursive);
    assert!(config.validation.check_required);
    assert!(config.validation.report_dangling);
}

#[test]
fn wrong_type_is_a_config_error() {
    let err = StoreConfig::from_toml_str("notify_touch = \"yes\"").unwrap_err();
    assert!(matches!(err, ModelError::Config(_)));
}

// ── Files ────────────────────────────────────────────────────────

#[test]
fn load_from_missing_file_uses_defaults() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::load_from(&dir.path().join("nonexistent.toml"));
    assert_eq!(config, StoreConfig::default());
}

#[test]
fn load_from_file() {
    let (_dir, path) = write_config("notify_touch = false\n");
    assert!(!StoreConfig::load_from(&path).notify_touch);
}

#[test]
fn load_from_malformed_file_falls_back() {
    init_tracing();
    let (_dir, path) = write_config("[validation\nrecursive = ");
    assert_eq!(StoreConfig::load_from(&path), StoreConfig::default());
}

#[test]
fn try_load_from_reports_errors() {
    let (_dir, path) = write_config("[validation\nrecursive = ");
    assert!(matches!(StoreConfig::try_load_from(&path), Err(ModelError::Config(_))));
    assert!(matches!(
        StoreConfig::try_load_from(Path::new("/definitely/not/here.toml")),
        Err(ModelError::Config(_))
    ));
}

#[test]
fn config_roundtrips_through_toml() {
    let config = StoreConfig {
        notify_touch: false,
        validation: ValidationConfig {
            check_facets: false,
            ..ValidationConfig::default()
        },
    };
    let text = toml::to_string(&config).unwrap();
    assert_eq!(StoreConfig::from_toml_str(&text).unwrap(), config);
}
