//! Shared test schema: a small catalog package exercising every feature kind.

#![allow(dead_code)]

use owsmodel_model::{
    ChangeEvent, FeatureBuilder, PackageBuilder, RecordStore, RecordTypeBuilder, Registry,
    RegistryBuilder, StoreConfig,
};
use owsmodel_types::{DataType, Primitive};
use std::sync::{Arc, Mutex};

pub const CAT_NS: &str = "urn:example:catalog";

/// Builder for the catalog package, for tests that extend or break it.
pub fn catalog_package() -> PackageBuilder {
    PackageBuilder::new("catalog", CAT_NS, "cat")
        .datatype(DataType::enumeration("StatusType", &["draft", "published", "retired"]))
        .datatype(DataType::restriction("SkuType", Primitive::String).with_pattern(r"[A-Z]{3}-\d+"))
        .datatype(DataType::list("PointType", Primitive::Double).with_length(Some(2), Some(2)))
        .record(
            RecordTypeBuilder::new("Named")
                .abstract_type()
                .feature(FeatureBuilder::attribute("name", "string").required()),
        )
        .record(
            RecordTypeBuilder::new("Entry")
                .extends("Named")
                .feature(
                    FeatureBuilder::attribute("status", "StatusType")
                        .default_literal("draft")
                        .unsettable(),
                )
                .feature(FeatureBuilder::element("tags", "string").many())
                .feature(FeatureBuilder::attribute("sku", "SkuType"))
                .feature(FeatureBuilder::element("location", "PointType"))
                .feature(FeatureBuilder::attribute("rank", "int"))
                .feature(FeatureBuilder::refers("related", "Entry"))
                .feature(FeatureBuilder::contains("note", "Note"))
                .feature(FeatureBuilder::attribute("summary", "string").derived()),
        )
        .record(
            RecordTypeBuilder::new("SpecialEntry")
                .extends("Entry")
                .feature(FeatureBuilder::attribute("priority", "positiveInteger").read_only()),
        )
        .record(RecordTypeBuilder::new("Note").feature(FeatureBuilder::text("text", "string")))
        .record(
            RecordTypeBuilder::new("Catalog")
                .feature(FeatureBuilder::attribute("title", "string"))
                .feature(FeatureBuilder::contains("entries", "Entry").many())
                .feature(FeatureBuilder::contains("featured", "Entry"))
                .feature(FeatureBuilder::refers("favourites", "Entry").many())
                .feature(FeatureBuilder::contains("sections", "Catalog").many()),
        )
        .record(
            RecordTypeBuilder::new("Document")
                .feature(FeatureBuilder::group("mixed"))
                .feature(FeatureBuilder::contains("catalog", "Catalog").in_group("mixed"))
                .feature(FeatureBuilder::element("comment", "string").many().in_group("mixed"))
                .feature(FeatureBuilder::element("sku", "SkuType").in_group("mixed")),
        )
}

pub fn registry() -> Arc<Registry> {
    Arc::new(
        RegistryBuilder::new()
            .package(catalog_package())
            .build()
            .expect("catalog schema builds"),
    )
}

pub fn store() -> RecordStore {
    RecordStore::new(registry())
}

pub fn store_with(config: StoreConfig) -> RecordStore {
    RecordStore::with_config(registry(), config)
}

pub fn type_id(store: &RecordStore, name: &str) -> owsmodel_types::RecordTypeId {
    store
        .registry()
        .find_record_type(CAT_NS, name)
        .expect("type is registered")
        .id()
}

pub fn create(store: &mut RecordStore, name: &str) -> owsmodel_types::RecordId {
    let id = type_id(store, name);
    store.create(id).expect("record is created")
}

/// Subscribes a store-wide listener that records every event.
pub fn record_events(store: &mut RecordStore) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.subscribe(move |e: &ChangeEvent| sink.lock().unwrap().push(e.clone()));
    events
}

pub fn taken(events: &Arc<Mutex<Vec<ChangeEvent>>>) -> Vec<ChangeEvent> {
    std::mem::take(&mut *events.lock().unwrap())
}
