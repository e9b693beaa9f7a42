use crate::XLINK_NS;
use owsmodel_model::PackageBuilder;
use owsmodel_types::{DataType, Primitive};

pub(crate) fn package() -> PackageBuilder {
    PackageBuilder::new("xlink", XLINK_NS, "xlink")
        .datatype(DataType::enumeration(
            "ActuateType",
            &["onLoad", "onRequest", "other", "none"],
        ))
        .datatype(DataType::enumeration(
            "ShowType",
            &["new", "replace", "embed", "other", "none"],
        ))
        .datatype(DataType::enumeration(
            "TypeType",
            &["simple", "extended", "title", "resource", "locator", "arc"],
        ))
        .datatype(DataType::restriction("HrefType", Primitive::AnyUri))
        .datatype(DataType::restriction("ArcroleType", Primitive::AnyUri).with_length(Some(1), None))
        .datatype(DataType::restriction("RoleType", Primitive::AnyUri).with_length(Some(1), None))
        .datatype(DataType::restriction("TitleAttrType", Primitive::String))
}
