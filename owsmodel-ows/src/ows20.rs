//! The OWS Common 2.0 package.
//!
//! Feature names are the lower-camel field names; the XML local names
//! (`LowerCorner`, `codeSpace`) are kept in each feature's XML mapping.

use crate::{OWS_NS, XLINK_NS};
use owsmodel_model::{FeatureBuilder, PackageBuilder, RecordTypeBuilder};
use owsmodel_types::{DataType, Primitive};

/// Lexical pattern of `ows:MimeType`.
pub(crate) const MIME_TYPE_PATTERN: &str =
    r"(application|audio|image|text|video|message|multipart|model)/.+(;\s*.+=.+)*";

/// Lexical pattern of `ows:VersionType`.
pub(crate) const VERSION_PATTERN: &str = r"\d+\.\d?\d\.\d?\d";

/// Namespace of the `xml:` attributes (`xml:lang`).
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

pub(crate) fn package() -> PackageBuilder {
    let package = PackageBuilder::new("ows", OWS_NS, "ows")
        .datatype(DataType::enumeration(
            "RangeClosureType",
            &["closed", "open", "open-closed", "closed-open"],
        ))
        .datatype(DataType::restriction("MimeType", Primitive::String).with_pattern(MIME_TYPE_PATTERN))
        .datatype(DataType::list("PositionType", Primitive::Double))
        .datatype(DataType::list("PositionType2D", Primitive::Double).with_length(Some(2), Some(2)))
        .datatype(DataType::restriction("ServiceType", Primitive::String))
        .datatype(DataType::restriction("UpdateSequenceType", Primitive::String))
        .datatype(DataType::restriction("VersionType", Primitive::String).with_pattern(VERSION_PATTERN));

    let package = identification(package);
    let package = geometry(package);
    let package = requests(package);
    let package = exceptions(package);
    document_root(package)
}

/// Free text, codes and the description/identification hierarchy.
fn identification(package: PackageBuilder) -> PackageBuilder {
    package
        .record(
            RecordTypeBuilder::new("LanguageStringType")
                .feature(FeatureBuilder::text("value", "string"))
                .feature(lang()),
        )
        .record(
            RecordTypeBuilder::new("CodeType")
                .feature(FeatureBuilder::text("value", "string"))
                .feature(FeatureBuilder::attribute("codeSpace", "anyURI")),
        )
        .record(
            RecordTypeBuilder::new("KeywordsType")
                .feature(
                    FeatureBuilder::contains("keyword", "LanguageStringType")
                        .many()
                        .at_least(1)
                        .xml_name("Keyword"),
                )
                .feature(FeatureBuilder::contains("type", "CodeType").xml_name("Type")),
        )
        .record(
            RecordTypeBuilder::new("DescriptionType")
                .feature(
                    FeatureBuilder::contains("title", "LanguageStringType")
                        .many()
                        .xml_name("Title"),
                )
                .feature(
                    FeatureBuilder::contains("abstract", "LanguageStringType")
                        .many()
                        .xml_name("Abstract"),
                )
                .feature(
                    FeatureBuilder::contains("keywords", "KeywordsType")
                        .many()
                        .xml_name("Keywords"),
                ),
        )
        .record(
            RecordTypeBuilder::new("BasicIdentificationType")
                .extends("DescriptionType")
                .feature(FeatureBuilder::contains("identifier", "CodeType").xml_name("Identifier"))
                .feature(
                    FeatureBuilder::contains("metadata", "MetadataType")
                        .many()
                        .xml_name("Metadata"),
                ),
        )
        .record(
            RecordTypeBuilder::new("MetadataType")
                .feature(FeatureBuilder::attribute("about", "anyURI"))
                .feature(xlink("actuate", "ActuateType"))
                .feature(xlink("arcrole", "ArcroleType"))
                .feature(xlink("href", "HrefType"))
                .feature(xlink("role", "RoleType"))
                .feature(xlink("show", "ShowType"))
                .feature(xlink("title", "TitleAttrType"))
                .feature(
                    xlink("type", "TypeType")
                        .default_literal("simple")
                        .unsettable(),
                ),
        )
        .record(
            RecordTypeBuilder::new("ServiceIdentificationType")
                .extends("DescriptionType")
                .feature(
                    FeatureBuilder::contains("serviceType", "CodeType")
                        .required()
                        .xml_name("ServiceType"),
                )
                .feature(
                    FeatureBuilder::element("serviceTypeVersion", "VersionType")
                        .many()
                        .at_least(1)
                        .xml_name("ServiceTypeVersion"),
                )
                .feature(FeatureBuilder::element("profile", "anyURI").many().xml_name("Profile"))
                .feature(FeatureBuilder::element("fees", "string").xml_name("Fees"))
                .feature(
                    FeatureBuilder::element("accessConstraints", "string")
                        .many()
                        .xml_name("AccessConstraints"),
                ),
        )
}

/// Bounding boxes and value ranges.
fn geometry(package: PackageBuilder) -> PackageBuilder {
    package
        .record(
            RecordTypeBuilder::new("BoundingBoxType")
                .feature(
                    FeatureBuilder::element("lowerCorner", "PositionType")
                        .required()
                        .xml_name("LowerCorner"),
                )
                .feature(
                    FeatureBuilder::element("upperCorner", "PositionType")
                        .required()
                        .xml_name("UpperCorner"),
                )
                .feature(FeatureBuilder::attribute("crs", "anyURI"))
                .feature(FeatureBuilder::attribute("dimensions", "positiveInteger")),
        )
        .record(RecordTypeBuilder::new("WGS84BoundingBoxType").extends("BoundingBoxType"))
        .record(RecordTypeBuilder::new("ValueType").feature(FeatureBuilder::text("value", "string")))
        .record(
            RecordTypeBuilder::new("RangeType")
                .feature(
                    FeatureBuilder::contains("minimumValue", "ValueType").xml_name("MinimumValue"),
                )
                .feature(
                    FeatureBuilder::contains("maximumValue", "ValueType").xml_name("MaximumValue"),
                )
                .feature(FeatureBuilder::contains("spacing", "ValueType").xml_name("Spacing"))
                .feature(
                    FeatureBuilder::attribute("rangeClosure", "RangeClosureType")
                        .default_literal("closed")
                        .unsettable()
                        .namespace(OWS_NS),
                ),
        )
}

/// GetCapabilities and its negotiation parameters.
fn requests(package: PackageBuilder) -> PackageBuilder {
    package
        .record(
            RecordTypeBuilder::new("AcceptVersionsType").feature(
                FeatureBuilder::element("version", "VersionType")
                    .many()
                    .at_least(1)
                    .xml_name("Version"),
            ),
        )
        .record(
            RecordTypeBuilder::new("SectionsType")
                .feature(FeatureBuilder::element("section", "string").many().xml_name("Section")),
        )
        .record(
            RecordTypeBuilder::new("AcceptFormatsType").feature(
                FeatureBuilder::element("outputFormat", "MimeType")
                    .many()
                    .xml_name("OutputFormat"),
            ),
        )
        .record(
            RecordTypeBuilder::new("AcceptLanguagesType").feature(
                FeatureBuilder::element("language", "language")
                    .many()
                    .at_least(1)
                    .xml_name("Language"),
            ),
        )
        .record(
            RecordTypeBuilder::new("GetCapabilitiesType")
                .feature(
                    FeatureBuilder::contains("acceptVersions", "AcceptVersionsType")
                        .xml_name("AcceptVersions"),
                )
                .feature(FeatureBuilder::contains("sections", "SectionsType").xml_name("Sections"))
                .feature(
                    FeatureBuilder::contains("acceptFormats", "AcceptFormatsType")
                        .xml_name("AcceptFormats"),
                )
                .feature(
                    FeatureBuilder::contains("acceptLanguages", "AcceptLanguagesType")
                        .xml_name("AcceptLanguages"),
                )
                .feature(FeatureBuilder::attribute("updateSequence", "UpdateSequenceType")),
        )
}

fn exceptions(package: PackageBuilder) -> PackageBuilder {
    package
        .record(
            RecordTypeBuilder::new("ExceptionType")
                .feature(
                    FeatureBuilder::element("exceptionText", "string")
                        .many()
                        .xml_name("ExceptionText"),
                )
                .feature(FeatureBuilder::attribute("exceptionCode", "string").required())
                .feature(FeatureBuilder::attribute("locator", "string")),
        )
        .record(
            RecordTypeBuilder::new("ExceptionReportType")
                .feature(
                    FeatureBuilder::contains("exception", "ExceptionType")
                        .many()
                        .at_least(1)
                        .xml_name("Exception"),
                )
                .feature(lang())
                .feature(FeatureBuilder::attribute("version", "VersionType").required()),
        )
}

/// The document root: one mixed group and the global elements projected from it.
fn document_root(package: PackageBuilder) -> PackageBuilder {
    package.record(
        RecordTypeBuilder::new("DocumentRoot")
            .feature(FeatureBuilder::group("mixed"))
            .feature(member_record("abstract", "Abstract", "LanguageStringType"))
            .feature(member_record("title", "Title", "LanguageStringType"))
            .feature(member_record("keywords", "Keywords", "KeywordsType"))
            .feature(member_record("identifier", "Identifier", "CodeType"))
            .feature(member_record("metadata", "Metadata", "MetadataType"))
            .feature(member_record("boundingBox", "BoundingBox", "BoundingBoxType"))
            .feature(member_record("wgs84BoundingBox", "WGS84BoundingBox", "WGS84BoundingBoxType"))
            .feature(member_record("range", "Range", "RangeType"))
            .feature(member_record("getCapabilities", "GetCapabilities", "GetCapabilitiesType"))
            .feature(member_record("exception", "Exception", "ExceptionType"))
            .feature(member_record("exceptionReport", "ExceptionReport", "ExceptionReportType"))
            .feature(member_record(
                "serviceIdentification",
                "ServiceIdentification",
                "ServiceIdentificationType",
            ))
            .feature(member_scalar("outputFormat", "OutputFormat", "MimeType"))
            .feature(member_scalar("language", "Language", "language"))
            .feature(member_scalar("fees", "Fees", "string"))
            .feature(member_scalar("accessConstraints", "AccessConstraints", "string"))
            .feature(
                FeatureBuilder::attribute("rangeClosure", "RangeClosureType")
                    .in_group("mixed")
                    .namespace(OWS_NS),
            ),
    )
}

fn member_record(name: &str, xml_name: &str, target: &str) -> FeatureBuilder {
    FeatureBuilder::contains(name, target)
        .in_group("mixed")
        .xml_name(xml_name)
        .namespace(OWS_NS)
}

fn member_scalar(name: &str, xml_name: &str, datatype: &str) -> FeatureBuilder {
    FeatureBuilder::element(name, datatype)
        .in_group("mixed")
        .xml_name(xml_name)
        .namespace(OWS_NS)
}

fn lang() -> FeatureBuilder {
    FeatureBuilder::attribute("lang", "language").namespace(XML_NS)
}

fn xlink(name: &str, datatype: &str) -> FeatureBuilder {
    FeatureBuilder::attribute(name, &format!("xlink:{datatype}")).namespace(XLINK_NS)
}
