//! Error type shared by every layer of the object model.

use crate::RecordId;
use thiserror::Error;

/// Result type alias using the model error type.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by the registry, the record store, the factory and the
/// literal codec.
///
/// None of these are recovered internally; they propagate to the immediate
/// caller unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A record type, datatype or package is not registered.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A feature name does not exist on the record type.
    #[error("unknown feature '{feature}' on {record_type}")]
    UnknownFeature {
        record_type: String,
        feature: String,
    },

    /// The record id does not name a live record in the store.
    #[error("unknown record: {0}")]
    UnknownRecord(RecordId),

    /// Text that is not a valid instance of a datatype.
    #[error("the value '{literal}' is not a valid instance of '{datatype}': {reason}")]
    InvalidLiteral {
        datatype: String,
        literal: String,
        reason: String,
    },

    /// An index past the end of a feature table or a list.
    #[error("index {index} out of range for {target} (count {count})")]
    IndexOutOfRange {
        target: String,
        index: usize,
        count: usize,
    },

    /// The operation is not allowed on this feature or type.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A value does not conform to the declared type of its target.
    #[error("type mismatch on {target}: expected {expected}, found {found}")]
    TypeMismatch {
        target: String,
        expected: String,
        found: String,
    },

    /// Assigning the child would make a record contain itself.
    #[error("containment cycle: {child} is {owner} or one of its containers")]
    ContainmentCycle { owner: RecordId, child: RecordId },

    /// Two schema elements share a name that must be unique.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// A configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ModelError {
    /// Shorthand for [`ModelError::InvalidLiteral`].
    pub fn invalid_literal(
        datatype: impl Into<String>,
        literal: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidLiteral {
            datatype: datatype.into(),
            literal: literal.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ModelError::TypeMismatch`].
    pub fn type_mismatch(
        target: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            target: target.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}
