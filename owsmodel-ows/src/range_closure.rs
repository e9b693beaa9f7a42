use owsmodel_types::{EnumLiteral, ModelError, ModelResult, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATATYPE: &str = "RangeClosureType";

/// Which ends of a `RangeType` interval are included.
///
/// Ordinals, constant names and literals match the `ows:RangeClosureType`
/// enumeration of the registry, so conversion to and from [`Value`] is
/// lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangeClosure {
    /// Both bounds included. The schema default.
    #[default]
    Closed,
    /// Neither bound included.
    Open,
    /// Upper bound only.
    OpenClosed,
    /// Lower bound only.
    ClosedOpen,
}

impl RangeClosure {
    pub const ALL: [RangeClosure; 4] = [Self::Closed, Self::Open, Self::OpenClosed, Self::ClosedOpen];

    /// The XML literal, e.g. `open-closed`.
    #[must_use]
    pub const fn literal(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::OpenClosed => "open-closed",
            Self::ClosedOpen => "closed-open",
        }
    }

    /// The constant-style name, e.g. `OPEN_CLOSED`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::OpenClosed => "OPEN_CLOSED",
            Self::ClosedOpen => "CLOSED_OPEN",
        }
    }

    #[must_use]
    pub const fn ordinal(&self) -> i32 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::OpenClosed => 2,
            Self::ClosedOpen => 3,
        }
    }

    #[must_use]
    pub const fn includes_lower(&self) -> bool {
        matches!(self, Self::Closed | Self::ClosedOpen)
    }

    #[must_use]
    pub const fn includes_upper(&self) -> bool {
        matches!(self, Self::Closed | Self::OpenClosed)
    }

    /// Whether `value` lies in the interval from `min` to `max` under this closure.
    #[must_use]
    pub fn contains(&self, min: f64, max: f64, value: f64) -> bool {
        let above = if self.includes_lower() { value >= min } else { value > min };
        let below = if self.includes_upper() { value <= max } else { value < max };
        above && below
    }
}

impl fmt::Display for RangeClosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

impl FromStr for RangeClosure {
    type Err = ModelError;

    /// Matches the literal exactly; constant names are not accepted.
    fn from_str(s: &str) -> ModelResult<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.literal() == s)
            .ok_or_else(|| {
                ModelError::invalid_literal(
                    DATATYPE,
                    s,
                    "expected one of closed, open, open-closed, closed-open",
                )
            })
    }
}

impl From<RangeClosure> for EnumLiteral {
    fn from(c: RangeClosure) -> Self {
        EnumLiteral::new(c.ordinal(), c.name(), c.literal())
    }
}

impl From<RangeClosure> for Value {
    fn from(c: RangeClosure) -> Self {
        Value::Enum(c.into())
    }
}

impl TryFrom<&EnumLiteral> for RangeClosure {
    type Error = ModelError;

    fn try_from(lit: &EnumLiteral) -> ModelResult<Self> {
        lit.literal.parse()
    }
}

impl TryFrom<&Value> for RangeClosure {
    type Error = ModelError;

    fn try_from(value: &Value) -> ModelResult<Self> {
        match value {
            Value::Enum(lit) => lit.try_into(),
            other => Err(ModelError::type_mismatch(DATATYPE, "enum", other.kind_name())),
        }
    }
}
