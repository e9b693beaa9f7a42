//! Literal codec: converts scalar values to and from their XML text form.
//!
//! `parse_literal` and `format_value` are exact inverses over each datatype's
//! value space. Non-textual primitives are whitespace-collapsed before
//! parsing, so `" 42 "` parses but formats back as `"42"`.

use crate::{DataKind, DataType, ModelError, ModelResult, Primitive, Value};

impl DataType {
    /// Parses XML text into a value of this datatype.
    pub fn parse_literal(&self, literal: &str) -> ModelResult<Value> {
        match self.kind() {
            DataKind::Primitive(p) => parse_primitive(*p, literal, self.name()),
            DataKind::Enumeration(e) => e
                .by_literal(literal)
                .cloned()
                .map(Value::Enum)
                .ok_or_else(|| {
                    ModelError::invalid_literal(self.name(), literal, "not a valid enumerator")
                }),
            DataKind::List(item) => literal
                .split_ascii_whitespace()
                .map(|token| parse_primitive(*item, token, self.name()))
                .collect::<ModelResult<Vec<_>>>()
                .map(Value::List),
        }
    }

    /// Formats a value of this datatype as XML text.
    pub fn format_value(&self, value: &Value) -> ModelResult<String> {
        if !self.conforms(value) {
            return Err(ModelError::type_mismatch(
                "literal conversion",
                self.name(),
                value.kind_name(),
            ));
        }
        Ok(match (self.kind(), value) {
            (DataKind::Enumeration(_), Value::Enum(lit)) => lit.literal.clone(),
            (DataKind::List(_), Value::List(items)) => items
                .iter()
                .map(format_primitive)
                .collect::<Vec<_>>()
                .join(" "),
            (_, v) => format_primitive(v),
        })
    }
}

fn parse_primitive(primitive: Primitive, literal: &str, datatype: &str) -> ModelResult<Value> {
    let token = literal.trim_matches(|c: char| c.is_ascii_whitespace());
    let invalid = |reason: &str| ModelError::invalid_literal(datatype, literal, reason);
    match primitive {
        Primitive::String | Primitive::AnyUri | Primitive::Language => {
            Ok(Value::String(literal.to_owned()))
        }
        Primitive::Boolean => match token {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid("expected true, false, 1 or 0")),
        },
        Primitive::Int => token
            .parse::<i32>()
            .map(|i| Value::Int(i64::from(i)))
            .map_err(|e| invalid(&e.to_string())),
        Primitive::Long => token
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| invalid(&e.to_string())),
        Primitive::NonNegativeInteger | Primitive::PositiveInteger => {
            let i = token.parse::<i64>().map_err(|e| invalid(&e.to_string()))?;
            let min = if primitive == Primitive::PositiveInteger { 1 } else { 0 };
            if i < min {
                return Err(invalid(&format!("must be at least {min}")));
            }
            Ok(Value::Int(i))
        }
        Primitive::Double => parse_double(token)
            .map(Value::Double)
            .ok_or_else(|| invalid("not a double")),
    }
}

/// XML Schema double: decimal or scientific notation, `INF`, `-INF`, `NaN`.
/// Rust's own spellings (`inf`, `infinity`, `nan`) are rejected.
fn parse_double(token: &str) -> Option<f64> {
    match token {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if token.is_empty() => None,
        _ if token
            .chars()
            .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))) =>
        {
            None
        }
        _ => token.parse::<f64>().ok(),
    }
}

fn format_double(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_owned()
    } else if d == f64::INFINITY {
        "INF".to_owned()
    } else if d == f64::NEG_INFINITY {
        "-INF".to_owned()
    } else {
        // Debug keeps the fraction on whole numbers: 1.0 formats as "1.0", not "1".
        format!("{d:?}")
    }
}

fn format_primitive(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => format_double(*d),
        Value::Enum(lit) => lit.literal.clone(),
        // conformance has already been checked by the caller
        other => other.kind_name().to_owned(),
    }
}
