use crate::common::{Error, Result};
use crate::types::{DataType, Field};

/// Parses a numeric literal. Surrounding whitespace is ignored, and
/// anything else left over after the number invalidates the literal.
fn parse_number(literal: &str) -> Option<f64> {
    literal
        .trim_matches(char::is_whitespace)
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Returns true if the literal holds exactly one finite number.
pub fn is_number(literal: &str) -> bool {
    parse_number(literal).is_some()
}

/// Converts a textual literal into a value of the declared type.
///
/// Text is taken verbatim. It is never truncated, so text longer than an
/// attribute can hold is a type mismatch.
pub fn coerce(literal: &str, data_type: DataType) -> Result<Field> {
    match data_type {
        DataType::Number => parse_number(literal).map(Field::number).ok_or_else(|| {
            Error::AttributeTypeMismatch(format!("'{literal}' is not a number"))
        }),
        DataType::Text => Field::text(literal),
    }
}
