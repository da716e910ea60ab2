use crate::common::{Error, Result};
use crate::config::config::MAX_TEXT_LEN;
use crate::types::DataType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A text value no longer than `MAX_TEXT_LEN` bytes.
///
/// The only way to build one is the checked constructor, so an oversized
/// string is rejected rather than truncated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoundedString(String);

impl BoundedString {
    pub fn new(value: &str) -> Result<BoundedString> {
        match value.len() <= MAX_TEXT_LEN {
            true => Ok(BoundedString(value.to_string())),
            false => Err(Error::AttributeTypeMismatch(format!(
                "'{}' is {} bytes long, text attributes hold at most {}",
                value,
                value.len(),
                MAX_TEXT_LEN
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BoundedString {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        BoundedString::new(&value)
    }
}

impl From<BoundedString> for String {
    fn from(value: BoundedString) -> Self {
        value.0
    }
}

impl fmt::Display for BoundedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The value of one attribute in a record.
///
/// Which variant is active is decided by the attribute's declared type; a
/// `Field` stored in a record always agrees with its column's `DataType`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Field {
    Number(f64),
    Text(BoundedString),
}

impl Field {
    pub fn number(value: f64) -> Field {
        Field::Number(value)
    }

    /// Builds a text field, failing if `value` exceeds the attribute size.
    pub fn text(value: &str) -> Result<Field> {
        Ok(Field::Text(BoundedString::new(value)?))
    }

    pub fn get_type(&self) -> DataType {
        match self {
            Field::Number(_) => DataType::Number,
            Field::Text(_) => DataType::Text,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Field::Number(n) => Some(*n),
            Field::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Number(_) => None,
            Field::Text(s) => Some(s.as_str()),
        }
    }

    /// Compares two fields of the same type. Numbers compare numerically,
    /// text compares bytewise. Comparing across types is an error.
    pub fn compare(&self, other: &Field) -> Result<Ordering> {
        match (self, other) {
            (Field::Number(lhs), Field::Number(rhs)) => Ok(lhs.total_cmp(rhs)),
            (Field::Text(lhs), Field::Text(rhs)) => Ok(lhs.as_str().cmp(rhs.as_str())),
            (lhs, rhs) => Err(Error::AttributeTypeMismatch(format!(
                "cannot compare {} with {}",
                lhs.get_type(),
                rhs.get_type()
            ))),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(n) => n.fmt(f),
            Field::Text(s) => s.fmt(f),
        }
    }
}

impl From<f64> for Field {
    fn from(v: f64) -> Self {
        Field::Number(v)
    }
}

impl From<BoundedString> for Field {
    fn from(v: BoundedString) -> Self {
        Field::Text(v)
    }
}
