use crate::common::{Error, Result};
use crate::types::{DataType, Field, Schema};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice::Iter;

/// The location of a record: a block number and a slot within that block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecId {
    block: usize,
    slot: usize,
}

impl RecId {
    pub fn new(block: usize, slot: usize) -> RecId {
        RecId { block, slot }
    }

    pub fn block(&self) -> usize {
        self.block
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for RecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.slot)
    }
}

/// An ordered, fixed-length sequence of attribute values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    values: Vec<Field>,
}

impl From<Vec<Field>> for Record {
    fn from(values: Vec<Field>) -> Self {
        Record { values }
    }
}

impl IntoIterator for Record {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl Record {
    pub fn iter(&self) -> Iter<Field> {
        self.values.iter()
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn get_field(&self, index: usize) -> Result<&Field> {
        self.values.get(index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "field {index} out of bounds for a record of {} fields",
                self.values.len()
            ))
        })
    }

    /// Builds a narrower record from the fields at `offsets`, in that order.
    pub fn project(&self, offsets: &[usize]) -> Result<Record> {
        let values = offsets
            .iter()
            .map(|&offset| self.get_field(offset).cloned())
            .collect::<Result<Vec<Field>>>()?;
        Ok(Record::from(values))
    }

    /// Checks that the record has one field per attribute and that every
    /// field's variant matches its attribute's declared type.
    pub fn conforms_to(&self, schema: &Schema) -> Result<()> {
        if self.values.len() != schema.attr_count() {
            return Err(Error::AttributeCountMismatch {
                expected: schema.attr_count(),
                actual: self.values.len(),
            });
        }
        for (value, attribute) in self.values.iter().zip(schema.iter()) {
            if value.get_type() != attribute.data_type() {
                return Err(Error::AttributeTypeMismatch(format!(
                    "attribute '{}' is {}, got {}",
                    attribute.name(),
                    attribute.data_type(),
                    value.get_type()
                )));
            }
        }
        Ok(())
    }

    pub fn text_at(&self, index: usize) -> Result<&str> {
        match self.get_field(index)? {
            Field::Text(s) => Ok(s.as_str()),
            field => Err(Error::InvalidData(format!(
                "field {index} is {}, expected {}",
                field.get_type(),
                DataType::Text
            ))),
        }
    }

    pub fn number_at(&self, index: usize) -> Result<f64> {
        match self.get_field(index)? {
            Field::Number(n) => Ok(*n),
            field => Err(Error::InvalidData(format!(
                "field {index} is {}, expected {}",
                field.get_type(),
                DataType::Number
            ))),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values.iter().join(", "))
    }
}
