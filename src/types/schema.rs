use crate::common::constants::{NUMBER_TYPE_CODE, TEXT_TYPE_CODE};
use crate::common::{Error, Result};
use crate::errdata;
use core::ops::Deref;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy, Serialize, Deserialize)]
pub enum DataType {
    Number,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Number => write!(f, "NUM"),
            DataType::Text => write!(f, "STR"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<DataType> {
        match s.to_ascii_uppercase().as_str() {
            "NUM" => Ok(DataType::Number),
            "STR" => Ok(DataType::Text),
            _ => Err(Error::InvalidInput(format!("unknown attribute type '{s}'"))),
        }
    }
}

impl DataType {
    /// The numeric code stored in the attribute catalog's AttributeType column.
    pub fn code(&self) -> f64 {
        match self {
            DataType::Number => NUMBER_TYPE_CODE,
            DataType::Text => TEXT_TYPE_CODE,
        }
    }

    pub fn from_code(code: f64) -> Result<DataType> {
        if code == NUMBER_TYPE_CODE {
            Ok(DataType::Number)
        } else if code == TEXT_TYPE_CODE {
            Ok(DataType::Text)
        } else {
            errdata!("unknown attribute type code {code}")
        }
    }
}

/// One named, typed position in a relation's schema.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Serialize, Deserialize)]
pub struct AttributeSpec {
    name: String,
    data_type: DataType,
}

impl AttributeSpec {
    pub fn new(name: &str, data_type: DataType) -> AttributeSpec {
        AttributeSpec {
            name: name.to_string(),
            data_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl fmt::Display for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.data_type)
    }
}

/// An ordered relation schema. Attribute order is the physical field order of
/// every record in the relation.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Schema {
    attributes: Vec<AttributeSpec>,
}

impl Schema {
    pub fn new() -> Schema {
        Schema {
            attributes: Vec::new(),
        }
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn attr_count(&self) -> usize {
        self.attributes.len()
    }

    // if an attribute exists return its position in the schema
    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.name == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attrs: Vec<String> = self.attributes.iter().map(|a| a.to_string()).collect();
        write!(f, "({})", attrs.join(", "))
    }
}

impl From<Vec<AttributeSpec>> for Schema {
    fn from(attributes: Vec<AttributeSpec>) -> Schema {
        Schema { attributes }
    }
}

impl Deref for Schema {
    type Target = [AttributeSpec];

    fn deref(&self) -> &Self::Target {
        &self.attributes
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    attributes: Vec<AttributeSpec>,
}

impl SchemaBuilder {
    pub fn attribute(&mut self, name: &str, data_type: DataType) -> &mut Self {
        self.attributes.push(AttributeSpec::new(name, data_type));
        self
    }

    pub fn build(&mut self) -> Schema {
        Schema::from(self.attributes.clone())
    }
}
