use crate::common::constants::CATALOG_CORRUPT_MSG;
use crate::common::{Error, Result};
use crate::config::config::{ATTRCAT_RELNAME, RELCAT_RELNAME};
use crate::storage::record::Record;
use crate::types::{AttributeSpec, DataType, Field, Schema};
use serde::{Deserialize, Serialize};

// RELATIONCAT attribute offsets
const RELCAT_REL_NAME: usize = 0;
const RELCAT_NO_ATTRIBUTES: usize = 1;
const RELCAT_NO_RECORDS: usize = 2;
const RELCAT_FIRST_BLOCK: usize = 3;
const RELCAT_LAST_BLOCK: usize = 4;
const RELCAT_NO_SLOTS: usize = 5;

// ATTRIBUTECAT attribute offsets
const ATTRCAT_REL_NAME: usize = 0;
const ATTRCAT_ATTR_NAME: usize = 1;
const ATTRCAT_ATTR_TYPE: usize = 2;
const ATTRCAT_OFFSET: usize = 3;

/// Block numbers are stored as numbers; an empty chain is stored as -1.
const NO_BLOCK: f64 = -1.0;

/// True for exactly the two relations that hold the catalogs.
/// They may be read like any relation but never mutated through the operators.
pub fn is_system_relation(rel_name: &str) -> bool {
    rel_name == RELCAT_RELNAME || rel_name == ATTRCAT_RELNAME
}

pub fn relcat_schema() -> Schema {
    Schema::builder()
        .attribute("RelName", DataType::Text)
        .attribute("#Attributes", DataType::Number)
        .attribute("#Records", DataType::Number)
        .attribute("FirstBlock", DataType::Number)
        .attribute("LastBlock", DataType::Number)
        .attribute("#Slots", DataType::Number)
        .build()
}

pub fn attrcat_schema() -> Schema {
    Schema::builder()
        .attribute("RelName", DataType::Text)
        .attribute("AttributeName", DataType::Text)
        .attribute("AttributeType", DataType::Number)
        .attribute("Offset", DataType::Number)
        .build()
}

/// A relation catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelCatEntry {
    pub rel_name: String,
    pub num_attrs: usize,
    pub num_records: usize,
    pub first_block: Option<usize>,
    pub last_block: Option<usize>,
    pub num_slots_per_block: usize,
}

impl RelCatEntry {
    pub fn new(rel_name: &str, num_attrs: usize, num_slots_per_block: usize) -> RelCatEntry {
        RelCatEntry {
            rel_name: rel_name.to_string(),
            num_attrs,
            num_records: 0,
            first_block: None,
            last_block: None,
            num_slots_per_block,
        }
    }

    pub fn to_record(&self) -> Result<Record> {
        Ok(Record::from(vec![
            Field::text(&self.rel_name)?,
            Field::number(self.num_attrs as f64),
            Field::number(self.num_records as f64),
            Field::number(block_to_number(self.first_block)),
            Field::number(block_to_number(self.last_block)),
            Field::number(self.num_slots_per_block as f64),
        ]))
    }

    pub fn from_record(record: &Record) -> Result<RelCatEntry> {
        check_arity(record, &relcat_schema())?;
        Ok(RelCatEntry {
            rel_name: record.text_at(RELCAT_REL_NAME)?.to_string(),
            num_attrs: number_to_count(record.number_at(RELCAT_NO_ATTRIBUTES)?)?,
            num_records: number_to_count(record.number_at(RELCAT_NO_RECORDS)?)?,
            first_block: number_to_block(record.number_at(RELCAT_FIRST_BLOCK)?)?,
            last_block: number_to_block(record.number_at(RELCAT_LAST_BLOCK)?)?,
            num_slots_per_block: number_to_count(record.number_at(RELCAT_NO_SLOTS)?)?,
        })
    }
}

/// An attribute catalog entry. Every attribute occupies one fixed-size slot,
/// so an attribute's offset within the record is also its ordinal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttrCatEntry {
    pub rel_name: String,
    pub attr_name: String,
    pub attr_type: DataType,
    pub offset: usize,
}

impl AttrCatEntry {
    pub fn new(rel_name: &str, attr_name: &str, attr_type: DataType, offset: usize) -> Self {
        AttrCatEntry {
            rel_name: rel_name.to_string(),
            attr_name: attr_name.to_string(),
            attr_type,
            offset,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.offset
    }

    pub fn spec(&self) -> AttributeSpec {
        AttributeSpec::new(&self.attr_name, self.attr_type)
    }

    pub fn to_record(&self) -> Result<Record> {
        Ok(Record::from(vec![
            Field::text(&self.rel_name)?,
            Field::text(&self.attr_name)?,
            Field::number(self.attr_type.code()),
            Field::number(self.offset as f64),
        ]))
    }

    pub fn from_record(record: &Record) -> Result<AttrCatEntry> {
        check_arity(record, &attrcat_schema())?;
        Ok(AttrCatEntry {
            rel_name: record.text_at(ATTRCAT_REL_NAME)?.to_string(),
            attr_name: record.text_at(ATTRCAT_ATTR_NAME)?.to_string(),
            attr_type: DataType::from_code(record.number_at(ATTRCAT_ATTR_TYPE)?)?,
            offset: number_to_count(record.number_at(ATTRCAT_OFFSET)?)?,
        })
    }
}

/// Returns the relation name stored in a catalog record of either catalog.
pub(crate) fn owner_of(record: &Record) -> Result<&str> {
    record.text_at(0)
}

fn check_arity(record: &Record, schema: &Schema) -> Result<()> {
    record
        .conforms_to(schema)
        .map_err(|err| Error::InvalidData(format!("{CATALOG_CORRUPT_MSG} {err}")))
}

fn block_to_number(block: Option<usize>) -> f64 {
    block.map_or(NO_BLOCK, |b| b as f64)
}

fn number_to_block(n: f64) -> Result<Option<usize>> {
    if n == NO_BLOCK {
        return Ok(None);
    }
    number_to_count(n).map(Some)
}

fn number_to_count(n: f64) -> Result<usize> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(Error::InvalidData(format!(
            "{CATALOG_CORRUPT_MSG} {n} is not a count"
        )));
    }
    Ok(n as usize)
}
