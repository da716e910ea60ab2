use crate::common::constants::UNKNOWN_COMMAND_MSG;
use crate::common::{Error, Result};
use crate::errinput;
use crate::types::{AttributeSpec, CompareOp, DataType};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*create\s+table\s+([^\s(),;]+)\s*\((.*)\)\s*;?\s*$").unwrap()
});
static DROP_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*drop\s+table\s+([^\s;]+)\s*;?\s*$").unwrap());
static OPEN_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*open\s+table\s+([^\s;]+)\s*;?\s*$").unwrap());
static CLOSE_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*close\s+table\s+([^\s;]+)\s*;?\s*$").unwrap());
static INSERT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*insert\s+into\s+([^\s(),;]+)\s+values\s*\((.*)\)\s*;?\s*$").unwrap()
});
static SELECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^\s*select\s+(.+?)\s+from\s+([^\s;]+)\s+into\s+([^\s;]+)(?:\s+where\s+([^\s<>=!]+)\s*(<=|>=|!=|=|<|>)\s*(.*?))?\s*;?\s*$",
    )
    .unwrap()
});
static PRINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*print\s+([^\s;]+)\s*;?\s*$").unwrap());
static ATTRIBUTE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^\s,]+)\s+([A-Za-z]+)\s*$").unwrap());

/// A single-attribute selection predicate, with the literal still in text form.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub attribute: String,
    pub op: CompareOp,
    pub literal: String,
}

/// A parsed shell command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreateTable {
        name: String,
        attributes: Vec<AttributeSpec>,
    },
    DropTable {
        name: String,
    },
    OpenTable {
        name: String,
    },
    CloseTable {
        name: String,
    },
    Insert {
        name: String,
        values: Vec<String>,
    },
    /// `None` attributes selects every attribute of the source.
    Select {
        source: String,
        target: String,
        attributes: Option<Vec<String>>,
        condition: Option<Condition>,
    },
    Print {
        name: String,
    },
}

impl Command {
    /// Parses one command. Keywords are case-insensitive and a trailing
    /// semicolon is optional.
    pub fn parse(input: &str) -> Result<Command> {
        if let Some(caps) = CREATE_TABLE.captures(input) {
            let attributes = split_list(&caps[2])
                .iter()
                .map(|decl| parse_attribute(decl))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Command::CreateTable {
                name: caps[1].to_string(),
                attributes,
            });
        }
        if let Some(caps) = DROP_TABLE.captures(input) {
            return Ok(Command::DropTable { name: name(&caps) });
        }
        if let Some(caps) = OPEN_TABLE.captures(input) {
            return Ok(Command::OpenTable { name: name(&caps) });
        }
        if let Some(caps) = CLOSE_TABLE.captures(input) {
            return Ok(Command::CloseTable { name: name(&caps) });
        }
        if let Some(caps) = INSERT.captures(input) {
            return Ok(Command::Insert {
                name: name(&caps),
                values: split_list(&caps[2]),
            });
        }
        if let Some(caps) = SELECT.captures(input) {
            return parse_select(&caps);
        }
        if let Some(caps) = PRINT.captures(input) {
            return Ok(Command::Print { name: name(&caps) });
        }
        errinput!("{UNKNOWN_COMMAND_MSG} '{}'", input.trim())
    }
}

fn name(caps: &Captures) -> String {
    caps[1].to_string()
}

/// Splits a comma-separated list, trimming each element.
fn split_list(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        return Vec::new();
    }
    list.split(',').map(|item| item.trim().to_string()).collect()
}

fn parse_attribute(decl: &str) -> Result<AttributeSpec> {
    let caps = ATTRIBUTE_DECL.captures(decl).ok_or_else(|| {
        Error::InvalidInput(format!("expected '<name> STR|NUM', got '{}'", decl))
    })?;
    Ok(AttributeSpec::new(&caps[1], caps[2].parse::<DataType>()?))
}

fn parse_select(caps: &Captures) -> Result<Command> {
    let attributes = match caps[1].trim() {
        "*" => None,
        list => Some(split_list(list)),
    };
    let condition = match (caps.get(4), caps.get(5), caps.get(6)) {
        (Some(attribute), Some(op), Some(literal)) => Some(Condition {
            attribute: attribute.as_str().to_string(),
            op: op.as_str().parse()?,
            literal: literal.as_str().to_string(),
        }),
        _ => None,
    };
    Ok(Command::Select {
        source: caps[2].to_string(),
        target: caps[3].to_string(),
        attributes,
        condition,
    })
}
