//! A small command language over the algebra operators, used by the shell.
mod parser;


pub use parser::{Command, Condition};

use crate::algebra;
use crate::algebra::resolve::schema_of;
use crate::common::constants::TEMP_RELNAME;
use crate::common::Result;
use crate::storage::{RecId, Record, RelId, Storage};
use crate::types::AttributeSpec;
use log::{debug, error};

/// The outcome of one executed command.
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    Created { name: String },
    Dropped { name: String },
    Opened { name: String, rel: RelId },
    Closed { name: String },
    Inserted { name: String, rid: RecId },
    /// Records written into a new target relation by select or project.
    Selected { target: String, count: usize },
    Printed {
        name: String,
        attributes: Vec<AttributeSpec>,
        records: Vec<Record>,
    },
}

/// Executes textual commands against a store.
pub struct Frontend<S: Storage> {
    storage: S,
}

impl<S: Storage> Frontend<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Parses and executes one command.
    pub fn execute(&mut self, input: &str) -> Result<CommandResult> {
        let command = Command::parse(input)?;
        debug!("executing {:?}", command);
        self.dispatch(command)
    }

    fn dispatch(&mut self, command: Command) -> Result<CommandResult> {
        let storage = &mut self.storage;
        Ok(match command {
            Command::CreateTable { name, attributes } => {
                storage.create_relation(&name, &attributes)?;
                CommandResult::Created { name }
            }
            Command::DropTable { name } => {
                storage.delete_relation(&name)?;
                CommandResult::Dropped { name }
            }
            Command::OpenTable { name } => {
                let rel = storage.open_relation(&name)?;
                CommandResult::Opened { name, rel }
            }
            Command::CloseTable { name } => {
                let rel = storage.rel_id(&name)?;
                storage.close_relation(rel)?;
                CommandResult::Closed { name }
            }
            Command::Insert { name, values } => {
                let rid = algebra::insert(storage, &name, values.len(), &values)?;
                CommandResult::Inserted { name, rid }
            }
            Command::Select {
                source,
                target,
                attributes,
                condition,
            } => {
                let count = match (attributes, condition) {
                    (None, None) => algebra::project(storage, &source, &target)?,
                    (Some(attrs), None) => {
                        algebra::project_attributes(storage, &source, &target, &attrs)?
                    }
                    (None, Some(cond)) => algebra::select(
                        storage,
                        &source,
                        &target,
                        &cond.attribute,
                        cond.op,
                        &cond.literal,
                    )?,
                    (Some(attrs), Some(cond)) => {
                        select_attributes(storage, &source, &target, &attrs, &cond)?
                    }
                };
                CommandResult::Selected { target, count }
            }
            Command::Print { name } => {
                let rel = storage.rel_id(&name)?;
                let attributes = schema_of(&*storage, rel)?;
                let mut cursor = storage.begin_scan(rel)?;
                let mut records = Vec::new();
                while let Some(record) = storage.scan_next(&mut cursor)? {
                    records.push(record);
                }
                CommandResult::Printed {
                    name,
                    attributes,
                    records,
                }
            }
        })
    }
}

/// Selects into a temporary relation and projects the requested attributes
/// out of it. The temporary relation is closed and deleted on every path.
fn select_attributes<S: Storage>(
    storage: &mut S,
    source: &str,
    target: &str,
    attrs: &[String],
    cond: &Condition,
) -> Result<usize> {
    algebra::select(
        storage,
        source,
        TEMP_RELNAME,
        &cond.attribute,
        cond.op,
        &cond.literal,
    )?;
    let result = storage
        .open_relation(TEMP_RELNAME)
        .and_then(|_| algebra::project_attributes(storage, TEMP_RELNAME, target, attrs));

    if let Ok(rel) = storage.rel_id(TEMP_RELNAME) {
        if let Err(err) = storage.close_relation(rel) {
            error!("could not close '{}': {}", TEMP_RELNAME, err);
        }
    }
    let dropped = storage.delete_relation(TEMP_RELNAME);
    let count = result?;
    dropped?;
    Ok(count)
}
