use crate::common::Result;
use crate::storage::catalog::{AttrCatEntry, RelCatEntry};
use crate::storage::cursor::ScanCursor;
use crate::storage::record::{RecId, Record};
use crate::types::{AttributeSpec, CompareOp, Field};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A handle to a relation in the open relation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelId(usize);

impl RelId {
    pub fn new(index: usize) -> RelId {
        RelId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The process-wide table of open relations.
pub trait RelationDirectory {
    /// Returns the handle of an open relation, or `RelationNotOpen`.
    fn rel_id(&self, rel_name: &str) -> Result<RelId>;

    /// Opens a relation, returning its existing handle if it is already open.
    fn open_relation(&mut self, rel_name: &str) -> Result<RelId>;

    /// Closes an open relation. Cursors started on it become stale.
    fn close_relation(&mut self, rel: RelId) -> Result<()>;
}

/// Cached catalog metadata of open relations.
pub trait CatalogCache {
    fn relation_entry(&self, rel: RelId) -> Result<RelCatEntry>;

    /// Looks an attribute up by name, or fails with `AttributeNotFound`.
    fn attribute_by_name(&self, rel: RelId, attr_name: &str) -> Result<AttrCatEntry>;

    /// Looks an attribute up by its position in the schema.
    fn attribute_by_ordinal(&self, rel: RelId, ordinal: usize) -> Result<AttrCatEntry>;
}

/// Record-level access to relations.
pub trait BlockAccess {
    /// Starts a whole-record scan positioned before the first record.
    fn begin_scan(&self, rel: RelId) -> Result<ScanCursor>;

    /// Starts a predicate scan over `attr_name`, positioned before the first record.
    fn begin_search(&self, rel: RelId, attr_name: &str) -> Result<ScanCursor>;

    /// Advances the cursor to the next record, or returns `None` once the
    /// relation is exhausted.
    fn scan_next(&mut self, cursor: &mut ScanCursor) -> Result<Option<Record>>;

    /// Advances an attribute-scoped cursor to the next record satisfying
    /// `attribute <op> value`, or returns `None` once none remain.
    fn search(
        &mut self,
        cursor: &mut ScanCursor,
        value: &Field,
        op: CompareOp,
    ) -> Result<Option<Record>>;

    /// Stores a record in an open relation and returns where it landed.
    fn insert(&mut self, rel: RelId, record: Record) -> Result<RecId>;
}

/// Creation and deletion of relations.
pub trait SchemaManager {
    /// Creates a relation with the given ordered attributes. The new relation is not opened.
    fn create_relation(&mut self, rel_name: &str, attributes: &[AttributeSpec]) -> Result<()>;

    /// Deletes a closed relation along with its records and catalog entries.
    fn delete_relation(&mut self, rel_name: &str) -> Result<()>;
}

/// Everything the relational operators need from the layers below.
pub trait Storage: RelationDirectory + CatalogCache + BlockAccess + SchemaManager {}
/// Blanket implementation of Storage for any `S` providing all four collaborators.
impl<S: RelationDirectory + CatalogCache + BlockAccess + SchemaManager> Storage for S {}
