// RelationDirectory
pub const RELCAT_RELID: usize = 0;
pub const ATTRCAT_RELID: usize = 1;

// AttributeCatalog
pub const NUMBER_TYPE_CODE: f64 = 0.0;
pub const TEXT_TYPE_CODE: f64 = 1.0;

// MemoryStore
pub const CATALOG_CORRUPT_MSG: &str = "Catalog record does not match the catalog schema.";
pub const STALE_CURSOR_MSG: &str = "Scan cursor belongs to a relation that has since been closed.";
pub const MISSING_BLOCK_MSG: &str = "Relation block chain points to an unallocated block.";

// Frontend
pub const TEMP_RELNAME: &str = ".temp";
pub const UNKNOWN_COMMAND_MSG: &str = "Unrecognized command.";
