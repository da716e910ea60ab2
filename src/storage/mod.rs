pub mod catalog;
pub mod cursor;
pub mod engine;
mod heap;
mod memory;
pub mod record;

#[cfg(test)]
mod tests;

pub use catalog::{AttrCatEntry, RelCatEntry};
pub use cursor::{CursorPosition, ScanCursor};
pub use engine::{BlockAccess, CatalogCache, RelId, RelationDirectory, SchemaManager, Storage};
pub use memory::MemoryStore;
pub use record::{RecId, Record};
