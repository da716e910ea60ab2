//! Name and ordinal lookups against the catalog cache. Nothing here mutates
//! the store.
use crate::common::Result;
use crate::storage::catalog::is_system_relation;
use crate::storage::{AttrCatEntry, CatalogCache, RelId, RelationDirectory};
use crate::types::AttributeSpec;

/// Resolves an open relation by name.
pub fn relation<S: RelationDirectory>(storage: &S, rel_name: &str) -> Result<RelId> {
    storage.rel_id(rel_name)
}

pub fn attribute_by_name<S: CatalogCache>(
    storage: &S,
    rel: RelId,
    attr_name: &str,
) -> Result<AttrCatEntry> {
    storage.attribute_by_name(rel, attr_name)
}

pub fn attribute_by_ordinal<S: CatalogCache>(
    storage: &S,
    rel: RelId,
    ordinal: usize,
) -> Result<AttrCatEntry> {
    storage.attribute_by_ordinal(rel, ordinal)
}

/// The relation's attributes in declaration order.
pub fn schema_of<S: CatalogCache>(storage: &S, rel: RelId) -> Result<Vec<AttributeSpec>> {
    let num_attrs = storage.relation_entry(rel)?.num_attrs;
    (0..num_attrs)
        .map(|i| attribute_by_ordinal(storage, rel, i).map(|attr| attr.spec()))
        .collect()
}

/// True for the catalog relations, which the operators never write to.
pub fn is_protected(rel_name: &str) -> bool {
    is_system_relation(rel_name)
}
