use crate::common::constants::{ATTRCAT_RELID, RELCAT_RELID, STALE_CURSOR_MSG};
use crate::common::{Error, Result};
use crate::config::config::{ATTRCAT_RELNAME, MAX_TEXT_LEN, RELCAT_RELNAME};
use crate::config::KernelConfig;
use crate::storage::catalog::{
    attrcat_schema, is_system_relation, owner_of, relcat_schema, AttrCatEntry, RelCatEntry,
};
use crate::storage::cursor::ScanCursor;
use crate::storage::heap::{self, Disk, HeapIterator};
use crate::storage::record::{RecId, Record};
use crate::storage::{BlockAccess, CatalogCache, RelId, RelationDirectory, SchemaManager};
use crate::types::{AttributeSpec, CompareOp, Field, Schema};
use log::{debug, trace};
use std::collections::HashSet;

/// A relation in the open relation table, with its cached catalog entries.
#[derive(Debug)]
struct OpenRelation {
    entry: RelCatEntry,
    /// Location of this relation's own RELATIONCAT record.
    relcat_rid: RecId,
    attrs: Vec<AttrCatEntry>,
    schema: Schema,
    epoch: u64,
}

impl OpenRelation {
    fn new(entry: RelCatEntry, relcat_rid: RecId, attrs: Vec<AttrCatEntry>, epoch: u64) -> Self {
        let schema = Schema::from(attrs.iter().map(AttrCatEntry::spec).collect::<Vec<_>>());
        OpenRelation {
            entry,
            relcat_rid,
            attrs,
            schema,
            epoch,
        }
    }
}

/// A volatile block-structured relational store.
///
/// The relation catalog and attribute catalog are ordinary relations kept in
/// the same blocks as user data. They describe themselves and permanently
/// occupy open table slots 0 and 1. Changes to a cached relation entry are
/// written through to its RELATIONCAT record immediately.
#[derive(Debug)]
pub struct MemoryStore {
    config: KernelConfig,
    disk: Disk,
    open: Vec<Option<OpenRelation>>,
    next_epoch: u64,
}

impl MemoryStore {
    /// Creates an empty store holding only the two catalogs.
    pub fn new(config: &KernelConfig) -> Result<MemoryStore> {
        config.validate()?;
        let mut disk = Disk::new(config.disk_blocks);

        let relcat = relcat_schema();
        let attrcat = attrcat_schema();
        let mut relcat_entry = RelCatEntry::new(
            RELCAT_RELNAME,
            relcat.attr_count(),
            config.slots_per_block(relcat.attr_count()),
        );
        let mut attrcat_entry = RelCatEntry::new(
            ATTRCAT_RELNAME,
            attrcat.attr_count(),
            config.slots_per_block(attrcat.attr_count()),
        );

        // The catalog entries count their own records, so write placeholders
        // first and overwrite them once the counts are final.
        let placeholder = relcat_entry.to_record()?;
        let relcat_rid = heap::insert(&mut disk, &mut relcat_entry, placeholder)?;
        let attrcat_rid = heap::insert(&mut disk, &mut relcat_entry, attrcat_entry.to_record()?)?;

        let mut catalog_attrs = Vec::new();
        for (rel_name, schema) in [(RELCAT_RELNAME, &relcat), (ATTRCAT_RELNAME, &attrcat)] {
            let attrs: Vec<AttrCatEntry> = schema
                .iter()
                .enumerate()
                .map(|(offset, a)| AttrCatEntry::new(rel_name, a.name(), a.data_type(), offset))
                .collect();
            for attr in &attrs {
                heap::insert(&mut disk, &mut attrcat_entry, attr.to_record()?)?;
            }
            catalog_attrs.push(attrs);
        }

        heap::update(&mut disk, relcat_rid, relcat_entry.to_record()?)?;
        heap::update(&mut disk, attrcat_rid, attrcat_entry.to_record()?)?;

        let mut open: Vec<Option<OpenRelation>> = (0..config.max_open).map(|_| None).collect();
        let attrcat_attrs = catalog_attrs.pop().unwrap_or_default();
        let relcat_attrs = catalog_attrs.pop().unwrap_or_default();
        open[RELCAT_RELID] = Some(OpenRelation::new(relcat_entry, relcat_rid, relcat_attrs, 0));
        open[ATTRCAT_RELID] = Some(OpenRelation::new(attrcat_entry, attrcat_rid, attrcat_attrs, 1));

        debug!(
            "formatted store: {} blocks of {} bytes, {} open slots",
            config.disk_blocks, config.block_size, config.max_open
        );
        Ok(MemoryStore {
            config: config.clone(),
            disk,
            open,
            next_epoch: 2,
        })
    }

    /// Number of unallocated blocks left on the disk.
    pub fn free_blocks(&self) -> usize {
        self.disk.free_blocks()
    }

    fn slot(&self, rel: RelId) -> Result<&OpenRelation> {
        self.open
            .get(rel.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::RelationNotOpen(rel.to_string()))
    }

    fn catalog(&self, rel_id: usize) -> Result<&OpenRelation> {
        self.slot(RelId::new(rel_id))
    }

    /// Resolves a cursor to its relation, rejecting cursors that outlived a close.
    fn cursor_relation(&self, cursor: &ScanCursor) -> Result<&OpenRelation> {
        let open = self.slot(cursor.rel())?;
        match open.epoch == cursor.epoch() {
            true => Ok(open),
            false => Err(Error::InvalidInput(format!(
                "{STALE_CURSOR_MSG} ({})",
                cursor.rel()
            ))),
        }
    }

    /// Validates and stores a record, then writes the updated entry through
    /// to the relation catalog.
    fn insert_into(&mut self, rel: RelId, record: Record) -> Result<RecId> {
        let open = self
            .open
            .get_mut(rel.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::RelationNotOpen(rel.to_string()))?;
        record.conforms_to(&open.schema)?;
        let rid = heap::insert(&mut self.disk, &mut open.entry, record)?;
        trace!("inserted record {} into {}", rid, open.entry.rel_name);
        self.write_through(rel)?;
        Ok(rid)
    }

    fn write_through(&mut self, rel: RelId) -> Result<()> {
        let open = self.slot(rel)?;
        let (rid, record) = (open.relcat_rid, open.entry.to_record()?);
        heap::update(&mut self.disk, rid, record)?;
        // The relation catalog's own record count may have moved as well.
        if rel.index() != RELCAT_RELID {
            let relcat = self.catalog(RELCAT_RELID)?;
            let (rid, record) = (relcat.relcat_rid, relcat.entry.to_record()?);
            heap::update(&mut self.disk, rid, record)?;
        }
        Ok(())
    }

    fn find_relcat(&self, rel_name: &str) -> Result<Option<(RecId, RelCatEntry)>> {
        let relcat = self.catalog(RELCAT_RELID)?;
        for item in HeapIterator::new(&self.disk, &relcat.entry) {
            let (rid, record) = item?;
            if owner_of(record)? == rel_name {
                return Ok(Some((rid, RelCatEntry::from_record(record)?)));
            }
        }
        Ok(None)
    }

    fn find_attrcat(&self, rel_name: &str) -> Result<Vec<(RecId, AttrCatEntry)>> {
        let attrcat = self.catalog(ATTRCAT_RELID)?;
        let mut attrs = Vec::new();
        for item in HeapIterator::new(&self.disk, &attrcat.entry) {
            let (rid, record) = item?;
            if owner_of(record)? == rel_name {
                attrs.push((rid, AttrCatEntry::from_record(record)?));
            }
        }
        attrs.sort_by_key(|(_, attr)| attr.offset);
        Ok(attrs)
    }

    fn remove_from_catalog(&mut self, catalog: usize, rid: RecId) -> Result<()> {
        let open = self
            .open
            .get_mut(catalog)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::RelationNotOpen(catalog.to_string()))?;
        heap::remove(&mut self.disk, &mut open.entry, rid)?;
        self.write_through(RelId::new(catalog))
    }

    /// Removes every catalog record describing `rel_name`.
    fn remove_catalog_entries(&mut self, rel_name: &str) -> Result<()> {
        if let Some((rid, _)) = self.find_relcat(rel_name)? {
            self.remove_from_catalog(RELCAT_RELID, rid)?;
        }
        for (rid, _) in self.find_attrcat(rel_name)? {
            self.remove_from_catalog(ATTRCAT_RELID, rid)?;
        }
        Ok(())
    }

    fn write_catalog_entries(&mut self, rel_name: &str, attributes: &[AttributeSpec]) -> Result<()> {
        let slots = self.config.slots_per_block(attributes.len());
        let entry = RelCatEntry::new(rel_name, attributes.len(), slots);
        self.insert_into(RelId::new(RELCAT_RELID), entry.to_record()?)?;
        for (offset, attr) in attributes.iter().enumerate() {
            let attr = AttrCatEntry::new(rel_name, attr.name(), attr.data_type(), offset);
            self.insert_into(RelId::new(ATTRCAT_RELID), attr.to_record()?)?;
        }
        Ok(())
    }
}

fn check_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_TEXT_LEN {
        return Err(Error::InvalidInput(format!(
            "{kind} name '{name}' must be 1 to {MAX_TEXT_LEN} bytes long"
        )));
    }
    Ok(())
}

impl RelationDirectory for MemoryStore {
    fn rel_id(&self, rel_name: &str) -> Result<RelId> {
        self.open
            .iter()
            .position(|slot| matches!(slot, Some(open) if open.entry.rel_name == rel_name))
            .map(RelId::new)
            .ok_or_else(|| Error::RelationNotOpen(rel_name.to_string()))
    }

    fn open_relation(&mut self, rel_name: &str) -> Result<RelId> {
        if let Ok(rel) = self.rel_id(rel_name) {
            return Ok(rel);
        }

        let (relcat_rid, entry) = self
            .find_relcat(rel_name)?
            .ok_or_else(|| Error::RelationNotFound(rel_name.to_string()))?;
        let attrs: Vec<AttrCatEntry> = self
            .find_attrcat(rel_name)?
            .into_iter()
            .map(|(_, attr)| attr)
            .collect();
        if attrs.len() != entry.num_attrs {
            return Err(Error::InvalidData(format!(
                "relation '{}' declares {} attributes but the attribute catalog holds {}",
                rel_name,
                entry.num_attrs,
                attrs.len()
            )));
        }

        let index = self
            .open
            .iter()
            .position(Option::is_none)
            .ok_or(Error::CacheFull)?;
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.open[index] = Some(OpenRelation::new(entry, relcat_rid, attrs, epoch));

        let rel = RelId::new(index);
        debug!("opened relation '{}' as {}", rel_name, rel);
        Ok(rel)
    }

    fn close_relation(&mut self, rel: RelId) -> Result<()> {
        if rel.index() == RELCAT_RELID || rel.index() == ATTRCAT_RELID {
            return Err(Error::OperationNotPermitted(
                "the catalog relations cannot be closed".to_string(),
            ));
        }
        let open = self
            .open
            .get_mut(rel.index())
            .and_then(Option::take)
            .ok_or_else(|| Error::RelationNotOpen(rel.to_string()))?;
        debug!("closed relation '{}' ({})", open.entry.rel_name, rel);
        Ok(())
    }
}

impl CatalogCache for MemoryStore {
    fn relation_entry(&self, rel: RelId) -> Result<RelCatEntry> {
        Ok(self.slot(rel)?.entry.clone())
    }

    fn attribute_by_name(&self, rel: RelId, attr_name: &str) -> Result<AttrCatEntry> {
        self.slot(rel)?
            .attrs
            .iter()
            .find(|attr| attr.attr_name == attr_name)
            .cloned()
            .ok_or_else(|| Error::AttributeNotFound(attr_name.to_string()))
    }

    fn attribute_by_ordinal(&self, rel: RelId, ordinal: usize) -> Result<AttrCatEntry> {
        self.slot(rel)?
            .attrs
            .get(ordinal)
            .cloned()
            .ok_or_else(|| Error::AttributeNotFound(format!("#{ordinal}")))
    }
}

impl BlockAccess for MemoryStore {
    fn begin_scan(&self, rel: RelId) -> Result<ScanCursor> {
        Ok(ScanCursor::new(rel, self.slot(rel)?.epoch))
    }

    fn begin_search(&self, rel: RelId, attr_name: &str) -> Result<ScanCursor> {
        let attr = self.attribute_by_name(rel, attr_name)?;
        Ok(ScanCursor::for_attribute(
            rel,
            self.slot(rel)?.epoch,
            &attr.attr_name,
            attr.offset,
        ))
    }

    fn scan_next(&mut self, cursor: &mut ScanCursor) -> Result<Option<Record>> {
        let open = self.cursor_relation(cursor)?;
        let next = HeapIterator::resume(&self.disk, &open.entry, cursor.position())
            .next()
            .transpose()?;
        match next {
            Some((rid, record)) => {
                cursor.advance_to(rid);
                Ok(Some(record.clone()))
            }
            None => {
                cursor.exhaust();
                Ok(None)
            }
        }
    }

    fn search(
        &mut self,
        cursor: &mut ScanCursor,
        value: &Field,
        op: CompareOp,
    ) -> Result<Option<Record>> {
        let offset = cursor.offset().ok_or_else(|| {
            Error::InvalidInput("search needs a cursor scoped to an attribute".to_string())
        })?;
        let open = self.cursor_relation(cursor)?;
        let attr = open
            .attrs
            .get(offset)
            .ok_or_else(|| Error::AttributeNotFound(format!("#{offset}")))?;
        if attr.attr_type != value.get_type() {
            return Err(Error::AttributeTypeMismatch(format!(
                "attribute '{}' is {}, got {}",
                attr.attr_name,
                attr.attr_type,
                value.get_type()
            )));
        }

        for item in HeapIterator::resume(&self.disk, &open.entry, cursor.position()) {
            let (rid, record) = item?;
            if op.evaluate(record.get_field(offset)?, value)? {
                cursor.advance_to(rid);
                return Ok(Some(record.clone()));
            }
        }
        cursor.exhaust();
        Ok(None)
    }

    fn insert(&mut self, rel: RelId, record: Record) -> Result<RecId> {
        if rel.index() == RELCAT_RELID || rel.index() == ATTRCAT_RELID {
            return Err(Error::OperationNotPermitted(
                "records cannot be inserted into the catalog relations".to_string(),
            ));
        }
        self.insert_into(rel, record)
    }
}

impl SchemaManager for MemoryStore {
    fn create_relation(&mut self, rel_name: &str, attributes: &[AttributeSpec]) -> Result<()> {
        check_name("relation", rel_name)?;
        if attributes.is_empty() {
            return Err(Error::InvalidInput(format!(
                "relation '{rel_name}' needs at least one attribute"
            )));
        }
        let mut seen = HashSet::new();
        for attr in attributes {
            check_name("attribute", attr.name())?;
            if !seen.insert(attr.name()) {
                return Err(Error::DuplicateAttribute(attr.name().to_string()));
            }
        }
        if self.config.slots_per_block(attributes.len()) == 0 {
            return Err(Error::InvalidInput(format!(
                "a record of {} attributes does not fit in a {} byte block",
                attributes.len(),
                self.config.block_size
            )));
        }
        if self.find_relcat(rel_name)?.is_some() {
            return Err(Error::RelationExists(rel_name.to_string()));
        }

        if let Err(err) = self.write_catalog_entries(rel_name, attributes) {
            self.remove_catalog_entries(rel_name)?;
            return Err(err);
        }
        debug!("created relation '{}' {}", rel_name, Schema::from(attributes.to_vec()));
        Ok(())
    }

    fn delete_relation(&mut self, rel_name: &str) -> Result<()> {
        if is_system_relation(rel_name) {
            return Err(Error::OperationNotPermitted(format!(
                "the catalog relation '{rel_name}' cannot be deleted"
            )));
        }
        if self.rel_id(rel_name).is_ok() {
            return Err(Error::RelationOpen(rel_name.to_string()));
        }
        let (_, entry) = self
            .find_relcat(rel_name)?
            .ok_or_else(|| Error::RelationNotFound(rel_name.to_string()))?;

        let released = heap::release_chain(&mut self.disk, &entry)?;
        self.remove_catalog_entries(rel_name)?;
        debug!("deleted relation '{}', released {} blocks", rel_name, released);
        Ok(())
    }
}
