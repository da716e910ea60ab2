use crate::common::constants::MISSING_BLOCK_MSG;
use crate::common::{Error, Result};
use crate::storage::catalog::RelCatEntry;
use crate::storage::cursor::CursorPosition;
use crate::storage::record::{RecId, Record};

/// A record block: a fixed number of slots and a link to the next block of
/// the same relation.
#[derive(Debug)]
pub(crate) struct Block {
    slots: Vec<Option<Record>>,
    next: Option<usize>,
}

impl Block {
    fn new(num_slots: usize) -> Block {
        Block {
            slots: vec![None; num_slots],
            next: None,
        }
    }

    fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }
}

/// A fixed-capacity pool of blocks, shared by every relation in the store.
#[derive(Debug)]
pub(crate) struct Disk {
    blocks: Vec<Option<Block>>,
}

impl Disk {
    pub(crate) fn new(num_blocks: usize) -> Disk {
        Disk {
            blocks: (0..num_blocks).map(|_| None).collect(),
        }
    }

    /// Allocates the lowest free block, or fails with `DiskFull`.
    fn allocate(&mut self, num_slots: usize) -> Result<usize> {
        let id = self
            .blocks
            .iter()
            .position(Option::is_none)
            .ok_or(Error::DiskFull)?;
        self.blocks[id] = Some(Block::new(num_slots));
        Ok(id)
    }

    fn release(&mut self, id: usize) {
        if let Some(block) = self.blocks.get_mut(id) {
            *block = None;
        }
    }

    fn block(&self, id: usize) -> Result<&Block> {
        self.blocks
            .get(id)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::InvalidData(format!("{MISSING_BLOCK_MSG} block {id}")))
    }

    fn block_mut(&mut self, id: usize) -> Result<&mut Block> {
        self.blocks
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::InvalidData(format!("{MISSING_BLOCK_MSG} block {id}")))
    }

    pub(crate) fn free_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_none()).count()
    }
}

/// Stores `record` in the first free slot of the relation's block chain,
/// appending a new block when every block is full.
pub(crate) fn insert(disk: &mut Disk, entry: &mut RelCatEntry, record: Record) -> Result<RecId> {
    let mut current = entry.first_block;
    while let Some(id) = current {
        let block = disk.block_mut(id)?;
        if let Some(slot) = block.free_slot() {
            block.slots[slot] = Some(record);
            entry.num_records += 1;
            return Ok(RecId::new(id, slot));
        }
        current = block.next;
    }

    let id = disk.allocate(entry.num_slots_per_block)?;
    match entry.last_block {
        Some(last) => disk.block_mut(last)?.next = Some(id),
        None => entry.first_block = Some(id),
    }
    entry.last_block = Some(id);

    disk.block_mut(id)?.slots[0] = Some(record);
    entry.num_records += 1;
    Ok(RecId::new(id, 0))
}

/// Overwrites the record at `rid` in place.
pub(crate) fn update(disk: &mut Disk, rid: RecId, record: Record) -> Result<()> {
    let slot = slot_mut(disk, rid)?;
    match slot.is_some() {
        true => {
            *slot = Some(record);
            Ok(())
        }
        false => Err(Error::InvalidData(format!("no record at {rid}"))),
    }
}

/// Frees the slot at `rid`.
pub(crate) fn remove(disk: &mut Disk, entry: &mut RelCatEntry, rid: RecId) -> Result<()> {
    let slot = slot_mut(disk, rid)?;
    if slot.take().is_none() {
        return Err(Error::InvalidData(format!("no record at {rid}")));
    }
    entry.num_records -= 1;
    Ok(())
}

/// Returns every block of the chain to the disk.
pub(crate) fn release_chain(disk: &mut Disk, entry: &RelCatEntry) -> Result<usize> {
    let mut released = 0;
    let mut current = entry.first_block;
    while let Some(id) = current {
        current = disk.block(id)?.next;
        disk.release(id);
        released += 1;
    }
    Ok(released)
}

fn slot_mut(disk: &mut Disk, rid: RecId) -> Result<&mut Option<Record>> {
    disk.block_mut(rid.block())?
        .slots
        .get_mut(rid.slot())
        .ok_or_else(|| Error::InvalidData(format!("slot {} out of range", rid)))
}

/// Iterator over the live records of a relation's block chain, in block
/// order then slot order. It does not outlive the disk it reads from.
pub(crate) struct HeapIterator<'a> {
    disk: &'a Disk,
    block: Option<usize>,
    slot: usize,
}

impl<'a> HeapIterator<'a> {
    /// Iterates the whole relation.
    pub(crate) fn new(disk: &'a Disk, entry: &RelCatEntry) -> HeapIterator<'a> {
        HeapIterator {
            disk,
            block: entry.first_block,
            slot: 0,
        }
    }

    /// Iterates the records strictly after the given cursor position.
    pub(crate) fn resume(
        disk: &'a Disk,
        entry: &RelCatEntry,
        position: CursorPosition,
    ) -> HeapIterator<'a> {
        match position {
            CursorPosition::Start => HeapIterator::new(disk, entry),
            CursorPosition::At(rid) => HeapIterator {
                disk,
                block: Some(rid.block()),
                slot: rid.slot() + 1,
            },
            CursorPosition::Exhausted => HeapIterator {
                disk,
                block: None,
                slot: 0,
            },
        }
    }
}

impl<'a> Iterator for HeapIterator<'a> {
    type Item = Result<(RecId, &'a Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.block {
            let block = match self.disk.block(id) {
                Ok(block) => block,
                Err(err) => {
                    self.block = None;
                    return Some(Err(err));
                }
            };
            while self.slot < block.slots.len() {
                let slot = self.slot;
                self.slot += 1;
                if let Some(record) = &block.slots[slot] {
                    return Some(Ok((RecId::new(id, slot), record)));
                }
            }
            // that was the last slot in this block; follow the chain
            self.block = block.next;
            self.slot = 0;
        }
        None
    }
}
