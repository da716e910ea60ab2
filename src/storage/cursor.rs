use crate::storage::engine::RelId;
use crate::storage::record::RecId;

/// Where a cursor will resume on its next advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorPosition {
    /// Nothing visited yet; the next advance starts at the first record.
    Start,
    /// The last record handed out.
    At(RecId),
    /// The scan ran off the end. Stays exhausted until reset.
    Exhausted,
}

/// A resumable scan position over one open relation, optionally scoped to
/// one attribute for predicate-driven search.
///
/// Cursors are plain values owned by whoever is scanning. Starting a new
/// logical scan means starting a new cursor (or calling `reset`); a cursor is
/// tied to the open instance of its relation and is rejected once that
/// relation has been closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanCursor {
    rel: RelId,
    epoch: u64,
    attribute: Option<(String, usize)>,
    position: CursorPosition,
}

impl ScanCursor {
    /// A whole-record cursor.
    pub fn new(rel: RelId, epoch: u64) -> ScanCursor {
        ScanCursor {
            rel,
            epoch,
            attribute: None,
            position: CursorPosition::Start,
        }
    }

    /// A cursor scoped to the attribute `name` found at `offset`.
    pub fn for_attribute(rel: RelId, epoch: u64, name: &str, offset: usize) -> ScanCursor {
        ScanCursor {
            rel,
            epoch,
            attribute: Some((name.to_string(), offset)),
            position: CursorPosition::Start,
        }
    }

    pub fn rel(&self) -> RelId {
        self.rel
    }

    /// The open-epoch of the relation instance this cursor was started on.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn offset(&self) -> Option<usize> {
        self.attribute.as_ref().map(|(_, offset)| *offset)
    }

    pub fn position(&self) -> CursorPosition {
        self.position
    }

    /// Rewinds the cursor to the first record.
    pub fn reset(&mut self) {
        self.position = CursorPosition::Start;
    }

    pub fn advance_to(&mut self, rid: RecId) {
        self.position = CursorPosition::At(rid);
    }

    pub fn exhaust(&mut self) {
        self.position = CursorPosition::Exhausted;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position == CursorPosition::Exhausted
    }
}
