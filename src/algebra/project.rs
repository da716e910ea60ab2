use crate::algebra::lifecycle::populate;
use crate::algebra::resolve;
use crate::common::Result;
use crate::errinput;
use crate::storage::{AttrCatEntry, BlockAccess, RelId, Storage};
use crate::types::AttributeSpec;
use log::trace;

/// Copies every record of `source` into a new relation `target` with the
/// same schema. Returns the number of records copied.
pub fn project<S: Storage>(storage: &mut S, source: &str, target: &str) -> Result<usize> {
    let src = resolve::relation(storage, source)?;
    let schema = resolve::schema_of(storage, src)?;
    populate(storage, target, &schema, |storage, dst| {
        copy_records(storage, src, dst, None)
    })
}

/// Copies the named attributes of every record of `source`, in the order
/// given, into a new relation `target`. All names are resolved before the
/// target is created. Returns the number of records copied.
pub fn project_attributes<S: Storage, N: AsRef<str>>(
    storage: &mut S,
    source: &str,
    target: &str,
    attr_names: &[N],
) -> Result<usize> {
    let src = resolve::relation(storage, source)?;
    if attr_names.is_empty() {
        return errinput!("projection of '{source}' names no attributes");
    }
    let attrs = attr_names
        .iter()
        .map(|name| resolve::attribute_by_name(storage, src, name.as_ref()))
        .collect::<Result<Vec<AttrCatEntry>>>()?;
    let offsets: Vec<usize> = attrs.iter().map(|attr| attr.offset).collect();
    let schema: Vec<AttributeSpec> = attrs.iter().map(AttrCatEntry::spec).collect();

    populate(storage, target, &schema, |storage, dst| {
        copy_records(storage, src, dst, Some(&offsets))
    })
}

fn copy_records<S: BlockAccess>(
    storage: &mut S,
    src: RelId,
    dst: RelId,
    offsets: Option<&[usize]>,
) -> Result<usize> {
    let mut cursor = storage.begin_scan(src)?;
    let mut count = 0;
    while let Some(record) = storage.scan_next(&mut cursor)? {
        let record = match offsets {
            Some(offsets) => record.project(offsets)?,
            None => record,
        };
        trace!("project {} -> {}: {}", src, dst, record);
        storage.insert(dst, record)?;
        count += 1;
    }
    Ok(count)
}
