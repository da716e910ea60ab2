use crate::algebra::coerce::coerce;
use crate::algebra::lifecycle::populate;
use crate::algebra::resolve;
use crate::common::Result;
use crate::storage::Storage;
use crate::types::CompareOp;
use log::trace;

/// Copies every record of `source` satisfying `attr_name <op> literal` into a
/// new relation `target` with the same schema. Records keep their storage
/// order. Returns the number of records selected.
pub fn select<S: Storage>(
    storage: &mut S,
    source: &str,
    target: &str,
    attr_name: &str,
    op: CompareOp,
    literal: &str,
) -> Result<usize> {
    let src = resolve::relation(storage, source)?;
    let attr = resolve::attribute_by_name(storage, src, attr_name)?;
    let value = coerce(literal, attr.attr_type)?;
    let schema = resolve::schema_of(storage, src)?;

    populate(storage, target, &schema, |storage, dst| {
        let mut cursor = storage.begin_search(src, &attr.attr_name)?;
        let mut count = 0;
        while let Some(record) = storage.search(&mut cursor, &value, op)? {
            trace!("select {} {} {}: {}", attr.attr_name, op, value, record);
            storage.insert(dst, record)?;
            count += 1;
        }
        Ok(count)
    })
}
