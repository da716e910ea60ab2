use crate::algebra::coerce::coerce;
use crate::algebra::resolve;
use crate::common::{Error, Result};
use crate::storage::{RecId, Record, Storage};

/// Inserts one record, given as textual fields, into the open relation
/// `rel_name`. Every field is coerced to its attribute's declared type before
/// storage is touched. Returns where the record was stored.
pub fn insert<S: Storage, V: AsRef<str>>(
    storage: &mut S,
    rel_name: &str,
    num_attrs: usize,
    fields: &[V],
) -> Result<RecId> {
    if resolve::is_protected(rel_name) {
        return Err(Error::OperationNotPermitted(format!(
            "cannot insert into catalog relation '{rel_name}'"
        )));
    }
    let rel = resolve::relation(storage, rel_name)?;

    let expected = storage.relation_entry(rel)?.num_attrs;
    for actual in [num_attrs, fields.len()] {
        if actual != expected {
            return Err(Error::AttributeCountMismatch { expected, actual });
        }
    }

    let values = fields
        .iter()
        .enumerate()
        .map(|(i, literal)| {
            let attr = resolve::attribute_by_ordinal(storage, rel, i)?;
            coerce(literal.as_ref(), attr.attr_type)
        })
        .collect::<Result<Vec<_>>>()?;

    storage.insert(rel, Record::from(values))
}
