use crate::common::Result;
use crate::config::config::MAX_TEXT_LEN;
use crate::storage::{BlockAccess, RecId, Record, RelId};
use crate::types::{DataType, Field, Schema};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

/// A deterministic generator, so failing tests can be replayed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Builds a record conforming to `schema` with random values.
/// Numbers are whole, text is alphanumeric and always fits an attribute.
pub fn create_random_record<R: Rng>(schema: &Schema, rng: &mut R) -> Result<Record> {
    schema
        .iter()
        .map(|attr| match attr.data_type() {
            DataType::Number => Ok(Field::number(rng.gen_range(-10_000..10_000) as f64)),
            DataType::Text => {
                let len = rng.gen_range(1..=MAX_TEXT_LEN);
                let text: String = (0..len).map(|_| rng.sample(Alphanumeric) as char).collect();
                Field::text(&text)
            }
        })
        .collect::<Result<Vec<_>>>()
        .map(Record::from)
}

/// Inserts `n` random records into an open relation, returning where each landed.
pub fn create_n_records<S: BlockAccess>(
    n: usize,
    storage: &mut S,
    rel: RelId,
    schema: &Schema,
    seed: u64,
) -> Result<Vec<(RecId, Record)>> {
    let mut rng = seeded_rng(seed);
    (0..n)
        .map(|_| {
            let record = create_random_record(schema, &mut rng)?;
            Ok((storage.insert(rel, record.clone())?, record))
        })
        .collect()
}
