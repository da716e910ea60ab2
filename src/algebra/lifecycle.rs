use crate::common::Result;
use crate::storage::{RelId, SchemaManager, Storage};
use crate::types::AttributeSpec;
use log::{debug, error, warn};

/// Creates `target`, opens it and hands it to `fill`.
///
/// On success the target is closed and the count reported by `fill` is
/// returned. If opening, filling or the final close fails the target is closed
/// (when open) and deleted, and the original error is returned. Cleanup
/// failures are logged and do not replace that error.
pub(crate) fn populate<S, F>(
    storage: &mut S,
    target: &str,
    attributes: &[AttributeSpec],
    fill: F,
) -> Result<usize>
where
    S: Storage,
    F: FnOnce(&mut S, RelId) -> Result<usize>,
{
    storage.create_relation(target, attributes)?;

    let rel = match storage.open_relation(target) {
        Ok(rel) => rel,
        Err(err) => {
            warn!("could not open target '{}': {}", target, err);
            discard(storage, target);
            return Err(err);
        }
    };
    debug!("populating target '{}' ({})", target, rel);

    match fill(storage, rel) {
        Ok(count) => {
            if let Err(err) = storage.close_relation(rel) {
                warn!("could not close target '{}', rolling back: {}", target, err);
                discard(storage, target);
                return Err(err);
            }
            debug!("target '{}' closed with {} records", target, count);
            Ok(count)
        }
        Err(err) => {
            warn!("populating '{}' failed, rolling back: {}", target, err);
            if let Err(close_err) = storage.close_relation(rel) {
                error!("could not close '{}' during rollback: {}", target, close_err);
            }
            discard(storage, target);
            Err(err)
        }
    }
}

fn discard<S: SchemaManager>(storage: &mut S, target: &str) {
    match storage.delete_relation(target) {
        Ok(()) => debug!("deleted target '{}'", target),
        Err(err) => error!("could not delete '{}' during rollback: {}", target, err),
    }
}
