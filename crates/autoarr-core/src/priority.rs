//! Stable priority ordering over a configurable numeric field.

use crate::error::CoreResult;
use crate::model::{Download, SortOrder};

/// Order downloads by the configured sort field.
///
/// Keys are resolved up front so a missing field fails the whole pass instead of being
/// defaulted. The sort is stable in both directions: equal keys keep their input order.
///
/// # Errors
///
/// Returns [`crate::CoreError::MissingField`] for the first download lacking the sort field.
pub fn prioritize<'a, I>(downloads: I, order: &SortOrder) -> CoreResult<Vec<&'a Download>>
where
    I: IntoIterator<Item = &'a Download>,
{
    let mut keyed = downloads
        .into_iter()
        .map(|download| download.field(&order.field).map(|key| (key, download)))
        .collect::<CoreResult<Vec<_>>>()?;

    if order.descending {
        keyed.sort_by(|(left, _), (right, _)| right.total_cmp(left));
    } else {
        keyed.sort_by(|(left, _), (right, _)| left.total_cmp(right));
    }

    Ok(keyed.into_iter().map(|(_, download)| download).collect())
}
