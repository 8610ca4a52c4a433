//! Greedy admission of prioritized downloads into the active pool.
//!
//! # Design
//! - Single pass in priority order; earlier decisions are never revisited.
//! - Admission requires `used + size < budget`; an exact fit is rejected.
//! - Idle downloads consume no budget.

use serde::Serialize;

use crate::model::{Bucket, Download};

/// Running byte accounting for one partition pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolBudget {
    /// Capacity in bytes.
    pub limit: u64,
    /// Bytes charged so far (admitted downloads plus reservations).
    pub used: u64,
}

impl PoolBudget {
    /// Start an empty budget.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Charge bytes unconditionally, e.g. for ignored downloads counted against the pool.
    pub const fn reserve(&mut self, size: u64) {
        self.used = self.used.saturating_add(size);
    }

    /// Admit `size` bytes when they fit strictly below the limit.
    pub const fn try_admit(&mut self, size: u64) -> bool {
        let projected = self.used.saturating_add(size);
        if projected < self.limit {
            self.used = projected;
            true
        } else {
            false
        }
    }

    /// Bytes still available before the limit.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

/// Result of partitioning prioritized downloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a> {
    /// Every partitioned download with its bucket, in priority order.
    pub placements: Vec<(&'a Download, Bucket)>,
    /// Final budget accounting.
    pub budget: PoolBudget,
}

impl<'a> Partition<'a> {
    /// Downloads admitted to the active pool, in priority order.
    pub fn active(&self) -> impl Iterator<Item = &'a Download> + '_ {
        self.in_bucket(Bucket::Active)
    }

    /// Downloads rejected to the idle tier, in priority order.
    pub fn idle(&self) -> impl Iterator<Item = &'a Download> + '_ {
        self.in_bucket(Bucket::Idle)
    }

    /// Bucket assigned to a download, matched by identifier.
    #[must_use]
    pub fn bucket_of(&self, id: &str) -> Option<Bucket> {
        self.placements
            .iter()
            .find(|(download, _)| download.id == id)
            .map(|(_, bucket)| *bucket)
    }

    fn in_bucket(&self, wanted: Bucket) -> impl Iterator<Item = &'a Download> + '_ {
        self.placements
            .iter()
            .filter(move |(_, bucket)| *bucket == wanted)
            .map(|(download, _)| *download)
    }
}

/// Partition `ordered` downloads against `budget_bytes`.
///
/// `reserved` downloads (ignored ones, when they count toward the pool) are charged before the
/// ordered pass and never enter a bucket.
#[must_use]
pub fn partition<'a>(
    ordered: &[&'a Download],
    reserved: &[&'a Download],
    budget_bytes: u64,
) -> Partition<'a> {
    let mut budget = PoolBudget::new(budget_bytes);
    for download in reserved {
        budget.reserve(download.size);
    }

    let placements = ordered
        .iter()
        .map(|download| {
            let bucket = if budget.try_admit(download.size) {
                Bucket::Active
            } else {
                Bucket::Idle
            };
            (*download, bucket)
        })
        .collect();

    Partition { placements, budget }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldMap;

    fn sized(id: &str, size: u64) -> Download {
        Download {
            id: id.to_string(),
            name: id.to_string(),
            category: String::new(),
            tags: String::new(),
            content_path: format!("/downloads/{id}"),
            size,
            active: false,
            fields: FieldMap::new(),
        }
    }

    fn ids<'a>(downloads: impl Iterator<Item = &'a Download>) -> Vec<String> {
        downloads.map(|download| download.id.clone()).collect()
    }

    #[test]
    fn later_smaller_item_uses_budget_left_by_rejected_one() {
        let items = [sized("first", 600), sized("second", 500), sized("third", 300)];
        let ordered: Vec<&Download> = items.iter().collect();
        let result = partition(&ordered, &[], 1000);

        assert_eq!(ids(result.active()), ["first", "third"]);
        assert_eq!(ids(result.idle()), ["second"]);
        assert_eq!(result.budget.used, 900);
        assert_eq!(result.bucket_of("second"), Some(Bucket::Idle));
        assert_eq!(result.bucket_of("unknown"), None);
    }

    #[test]
    fn exact_fit_is_rejected() {
        let items = [sized("exact", 1000), sized("fits", 999)];
        let ordered: Vec<&Download> = items.iter().collect();
        let result = partition(&ordered, &[], 1000);

        assert_eq!(ids(result.active()), ["fits"]);
        assert_eq!(ids(result.idle()), ["exact"]);
    }

    #[test]
    fn reserved_bytes_beyond_budget_push_everything_idle() {
        let ignored = sized("ignored", 200);
        let items = [sized("a", 1), sized("b", 0)];
        let ordered: Vec<&Download> = items.iter().collect();
        let result = partition(&ordered, &[&ignored], 100);

        assert_eq!(result.active().count(), 0);
        assert_eq!(ids(result.idle()), ["a", "b"]);
        assert_eq!(result.budget.used, 200);
        assert_eq!(result.budget.remaining(), 0);
    }

    #[test]
    fn active_total_stays_strictly_below_budget() {
        let sizes = [7_u64, 13, 1, 40, 2, 2, 9, 31, 5, 0, 18];
        for limit in [1_u64, 10, 25, 50, 100, 200] {
            let items: Vec<Download> = sizes
                .iter()
                .enumerate()
                .map(|(index, size)| sized(&format!("item-{index}"), *size))
                .collect();
            let ordered: Vec<&Download> = items.iter().collect();
            let result = partition(&ordered, &[], limit);

            let total: u64 = result.active().map(|download| download.size).sum();
            assert!(total < limit, "limit {limit}: active total {total}");

            let mut used = 0;
            for download in &ordered {
                if result.bucket_of(&download.id) == Some(Bucket::Active) {
                    used += download.size;
                } else {
                    assert!(used + download.size >= limit);
                }
            }
        }
    }
}
