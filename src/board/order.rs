//! Order model for the board.
//!
//! Pure functions over sort keys and column sequences. The engine calls
//! these to place a dragged job, then persists the result through the
//! optimistic mutation controller — nothing here touches state.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::models::{BoardColumn, Job, JobId};

/// Key assigned to the first job in an otherwise empty column, and the
/// spacing used by `renormalize`.
pub const BASE_KEY: f64 = 10.0;

/// Compute a sort key strictly between two neighbors.
///
/// With no `before` neighbor the key lands below `after`; with no `after`
/// neighbor it lands above `before`; with neither it is `BASE_KEY`.
pub fn key_between(before: Option<f64>, after: Option<f64>) -> f64 {
    match (before, after) {
        (Some(b), Some(a)) => (b + a) / 2.0,
        (Some(b), None) => b + BASE_KEY,
        (None, Some(a)) => a / 2.0,
        (None, None) => BASE_KEY,
    }
}

/// Reassign evenly spaced keys (`10, 20, 30, …`) to a column's jobs in
/// their presented order. Run after every reorder so repeated midpoint
/// insertion never exhausts key precision.
pub fn renormalize(ordered_ids: &[JobId]) -> HashMap<JobId, f64> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, BASE_KEY * (i as f64 + 1.0)))
        .collect()
}

/// The fixed column sequence, left to right. The weekend pair sits
/// between Friday and the terminal completed lane and is included only
/// when the board is configured to show it.
pub fn column_sequence(show_weekend: bool) -> Vec<BoardColumn> {
    let mut cols = vec![
        BoardColumn::Prepare,
        BoardColumn::Monday,
        BoardColumn::Tuesday,
        BoardColumn::Wednesday,
        BoardColumn::Thursday,
        BoardColumn::Friday,
    ];
    if show_weekend {
        cols.push(BoardColumn::Saturday);
        cols.push(BoardColumn::Sunday);
    }
    cols.push(BoardColumn::Completed);
    cols
}

/// Array-level reorder for freeform columns: move the element at
/// `from_index` so it ends up at `to_index`. Out-of-range indexes and
/// `from == to` return the input order unchanged.
pub fn move_within_list(ids: &[JobId], from_index: usize, to_index: usize) -> Vec<JobId> {
    let mut out: Vec<JobId> = ids.to_vec();
    if from_index >= out.len() || to_index >= out.len() || from_index == to_index {
        return out;
    }
    let id = out.remove(from_index);
    out.insert(to_index, id);
    out
}

/// Total order within a column: sort key, then creation time, then id.
/// The fallbacks keep rendering deterministic when keys collide.
pub fn compare_jobs(a: &Job, b: &Job) -> Ordering {
    a.sort_key
        .partial_cmp(&b.sort_key)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::board::models::JobStatus;

    fn job(key: f64, created_secs: i64) -> Job {
        Job {
            id: Uuid::new_v4(),
            column: BoardColumn::Monday,
            sort_key: key,
            title: "job".into(),
            address: None,
            formatted_address: None,
            coordinates: None,
            paid: false,
            status: JobStatus::Active,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_key_between_neighbors() {
        assert_eq!(key_between(Some(10.0), Some(20.0)), 15.0);
        assert_eq!(key_between(Some(30.0), None), 40.0);
        assert_eq!(key_between(None, Some(10.0)), 5.0);
        assert_eq!(key_between(None, None), BASE_KEY);
    }

    #[test]
    fn test_key_between_is_strictly_between() {
        let mut lo = 10.0;
        let hi = 20.0;
        // Repeated head insertion keeps producing usable midpoints.
        for _ in 0..20 {
            let k = key_between(Some(lo), Some(hi));
            assert!(k > lo && k < hi);
            lo = k;
        }
    }

    #[test]
    fn test_renormalize_assigns_multiples_of_ten() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let keys = renormalize(&ids);
        assert_eq!(keys[&ids[0]], 10.0);
        assert_eq!(keys[&ids[1]], 20.0);
        assert_eq!(keys[&ids[2]], 30.0);
        assert_eq!(keys[&ids[3]], 40.0);
    }

    #[test]
    fn test_renormalize_preserves_any_permutation() {
        // Relative order in, relative order out; only keys change.
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let mut shuffled = ids.clone();
        shuffled.swap(0, 3);
        shuffled.swap(1, 4);
        let keys = renormalize(&shuffled);
        let mut resorted = shuffled.clone();
        resorted.sort_by(|a, b| keys[a].partial_cmp(&keys[b]).unwrap());
        assert_eq!(resorted, shuffled);
    }

    #[test]
    fn test_column_sequence_weekend_toggle() {
        let weekdays = column_sequence(false);
        assert_eq!(
            weekdays,
            vec![
                BoardColumn::Prepare,
                BoardColumn::Monday,
                BoardColumn::Tuesday,
                BoardColumn::Wednesday,
                BoardColumn::Thursday,
                BoardColumn::Friday,
                BoardColumn::Completed,
            ]
        );
        let full = column_sequence(true);
        assert_eq!(full.len(), 9);
        assert_eq!(full[6], BoardColumn::Saturday);
        assert_eq!(full[7], BoardColumn::Sunday);
        assert_eq!(*full.last().unwrap(), BoardColumn::Completed);
    }

    #[test]
    fn test_move_within_list() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let moved = move_within_list(&ids, 3, 0);
        assert_eq!(moved, vec![ids[3], ids[0], ids[1], ids[2]]);
        let forward = move_within_list(&ids, 0, 2);
        assert_eq!(forward, vec![ids[1], ids[2], ids[0], ids[3]]);
    }

    #[test]
    fn test_move_within_list_noop_cases() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        assert_eq!(move_within_list(&ids, 1, 1), ids);
        assert_eq!(move_within_list(&ids, 7, 0), ids);
    }

    #[test]
    fn test_compare_jobs_breaks_ties_deterministically() {
        // Duplicate keys still yield one unique sequence.
        let a = job(10.0, 100);
        let b = job(10.0, 50);
        assert_eq!(compare_jobs(&b, &a), Ordering::Less);

        let mut c = job(10.0, 100);
        let mut d = job(10.0, 100);
        if c.id > d.id {
            std::mem::swap(&mut c, &mut d);
        }
        assert_eq!(compare_jobs(&c, &d), Ordering::Less);
        assert_eq!(compare_jobs(&d, &c), Ordering::Greater);
    }
}
