//! Key-based matching between two row collections.
//!
//! Keys are grouping discriminants, not foreign keys: both sides may repeat a
//! key, and every (left, right) pair within a key group is emitted. Lookups go
//! through a hash multimap built over the right side.

use std::collections::HashMap;
use std::hash::Hash;

/// Join semantics.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JoinMode {
    /// Only matched pairs.
    Inner,
    /// Matched pairs plus one row per unmatched left row with an absent right side.
    LeftOuter,
}

/// One combined output row.
///
/// `right` is `None` only for unmatched left rows of a left-outer join. It is an
/// explicit absence marker: reducers decide per field what absence means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joined<'a, L, R> {
    /// Position of `left` in the left input, for de-duplicating fan-out.
    pub left_index: usize,
    pub left: &'a L,
    pub right: Option<&'a R>,
}

impl<L, R> Joined<'_, L, R> {
    pub fn is_matched(&self) -> bool {
        self.right.is_some()
    }
}

fn index_right<R, K, FR>(right: &[R], right_key: FR) -> HashMap<K, Vec<usize>>
where
    K: Eq + Hash,
    FR: Fn(&R) -> Option<K>,
{
    let mut index: HashMap<K, Vec<usize>> = HashMap::new();
    for (i, r) in right.iter().enumerate() {
        // Null keys never match, including each other.
        if let Some(k) = right_key(r) {
            index.entry(k).or_default().push(i);
        }
    }
    index
}

/// Join `left` to `right` on equal non-null keys.
///
/// Output follows left input order; within one left row, matches follow right
/// input order. Never fails; empty inputs yield empty output.
pub fn join<'a, L, R, K, FL, FR>(
    left: &'a [L],
    right: &'a [R],
    left_key: FL,
    right_key: FR,
    mode: JoinMode,
) -> Vec<Joined<'a, L, R>>
where
    K: Eq + Hash,
    FL: Fn(&L) -> Option<K>,
    FR: Fn(&R) -> Option<K>,
{
    let index = index_right(right, right_key);
    let mut out = Vec::with_capacity(left.len());

    for (left_index, l) in left.iter().enumerate() {
        let matches = left_key(l).and_then(|k| index.get(&k));
        match matches {
            Some(positions) => {
                out.extend(positions.iter().map(|&j| Joined {
                    left_index,
                    left: l,
                    right: Some(&right[j]),
                }));
            }
            None if mode == JoinMode::LeftOuter => out.push(Joined {
                left_index,
                left: l,
                right: None,
            }),
            None => {}
        }
    }

    tracing::trace!(
        left = left.len(),
        right = right.len(),
        joined = out.len(),
        ?mode,
        "join evaluated"
    );
    out
}

/// Left rows with at least one match in `right` (existence check).
///
/// Each left row appears at most once regardless of how many matches it has.
pub fn semi_join<'a, L, R, K, FL, FR>(
    left: &'a [L],
    right: &[R],
    left_key: FL,
    right_key: FR,
) -> Vec<&'a L>
where
    K: Eq + Hash,
    FL: Fn(&L) -> Option<K>,
    FR: Fn(&R) -> Option<K>,
{
    let index = index_right(right, right_key);
    left.iter()
        .filter(|&l| left_key(l).is_some_and(|k| index.contains_key(&k)))
        .collect()
}

/// Left rows with zero matches in `right`.
///
/// Rows with a null key have no matches and are always kept.
pub fn anti_join<'a, L, R, K, FL, FR>(
    left: &'a [L],
    right: &[R],
    left_key: FL,
    right_key: FR,
) -> Vec<&'a L>
where
    K: Eq + Hash,
    FL: Fn(&L) -> Option<K>,
    FR: Fn(&R) -> Option<K>,
{
    let index = index_right(right, right_key);
    left.iter()
        .filter(|&l| !left_key(l).is_some_and(|k| index.contains_key(&k)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Row = (Option<u8>, u32);

    fn key(r: &Row) -> Option<u8> {
        r.0
    }

    #[test]
    fn inner_join_fans_out_within_key_groups() {
        let left: Vec<Row> = vec![(Some(1), 10), (Some(1), 11), (Some(2), 20)];
        let right: Vec<Row> = vec![(Some(1), 100), (Some(1), 101), (Some(3), 300)];

        let out = join(&left, &right, key, key, JoinMode::Inner);
        let pairs: Vec<(u32, u32)> = out
            .iter()
            .map(|j| (j.left.1, j.right.unwrap().1))
            .collect();
        assert_eq!(pairs, vec![(10, 100), (10, 101), (11, 100), (11, 101)]);
    }

    #[test]
    fn left_outer_marks_unmatched_rows_absent() {
        let left: Vec<Row> = vec![(Some(1), 10), (Some(2), 20)];
        let right: Vec<Row> = vec![(Some(1), 100)];

        let out = join(&left, &right, key, key, JoinMode::LeftOuter);
        assert_eq!(out.len(), 2);
        assert!(out[0].is_matched());
        assert_eq!(out[1].left_index, 1);
        assert!(out[1].right.is_none());
    }

    #[test]
    fn null_keys_never_match_each_other() {
        let left: Vec<Row> = vec![(None, 1)];
        let right: Vec<Row> = vec![(None, 2)];

        assert!(join(&left, &right, key, key, JoinMode::Inner).is_empty());
        let outer = join(&left, &right, key, key, JoinMode::LeftOuter);
        assert_eq!(outer.len(), 1);
        assert!(outer[0].right.is_none());
        assert_eq!(anti_join(&left, &right, key, key).len(), 1);
        assert!(semi_join(&left, &right, key, key).is_empty());
    }

    #[test]
    fn semi_join_does_not_duplicate_left_rows() {
        let left: Vec<Row> = vec![(Some(1), 10), (Some(2), 20)];
        let right: Vec<Row> = vec![(Some(1), 100), (Some(1), 101), (Some(1), 102)];

        let kept = semi_join(&left, &right, key, key);
        assert_eq!(kept, vec![&(Some(1), 10)]);
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        let empty: Vec<Row> = Vec::new();
        let right: Vec<Row> = vec![(Some(1), 1)];
        assert!(join(&empty, &right, key, key, JoinMode::LeftOuter).is_empty());
        assert!(join(&right, &empty, key, key, JoinMode::Inner).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: outer minus inner cardinality equals the number of left
        /// rows without any match.
        #[test]
        fn outer_exceeds_inner_by_unmatched_left_rows(
            left in prop::collection::vec((prop::option::of(0u8..6), any::<u32>()), 0..30),
            right in prop::collection::vec((prop::option::of(0u8..6), any::<u32>()), 0..30),
        ) {
            let inner = join(&left, &right, key, key, JoinMode::Inner).len();
            let outer = join(&left, &right, key, key, JoinMode::LeftOuter).len();
            let unmatched = anti_join(&left, &right, key, key).len();

            prop_assert!(inner <= outer);
            prop_assert_eq!(outer - inner, unmatched);
            prop_assert_eq!(
                semi_join(&left, &right, key, key).len() + unmatched,
                left.len()
            );
        }
    }
}
