//! Enumeration of every ordered bitfield partition of a register width.
//!
//! Used to synthesize exhaustive test fixtures: the demo device builds one
//! register per partition of 8.

use std::collections::BTreeSet;

/// Returns every ordered sequence of positive widths summing to `total`.
///
/// Works in three stages: a pruned subset-sum search collects the unordered
/// multisets, each multiset is expanded into its distinct permutations, and
/// all permutations are merged into one ordered set. `total == 0` yields the
/// empty set.
#[must_use]
pub fn enumerate_partitions(total: u8) -> BTreeSet<Vec<u8>> {
    let pool = summand_pool(total);
    let mut multisets = Vec::new();
    collect_subset_sums(&pool, 0, total, &mut Vec::new(), 0, &mut multisets);

    multisets
        .iter()
        .flat_map(|multiset| distinct_permutations(multiset))
        .collect()
}

/// Candidate summands for `total`: each `k` in `1..=total`, repeated as often
/// as it can appear in a sum.
fn summand_pool(total: u8) -> Vec<u8> {
    (1..=total)
        .flat_map(|summand| std::iter::repeat_n(summand, usize::from(total / summand)))
        .collect()
}

/// Depth-first subset-sum search over a sorted pool.
///
/// Equal summands at the same depth are tried once, so every multiset is
/// emitted exactly once in ascending order.
fn collect_subset_sums(
    pool: &[u8],
    start: usize,
    target: u8,
    partial: &mut Vec<u8>,
    sum: u8,
    out: &mut Vec<Vec<u8>>,
) {
    if sum == target && !partial.is_empty() {
        out.push(partial.clone());
    }
    if sum >= target {
        return;
    }

    for index in start..pool.len() {
        let summand = pool[index];
        if index > start && pool[index - 1] == summand {
            continue;
        }
        if u16::from(sum) + u16::from(summand) > u16::from(target) {
            break;
        }
        partial.push(summand);
        collect_subset_sums(pool, index + 1, target, partial, sum + summand, out);
        partial.pop();
    }
}

/// Every distinct ordering of a multiset, in lexicographic order.
fn distinct_permutations(multiset: &[u8]) -> Vec<Vec<u8>> {
    let mut current = multiset.to_vec();
    current.sort_unstable();
    let mut permutations = vec![current.clone()];
    while next_permutation(&mut current) {
        permutations.push(current.clone());
    }
    permutations
}

/// Advances `items` to its next lexicographic permutation.
///
/// Returns `false` once `items` is the last permutation.
fn next_permutation(items: &mut [u8]) -> bool {
    let Some(pivot) = items.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        return false;
    };
    let Some(successor) = items.iter().rposition(|item| *item > items[pivot]) else {
        return false;
    };
    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::{distinct_permutations, enumerate_partitions, summand_pool};

    #[test]
    fn partitions_of_eight_are_complete() {
        let partitions = enumerate_partitions(8);

        assert_eq!(partitions.len(), 1 << 7);
        assert!(partitions.contains(&vec![1; 8]));
        assert!(partitions.contains(&vec![8]));
        assert!(partitions.contains(&vec![1, 7]));
        assert!(partitions.contains(&vec![7, 1]));
        assert!(partitions
            .iter()
            .all(|widths| widths.iter().map(|w| u32::from(*w)).sum::<u32>() == 8));
        assert!(partitions.iter().all(|widths| !widths.contains(&0)));
    }

    #[test]
    fn small_totals_match_hand_enumeration() {
        let expected: Vec<Vec<u8>> = vec![
            vec![1, 1, 1],
            vec![1, 2],
            vec![2, 1],
            vec![3],
        ];
        assert_eq!(
            enumerate_partitions(3).into_iter().collect::<Vec<_>>(),
            expected
        );
        assert_eq!(enumerate_partitions(1).len(), 1);
    }

    #[test]
    fn zero_total_has_no_partitions() {
        assert!(enumerate_partitions(0).is_empty());
    }

    #[test]
    fn pool_repeats_each_summand_as_often_as_it_fits() {
        assert_eq!(
            summand_pool(8),
            vec![1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 4, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn repeated_summands_collapse_to_distinct_orderings() {
        assert_eq!(
            distinct_permutations(&[2, 1, 1]),
            vec![vec![1, 1, 2], vec![1, 2, 1], vec![2, 1, 1]]
        );
        assert_eq!(distinct_permutations(&[4, 4]), vec![vec![4, 4]]);
    }
}
