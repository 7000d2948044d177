//! Longest common subsequence over identity keys.
//!
//! The anchors returned here are the items a diff keeps in place. Among all
//! maximal common subsequences the backtrack always takes a match as soon as
//! one is available and otherwise advances in the old sequence, which keeps
//! the contiguous run nearest the start of the new sequence. Identical input
//! always yields the same anchors.

use core::hash::Hash;
use hashbrown::HashSet;

/// Returns the `(old_index, new_index)` pairs of a longest common subsequence
/// of `old` and `new`, in ascending order.
///
/// Keys must be unique within each sequence. Runs in O(n·m) time over the part
/// of the inputs between their common prefix and common suffix, restricted to
/// keys present in both.
pub fn lcs_anchors<K: Eq + Hash>(old: &[K], new: &[K]) -> Vec<(usize, usize)> {
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut anchors: Vec<(usize, usize)> = (0..prefix).map(|i| (i, i)).collect();
    anchors.extend(
        middle_anchors(old_mid, new_mid)
            .into_iter()
            .map(|(i, j)| (i + prefix, j + prefix)),
    );
    let old_tail = old.len() - suffix;
    let new_tail = new.len() - suffix;
    anchors.extend((0..suffix).map(|k| (old_tail + k, new_tail + k)));
    anchors
}

fn middle_anchors<K: Eq + Hash>(old: &[K], new: &[K]) -> Vec<(usize, usize)> {
    if old.is_empty() || new.is_empty() {
        return Vec::new();
    }

    // Only keys present on both sides can ever match.
    let old_keys: HashSet<&K> = old.iter().collect();
    let new_keys: HashSet<&K> = new.iter().collect();
    let a: Vec<usize> = (0..old.len()).filter(|&i| new_keys.contains(&old[i])).collect();
    let b: Vec<usize> = (0..new.len()).filter(|&j| old_keys.contains(&new[j])).collect();
    if a.is_empty() {
        return Vec::new();
    }

    // table[i][j] = LCS length of a[i..] and b[j..]
    let width = b.len() + 1;
    let mut table = vec![0u32; (a.len() + 1) * width];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            table[i * width + j] = if old[a[i]] == new[b[j]] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut anchors = Vec::with_capacity(table[0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if old[a[i]] == new[b[j]] {
            anchors.push((a[i], b[j]));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn anchored(old: &str, new: &str) -> String {
        let old = keys(old);
        lcs_anchors(&old, &keys(new))
            .into_iter()
            .map(|(i, _)| old[i])
            .collect()
    }

    #[test]
    fn test_identical() {
        assert_eq!(anchored("abcd", "abcd"), "abcd");
    }

    #[test]
    fn test_empty_sides() {
        assert!(lcs_anchors::<char>(&[], &keys("abc")).is_empty());
        assert!(lcs_anchors::<char>(&keys("abc"), &[]).is_empty());
        assert!(lcs_anchors::<char>(&[], &[]).is_empty());
    }

    #[test]
    fn test_disjoint() {
        assert!(lcs_anchors(&keys("abc"), &keys("xyz")).is_empty());
    }

    #[test]
    fn test_rotation_keeps_longest_run() {
        assert_eq!(anchored("abc", "bca"), "bc");
        assert_eq!(anchored("abcde", "eabcd"), "abcd");
    }

    #[test]
    fn test_with_prefix_and_suffix() {
        let old = keys("xaby");
        let new = keys("xbay");
        let pairs = lcs_anchors(&old, &new);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], (0, 0));
        assert_eq!(pairs[2], (3, 3));
    }

    #[test]
    fn test_tie_prefers_earliest_run() {
        // Both "ab" and "cd" are maximal; the run at the top of the new order wins.
        assert_eq!(anchored("abcd", "cdab"), "cd");
        assert_eq!(anchored("cdab", "abcd"), "ab");
    }

    #[test]
    fn test_deterministic() {
        let old = keys("qwertyuiop");
        let new = keys("poiuytrewq");
        assert_eq!(lcs_anchors(&old, &new), lcs_anchors(&old, &new));
        assert_eq!(lcs_anchors(&old, &new).len(), 1);
    }

    #[test]
    fn test_pairs_are_matches() {
        let old = keys("hgfedcba");
        let new = keys("abhcdgfe");
        for (i, j) in lcs_anchors(&old, &new) {
            assert_eq!(old[i], new[j]);
        }
    }
}
