//! Levenshtein edit distance.
//!
//! Used by the category matcher to tolerate misspelled or inflected query
//! terms ("enviroment", "childrens") against catalog category labels.

use std::cmp::min;

/// Number of single-character insertions, deletions or substitutions needed
/// to turn `s1` into `s2`. Counts characters, not bytes.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let b: Vec<char> = s2.chars().collect();
    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, ca) in s1.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr_row[j + 1] = min(
                min(
                    prev_row[j + 1] + 1, // deletion
                    curr_row[j] + 1,     // insertion
                ),
                prev_row[j] + cost, // substitution
            );
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

/// Levenshtein distance with early termination.
///
/// Returns `None` as soon as the distance is known to exceed `threshold`.
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.len().abs_diff(b.len()) > threshold {
        return None;
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        let mut min_in_row = curr_row[0];

        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr_row[j + 1] = min(min(prev_row[j + 1] + 1, curr_row[j] + 1), prev_row[j] + cost);
            min_in_row = min(min_in_row, curr_row[j + 1]);
        }

        if min_in_row > threshold {
            return None;
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[b.len()];
    (distance <= threshold).then_some(distance)
}

/// Similarity of a term to a candidate at distance `distance`:
/// `1 - distance / (term_len + 1)`.
pub fn edit_similarity(distance: usize, term_len: usize) -> f64 {
    1.0 - distance as f64 / (term_len as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("hello", ""), 5);
        assert_eq!(levenshtein_distance("", "world"), 5);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("enviroment", "environment"), 1);
        assert_eq!(levenshtein_distance("café", "cafe"), 1);
    }

    #[test]
    fn test_levenshtein_distance_threshold() {
        assert_eq!(levenshtein_distance_threshold("kitten", "sitting", 3), Some(3));
        assert_eq!(levenshtein_distance_threshold("kitten", "sitting", 2), None);
        assert_eq!(levenshtein_distance_threshold("health", "wealth", 1), Some(1));
        assert_eq!(levenshtein_distance_threshold("a", "abcdef", 2), None);
        assert_eq!(levenshtein_distance_threshold("", "ab", 2), Some(2));
    }

    #[test]
    fn test_edit_similarity() {
        assert!((edit_similarity(0, 6) - 1.0).abs() < 1e-12);
        assert!((edit_similarity(1, 9) - 0.9).abs() < 1e-12);
    }
}
