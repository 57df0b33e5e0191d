//! Block-matching similarity ratio
//!
//! `2 * M / T`, where `M` is the number of characters covered by the matching
//! blocks found by repeatedly taking the longest common block and recursing
//! on both sides of it, and `T` is the combined length of both strings.
//! Comparison is case-insensitive.

use std::collections::HashMap;

/// `b` strings at least this long drop over-frequent characters from the index
const AUTOJUNK_MIN_LEN: usize = 200;

/// Lower-cased, indexed form of the second comparison argument
///
/// Building the index costs one pass over the string, so callers that score
/// one string against many (the catalog) prepare each catalog name once.
#[derive(Debug, Clone)]
pub struct PreparedText {
    chars: Vec<char>,
    /// Ascending positions of each indexed char
    b2j: HashMap<char, Vec<usize>>,
}

impl PreparedText {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.to_lowercase().chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in chars.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        let n = chars.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { chars, b2j }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Similarity of `a` and `b` in [0, 1]
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_prepared(a, &PreparedText::new(b))
}

/// Similarity of `a` against an already prepared `b`
pub fn similarity_prepared(a: &str, b: &PreparedText) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matched_chars(&a, b);
    2.0 * matched as f64 / total as f64
}

/// Total size of all matching blocks
fn matched_chars(a: &[char], b: &PreparedText) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` within the given bounds
///
/// Among equally long blocks the one starting earliest in `a` wins, then the
/// one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &PreparedText,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

    // j2len[j] = length of the block ending at a[i-1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b.b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        j2len = next;
    }

    // Grow the block over equal chars the index skipped (autojunk)
    let b = &b.chars;
    while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_k += 1;
    }
    while best_i + best_k < ahi && best_j + best_k < bhi && a[best_i + best_k] == b[best_j + best_k]
    {
        best_k += 1;
    }

    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_identical_strings_score_one() {
        for s in ["kale", "Almond Milk", "a", "chicken wings & hot sauce"] {
            assert_close(similarity(s, s), 1.0);
        }
    }

    #[test]
    fn test_empty_inputs() {
        assert_close(similarity("", ""), 1.0);
        assert_close(similarity("", "kale"), 0.0);
        assert_close(similarity("kale", ""), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_close(similarity("KALE", "kale"), 1.0);
        assert_close(
            similarity("Almond MILK", "almond milk"),
            similarity("almond milk", "almond milk"),
        );
        assert_close(similarity("Hot Sauce", "KALE"), similarity("hot sauce", "kale"));
    }

    #[test]
    fn test_known_ratios() {
        // Blocks "ab" and "cd": 2 * 4 / 9
        assert_close(similarity("abxcd", "abcd"), 8.0 / 9.0);
        // Blocks "ab" and "cd": 2 * 4 / 12
        assert_close(similarity("qabxcd", "abycdf"), 2.0 / 3.0);
        // Block "bcd": 2 * 3 / 8
        assert_close(similarity("abcd", "bcde"), 0.75);
        // Single shared 'e'
        assert_close(similarity("butter", "kale"), 0.2);
    }

    #[test]
    fn test_disjoint_strings_score_zero() {
        assert_close(similarity("xyz", "abc"), 0.0);
    }

    #[test]
    fn test_longest_block_is_taken_first() {
        // "milk" is matched as one block, not split around the shorter " "
        assert_close(similarity("milk", "almond milk"), 8.0 / 15.0);
    }

    #[test]
    fn test_prepared_matches_unprepared() {
        let prepared = PreparedText::new("Chicken Wings");
        for a in ["chicken wings", "hot sauce", "", "wings"] {
            assert_close(similarity_prepared(a, &prepared), similarity(a, "Chicken Wings"));
        }
    }

    #[test]
    fn test_long_text_drops_popular_chars_from_index() {
        let long = "a".repeat(AUTOJUNK_MIN_LEN);
        let prepared = PreparedText::new(&long);
        assert!(!prepared.b2j.contains_key(&'a'));
        // The block is still found by growing over the skipped chars
        assert_close(similarity("a", &long), 2.0 / (AUTOJUNK_MIN_LEN as f64 + 1.0));
    }

    #[test]
    fn test_score_within_unit_interval() {
        let pairs = [("banana", "almond milk"), ("kale", "kale smoothie"), ("x", "yx")];
        for (a, b) in pairs {
            let score = similarity(a, b);
            assert!((0.0..=1.0).contains(&score), "{a}/{b} scored {score}");
        }
    }
}
