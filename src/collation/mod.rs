//! Key collation strategies for row-key ordering.
//!
//! Range scans traverse row keys in *collation order*, not raw byte order.
//! The ordering is a pluggable strategy: the directory takes an
//! `Arc<dyn KeyComparator>` at construction, so callers never depend on a
//! concrete algorithm.
//!
//! The default `CollatedComparator` implements the observed rules:
//! - primary: lexicographic byte comparison with ignored punctuation
//!   stripped, so digit strings sort as strings (`"10"` before `"2"`) and
//!   digits sort before lowercase letters;
//! - secondary: a punctuation-bearing key sorts immediately after its
//!   stripped counterpart (`"a"` before `"-a"`, both before `"b"`).
//!
//! The ignored class is ASCII punctuation. The rule is only
//! evidence-constrained over digits, lowercase letters, and hyphen; wider
//! alphabets are an extension of this comparator, not a guarantee of the
//! engine.

use std::cmp::Ordering;

/// Total order over row keys.
pub trait KeyComparator: Send + Sync {
    /// Returns the name of this comparator
    fn name(&self) -> &'static str;

    /// Three-way comparison of two row keys
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

/// Raw byte-order comparison, for callers that want memcmp semantics.
pub struct BytewiseComparator;

impl KeyComparator for BytewiseComparator {
    fn name(&self) -> &'static str {
        "BytewiseComparator"
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// Default collation: punctuation is secondary-weighted.
pub struct CollatedComparator;

fn is_ignored(b: u8) -> bool {
    b.is_ascii_punctuation()
}

impl KeyComparator for CollatedComparator {
    fn name(&self) -> &'static str {
        "CollatedComparator"
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let mut ia = a.iter().copied().filter(|&c| !is_ignored(c));
        let mut ib = b.iter().copied().filter(|&c| !is_ignored(c));

        loop {
            match (ia.next(), ib.next()) {
                (Some(x), Some(y)) => match x.cmp(&y) {
                    Ordering::Equal => continue,
                    other => return other,
                },
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (None, None) => break,
            }
        }

        // Equal after stripping: the variant with fewer ignored bytes wins,
        // then raw bytes as the final tie-break.
        let ca = a.iter().filter(|&&c| is_ignored(c)).count();
        let cb = b.iter().filter(|&&c| is_ignored(c)).count();
        ca.cmp(&cb).then_with(|| a.cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytewise_is_memcmp() {
        let cmp = BytewiseComparator;
        assert_eq!(cmp.compare(b"-a", b"a"), Ordering::Less);
        assert_eq!(cmp.compare(b"abc", b"abc"), Ordering::Equal);
    }

    #[test]
    fn test_digit_strings_sort_as_strings() {
        let cmp = CollatedComparator;
        assert_eq!(cmp.compare(b"10", b"2"), Ordering::Less);
        assert_eq!(cmp.compare(b"15", b"2"), Ordering::Less);
        assert_eq!(cmp.compare(b"99", b"a"), Ordering::Less);
    }

    #[test]
    fn test_punctuation_is_secondary() {
        let cmp = CollatedComparator;
        // stripped variant first, punctuation-bearing variant right after
        assert_eq!(cmp.compare(b"a", b"-a"), Ordering::Less);
        assert_eq!(cmp.compare(b"-a", b"b"), Ordering::Less);
        assert_eq!(cmp.compare(b"b", b"-b"), Ordering::Less);
    }

    #[test]
    fn test_collated_full_sequence() {
        let cmp = CollatedComparator;
        let expected: Vec<&[u8]> = vec![b"0", b"1", b"10", b"2", b"a", b"-a", b"b", b"-b"];
        let mut keys = expected.clone();
        keys.reverse();
        keys.sort_by(|a, b| cmp.compare(a, b));
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_collated_equal_only_on_identical() {
        let cmp = CollatedComparator;
        assert_eq!(cmp.compare(b"-a", b"-a"), Ordering::Equal);
        assert_ne!(cmp.compare(b"-a", b"a"), Ordering::Equal);
    }
}
