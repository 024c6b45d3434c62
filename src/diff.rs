//! Single-operation text diff
//!
//! Reduces a full-text change into at most one [`Operation`] by trimming the
//! longest common prefix and the longest common suffix, then classifying what
//! is left in the middle:
//!
//! | old middle | new middle | result  |
//! |------------|------------|---------|
//! | empty      | non-empty  | INSERT  |
//! | non-empty  | empty      | DELETE  |
//! | non-empty  | non-empty  | REPLACE |
//!
//! The suffix scan is bounded by what the prefix left over, so the two windows
//! never claim the same characters. Without that bound `"aa" -> "a"` would
//! match one `a` as both prefix and suffix.
//!
//! This is not a minimal edit-distance algorithm. When a substring recurs the
//! middle span can come out wider than strictly needed. The remote observes
//! operation shapes, so changing the heuristic changes the protocol.
//!
//! Characters are compared as Unicode scalar values, so a surrogate pair is
//! never split; offsets in the returned operation are UTF-16 code units.

use crate::operation::Operation;
use crate::text::utf16_len;

/// Compute the single operation that turns `prev` into `next`.
///
/// Returns `None` when the two texts are identical.
///
/// ```
/// use docsync::diff::diff;
/// use docsync::operation::Operation;
///
/// assert_eq!(
///     diff("doc", "hello", "hello world"),
///     Some(Operation::insert("doc", 5, " world"))
/// );
/// assert_eq!(diff("doc", "same", "same"), None);
/// ```
pub fn diff(document_id: &str, prev: &str, next: &str) -> Option<Operation> {
    if prev == next {
        return None;
    }

    let affixes = Affixes::between(prev, next);
    let prev_mid = &prev[affixes.prefix_bytes..prev.len() - affixes.suffix_bytes];
    let next_mid = &next[affixes.prefix_bytes..next.len() - affixes.suffix_bytes];
    let start = affixes.prefix_units;

    match (prev_mid.is_empty(), next_mid.is_empty()) {
        (true, false) => Some(Operation::insert(document_id, start, next_mid)),
        (false, true) => Some(Operation::delete(
            document_id,
            start,
            start + utf16_len(prev_mid),
        )),
        (false, false) => Some(Operation::replace(
            document_id,
            start,
            start + utf16_len(prev_mid),
            next_mid,
        )),
        // Both middles empty means prev == next, handled above
        (true, true) => None,
    }
}

/// Common prefix and bounded common suffix of two texts.
///
/// Byte lengths are identical on both sides because the trimmed characters
/// are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Affixes {
    prefix_bytes: usize,
    prefix_units: usize,
    suffix_bytes: usize,
}

impl Affixes {
    fn between(prev: &str, next: &str) -> Self {
        let mut prefix_chars = 0;
        let mut prefix_bytes = 0;
        let mut prefix_units = 0;
        for (a, b) in prev.chars().zip(next.chars()) {
            if a != b {
                break;
            }
            prefix_chars += 1;
            prefix_bytes += a.len_utf8();
            prefix_units += a.len_utf16();
        }

        let max_suffix = prev.chars().count().min(next.chars().count()) - prefix_chars;
        let mut suffix_bytes = 0;
        for (a, b) in prev.chars().rev().zip(next.chars().rev()).take(max_suffix) {
            if a != b {
                break;
            }
            suffix_bytes += a.len_utf8();
        }

        Self {
            prefix_bytes,
            prefix_units,
            suffix_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "doc-1";

    fn assert_transforms(prev: &str, next: &str) {
        match diff(DOC, prev, next) {
            None => assert_eq!(prev, next),
            Some(op) => {
                op.validate().unwrap();
                let applied = op.apply(prev).unwrap();
                assert_eq!(applied, next, "{} applied to {:?}", op, prev);
                assert_eq!(diff(DOC, &applied, next), None);
            }
        }
    }

    #[test]
    fn test_insert_at_end() {
        assert_eq!(
            diff(DOC, "hello", "hello world"),
            Some(Operation::insert(DOC, 5, " world"))
        );
    }

    #[test]
    fn test_delete_tail() {
        assert_eq!(
            diff(DOC, "hello world", "hello"),
            Some(Operation::delete(DOC, 5, 11))
        );
    }

    #[test]
    fn test_replace_middle_character() {
        assert_eq!(
            diff(DOC, "cat", "cut"),
            Some(Operation::replace(DOC, 1, 2, "u"))
        );
    }

    #[test]
    fn test_replace_without_common_affix() {
        assert_eq!(
            diff(DOC, "abc", "xyz"),
            Some(Operation::replace(DOC, 0, 3, "xyz"))
        );
    }

    #[test]
    fn test_identical_texts() {
        assert_eq!(diff(DOC, "same", "same"), None);
        assert_eq!(diff(DOC, "", ""), None);
    }

    #[test]
    fn test_from_and_to_empty() {
        assert_eq!(diff(DOC, "", "abc"), Some(Operation::insert(DOC, 0, "abc")));
        assert_eq!(diff(DOC, "abc", ""), Some(Operation::delete(DOC, 0, 3)));
    }

    #[test]
    fn test_suffix_bounded_by_prefix() {
        // Unbounded, the single "a" would be counted as prefix and suffix
        assert_eq!(diff(DOC, "aa", "a"), Some(Operation::delete(DOC, 1, 2)));
        assert_eq!(diff(DOC, "a", "aa"), Some(Operation::insert(DOC, 1, "a")));
        assert_eq!(
            diff(DOC, "abcabc", "abc"),
            Some(Operation::delete(DOC, 3, 6))
        );
    }

    #[test]
    fn test_insert_in_middle_prefers_leftmost_split() {
        assert_eq!(
            diff(DOC, "helo", "hello"),
            Some(Operation::insert(DOC, 3, "l"))
        );
    }

    #[test]
    fn test_repeated_substring_widens_span() {
        // A minimal diff would be two deletes; the single operation covers both
        assert_eq!(
            diff(DOC, "xabyab", "abyb"),
            Some(Operation::replace(DOC, 0, 5, "aby"))
        );
    }

    #[test]
    fn test_hangul_offsets() {
        assert_eq!(
            diff(DOC, "a가", "a가나"),
            Some(Operation::insert(DOC, 2, "나"))
        );
        assert_eq!(
            diff(DOC, "안녕하세요", "안녕세요"),
            Some(Operation::delete(DOC, 2, 3))
        );
    }

    #[test]
    fn test_surrogate_pairs_not_split() {
        // 🦀 and 🦐 share their high surrogate
        assert_eq!(
            diff(DOC, "a🦀b", "a🦐b"),
            Some(Operation::replace(DOC, 1, 3, "🦐"))
        );
        assert_eq!(
            diff(DOC, "🦀", "🦀🦀"),
            Some(Operation::insert(DOC, 2, "🦀"))
        );
    }

    #[test]
    fn test_diff_applies_cleanly() {
        let cases = [
            ("", "x"),
            ("x", ""),
            ("hello", "jello"),
            ("the quick fox", "the slow fox"),
            ("aaaa", "aa"),
            ("abab", "ab"),
            ("line one\nline two", "line one\nline 2\nline three"),
            ("가나다", "가다"),
            ("🦀🦀", "🦀"),
            ("mississippi", "missisippi"),
        ];

        for (prev, next) in cases {
            assert_transforms(prev, next);
            assert_transforms(next, prev);
        }
    }
}
