//! Text offset helpers
//!
//! Operation positions are measured in UTF-16 code units, the unit the editing
//! surface and the document server both index by. Rust strings are UTF-8, so
//! every offset that crosses that boundary goes through these helpers.

/// Length of `text` in UTF-16 code units.
///
/// ```
/// use docsync::text::utf16_len;
///
/// assert_eq!(utf16_len("hello"), 5);
/// assert_eq!(utf16_len("가"), 1);
/// assert_eq!(utf16_len("🦀"), 2);
/// ```
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 code unit offset into a UTF-8 byte offset.
///
/// Returns `None` when the offset is past the end of `text` or falls between
/// the two halves of a surrogate pair.
///
/// ```
/// use docsync::text::utf16_to_byte;
///
/// let text = "a🦀b";
/// assert_eq!(utf16_to_byte(text, 1), Some(1));
/// assert_eq!(utf16_to_byte(text, 2), None);
/// assert_eq!(utf16_to_byte(text, 3), Some(5));
/// assert_eq!(utf16_to_byte(text, 4), Some(6));
/// ```
pub fn utf16_to_byte(text: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte_idx, ch) in text.char_indices() {
        if units == offset {
            return Some(byte_idx);
        }
        if units > offset {
            return None;
        }
        units += ch.len_utf16();
    }

    (units == offset).then_some(text.len())
}
