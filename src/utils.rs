// Small helpers for converting between character offsets and byte offsets within a single
// &str fragment. These are used by the leaf's gap buffer, which tracks both measures.

/// Byte offset after `char_pos` unicode scalars into `s`.
pub(crate) fn str_chars_to_bytes(s: &str, char_pos: usize) -> usize {
    ropey::str_utils::char_to_byte_idx(s, char_pos)
}

/// Byte offset `char_len` unicode scalars back from the *end* of `s`.
///
/// Used when the gap is moving left past already-written content and we only know how many
/// characters (not bytes) the move needs to cover.
pub(crate) fn str_chars_to_bytes_rev(s: &str, char_len: usize) -> usize {
    let total_chars = ropey::str_utils::byte_to_char_idx(s, s.len());
    s.len() - ropey::str_utils::char_to_byte_idx(s, total_chars - char_len)
}

pub(crate) fn count_chars(s: &str) -> usize {
    ropey::str_utils::byte_to_char_idx(s, s.len())
}
