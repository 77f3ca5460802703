// UTF-8 leading-byte decoding. This is the boundary-validation primitive for entry points
// that accept raw bytes instead of an already-validated &str (which gets UTF-8 validity for
// free from the type system and never needs to call this).

use crate::error::RopeError;

/// Number of bytes in the codepoint that starts with leading byte `b`, or `None` if `b` cannot
/// start a codepoint (a continuation byte, or one of the bytes UTF-8 never uses).
pub(crate) fn codepoint_len(b: u8) -> Option<usize> {
    match b {
        0x00..=0x7F => Some(1),
        0x80..=0xBF => None, // continuation byte; can't start a codepoint
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        0xF8..=0xFB => Some(5), // accepted for table completeness; never produced by std UTF-8
        0xFC..=0xFD => Some(6),
        _ => None,
    }
}

/// Validate that `bytes` is a well-formed, complete sequence of UTF-8 codepoints, returning the
/// scalar count on success.
pub(crate) fn validate_utf8(bytes: &[u8]) -> Result<usize, RopeError> {
    let mut i = 0;
    let mut chars = 0;
    while i < bytes.len() {
        let w = codepoint_len(bytes[i]).ok_or(RopeError::InvalidUtf8)?;
        if i + w > bytes.len() {
            return Err(RopeError::InvalidUtf8);
        }
        for &cont in &bytes[i + 1..i + w] {
            if cont & 0xC0 != 0x80 {
                return Err(RopeError::InvalidUtf8);
            }
        }
        i += w;
        chars += 1;
    }
    // Cheap extra check: reject overlong/surrogate encodings by deferring to std, which already
    // implements the full UTF-8 state machine. The scan above exists to give a precise byte-width
    // table per §4.A; this closes the gap between "structurally plausible" and "actually valid".
    std::str::from_utf8(bytes).map_err(|_| RopeError::InvalidUtf8)?;
    Ok(chars)
}
