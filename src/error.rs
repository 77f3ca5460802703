use std::fmt;

/// Errors that can be surfaced from a rope operation.
///
/// Node and head-array allocation failures are not represented here: like the rest of the
/// standard library's owned containers, this crate aborts the process on allocation failure
/// rather than threading a fallible-allocation path through every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RopeError {
    /// The bytes passed to [`Rope::insert_bytes`](crate::Rope::insert_bytes) are not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for RopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RopeError::InvalidUtf8 => write!(f, "input bytes are not valid UTF-8"),
        }
    }
}

impl std::error::Error for RopeError {}
