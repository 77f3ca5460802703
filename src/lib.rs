//! A mutable Unicode rope backed by a character-indexed skip list.
//!
//! [`Rope`] supports insertion, deletion and replacement at arbitrary `char` offsets in
//! sub-linear expected time, by maintaining a probabilistic skip list over small UTF-8 leaf
//! slabs, where each forward link records the number of characters it skips over rather than a
//! key. Locating a character offset, splicing in new leaves, and unlinking emptied ones are all
//! single top-down traversals of that skip list.
//!
//! ```
//! use skiprope::Rope;
//!
//! let mut rope = Rope::from("the quick fox");
//! rope.insert(4, "slow, ");
//! rope.replace(17..20, "dog");
//! assert_eq!(rope.to_string(), "the slow, quick dog");
//! ```

mod codepoint;
mod error;
mod gapbuffer;
mod iter;
mod rope;
mod utils;

pub use error::RopeError;
pub use iter::ContentIter;
pub use rope::{Rope, LEAF_CAP, MAX_HEIGHT};
