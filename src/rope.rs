// A rope (fancy mutable string) built on a skip list keyed by character position rather than
// by key. Unlike a key-value skip list, every forward link carries a *character-distance*
// ("skip") to the node it points at, which turns the structure into an order-statistic
// sequence: locating a character offset is a top-down walk subtracting skips, exactly the way
// a key-value skip list subtracts keys.
//
// This implementation leans on unsafe pointers and a hand-rolled variable-length node layout
// to keep leaves cache-friendly; the public `Rope` surface above it is entirely safe.

use std::{mem, ptr, str};
use std::alloc::{alloc, dealloc, Layout};
use std::cmp::min;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Range;
use rand::prelude::*;

use crate::error::RopeError;
use crate::codepoint::validate_utf8;
use crate::gapbuffer::LeafBuffer;
use crate::iter::{ContentIter, NodeIter};
use crate::utils::*;

/// Byte capacity of a single leaf slab.
///
/// In test/debug builds this is kept deliberately small so that the test suite can exercise
/// multi-leaf splitting and tail-carving without needing kilobyte-long string literals; release
/// builds use a size tuned for cache-friendliness.
#[cfg(debug_assertions)]
pub const LEAF_CAP: usize = 16;
#[cfg(not(debug_assertions))]
pub const LEAF_CAP: usize = 128;

/// Maximum allowed node height. The skip list degrades gracefully well before this is reached;
/// it exists only to bound the head's forward-link array.
pub const MAX_HEIGHT: usize = 20;
const MAX_HEIGHT_U8: u8 = MAX_HEIGHT as u8;

// Using StdRng notably increases code size (relevant for e.g. a wasm build), but resists an
// adversary choosing inputs that drive every node to the same height and degenerate the skip
// list to a linked list. See the `ddos_protection` feature.
#[cfg(feature = "ddos_protection")]
type RopeRng = StdRng;
#[cfg(not(feature = "ddos_protection"))]
type RopeRng = SmallRng;

#[repr(C)] // Prevent parameter reordering.
pub(crate) struct Node {
    pub(crate) str: LeafBuffer<LEAF_CAP>,

    /// Height of the `nexts` array.
    pub(crate) height: u8,

    // This array actually has the size of `height`; the node is heap-allocated with room for
    // exactly that many trailing `SkipEntry`s, so that each node costs one allocation instead
    // of a separate small-vector allocation for its links. The rope's head reuses this same
    // allocation shape, but with `height` tracking only its *occupied* levels — see
    // `Rope::head_capacity`.
    nexts: [SkipEntry; 0],
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct SkipEntry {
    pub(crate) node: *mut Node,
    /// The number of *characters* between the start of the current node and the start of
    /// `node`.
    pub(crate) skip_chars: usize,
}

fn random_height(rng: &mut RopeRng) -> u8 {
    let mut h: u8 = 1;
    while h < MAX_HEIGHT_U8 && rng.gen::<bool>() { h += 1; }
    h
}

impl SkipEntry {
    fn new() -> Self {
        SkipEntry { node: ptr::null_mut(), skip_chars: 0 }
    }
}

impl Node {
    pub(crate) fn next_ptr(&self) -> *const Self {
        self.first_next().node
    }

    fn nexts(&self) -> &[SkipEntry] {
        unsafe { std::slice::from_raw_parts(self.nexts.as_ptr(), self.height as usize) }
    }

    fn nexts_mut(&mut self) -> &mut [SkipEntry] {
        unsafe { std::slice::from_raw_parts_mut(self.nexts.as_mut_ptr(), self.height as usize) }
    }

    fn layout_with_height(height: u8) -> Layout {
        Layout::from_size_align(
            mem::size_of::<Node>() + mem::size_of::<SkipEntry>() * (height as usize),
            mem::align_of::<Node>(),
        ).unwrap()
    }

    // `height` doubles as "number of trailing link slots to allocate". Regular leaf nodes never
    // grow past their initial height, but the rope's head calls this with a capacity larger than
    // its currently occupied levels (see `Rope::grow_head`), hence the `+ 1` headroom here.
    fn alloc_with_height(height: u8, content: &str) -> *mut Node {
        assert!(height >= 1 && height <= MAX_HEIGHT_U8 + 1);

        unsafe {
            let node = alloc(Self::layout_with_height(height)) as *mut Node;
            (*node) = Node {
                str: LeafBuffer::new_from_str(content),
                height,
                nexts: [],
            };

            for next in (*node).nexts_mut() {
                *next = SkipEntry::new();
            }

            node
        }
    }

    fn alloc(rng: &mut RopeRng, content: &str) -> *mut Node {
        Self::alloc_with_height(random_height(rng), content)
    }

    // `capacity` must match the height the node (or head) was originally allocated with, which
    // can differ from its current `height` once a head has spare link capacity after growth.
    unsafe fn free(p: *mut Node, capacity: u8) {
        dealloc(p as *mut u8, Self::layout_with_height(capacity));
    }

    pub(crate) fn as_str_1(&self) -> &str { self.str.pre_gap_str() }
    pub(crate) fn as_str_2(&self) -> &str { self.str.post_gap_str() }

    // Height is always >= 1, so this is always valid.
    pub(crate) fn first_next<'a>(&self) -> &'a SkipEntry {
        unsafe { &*self.nexts.as_ptr() }
    }

    fn first_next_mut<'a>(&mut self) -> &'a mut SkipEntry {
        unsafe { &mut *self.nexts.as_mut_ptr() }
    }

    pub(crate) fn num_chars(&self) -> usize {
        self.first_next().skip_chars
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RopeCursor([SkipEntry; MAX_HEIGHT + 1]);

impl RopeCursor {
    fn update_offsets(&mut self, height: usize, by: isize) {
        for i in 0..height {
            unsafe {
                // Adding a usize + isize is awkward in rust, hence wrapping_add.
                let skip = &mut (*self.0[i].node).nexts_mut()[i].skip_chars;
                *skip = skip.wrapping_add(by as usize);
            }
        }
    }

    fn move_within_node(&mut self, height: usize, by: isize) {
        for e in &mut self.0[..height] {
            e.skip_chars = e.skip_chars.wrapping_add(by as usize);
        }
    }

    pub(crate) fn here_ptr(&self) -> *mut Node {
        self.0[0].node
    }

    pub(crate) fn global_char_pos(&self, head_height: u8) -> usize {
        self.0[head_height as usize - 1].skip_chars
    }

    pub(crate) fn local_char_pos(&self) -> usize {
        self.0[0].skip_chars
    }
}

/// A rope: a mutable Unicode string supporting insertion and deletion at arbitrary character
/// positions in sub-linear time, backed by a character-indexed skip list of small UTF-8 leaf
/// slabs.
///
/// Positions are always counted in Unicode scalar values (`char`s), never bytes and never
/// grapheme clusters.
///
/// `Rope` owns its nodes exclusively through raw pointers with no shared or thread-local state,
/// so it is `Send`; it is deliberately not `Sync`, since concurrent access from multiple threads
/// is not synchronized.
pub struct Rope {
    rng: RopeRng,

    /// Total bytes used by characters in the rope.
    num_bytes: usize,

    /// Heap-allocated head node. Its `height` field holds the number of *occupied* forward-link
    /// levels (the tallest node height currently in the rope, plus one sentinel level); its
    /// allocated capacity, which may be larger, is tracked separately in `head_capacity`.
    head: *mut Node,

    /// Number of link slots actually allocated behind `head`. Grows geometrically (doubling, up
    /// to `MAX_HEIGHT + 1`) via `grow_head` as taller nodes get inserted, mirroring the
    /// `realloc`-based growth of the link array in a classic C skip-list implementation instead
    /// of committing to a fixed maximum up front.
    head_capacity: u8,
    // `head`'s forward links hold one extra entry at `[height - 1]`, which points past the end
    // of the skip list. Its `skip_chars` is therefore the length of the entire rope.
}

// SAFETY: a `Rope` exclusively owns the nodes it points to (no aliased or thread-local state),
// so moving it across a thread boundary is sound. It is not `Sync`: nothing about it serializes
// concurrent access.
unsafe impl Send for Rope {}

impl Rope {
    fn new_with_rng(rng: RopeRng) -> Self {
        // We never store characters in the head node itself.
        let head = Node::alloc_with_height(1, "");
        Rope { rng, num_bytes: 0, head, head_capacity: 1 }
    }

    /// Creates a new, empty rope.
    ///
    /// In release builds this is an alias for [`new_from_entropy`](Self::new_from_entropy). In
    /// test or debug builds it uses a fixed seed instead, so that test failures reproduce
    /// exactly; use [`new_from_seed`](Self::new_from_seed) or `new_from_entropy` directly to
    /// override this for a specific rope.
    pub fn new() -> Self {
        if cfg!(test) || cfg!(debug_assertions) {
            Self::new_from_seed(123)
        } else {
            Self::new_from_entropy()
        }
    }

    /// Creates a new, empty rope seeded from an entropy source, regardless of build profile.
    pub fn new_from_entropy() -> Self {
        Self::new_with_rng(RopeRng::from_entropy())
    }

    /// Creates a new, empty rope using an RNG seeded from `seed`.
    ///
    /// Useful in tests and benchmarks that need a specific run to replay identically.
    pub fn new_from_seed(seed: u64) -> Self {
        Self::new_with_rng(RopeRng::seed_from_u64(seed))
    }

    fn new_from_str(s: &str) -> Self {
        let mut rope = Self::new();
        rope.insert(0, s);
        rope
    }

    fn head(&self) -> &Node {
        unsafe { &*self.head }
    }

    /// Returns the length of the rope in Unicode scalar values. This is not the same as either
    /// the byte length or the number of grapheme clusters.
    ///
    /// Runs in O(1).
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::Rope;
    /// let rope = Rope::from("héllo");
    /// assert_eq!(rope.char_len(), 5);
    /// ```
    pub fn char_len(&self) -> usize {
        let head = self.head();
        head.nexts()[head.height as usize - 1].skip_chars
    }

    // Grow the head's allocated link capacity (doubling, capped at MAX_HEIGHT + 1) so that it
    // can hold at least `needed_capacity` levels. Leaves `head.height` (the occupied-level
    // count) unchanged; callers that are about to occupy more levels must bump it themselves
    // after this returns, since `nexts`/`nexts_mut` slice by the live `height` field.
    unsafe fn grow_head(&mut self, needed_capacity: usize) {
        if needed_capacity <= self.head_capacity as usize { return; }

        let mut new_capacity = (self.head_capacity as usize).max(1);
        while new_capacity < needed_capacity { new_capacity *= 2; }
        new_capacity = new_capacity.min(MAX_HEIGHT + 1);

        let occupied = (*self.head).height;
        let new_head = Node::alloc_with_height(new_capacity as u8, "");
        (*new_head).nexts_mut()[..occupied as usize].copy_from_slice((*self.head).nexts());
        (*new_head).height = occupied;

        Node::free(self.head, self.head_capacity);
        self.head = new_head;
        self.head_capacity = new_capacity as u8;
    }

    // Navigate to a particular character offset. Returns the list of nodes which point past
    // the position at every level, along with the character offset into each one's link slot.
    pub(crate) fn cursor_at_char(&self, char_pos: usize, stick_end: bool) -> RopeCursor {
        assert!(char_pos <= self.char_len());

        let mut e: *const Node = self.head;
        let mut height = self.head().height as usize - 1;

        let mut offset = char_pos; // How many more chars to skip

        let mut iter = RopeCursor([SkipEntry::new(); MAX_HEIGHT + 1]);

        loop {
            let en = unsafe { &*e };
            let next = en.nexts()[height];
            let skip = next.skip_chars;
            if offset > skip || (!stick_end && offset == skip && !next.node.is_null()) {
                // Go right.
                assert!(e as *mut Node == self.head || !en.str.is_empty());
                offset -= skip;
                e = next.node;
                assert!(!e.is_null(), "reached rope end prematurely");
            } else {
                // Record this and go down.
                iter.0[height] = SkipEntry {
                    skip_chars: offset,
                    node: e as *mut Node,
                };

                if height == 0 { break; } else { height -= 1; }
            }
        }

        assert!(offset <= LEAF_CAP);
        iter
    }

    fn cursor_at_end(&self) -> RopeCursor {
        self.cursor_at_char(self.char_len(), true)
    }

    // Create a new node at the cursor, filled with `contents`.
    unsafe fn insert_node_at(&mut self, cursor: &mut RopeCursor, contents: &str, num_chars: usize, update_cursor: bool) {
        debug_assert_eq!(count_chars(contents), num_chars);
        debug_assert!(contents.len() <= LEAF_CAP);

        let new_node = Node::alloc(&mut self.rng, contents);
        let new_height = (*new_node).height as usize;
        let old_height = (*self.head).height as usize;

        if new_height >= old_height {
            self.grow_head(new_height + 1);
            (*self.head).height = (new_height + 1) as u8;

            // Pad the newly occupied levels with a copy of the topmost previously-occupied
            // level; that entry is about to be overwritten by the loop below anyway.
            let pad = (*self.head).nexts()[old_height - 1];
            let cursor_pad = cursor.0[old_height - 1];
            for h in old_height..=new_height {
                (*self.head).nexts_mut()[h] = pad;
                cursor.0[h] = cursor_pad;
            }
        }
        let head_height = (*self.head).height as usize;

        for i in 0..new_height {
            let prev_skip = &mut (*cursor.0[i].node).nexts_mut()[i];
            let nexts = (*new_node).nexts_mut();
            nexts[i].node = prev_skip.node;
            nexts[i].skip_chars = num_chars + prev_skip.skip_chars - cursor.0[i].skip_chars;

            prev_skip.node = new_node;
            prev_skip.skip_chars = cursor.0[i].skip_chars;

            if update_cursor {
                cursor.0[i].node = new_node;
                cursor.0[i].skip_chars = num_chars;
            }
        }

        for i in new_height..head_height {
            (*cursor.0[i].node).nexts_mut()[i].skip_chars += num_chars;
            if update_cursor {
                cursor.0[i].skip_chars += num_chars;
            }
        }

        self.num_bytes += contents.len();
    }

    unsafe fn insert_at_cursor(&mut self, cursor: &mut RopeCursor, contents: &str) {
        if contents.is_empty() { return; }

        let mut offset_bytes: usize = 0;
        let offset: usize = cursor.0[0].skip_chars;
        let mut e = cursor.here_ptr();

        let num_inserted_bytes = contents.len();
        let num_inserted_chars = count_chars(contents);
        let head_height = (*self.head).height as usize;

        // Short circuit: if the insertion point sits exactly at the node's gap and there's
        // room, drop the content straight into the gap without any byte-offset bookkeeping.
        if (*e).str.gap_char_pos as usize == offset && (*e).str.gap_capacity as usize >= num_inserted_bytes {
            (*e).str.write_into_gap(contents);
            cursor.update_offsets(head_height, num_inserted_chars as isize);
            cursor.move_within_node(head_height, num_inserted_chars as isize);
            self.num_bytes += num_inserted_bytes;
            return;
        }

        if offset > 0 {
            assert!(offset <= (*e).nexts()[0].skip_chars);
            offset_bytes = (*e).str.byte_offset_for_char(offset);
        }

        // Can we insert into the current node?
        let current_len_bytes = (*e).str.len_bytes();
        let mut insert_here = current_len_bytes + num_inserted_bytes <= LEAF_CAP;

        // If not, see if we can shift into the start of the next node instead.
        if !insert_here && offset_bytes == current_len_bytes {
            if let Some(next) = (*e).first_next_mut().node.as_mut() {
                if next.str.len_bytes() + num_inserted_bytes <= LEAF_CAP {
                    offset_bytes = 0;

                    for entry in &mut cursor.0[..next.height as usize] {
                        *entry = SkipEntry { node: next, skip_chars: 0 };
                    }
                    e = next;

                    insert_here = true;
                }
            }
        }

        if insert_here {
            let c = &mut (*e).str;
            c.insert_at_byte_offset(offset_bytes, contents).unwrap();

            self.num_bytes += num_inserted_bytes;
            cursor.update_offsets(head_height, num_inserted_chars as isize);
            cursor.move_within_node(head_height, num_inserted_chars as isize);
        } else {
            // No room. We need at least one new node.

            // If we're not at the end of the current node, carve off its tail and reinsert it
            // after the new content.
            (*e).str.relocate_gap(offset_bytes);

            let num_end_bytes = (*e).str.len_bytes() - offset_bytes;
            let mut num_end_chars: usize = 0;
            let end_str = if num_end_bytes > 0 {
                let end_str = (*e).str.split_off_tail();
                num_end_chars = (*e).num_chars() - offset;

                cursor.update_offsets(head_height, -(num_end_chars as isize));
                self.num_bytes -= num_end_bytes;
                Some(end_str)
            } else {
                None
            };

            // Break the new content into chunks of at most LEAF_CAP bytes, each ending on a
            // codepoint boundary.
            let mut remainder = contents;
            while !remainder.is_empty() {
                let mut byte_pos = 0;
                let mut char_pos = 0;

                for c in remainder.chars() {
                    let cs = c.len_utf8();
                    if cs + byte_pos > LEAF_CAP { break; } else {
                        char_pos += 1;
                        byte_pos += cs;
                    }
                }

                let (next, rem) = remainder.split_at(byte_pos);
                assert!(!next.is_empty());
                self.insert_node_at(cursor, next, char_pos, true);
                remainder = rem;
            }

            if let Some(end_str) = end_str {
                self.insert_node_at(cursor, end_str, num_end_chars, false);
            }
        }

        assert_ne!(cursor.local_char_pos(), 0);
    }

    unsafe fn del_at_cursor(&mut self, cursor: &mut RopeCursor, mut length: usize) {
        if length == 0 { return; }
        let mut offset = cursor.local_char_pos();
        let mut node = cursor.here_ptr();
        while length > 0 {
            {
                let s = (&*node).first_next();
                if offset == s.skip_chars {
                    // End of current node; skip to the start of the next one.
                    node = s.node;
                    offset = 0;
                }
            }

            let num_chars = (&*node).num_chars();
            let removed = min(length, num_chars - offset);
            assert!(removed > 0);

            let height = (*node).height as usize;
            if removed < num_chars || ptr::eq(node, self.head) {
                // Trim the node down in place.
                let s = &mut (*node).str;
                let removed_bytes = s.delete_chars(offset, removed);
                self.num_bytes -= removed_bytes;

                for s in (*node).nexts_mut() {
                    s.skip_chars -= removed;
                }
            } else {
                // Remove the node from the skip list. The cursor is guaranteed to point from
                // the previous element to the start of this one.
                assert_ne!(cursor.0[0].node, node);

                for i in 0..(*node).height as usize {
                    let s = &mut (*cursor.0[i].node).nexts_mut()[i];
                    s.node = (*node).nexts_mut()[i].node;
                    s.skip_chars += (*node).nexts()[i].skip_chars - removed;
                }

                self.num_bytes -= (*node).str.len_bytes();
                let next = (*node).first_next().node;
                Node::free(node, (*node).height);
                node = next;
            }

            for i in height..(*self.head).height as usize {
                let s = &mut (*cursor.0[i].node).nexts_mut()[i];
                s.skip_chars -= removed;
            }

            length -= removed;
        }
    }

    fn eq_str(&self, other: &str) -> bool {
        if self.len_bytes() != other.len() { return false; }

        let mut rest = other;
        for s in self.chunks() {
            let (start, remainder) = rest.split_at(s.len());
            if start != s { return false; }
            rest = remainder;
        }

        true
    }

    pub(crate) fn node_iter(&self) -> NodeIter { NodeIter::new(self.head()) }
}

impl Default for Rope {
    fn default() -> Self { Self::new() }
}

impl Drop for Rope {
    fn drop(&mut self) {
        unsafe {
            let mut node = (*self.head).first_next().node;
            while !node.is_null() {
                let next = (*node).first_next().node;
                Node::free(node, (*node).height);
                node = next;
            }
            Node::free(self.head, self.head_capacity);
        }
    }
}

impl From<&str> for Rope {
    fn from(s: &str) -> Self { Rope::new_from_str(s) }
}

impl From<String> for Rope {
    fn from(s: String) -> Self { Rope::new_from_str(&s) }
}

impl PartialEq for Rope {
    // Walk both ropes' chunk iterators side by side, comparing only as many bytes at a time as
    // both sides currently have on hand, so two ropes holding the same text in differently
    // shaped leaves still compare equal without ever materializing a full String.
    fn eq(&self, other: &Rope) -> bool {
        if self.num_bytes != other.num_bytes || self.char_len() != other.char_len() {
            return false;
        }

        let mut lhs = self.chunks().peekable();
        let mut rhs = other.chunks().peekable();
        let (mut a, mut b) = ("", "");

        loop {
            if a.is_empty() {
                a = match lhs.next() { Some(s) => s, None => break };
            }
            if b.is_empty() {
                b = match rhs.next() { Some(s) => s, None => break };
            }

            let amt = min(a.len(), b.len());
            let (a_head, a_tail) = a.split_at(amt);
            let (b_head, b_tail) = b.split_at(amt);
            if a_head != b_head { return false; }

            a = a_tail;
            b = b_tail;
        }

        a.is_empty() && b.is_empty() && lhs.next().is_none() && rhs.next().is_none()
    }
}
impl Eq for Rope {}

impl Debug for Rope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.chunks()).finish()
    }
}

impl Display for Rope {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for s in self.chunks() {
            f.write_str(s)?;
        }
        Ok(())
    }
}

impl PartialEq<str> for Rope {
    fn eq(&self, other: &str) -> bool { self.eq_str(other) }
}
impl PartialEq<&str> for Rope {
    fn eq(&self, other: &&str) -> bool { self.eq_str(*other) }
}
impl PartialEq<String> for Rope {
    fn eq(&self, other: &String) -> bool { self.eq_str(other.as_str()) }
}

impl<'a> Extend<&'a str> for Rope {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        let mut cursor = self.cursor_at_end();
        iter.into_iter().for_each(|s| {
            unsafe { self.insert_at_cursor(&mut cursor, s); }
        });
    }
}

impl Clone for Rope {
    // Rebuilds by extending a fresh rope with `chunks()` (content only) rather than replaying
    // the source node-by-node, so the clone gets its own freshly drawn leaf boundaries and
    // heights instead of mirroring the original's internal node shape.
    fn clone(&self) -> Self {
        let mut r = Rope::new();
        r.extend(self.chunks());
        r
    }
}

impl Rope {
    /// Insert `s` at the given character offset.
    ///
    /// If `pos` is past the end of the rope, it is clamped to the end. Inserting an empty
    /// string is a no-op. `&str` already guarantees valid UTF-8, so this never fails; see
    /// [`insert_bytes`](Self::insert_bytes) for a fallible, raw-bytes entry point.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::Rope;
    /// let mut rope = Rope::from("--");
    /// rope.insert(1, "hi there");
    /// assert_eq!(rope.to_string(), "-hi there-");
    /// ```
    pub fn insert(&mut self, mut pos: usize, contents: &str) {
        if contents.is_empty() { return; }
        pos = min(pos, self.char_len());

        let mut cursor = self.cursor_at_char(pos, true);
        unsafe { self.insert_at_cursor(&mut cursor, contents); }

        debug_assert_eq!(cursor.global_char_pos(self.head().height), pos + count_chars(contents));
    }

    /// Insert raw, explicit-length bytes at the given character offset.
    ///
    /// Unlike [`insert`](Self::insert), this validates `bytes` as UTF-8 before touching the
    /// rope, returning `Err(RopeError::InvalidUtf8)` (and leaving the rope unchanged) if it
    /// isn't. Embedded NUL bytes are valid UTF-8 content and round-trip correctly; there is no
    /// zero-termination convention here.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::Rope;
    /// let mut rope = Rope::new();
    /// rope.insert_bytes(0, b"hello").unwrap();
    /// assert_eq!(rope.to_string(), "hello");
    /// assert!(rope.insert_bytes(0, &[0xFF, 0xFE]).is_err());
    /// ```
    pub fn insert_bytes(&mut self, pos: usize, bytes: &[u8]) -> Result<(), RopeError> {
        validate_utf8(bytes)?;
        // Safe: we just validated `bytes` is well-formed UTF-8.
        let s = unsafe { str::from_utf8_unchecked(bytes) };
        self.insert(pos, s);
        Ok(())
    }

    /// Delete `n` characters starting at `pos`.
    ///
    /// Both `pos` and `n` are clamped to the rope's bounds; deleting past the end silently
    /// ignores the overrun portion.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::Rope;
    /// let mut rope = Rope::from("Whoa dawg!");
    /// rope.delete(4, 5); // delete " dawg"
    /// assert_eq!(rope.to_string(), "Whoa!");
    /// ```
    pub fn delete(&mut self, pos: usize, n: usize) {
        let pos = min(pos, self.char_len());
        let n = min(n, self.char_len() - pos);
        if n == 0 { return; }

        // We need to stick_end so the cursor can reach the right-hand edge of deleted nodes.
        let mut cursor = self.cursor_at_char(pos, true);
        unsafe { self.del_at_cursor(&mut cursor, n); }

        debug_assert_eq!(cursor.global_char_pos(self.head().height), pos);
    }

    /// Delete the characters in `range`, equivalent to `delete(range.start, range.len())`.
    pub fn remove(&mut self, range: Range<usize>) {
        let end = min(range.end, self.char_len());
        if range.start >= end { return; }
        self.delete(range.start, end - range.start);
    }

    /// Replace the characters in `range` with `content`.
    ///
    /// Equivalent to [`remove`](Self::remove) followed by [`insert`](Self::insert), but pays
    /// for only one positional search instead of two.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::Rope;
    /// let mut rope = Rope::from("Hi Mike!");
    /// rope.replace(3..7, "Duane"); // replace "Mike" with "Duane"
    /// assert_eq!(rope.to_string(), "Hi Duane!");
    /// ```
    pub fn replace(&mut self, range: Range<usize>, content: &str) {
        let len = self.char_len();
        let pos = min(range.start, len);
        let del_len = min(range.end, len) - pos;

        let mut cursor = self.cursor_at_char(pos, true);
        if del_len > 0 {
            unsafe { self.del_at_cursor(&mut cursor, del_len); }
        }
        if !content.is_empty() {
            unsafe { self.insert_at_cursor(&mut cursor, content); }
        }

        debug_assert_eq!(cursor.global_char_pos(self.head().height), pos + count_chars(content));
    }

    /// Number of bytes used by the rope's UTF-8 content. Matches the `.len()` an equivalent
    /// `String` would report.
    ///
    /// Prefer [`char_len`](Self::char_len) unless you specifically need a byte count, e.g. to
    /// size a buffer before calling [`to_bytes`](Self::to_bytes).
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::Rope;
    /// let rope = Rope::from("κόσμε"); // "Cosmos" in ancient greek
    /// assert_eq!(rope.len_bytes(), "κόσμε".len());
    /// ```
    pub fn len_bytes(&self) -> usize { self.num_bytes }

    /// Returns `true` if the rope is empty.
    pub fn is_empty(&self) -> bool { self.num_bytes == 0 }

    /// Render the full content as a freshly allocated byte buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.num_bytes);
        for s in self.chunks() {
            out.extend_from_slice(s.as_bytes());
        }
        out
    }

    /// Render the full content as a `String`.
    pub fn to_string(&self) -> String {
        let mut content = String::with_capacity(self.num_bytes);
        for s in self.chunks() {
            content.push_str(s);
        }
        content
    }

    /// Iterate over the rope's content as a sequence of `&str` chunks, without allocating a
    /// single contiguous buffer. This is what [`to_bytes`](Self::to_bytes) and
    /// [`to_string`](Self::to_string) are built on; prefer it over those two when you can
    /// consume content incrementally.
    pub fn chunks(&self) -> ContentIter {
        ContentIter::new(self.head())
    }

    /// Re-derive every structural invariant from scratch by walking the whole rope, panicking
    /// on the first violation found.
    ///
    /// This is O(n) and intended for tests and property tests, not the steady-state hot path.
    pub fn check(&self) {
        let head = self.head();
        assert!(head.height >= 1);
        assert!(head.height < MAX_HEIGHT_U8 + 1);
        assert!(self.head_capacity as usize >= head.height as usize);
        assert!(self.head_capacity as usize <= MAX_HEIGHT + 1);

        let skip_over = &head.nexts()[head.height as usize - 1];
        assert!(skip_over.skip_chars <= self.num_bytes);
        assert!(skip_over.node.is_null());

        let mut iter = [SkipEntry::new(); MAX_HEIGHT + 1];
        for slot in iter.iter_mut().take(head.height as usize) {
            slot.node = self.head;
        }

        let mut num_bytes: usize = 0;
        let mut num_chars = 0;

        for n in self.node_iter() {
            assert!(!n.str.is_empty() || ptr::eq(n, head));
            assert!(n.height <= MAX_HEIGHT_U8);
            assert!(n.height >= 1);
            n.str.check();

            assert_eq!(count_chars(n.as_str_1()) + count_chars(n.as_str_2()), n.num_chars());
            for (i, entry) in iter[0..n.height as usize].iter_mut().enumerate() {
                assert_eq!(entry.node as *const Node, n as *const Node);
                assert_eq!(entry.skip_chars, num_chars);

                entry.node = n.nexts()[i].node;
                entry.skip_chars += n.nexts()[i].skip_chars;
            }

            num_bytes += n.str.len_bytes();
            num_chars += n.num_chars();
        }

        for entry in iter[0..head.height as usize].iter() {
            assert!(entry.node.is_null());
            assert_eq!(entry.skip_chars, num_chars);
        }

        assert_eq!(self.num_bytes, num_bytes);
        assert_eq!(self.char_len(), num_chars);
    }
}
