// Iteration over a rope's leaf nodes and their string content. Each leaf's gap buffer stores
// its bytes as two contiguous segments (before and after the gap), so a "chunk" of content is
// one gap-buffer segment, not one node; an empty segment is simply skipped.

use crate::rope::Node;

/// Iterates over the underlying leaf nodes of a rope, in order. Yields `&Node`, exposing the
/// raw two-segment layout; most callers want [`ContentIter`] instead.
pub(crate) struct NodeIter<'a> {
    next: Option<&'a Node>,
}

impl<'a> NodeIter<'a> {
    pub(crate) fn new(head: &'a Node) -> Self {
        NodeIter { next: Some(head) }
    }
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let here = self.next.take()?;
        self.next = unsafe { here.next_ptr().as_ref() };
        Some(here)
    }
}

/// Iterates over a rope's content as a sequence of `&str` chunks, in order, without allocating.
///
/// Each chunk boundary falls on a Unicode scalar boundary but chunk *sizes* are an
/// implementation detail (driven by leaf capacity and gap position) and shouldn't be relied
/// upon.
pub struct ContentIter<'a> {
    nodes: NodeIter<'a>,
    // Which segment of the current node (if any) we still owe the caller.
    pending_second_half: Option<&'a str>,
}

impl<'a> ContentIter<'a> {
    pub(crate) fn new(head: &'a Node) -> Self {
        ContentIter { nodes: NodeIter::new(head), pending_second_half: None }
    }
}

impl<'a> Iterator for ContentIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(s) = self.pending_second_half.take() {
            if !s.is_empty() { return Some(s); }
        }

        loop {
            let node = self.nodes.next()?;
            let first = node.as_str_1();
            let second = node.as_str_2();

            if !second.is_empty() { self.pending_second_half = Some(second); }
            if !first.is_empty() { return Some(first); }
            if !second.is_empty() {
                self.pending_second_half = None;
                return Some(second);
            }
            // Both segments empty (only possible for the head of an empty rope); keep going.
        }
    }
}
