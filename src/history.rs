use image::RgbaImage;

use crate::{core::Offset, filters::FrameFilter, frame::Frame, metadata::MetadataKind, raster};

/// One recorded edit in a frame's undo chain. The payload type is fixed per
/// variant, so there is no runtime payload-mismatch failure mode.
#[derive(Clone, Debug)]
pub enum Change {
    /// Placeholder record; applies as a pure copy.
    Blank,
    /// Pixel filter evaluated over the frame's buffer.
    Filter(FrameFilter),
    /// Replacement image drawn over the frame's buffer at the origin.
    Replace(RgbaImage),
    /// Metadata transform scaling delay or geometry by `ratio`.
    Metadata { ratio: f32, kind: MetadataKind },
}

impl Change {
    /// Empty records apply as pure copies and are skipped during replay.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Metadata { ratio, .. } => *ratio <= 0.0,
            Self::Filter(_) | Self::Replace(_) => false,
        }
    }

    /// Returns a history-stripped deep copy of `frame` with this edit
    /// applied. Empty records return the plain copy.
    pub fn apply(&self, frame: &Frame) -> Frame {
        let mut out = frame.detached();
        if self.is_empty() {
            return out;
        }
        match self {
            Self::Blank => {}
            Self::Filter(filter) => out.set_image(filter.apply(frame.image())),
            Self::Replace(img) => {
                let mut canvas = frame.image().clone();
                raster::draw_over(&mut canvas, img, Offset::default());
                out.set_image(canvas);
            }
            Self::Metadata { ratio, kind } => kind.operate(&mut out, *ratio),
        }
        out
    }
}

/// Stable handle into a [`History`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
struct Node {
    change: Change,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// A frame's doubly-linked edit history, stored as an arena with a free
/// list. Slot 0 is the sentinel `Blank` head; it is never unlinked, and
/// `current` is always reachable from it via `next` links.
#[derive(Clone, Debug)]
pub struct History {
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: NodeId,
    current: NodeId,
    len: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        let sentinel = Node {
            change: Change::Blank,
            prev: None,
            next: None,
        };
        Self {
            nodes: vec![sentinel],
            free: Vec::new(),
            head: NodeId(0),
            current: NodeId(0),
            len: 0,
        }
    }

    /// Number of recorded edits, excluding the sentinel.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once any non-sentinel record exists.
    pub fn has_change(&self) -> bool {
        self.current != self.head
    }

    pub fn head_id(&self) -> NodeId {
        self.head
    }

    pub fn current_id(&self) -> NodeId {
        self.current
    }

    pub fn current_change(&self) -> &Change {
        &self.nodes[self.current.0].change
    }

    pub fn has_next(&self, id: NodeId) -> bool {
        self.nodes[id.0].next.is_some()
    }

    pub fn has_prev(&self, id: NodeId) -> bool {
        self.nodes[id.0].prev.is_some()
    }

    pub fn is_first(&self, id: NodeId) -> bool {
        !self.has_prev(id)
    }

    pub fn is_last(&self, id: NodeId) -> bool {
        !self.has_next(id)
    }

    /// Links `change` as the new `current` record. A `None` payload
    /// coalesces to `Blank` so chains across frames stay in lockstep.
    pub fn append(&mut self, change: Option<Change>) -> NodeId {
        let change = change.unwrap_or(Change::Blank);
        // Any records still linked after current belong to a retracted
        // branch; release their slots before extending the chain.
        let orphaned = self.nodes[self.current.0].next;
        self.release_suffix(orphaned);

        let id = self.alloc(Node {
            change,
            prev: Some(self.current),
            next: None,
        });
        self.nodes[self.current.0].next = Some(id);
        self.current = id;
        self.len += 1;
        id
    }

    /// Removes the `current` record, relinking its neighbors, and moves
    /// `current` to the predecessor. No-op on the sentinel.
    pub fn undo(&mut self) -> bool {
        if !self.has_change() {
            return false;
        }
        let Node { prev, next, .. } = self.take(self.current);
        if let Some(p) = prev {
            self.nodes[p.0].next = next;
        }
        if let Some(n) = next {
            self.nodes[n.0].prev = prev;
        }
        self.current = prev.unwrap_or(self.head);
        self.len -= 1;
        true
    }

    /// All recorded changes in chain order, sentinel excluded.
    pub fn replay(&self) -> ChainIter<'_> {
        ChainIter {
            history: self,
            next: self.nodes[self.head.0].next,
        }
    }

    /// Changes recorded strictly after `current`, in chain order.
    pub fn after_current(&self) -> ChainIter<'_> {
        ChainIter {
            history: self,
            next: self.nodes[self.current.0].next,
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                NodeId(slot)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Clears a slot and hands it to the free list, dropping any pixel
    /// payload immediately.
    fn take(&mut self, id: NodeId) -> Node {
        let node = std::mem::replace(
            &mut self.nodes[id.0],
            Node {
                change: Change::Blank,
                prev: None,
                next: None,
            },
        );
        self.free.push(id.0);
        node
    }

    fn release_suffix(&mut self, from: Option<NodeId>) {
        let mut cursor = from;
        while let Some(id) = cursor {
            let node = self.take(id);
            cursor = node.next;
            self.len -= 1;
        }
    }
}

pub struct ChainIter<'a> {
    history: &'a History,
    next: Option<NodeId>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Change;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.history.nodes[id.0];
        self.next = node.next;
        Some(&node.change)
    }
}
