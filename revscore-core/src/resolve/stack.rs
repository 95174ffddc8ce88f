//! Visitation Stack
//!
//! The resolver walks the graph iteratively. Each frame on this stack is a
//! node that is "in progress": its dependencies are being resolved and its
//! own compute function has not run yet. A frame also remembers which
//! dependency to look at next.
//!
//! # Implementation
//!
//! Frames live in an insertion-ordered map, so the same structure answers
//! "what is on top", "is this node already in progress" (the cycle check) and
//! "how did we get here" (the cycle report) without a second index.

use indexmap::IndexMap;

use crate::graph::NodeId;

#[derive(Debug, Default)]
pub(crate) struct VisitStack {
    /// In-progress node -> index of the next dependency to visit.
    frames: IndexMap<NodeId, usize>,
}

impl VisitStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push a node. Returns `false` if it is already in progress.
    pub(crate) fn push(&mut self, id: NodeId) -> bool {
        if self.frames.contains_key(&id) {
            return false;
        }
        self.frames.insert(id, 0);
        true
    }

    /// The top node and the index of its next dependency.
    pub(crate) fn top(&self) -> Option<(NodeId, usize)> {
        self.frames.last().map(|(id, next)| (*id, *next))
    }

    /// Move the top frame on to its next dependency.
    pub(crate) fn advance(&mut self) {
        if let Some((_, next)) = self.frames.last_mut() {
            *next += 1;
        }
    }

    pub(crate) fn pop(&mut self) -> Option<NodeId> {
        self.frames.pop().map(|(id, _)| id)
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.frames.contains_key(&id)
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The in-progress chain from `id` to the top, closed by `id` again.
    pub(crate) fn cycle_from(&self, id: NodeId) -> Vec<NodeId> {
        let start = self.frames.get_index_of(&id).unwrap_or(0);
        self.frames
            .keys()
            .skip(start)
            .copied()
            .chain(std::iter::once(id))
            .collect()
    }
}
