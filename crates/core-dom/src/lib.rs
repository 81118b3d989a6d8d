//! Display tree: a small DOM-like arena the page renders and the search engine mutates.
//!
//! Contract:
//! - Nodes live in a generational arena owned by [`Dom`]; [`NodeId`] handles to removed
//!   nodes fail lookups (`DomError::StaleNode`) rather than aliasing recycled slots.
//! - Tree operations mirror the DOM subset the page needs: append, replace with a run of
//!   nodes, remove, unwrap, `normalize`, class lists and text content.
//! - Bulk edits (`replace_with_nodes`, `unwrap_class`, `normalize`, `clear_children`) rewrite
//!   each affected child list once, so their cost is linear in the number of siblings.
//! - Every traversal uses an explicit stack; no operation recurses on tree depth.
//! - Text content is never logged; only node counts and byte lengths.

pub mod node;
pub mod walk;

pub use node::{Element, NodeId, NodeKind, Tag};
pub use walk::{TextSegment, TextSegments};

use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} is not live")]
    StaleNode(NodeId),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0} is not a text node")]
    NotText(NodeId),
    #[error("node {child} cannot be inserted under {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    #[error("node {reference} is not a child of {parent}")]
    NotAChild { parent: NodeId, reference: NodeId },
}

pub type DomResult<T> = Result<T, DomError>;

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

#[derive(Debug, Default)]
pub struct Dom {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes (attached or detached).
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    // ---------------------------------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------------------------------

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        };
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            data: Some(data),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub fn create_element(&mut self, tag: Tag) -> NodeId {
        self.alloc(NodeKind::Element(Element::new(tag)))
    }

    pub fn create_text<S: Into<String>>(&mut self, text: S) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_line_break(&mut self) -> NodeId {
        self.alloc(NodeKind::LineBreak)
    }

    pub fn create_comment<S: Into<String>>(&mut self, text: S) -> NodeId {
        self.alloc(NodeKind::Comment(text.into()))
    }

    // ---------------------------------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------------------------------

    fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
    }

    fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
    }

    fn live_mut(&mut self, id: NodeId) -> DomResult<&mut NodeData> {
        self.data_mut(id).ok_or(DomError::StaleNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.data(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.data(id).map(|d| &d.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.kind(id).and_then(NodeKind::as_element)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.kind(id).and_then(NodeKind::as_text)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).and_then(|d| d.parent)
    }

    /// Children of `id`; empty for leaves and stale handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    // ---------------------------------------------------------------------------------------------
    // Structure mutation
    // ---------------------------------------------------------------------------------------------

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cursor = Some(of);
        while let Some(id) = cursor {
            if id == candidate {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_data = self.data(parent).ok_or(DomError::StaleNode(parent))?;
        if !matches!(parent_data.kind, NodeKind::Element(_)) {
            return Err(DomError::NotAnElement(parent));
        }
        if !self.contains(child) {
            return Err(DomError::StaleNode(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Unlink `id` from its parent (if any). The subtree stays live.
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let parent = self.live_mut(id)?.parent.take();
        if let Some(parent) = parent
            && let Some(pd) = self.data_mut(parent)
        {
            pd.children.retain(|c| *c != id);
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.check_insert(parent, child)?;
        self.detach(child)?;
        self.live_mut(child)?.parent = Some(parent);
        self.live_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach `id` and free its whole subtree. Handles into the subtree become stale.
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        self.detach(id)?;
        self.free_subtree(id);
        Ok(())
    }

    /// Free a subtree whose root is already unlinked from its parent's child list.
    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        let mut freed = 0usize;
        while let Some(next) = stack.pop() {
            let Some(slot) = self.slots.get_mut(next.index as usize) else {
                continue;
            };
            if slot.generation != next.generation {
                continue;
            }
            if let Some(data) = slot.data.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(next.index);
                stack.extend(data.children);
                freed += 1;
            }
        }
        self.live -= freed;
    }

    /// Install `children` as the complete child list of `parent` in one pass. Nodes in
    /// `children` must be detached or already children of `parent`; former children left out
    /// of the new list are freed.
    fn rebuild_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> DomResult<()> {
        for &child in &children {
            self.check_insert(parent, child)?;
            if self.parent(child).is_some_and(|p| p != parent) {
                return Err(DomError::HierarchyRequest { parent, child });
            }
        }
        let old = std::mem::take(&mut self.live_mut(parent)?.children);
        for &child in &old {
            if let Some(d) = self.data_mut(child) {
                d.parent = None;
            }
        }
        for &child in &children {
            self.live_mut(child)?.parent = Some(parent);
        }
        for child in old {
            if self.parent(child).is_none() {
                self.free_subtree(child);
            }
        }
        self.live_mut(parent)?.children = children;
        Ok(())
    }

    /// Put the detached `replacements`, in order, where `old` sits in its parent, then free
    /// `old`'s subtree. The parent's child list is spliced once regardless of how many nodes
    /// go in.
    pub fn replace_with_nodes(&mut self, old: NodeId, replacements: Vec<NodeId>) -> DomResult<()> {
        let parent = self.parent(old);
        let Some(parent) = parent else {
            if !self.contains(old) {
                return Err(DomError::StaleNode(old));
            }
            return self.remove(old);
        };
        for &child in &replacements {
            self.check_insert(parent, child)?;
            if child == old || self.parent(child).is_some() {
                return Err(DomError::HierarchyRequest { parent, child });
            }
        }
        let pos = self
            .children(parent)
            .iter()
            .position(|c| *c == old)
            .ok_or(DomError::NotAChild {
                parent,
                reference: old,
            })?;
        for &child in &replacements {
            self.live_mut(child)?.parent = Some(parent);
        }
        let _ = self
            .live_mut(parent)?
            .children
            .splice(pos..=pos, replacements);
        self.live_mut(old)?.parent = None;
        self.free_subtree(old);
        Ok(())
    }

    /// Free every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) -> DomResult<()> {
        self.rebuild_children(parent, Vec::new())
    }

    /// Replace all children of `parent` by a single text node (none when `text` is empty).
    pub fn set_text_content(&mut self, parent: NodeId, text: &str) -> DomResult<Option<NodeId>> {
        if self.element(parent).is_none() {
            return Err(if self.contains(parent) {
                DomError::NotAnElement(parent)
            } else {
                DomError::StaleNode(parent)
            });
        }
        self.clear_children(parent)?;
        if text.is_empty() {
            return Ok(None);
        }
        let node = self.create_text(text);
        self.append_child(parent, node)?;
        Ok(Some(node))
    }

    /// Replace every element beneath `root` that carries `class` with a text node holding its
    /// text content. Each affected parent has its child list rebuilt once. Returns how many
    /// elements were unwrapped.
    pub fn unwrap_class(&mut self, root: NodeId, class: &str) -> DomResult<usize> {
        if !self.contains(root) {
            return Err(DomError::StaleNode(root));
        }
        let mut unwrapped = 0usize;
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let children = self.children(parent).to_vec();
            if !children.iter().any(|c| self.has_class(*c, class)) {
                stack.extend(children.into_iter().filter(|c| self.element(*c).is_some()));
                continue;
            }
            let mut rebuilt = Vec::with_capacity(children.len());
            for child in children {
                if self.has_class(child, class) {
                    let text = self.text_content(child);
                    rebuilt.push(self.create_text(text));
                    unwrapped += 1;
                } else {
                    if self.element(child).is_some() {
                        stack.push(child);
                    }
                    rebuilt.push(child);
                }
            }
            self.rebuild_children(parent, rebuilt)?;
        }
        trace!(target: "dom", unwrapped, "unwrap_class");
        Ok(unwrapped)
    }

    // ---------------------------------------------------------------------------------------------
    // Classes
    // ---------------------------------------------------------------------------------------------

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut Element> {
        match &mut self.live_mut(id)?.kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> DomResult<bool> {
        Ok(self.element_mut(id)?.add_class(class))
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> DomResult<bool> {
        Ok(self.element_mut(id)?.remove_class(class))
    }

    // ---------------------------------------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------------------------------------

    /// Descendants of `root` (excluding `root`) in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Elements beneath `root` carrying `class`, in document order.
    pub fn query_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    pub fn text_segments(&self, root: NodeId) -> TextSegments<'_> {
        TextSegments::new(self, root)
    }

    /// Concatenated text beneath `id`. Line breaks contribute `\n`; comments nothing.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            match self.kind(next) {
                Some(NodeKind::Text(t)) => out.push_str(t),
                Some(NodeKind::LineBreak) => out.push('\n'),
                Some(NodeKind::Element(_)) => {
                    stack.extend(self.children(next).iter().rev().copied())
                }
                Some(NodeKind::Comment(_)) | None => {}
            }
        }
        out
    }

    /// Byte length of [`Dom::text_content`] without allocating it.
    pub fn text_len(&self, id: NodeId) -> usize {
        let mut len = 0usize;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            match self.kind(next) {
                Some(NodeKind::Text(t)) => len += t.len(),
                Some(NodeKind::LineBreak) => len += 1,
                Some(NodeKind::Element(_)) => stack.extend(self.children(next).iter().copied()),
                Some(NodeKind::Comment(_)) | None => {}
            }
        }
        len
    }

    /// DOM `normalize()`: within every element beneath and including `root`, merge runs of
    /// adjacent text siblings into the first of the run and drop empty text nodes.
    pub fn normalize(&mut self, root: NodeId) -> DomResult<()> {
        if !self.contains(root) {
            return Err(DomError::StaleNode(root));
        }
        let mut merged = 0usize;
        let mut dropped = 0usize;
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let children = self.children(parent).to_vec();
            let mut kept = Vec::with_capacity(children.len());
            let mut run_head: Option<NodeId> = None;
            let mut changed = false;
            for child in children {
                match self.kind(child) {
                    Some(NodeKind::Text(t)) if t.is_empty() => {
                        dropped += 1;
                        changed = true;
                    }
                    Some(NodeKind::Text(_)) => match run_head {
                        Some(head) => {
                            let tail = match self.data_mut(child) {
                                Some(NodeData {
                                    kind: NodeKind::Text(t),
                                    ..
                                }) => std::mem::take(t),
                                _ => String::new(),
                            };
                            if let Some(NodeData {
                                kind: NodeKind::Text(head_text),
                                ..
                            }) = self.data_mut(head)
                            {
                                head_text.push_str(&tail);
                            }
                            merged += 1;
                            changed = true;
                        }
                        None => {
                            run_head = Some(child);
                            kept.push(child);
                        }
                    },
                    Some(NodeKind::Element(_)) => {
                        run_head = None;
                        stack.push(child);
                        kept.push(child);
                    }
                    _ => {
                        run_head = None;
                        kept.push(child);
                    }
                }
            }
            if changed {
                self.rebuild_children(parent, kept)?;
            }
        }
        trace!(target: "dom", merged, dropped, "normalize");
        Ok(())
    }
}
