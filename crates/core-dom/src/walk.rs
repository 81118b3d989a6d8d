//! Lazy text segment walk.
//!
//! Yields the text nodes beneath a root in document order using an explicit stack, so
//! pathological nesting cannot exhaust the call stack. Decorated regions (`Mark`
//! elements) and comments are skipped without descending. Each segment carries its byte
//! offset within `Dom::text_content(root)`; skipped marks and line breaks still advance
//! that offset so offsets stay aligned with the flattened text.

use crate::node::{NodeId, NodeKind, Tag};
use crate::Dom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment {
    pub node: NodeId,
    /// Byte offset of the segment's first byte within the root's text content.
    pub offset: usize,
}

pub struct TextSegments<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
    offset: usize,
}

impl<'a> TextSegments<'a> {
    pub(crate) fn new(dom: &'a Dom, root: NodeId) -> Self {
        let stack = dom.children(root).iter().rev().copied().collect();
        Self {
            dom,
            stack,
            offset: 0,
        }
    }
}

impl Iterator for TextSegments<'_> {
    type Item = TextSegment;

    fn next(&mut self) -> Option<TextSegment> {
        while let Some(id) = self.stack.pop() {
            let Some(kind) = self.dom.kind(id) else {
                continue;
            };
            match kind {
                NodeKind::Text(text) => {
                    let segment = TextSegment {
                        node: id,
                        offset: self.offset,
                    };
                    self.offset += text.len();
                    return Some(segment);
                }
                NodeKind::LineBreak => self.offset += 1,
                NodeKind::Comment(_) => {}
                NodeKind::Element(el) if el.tag == Tag::Mark => {
                    self.offset += self.dom.text_len(id);
                }
                NodeKind::Element(_) => {
                    self.stack
                        .extend(self.dom.children(id).iter().rev().copied());
                }
            }
        }
        None
    }
}
