//! Node identity and payload types for the display tree.

use std::fmt;

/// Generational handle into a [`crate::Dom`] arena.
///
/// Slots are recycled after removal; the generation makes a handle to a removed
/// node fail lookups instead of aliasing whatever node reused the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Element tags understood by the page renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Generic block container (the content area).
    Container,
    /// Block holding a standalone message such as a load error.
    Paragraph,
    /// Inline highlight marker wrapping one match.
    Mark,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Container => "div",
            Tag::Paragraph => "p",
            Tag::Mark => "mark",
        }
    }

    pub fn is_block(self) -> bool {
        matches!(self, Tag::Container | Tag::Paragraph)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    classes: Vec<String>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            classes: Vec::new(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Returns true when the class was not present before.
    pub(crate) fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_string());
        true
    }

    /// Returns true when the class was present.
    pub(crate) fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    /// Explicit line break; contributes `\n` to text content.
    LineBreak,
    /// Non-content node; never rendered, never searched.
    Comment(String),
}

impl NodeKind {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeKind::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text(_))
    }
}
