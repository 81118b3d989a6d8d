//! Role → terminal attributes.
//!
//! Highlights read as a marker pen: every match gets a yellow background, the active one is
//! additionally bold and underlined so it stays distinguishable on terminals with a poor
//! palette. Load errors are red.

use crate::layout::Role;
use bitflags::bitflags;
use crossterm::style::Color;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attrs: u8 {
        const BOLD      = 0b0000_0001;
        const UNDERLINE = 0b0000_0010;
        const REVERSE   = 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attrs,
}

impl Style {
    pub const PLAIN: Style = Style {
        fg: None,
        bg: None,
        attrs: Attrs::empty(),
    };

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }

    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Plain => Self::PLAIN,
            Role::Highlight => Style {
                fg: Some(Color::Black),
                bg: Some(Color::Yellow),
                attrs: Attrs::empty(),
            },
            Role::Active => Style {
                fg: Some(Color::Black),
                bg: Some(Color::DarkYellow),
                attrs: Attrs::BOLD | Attrs::UNDERLINE,
            },
            Role::Error => Style {
                fg: Some(Color::Red),
                bg: None,
                attrs: Attrs::BOLD,
            },
        }
    }

    /// Search bar row.
    pub fn bar() -> Self {
        Style {
            fg: None,
            bg: None,
            attrs: Attrs::REVERSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_is_distinct_from_highlight() {
        let hl = Style::for_role(Role::Highlight);
        let active = Style::for_role(Role::Active);
        assert_ne!(hl, active);
        assert!(active.attrs.contains(Attrs::BOLD));
        assert!(Style::for_role(Role::Plain).is_plain());
    }
}
