//! Property tests for soft-wrapped layout.

use core_dom::{Dom, Tag};
use core_render::{Layout, Row, Viewport};
use core_config::RevealAlign;
use proptest::prelude::*;

fn layout_of(text: &str, width: u16) -> Layout {
    let mut dom = Dom::new();
    let root = dom.create_element(Tag::Container);
    dom.set_text_content(root, text).unwrap();
    Layout::build(&dom, root, &[], width)
}

proptest! {
    // Wrapping never loses or reorders text; only line breaks disappear.
    #[test]
    fn rows_preserve_text(text in "[a-z 恩é\n]{1,160}", width in 2u16..40) {
        let layout = layout_of(&text, width);
        let joined: String = layout.rows().iter().map(Row::text).collect();
        prop_assert_eq!(joined, text.replace('\n', ""));
    }

    // No row is wider than the viewport when every cluster fits on its own.
    #[test]
    fn rows_fit_width(text in "[a-z 恩\n]{1,160}", width in 2u16..40) {
        let layout = layout_of(&text, width);
        for row in layout.rows() {
            prop_assert!(row.width <= width, "row {:?} wider than {}", row.text(), width);
        }
    }

    // Revealing any row leaves it on screen and keeps the window inside the text.
    #[test]
    fn reveal_keeps_line_visible(
        total in 1usize..300,
        height in 1usize..50,
        start in 0usize..300,
        pick in 0usize..300,
        margin in 0usize..10,
        nearest in any::<bool>(),
    ) {
        let line = pick % total;
        let align = if nearest { RevealAlign::Nearest } else { RevealAlign::Center };
        let mut vp = Viewport::new(start, height);
        vp.clamp(total);
        vp.reveal(line, align, margin, total);
        prop_assert!(vp.contains(line));
        prop_assert!(vp.first_line <= total.saturating_sub(height));
    }
}
