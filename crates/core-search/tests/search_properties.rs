//! Property tests for match counting, clearing and cyclic navigation.

mod common;

use common::Page;
use core_search::{HIGHLIGHT_CLASS, SearchOutcome};
use proptest::prelude::*;

/// Non-overlapping, left-to-right, ASCII case-insensitive occurrence count.
fn naive_count(text: &str, term: &str) -> usize {
    text.to_ascii_lowercase()
        .match_indices(&term.to_ascii_lowercase())
        .count()
}

fn doc() -> impl Strategy<Value = String> {
    "[abAB \n]{1,60}"
}

fn term() -> impl Strategy<Value = String> {
    "[abAB]{1,3}"
}

proptest! {
    #[test]
    fn match_count_equals_occurrence_count(text in doc(), t in term()) {
        let mut page = Page::loaded(&text);
        let expected = naive_count(&text, &t);
        let out = page.search(&t);
        if expected == 0 {
            prop_assert_eq!(out, SearchOutcome::NoMatch);
        } else {
            prop_assert_eq!(out, SearchOutcome::Found { total: expected });
        }
        prop_assert_eq!(page.session.matches().len(), expected);
        let markers = page.dom.query_class(page.session.container(), HIGHLIGHT_CLASS);
        let recorded: Vec<_> = page.session.matches().iter().map(|m| m.marker).collect();
        prop_assert_eq!(markers, recorded, "markers 1:1 with the match set, document order");
        let starts: Vec<_> = page.session.matches().iter().map(|m| m.start).collect();
        prop_assert!(starts.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(page.content(), text);
    }

    #[test]
    fn clear_is_idempotent_and_restores_text(text in doc(), t in term()) {
        let mut page = Page::loaded(&text);
        page.search(&t);
        page.clear();
        let container = page.session.container();
        let once = page.dom.children(container).to_vec();
        let len_once = page.dom.len();
        page.clear();
        prop_assert_eq!(page.dom.children(container), once.as_slice());
        prop_assert_eq!(page.dom.len(), len_once);
        prop_assert!(once.len() <= 1, "fragments merged back into one text node");
        prop_assert_eq!(page.content(), text);
        prop_assert_eq!(page.view.counter.to_string(), "0/0");
    }

    #[test]
    fn next_n_times_returns_to_start(text in doc(), t in term(), hops in 0usize..5) {
        let mut page = Page::loaded(&text);
        page.search(&t);
        let n = page.session.matches().len();
        prop_assume!(n > 0);
        for _ in 0..hops {
            page.next();
        }
        let start = page.session.cursor();
        for _ in 0..n {
            page.next();
        }
        prop_assert_eq!(page.session.cursor(), start);
    }

    #[test]
    fn previous_after_search_lands_on_last(text in doc(), t in term()) {
        let mut page = Page::loaded(&text);
        page.search(&t);
        let n = page.session.matches().len();
        prop_assume!(n > 0);
        prop_assert_eq!(page.previous(), Some(n - 1));
        prop_assert_eq!(page.view.counter.to_string(), format!("{}/{}", n, n));
    }
}
