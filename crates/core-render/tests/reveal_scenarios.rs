use core_config::RevealAlign;
use core_dom::{Dom, NodeId, Tag};
use core_render::{
    ClassRoles, Command, Layout, PageFrame, Role, StatusContext, Style, Viewport, Writer, paint,
};
use pretty_assertions::assert_eq;

const ROLES: ClassRoles<'static> = &[("active", Role::Active), ("hit", Role::Highlight)];

/// Sixty numbered verses with a highlighted word on verse `hit_line`.
fn hymnal(hit_line: usize) -> (Dom, NodeId, NodeId) {
    let mut dom = Dom::new();
    let root = dom.create_element(Tag::Container);
    let before: String = (0..hit_line).map(|i| format!("verse {i}\n")).collect();
    let head = dom.create_text(format!("{before}verse {hit_line} "));
    let mark = dom.create_element(Tag::Mark);
    dom.add_class(mark, "hit").unwrap();
    dom.add_class(mark, "active").unwrap();
    let word = dom.create_text("grace");
    dom.append_child(mark, word).unwrap();
    let after: String = (hit_line + 1..60).map(|i| format!("\nverse {i}")).collect();
    let tail = dom.create_text(after);
    for id in [head, mark, tail] {
        dom.append_child(root, id).unwrap();
    }
    (dom, root, mark)
}

#[test]
fn nearest_reveal_scrolls_just_enough() {
    let (dom, root, mark) = hymnal(40);
    let layout = Layout::build(&dom, root, ROLES, 80);
    assert_eq!(layout.row_count(), 60);
    let line = layout.anchor(mark).unwrap();
    assert_eq!(line, 40);

    let mut vp = Viewport::new(0, 10);
    assert!(vp.reveal(line, RevealAlign::Nearest, 2, layout.row_count()));
    assert_eq!(vp.first_line, 33);
    // Already inside the margin band: no movement.
    assert!(!vp.reveal(line, RevealAlign::Nearest, 2, layout.row_count()));
}

#[test]
fn center_reveal_near_the_end_clamps() {
    let (dom, root, mark) = hymnal(58);
    let layout = Layout::build(&dom, root, ROLES, 80);
    let line = layout.anchor(mark).unwrap();
    let mut vp = Viewport::new(0, 10);
    vp.reveal(line, RevealAlign::Center, 0, layout.row_count());
    assert_eq!(vp.first_line, 50);
    assert!(vp.contains(line));
}

#[test]
fn revealed_match_paints_with_active_style() {
    let (dom, root, mark) = hymnal(40);
    let layout = Layout::build(&dom, root, ROLES, 80);
    let mut vp = Viewport::new(0, 10);
    vp.reveal(layout.anchor(mark).unwrap(), RevealAlign::Center, 0, layout.row_count());
    let frame = PageFrame {
        layout: &layout,
        viewport: &vp,
        status: StatusContext {
            input: "grace",
            counter: "1/1",
            nav_visible: true,
        },
        notice: None,
        size: (80, 12),
    };
    let mut w = Writer::new();
    paint(&frame, &mut w);

    let cmds = w.commands();
    let at = cmds
        .iter()
        .position(|c| matches!(c, Command::Print(s) if s == "grace"))
        .expect("highlighted word printed");
    assert!(matches!(
        &cmds[at - 1],
        Command::SetStyle(style) if *style == Style::for_role(Role::Active)
    ));
    assert!(cmds.iter().any(|c| matches!(c, Command::Print(s) if s == "verse 40 ")));
}
