//! Async terminal input for the page loop.
//!
//! Crossterm events are read from `EventStream` on a Tokio task and translated into
//! [`core_events::InputEvent`]s. Only keys the page reacts to survive translation; key
//! releases and unsupported keys are dropped here so the loop never sees them.

mod async_service;
pub use async_service::AsyncInputShutdown;

use async_service::spawn_async_event_task;

use core_events::{Event, InputEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::event::{KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyModifiers as CMods};
use tokio::task::JoinHandle;

/// Spawn the async input service backed by `crossterm::EventStream`.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination.
pub fn spawn_async_input(
    sender: tokio::sync::mpsc::Sender<Event>,
) -> (JoinHandle<()>, AsyncInputShutdown) {
    spawn_async_event_task(sender)
}

pub(crate) fn map_mods(m: CMods) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CMods::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CMods::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CMods::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}

/// Translate one crossterm key into a page input event.
///
/// Shift is folded into printable characters (the terminal already delivered the shifted
/// glyph); Ctrl-C becomes [`InputEvent::CtrlC`].
pub fn translate_key(key: CKeyEvent) -> Option<InputEvent> {
    let mut mods = map_mods(key.modifiers);
    let code = match key.code {
        CKeyCode::Char(c) => {
            if mods.contains(KeyModifiers::CTRL) && c.eq_ignore_ascii_case(&'c') {
                return Some(InputEvent::CtrlC);
            }
            mods.remove(KeyModifiers::SHIFT);
            KeyCode::Char(c)
        }
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        CKeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    };
    Some(InputEvent::Key(KeyEvent::new(code, mods)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: CKeyCode, mods: CMods) -> CKeyEvent {
        CKeyEvent::new(code, mods)
    }

    #[test]
    fn shifted_chars_are_plain() {
        assert_eq!(
            translate_key(key(CKeyCode::Char('G'), CMods::SHIFT)),
            Some(InputEvent::Key(KeyEvent::plain(KeyCode::Char('G'))))
        );
    }

    #[test]
    fn ctrl_c_is_distinct() {
        assert_eq!(
            translate_key(key(CKeyCode::Char('c'), CMods::CONTROL)),
            Some(InputEvent::CtrlC)
        );
    }

    #[test]
    fn shift_f3_keeps_shift() {
        assert_eq!(
            translate_key(key(CKeyCode::F(3), CMods::SHIFT)),
            Some(InputEvent::Key(KeyEvent::new(
                KeyCode::F(3),
                KeyModifiers::SHIFT
            )))
        );
    }

    #[test]
    fn unsupported_keys_dropped() {
        assert_eq!(translate_key(key(CKeyCode::Tab, CMods::NONE)), None);
        assert_eq!(translate_key(key(CKeyCode::Home, CMods::NONE)), None);
    }
}
