//! Key bindings for the search page.

use core_events::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Insert(char),
    Backspace,
    Submit,
    Next,
    Previous,
    ClearInput,
    PageUp,
    PageDown,
    Quit,
}

pub fn binding_for(key: &KeyEvent) -> Option<Binding> {
    let ctrl = key.mods.contains(KeyModifiers::CTRL);
    let shift = key.mods.contains(KeyModifiers::SHIFT);
    let alt = key.mods.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('n') if ctrl => Some(Binding::Next),
        KeyCode::Char('p') if ctrl => Some(Binding::Previous),
        KeyCode::Char('u') if ctrl => Some(Binding::ClearInput),
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(c) => Some(Binding::Insert(c)),
        KeyCode::Backspace => Some(Binding::Backspace),
        KeyCode::Enter => Some(Binding::Submit),
        KeyCode::Down => Some(Binding::Next),
        KeyCode::Up => Some(Binding::Previous),
        KeyCode::F(3) if shift => Some(Binding::Previous),
        KeyCode::F(3) => Some(Binding::Next),
        KeyCode::F(_) => None,
        KeyCode::PageUp => Some(Binding::PageUp),
        KeyCode::PageDown => Some(Binding::PageDown),
        KeyCode::Esc => Some(Binding::Quit),
    }
}
