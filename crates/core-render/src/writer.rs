//! Terminal writer.
//!
//! A short-lived command list per frame: commands keep their order, positions are absolute
//! with a (0,0) origin and callers keep them in bounds. Nothing reaches the terminal until
//! `flush_to`, which queues everything through crossterm and flushes once.

use crate::style::{Attrs, Style};
use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveTo(u16, u16),
    /// Clear from the current position to the end of the row.
    ClearLine,
    SetStyle(Style),
    ResetStyle,
    Print(String),
    ShowCursorAt(u16, u16),
    HideCursor,
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }

    pub fn clear_line(&mut self) {
        self.cmds.push(Command::ClearLine);
    }

    pub fn set_style(&mut self, style: Style) {
        if style.is_plain() {
            self.cmds.push(Command::ResetStyle);
        } else {
            self.cmds.push(Command::SetStyle(style));
        }
    }

    pub fn reset_style(&mut self) {
        self.cmds.push(Command::ResetStyle);
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn show_cursor_at(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::ShowCursorAt(x, y));
    }

    pub fn hide_cursor(&mut self) {
        self.cmds.push(Command::HideCursor);
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearLine => queue!(out, Clear(ClearType::UntilNewLine))?,
                Command::SetStyle(style) => {
                    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
                    if let Some(fg) = style.fg {
                        queue!(out, SetForegroundColor(fg))?;
                    }
                    if let Some(bg) = style.bg {
                        queue!(out, SetBackgroundColor(bg))?;
                    }
                    if style.attrs.contains(Attrs::BOLD) {
                        queue!(out, SetAttribute(Attribute::Bold))?;
                    }
                    if style.attrs.contains(Attrs::UNDERLINE) {
                        queue!(out, SetAttribute(Attribute::Underlined))?;
                    }
                    if style.attrs.contains(Attrs::REVERSE) {
                        queue!(out, SetAttribute(Attribute::Reverse))?;
                    }
                }
                Command::ResetStyle => queue!(out, SetAttribute(Attribute::Reset), ResetColor)?,
                Command::Print(s) => queue!(out, Print(s))?,
                Command::ShowCursorAt(x, y) => queue!(out, MoveTo(x, y), Show)?,
                Command::HideCursor => queue!(out, Hide)?,
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn flush(self) -> Result<()> {
        self.flush_to(&mut std::io::stdout())
    }
}
