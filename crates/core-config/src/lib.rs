//! Configuration loading and parsing.
//!
//! Parses `hymnal.toml` (or an override path supplied by the binary):
//!
//! ```toml
//! [source]
//! path = "hymnal.txt"
//!
//! [reveal]
//! align = "center"   # or "nearest"
//! margin = 2         # rows kept visible around a revealed match with "nearest"
//!
//! [notice]
//! duration_ms = 3000
//! ```
//!
//! Every field is optional. A missing file or a parse error yields defaults. The reveal
//! margin is clamped at `(text_rows - 1) / 2` once the viewport is known; the raw value is
//! kept so a resize can re-clamp.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::fs;
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "hymnal.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigContext {
    pub viewport_rows: u16,
    /// Rows reserved below the content (search bar, notice line).
    pub chrome_rows: u16,
}

impl ConfigContext {
    pub fn new(viewport_rows: u16, chrome_rows: u16) -> Self {
        Self {
            viewport_rows,
            chrome_rows,
        }
    }

    pub fn text_rows(&self) -> u16 {
        self.viewport_rows.saturating_sub(self.chrome_rows)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    #[serde(default = "SourceConfig::default_path")]
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl SourceConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("hymnal.txt")
    }
}

/// Where a revealed match lands in the viewport.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RevealAlign {
    /// Put the match line in the middle of the viewport.
    #[default]
    Center,
    /// Scroll as little as possible, keeping `margin` rows of context.
    Nearest,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevealConfig {
    #[serde(default)]
    pub align: RevealAlign,
    #[serde(default)]
    pub margin: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct NoticeConfig {
    #[serde(default = "NoticeConfig::default_duration_ms")]
    pub duration_ms: u32,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            duration_ms: Self::default_duration_ms(),
        }
    }
}

impl NoticeConfig {
    const fn default_duration_ms() -> u32 {
        3000
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms))
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub notice: NoticeConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
    pub effective_reveal_margin: u16,
}

/// Prefer `hymnal.toml` in the working directory, then the platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("hymnal").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            file,
            effective_reveal_margin: 0,
        }),
        Err(e) => {
            warn!(target: "config", file = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn source_path(&self) -> &Path {
        &self.file.source.path
    }

    /// Clamp the reveal margin against the text rows of `ctx`. Returns the effective value.
    pub fn apply_context(&mut self, ctx: ConfigContext) -> u16 {
        let raw = self.file.reveal.margin;
        let text_rows = ctx.text_rows();
        let max = text_rows.saturating_sub(1) / 2;
        let clamped = raw.min(max);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                max,
                text_rows,
                viewport_rows = ctx.viewport_rows,
                "reveal_margin_clamped"
            );
        }
        self.effective_reveal_margin = clamped;
        clamped
    }

    /// Re-clamp after a resize. `Some(new)` when the effective margin changed.
    pub fn recompute_with_context(&mut self, ctx: ConfigContext) -> Option<u16> {
        let prev = self.effective_reveal_margin;
        let current = self.apply_context(ctx);
        if current != prev { Some(current) } else { None }
    }
}
