//! Stroke-filter configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All host options from `libstroke_core::Config` (flattened via serde)
//! - The guide key separating phonetic code from stroke code
//! - Database name, tag scope and display policy of the filter
//! - The pattern deciding whether a partial selection keeps composing
//!
//! # Example
//!
//! ```rust
//! use libstroke::StrokeConfig;
//!
//! let config = StrokeConfig::from_toml_str("guide_key = \"'\"\nshow_others = false").unwrap();
//! assert_eq!(config.guide_key, "'");
//! assert_eq!(config.base.page_size, 5);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_GUIDE_KEY: &str = ";";
pub const DEFAULT_DB_NAME: &str = "stroke";
pub const DEFAULT_CODE_PATTERN: &str = "[a-z]";

static DEFAULT_CODE_REGEX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(DEFAULT_CODE_PATTERN).ok());

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StrokeConfig {
    /// Host fields (data dir, segment tags, paging)
    #[serde(flatten)]
    pub base: libstroke_core::Config,

    /// Literal string introducing the stroke code; empty disables filtering
    pub guide_key: String,

    /// Stroke database name, resolved inside `base.data_dir`
    pub db: String,

    /// Keep unmatched candidates after the matched ones
    pub show_others: bool,

    /// Segment tags the filter runs on
    pub tags: Vec<String>,

    /// Regex tested against the pending preedit after a selection.
    /// A hit keeps composing; a miss commits. Empty never matches.
    pub code_pattern: String,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            base: libstroke_core::Config::default(),
            guide_key: DEFAULT_GUIDE_KEY.to_string(),
            db: DEFAULT_DB_NAME.to_string(),
            show_others: true,
            tags: vec!["general".to_string()],
            code_pattern: DEFAULT_CODE_PATTERN.to_string(),
        }
    }
}

impl StrokeConfig {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn base(&self) -> &libstroke_core::Config {
        &self.base
    }

    pub fn tag_set(&self) -> BTreeSet<String> {
        self.tags.iter().cloned().collect()
    }

    /// Compile `code_pattern`.
    pub fn code_pattern(&self) -> CodePattern {
        CodePattern::new(&self.code_pattern)
    }
}

/// Compiled continuation pattern.
///
/// Holds `None` when the configured pattern is empty or fails to compile;
/// such a pattern matches nothing.
#[derive(Debug, Clone)]
pub struct CodePattern(Option<Regex>);

impl CodePattern {
    pub fn new(pattern: &str) -> Self {
        if pattern == DEFAULT_CODE_PATTERN {
            return Self::default();
        }
        if pattern.is_empty() {
            return Self::never();
        }
        match Regex::new(pattern) {
            Ok(re) => Self(Some(re)),
            Err(e) => {
                warn!(pattern, error = %e, "invalid code pattern, selections will always commit");
                Self::never()
            }
        }
    }

    pub fn never() -> Self {
        Self(None)
    }

    /// Unanchored search, like `Regex::is_match`.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.as_ref().is_some_and(|re| re.is_match(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref().map_or("", Regex::as_str)
    }
}

impl Default for CodePattern {
    fn default() -> Self {
        Self(DEFAULT_CODE_REGEX.clone())
    }
}
