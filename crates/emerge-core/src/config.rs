//! Configuration for entity extraction.
//!
//! Load order: `.emerge/config.toml` → environment variables → defaults.

use crate::error::{Error, Result as CoreResult};
use crate::language::LanguageType;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_READ_AHEAD_TOKENS: usize = 12;
pub const DEFAULT_DEBUG_PREVIEW_TOKENS: usize = 10;

/// Top-level emerge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergeConfig {
    pub extraction: ExtractionConfig,
    /// Per-language tables; a table replaces the built-in one of the same name.
    pub languages: BTreeMap<String, LanguageConfig>,
}

/// What to do with an entity whose scope never closes before end-of-stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclosedScopePolicy {
    /// Keep every token collected up to the end of the stream.
    #[default]
    Flush,
    /// Drop the entity.
    Discard,
}

/// Scope-scanning settings shared by all languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Tokens following an entity keyword handed to the grammar matcher.
    pub read_ahead_tokens: usize,
    /// Tokens shown in the warning emitted for a grammar miss.
    pub debug_preview_tokens: usize,
    pub unclosed_scope: UnclosedScopePolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            read_ahead_tokens: DEFAULT_READ_AHEAD_TOKENS,
            debug_preview_tokens: DEFAULT_DEBUG_PREVIEW_TOKENS,
            unclosed_scope: UnclosedScopePolicy::Flush,
        }
    }
}

/// The three comment markers a language declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentKeywords {
    pub line_comment: String,
    pub start_block_comment: String,
    pub stop_block_comment: String,
}

impl CommentKeywords {
    pub fn new(
        line_comment: impl Into<String>,
        start_block_comment: impl Into<String>,
        stop_block_comment: impl Into<String>,
    ) -> Self {
        Self {
            line_comment: line_comment.into(),
            start_block_comment: start_block_comment.into(),
            stop_block_comment: stop_block_comment.into(),
        }
    }

    /// C-family markers: `//`, `/*`, `*/`.
    pub fn c_style() -> Self {
        Self::new("//", "/*", "*/")
    }

    /// Build from a marker map with the fixed keys `line_comment`,
    /// `start_block_comment` and `stop_block_comment`.
    pub fn from_map(map: &BTreeMap<String, String>) -> CoreResult<Self> {
        let get = |key: &str| {
            map.get(key)
                .cloned()
                .ok_or_else(|| Error::missing_configuration(format!("comment keyword '{key}'")))
        };
        let keywords = Self {
            line_comment: get("line_comment")?,
            start_block_comment: get("start_block_comment")?,
            stop_block_comment: get("stop_block_comment")?,
        };
        keywords.validate()?;
        Ok(keywords)
    }

    /// An empty marker would match every line, so all three must be non-empty.
    pub fn validate(&self) -> CoreResult<()> {
        for (key, value) in [
            ("line_comment", &self.line_comment),
            ("start_block_comment", &self.start_block_comment),
            ("stop_block_comment", &self.stop_block_comment),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_configuration(format!(
                    "comment keyword '{key}' is empty"
                )));
            }
        }
        Ok(())
    }
}

/// Keyword and grammar tables for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub language: LanguageType,
    /// Identifier recorded as `scanned_by` on every result.
    pub scanned_by: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    pub entity_keywords: Vec<String>,
    /// Regex with a named `entity_name` group, matched at the start of the read-ahead.
    pub entity_expression: String,
    pub comment_keywords: CommentKeywords,
    /// Punctuation padded with spaces before re-tokenizing filtered source.
    #[serde(default = "default_token_mappings")]
    pub token_mappings: Vec<String>,
    /// Overrides [`ExtractionConfig::read_ahead_tokens`] for this language.
    #[serde(default)]
    pub read_ahead_tokens: Option<usize>,
    #[serde(default = "default_open_scope")]
    pub open_scope: String,
    #[serde(default = "default_close_scope")]
    pub close_scope: String,
}

pub fn default_token_mappings() -> Vec<String> {
    ["{", "}", "(", ")", "[", "]", ";", ":", ",", "<", ">", "=", "!", "?"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn default_open_scope() -> String {
    "{".to_string()
}

fn default_close_scope() -> String {
    "}".to_string()
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl EmergeConfig {
    /// Load config from `.emerge/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".emerge").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        // Language table names are matched case-insensitively.
        config.languages = std::mem::take(&mut config.languages)
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        env_override(
            "EMERGE_READ_AHEAD_TOKENS",
            &mut config.extraction.read_ahead_tokens,
        );
        env_override(
            "EMERGE_DEBUG_PREVIEW_TOKENS",
            &mut config.extraction.debug_preview_tokens,
        );

        if config.extraction.read_ahead_tokens == 0 {
            anyhow::bail!("extraction.read_ahead_tokens must be greater than zero");
        }
        for (name, language) in &config.languages {
            if language.read_ahead_tokens == Some(0) {
                anyhow::bail!("languages.{name}.read_ahead_tokens must be greater than zero");
            }
        }

        Ok(config)
    }
}
