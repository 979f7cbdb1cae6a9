//! The grammar-matcher seam: read-ahead string in, entity name (or failure) out.

use emerge_core::{Error, Result};
use regex::Regex;
use thiserror::Error;

/// Named capture group a [`RegexEntityExpression`] must define.
pub const ENTITY_NAME_GROUP: &str = "entity_name";

/// A recognized entity declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDeclaration {
    pub entity_name: String,
}

/// The read-ahead string did not match the entity grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no entity declaration in '{read_ahead}'")]
pub struct MatchFailure {
    pub read_ahead: String,
}

/// Translates a read-ahead string into an entity declaration.
pub trait EntityExpression: Send + Sync {
    fn parse(&self, read_ahead: &str) -> std::result::Result<EntityDeclaration, MatchFailure>;
}

impl<F> EntityExpression for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn parse(&self, read_ahead: &str) -> std::result::Result<EntityDeclaration, MatchFailure> {
        self(read_ahead)
            .map(|entity_name| EntityDeclaration { entity_name })
            .ok_or_else(|| MatchFailure {
                read_ahead: read_ahead.to_string(),
            })
    }
}

/// Regex-backed matcher. The pattern is anchored at the start of the read-ahead
/// string and must capture the declared name in the `entity_name` group.
#[derive(Debug, Clone)]
pub struct RegexEntityExpression {
    regex: Regex,
}

impl RegexEntityExpression {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(Error::missing_configuration("entity expression"));
        }
        let anchored = if pattern.starts_with('^') {
            pattern.to_string()
        } else {
            format!("^(?:{pattern})")
        };
        let regex = Regex::new(&anchored).map_err(|e| {
            Error::invalid_configuration(format!("entity expression '{pattern}': {e}"))
        })?;
        if !regex
            .capture_names()
            .any(|name| name == Some(ENTITY_NAME_GROUP))
        {
            return Err(Error::invalid_configuration(format!(
                "entity expression '{pattern}' has no '{ENTITY_NAME_GROUP}' group"
            )));
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl EntityExpression for RegexEntityExpression {
    fn parse(&self, read_ahead: &str) -> std::result::Result<EntityDeclaration, MatchFailure> {
        self.regex
            .captures(read_ahead)
            .and_then(|caps| caps.name(ENTITY_NAME_GROUP))
            .map(|m| m.as_str())
            .filter(|name| !name.is_empty())
            .map(|name| EntityDeclaration {
                entity_name: name.to_string(),
            })
            .ok_or_else(|| MatchFailure {
                read_ahead: read_ahead.to_string(),
            })
    }
}

/// The keyword followed by at most `window` of the tokens after it, space-joined.
pub fn create_read_ahead_string(keyword: &str, following: &[String], window: usize) -> String {
    let mut read_ahead = keyword.to_string();
    for token in following.iter().take(window) {
        read_ahead.push(' ');
        read_ahead.push_str(token);
    }
    read_ahead
}
