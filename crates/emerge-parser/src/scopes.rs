//! Scope-based entity extraction.
//!
//! Scans a comment-free token stream for entity keywords, asks the grammar
//! matcher for the declared name, then collects every token from the keyword
//! up to the delimiter that closes the entity's scope.

use crate::comments::filter_source_tokens_without_comments;
use crate::grammar::{EntityExpression, create_read_ahead_string};
use crate::tokenizer::{MappedTokenizer, Tokenizer};
use emerge_core::config::{
    CommentKeywords, DEFAULT_DEBUG_PREVIEW_TOKENS, DEFAULT_READ_AHEAD_TOKENS, ExtractionConfig,
    UnclosedScopePolicy,
};
use emerge_core::results::{EntityResult, FileId, FileResult};
use emerge_core::statistics::StatisticsKey;
use emerge_core::{Error, Result};
use std::collections::HashSet;

/// Knobs of the scope scan that are independent of the language grammar.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub read_ahead_tokens: usize,
    pub debug_preview_tokens: usize,
    pub unclosed_scope: UnclosedScopePolicy,
    pub open_scope: String,
    pub close_scope: String,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            read_ahead_tokens: DEFAULT_READ_AHEAD_TOKENS,
            debug_preview_tokens: DEFAULT_DEBUG_PREVIEW_TOKENS,
            unclosed_scope: UnclosedScopePolicy::Flush,
            open_scope: "{".to_string(),
            close_scope: "}".to_string(),
        }
    }
}

impl From<&ExtractionConfig> for ExtractionOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            read_ahead_tokens: config.read_ahead_tokens,
            debug_preview_tokens: config.debug_preview_tokens,
            unclosed_scope: config.unclosed_scope,
            ..Self::default()
        }
    }
}

/// The language-specific inputs of one extraction call.
#[derive(Clone, Copy)]
pub struct ScopeGrammar<'a> {
    pub entity_keywords: &'a HashSet<String>,
    pub entity_expression: &'a dyn EntityExpression,
    pub comment_keywords: &'a CommentKeywords,
}

impl ScopeGrammar<'_> {
    /// Reject wiring that would make extraction meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.entity_keywords.is_empty() {
            return Err(Error::missing_configuration("entity keywords"));
        }
        if self.entity_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::invalid_configuration(
                "entity keywords contain an empty keyword",
            ));
        }
        self.comment_keywords.validate()
    }
}

/// Token span of one entity's scope, relative to its keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScopeSpan {
    /// Number of tokens from the keyword through the closing delimiter.
    pub len: usize,
    /// Whether depth returned to zero before the stream ended.
    pub closed: bool,
}

/// Walk `tokens` (starting at the keyword) with a signed depth counter and stop
/// on the close delimiter that brings depth back to zero after at least one
/// scope was opened.
pub(crate) fn measure_scope(tokens: &[String], open: &str, close: &str) -> ScopeSpan {
    let mut depth: i64 = 0;
    let mut opened = false;
    for (index, token) in tokens.iter().enumerate() {
        if token == open {
            depth += 1;
            opened = true;
        } else if token == close {
            depth -= 1;
            if opened && depth == 0 {
                return ScopeSpan {
                    len: index + 1,
                    closed: true,
                };
            }
        }
    }
    ScopeSpan {
        len: tokens.len(),
        closed: false,
    }
}

/// Extract one [`EntityResult`] per recognized entity declaration in `file`.
///
/// `parent` is the handle `file` has (or will have) in its result set. Every
/// keyword occurrence bumps exactly one of the hit/miss counters of the file's
/// analysis. Entities come back in detection order; each declaration gets its
/// own token bucket, so same-named entities stay separate.
pub fn generate_entity_results_from_scopes(
    file: &FileResult,
    parent: FileId,
    grammar: &ScopeGrammar<'_>,
    tokenizer: &dyn Tokenizer,
    options: &ExtractionOptions,
) -> Result<Vec<EntityResult>> {
    grammar.validate()?;
    if options.read_ahead_tokens == 0 {
        return Err(Error::invalid_configuration(
            "read-ahead window must be greater than zero",
        ));
    }

    let statistics = &file.analysis().statistics;
    let source =
        filter_source_tokens_without_comments(file.scanned_tokens(), grammar.comment_keywords);
    let tokens = tokenizer.tokenize(&source);

    let mut found_entities: Vec<(String, Vec<String>)> = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        if !grammar.entity_keywords.contains(token) {
            continue;
        }
        let following = &tokens[index + 1..];
        let read_ahead = create_read_ahead_string(token, following, options.read_ahead_tokens);

        let declaration = match grammar.entity_expression.parse(&read_ahead) {
            Ok(declaration) => declaration,
            Err(_) => {
                statistics.increment(StatisticsKey::ParsingMisses);
                let preview =
                    create_read_ahead_string(token, following, options.debug_preview_tokens);
                tracing::warn!(
                    file = %file.unique_name(),
                    read_ahead = %read_ahead,
                    next_tokens = %preview,
                    "could not parse entity declaration"
                );
                continue;
            }
        };
        statistics.increment(StatisticsKey::ParsingHits);
        tracing::debug!(
            file = %file.unique_name(),
            entity = %declaration.entity_name,
            "entity definition found"
        );

        let span = measure_scope(&tokens[index..], &options.open_scope, &options.close_scope);
        if !span.closed && options.unclosed_scope == UnclosedScopePolicy::Discard {
            tracing::debug!(
                file = %file.unique_name(),
                entity = %declaration.entity_name,
                "discarding entity with unclosed scope"
            );
            continue;
        }
        found_entities.push((
            declaration.entity_name,
            tokens[index..index + span.len].to_vec(),
        ));
    }

    statistics.add(
        StatisticsKey::ExtractedEntityResults,
        found_entities.len() as u64,
    );

    Ok(found_entities
        .into_iter()
        .map(|(entity_name, scanned_tokens)| {
            EntityResult::from_file_scope(file, parent, entity_name, scanned_tokens)
        })
        .collect())
}

/// Scope extraction as a method on [`FileResult`], using the default
/// tokenizer and options.
pub trait ScopeParsing {
    fn generate_entity_results_from_scopes(
        &self,
        parent: FileId,
        entity_keywords: &HashSet<String>,
        entity_expression: &dyn EntityExpression,
        comment_keywords: &CommentKeywords,
    ) -> Result<Vec<EntityResult>>;
}

impl ScopeParsing for FileResult {
    fn generate_entity_results_from_scopes(
        &self,
        parent: FileId,
        entity_keywords: &HashSet<String>,
        entity_expression: &dyn EntityExpression,
        comment_keywords: &CommentKeywords,
    ) -> Result<Vec<EntityResult>> {
        let grammar = ScopeGrammar {
            entity_keywords,
            entity_expression,
            comment_keywords,
        };
        generate_entity_results_from_scopes(
            self,
            parent,
            &grammar,
            &MappedTokenizer::default(),
            &ExtractionOptions::default(),
        )
    }
}
