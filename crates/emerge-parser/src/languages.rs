//! Built-in language tables and compiled per-language parsers.
//!
//! Each TOML file in `languages/` describes one language (keywords, comment
//! markers, entity grammar). User configuration may replace any of them or add
//! new ones under `[languages.<name>]`.

use crate::grammar::RegexEntityExpression;
use crate::scopes::{ExtractionOptions, ScopeGrammar, generate_entity_results_from_scopes};
use crate::tokenizer::MappedTokenizer;
use emerge_core::config::{EmergeConfig, ExtractionConfig, LanguageConfig};
use emerge_core::language::LanguageType;
use emerge_core::results::{EntityResult, FileId, FileResult};
use emerge_core::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("groovy", include_str!("../languages/groovy.toml")),
    ("java", include_str!("../languages/java.toml")),
    ("kotlin", include_str!("../languages/kotlin.toml")),
    ("swift", include_str!("../languages/swift.toml")),
    ("typescript", include_str!("../languages/typescript.toml")),
];

/// Parse the embedded language tables, keyed by name.
pub fn builtin_language_configs() -> Result<BTreeMap<String, LanguageConfig>> {
    BUILTIN_LANGUAGES
        .iter()
        .map(|(name, source)| {
            toml::from_str::<LanguageConfig>(source)
                .map(|config| ((*name).to_string(), config))
                .map_err(|e| {
                    Error::invalid_configuration(format!("built-in language '{name}': {e}"))
                })
        })
        .collect()
}

/// A language table compiled into everything one extraction call needs.
#[derive(Debug)]
pub struct LanguageParser {
    name: String,
    config: LanguageConfig,
    entity_keywords: HashSet<String>,
    entity_expression: RegexEntityExpression,
    tokenizer: MappedTokenizer,
    options: ExtractionOptions,
}

impl LanguageParser {
    pub fn from_config(
        name: impl Into<String>,
        config: &LanguageConfig,
        extraction: &ExtractionConfig,
    ) -> Result<Self> {
        let name = name.into().to_lowercase();
        let entity_keywords: HashSet<String> = config.entity_keywords.iter().cloned().collect();
        if entity_keywords.is_empty() {
            return Err(Error::missing_configuration(format!(
                "entity keywords for language '{name}'"
            )));
        }
        config.comment_keywords.validate()?;
        let entity_expression = RegexEntityExpression::new(&config.entity_expression)?;

        let mut options = ExtractionOptions::from(extraction);
        if let Some(window) = config.read_ahead_tokens {
            options.read_ahead_tokens = window;
        }
        if config.open_scope.is_empty() || config.close_scope.is_empty() {
            return Err(Error::missing_configuration(format!(
                "scope delimiters for language '{name}'"
            )));
        }
        options.open_scope.clone_from(&config.open_scope);
        options.close_scope.clone_from(&config.close_scope);

        Ok(Self {
            name,
            config: config.clone(),
            entity_keywords,
            entity_expression,
            tokenizer: MappedTokenizer::new(config.token_mappings.clone()),
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> LanguageType {
        self.config.language
    }

    pub fn scanned_by(&self) -> &str {
        &self.config.scanned_by
    }

    pub fn extensions(&self) -> &[String] {
        &self.config.extensions
    }

    pub fn entity_keywords(&self) -> &HashSet<String> {
        &self.entity_keywords
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    pub fn tokenizer(&self) -> &MappedTokenizer {
        &self.tokenizer
    }

    pub fn grammar(&self) -> ScopeGrammar<'_> {
        ScopeGrammar {
            entity_keywords: &self.entity_keywords,
            entity_expression: &self.entity_expression,
            comment_keywords: &self.config.comment_keywords,
        }
    }

    /// Extract the entities of `file`, which lives at handle `parent`.
    pub fn parse(&self, file: &FileResult, parent: FileId) -> Result<Vec<EntityResult>> {
        generate_entity_results_from_scopes(
            file,
            parent,
            &self.grammar(),
            &self.tokenizer,
            &self.options,
        )
    }
}

/// All configured language parsers, looked up by name, extension or tag.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    parsers: BTreeMap<String, LanguageParser>,
    by_extension: HashMap<String, String>,
    by_language: HashMap<LanguageType, String>,
}

impl LanguageRegistry {
    /// Built-in languages with default extraction settings.
    pub fn builtin() -> Result<Self> {
        Self::from_config(&EmergeConfig::default())
    }

    /// Built-in languages, overridden and extended by `config.languages`.
    pub fn from_config(config: &EmergeConfig) -> Result<Self> {
        let mut tables = builtin_language_configs()?;
        for (name, table) in &config.languages {
            tables.insert(name.clone(), table.clone());
        }

        let mut registry = Self::default();
        for (name, table) in &tables {
            registry.insert(LanguageParser::from_config(
                name.clone(),
                table,
                &config.extraction,
            )?);
        }
        Ok(registry)
    }

    /// Add or replace a parser. The last parser registered for an extension wins.
    pub fn insert(&mut self, parser: LanguageParser) {
        let name = parser.name().to_lowercase();
        for ext in parser.extensions() {
            self.by_extension
                .insert(ext.trim_start_matches('.').to_lowercase(), name.clone());
        }
        self.by_language.insert(parser.language(), name.clone());
        self.parsers.insert(name, parser);
    }

    pub fn get(&self, name: &str) -> Option<&LanguageParser> {
        self.parsers.get(&name.to_lowercase())
    }

    pub fn for_extension(&self, ext: &str) -> Option<&LanguageParser> {
        let name = self
            .by_extension
            .get(&ext.trim_start_matches('.').to_lowercase())?;
        self.parsers.get(name)
    }

    pub fn for_language(&self, language: LanguageType) -> Option<&LanguageParser> {
        let name = self.by_language.get(&language)?;
        self.parsers.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageParser> {
        self.parsers.values()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
