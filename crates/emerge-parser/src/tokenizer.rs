//! Lexing source text into the token streams the extractor scans.

/// Token marking a line boundary in a raw token stream.
pub const NEWLINE_TOKEN: &str = "\n";

/// Split source into whitespace-separated words, keeping a [`NEWLINE_TOKEN`]
/// between lines.
///
/// Joining the result with single spaces yields text whose line structure
/// matches the input, which is what the comment filter relies on.
pub fn scan_tokens(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut lines = source.lines().peekable();
    while let Some(line) = lines.next() {
        tokens.extend(line.split_whitespace().map(str::to_string));
        if lines.peek().is_some() {
            tokens.push(NEWLINE_TOKEN.to_string());
        }
    }
    tokens
}

/// Turns comment-filtered source back into a token stream.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, source: &str) -> Vec<String>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn tokenize(&self, source: &str) -> Vec<String> {
        self(source)
    }
}

/// Pads each mapped punctuation string with spaces, then splits on whitespace.
///
/// Newlines are dropped: the extractor only needs the scope structure.
#[derive(Debug, Clone)]
pub struct MappedTokenizer {
    mappings: Vec<String>,
}

impl MappedTokenizer {
    pub fn new(mappings: Vec<String>) -> Self {
        Self {
            mappings: mappings.into_iter().filter(|m| !m.is_empty()).collect(),
        }
    }

    pub fn mappings(&self) -> &[String] {
        &self.mappings
    }
}

impl Default for MappedTokenizer {
    fn default() -> Self {
        Self::new(emerge_core::config::default_token_mappings())
    }
}

impl Tokenizer for MappedTokenizer {
    fn tokenize(&self, source: &str) -> Vec<String> {
        let mut padded = source.to_string();
        for symbol in &self.mappings {
            padded = padded.replace(symbol.as_str(), &format!(" {symbol} "));
        }
        padded.split_whitespace().map(str::to_string).collect()
    }
}
