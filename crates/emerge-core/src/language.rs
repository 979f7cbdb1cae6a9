//! Language tags carried by every scanned result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The language a [`crate::results::FileResult`] was scanned as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageType {
    Java,
    Kotlin,
    Objc,
    Swift,
    Ruby,
    Groovy,
    Javascript,
    Typescript,
    C,
    Cpp,
    Python,
    Go,
}

impl LanguageType {
    pub const ALL: [LanguageType; 12] = [
        Self::Java,
        Self::Kotlin,
        Self::Objc,
        Self::Swift,
        Self::Ruby,
        Self::Groovy,
        Self::Javascript,
        Self::Typescript,
        Self::C,
        Self::Cpp,
        Self::Python,
        Self::Go,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Objc => "objc",
            Self::Swift => "swift",
            Self::Ruby => "ruby",
            Self::Groovy => "groovy",
            Self::Javascript => "javascript",
            Self::Typescript => "typescript",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Python => "python",
            Self::Go => "go",
        }
    }

    /// Case-insensitive lookup by name, accepting a few common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "java" => Some(Self::Java),
            "kotlin" | "kt" => Some(Self::Kotlin),
            "objc" | "objective-c" => Some(Self::Objc),
            "swift" => Some(Self::Swift),
            "ruby" | "rb" => Some(Self::Ruby),
            "groovy" => Some(Self::Groovy),
            "javascript" | "js" => Some(Self::Javascript),
            "typescript" | "ts" => Some(Self::Typescript),
            "c" => Some(Self::C),
            "cpp" | "c++" => Some(Self::Cpp),
            "python" | "py" => Some(Self::Python),
            "go" | "golang" => Some(Self::Go),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.') {
            "java" => Some(Self::Java),
            "kt" | "kts" => Some(Self::Kotlin),
            "m" | "mm" => Some(Self::Objc),
            "swift" => Some(Self::Swift),
            "rb" => Some(Self::Ruby),
            "groovy" | "gradle" => Some(Self::Groovy),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::Javascript),
            "ts" | "tsx" => Some(Self::Typescript),
            "c" | "h" => Some(Self::C),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => Some(Self::Cpp),
            "py" => Some(Self::Python),
            "go" => Some(Self::Go),
            _ => None,
        }
    }
}

impl fmt::Display for LanguageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
