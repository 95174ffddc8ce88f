//! Language Classifiers
//!
//! A [`Language`] answers three questions about a single token: is it a
//! profanity, is it informal/slang, is it misspelled. Feature nodes that need
//! those answers take an `Arc<dyn Language>` at graph construction time (see
//! [`crate::features::language`]), so the resolver treats them like any other
//! node.
//!
//! [`RegexLanguage`] is the standard implementation: one compiled regex union
//! per curated word list, plus an optional spell-check [`Dictionary`].
//! Construction fails immediately when a required dictionary cannot be found,
//! so a misconfigured deployment stops at startup rather than mid-batch.

mod dictionary;
mod regex_language;

pub mod persian;

use std::path::PathBuf;

use thiserror::Error;

pub use dictionary::{Dictionary, DictionaryLocator, WordListDictionary, DICT_PATH_ENV};
pub use regex_language::RegexLanguage;

/// Per-token predicates for one language.
pub trait Language: Send + Sync {
    /// Language code, e.g. `fa`.
    fn code(&self) -> &str;

    fn is_badword(&self, word: &str) -> bool;

    fn is_informal(&self, word: &str) -> bool;

    /// Always `false` for languages without a dictionary.
    fn is_misspelled(&self, word: &str) -> bool;
}

/// A language could not be constructed.
#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("No dictionary found for {language:?}. {hint}")]
    ResourceUnavailable { language: String, hint: String },

    #[error("invalid {list} pattern for {language:?}: {source}")]
    Pattern {
        language: String,
        list: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("could not read dictionary {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Build a language by code.
pub fn from_code(code: &str, locator: &DictionaryLocator) -> Result<RegexLanguage, LanguageError> {
    match code {
        persian::CODE => persian::build(locator),
        other => Err(LanguageError::ResourceUnavailable {
            language: other.to_string(),
            hint: format!("No word lists are bundled for {:?}.", other),
        }),
    }
}
