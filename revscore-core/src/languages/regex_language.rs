//! Regex-backed language predicates.

use std::fmt;

use regex::{Regex, RegexBuilder};

use super::{Dictionary, Language, LanguageError};

/// A [`Language`] built from curated regex word lists.
///
/// Each list is compiled into a single case-insensitive alternation that must
/// match at the start of the token. An empty list never matches.
pub struct RegexLanguage {
    code: String,
    badwords: Option<Regex>,
    informals: Option<Regex>,
    dictionary: Option<Box<dyn Dictionary>>,
}

impl RegexLanguage {
    pub fn new<S: AsRef<str>>(
        code: impl Into<String>,
        badwords: &[S],
        informals: &[S],
        dictionary: Option<Box<dyn Dictionary>>,
    ) -> Result<Self, LanguageError> {
        let code = code.into();
        let badwords = compile(&code, "badword", badwords)?;
        let informals = compile(&code, "informal", informals)?;
        Ok(Self {
            code,
            badwords,
            informals,
            dictionary,
        })
    }

    pub fn has_dictionary(&self) -> bool {
        self.dictionary.is_some()
    }
}

fn compile<S: AsRef<str>>(
    code: &str,
    list: &'static str,
    patterns: &[S],
) -> Result<Option<Regex>, LanguageError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let union = patterns
        .iter()
        .map(|p| format!("(?:{})", p.as_ref()))
        .collect::<Vec<_>>()
        .join("|");

    RegexBuilder::new(&format!("^(?:{})", union))
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|source| LanguageError::Pattern {
            language: code.to_string(),
            list,
            source,
        })
}

impl Language for RegexLanguage {
    fn code(&self) -> &str {
        &self.code
    }

    fn is_badword(&self, word: &str) -> bool {
        self.badwords.as_ref().is_some_and(|re| re.is_match(word))
    }

    fn is_informal(&self, word: &str) -> bool {
        self.informals.as_ref().is_some_and(|re| re.is_match(word))
    }

    fn is_misspelled(&self, word: &str) -> bool {
        self.dictionary
            .as_ref()
            .is_some_and(|dictionary| !dictionary.contains(word))
    }
}

impl fmt::Debug for RegexLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexLanguage")
            .field("code", &self.code)
            .field("badwords", &self.badwords.is_some())
            .field("informals", &self.informals.is_some())
            .field("dictionary", &self.dictionary.is_some())
            .finish()
    }
}
