//! Spell-check dictionaries.
//!
//! Dictionaries are plain word lists in the hunspell/myspell `.dic` layout:
//! an optional first line holding the entry count, then one `word[/FLAGS]`
//! per line. Affix rules are not applied; a word is known if it appears
//! verbatim (or lowercased).

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::LanguageError;

/// Extra dictionary directories, separated like `PATH`.
pub const DICT_PATH_ENV: &str = "REVSCORE_DICT_PATH";

const SYSTEM_DIRS: &[&str] = &[
    "/usr/share/hunspell",
    "/usr/share/myspell",
    "/usr/share/myspell/dicts",
];

/// Membership test for correctly spelled words.
pub trait Dictionary: Send + Sync {
    fn contains(&self, word: &str) -> bool;
}

/// A dictionary backed by an in-memory word set.
#[derive(Debug, Clone, Default)]
pub struct WordListDictionary {
    words: HashSet<String>,
}

impl WordListDictionary {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a `.dic` word list.
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut words = HashSet::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let entry = line.split('/').next().unwrap_or("").trim();
            if entry.is_empty() || (index == 0 && entry.chars().all(|c| c.is_ascii_digit())) {
                continue;
            }
            words.insert(entry.to_string());
        }
        Ok(Self { words })
    }

    pub fn from_path(path: &Path) -> Result<Self, LanguageError> {
        let io_error = |source| LanguageError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_error)?;
        Self::from_reader(BufReader::new(file)).map_err(io_error)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordListDictionary {
    fn contains(&self, word: &str) -> bool {
        self.words.contains(word) || self.words.contains(&word.to_lowercase())
    }
}

/// Finds dictionary files for a language code.
#[derive(Debug, Clone)]
pub struct DictionaryLocator {
    search_paths: Vec<PathBuf>,
}

impl DictionaryLocator {
    /// A locator with no search paths.
    pub fn empty() -> Self {
        Self {
            search_paths: Vec::new(),
        }
    }

    /// Directories from [`DICT_PATH_ENV`] followed by the usual system locations.
    pub fn system() -> Self {
        let mut locator = Self::empty();
        if let Some(paths) = env::var_os(DICT_PATH_ENV) {
            locator.search_paths.extend(env::split_paths(&paths));
        }
        locator
            .search_paths
            .extend(SYSTEM_DIRS.iter().map(PathBuf::from));
        locator
    }

    /// Search `dir` before the existing paths.
    pub fn with_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.insert(0, dir.into());
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find `<code>.dic`, or failing that the first `<code>_*.dic`, in search order.
    pub fn locate(&self, code: &str) -> Option<PathBuf> {
        for dir in &self.search_paths {
            let exact = dir.join(format!("{}.dic", code));
            if exact.is_file() {
                return Some(exact);
            }

            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            let prefix = format!("{}_", code);
            let mut regional: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| {
                    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                    name.starts_with(&prefix) && name.ends_with(".dic")
                })
                .collect();
            regional.sort();
            if let Some(path) = regional.into_iter().next() {
                return Some(path);
            }
        }
        None
    }

    /// Locate and load the dictionary for `code`.
    ///
    /// `hint` is appended to the error when nothing is found.
    pub fn load(&self, code: &str, hint: &str) -> Result<WordListDictionary, LanguageError> {
        let path = self
            .locate(code)
            .ok_or_else(|| LanguageError::ResourceUnavailable {
                language: code.to_string(),
                hint: hint.to_string(),
            })?;
        let dictionary = WordListDictionary::from_path(&path)?;
        debug!(
            language = code,
            path = %path.display(),
            words = dictionary.len(),
            "loaded dictionary"
        );
        Ok(dictionary)
    }
}

impl Default for DictionaryLocator {
    fn default() -> Self {
        Self::system()
    }
}
