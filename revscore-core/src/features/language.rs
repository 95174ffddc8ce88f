//! Language Features
//!
//! Word-list features parameterized by a [`Language`]. The language is
//! captured by the compute functions when the graph is built; nothing about it
//! is looked up at resolution time.

use std::sync::Arc;

use super::revision::{increase, EditNodes};
use crate::graph::{ComputeError, GraphBuilder, NodeId};
use crate::languages::Language;
use crate::value::{Value, ValueType};

fn matching(words: &Value, predicate: impl Fn(&str) -> bool) -> Result<Value, ComputeError> {
    let words = match words {
        Value::Absent => return Ok(Value::Words(Vec::new())),
        Value::Words(words) => words,
        other => return Err(ComputeError::unexpected(ValueType::Words, other)),
    };
    Ok(Value::Words(
        words.iter().filter(|w| predicate(w)).cloned().collect(),
    ))
}

fn count(words: &Value) -> Result<Value, ComputeError> {
    match words {
        Value::Absent => Ok(Value::Int(0)),
        Value::Words(words) => Ok(Value::Int(words.len() as i64)),
        other => Err(ComputeError::unexpected(ValueType::Words, other)),
    }
}

/// Badword, informal and misspelling nodes for one word list.
#[derive(Debug, Clone, Copy)]
pub struct LanguageNodes {
    pub badwords: NodeId,
    pub badword_count: NodeId,
    pub informals: NodeId,
    pub informal_count: NodeId,
    pub misspellings: NodeId,
    pub misspelling_count: NodeId,
}

impl LanguageNodes {
    /// Register the nodes under `<prefix>.<code>.<name>`.
    pub fn register<C: 'static>(
        builder: &mut GraphBuilder<C>,
        prefix: &str,
        language: &Arc<dyn Language>,
        words: NodeId,
    ) -> Self {
        let name = |suffix: &str| format!("{}.{}.{}", prefix, language.code(), suffix);

        let lang = Arc::clone(language);
        let badwords = builder.feature(name("badwords"), ValueType::Words, [words], move |[w]| {
            matching(w, |word| lang.is_badword(word))
        });
        let lang = Arc::clone(language);
        let informals = builder.feature(name("informals"), ValueType::Words, [words], move |[w]| {
            matching(w, |word| lang.is_informal(word))
        });
        let lang = Arc::clone(language);
        let misspellings =
            builder.feature(name("misspellings"), ValueType::Words, [words], move |[w]| {
                matching(w, |word| lang.is_misspelled(word))
            });

        let mut counted = |suffix: &str, list: NodeId| {
            builder.feature(name(suffix), ValueType::Int, [list], |[w]| count(w))
        };
        let badword_count = counted("badword_count", badwords);
        let informal_count = counted("informal_count", informals);
        let misspelling_count = counted("misspelling_count", misspellings);

        Self {
            badwords,
            badword_count,
            informals,
            informal_count,
            misspellings,
            misspelling_count,
        }
    }
}

/// Language nodes for a revision, its parent, and what the edit added.
#[derive(Debug, Clone, Copy)]
pub struct LanguageEditNodes {
    pub revision: LanguageNodes,
    pub parent: LanguageNodes,
    pub badwords_added: NodeId,
    pub informals_added: NodeId,
    pub misspellings_added: NodeId,
}

impl LanguageEditNodes {
    pub fn register<C: 'static>(
        builder: &mut GraphBuilder<C>,
        language: &Arc<dyn Language>,
        edit: &EditNodes,
    ) -> Self {
        let revision = LanguageNodes::register(builder, "revision", language, edit.revision.words);
        let parent =
            LanguageNodes::register(builder, "parent_revision", language, edit.parent.words);

        let mut added = |suffix: &str, current: NodeId, previous: NodeId| {
            builder.feature(
                format!("revision.{}.{}", language.code(), suffix),
                ValueType::Int,
                [current, previous],
                |[current, previous]| increase(current, previous),
            )
        };
        let badwords_added = added("badwords_added", revision.badword_count, parent.badword_count);
        let informals_added = added(
            "informals_added",
            revision.informal_count,
            parent.informal_count,
        );
        let misspellings_added = added(
            "misspellings_added",
            revision.misspelling_count,
            parent.misspelling_count,
        );

        Self {
            revision,
            parent,
            badwords_added,
            informals_added,
            misspellings_added,
        }
    }

    /// Numeric features suitable for a model.
    pub fn numeric(&self) -> Vec<NodeId> {
        vec![
            self.revision.badword_count,
            self.revision.informal_count,
            self.revision.misspelling_count,
            self.badwords_added,
            self.informals_added,
            self.misspellings_added,
        ]
    }
}
