//! Revision Features
//!
//! Nodes describing a revision's text and how it differs from its parent.
//! The text of both revisions is an input: it is fetched outside the engine
//! and seeded into each request's cache. A missing parent (the page was just
//! created) is seeded as [`Value::Absent`] and reads as an empty revision.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::ratio::register_proportion;
use crate::graph::{ComputeError, GraphBuilder, NodeId};
use crate::value::{Value, ValueType};

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    // Letters only: digits and underscores split words.
    WORD.get_or_init(|| Regex::new(r"[^\W\d_]+").expect("word pattern is valid"))
}

fn text_of(value: &Value) -> Result<&str, ComputeError> {
    match value {
        Value::Absent => Ok(""),
        Value::Text(text) => Ok(text),
        other => Err(ComputeError::unexpected(ValueType::Text, other)),
    }
}

fn words_of(value: &Value) -> Result<&[String], ComputeError> {
    match value {
        Value::Absent => Ok(&[]),
        Value::Words(words) => Ok(words),
        other => Err(ComputeError::unexpected(ValueType::Words, other)),
    }
}

fn int_of(value: &Value) -> Result<i64, ComputeError> {
    match value {
        Value::Absent => Ok(0),
        Value::Int(n) => Ok(*n),
        other => Err(ComputeError::unexpected(ValueType::Int, other)),
    }
}

/// Split text into words.
pub fn words(text: &Value) -> Result<Value, ComputeError> {
    let words = word_pattern()
        .find_iter(text_of(text)?)
        .map(|m| m.as_str().to_string())
        .collect();
    Ok(Value::Words(words))
}

/// Number of characters.
pub fn chars(text: &Value) -> Result<Value, ComputeError> {
    Ok(Value::Int(text_of(text)?.chars().count() as i64))
}

/// Number of characters that are neither alphanumeric nor whitespace.
pub fn symbols(text: &Value) -> Result<Value, ComputeError> {
    let count = text_of(text)?
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count();
    Ok(Value::Int(count as i64))
}

/// Words in `current` that are not matched by a word in `previous`,
/// counting repeats.
pub fn words_added(current: &Value, previous: &Value) -> Result<Value, ComputeError> {
    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for word in words_of(previous)? {
        *remaining.entry(word.as_str()).or_default() += 1;
    }

    let mut added = 0;
    for word in words_of(current)? {
        match remaining.get_mut(word.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => added += 1,
        }
    }
    Ok(Value::Int(added))
}

/// `current - previous`, floored at zero.
pub fn increase(current: &Value, previous: &Value) -> Result<Value, ComputeError> {
    Ok(Value::Int((int_of(current)? - int_of(previous)?).max(0)))
}

/// `current - previous`.
pub fn change(current: &Value, previous: &Value) -> Result<Value, ComputeError> {
    Ok(Value::Int(int_of(current)? - int_of(previous)?))
}

/// Nodes for a single revision's text.
#[derive(Debug, Clone, Copy)]
pub struct RevisionNodes {
    /// Input: the revision text, or absent.
    pub text: NodeId,
    pub words: NodeId,
    pub chars: NodeId,
    pub symbols: NodeId,
}

impl RevisionNodes {
    /// Register the nodes under `<prefix>.<name>`.
    pub fn register<C: 'static>(builder: &mut GraphBuilder<C>, prefix: &str) -> Self {
        let text = builder.input(format!("{}.text", prefix), ValueType::Text);
        let words = builder.feature(format!("{}.words", prefix), ValueType::Words, [text], |[t]| {
            self::words(t)
        });
        let chars = builder.feature(format!("{}.chars", prefix), ValueType::Int, [text], |[t]| {
            self::chars(t)
        });
        let symbols = builder.feature(format!("{}.symbols", prefix), ValueType::Int, [text], |[t]| {
            self::symbols(t)
        });
        Self {
            text,
            words,
            chars,
            symbols,
        }
    }
}

/// Nodes comparing a revision to its parent.
#[derive(Debug, Clone, Copy)]
pub struct EditNodes {
    pub revision: RevisionNodes,
    pub parent: RevisionNodes,
    pub chars_change: NodeId,
    pub words_added: NodeId,
    pub words_removed: NodeId,
    pub symbols_added: NodeId,
    pub proportion_of_symbol_added: NodeId,
}

impl EditNodes {
    pub fn register<C: 'static>(builder: &mut GraphBuilder<C>) -> Self {
        let revision = RevisionNodes::register(builder, "revision");
        let parent = RevisionNodes::register(builder, "parent_revision");

        let chars_change = builder.feature(
            "revision.chars_change",
            ValueType::Int,
            [revision.chars, parent.chars],
            |[current, previous]| change(current, previous),
        );
        let words_added = builder.feature(
            "revision.words_added",
            ValueType::Int,
            [revision.words, parent.words],
            |[current, previous]| self::words_added(current, previous),
        );
        let words_removed = builder.feature(
            "revision.words_removed",
            ValueType::Int,
            [parent.words, revision.words],
            |[previous, current]| self::words_added(previous, current),
        );
        let symbols_added = builder.feature(
            "revision.symbols_added",
            ValueType::Int,
            [revision.symbols, parent.symbols],
            |[current, previous]| increase(current, previous),
        );
        let proportion_of_symbol_added = register_proportion(
            builder,
            "revision.proportion_of_symbol_added",
            revision.symbols,
            symbols_added,
        );

        Self {
            revision,
            parent,
            chars_change,
            words_added,
            words_removed,
            symbols_added,
            proportion_of_symbol_added,
        }
    }

    /// Numeric features suitable for a model.
    pub fn numeric(&self) -> Vec<NodeId> {
        vec![
            self.revision.chars,
            self.revision.symbols,
            self.parent.chars,
            self.chars_change,
            self.words_added,
            self.words_removed,
            self.symbols_added,
            self.proportion_of_symbol_added,
        ]
    }
}
