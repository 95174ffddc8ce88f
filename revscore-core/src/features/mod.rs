//! Feature Library
//!
//! Standard nodes for scoring a single edit:
//!
//! - `revision`: text, words, character and symbol counts for a revision and
//!   its parent, and the differences between them
//! - `ratio`: the proportion-of-symbols-added primitive
//! - `language`: badword, informal and misspelling counts for a [`Language`]
//!
//! [`standard_graph`] registers all of them in one graph. The two text inputs
//! are named `revision.text` and `parent_revision.text`; callers seed them
//! into the per-request cache.

pub mod language;
pub mod ratio;
pub mod revision;

use std::sync::Arc;

use crate::graph::{Graph, GraphBuilder, GraphError, NodeId};
use crate::languages::Language;

pub use language::{LanguageEditNodes, LanguageNodes};
pub use ratio::proportion_of_symbol_added;
pub use revision::{EditNodes, RevisionNodes};

/// Handles to the nodes registered by [`standard_graph`].
#[derive(Debug, Clone, Copy)]
pub struct StandardFeatures {
    pub edit: EditNodes,
    pub language: Option<LanguageEditNodes>,
}

impl StandardFeatures {
    /// The text inputs every request must seed: `(revision, parent)`.
    pub fn inputs(&self) -> (NodeId, NodeId) {
        (self.edit.revision.text, self.edit.parent.text)
    }

    /// Numeric features, in a stable order.
    pub fn default_targets(&self) -> Vec<NodeId> {
        let mut targets = self.edit.numeric();
        if let Some(language) = &self.language {
            targets.extend(language.numeric());
        }
        targets
    }
}

/// Register the revision features, plus language features when a language is
/// given, and freeze the graph.
pub fn standard_graph<C: 'static>(
    language: Option<Arc<dyn Language>>,
) -> Result<(Graph<C>, StandardFeatures), GraphError> {
    let mut builder = GraphBuilder::new();
    let edit = EditNodes::register(&mut builder);
    let language = language
        .as_ref()
        .map(|language| LanguageEditNodes::register(&mut builder, language, &edit));

    let graph = builder.build()?;
    Ok((graph, StandardFeatures { edit, language }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_graph_is_acyclic() {
        let (graph, features) = standard_graph::<()>(None).unwrap();
        graph.check_acyclic().unwrap();

        assert!(features.language.is_none());
        assert_eq!(features.default_targets().len(), 8);
        assert_eq!(
            graph.find("revision.proportion_of_symbol_added"),
            Some(features.edit.proportion_of_symbol_added)
        );

        let (revision, parent) = features.inputs();
        assert!(graph.node(revision).unwrap().is_input());
        assert!(graph.node(parent).unwrap().is_input());
    }
}
