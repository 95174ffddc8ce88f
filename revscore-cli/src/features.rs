//! Feature selection shared by the subcommands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use revscore_core::features::standard_graph;
use revscore_core::graph::{Graph, NodeId};
use revscore_core::languages::{self, DictionaryLocator, Language};
use revscore_core::value::ValueType;
use tracing::debug;

/// Selects the standard numeric feature set.
pub const DEFAULT_FEATURES: &str = "default";

#[derive(Args, Debug)]
pub struct FeatureArgs {
    /// Feature names, in column order (`default` selects the standard numeric set)
    #[arg(required = true, value_name = "FEATURE")]
    pub features: Vec<String>,

    /// Language code for badword, informal and misspelling features (e.g. fa)
    #[arg(long)]
    pub language: Option<String>,

    /// Directory searched first for spell-check dictionaries
    #[arg(long, value_name = "DIR")]
    pub dict_dir: Option<PathBuf>,
}

/// The graph plus the resolved feature columns.
pub struct Selection {
    pub graph: Graph,
    /// Text inputs: `(revision, parent)`.
    pub inputs: (NodeId, NodeId),
    pub targets: Vec<NodeId>,
    pub names: Vec<String>,
    pub types: Vec<ValueType>,
}

impl FeatureArgs {
    fn language(&self) -> Result<Option<Arc<dyn Language>>> {
        let Some(code) = &self.language else {
            return Ok(None);
        };

        let mut locator = DictionaryLocator::system();
        if let Some(dir) = &self.dict_dir {
            locator = locator.with_path(dir);
        }
        let language: Arc<dyn Language> = Arc::new(
            languages::from_code(code, &locator)
                .with_context(|| format!("could not load language {:?}", code))?,
        );
        Ok(Some(language))
    }

    /// Build the feature graph and look up the requested columns.
    pub fn select(&self) -> Result<Selection> {
        let (graph, standard) =
            standard_graph(self.language()?).context("could not build feature graph")?;

        let mut targets = Vec::new();
        for name in &self.features {
            if name == DEFAULT_FEATURES {
                targets.extend(standard.default_targets());
            } else {
                let id = graph
                    .find(name)
                    .with_context(|| format!("unknown feature {:?}", name))?;
                targets.push(id);
            }
        }

        let mut names = Vec::with_capacity(targets.len());
        let mut types = Vec::with_capacity(targets.len());
        for &id in &targets {
            let node = graph
                .node(id)
                .with_context(|| format!("{} is not part of the feature graph", id))?;
            names.push(node.name().to_string());
            types.push(node.returns());
        }
        debug!(features = ?names, "selected features");

        Ok(Selection {
            inputs: standard.inputs(),
            graph,
            targets,
            names,
            types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(features: &[&str]) -> FeatureArgs {
        FeatureArgs {
            features: features.iter().map(|f| f.to_string()).collect(),
            language: None,
            dict_dir: None,
        }
    }

    #[test]
    fn selects_named_and_default_features() {
        let selection = args(&["revision.words_added", "default"]).select().unwrap();

        assert_eq!(selection.names[0], "revision.words_added");
        assert_eq!(selection.types[0], ValueType::Int);
        assert_eq!(selection.targets.len(), 9);
        assert_eq!(selection.names.last().unwrap(), "revision.proportion_of_symbol_added");
        assert_eq!(selection.types.last(), Some(&ValueType::Real));
    }

    #[test]
    fn unknown_feature_is_an_error() {
        let err = args(&["revision.nope"]).select().err().unwrap();
        assert!(err.to_string().contains("revision.nope"));
    }

    #[test]
    fn missing_dictionary_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(&["default"]);
        args.language = Some("xx".into());
        args.dict_dir = Some(dir.path().to_path_buf());

        let err = args.select().err().unwrap();
        assert!(format!("{:#}", err).contains("No dictionary found"));
    }
}
