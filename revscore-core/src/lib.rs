//! Revscore Core
//!
//! This crate provides the feature extraction engine for scoring wiki
//! revisions. It implements:
//!
//! - A dependency graph of datasources and features
//! - A memoized resolver that computes requested features from a seedable cache
//! - Language classifiers (badwords, informals, misspellings)
//! - A standard library of revision features
//! - The scorer model seam: values/labels files, test statistics and a
//!   reference model
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `value`: resolved values and their text encoding
//! - `graph`: node definitions, the builder and the frozen graph
//! - `resolve`: the resolver and per-request caches
//! - `languages`: the `Language` trait and bundled languages
//! - `features`: standard revision and language features
//! - `scoring`: scorer models, values/labels files and statistics
//! - `extract`: parallel resolution of many requests
//!
//! # Example
//!
//! ```rust
//! use revscore_core::features::standard_graph;
//! use revscore_core::resolve::{solve, Cache};
//! use revscore_core::value::Value;
//!
//! let (graph, features) = standard_graph(None).unwrap();
//! let (revision, parent) = features.inputs();
//!
//! let mut cache = Cache::new()
//!     .with(revision, "Some text words 55.")
//!     .with(parent, Value::Absent);
//!
//! let words = solve(&graph, &[features.edit.words_added], &mut cache).unwrap();
//! assert_eq!(words, vec![Value::Int(3)]);
//! ```

pub mod extract;
pub mod features;
pub mod graph;
pub mod languages;
pub mod resolve;
pub mod scoring;
pub mod value;

pub use graph::{Graph, GraphBuilder, NodeId};
pub use resolve::{Cache, Resolver, SolveError};
pub use value::{Value, ValueType};
