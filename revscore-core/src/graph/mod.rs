//! Dependency Graph
//!
//! This module implements the declarative feature graph: which values exist,
//! what type they have, and which other values each one is computed from.
//!
//! # Overview
//!
//! The dependency graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are datasources (raw values, possibly read from outside the graph)
//!   or features (pure reductions over other nodes)
//! - Edges are dependencies: if A depends on B, B must be resolved before A
//!
//! Nothing is computed here. Definitions are lazy; the resolver in
//! [`crate::resolve`] walks the graph on demand.
//!
//! # Design Decisions
//!
//! 1. The graph is an explicit value built once and passed by reference,
//!    not a process-wide registry.
//!
//! 2. Compute functions have a fixed signature per node kind, and their arity
//!    is tied to the dependency list at compile time.
//!
//! 3. The graph is indexed by node ID for O(1) lookups, with reverse edges kept
//!    for whole-graph validation.

mod node;
mod registry;

pub use node::{ComputeError, Node, NodeId, NodeKind};
pub use registry::{Graph, GraphBuilder, GraphError};
