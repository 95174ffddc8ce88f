//! Resolution Engine
//!
//! Given target nodes and a (possibly seeded) [`Cache`], compute every
//! target's value exactly once, in dependency order.
//!
//! # Guarantees
//!
//! - Each compute function runs at most once per cache.
//! - A seeded node is never recomputed, and nothing upstream of it is visited
//!   unless another target needs it.
//! - Results come back in target order.
//! - Cycles, missing inputs, undecodable seeds and failing compute functions
//!   abort the whole request; no partial result is returned.
//!
//! # Concurrency
//!
//! Resolution is synchronous. A [`Graph`](crate::graph::Graph) is read-only
//! and can back any number of parallel requests as long as each owns its
//! cache; see [`crate::extract::extract_batch`].

mod cache;
mod solver;
mod stack;

pub use cache::Cache;
pub use solver::{Resolver, ResolverConfig, SolveError, SolveStats};

use crate::graph::{Graph, NodeId};
use crate::value::Value;

/// Resolve targets against a graph that needs no external context.
pub fn solve(
    graph: &Graph,
    targets: &[NodeId],
    cache: &mut Cache,
) -> Result<Vec<Value>, SolveError> {
    Resolver::new(graph, &()).solve(targets, cache)
}

/// Resolve one target against a graph that needs no external context.
pub fn solve_one(graph: &Graph, target: NodeId, cache: &mut Cache) -> Result<Value, SolveError> {
    Resolver::new(graph, &()).solve_one(target, cache)
}
