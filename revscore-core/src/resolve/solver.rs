//! Resolver
//!
//! # Algorithm
//!
//! For each target, in request order:
//!
//! 1. If the cache already holds the target, use it. Seeded string values are
//!    decoded through the node's declared type at this point.
//! 2. Otherwise push the target onto the visitation stack and resolve its
//!    dependencies left to right. A dependency that is cached is used as is;
//!    one that is already on the stack closes a cycle and aborts the request.
//! 3. When every dependency of the top node is resolved, run its compute
//!    function, store the result in the cache and pop the node.
//!
//! All targets share the caller's cache, so common ancestors are computed
//! once per request. A seeded node short-circuits its whole upstream closure.
//!
//! The traversal never recurses on the native stack; `max_depth` bounds the
//! visitation stack instead.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, debug_span, trace};

use super::cache::Cache;
use super::stack::VisitStack;
use crate::graph::{ComputeError, Graph, Node, NodeId};
use crate::value::{DecodeError, Value};

/// Errors that abort a resolution request.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("dependency cycle detected: {}", .chain.join(" -> "))]
    GraphCycle { chain: Vec<String> },

    #[error("input {name:?} has no seeded value and nothing to compute it with")]
    UnsatisfiedInput { name: String },

    #[error("could not decode the seeded value for {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("computing {name:?} failed: {source}")]
    Compute {
        name: String,
        #[source]
        source: ComputeError,
    },

    #[error("resolution depth exceeded {limit} while visiting {name:?}")]
    DepthExceeded { name: String, limit: usize },

    #[error("{0} is not part of this graph")]
    UnknownNode(NodeId),
}

/// Resolver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum number of nodes in progress at once.
    pub max_depth: usize,
}

impl ResolverConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 1024;

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Counters for one solve call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Compute functions run.
    pub computed: usize,
    /// Lookups answered by the cache.
    pub cache_hits: usize,
}

/// Resolves node values against one graph and one external context.
///
/// A resolver holds no per-request state; it can be shared between threads
/// as long as every request brings its own [`Cache`].
pub struct Resolver<'a, C = ()> {
    graph: &'a Graph<C>,
    context: &'a C,
    config: ResolverConfig,
}

impl<'a, C> Resolver<'a, C> {
    pub fn new(graph: &'a Graph<C>, context: &'a C) -> Self {
        Self {
            graph,
            context,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve every target, returning values in target order.
    pub fn solve(&self, targets: &[NodeId], cache: &mut Cache) -> Result<Vec<Value>, SolveError> {
        self.solve_with_stats(targets, cache).map(|(values, _)| values)
    }

    /// Resolve a single target.
    pub fn solve_one(&self, target: NodeId, cache: &mut Cache) -> Result<Value, SolveError> {
        let mut values = self.solve(&[target], cache)?;
        values.pop().ok_or(SolveError::UnknownNode(target))
    }

    /// Like [`Resolver::solve`], also reporting how much work was done.
    pub fn solve_with_stats(
        &self,
        targets: &[NodeId],
        cache: &mut Cache,
    ) -> Result<(Vec<Value>, SolveStats), SolveError> {
        let _span = debug_span!("solve", targets = targets.len()).entered();
        let mut stats = SolveStats::default();

        for &target in targets {
            self.resolve(target, cache, &mut stats)?;
        }

        let values = targets
            .iter()
            .map(|&target| cache.get(target).cloned().ok_or(SolveError::UnknownNode(target)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            computed = stats.computed,
            cache_hits = stats.cache_hits,
            "solve finished"
        );
        Ok((values, stats))
    }

    fn node(&self, id: NodeId) -> Result<&'a Node<C>, SolveError> {
        self.graph.node(id).ok_or(SolveError::UnknownNode(id))
    }

    /// Whether `node` already has a value, decoding a seeded string if needed.
    fn cached(&self, node: &Node<C>, cache: &mut Cache) -> Result<bool, SolveError> {
        cache
            .materialize(node.id(), node.returns())
            .map_err(|source| SolveError::Decode {
                name: node.name().to_string(),
                source,
            })
    }

    fn resolve(
        &self,
        target: NodeId,
        cache: &mut Cache,
        stats: &mut SolveStats,
    ) -> Result<(), SolveError> {
        let node = self.node(target)?;
        if self.cached(node, cache)? {
            stats.cache_hits += 1;
            return Ok(());
        }

        let mut stack = VisitStack::new();
        stack.push(target);

        while let Some((id, next)) = stack.top() {
            let node = self.node(id)?;

            if let Some(&dependency) = node.dependencies().get(next) {
                stack.advance();

                let dep_node = self.node(dependency)?;
                if self.cached(dep_node, cache)? {
                    stats.cache_hits += 1;
                    continue;
                }
                if stack.contains(dependency) {
                    return Err(SolveError::GraphCycle {
                        chain: self.names(&stack.cycle_from(dependency)),
                    });
                }
                if stack.depth() >= self.config.max_depth {
                    return Err(SolveError::DepthExceeded {
                        name: dep_node.name().to_string(),
                        limit: self.config.max_depth,
                    });
                }
                stack.push(dependency);
                continue;
            }

            let value = self.evaluate(node, cache)?;
            trace!(node = node.name(), "computed");
            stats.computed += 1;
            cache.store(id, value);
            stack.pop();
        }

        Ok(())
    }

    /// Run a node's compute function over its (already resolved) dependencies.
    fn evaluate(&self, node: &Node<C>, cache: &Cache) -> Result<Value, SolveError> {
        let inputs = node
            .dependencies()
            .iter()
            .map(|&dep| {
                cache.get(dep).ok_or_else(|| SolveError::UnsatisfiedInput {
                    name: self.name(dep),
                })
            })
            .collect::<Result<SmallVec<[&Value; 4]>, _>>()?;

        match node.evaluate(&inputs, self.context) {
            None => Err(SolveError::UnsatisfiedInput {
                name: node.name().to_string(),
            }),
            Some(result) => result.map_err(|source| SolveError::Compute {
                name: node.name().to_string(),
                source,
            }),
        }
    }

    fn name(&self, id: NodeId) -> String {
        self.graph
            .node(id)
            .map(|node| node.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    fn names(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| self.name(id)).collect()
    }
}
