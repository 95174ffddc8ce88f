//! Batch Extraction
//!
//! Resolving one request is single-threaded, but requests are independent:
//! each owns its [`Cache`] and only reads the shared [`Graph`]. A batch is
//! therefore spread over the rayon thread pool with one cache per worker
//! item and no locking.

use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::graph::{Graph, NodeId};
use crate::resolve::{Cache, Resolver, ResolverConfig, SolveError};
use crate::value::Value;

/// Resolve `targets` for a single request.
pub fn extract<C>(
    graph: &Graph<C>,
    context: &C,
    config: ResolverConfig,
    targets: &[NodeId],
    mut cache: Cache,
) -> Result<Vec<Value>, SolveError> {
    Resolver::new(graph, context)
        .with_config(config)
        .solve(targets, &mut cache)
}

/// Resolve `targets` for every cache in parallel. Results are returned in the
/// order of `caches`; one failing request does not affect the others.
pub fn extract_batch<C: Sync>(
    graph: &Graph<C>,
    context: &C,
    config: ResolverConfig,
    targets: &[NodeId],
    caches: Vec<Cache>,
) -> Vec<Result<Vec<Value>, SolveError>> {
    let span = info_span!("extract_batch", requests = caches.len(), targets = targets.len());
    let _enter = span.enter();

    let resolver = Resolver::new(graph, context).with_config(config);
    let results: Vec<_> = caches
        .into_par_iter()
        .map(|mut cache| resolver.solve(targets, &mut cache))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    debug!(failed, "batch resolved");
    results
}
