//! Node Registry
//!
//! [`GraphBuilder`] collects node definitions at startup and [`GraphBuilder::build`]
//! freezes them into an immutable [`Graph`]. After that point nothing about a
//! node changes; only per-request caches are mutated.
//!
//! # Forward Declarations
//!
//! Most nodes are registered in one call (`input`, `datasource`, `feature`),
//! which can only reference nodes registered earlier. [`GraphBuilder::declare`]
//! reserves an id first and defines it later, so a definition may point at a
//! node that is defined afterwards. That also makes it possible to write a
//! cyclic graph, which is why cycles are checked for at all.
//!
//! # Cycle Detection
//!
//! [`Graph::topological_order`] runs Kahn's algorithm over the whole graph.
//! Nodes left with a non-zero in-degree sit on (or behind) a cycle; one of
//! those cycles is extracted and reported by name.

use std::collections::HashMap;
use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use thiserror::Error;

use super::node::{Compute, ComputeError, Node, NodeId};
use crate::value::{Value, ValueType};

/// Graph construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {name:?} depends on {dependency}, which is not part of this graph")]
    UnknownDependency { name: String, dependency: NodeId },

    #[error("node name {0:?} is used more than once")]
    DuplicateName(String),

    #[error("node {0:?} is already defined")]
    AlreadyDefined(String),

    #[error("{0} was not declared by this builder")]
    UnknownNode(NodeId),

    #[error("no node named {0:?}")]
    UnknownName(String),

    #[error("dependency cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },
}

/// A declared node, possibly still waiting for its definition.
struct Slot<C> {
    name: String,
    returns: ValueType,
    definition: Option<(SmallVec<[NodeId; 4]>, Compute<C>)>,
}

/// Collects node definitions before they are frozen into a [`Graph`].
///
/// `C` is the external context type handed to datasource compute functions.
pub struct GraphBuilder<C = ()> {
    slots: IndexMap<NodeId, Slot<C>>,
}

impl<C: 'static> GraphBuilder<C> {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            slots: IndexMap::new(),
        }
    }

    /// Reserve a node id. The node stays an input unless it is defined later.
    pub fn declare(&mut self, name: impl Into<String>, returns: ValueType) -> NodeId {
        let id = NodeId::new();
        self.slots.insert(
            id,
            Slot {
                name: name.into(),
                returns,
                definition: None,
            },
        );
        id
    }

    /// Register a datasource without a compute function.
    ///
    /// It resolves only when the caller seeds it.
    pub fn input(&mut self, name: impl Into<String>, returns: ValueType) -> NodeId {
        let id = self.declare(name, returns);
        self.set_definition(id, SmallVec::new(), Compute::Input);
        id
    }

    /// Register a datasource that may read the external context.
    pub fn datasource<const N: usize, F>(
        &mut self,
        name: impl Into<String>,
        returns: ValueType,
        dependencies: [NodeId; N],
        compute: F,
    ) -> NodeId
    where
        F: Fn([&Value; N], &C) -> Result<Value, ComputeError> + Send + Sync + 'static,
    {
        let id = self.declare(name, returns);
        self.set_definition(id, SmallVec::from_slice(&dependencies), Compute::datasource(compute));
        id
    }

    /// Register a feature computed from its dependencies only.
    pub fn feature<const N: usize, F>(
        &mut self,
        name: impl Into<String>,
        returns: ValueType,
        dependencies: [NodeId; N],
        compute: F,
    ) -> NodeId
    where
        F: Fn([&Value; N]) -> Result<Value, ComputeError> + Send + Sync + 'static,
    {
        let id = self.declare(name, returns);
        self.set_definition(id, SmallVec::from_slice(&dependencies), Compute::feature(compute));
        id
    }

    /// Give a declared node a datasource definition.
    pub fn define_datasource<const N: usize, F>(
        &mut self,
        id: NodeId,
        dependencies: [NodeId; N],
        compute: F,
    ) -> Result<NodeId, GraphError>
    where
        F: Fn([&Value; N], &C) -> Result<Value, ComputeError> + Send + Sync + 'static,
    {
        self.check_undefined(id)?;
        self.set_definition(id, SmallVec::from_slice(&dependencies), Compute::datasource(compute));
        Ok(id)
    }

    /// Give a declared node a feature definition.
    pub fn define_feature<const N: usize, F>(
        &mut self,
        id: NodeId,
        dependencies: [NodeId; N],
        compute: F,
    ) -> Result<NodeId, GraphError>
    where
        F: Fn([&Value; N]) -> Result<Value, ComputeError> + Send + Sync + 'static,
    {
        self.check_undefined(id)?;
        self.set_definition(id, SmallVec::from_slice(&dependencies), Compute::feature(compute));
        Ok(id)
    }
}

impl<C> GraphBuilder<C> {
    fn check_undefined(&self, id: NodeId) -> Result<(), GraphError> {
        match self.slots.get(&id) {
            None => Err(GraphError::UnknownNode(id)),
            Some(slot) if slot.definition.is_some() => {
                Err(GraphError::AlreadyDefined(slot.name.clone()))
            }
            Some(_) => Ok(()),
        }
    }

    fn set_definition(
        &mut self,
        id: NodeId,
        dependencies: SmallVec<[NodeId; 4]>,
        compute: Compute<C>,
    ) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.definition = Some((dependencies, compute));
        }
    }

    /// Get the number of declared nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validate the definitions and freeze them into a graph.
    ///
    /// Cycles are not rejected here; see [`Graph::check_acyclic`].
    pub fn build(self) -> Result<Graph<C>, GraphError> {
        let mut names = IndexMap::with_capacity(self.slots.len());
        for (id, slot) in &self.slots {
            if names.insert(slot.name.clone(), *id).is_some() {
                return Err(GraphError::DuplicateName(slot.name.clone()));
            }
        }

        for slot in self.slots.values() {
            if let Some((dependencies, _)) = &slot.definition {
                if let Some(missing) = dependencies.iter().find(|d| !self.slots.contains_key(*d)) {
                    return Err(GraphError::UnknownDependency {
                        name: slot.name.clone(),
                        dependency: *missing,
                    });
                }
            }
        }

        let mut nodes = HashMap::with_capacity(self.slots.len());
        let mut dependents: HashMap<NodeId, SmallVec<[NodeId; 4]>> = HashMap::new();

        for (id, slot) in self.slots {
            let (dependencies, compute) = slot
                .definition
                .unwrap_or_else(|| (SmallVec::new(), Compute::Input));
            for dependency in &dependencies {
                dependents.entry(*dependency).or_default().push(id);
            }
            nodes.insert(id, Node::new(id, slot.name, slot.returns, dependencies, compute));
        }

        tracing::debug!(nodes = nodes.len(), "built feature graph");

        Ok(Graph {
            nodes,
            names,
            dependents,
        })
    }
}

impl<C: 'static> Default for GraphBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable set of node definitions.
///
/// A graph is shared by reference between any number of concurrent
/// resolution requests.
pub struct Graph<C = ()> {
    /// All nodes in the graph, indexed by ID.
    nodes: HashMap<NodeId, Node<C>>,

    /// Node ids by name, in declaration order.
    names: IndexMap<String, NodeId>,

    /// Reverse edges, one entry per dependency occurrence.
    dependents: HashMap<NodeId, SmallVec<[NodeId; 4]>>,
}

impl<C> Graph<C> {
    /// Get a reference to a node.
    pub fn node(&self, id: NodeId) -> Option<&Node<C>> {
        self.nodes.get(&id)
    }

    /// Look up a node id by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Look up several node ids by name, preserving order.
    pub fn find_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<NodeId>, GraphError> {
        names
            .iter()
            .map(|name| {
                self.find(name.as_ref())
                    .ok_or_else(|| GraphError::UnknownName(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Iterate over nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<C>> {
        self.names.values().filter_map(|id| self.nodes.get(id))
    }

    /// Nodes that list `id` as a dependency.
    pub fn dependents(&self, id: NodeId) -> &[NodeId] {
        self.dependents.get(&id).map(|d| d.as_slice()).unwrap_or(&[])
    }

    /// Get the total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check the whole graph for dependency cycles.
    pub fn check_acyclic(&self) -> Result<(), GraphError> {
        self.topological_order().map(|_| ())
    }

    /// Order all nodes so that dependencies come before dependents.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut in_degree: HashMap<NodeId, usize> = HashMap::with_capacity(self.nodes.len());
        let mut queue = VecDeque::new();
        let mut result = Vec::with_capacity(self.nodes.len());

        for id in self.names.values() {
            let degree = self.nodes[id].dependencies().len();
            in_degree.insert(*id, degree);
            if degree == 0 {
                queue.push_back(*id);
            }
        }

        // Kahn's algorithm
        while let Some(node_id) = queue.pop_front() {
            result.push(node_id);

            for dependent_id in self.dependents(node_id) {
                if let Some(degree) = in_degree.get_mut(dependent_id) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(*dependent_id);
                    }
                }
            }
        }

        if result.len() == self.nodes.len() {
            return Ok(result);
        }

        let stuck: IndexSet<NodeId> = self
            .names
            .values()
            .copied()
            .filter(|id| in_degree.get(id).copied().unwrap_or(0) > 0)
            .collect();
        Err(GraphError::Cycle {
            chain: self.cycle_within(&stuck),
        })
    }

    /// Walk dependencies inside `stuck` until a node repeats.
    ///
    /// Every node left over by Kahn's algorithm has at least one dependency
    /// that is also left over, so the walk always closes a loop.
    fn cycle_within(&self, stuck: &IndexSet<NodeId>) -> Vec<String> {
        let mut path: IndexSet<NodeId> = IndexSet::new();
        let mut current = stuck.first().copied();

        while let Some(id) = current {
            if let Some(start) = path.get_index_of(&id) {
                let mut chain: Vec<String> = path
                    .iter()
                    .skip(start)
                    .map(|id| self.nodes[id].name().to_string())
                    .collect();
                chain.push(self.nodes[&id].name().to_string());
                return chain;
            }
            path.insert(id);
            current = self.nodes[&id]
                .dependencies()
                .iter()
                .copied()
                .find(|dep| stuck.contains(dep));
        }

        path.iter().map(|id| self.nodes[id].name().to_string()).collect()
    }
}

impl<C> std::fmt::Debug for Graph<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.names.keys().collect::<Vec<_>>())
            .finish()
    }
}
