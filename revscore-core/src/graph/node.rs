//! Graph Nodes
//!
//! This module defines the node types that live in the dependency graph.
//!
//! A node is a name, a declared value type, an ordered list of dependencies,
//! and a compute function. The compute function's signature depends on the
//! node's kind:
//!
//! - Datasources receive their resolved dependency values and the external
//!   context the graph was built for.
//! - Features receive only their resolved dependency values. They have no
//!   way to reach outside the graph.
//!
//! Inputs are datasources without a compute function. They only resolve
//! when the caller seeds them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use thiserror::Error;

use crate::value::{Value, ValueType};

/// Unique identifier for a node in the dependency graph.
///
/// Identity is allocated, not derived from the definition: two nodes built
/// from identical definitions get different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The kind of node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Produces raw values, possibly from the external context.
    /// Inputs (no compute function) are datasources too.
    Datasource,

    /// Reduces the resolved values of its dependencies.
    Feature,
}

/// A compute function failed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ComputeError {
    message: String,
}

impl ComputeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A dependency resolved to a value of the wrong shape.
    pub fn unexpected(expected: ValueType, found: &Value) -> Self {
        Self::new(format!("expected a {} value, found {:?}", expected, found))
    }
}

pub(crate) type DatasourceFn<C> =
    Box<dyn Fn(&[&Value], &C) -> Result<Value, ComputeError> + Send + Sync>;

pub(crate) type FeatureFn = Box<dyn Fn(&[&Value]) -> Result<Value, ComputeError> + Send + Sync>;

/// How a node produces its value.
pub(crate) enum Compute<C> {
    /// No compute function; the value must be seeded.
    Input,
    Datasource(DatasourceFn<C>),
    Feature(FeatureFn),
}

impl<C: 'static> Compute<C> {
    /// Wrap a fixed-arity datasource function.
    pub(crate) fn datasource<const N: usize, F>(compute: F) -> Self
    where
        F: Fn([&Value; N], &C) -> Result<Value, ComputeError> + Send + Sync + 'static,
    {
        Compute::Datasource(Box::new(move |inputs: &[&Value], context: &C| {
            compute(fixed_arity(inputs)?, context)
        }))
    }

    /// Wrap a fixed-arity feature function.
    pub(crate) fn feature<const N: usize, F>(compute: F) -> Self
    where
        F: Fn([&Value; N]) -> Result<Value, ComputeError> + Send + Sync + 'static,
    {
        Compute::Feature(Box::new(move |inputs: &[&Value]| {
            compute(fixed_arity(inputs)?)
        }))
    }
}

impl<C> Compute<C> {
    fn kind(&self) -> NodeKind {
        match self {
            Compute::Input | Compute::Datasource(_) => NodeKind::Datasource,
            Compute::Feature(_) => NodeKind::Feature,
        }
    }
}

fn fixed_arity<'v, const N: usize>(inputs: &[&'v Value]) -> Result<[&'v Value; N], ComputeError> {
    inputs.try_into().map_err(|_| {
        ComputeError::new(format!(
            "expected {} dependency values, received {}",
            N,
            inputs.len()
        ))
    })
}

/// A node in the dependency graph.
pub struct Node<C = ()> {
    /// Unique identifier for this node.
    id: NodeId,

    /// Label used in diagnostics and as a column header.
    name: String,

    /// Type used to decode string-encoded seed values.
    returns: ValueType,

    /// Nodes whose values are passed to the compute function, in order.
    dependencies: SmallVec<[NodeId; 4]>,

    compute: Compute<C>,
}

impl<C> Node<C> {
    pub(crate) fn new(
        id: NodeId,
        name: String,
        returns: ValueType,
        dependencies: SmallVec<[NodeId; 4]>,
        compute: Compute<C>,
    ) -> Self {
        Self {
            id,
            name,
            returns,
            dependencies,
            compute,
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the declared value type.
    pub fn returns(&self) -> ValueType {
        self.returns
    }

    /// Get the node's kind.
    pub fn kind(&self) -> NodeKind {
        self.compute.kind()
    }

    /// Whether this node can only be satisfied by a seeded value.
    pub fn is_input(&self) -> bool {
        matches!(self.compute, Compute::Input)
    }

    /// Get all dependencies, in the order they are passed to the compute function.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Run the compute function over resolved dependency values.
    ///
    /// Returns `None` for inputs, which have nothing to run.
    pub(crate) fn evaluate(
        &self,
        inputs: &[&Value],
        context: &C,
    ) -> Option<Result<Value, ComputeError>> {
        match &self.compute {
            Compute::Input => None,
            Compute::Datasource(compute) => Some(compute(inputs, context)),
            Compute::Feature(compute) => Some(compute(inputs)),
        }
    }
}

impl<C> fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("returns", &self.returns)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn node_ids_are_unique() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn input_node_has_nothing_to_evaluate() {
        let node: Node = Node::new(
            NodeId::new(),
            "text".into(),
            ValueType::Text,
            SmallVec::new(),
            Compute::Input,
        );
        assert_eq!(node.kind(), NodeKind::Datasource);
        assert!(node.is_input());
        assert!(node.evaluate(&[], &()).is_none());
    }

    #[test]
    fn feature_receives_dependencies_in_order() {
        let a = NodeId::new();
        let b = NodeId::new();
        let node: Node = Node::new(
            NodeId::new(),
            "difference".into(),
            ValueType::Int,
            smallvec![a, b],
            Compute::feature(|[x, y]: [&Value; 2]| {
                Ok(Value::Int(x.as_int().unwrap_or(0) - y.as_int().unwrap_or(0)))
            }),
        );

        assert_eq!(node.kind(), NodeKind::Feature);
        assert_eq!(node.dependencies(), &[a, b]);

        let result = node.evaluate(&[&Value::Int(10), &Value::Int(3)], &()).unwrap();
        assert_eq!(result.unwrap(), Value::Int(7));
    }

    #[test]
    fn datasource_reads_context() {
        let node: Node<String> = Node::new(
            NodeId::new(),
            "greeting".into(),
            ValueType::Text,
            SmallVec::new(),
            Compute::datasource(|[]: [&Value; 0], who: &String| {
                Ok(Value::Text(format!("hello {}", who)))
            }),
        );

        let result = node.evaluate(&[], &"world".to_string()).unwrap();
        assert_eq!(result.unwrap(), Value::Text("hello world".into()));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let node: Node = Node::new(
            NodeId::new(),
            "unary".into(),
            ValueType::Int,
            SmallVec::new(),
            Compute::feature(|[x]: [&Value; 1]| Ok(x.clone())),
        );

        let result = node.evaluate(&[], &()).unwrap();
        assert!(result.is_err());
    }
}
