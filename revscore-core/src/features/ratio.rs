//! Ratio primitives.

use crate::graph::{ComputeError, GraphBuilder, NodeId};
use crate::value::{Value, ValueType};

/// Share of `baseline` symbols that were added.
///
/// A baseline that is zero, or no larger than the number added, means the
/// whole baseline is new: the ratio is `1` rather than a division by zero.
pub fn proportion_of_symbol_added(baseline: i64, added: i64) -> f64 {
    if baseline <= 0 || added >= baseline {
        return 1.0;
    }
    added.max(0) as f64 / baseline as f64
}

/// Node-level [`proportion_of_symbol_added`]. An absent baseline counts as
/// fully added; an absent count as nothing added.
pub fn proportion(baseline: &Value, added: &Value) -> Result<Value, ComputeError> {
    let added = match added {
        Value::Absent => 0,
        Value::Int(n) => *n,
        other => return Err(ComputeError::unexpected(ValueType::Int, other)),
    };
    match baseline {
        Value::Absent => Ok(Value::Real(1.0)),
        Value::Int(total) => Ok(Value::Real(proportion_of_symbol_added(*total, added))),
        other => Err(ComputeError::unexpected(ValueType::Int, other)),
    }
}

/// Register a real-valued proportion feature over two integer counts.
pub fn register_proportion<C: 'static>(
    builder: &mut GraphBuilder<C>,
    name: impl Into<String>,
    baseline: NodeId,
    added: NodeId,
) -> NodeId {
    builder.feature(name, ValueType::Real, [baseline, added], |[baseline, added]| {
        proportion(baseline, added)
    })
}
