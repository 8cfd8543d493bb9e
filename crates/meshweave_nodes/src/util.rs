// SPDX-License-Identifier: MIT OR Apache-2.0
//! Small helpers shared by the built-in nodes.

use glam::DVec3;
use meshweave_graph::{Node, ProcessContext, ProcessError, Value};

/// Wrap a stream as a one-stream socket payload
pub(crate) fn single_stream(stream: Value) -> Value {
    Value::List(vec![stream])
}

/// First stream of the named input as scalars; empty when unlinked
/// with no default.
pub(crate) fn scalar_stream(ctx: &ProcessContext<'_>, name: &str) -> Result<Vec<f64>, ProcessError> {
    let streams = ctx.input_streams(name)?;
    let Some(first) = streams.first() else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for item in first.as_list()? {
        out.push(item.as_scalar()?);
    }
    Ok(out)
}

/// One stream as a vector list
pub(crate) fn vectors_of(stream: &Value) -> Result<Vec<DVec3>, ProcessError> {
    let mut out = Vec::new();
    for item in stream.as_list()? {
        out.push(item.as_vector()?);
    }
    Ok(out)
}

/// Refresh a scalar input socket's stored default from a parameter
/// value. This is the binding between a node parameter and its socket:
/// the parameter feeds the socket whenever nothing is linked.
pub(crate) fn bind_scalar_default(node: &mut Node, input: &str, value: f64) {
    if let Some(socket) = node.inputs.iter_mut().find(|s| s.name == input) {
        socket.default = Some(single_stream(Value::scalars([value])));
    }
}
