// SPDX-License-Identifier: MIT OR Apache-2.0
//! List rotate node: cyclically shift lists at a chosen nesting level.

use crate::util::{bind_scalar_default, scalar_stream, single_stream};
use meshweave_graph::{
    match_long_repeat, LinkView, Node, NodeBehavior, ParamValue, ProcessContext, ProcessError,
    Socket, SocketType, Value,
};

/// Behavior type ID
pub const LIST_ROTATE: &str = "list_rotate";

/// Rotates each incoming list by a shift amount, descending `level - 1`
/// nesting levels below the stream before rotating.
///
/// The output socket is adaptive: it takes on whatever type the linked
/// input carries. With `unwrap` set, one nesting level of the result is
/// merged away.
pub struct ListRotateNode;

fn rotate(items: &[Value], shift: i64) -> Vec<Value> {
    if items.is_empty() {
        return Vec::new();
    }
    let len = items.len();
    let split = (shift.rem_euclid(len as i64)) as usize;
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&items[split..]);
    out.extend_from_slice(&items[..split]);
    out
}

impl NodeBehavior for ListRotateNode {
    fn type_id(&self) -> &'static str {
        LIST_ROTATE
    }

    fn init(&self, node: &mut Node) {
        node.params.set("level", ParamValue::Int(1));
        node.params.set("shift", ParamValue::Int(1));
        node.params.set("unwrap", ParamValue::Bool(false));
        node.inputs.push(Socket::input("Data", SocketType::Any));
        node.inputs.push(
            Socket::input("Shift", SocketType::Scalar)
                .with_default(single_stream(Value::scalars([1.0]))),
        );
        node.outputs.push(Socket::output("Data", SocketType::Any));
    }

    fn update(&self, node: &mut Node, links: &LinkView) {
        // Adaptive socket: mirror the upstream stream type.
        let out_type = links.upstream_type("Data").unwrap_or(SocketType::Any);
        node.set_output_type("Data", out_type);
        let shift = node.params.int_or("shift", 1);
        bind_scalar_default(node, "Shift", shift as f64);
    }

    fn process(&self, node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        if !(ctx.is_input_linked("Data") && ctx.is_output_linked("Data")) {
            return Ok(());
        }

        let data = ctx.input_streams("Data")?;
        let shifts: Vec<Value> = scalar_stream(ctx, "Shift")?
            .into_iter()
            .map(Value::Scalar)
            .collect();
        let level = node.params.int_or("level", 1).max(1) as usize;
        let unwrap = node.params.bool_or("unwrap", false);

        let matched = match_long_repeat(&[data, shifts]);
        let mut result = Vec::new();
        for (stream, shift_value) in matched[0].iter().zip(&matched[1]) {
            let shift = shift_value.as_scalar()? as i64;
            let rotated = stream.map_at_depth(level - 1, &mut |v| {
                Ok(Value::List(rotate(v.as_list()?, shift)))
            })?;
            if unwrap {
                result.extend(rotated.into_list()?);
            } else {
                result.push(rotated);
            }
        }
        ctx.set_output("Data", Value::List(result));
        Ok(())
    }
}
