// SPDX-License-Identifier: MIT OR Apache-2.0
//! Number source node: emits a single clamped int or float value.

use crate::util::single_stream;
use meshweave_graph::{
    LinkView, Node, NodeBehavior, ParamValue, ProcessContext, ProcessError, Socket, SocketType,
    Value,
};

/// Emits one scalar stream holding the node's `value` parameter,
/// clamped to the active mode's min/max range.
///
/// The node exposes one output named after the active mode (`Integer`
/// or `Float`); switching the mode parameter swaps the output socket
/// at `update` time.
pub struct NumberNode;

/// Behavior type ID
pub const NUMBER: &str = "number";

const INT_MODE: &str = "Integer";
const FLOAT_MODE: &str = "Float";

fn mode_output(mode: &str) -> Vec<Socket> {
    let name = if mode == FLOAT_MODE { FLOAT_MODE } else { INT_MODE };
    vec![Socket::output(name, SocketType::Scalar)]
}

impl NodeBehavior for NumberNode {
    fn type_id(&self) -> &'static str {
        NUMBER
    }

    fn init(&self, node: &mut Node) {
        node.params.set("mode", ParamValue::Text(INT_MODE.into()));
        node.params.set("value", ParamValue::Float(0.0));
        node.params.set("imin", ParamValue::Int(-1000));
        node.params.set("imax", ParamValue::Int(1000));
        node.params.set("fmin", ParamValue::Float(-10.0));
        node.params.set("fmax", ParamValue::Float(10.0));
        node.outputs = mode_output(INT_MODE);
    }

    fn update(&self, node: &mut Node, _links: &LinkView) {
        let mode = node.params.text_or("mode", INT_MODE).to_string();
        node.reconfigure(Vec::new(), mode_output(&mode));
    }

    fn process(&self, node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        let mode = node.params.text_or("mode", INT_MODE);
        let value = node.params.float_or("value", 0.0);

        let (name, clamped) = if mode == FLOAT_MODE {
            let lo = node.params.float_or("fmin", -10.0);
            let hi = node.params.float_or("fmax", 10.0);
            (FLOAT_MODE, value.clamp(lo, hi))
        } else {
            let lo = node.params.int_or("imin", -1000) as f64;
            let hi = node.params.int_or("imax", 1000) as f64;
            (INT_MODE, value.round().clamp(lo, hi))
        };

        if ctx.is_output_linked(name) {
            ctx.set_output(name, single_stream(Value::scalars([clamped])));
        }
        Ok(())
    }
}
