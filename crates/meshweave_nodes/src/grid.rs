// SPDX-License-Identifier: MIT OR Apache-2.0
//! Grid generator node: hexagonal or triangular lattices.

use crate::geometry::{hex_grid, tri_grid, Lattice};
use crate::util::{bind_scalar_default, scalar_stream};
use meshweave_graph::{
    match_long_repeat, LinkView, Node, NodeBehavior, ParamValue, ProcessContext, ProcessError,
    Socket, SocketType, Value,
};

/// Behavior type ID
pub const GRID: &str = "grid";

const HEX_MODE: &str = "hex";

/// Generates one lattice per matched tuple of (step, rows, cols,
/// angle). Inputs are padded with the long-repeat policy, so a single
/// value on one input combines with a sequence on another.
pub struct GridNode;

fn vertices_value(lattice: &Lattice) -> Value {
    Value::vectors(lattice.vertices.iter().copied())
}

fn edges_value(lattice: &Lattice) -> Value {
    Value::List(
        lattice
            .edges
            .iter()
            .map(|e| Value::scalars([e[0] as f64, e[1] as f64]))
            .collect(),
    )
}

fn faces_value(lattice: &Lattice) -> Value {
    Value::List(
        lattice
            .faces
            .iter()
            .map(|f| Value::scalars(f.iter().map(|i| *i as f64)))
            .collect(),
    )
}

impl NodeBehavior for GridNode {
    fn type_id(&self) -> &'static str {
        GRID
    }

    fn init(&self, node: &mut Node) {
        node.params.set("mode", ParamValue::Text(HEX_MODE.into()));
        node.params.set("step", ParamValue::Float(1.0));
        node.params.set("rows", ParamValue::Int(10));
        node.params.set("cols", ParamValue::Int(10));
        node.params.set("angle", ParamValue::Float(60.0));

        node.inputs.push(Socket::input("Step", SocketType::Scalar));
        node.inputs.push(Socket::input("Rows", SocketType::Scalar));
        node.inputs.push(Socket::input("Cols", SocketType::Scalar));
        node.inputs.push(Socket::input("Angle", SocketType::Scalar));
        for (socket, value) in node.inputs.iter_mut().zip([1.0, 10.0, 10.0, 60.0]) {
            socket.default = Some(Value::List(vec![Value::scalars([value])]));
        }

        node.outputs
            .push(Socket::output("Vertices", SocketType::Vector));
        node.outputs
            .push(Socket::output("Edges", SocketType::Scalar));
        node.outputs
            .push(Socket::output("Polygons", SocketType::Scalar));
    }

    fn update(&self, node: &mut Node, _links: &LinkView) {
        let step = node.params.float_or("step", 1.0);
        let rows = node.params.int_or("rows", 10) as f64;
        let cols = node.params.int_or("cols", 10) as f64;
        let angle = node.params.float_or("angle", 60.0);
        bind_scalar_default(node, "Step", step);
        bind_scalar_default(node, "Rows", rows);
        bind_scalar_default(node, "Cols", cols);
        bind_scalar_default(node, "Angle", angle);
    }

    fn process(&self, node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        if !ctx.any_output_linked() {
            return Ok(());
        }

        let matched = match_long_repeat(&[
            scalar_stream(ctx, "Step")?,
            scalar_stream(ctx, "Rows")?,
            scalar_stream(ctx, "Cols")?,
            scalar_stream(ctx, "Angle")?,
        ]);

        let mode = node.params.text_or("mode", HEX_MODE).to_string();
        let count = matched[0].len();
        let mut vertices = Vec::with_capacity(count);
        let mut edges = Vec::with_capacity(count);
        let mut faces = Vec::with_capacity(count);
        for k in 0..count {
            let step = matched[0][k];
            let rows = matched[1][k].round().max(0.0) as usize;
            let cols = matched[2][k].round().max(0.0) as usize;
            let angle = matched[3][k];
            let lattice = if mode == HEX_MODE {
                hex_grid(step, rows, cols, angle)
            } else {
                tri_grid(step, rows, cols, angle)
            };
            vertices.push(vertices_value(&lattice));
            edges.push(edges_value(&lattice));
            faces.push(faces_value(&lattice));
        }

        if ctx.is_output_linked("Vertices") {
            ctx.set_output("Vertices", Value::List(vertices));
        }
        if ctx.is_output_linked("Edges") {
            ctx.set_output("Edges", Value::List(edges));
        }
        if ctx.is_output_linked("Polygons") {
            ctx.set_output("Polygons", Value::List(faces));
        }
        Ok(())
    }
}
