// SPDX-License-Identifier: MIT OR Apache-2.0
//! Matrix math node: binary/unary matrix operations and rotation
//! constructions, selected by a mode parameter.

use crate::geometry::{autorotate_householder, autorotate_quaternion, householder};
use crate::util::vectors_of;
use glam::DMat4;
use meshweave_graph::{
    match_cross, match_long_repeat, LinkView, Node, NodeBehavior, ParamValue, ProcessContext,
    ProcessError, Socket, SocketType, Value,
};

/// Behavior type ID
pub const MATRIX_MATH: &str = "matrix_math";

/// Computation strategy selected by the `mode` parameter.
///
/// Each mode declares its own socket set; switching modes rebuilds the
/// node's interface at `update` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatrixOp {
    Multiply,
    Add,
    Invert,
    Householder,
    AutorotateHouseholder,
    AutorotateQuaternion,
}

impl MatrixOp {
    const DEFAULT: &'static str = "Multiply";

    fn from_param(name: &str) -> Self {
        match name {
            "Add" => Self::Add,
            "Invert" => Self::Invert,
            "Householder" => Self::Householder,
            "AutorotateHouseholder" => Self::AutorotateHouseholder,
            "AutorotateQuaternion" => Self::AutorotateQuaternion,
            _ => Self::Multiply,
        }
    }

    fn inputs(&self) -> Vec<Socket> {
        match self {
            Self::Multiply | Self::Add => vec![
                Socket::input("Matrix1", SocketType::Matrix),
                Socket::input("Matrix2", SocketType::Matrix),
            ],
            Self::Invert => vec![Socket::input("Matrix", SocketType::Matrix)],
            Self::Householder => vec![Socket::input("Vector", SocketType::Vector)],
            Self::AutorotateHouseholder | Self::AutorotateQuaternion => vec![
                Socket::input("Vector", SocketType::Vector),
                Socket::input("TargetVector", SocketType::Vector),
            ],
        }
    }

    /// Compute one output stream from one matched tuple of input
    /// streams.
    fn apply(&self, streams: &[Value]) -> Result<Value, ProcessError> {
        match self {
            Self::Multiply => binary_matrix(streams, |a, b| Ok(a * b)),
            Self::Add => binary_matrix(streams, |a, b| Ok(a + b)),
            Self::Invert => {
                let mut out = Vec::new();
                for item in streams[0].as_list()? {
                    let m = item.as_matrix()?;
                    if m.determinant().abs() < f64::EPSILON {
                        return Err(ProcessError::Failed("singular matrix".into()));
                    }
                    out.push(Value::Matrix(m.inverse()));
                }
                Ok(Value::List(out))
            }
            Self::Householder => {
                let mut out = Vec::new();
                for v in vectors_of(&streams[0])? {
                    out.push(Value::Matrix(householder(v)));
                }
                Ok(Value::List(out))
            }
            Self::AutorotateHouseholder => {
                binary_vector(streams, |source, target| {
                    Ok(autorotate_householder(target, source))
                })
            }
            Self::AutorotateQuaternion => {
                binary_vector(streams, |source, target| {
                    Ok(autorotate_quaternion(target, source))
                })
            }
        }
    }
}

fn binary_matrix(
    streams: &[Value],
    f: impl Fn(DMat4, DMat4) -> Result<DMat4, ProcessError>,
) -> Result<Value, ProcessError> {
    let a: Vec<Value> = streams[0].as_list()?.to_vec();
    let b: Vec<Value> = streams[1].as_list()?.to_vec();
    let matched = match_long_repeat(&[a, b]);
    let mut out = Vec::new();
    for (x, y) in matched[0].iter().zip(&matched[1]) {
        out.push(Value::Matrix(f(x.as_matrix()?, y.as_matrix()?)?));
    }
    Ok(Value::List(out))
}

fn binary_vector(
    streams: &[Value],
    f: impl Fn(glam::DVec3, glam::DVec3) -> Result<DMat4, ProcessError>,
) -> Result<Value, ProcessError> {
    let a: Vec<Value> = streams[0].as_list()?.to_vec();
    let b: Vec<Value> = streams[1].as_list()?.to_vec();
    let matched = match_long_repeat(&[a, b]);
    let mut out = Vec::new();
    for (x, y) in matched[0].iter().zip(&matched[1]) {
        out.push(Value::Matrix(f(x.as_vector()?, y.as_vector()?)?));
    }
    Ok(Value::List(out))
}

/// Matrix math over streams of matrices and vectors.
///
/// Inputs are combined with the cross-product matching policy: every
/// stream of one input meets every stream of the other.
pub struct MatrixMathNode;

impl NodeBehavior for MatrixMathNode {
    fn type_id(&self) -> &'static str {
        MATRIX_MATH
    }

    fn init(&self, node: &mut Node) {
        node.params
            .set("mode", ParamValue::Text(MatrixOp::DEFAULT.into()));
        let op = MatrixOp::from_param(MatrixOp::DEFAULT);
        node.inputs = op.inputs();
        node.outputs = vec![Socket::output("Matrix", SocketType::Matrix)];
    }

    fn update(&self, node: &mut Node, _links: &LinkView) {
        let op = MatrixOp::from_param(node.params.text_or("mode", MatrixOp::DEFAULT));
        node.reconfigure(
            op.inputs(),
            vec![Socket::output("Matrix", SocketType::Matrix)],
        );
    }

    fn process(&self, node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        if !ctx.any_output_linked() {
            return Ok(());
        }

        let op = MatrixOp::from_param(node.params.text_or("mode", MatrixOp::DEFAULT));
        let mut inputs = Vec::new();
        for socket in &node.inputs {
            inputs.push(ctx.input_streams(&socket.name)?);
        }

        let matched = match_cross(&inputs);
        let tuple_count = matched.first().map_or(0, Vec::len);
        let mut result = Vec::with_capacity(tuple_count);
        for i in 0..tuple_count {
            let streams: Vec<Value> = matched.iter().map(|column| column[i].clone()).collect();
            result.push(op.apply(&streams)?);
        }

        ctx.set_output("Matrix", Value::List(result));
        Ok(())
    }
}
