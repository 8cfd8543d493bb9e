// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bend node: deform vertices along a spline path.
//!
//! Each vertex is parametrized by its coordinate along the orientation
//! axis, projected onto the path at that parameter and re-oriented to
//! the path tangent.

use crate::geometry::{autorotate_householder, autorotate_quaternion};
use crate::spline::{CubicSpline, LinearSpline, Metric, Spline};
use crate::util::vectors_of;
use glam::{DMat4, DVec3};
use meshweave_graph::{
    match_long_repeat, LinkView, Node, NodeBehavior, ParamValue, ProcessContext, ProcessError,
    Socket, SocketType, Value,
};

/// Behavior type ID
pub const BEND: &str = "bend_along_path";

/// Polyline sample count for arc-length estimation
const LENGTH_RESOLUTION: usize = 100;

/// Objects thinner than this along the orientation axis cannot be
/// parametrized onto the path.
const MIN_OBJECT_SIZE: f64 = 1e-5;

/// Bends input geometry along a path given as control points.
///
/// `algorithm` picks the tangent-alignment construction (`householder`
/// or `diff` for the quaternion rotation difference), `mode` the spline
/// kind (`cubic` or `linear`). With `scale_all` set the transverse axes
/// stretch by the same factor the path stretches the object.
pub struct BendNode;

fn axis_index(name: &str) -> usize {
    match name {
        "X" => 0,
        "Y" => 1,
        _ => 2,
    }
}

fn axis_unit(axis: usize) -> DVec3 {
    match axis {
        0 => DVec3::X,
        1 => DVec3::Y,
        _ => DVec3::Z,
    }
}

fn build_spline(
    mode: &str,
    points: Vec<DVec3>,
    metric: Metric,
) -> Result<Box<dyn Spline>, ProcessError> {
    let spline: Box<dyn Spline> = if mode == "linear" {
        Box::new(LinearSpline::new(points, metric).map_err(|e| ProcessError::Failed(e.to_string()))?)
    } else {
        Box::new(CubicSpline::new(points, metric).map_err(|e| ProcessError::Failed(e.to_string()))?)
    };
    Ok(spline)
}

struct BendSettings {
    householder: bool,
    spline_mode: String,
    metric: Metric,
    axis: usize,
    scale_all: bool,
    flip: bool,
}

impl BendSettings {
    fn of(node: &Node) -> Self {
        Self {
            householder: node.params.text_or("algorithm", "householder") == "householder",
            spline_mode: node.params.text_or("mode", "cubic").to_string(),
            metric: Metric::from_name(node.params.text_or("metric", "euclidean")),
            axis: axis_index(node.params.text_or("orient_axis", "Z")),
            scale_all: node.params.bool_or("scale_all", true),
            flip: node.params.bool_or("flip", false),
        }
    }

    /// Bend one vertex stream along one path stream.
    fn bend(
        &self,
        vertices: &[DVec3],
        path: &[DVec3],
    ) -> Result<(Vec<DVec3>, Vec<DMat4>), ProcessError> {
        let coords: Vec<f64> = vertices.iter().map(|v| v[self.axis]).collect();
        let min = coords.iter().copied().fold(f64::INFINITY, f64::min);
        let max = coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let object_size = max - min;
        if object_size <= MIN_OBJECT_SIZE {
            return Err(ProcessError::Failed(format!(
                "object is flat along the orientation axis (size {object_size:.2e})"
            )));
        }

        let spline = build_spline(&self.spline_mode, path.to_vec(), self.metric)?;
        let scale = spline.length(LENGTH_RESOLUTION) / object_size;
        let along = axis_unit(self.axis);

        let scale_matrix = if self.scale_all {
            let mut factors = DVec3::splat(scale);
            factors[self.axis] = 1.0;
            DMat4::from_scale(factors)
        } else {
            DMat4::IDENTITY
        };

        let mut out_vertices = Vec::with_capacity(vertices.len());
        let mut out_matrices = Vec::with_capacity(vertices.len());
        for (vertex, coord) in vertices.iter().zip(&coords) {
            let mut t = (coord - min) / object_size;
            if self.flip {
                t = 1.0 - t;
            }

            let tangent = spline.tangent(t).normalize_or_zero();
            let rotation = if self.householder {
                autorotate_householder(along, tangent).inverse()
            } else {
                autorotate_quaternion(tangent, along)
            };
            let matrix = rotation * scale_matrix;

            let mut projection = *vertex;
            projection[self.axis] = 0.0;
            out_vertices.push(matrix.transform_point3(projection) + spline.eval(t));
            out_matrices.push(DMat4::from_translation(spline.eval(t)) * matrix);
        }
        Ok((out_vertices, out_matrices))
    }
}

impl NodeBehavior for BendNode {
    fn type_id(&self) -> &'static str {
        BEND
    }

    fn init(&self, node: &mut Node) {
        node.params
            .set("algorithm", ParamValue::Text("householder".into()));
        node.params.set("mode", ParamValue::Text("cubic".into()));
        node.params
            .set("metric", ParamValue::Text("euclidean".into()));
        node.params.set("orient_axis", ParamValue::Text("Z".into()));
        node.params.set("scale_all", ParamValue::Bool(true));
        node.params.set("flip", ParamValue::Bool(false));

        node.inputs
            .push(Socket::input("Vertices", SocketType::Vector));
        node.inputs.push(Socket::input("Path", SocketType::Vector));
        node.outputs
            .push(Socket::output("Vertices", SocketType::Vector));
        node.outputs
            .push(Socket::output("Matrices", SocketType::Matrix));
    }

    fn update(&self, _node: &mut Node, _links: &LinkView) {}

    fn process(&self, node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        if !(ctx.any_output_linked() && ctx.is_input_linked("Vertices")) {
            return Ok(());
        }

        let settings = BendSettings::of(node);
        let matched = match_long_repeat(&[
            ctx.input_streams("Vertices")?,
            ctx.input_streams("Path")?,
        ]);

        let mut vertex_streams = Vec::new();
        let mut matrix_streams = Vec::new();
        for (vertex_stream, path_stream) in matched[0].iter().zip(&matched[1]) {
            let vertices = vectors_of(vertex_stream)?;
            let path = vectors_of(path_stream)?;
            let (bent, matrices) = settings.bend(&vertices, &path)?;
            vertex_streams.push(Value::vectors(bent));
            matrix_streams.push(Value::matrices(matrices));
        }

        if ctx.is_output_linked("Vertices") {
            ctx.set_output("Vertices", Value::List(vertex_streams));
        }
        if ctx.is_output_linked("Matrices") {
            ctx.set_output("Matrices", Value::List(matrix_streams));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshweave_graph::{Evaluator, Graph, NodeId, NodeRegistry};

    struct VectorSource {
        name: &'static str,
        streams: Vec<Vec<DVec3>>,
    }

    impl NodeBehavior for VectorSource {
        fn type_id(&self) -> &'static str {
            self.name
        }

        fn init(&self, node: &mut Node) {
            node.outputs.push(Socket::output("Out", SocketType::Vector));
        }

        fn process(&self, _node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
            ctx.set_output(
                "Out",
                Value::List(
                    self.streams
                        .iter()
                        .map(|s| Value::vectors(s.iter().copied()))
                        .collect(),
                ),
            );
            Ok(())
        }
    }

    struct Sink;
    const SINK: &str = "sink";

    impl NodeBehavior for Sink {
        fn type_id(&self) -> &'static str {
            SINK
        }

        fn init(&self, node: &mut Node) {
            node.inputs.push(Socket::input("In", SocketType::Any));
        }

        fn process(&self, _node: &Node, _ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
            Ok(())
        }
    }

    fn setup(
        vertices: Vec<DVec3>,
        path: Vec<DVec3>,
    ) -> (Graph, NodeRegistry, NodeId) {
        let mut registry = NodeRegistry::new();
        registry.register(Box::new(VectorSource {
            name: "vertex_source",
            streams: vec![vertices],
        }));
        registry.register(Box::new(VectorSource {
            name: "path_source",
            streams: vec![path],
        }));
        registry.register(Box::new(BendNode));
        registry.register(Box::new(Sink));

        let mut graph = Graph::new("test");
        let verts = graph.add_node(registry.instantiate("vertex_source").unwrap());
        let path = graph.add_node(registry.instantiate("path_source").unwrap());
        let bend = graph.add_node(registry.instantiate(BEND).unwrap());
        graph.connect_named(verts, "Out", bend, "Vertices").unwrap();
        graph.connect_named(path, "Out", bend, "Path").unwrap();
        (graph, registry, bend)
    }

    fn listen(graph: &mut Graph, registry: &NodeRegistry, bend: NodeId, output: &str) {
        let sink = graph.add_node(registry.instantiate(SINK).unwrap());
        graph.connect_named(bend, output, sink, "In").unwrap();
    }

    fn bent_vertices(evaluator: &Evaluator, graph: &Graph, bend: NodeId) -> Vec<DVec3> {
        let out = evaluator.output(graph, bend, "Vertices").unwrap();
        out.as_list().unwrap()[0]
            .as_list()
            .unwrap()
            .iter()
            .map(|v| v.as_vector().unwrap())
            .collect()
    }

    #[test]
    fn test_axis_line_lands_on_path() {
        // Vertices along Z with no transverse extent map exactly onto
        // the path samples.
        let (mut graph, registry, bend) = setup(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(0.0, 0.0, 1.0),
                DVec3::new(0.0, 0.0, 2.0),
            ],
            vec![DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0)],
        );
        graph
            .node_mut(bend)
            .unwrap()
            .params
            .set("mode", ParamValue::Text("linear".into()));
        graph
            .node_mut(bend)
            .unwrap()
            .params
            .set("algorithm", ParamValue::Text("diff".into()));
        listen(&mut graph, &registry, bend, "Vertices");

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert!(report.is_clean());
        let bent = bent_vertices(&evaluator, &graph, bend);
        let expected = [
            DVec3::ZERO,
            DVec3::new(1.5, 0.0, 0.0),
            DVec3::new(3.0, 0.0, 0.0),
        ];
        for (got, want) in bent.iter().zip(expected) {
            assert!((got - want).length() < 1e-9, "{got:?} != {want:?}");
        }
    }

    #[test]
    fn test_transverse_offsets_preserved_without_scale_all() {
        let (mut graph, registry, bend) = setup(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(0.0, 0.0, 2.0),
            ],
            vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)],
        );
        {
            let params = &mut graph.node_mut(bend).unwrap().params;
            params.set("mode", ParamValue::Text("linear".into()));
            params.set("algorithm", ParamValue::Text("diff".into()));
            params.set("scale_all", ParamValue::Bool(false));
        }
        listen(&mut graph, &registry, bend, "Vertices");

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert!(report.is_clean());
        let bent = bent_vertices(&evaluator, &graph, bend);
        // Both first vertices sit at t = 0; their mutual distance is a
        // pure transverse offset and rotation keeps it at length 1.
        assert!(((bent[1] - bent[0]).length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_matrices_output_gated_separately() {
        let (mut graph, registry, bend) = setup(
            vec![DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0)],
            vec![DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0)],
        );
        listen(&mut graph, &registry, bend, "Matrices");

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert!(report.is_clean());
        assert_eq!(evaluator.output(&graph, bend, "Vertices"), None);
        let matrices = evaluator.output(&graph, bend, "Matrices").unwrap();
        assert_eq!(matrices.as_list().unwrap()[0].as_list().unwrap().len(), 2);
    }

    #[test]
    fn test_flat_object_is_node_local_error() {
        let (mut graph, registry, bend) = setup(
            vec![DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0)],
            vec![DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0)],
        );
        // Both vertices share z = 0, the default orientation axis.
        listen(&mut graph, &registry, bend, "Vertices");

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0].1, ProcessError::Failed(_)));
    }

    #[test]
    fn test_householder_algorithm_also_lands_on_path() {
        let (mut graph, registry, bend) = setup(
            vec![DVec3::ZERO, DVec3::new(0.0, 0.0, 4.0)],
            vec![DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0)],
        );
        graph
            .node_mut(bend)
            .unwrap()
            .params
            .set("mode", ParamValue::Text("linear".into()));
        listen(&mut graph, &registry, bend, "Vertices");

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert!(report.is_clean());
        let bent = bent_vertices(&evaluator, &graph, bend);
        assert!((bent[0] - DVec3::ZERO).length() < 1e-9);
        assert!((bent[1] - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-9);
    }
}
