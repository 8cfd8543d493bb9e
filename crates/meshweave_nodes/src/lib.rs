// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node library for the meshweave graph engine.
//!
//! Generators (grid), modifiers (list rotate, matrix math, bend) and
//! sources (number), plus the pure geometry and spline algorithms they
//! are built on.

pub mod bend;
pub mod display;
pub mod geometry;
pub mod grid;
pub mod list;
pub mod matrix;
pub mod number;
pub mod spline;

pub(crate) mod util;

pub use bend::{BendNode, BEND};
pub use display::DisplayRegistry;
pub use geometry::{
    autorotate_householder, autorotate_quaternion, hex_grid, householder, tri_grid, Lattice,
};
pub use grid::{GridNode, GRID};
pub use list::{ListRotateNode, LIST_ROTATE};
pub use matrix::{MatrixMathNode, MATRIX_MATH};
pub use number::{NumberNode, NUMBER};
pub use spline::{CubicSpline, LinearSpline, Metric, Spline, SplineError};

use meshweave_graph::NodeRegistry;

/// Create a registry with every built-in node behavior
pub fn default_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(Box::new(NumberNode));
    registry.register(Box::new(ListRotateNode));
    registry.register(Box::new(MatrixMathNode));
    registry.register(Box::new(GridNode));
    registry.register(Box::new(BendNode));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshweave_graph::{Evaluator, Graph, ParamValue, Value};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_default_registry_has_all_builtins() {
        let registry = default_registry();
        for type_id in [NUMBER, LIST_ROTATE, MATRIX_MATH, GRID, BEND] {
            assert!(registry.get(type_id).is_some(), "missing {type_id}");
        }
    }

    #[test]
    fn test_number_drives_grid_pipeline() {
        init_tracing();
        let registry = default_registry();
        let mut graph = Graph::new("pipeline");

        let mut number = registry.instantiate(NUMBER).unwrap();
        number.params.set("value", ParamValue::Float(3.0));
        let number = graph.add_node(number);

        let mut grid = registry.instantiate(GRID).unwrap();
        grid.params.set("rows", ParamValue::Int(3));
        let grid = graph.add_node(grid);
        graph
            .connect_named(number, "Integer", grid, "Cols")
            .unwrap();

        let rotate = graph.add_node(registry.instantiate(LIST_ROTATE).unwrap());
        graph
            .connect_named(grid, "Vertices", rotate, "Data")
            .unwrap();

        let sink = graph.add_node(registry.instantiate(BEND).unwrap());
        graph
            .connect_named(rotate, "Data", sink, "Path")
            .unwrap();

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert!(report.is_clean());

        // The 3x3 hex lattice has six vertices; the rotate node shifts
        // the stream by one.
        let rotated = evaluator.output(&graph, rotate, "Data").unwrap();
        let stream = rotated.as_list().unwrap()[0].as_list().unwrap();
        assert_eq!(stream.len(), 6);
        assert!(matches!(stream[0], Value::Vector(_)));
    }

    #[test]
    fn test_failed_node_leaves_siblings_running() {
        init_tracing();
        let registry = default_registry();
        let mut graph = Graph::new("pipeline");

        // Rotating scalar streams two levels down has nothing to rotate
        // and fails node-locally.
        let number = graph.add_node(registry.instantiate(NUMBER).unwrap());
        let mut bad = registry.instantiate(LIST_ROTATE).unwrap();
        bad.params.set("level", ParamValue::Int(2));
        let bad = graph.add_node(bad);
        graph.connect_named(number, "Integer", bad, "Data").unwrap();
        let bad_sink = graph.add_node(registry.instantiate(BEND).unwrap());
        graph.connect_named(bad, "Data", bad_sink, "Path").unwrap();

        let healthy = graph.add_node(registry.instantiate(GRID).unwrap());
        let rotate = graph.add_node(registry.instantiate(LIST_ROTATE).unwrap());
        graph
            .connect_named(healthy, "Vertices", rotate, "Data")
            .unwrap();
        let sink = graph.add_node(registry.instantiate(BEND).unwrap());
        graph.connect_named(rotate, "Data", sink, "Path").unwrap();

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert!(evaluator.output(&graph, rotate, "Data").is_some());
        assert_eq!(evaluator.output(&graph, bad, "Data"), None);
    }
}
