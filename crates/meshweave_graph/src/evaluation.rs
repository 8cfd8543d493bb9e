// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph evaluation and execution.
//!
//! Single-threaded, synchronous: the host triggers a pass after user
//! edits, nodes run in topological dependency order, and each node's
//! failure is recorded locally without aborting its siblings.

use crate::graph::Graph;
use crate::node::{NodeId, NodeRegistry};
use crate::socket::SocketId;
use crate::value::{Value, ValueError};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Computed output values of one node
#[derive(Debug, Clone, Default)]
pub struct NodeOutputs {
    /// Output values by socket ID
    values: HashMap<SocketId, Value>,
}

impl NodeOutputs {
    /// Set an output value
    pub fn set(&mut self, socket_id: SocketId, value: Value) {
        self.values.insert(socket_id, value);
    }

    /// Get an output value
    pub fn get(&self, socket_id: SocketId) -> Option<&Value> {
        self.values.get(&socket_id)
    }
}

/// Per-node view of the evaluation state, handed to `process`.
///
/// Inputs resolve through the socket contract: a linked input pulls the
/// upstream node's cached output, an unlinked one falls back to its
/// stored default, and failing both the caller-supplied fallback is
/// returned. Outputs are buffered here and only the sockets a behavior
/// actually writes become visible downstream.
pub struct ProcessContext<'a> {
    graph: &'a Graph,
    node_id: NodeId,
    cache: &'a HashMap<NodeId, NodeOutputs>,
    produced: NodeOutputs,
}

impl<'a> ProcessContext<'a> {
    fn new(graph: &'a Graph, node_id: NodeId, cache: &'a HashMap<NodeId, NodeOutputs>) -> Self {
        Self {
            graph,
            node_id,
            cache,
            produced: NodeOutputs::default(),
        }
    }

    /// Resolve the named input. Never fails: missing sockets, unlinked
    /// inputs without a default and absent upstream values all yield
    /// `fallback`.
    pub fn input(&self, name: &str, fallback: Value) -> Value {
        let Some(node) = self.graph.node(self.node_id) else {
            return fallback;
        };
        let Some(socket) = node.input(name) else {
            return fallback;
        };
        if let Some(conn) = self.graph.connection_into(socket.id) {
            return self
                .cache
                .get(&conn.from_node)
                .and_then(|outputs| outputs.get(conn.from_socket))
                .cloned()
                .unwrap_or(fallback);
        }
        socket.default.clone().unwrap_or(fallback)
    }

    /// Resolve the named input as a list of streams, defaulting to empty
    pub fn input_streams(&self, name: &str) -> Result<Vec<Value>, ValueError> {
        self.input(name, Value::empty()).into_list()
    }

    /// True if the named input has a live upstream connection
    pub fn is_input_linked(&self, name: &str) -> bool {
        self.graph.is_input_linked(self.node_id, name)
    }

    /// True if the named output has at least one downstream listener.
    /// Producers check this before doing expensive work.
    pub fn is_output_linked(&self, name: &str) -> bool {
        self.graph.is_output_linked(self.node_id, name)
    }

    /// True if any output of this node has a listener
    pub fn any_output_linked(&self) -> bool {
        self.graph
            .node(self.node_id)
            .map(|node| {
                node.outputs
                    .iter()
                    .any(|s| self.graph.connections_from(s.id).next().is_some())
            })
            .unwrap_or(false)
    }

    /// Store a computed value on the named output socket.
    ///
    /// Writing an output nothing listens to is wasted work, not an
    /// error; unknown socket names are logged and dropped.
    pub fn set_output(&mut self, name: &str, value: Value) {
        let socket_id = self
            .graph
            .node(self.node_id)
            .and_then(|node| node.output(name))
            .map(|s| s.id);
        match socket_id {
            Some(id) => self.produced.set(id, value),
            None => debug!(node = ?self.node_id, output = name, "write to unknown output socket"),
        }
    }

    fn into_outputs(self) -> NodeOutputs {
        self.produced
    }
}

/// Error raised by one node's `process`. Always node-local.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// A required input is unlinked and has no usable default
    #[error("missing required input '{0}'")]
    MissingInput(String),

    /// Input payload had an unexpected shape or kind
    #[error(transparent)]
    Value(#[from] ValueError),

    /// No behavior registered for the node's type
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    /// Computation failed on otherwise well-formed input
    #[error("{0}")]
    Failed(String),
}

/// Error aborting a whole evaluation pass
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// Graph contains a cycle
    #[error("Graph contains a cycle")]
    CycleDetected,
}

/// Outcome of an evaluation pass: which nodes failed, and why.
///
/// Failures here are advisory; the pass itself completed.
#[derive(Debug, Default)]
pub struct EvaluationReport {
    /// Node-local errors collected during the pass
    pub errors: Vec<(NodeId, ProcessError)>,
}

impl EvaluationReport {
    /// True if every node processed cleanly
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Drives update/process over a graph and caches node outputs.
#[derive(Default)]
pub struct Evaluator {
    cache: HashMap<NodeId, NodeOutputs>,
}

impl Evaluator {
    /// Create a new evaluator with an empty output cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one full evaluation pass.
    ///
    /// First every node's `update` runs (adaptive sockets settle, then
    /// dangling connections are pruned), then `process` runs in
    /// topological order. Node failures land in the report; only a
    /// cycle aborts the pass.
    pub fn run(
        &mut self,
        graph: &mut Graph,
        registry: &NodeRegistry,
    ) -> Result<EvaluationReport, EvaluationError> {
        let ids: Vec<NodeId> = graph.node_ids().collect();
        for id in &ids {
            let Some(node) = graph.node(*id) else { continue };
            let Some(behavior) = registry.get(&node.type_id) else {
                continue;
            };
            let links = graph.link_view(*id);
            if let Some(node) = graph.node_mut(*id) {
                behavior.update(node, &links);
            }
        }
        graph.prune_dangling();

        let order = graph
            .topological_order()
            .map_err(|_| EvaluationError::CycleDetected)?;

        self.cache.clear();
        let mut report = EvaluationReport::default();
        for id in order {
            let Some(node) = graph.node(id) else { continue };
            let Some(behavior) = registry.get(&node.type_id) else {
                report
                    .errors
                    .push((id, ProcessError::UnknownNodeType(node.type_id.clone())));
                continue;
            };

            trace!(node = ?id, type_id = %node.type_id, "processing node");
            let mut ctx = ProcessContext::new(graph, id, &self.cache);
            let outputs = match behavior.process(node, &mut ctx) {
                Ok(()) => ctx.into_outputs(),
                Err(err) => {
                    warn!(node = ?id, type_id = %node.type_id, error = %err, "node process failed");
                    report.errors.push((id, err));
                    // Downstream consumers see this node as silent and
                    // resolve their fallbacks instead.
                    NodeOutputs::default()
                }
            };
            self.cache.insert(id, outputs);
        }
        Ok(report)
    }

    /// Read a cached output by node and socket name
    pub fn output(&self, graph: &Graph, node_id: NodeId, name: &str) -> Option<&Value> {
        let socket = graph.node(node_id)?.output(name)?;
        self.cache.get(&node_id)?.get(socket.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeBehavior};
    use crate::socket::{Socket, SocketType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Emits a fixed scalar stream, counting expensive computations.
    struct CountingSource {
        compute_calls: Arc<AtomicUsize>,
    }

    impl NodeBehavior for CountingSource {
        fn type_id(&self) -> &'static str {
            "counting_source"
        }

        fn init(&self, node: &mut Node) {
            node.outputs.push(Socket::output("Out", SocketType::Scalar));
        }

        fn process(&self, _node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
            if ctx.is_output_linked("Out") {
                self.compute_calls.fetch_add(1, Ordering::SeqCst);
                ctx.set_output("Out", Value::scalars([20.0]));
            }
            Ok(())
        }
    }

    /// Adds 1.0 to every scalar in its single input stream.
    struct Increment;

    impl NodeBehavior for Increment {
        fn type_id(&self) -> &'static str {
            "increment"
        }

        fn init(&self, node: &mut Node) {
            node.inputs.push(
                Socket::input("In", SocketType::Scalar).with_default(Value::scalars([0.0])),
            );
            node.outputs.push(Socket::output("Out", SocketType::Scalar));
        }

        fn process(&self, _node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
            let input = ctx.input("In", Value::empty());
            let bumped = input.map_at_depth(1, &mut |v| Ok(Value::Scalar(v.as_scalar()? + 1.0)))?;
            ctx.set_output("Out", bumped);
            Ok(())
        }
    }

    /// Always fails; used to verify errors stay node-local.
    struct Broken;

    impl NodeBehavior for Broken {
        fn type_id(&self) -> &'static str {
            "broken"
        }

        fn init(&self, node: &mut Node) {
            node.outputs.push(Socket::output("Out", SocketType::Scalar));
        }

        fn process(&self, _node: &Node, _ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
            Err(ProcessError::Failed("intentional".into()))
        }
    }

    fn registry(calls: &Arc<AtomicUsize>) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.register(Box::new(CountingSource {
            compute_calls: Arc::clone(calls),
        }));
        registry.register(Box::new(Increment));
        registry.register(Box::new(Broken));
        registry
    }

    #[test]
    fn test_values_flow_downstream() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut graph = Graph::new("test");
        let src = graph.add_node(registry.instantiate("counting_source").unwrap());
        let inc = graph.add_node(registry.instantiate("increment").unwrap());
        graph.connect_named(src, "Out", inc, "In").unwrap();

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert!(report.is_clean());
        assert_eq!(
            evaluator.output(&graph, inc, "Out"),
            Some(&Value::scalars([21.0]))
        );
    }

    #[test]
    fn test_unlistened_output_skips_computation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut graph = Graph::new("test");
        graph.add_node(registry.instantiate("counting_source").unwrap());

        let mut evaluator = Evaluator::new();
        evaluator.run(&mut graph, &registry).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unlinked_input_uses_default_then_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut graph = Graph::new("test");
        let inc = graph.add_node(registry.instantiate("increment").unwrap());

        let mut evaluator = Evaluator::new();
        evaluator.run(&mut graph, &registry).unwrap();
        // Stored default [0.0] resolves, not the empty fallback.
        assert_eq!(
            evaluator.output(&graph, inc, "Out"),
            Some(&Value::scalars([1.0]))
        );
    }

    #[test]
    fn test_node_error_does_not_abort_siblings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut graph = Graph::new("test");
        graph.add_node(registry.instantiate("broken").unwrap());
        let inc = graph.add_node(registry.instantiate("increment").unwrap());

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert_eq!(report.errors.len(), 1);
        // The sibling still produced its output.
        assert_eq!(
            evaluator.output(&graph, inc, "Out"),
            Some(&Value::scalars([1.0]))
        );
    }

    #[test]
    fn test_failed_upstream_propagates_emptiness() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut graph = Graph::new("test");
        let bad = graph.add_node(registry.instantiate("broken").unwrap());
        let inc = graph.add_node(registry.instantiate("increment").unwrap());
        graph.connect_named(bad, "Out", inc, "In").unwrap();

        let mut evaluator = Evaluator::new();
        let report = evaluator.run(&mut graph, &registry).unwrap();
        assert_eq!(report.errors.len(), 1);
        // Linked input with no upstream value resolves to the fallback.
        assert_eq!(
            evaluator.output(&graph, inc, "Out"),
            Some(&Value::empty())
        );
    }
}
