// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and the node behavior contract.

use crate::evaluation::{ProcessContext, ProcessError};
use crate::graph::LinkView;
use crate::socket::{Socket, SocketDirection, SocketId, SocketType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A configuration parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Integer parameter
    Int(i64),
    /// Float parameter
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// Text parameter (also used for enumerated modes)
    Text(String),
}

/// Named configuration parameters of a node.
///
/// Parameters are the node-local state the host persists alongside the
/// graph topology and socket defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeParams {
    values: IndexMap<String, ParamValue>,
}

impl NodeParams {
    /// Set a parameter
    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    /// Get a parameter
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Get an integer parameter, or `default` if absent or mistyped
    pub fn int_or(&self, name: &str, default: i64) -> i64 {
        match self.values.get(name) {
            Some(ParamValue::Int(x)) => *x,
            _ => default,
        }
    }

    /// Get a float parameter, or `default` if absent or mistyped.
    /// Integer parameters are widened.
    pub fn float_or(&self, name: &str, default: f64) -> f64 {
        match self.values.get(name) {
            Some(ParamValue::Float(x)) => *x,
            Some(ParamValue::Int(x)) => *x as f64,
            _ => default,
        }
    }

    /// Get a boolean parameter, or `default` if absent or mistyped
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        match self.values.get(name) {
            Some(ParamValue::Bool(x)) => *x,
            _ => default,
        }
    }

    /// Get a text parameter, or `default` if absent or mistyped
    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.values.get(name) {
            Some(ParamValue::Text(x)) => x,
            _ => default,
        }
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Behavior type ID
    pub type_id: String,
    /// Display name (can be customized)
    pub name: String,
    /// Input sockets
    pub inputs: Vec<Socket>,
    /// Output sockets
    pub outputs: Vec<Socket>,
    /// Configuration parameters
    pub params: NodeParams,
}

impl Node {
    /// Create a new node shell with no sockets.
    ///
    /// Sockets are declared by the behavior's [`NodeBehavior::init`];
    /// use [`NodeRegistry::instantiate`] to get a fully initialized node.
    pub fn new(type_id: impl Into<String>) -> Self {
        let type_id = type_id.into();
        Self {
            id: NodeId::new(),
            name: type_id.clone(),
            type_id,
            inputs: Vec::new(),
            outputs: Vec::new(),
            params: NodeParams::default(),
        }
    }

    /// Get an input socket by name
    pub fn input(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Get an output socket by name
    pub fn output(&self, name: &str) -> Option<&Socket> {
        self.outputs.iter().find(|s| s.name == name)
    }

    /// Get a socket by ID
    pub fn socket(&self, socket_id: SocketId) -> Option<&Socket> {
        self.sockets().find(|s| s.id == socket_id)
    }

    /// Get all sockets
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Change the declared type of an output socket, keeping its ID.
    ///
    /// Returns true if the type actually changed. This is the primitive
    /// adaptive-socket behaviors use from `update`; keeping the ID keeps
    /// downstream connections alive.
    pub fn set_output_type(&mut self, name: &str, socket_type: SocketType) -> bool {
        match self.outputs.iter_mut().find(|s| s.name == name) {
            Some(socket) if socket.socket_type != socket_type => {
                socket.socket_type = socket_type;
                true
            }
            _ => false,
        }
    }

    /// Replace the full socket set, preserving IDs of sockets that keep
    /// their name and direction.
    ///
    /// Idempotent: if names and types already match the requested sets,
    /// nothing changes. Returns true if anything changed.
    pub fn reconfigure(&mut self, inputs: Vec<Socket>, outputs: Vec<Socket>) -> bool {
        fn same_shape(current: &[Socket], wanted: &[Socket]) -> bool {
            current.len() == wanted.len()
                && current
                    .iter()
                    .zip(wanted)
                    .all(|(c, w)| c.name == w.name && c.socket_type == w.socket_type)
        }

        if same_shape(&self.inputs, &inputs) && same_shape(&self.outputs, &outputs) {
            return false;
        }

        let adopt = |mut wanted: Vec<Socket>, current: &[Socket], direction: SocketDirection| {
            for socket in &mut wanted {
                socket.direction = direction;
                if let Some(existing) = current
                    .iter()
                    .find(|c| c.name == socket.name && c.direction == direction)
                {
                    socket.id = existing.id;
                }
            }
            wanted
        };

        self.inputs = adopt(inputs, &self.inputs, SocketDirection::Input);
        self.outputs = adopt(outputs, &self.outputs, SocketDirection::Output);
        true
    }
}

/// Behavior of one node type: the update/process lifecycle.
///
/// Behaviors are stateless strategy objects; all per-instance state
/// lives in the [`Node`] (params, sockets) and the evaluation context
/// (cached output values).
pub trait NodeBehavior {
    /// Stable type identifier, used as the registry key
    fn type_id(&self) -> &'static str;

    /// Declare sockets and default parameters. Called once at creation.
    fn init(&self, node: &mut Node);

    /// React to structural changes (links made or broken, mode params
    /// edited) by adjusting the node's own socket set. Must be
    /// idempotent: repeated calls with no actual change do nothing.
    fn update(&self, node: &mut Node, links: &LinkView) {
        let _ = (node, links);
    }

    /// Compute output values from input values.
    ///
    /// Implementations read inputs through the context, reconcile stream
    /// lengths with a matching policy, and write each output only when
    /// it has a downstream listener. Errors are node-local; the
    /// evaluator never lets them abort sibling nodes.
    fn process(&self, node: &Node, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError>;
}

/// Registry of available node behaviors, keyed by type ID.
///
/// One strategy table resolved at instantiation time; no name-based
/// lookups are scattered through evaluation.
#[derive(Default)]
pub struct NodeRegistry {
    behaviors: IndexMap<&'static str, Box<dyn NodeBehavior>>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            behaviors: IndexMap::new(),
        }
    }

    /// Register a behavior
    pub fn register(&mut self, behavior: Box<dyn NodeBehavior>) {
        self.behaviors.insert(behavior.type_id(), behavior);
    }

    /// Get a behavior by type ID
    pub fn get(&self, type_id: &str) -> Option<&dyn NodeBehavior> {
        self.behaviors.get(type_id).map(Box::as_ref)
    }

    /// All registered type IDs
    pub fn type_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.behaviors.keys().copied()
    }

    /// Create a node of the given type with its sockets declared
    pub fn instantiate(&self, type_id: &str) -> Option<Node> {
        let behavior = self.get(type_id)?;
        let mut node = Node::new(type_id);
        behavior.init(&mut node);
        Some(node)
    }
}
