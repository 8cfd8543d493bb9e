// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::socket::{SocketDirection, SocketId, SocketType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes.swap_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a connection from an output socket to an input socket
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_socket: SocketId,
        to_node: NodeId,
        to_socket: SocketId,
    ) -> Result<ConnectionId, ConnectionError> {
        let source_node = self
            .nodes
            .get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target_node = self
            .nodes
            .get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        let source_socket = source_node
            .socket(from_socket)
            .ok_or(ConnectionError::SocketNotFound(from_socket))?;
        let target_socket = target_node
            .socket(to_socket)
            .ok_or(ConnectionError::SocketNotFound(to_socket))?;

        if source_socket.direction != SocketDirection::Output
            || target_socket.direction != SocketDirection::Input
        {
            return Err(ConnectionError::WrongDirection);
        }

        if !source_socket.can_connect(target_socket) {
            return Err(ConnectionError::IncompatibleSockets);
        }

        // One live connection per input socket.
        if self.connections.values().any(|c| c.to_socket == to_socket) {
            return Err(ConnectionError::SocketAlreadyConnected(to_socket));
        }

        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        let connection = Connection::new(from_node, from_socket, to_node, to_socket);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Convenience: connect sockets by name
    pub fn connect_named(
        &mut self,
        from_node: NodeId,
        from_output: &str,
        to_node: NodeId,
        to_input: &str,
    ) -> Result<ConnectionId, ConnectionError> {
        let from_socket = self
            .nodes
            .get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?
            .output(from_output)
            .ok_or_else(|| ConnectionError::SocketNameNotFound(from_output.to_string()))?
            .id;
        let to_socket = self
            .nodes
            .get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?
            .input(to_input)
            .ok_or_else(|| ConnectionError::SocketNameNotFound(to_input.to_string()))?
            .id;
        self.connect(from_node, from_socket, to_node, to_socket)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.swap_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the connection feeding an input socket, if any
    pub fn connection_into(&self, socket_id: SocketId) -> Option<&Connection> {
        self.connections.values().find(|c| c.to_socket == socket_id)
    }

    /// Get connections leaving an output socket
    pub fn connections_from(&self, socket_id: SocketId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.from_socket == socket_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// True if the named input socket of a node has a live connection
    pub fn is_input_linked(&self, node_id: NodeId, input: &str) -> bool {
        self.nodes
            .get(&node_id)
            .and_then(|n| n.input(input))
            .is_some_and(|s| self.connection_into(s.id).is_some())
    }

    /// True if the named output socket of a node has a downstream listener
    pub fn is_output_linked(&self, node_id: NodeId, output: &str) -> bool {
        self.nodes
            .get(&node_id)
            .and_then(|n| n.output(output))
            .is_some_and(|s| self.connections_from(s.id).next().is_some())
    }

    /// Snapshot the link state of one node for use during `update`.
    ///
    /// Owned data, so behaviors can mutate the node while reading it.
    pub fn link_view(&self, node_id: NodeId) -> LinkView {
        let mut view = LinkView::default();
        let Some(node) = self.nodes.get(&node_id) else {
            return view;
        };
        for socket in &node.inputs {
            if let Some(conn) = self.connection_into(socket.id) {
                let upstream_type = self
                    .nodes
                    .get(&conn.from_node)
                    .and_then(|n| n.socket(conn.from_socket))
                    .map(|s| s.socket_type);
                if let Some(upstream_type) = upstream_type {
                    view.linked_inputs.insert(socket.name.clone(), upstream_type);
                }
            }
        }
        for socket in &node.outputs {
            if self.connections_from(socket.id).next().is_some() {
                view.linked_outputs.push(socket.name.clone());
            }
        }
        view
    }

    /// Drop connections whose sockets no longer exist.
    ///
    /// Adaptive nodes may replace sockets during `update`; any edge left
    /// pointing at a removed socket is discarded here.
    pub fn prune_dangling(&mut self) {
        self.connections.retain(|_, c| {
            let from_ok = self
                .nodes
                .get(&c.from_node)
                .is_some_and(|n| n.socket(c.from_socket).is_some());
            let to_ok = self
                .nodes
                .get(&c.to_node)
                .is_some_and(|n| n.socket(c.to_socket).is_some());
            from_ok && to_ok
        });
    }

    /// Get nodes in topological order (for evaluation)
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let mut visited = std::collections::HashSet::new();
        let mut temp_mark = std::collections::HashSet::new();
        let mut order = Vec::new();

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                self.visit(*node_id, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut std::collections::HashSet<NodeId>,
        temp_mark: &mut std::collections::HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), CycleError> {
        if temp_mark.contains(&node_id) {
            return Err(CycleError);
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        temp_mark.insert(node_id);

        // Visit all nodes this node depends on first.
        for connection in self.connections_for_node(node_id) {
            if connection.to_node == node_id {
                self.visit(connection.from_node, visited, temp_mark, order)?;
            }
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Owned snapshot of one node's link state.
#[derive(Debug, Clone, Default)]
pub struct LinkView {
    /// Linked input names mapped to the upstream output's declared type
    pub linked_inputs: IndexMap<String, SocketType>,
    /// Output names with at least one downstream listener
    pub linked_outputs: Vec<String>,
}

impl LinkView {
    /// True if the named input is linked
    pub fn is_input_linked(&self, name: &str) -> bool {
        self.linked_inputs.contains_key(name)
    }

    /// Declared type of the output feeding the named input, if linked
    pub fn upstream_type(&self, name: &str) -> Option<SocketType> {
        self.linked_inputs.get(name).copied()
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Socket not found
    #[error("Socket not found: {0:?}")]
    SocketNotFound(SocketId),

    /// No socket with the given name
    #[error("No socket named '{0}'")]
    SocketNameNotFound(String),

    /// Connection must run from an output to an input
    #[error("Connection must run from an output socket to an input socket")]
    WrongDirection,

    /// Incompatible socket types
    #[error("Incompatible socket types")]
    IncompatibleSockets,

    /// Input socket is already connected
    #[error("Socket already connected: {0:?}")]
    SocketAlreadyConnected(SocketId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}

/// Error when graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;
