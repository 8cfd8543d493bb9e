// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dataflow node graph engine for procedural geometry.
//!
//! Nodes declare typed input/output sockets, pull nested-list values
//! from upstream, reconcile stream lengths with a matching policy and
//! push results downstream only when something is listening.
//!
//! ## Architecture
//!
//! The engine is built on a generic graph model with:
//! - Typed sockets with stored defaults
//! - Connection validation
//! - Adaptive socket reconciliation (`update`) before computation
//! - Topological, single-threaded evaluation with node-local errors
//! - Serialization of everything the host persists

pub mod connection;
pub mod evaluation;
pub mod graph;
pub mod matching;
pub mod node;
pub mod socket;
pub mod value;

pub use connection::{Connection, ConnectionId};
pub use evaluation::{EvaluationError, EvaluationReport, Evaluator, ProcessContext, ProcessError};
pub use graph::{ConnectionError, Graph, LinkView};
pub use matching::{match_cross, match_long_repeat};
pub use node::{Node, NodeBehavior, NodeId, NodeParams, NodeRegistry, ParamValue};
pub use socket::{Socket, SocketDirection, SocketId, SocketType};
pub use value::{Value, ValueError};
