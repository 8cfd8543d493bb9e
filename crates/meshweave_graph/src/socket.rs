// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketId(pub Uuid);

impl SocketId {
    /// Create a new random socket ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

/// Socket direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketDirection {
    /// Input socket
    Input,
    /// Output socket
    Output,
}

/// Semantic type of the stream a socket carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketType {
    /// Streams of numbers
    Scalar,
    /// Streams of 3D vectors
    Vector,
    /// Streams of 4x4 matrices
    Matrix,
    /// Host object references
    Object,
    /// Any stream type (for adaptive sockets)
    Any,
}

impl SocketType {
    /// Check if this type can connect to another type
    pub fn can_connect_to(&self, other: &SocketType) -> bool {
        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }
        self == other
    }
}

/// A socket on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Socket {
    /// Unique socket ID
    pub id: SocketId,
    /// Socket name, unique within its node and direction
    pub name: String,
    /// Socket direction
    pub direction: SocketDirection,
    /// Stream type
    pub socket_type: SocketType,
    /// Locally stored default (for unlinked inputs)
    pub default: Option<Value>,
}

impl Socket {
    /// Create a new input socket
    pub fn input(name: impl Into<String>, socket_type: SocketType) -> Self {
        Self {
            id: SocketId::new(),
            name: name.into(),
            direction: SocketDirection::Input,
            socket_type,
            default: None,
        }
    }

    /// Create a new output socket
    pub fn output(name: impl Into<String>, socket_type: SocketType) -> Self {
        Self {
            id: SocketId::new(),
            name: name.into(),
            direction: SocketDirection::Output,
            socket_type,
            default: None,
        }
    }

    /// Set the stored default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Check if a connection to another socket is valid
    pub fn can_connect(&self, other: &Socket) -> bool {
        if self.direction == other.direction {
            return false;
        }
        self.socket_type.can_connect_to(&other.socket_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_compatibility() {
        assert!(SocketType::Scalar.can_connect_to(&SocketType::Scalar));
        assert!(!SocketType::Scalar.can_connect_to(&SocketType::Matrix));
        assert!(SocketType::Any.can_connect_to(&SocketType::Matrix));
        assert!(SocketType::Vector.can_connect_to(&SocketType::Any));
    }

    #[test]
    fn test_same_direction_rejected() {
        let a = Socket::output("A", SocketType::Scalar);
        let b = Socket::output("B", SocketType::Scalar);
        assert!(!a.can_connect(&b));
        let c = Socket::input("C", SocketType::Scalar);
        assert!(a.can_connect(&c));
    }

    #[test]
    fn test_default_round_trip() {
        let s = Socket::input("Step", SocketType::Scalar)
            .with_default(Value::scalars([1.0]));
        let ron_str = ron::to_string(&s).unwrap();
        let loaded: Socket = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded.name, "Step");
        assert_eq!(loaded.default, Some(Value::scalars([1.0])));
    }
}
