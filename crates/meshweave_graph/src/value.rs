// SPDX-License-Identifier: MIT OR Apache-2.0
//! Values flowing through sockets.
//!
//! A [`Value`] is a nested tree whose leaves are scalars, 3-vectors,
//! 4x4 matrices or host object references. The outer list level is by
//! convention a set of independent data streams; inner levels hold the
//! items of one stream.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

/// Payload carried by a socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A single number
    Scalar(f64),
    /// A 3D vector
    Vector(DVec3),
    /// A 4x4 transform matrix
    Matrix(DMat4),
    /// Reference to a host-owned object, by name
    Object(String),
    /// A nested sequence of values
    List(Vec<Value>),
}

impl Value {
    /// An empty list
    pub fn empty() -> Self {
        Self::List(Vec::new())
    }

    /// Build a list of scalars
    pub fn scalars(values: impl IntoIterator<Item = f64>) -> Self {
        Self::List(values.into_iter().map(Value::Scalar).collect())
    }

    /// Build a list of vectors
    pub fn vectors(values: impl IntoIterator<Item = DVec3>) -> Self {
        Self::List(values.into_iter().map(Value::Vector).collect())
    }

    /// Build a list of matrices
    pub fn matrices(values: impl IntoIterator<Item = DMat4>) -> Self {
        Self::List(values.into_iter().map(Value::Matrix).collect())
    }

    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vector(_) => "vector",
            Self::Matrix(_) => "matrix",
            Self::Object(_) => "object",
            Self::List(_) => "list",
        }
    }

    /// Maximum nesting depth below this value. Leaves have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Self::List(items) => 1 + items.iter().map(Value::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// True for an empty list
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::List(items) if items.is_empty())
    }

    /// Extract a scalar leaf
    pub fn as_scalar(&self) -> Result<f64, ValueError> {
        match self {
            Self::Scalar(x) => Ok(*x),
            other => Err(ValueError::KindMismatch {
                expected: "scalar",
                found: other.kind(),
            }),
        }
    }

    /// Extract a vector leaf
    pub fn as_vector(&self) -> Result<DVec3, ValueError> {
        match self {
            Self::Vector(v) => Ok(*v),
            other => Err(ValueError::KindMismatch {
                expected: "vector",
                found: other.kind(),
            }),
        }
    }

    /// Extract a matrix leaf
    pub fn as_matrix(&self) -> Result<DMat4, ValueError> {
        match self {
            Self::Matrix(m) => Ok(*m),
            other => Err(ValueError::KindMismatch {
                expected: "matrix",
                found: other.kind(),
            }),
        }
    }

    /// Extract an object reference leaf
    pub fn as_object(&self) -> Result<&str, ValueError> {
        match self {
            Self::Object(name) => Ok(name),
            other => Err(ValueError::KindMismatch {
                expected: "object",
                found: other.kind(),
            }),
        }
    }

    /// Borrow the items of a list
    pub fn as_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(ValueError::KindMismatch {
                expected: "list",
                found: other.kind(),
            }),
        }
    }

    /// Take ownership of the items of a list
    pub fn into_list(self) -> Result<Vec<Value>, ValueError> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(ValueError::KindMismatch {
                expected: "list",
                found: other.kind(),
            }),
        }
    }

    /// Apply `f` to every value found at exactly `depth` list levels
    /// below this one, rebuilding the outer shape unchanged.
    ///
    /// A non-list value met before the target depth is an error; the
    /// traversal never silently drops data.
    pub fn map_at_depth<F>(&self, depth: usize, f: &mut F) -> Result<Value, ValueError>
    where
        F: FnMut(&Value) -> Result<Value, ValueError>,
    {
        if depth == 0 {
            return f(self);
        }
        match self {
            Self::List(items) => {
                let mut mapped = Vec::with_capacity(items.len());
                for item in items {
                    mapped.push(item.map_at_depth(depth - 1, f)?);
                }
                Ok(Self::List(mapped))
            }
            other => Err(ValueError::DepthMismatch {
                remaining: depth,
                found: other.kind(),
            }),
        }
    }
}

/// Error extracting or traversing a [`Value`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// The value is not of the expected variant
    #[error("expected {expected}, found {found}")]
    KindMismatch {
        /// Variant the caller needed
        expected: &'static str,
        /// Variant actually present
        found: &'static str,
    },

    /// A leaf was reached before the requested nesting depth
    #[error("expected a list {remaining} level(s) above the leaves, found {found}")]
    DepthMismatch {
        /// List levels still to descend
        remaining: usize,
        /// Variant actually present
        found: &'static str,
    },

    /// The value holds no items
    #[error("empty input")]
    Empty,
}
