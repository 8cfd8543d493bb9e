// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pure geometry algorithms used by the generator and matrix nodes.

use glam::{DMat4, DQuat, DVec3, DVec4};
use std::collections::HashMap;

/// A generated lattice: vertices plus index-based topology.
///
/// Every edge and face references vertices by index into `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lattice {
    /// Vertex positions
    pub vertices: Vec<DVec3>,
    /// Edges as pairs of vertex indices
    pub edges: Vec<[usize; 2]>,
    /// Faces as ordered vertex index loops
    pub faces: Vec<Vec<usize>>,
}

/// Hexagonal grid on a skewed lattice.
///
/// Lattice points `(i, j)` with `j % 3 == i % 3` are skipped; the
/// remaining points form hexagon corners. `angle_deg` is the skew angle
/// between the two lattice directions (60 gives regular hexagons).
pub fn hex_grid(step: f64, rows: usize, cols: usize, angle_deg: f64) -> Lattice {
    let alpha = angle_deg.to_radians();
    let (sin_alpha, cos_alpha) = alpha.sin_cos();

    let mut lattice = Lattice::default();
    let mut index = HashMap::new();
    for i in 0..rows {
        for j in 0..cols {
            if j % 3 == i % 3 {
                continue;
            }
            let x = j as f64 * step * sin_alpha;
            let y = step * (i as f64 + j as f64 * cos_alpha);
            index.insert((i, j), lattice.vertices.len());
            lattice.vertices.push(DVec3::new(x, y, 0.0));
        }
    }

    let mut edge = |a: (usize, usize), b: (usize, usize), lattice: &mut Lattice| {
        if let (Some(&v1), Some(&v2)) = (index.get(&a), index.get(&b)) {
            lattice.edges.push([v1, v2]);
        }
    };

    // Edges along a row.
    for i in 0..rows {
        let mut j = (i + 1) % 3;
        while j + 1 < cols {
            edge((i, j), (i, j + 1), &mut lattice);
            j += 3;
        }
    }

    // Diagonal edges down-left.
    for i in 0..rows.saturating_sub(1) {
        let mut j = i % 3 + 1;
        while j < cols {
            edge((i, j), (i + 1, j - 1), &mut lattice);
            j += 3;
        }
    }

    // Edges between rows.
    for i in 0..rows.saturating_sub(1) {
        let mut j = (i + 2) % 3;
        while j < cols {
            edge((i, j), (i + 1, j), &mut lattice);
            j += 3;
        }
    }

    // Hexagon faces span three rows.
    let mut i = 0;
    while i + 2 < rows {
        let mut j = i % 3 + 1;
        while j + 1 < cols {
            let corners = [
                (i, j),
                (i, j + 1),
                (i + 1, j + 1),
                (i + 2, j),
                (i + 2, j - 1),
                (i + 1, j - 1),
            ];
            if let Some(face) = corners
                .iter()
                .map(|c| index.get(c).copied())
                .collect::<Option<Vec<usize>>>()
            {
                lattice.faces.push(face);
            }
            j += 3;
        }
        i += 1;
    }

    lattice
}

/// Triangular grid on a skewed lattice.
///
/// Every lattice point becomes a vertex; each unit cell is split into
/// two triangles.
pub fn tri_grid(step: f64, rows: usize, cols: usize, angle_deg: f64) -> Lattice {
    let alpha = angle_deg.to_radians();
    let (sin_alpha, cos_alpha) = alpha.sin_cos();

    let mut lattice = Lattice::default();
    for i in 0..rows {
        for j in 0..cols {
            let x = j as f64 * step * sin_alpha;
            let y = step * (i as f64 + j as f64 * cos_alpha);
            lattice.vertices.push(DVec3::new(x, y, 0.0));
        }
    }

    let at = |i: usize, j: usize| -> Option<usize> {
        (i < rows && j < cols).then(|| i * cols + j)
    };

    for i in 0..rows {
        for j in 0..cols {
            let v1 = at(i, j);
            let v2 = at(i, j + 1);
            let v3 = at(i + 1, j);
            if let (Some(v1), Some(v2)) = (v1, v2) {
                lattice.edges.push([v1, v2]);
            }
            if let (Some(v2), Some(v3)) = (v2, v3) {
                lattice.edges.push([v2, v3]);
            }
            if let (Some(v3), Some(v1)) = (v3, v1) {
                lattice.edges.push([v3, v1]);
            }
        }
    }

    for i in 0..rows {
        for j in 0..cols {
            let cell = (at(i, j), at(i, j + 1), at(i + 1, j + 1), at(i + 1, j));
            if let (Some(v1), Some(v2), Some(v3), Some(v4)) = cell {
                lattice.faces.push(vec![v1, v2, v4]);
                lattice.faces.push(vec![v2, v3, v4]);
            }
        }
    }

    lattice
}

/// Householder reflection matrix `I - 2 v vᵗ` in homogeneous form.
///
/// Expects a unit-length direction; translation row and column stay
/// zero. The result is its own inverse and maps `v` to `-v`.
pub fn householder(v: DVec3) -> DMat4 {
    let outer = DMat4::from_cols(
        DVec4::new(v.x * v.x, v.x * v.y, v.x * v.z, 0.0),
        DVec4::new(v.y * v.x, v.y * v.y, v.y * v.z, 0.0),
        DVec4::new(v.z * v.x, v.z * v.y, v.z * v.z, 0.0),
        DVec4::ZERO,
    );
    DMat4::IDENTITY - outer * 2.0
}

/// Transform mapping `source` onto the direction of `target`, built from
/// a QR-style Householder reflection.
///
/// The sign is taken from the first non-zero component of `target`, so
/// the intermediate vector never degenerates when the two directions
/// are anti-parallel.
pub fn autorotate_householder(target: DVec3, source: DVec3) -> DMat4 {
    let sign = [target.x, target.y, target.z]
        .iter()
        .find(|x| **x != 0.0)
        .map_or(1.0, |x| -1.0_f64.copysign(*x));

    let alpha = source.length() * sign;
    let u = source - target * alpha;
    let v = u.normalize_or_zero();
    if v == DVec3::ZERO {
        return DMat4::IDENTITY;
    }
    householder(v)
}

/// Rotation mapping `source` onto the direction of `target`, built from
/// the quaternion rotation difference of the two directions.
pub fn autorotate_quaternion(target: DVec3, source: DVec3) -> DMat4 {
    let from = source.normalize_or_zero();
    let to = target.normalize_or_zero();
    if from == DVec3::ZERO || to == DVec3::ZERO {
        return DMat4::IDENTITY;
    }
    DMat4::from_quat(DQuat::from_rotation_arc(from, to))
}
