// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interpolating splines over 3D control points.
//!
//! Used by the bend node to project vertices onto a path. Knot spacing
//! is derived from a distance metric over the control points and
//! normalized to `t` in `[0, 1]`.

use glam::DVec3;

/// Distance metric used to space spline knots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// L1 distance between consecutive points
    Manhattan,
    /// L2 distance between consecutive points
    #[default]
    Euclidean,
    /// Uniform spacing regardless of distance
    Points,
    /// L-infinity distance between consecutive points
    Chebyshev,
}

impl Metric {
    /// Parse a metric name; unknown names fall back to Euclidean
    pub fn from_name(name: &str) -> Self {
        match name {
            "manhattan" => Self::Manhattan,
            "points" => Self::Points,
            "chebyshev" => Self::Chebyshev,
            _ => Self::Euclidean,
        }
    }

    fn distance(&self, a: DVec3, b: DVec3) -> f64 {
        let d = b - a;
        match self {
            Self::Manhattan => d.x.abs() + d.y.abs() + d.z.abs(),
            Self::Euclidean => d.length(),
            Self::Points => 1.0,
            Self::Chebyshev => d.x.abs().max(d.y.abs()).max(d.z.abs()),
        }
    }
}

/// Error building a spline
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    /// A spline needs at least two control points
    #[error("spline needs at least 2 control points, got {0}")]
    TooFewPoints(usize),

    /// Consecutive control points collapsed to zero knot distance
    #[error("degenerate knot spacing (coincident control points)")]
    DegenerateKnots,
}

/// A parametric curve over `t` in `[0, 1]`
pub trait Spline {
    /// Point on the curve
    fn eval(&self, t: f64) -> DVec3;
    /// First derivative with respect to `t` (not normalized)
    fn tangent(&self, t: f64) -> DVec3;

    /// Approximate arc length by sampling a polyline
    fn length(&self, resolution: usize) -> f64 {
        let n = resolution.max(1);
        (0..n)
            .map(|i| {
                let t0 = i as f64 / n as f64;
                let t1 = (i + 1) as f64 / n as f64;
                (self.eval(t1) - self.eval(t0)).length()
            })
            .sum()
    }
}

fn knots(points: &[DVec3], metric: Metric) -> Result<Vec<f64>, SplineError> {
    if points.len() < 2 {
        return Err(SplineError::TooFewPoints(points.len()));
    }
    let mut ts = Vec::with_capacity(points.len());
    ts.push(0.0);
    let mut total = 0.0;
    for pair in points.windows(2) {
        total += metric.distance(pair[0], pair[1]);
        ts.push(total);
    }
    if total <= 0.0 {
        return Err(SplineError::DegenerateKnots);
    }
    for t in &mut ts {
        *t /= total;
    }
    Ok(ts)
}

/// Index of the segment containing `t`, clamped to valid segments
fn segment(ts: &[f64], t: f64) -> usize {
    let last = ts.len() - 2;
    match ts[1..=last].iter().position(|knot| t < *knot) {
        Some(i) => i,
        None => last,
    }
}

/// Piecewise-linear interpolation through the control points
#[derive(Debug, Clone)]
pub struct LinearSpline {
    points: Vec<DVec3>,
    ts: Vec<f64>,
}

impl LinearSpline {
    /// Build from control points with the given knot metric
    pub fn new(points: Vec<DVec3>, metric: Metric) -> Result<Self, SplineError> {
        let ts = knots(&points, metric)?;
        Ok(Self { points, ts })
    }
}

impl Spline for LinearSpline {
    fn eval(&self, t: f64) -> DVec3 {
        let i = segment(&self.ts, t);
        let h = self.ts[i + 1] - self.ts[i];
        let u = ((t - self.ts[i]) / h).clamp(0.0, 1.0);
        self.points[i].lerp(self.points[i + 1], u)
    }

    fn tangent(&self, t: f64) -> DVec3 {
        let i = segment(&self.ts, t);
        let h = self.ts[i + 1] - self.ts[i];
        (self.points[i + 1] - self.points[i]) / h
    }
}

/// Natural cubic spline through the control points
#[derive(Debug, Clone)]
pub struct CubicSpline {
    points: Vec<DVec3>,
    ts: Vec<f64>,
    /// Second derivatives at each knot (natural boundary: zero at ends)
    curvature: Vec<DVec3>,
}

impl CubicSpline {
    /// Build from control points with the given knot metric
    pub fn new(points: Vec<DVec3>, metric: Metric) -> Result<Self, SplineError> {
        let ts = knots(&points, metric)?;
        let n = points.len();
        let mut curvature = vec![DVec3::ZERO; n];
        if n > 2 {
            // Thomas algorithm on the tridiagonal system for the
            // interior second derivatives.
            let m = n - 2;
            let mut diag = vec![0.0; m];
            let mut upper = vec![0.0; m];
            let mut rhs = vec![DVec3::ZERO; m];
            for k in 0..m {
                let i = k + 1;
                let h0 = ts[i] - ts[i - 1];
                let h1 = ts[i + 1] - ts[i];
                diag[k] = 2.0 * (h0 + h1);
                upper[k] = h1;
                rhs[k] = ((points[i + 1] - points[i]) / h1 - (points[i] - points[i - 1]) / h0)
                    * 6.0;
            }
            for k in 1..m {
                let i = k + 1;
                let lower = ts[i] - ts[i - 1];
                let w = lower / diag[k - 1];
                diag[k] -= w * upper[k - 1];
                let prev = rhs[k - 1] * w;
                rhs[k] -= prev;
            }
            curvature[m] = rhs[m - 1] / diag[m - 1];
            for k in (0..m - 1).rev() {
                curvature[k + 1] = (rhs[k] - curvature[k + 2] * upper[k]) / diag[k];
            }
        }
        Ok(Self {
            points,
            ts,
            curvature,
        })
    }
}

impl Spline for CubicSpline {
    fn eval(&self, t: f64) -> DVec3 {
        let i = segment(&self.ts, t);
        let h = self.ts[i + 1] - self.ts[i];
        let a = (self.ts[i + 1] - t) / h;
        let b = (t - self.ts[i]) / h;
        self.points[i] * a
            + self.points[i + 1] * b
            + (self.curvature[i] * (a * a * a - a) + self.curvature[i + 1] * (b * b * b - b))
                * (h * h / 6.0)
    }

    fn tangent(&self, t: f64) -> DVec3 {
        let i = segment(&self.ts, t);
        let h = self.ts[i + 1] - self.ts[i];
        let a = (self.ts[i + 1] - t) / h;
        let b = (t - self.ts[i]) / h;
        (self.points[i + 1] - self.points[i]) / h
            + (self.curvature[i] * -(3.0 * a * a - 1.0) + self.curvature[i + 1] * (3.0 * b * b - 1.0))
                * (h / 6.0)
    }
}
