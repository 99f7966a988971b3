//! Planar geometry primitives used by quality measures and operations.
//!
//! All routines work on [`Vec2`] and `f64`. Triangle orientation is
//! counter-clockwise positive: `signed_triangle_area(a, b, c) > 0` iff
//! `a, b, c` turn left.

use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub};

/// A 2D point or displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    #[inline]
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalize(self) -> Vec2 {
        let l = self.length();
        if l > 0.0 { self / l } else { Vec2::ZERO }
    }

    /// Counter-clockwise perpendicular.
    #[inline]
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    /// Sum of absolute components.
    #[inline]
    pub fn norm_1(self) -> f64 {
        self.x.abs() + self.y.abs()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Index<usize> for Vec2 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Vec2 index {i} out of range"),
        }
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Vec2::new(x, y)
    }
}

// -----------------------------------------------------------------------------
// Triangles and edges
// -----------------------------------------------------------------------------

/// Signed area, positive for counter-clockwise `a, b, c`.
#[inline]
pub fn signed_triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    0.5 * (b - a).cross(c - a)
}

#[inline]
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    signed_triangle_area(a, b, c).abs()
}

#[inline]
pub fn is_ccw(a: Vec2, b: Vec2, c: Vec2) -> bool {
    signed_triangle_area(a, b, c) > 0.0
}

#[inline]
pub fn edge_length(a: Vec2, b: Vec2) -> f64 {
    (b - a).length()
}

#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

/// Angle at `v1` between the rays towards `v0` and `v2`, in radians.
///
/// Returns `0` when either ray is degenerate.
pub fn angle(v0: Vec2, v1: Vec2, v2: Vec2) -> f64 {
    let a = v0 - v1;
    let b = v2 - v1;
    let aa = a.length_squared();
    let bb = b.length_squared();
    if aa <= 0.0 || bb <= 0.0 {
        return 0.0;
    }
    let value = a.dot(b) / (aa.sqrt() * bb.sqrt());
    value.clamp(-1.0, 1.0).acos()
}

fn sorted_lengths(a: Vec2, b: Vec2, c: Vec2) -> [f64; 3] {
    let mut l = [edge_length(a, b), edge_length(b, c), edge_length(c, a)];
    l.sort_by(f64::total_cmp);
    l
}

/// Ratio of the median edge length to the shortest one.
pub fn maxmin_edge_ratio(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let [lmin, lmed, _] = sorted_lengths(a, b, c);
    lmed / lmin
}

/// Area normalised by the two longest edges; 1 for an equilateral triangle.
pub fn area_edge_ratio(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let factor = 4.0 / 3.0_f64.sqrt();
    let [_, lmed, lmax] = sorted_lengths(a, b, c);
    factor * triangle_area(a, b, c) / (lmax * lmed)
}

/// Determinant of a row-major 3x3 matrix.
#[allow(clippy::too_many_arguments)]
pub fn determinant3(
    a00: f64,
    a01: f64,
    a02: f64,
    a10: f64,
    a11: f64,
    a12: f64,
    a20: f64,
    a21: f64,
    a22: f64,
) -> f64 {
    a00 * (a11 * a22 - a12 * a21) - a01 * (a10 * a22 - a12 * a20) + a02 * (a10 * a21 - a11 * a20)
}

/// In-circle test: positive when `d` lies strictly inside the circumcircle
/// of `a, b, c` (taken counter-clockwise).
pub fn in_circle(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> f64 {
    let (b, c) = if is_ccw(a, b, c) { (b, c) } else { (c, b) };
    let dd = d.length_squared();
    determinant3(
        a.x - d.x,
        a.y - d.y,
        a.length_squared() - dd,
        b.x - d.x,
        b.y - d.y,
        b.length_squared() - dd,
        c.x - d.x,
        c.y - d.y,
        c.length_squared() - dd,
    )
}

// -----------------------------------------------------------------------------
// Barycentric coordinates
// -----------------------------------------------------------------------------

/// Weights `(w1, w2)` of the projection of `p` onto the line through
/// `x1, x2`, so that `w1 * x1 + w2 * x2` is the closest point on the line.
pub fn barycentric_edge(x1: Vec2, x2: Vec2, p: Vec2) -> (f64, f64) {
    let u = x2 - x1;
    let uu = u.length_squared();
    if uu <= 0.0 {
        return (0.5, 0.5);
    }
    let w2 = u.dot(p - x1) / uu;
    (1.0 - w2, w2)
}

/// Barycentric weights of `p` with respect to triangle `x1, x2, x3`.
///
/// The coordinate with the smallest sub-area magnitude is recovered from the
/// partition of unity, which keeps it exact on the opposite edge.
pub fn barycentric_triangle(x1: Vec2, x2: Vec2, x3: Vec2, p: Vec2) -> (f64, f64, f64) {
    let a = (x2 - x1).cross(x3 - x1);
    if a == 0.0 {
        return (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
    }
    let a1 = (x3 - x2).cross(p - x2);
    let a2 = (x1 - x3).cross(p - x3);
    let a3 = (x2 - x1).cross(p - x1);
    let (ab1, ab2, ab3) = (a1.abs(), a2.abs(), a3.abs());
    if ab1 <= ab2 && ab1 <= ab3 {
        let (w2, w3) = (a2 / a, a3 / a);
        (1.0 - w2 - w3, w2, w3)
    } else if ab2 <= ab1 && ab2 <= ab3 {
        let (w1, w3) = (a1 / a, a3 / a);
        (w1, 1.0 - w1 - w3, w3)
    } else {
        let (w1, w2) = (a1 / a, a2 / a);
        (w1, w2, 1.0 - w1 - w2)
    }
}

/// True when all weights lie in `[-tol, 1 + tol]`.
pub fn weights_inside(w: &[f64], tol: f64) -> bool {
    w.iter().all(|&wi| wi >= -tol && wi <= 1.0 + tol)
}

// -----------------------------------------------------------------------------
// Motion
// -----------------------------------------------------------------------------

/// Earliest time `t` at which the triangle `v1, v2, v3` moving with
/// velocities `u1, u2, u3` degenerates (signed area reaches zero).
///
/// The doubled area is the quadratic `a t^2 + b t + c`. Returns `-1` when
/// the area never vanishes under the given velocities.
pub fn collapse_time(v1: Vec2, v2: Vec2, v3: Vec2, u1: Vec2, u2: Vec2, u3: Vec2) -> f64 {
    let e12 = v2 - v1;
    let e13 = v3 - v1;
    let u12 = u2 - u1;
    let u13 = u3 - u1;
    let a = u12.cross(u13);
    let b = u12.x * e13.y + e12.x * u13.y - u12.y * e13.x - e12.y * u13.x;
    let c = e12.cross(e13);

    if a.abs() <= 0.0 {
        if b.abs() <= 0.0 {
            return -1.0;
        }
        return -c / b;
    }
    let delta = b * b - 4.0 * a * c;
    if delta <= 0.0 {
        return -1.0;
    }
    let root = (-b - delta.sqrt()) / (2.0 * a);
    if root >= 0.0 {
        return root;
    }
    (-b + delta.sqrt()) / (2.0 * a)
}

#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}
