//! Mesh-aware geometric checks.
//!
//! These combine current vertex positions from [`Attributes`] with the
//! topology of an [`InterfaceMesh`]. Operations use the inversion and area
//! checks to reject moves before they are applied; the engine uses the
//! whole-mesh checks to validate its input once.
//!
//! Triangles are read in the orientation a [`SimplexSet`] holds them with,
//! which for sets built from the mesh (stars, closures) is the stored,
//! counter-clockwise one.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::attributes::Attributes;
use crate::geometry::primitives::{Vec2, signed_triangle_area};
use crate::topology::mesh::InterfaceMesh;
use crate::topology::predicates::{Predicate, filter};
use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};
use crate::topology::simplex_set::SimplexSet;

fn corners(t: &Simplex2, attrs: &Attributes) -> [Vec2; 3] {
    t.vertices().map(|v| attrs.get_current_value(v))
}

/// True if the signed area of any triangle of `set` is at most `threshold`.
pub fn is_any_inverted(set: &SimplexSet, attrs: &Attributes, threshold: f64) -> bool {
    set.triangles().any(|t| {
        let [a, b, c] = corners(t, attrs);
        signed_triangle_area(a, b, c) <= threshold
    })
}

/// True if moving `v` to `new_pos` brings the signed area of any triangle of
/// `set` to at most `threshold`.
///
/// Triangles of `set` that do not contain `v` are checked as they are.
pub fn is_any_inverted_after_move(
    v: Simplex0,
    set: &SimplexSet,
    attrs: &Attributes,
    new_pos: Vec2,
    threshold: f64,
) -> bool {
    set.triangles().any(|t| {
        let mut p = corners(t, attrs);
        if let Some(i) = t.local_index(v) {
            p[i] = new_pos;
        }
        signed_triangle_area(p[0], p[1], p[2]) <= threshold
    })
}

/// True if collapsing `v` onto `vo` changes the total area of any phase
/// among the triangles of `set` by more than `threshold`.
pub fn changes_phase_area<M: InterfaceMesh + ?Sized>(
    v: Simplex0,
    vo: Simplex0,
    set: &SimplexSet,
    attrs: &Attributes,
    mesh: &M,
    threshold: f64,
) -> bool {
    let target = attrs.get_current_value(vo);
    let mut areas: BTreeMap<u32, (f64, f64)> = BTreeMap::new();
    for t in set.triangles() {
        let (Some(label), Some(i)) = (mesh.label(t), t.local_index(v)) else {
            continue;
        };
        let p = corners(t, attrs);
        let old_area = signed_triangle_area(p[0], p[1], p[2]);
        let new_area = signed_triangle_area(target, p[(i + 1) % 3], p[(i + 2) % 3]);
        let entry = areas.entry(label).or_insert((0.0, 0.0));
        entry.0 += old_area;
        entry.1 += new_area;
    }
    areas
        .values()
        .any(|(old_area, new_area)| (old_area - new_area).abs() > threshold)
}

/// True if two vertices of `set` are closer than `threshold` in the 1-norm.
pub fn has_multiple_vertices(set: &SimplexSet, attrs: &Attributes, threshold: f64) -> bool {
    let points: Vec<Vec2> = set.vertices().map(|v| attrs.get_current_value(*v)).collect();
    points.iter().enumerate().any(|(i, a)| {
        points[i + 1..]
            .iter()
            .any(|b| (*a - *b).norm_1() < threshold)
    })
}

/// True if the boundary edges of the mesh form exactly one closed simple
/// cycle: no open boundary and no holes.
pub fn has_simple_boundary<M: InterfaceMesh + ?Sized>(mesh: &M) -> bool {
    let boundary = filter(
        &mesh.get_all_simplices(),
        mesh,
        &(Predicate::IsDimension(1) & Predicate::IsBoundary),
    );
    let mut around: BTreeMap<Simplex0, Vec<Simplex1>> = BTreeMap::new();
    for e in boundary.edges() {
        for v in e.vertices() {
            around.entry(v).or_default().push(*e);
        }
    }
    if around.is_empty() || around.len() != boundary.size(1) {
        return false;
    }
    if around.values().any(|edges| edges.len() != 2) {
        return false;
    }

    let Some(first) = boundary.first_edge() else {
        return false;
    };
    let start = first.v0();
    let mut used: BTreeSet<Simplex1> = BTreeSet::new();
    let mut current = start;
    loop {
        let Some(next_edge) = around[&current].iter().find(|e| !used.contains(*e)) else {
            break;
        };
        used.insert(*next_edge);
        match next_edge.other(current) {
            Some(next) => current = next,
            None => return false,
        }
        if current == start {
            break;
        }
    }
    current == start && used.len() == boundary.size(1)
}

/// True if every edge and vertex of the mesh is manifold.
pub fn is_manifold<M: InterfaceMesh + ?Sized>(mesh: &M) -> bool {
    let all = mesh.get_all_simplices();
    all.edges().all(|e| mesh.is_manifold_edge(e))
        && all.vertices().all(|v| mesh.is_manifold_vertex(*v))
}

/// True if any triangle of the mesh has two one-sided edges.
pub fn has_ear<M: InterfaceMesh + ?Sized>(mesh: &M) -> bool {
    mesh.get_all_simplices().triangles().any(|t| mesh.is_ear(t))
}

/// Longest edge of `set` and its squared length.
pub fn longest_edge(set: &SimplexSet, attrs: &Attributes) -> Option<(Simplex1, f64)> {
    let mut best: Option<(Simplex1, f64)> = None;
    for e in set.edges() {
        let d = (attrs.get_current_value(e.v0()) - attrs.get_current_value(e.v1())).length_squared();
        if best.is_none_or(|(_, max)| d > max) {
            best = Some((*e, d));
        }
    }
    best
}

/// Longest edge of triangle `t`.
pub fn longest_edge_of<M: InterfaceMesh + ?Sized>(
    mesh: &M,
    t: &Simplex2,
    attrs: &Attributes,
) -> Option<(Simplex1, f64)> {
    longest_edge(&mesh.full_boundary_triangle(t), attrs)
}

/// Unit normal of interface edge `e` pointing out of the phase `label`.
///
/// `None` if `e` has no incident triangle labelled `label` or is degenerate.
pub fn compute_normal<M: InterfaceMesh + ?Sized>(
    e: &Simplex1,
    mesh: &M,
    attrs: &Attributes,
    label: u32,
) -> Option<Vec2> {
    let [i, j] = e.sorted();
    let (v1, v2) = (Simplex0::new(i), Simplex0::new(j));
    let direction = attrs.get_current_value(v2) - attrs.get_current_value(v1);
    if direction.length_squared() == 0.0 {
        return None;
    }
    let normal = direction.normalize().perp();
    let inside = mesh
        .edge_faces(e)
        .iter()
        .find(|t| mesh.label(t) == Some(label))?;
    let vo = inside.opposite_vertex(e)?;
    let r = attrs.get_current_value(vo) - attrs.get_current_value(v1);
    if r.dot(normal) < 0.0 {
        Some(normal)
    } else {
        Some(-normal)
    }
}

/// Position of interface vertex `v` pushed `distance` along the offset of
/// the boundary of phase `label` (positive outwards).
///
/// `None` unless `v` has exactly two interface edges in the phase and their
/// averaged normal is well defined.
pub fn compute_offset_position<M: InterfaceMesh + ?Sized>(
    v: Simplex0,
    mesh: &M,
    attrs: &Attributes,
    label: u32,
    distance: f64,
) -> Option<Vec2> {
    let interface = filter(
        &mesh.star_vertex(v),
        mesh,
        &(Predicate::IsDimension(1) & Predicate::InPhase(label) & Predicate::IsInterface),
    );
    let (e0, e1) = match interface.edges().collect::<Vec<_>>().as_slice() {
        [a, b] => (**a, **b),
        _ => return None,
    };
    let n0 = compute_normal(&e0, mesh, attrs, label)?;
    let n1 = compute_normal(&e1, mesh, attrs, label)?;
    let sum = n0 + n1;
    if sum.length_squared() == 0.0 {
        return None;
    }
    let n = sum.normalize();
    let c = n.dot(n0);
    if c <= 0.0 {
        return None;
    }
    Some(attrs.get_current_value(v) + n * (distance / c))
}

/// Midpoint of the segment between two vertices.
pub fn compute_midpoint(a: Simplex0, b: Simplex0, attrs: &Attributes) -> Vec2 {
    (attrs.get_current_value(a) + attrs.get_current_value(b)) * 0.5
}

/// Lower-left and upper-right corners of the vertices of `set`.
pub fn compute_bounding_box(set: &SimplexSet, attrs: &Attributes) -> Option<(Vec2, Vec2)> {
    let mut points = set.vertices().map(|v| attrs.get_current_value(*v));
    let first = points.next()?;
    Some(points.fold((first, first), |(lo, hi), p| {
        (
            Vec2::new(lo.x.min(p.x), lo.y.min(p.y)),
            Vec2::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}

/// Translates and uniformly scales the vertices of `mesh` into the unit box.
///
/// A mesh with no extent is left untouched.
pub fn make_unit<M: InterfaceMesh + ?Sized>(mesh: &M, attrs: &mut Attributes) {
    let vertices = mesh.get_all_simplices().of_dimension(0);
    let Some((lo, hi)) = compute_bounding_box(&vertices, attrs) else {
        return;
    };
    let scale = (hi.x - lo.x).max(hi.y - lo.y);
    if scale <= 0.0 {
        return;
    }
    for v in vertices.vertices() {
        let p = attrs.get_current_value(*v);
        attrs.set_current_value(*v, (p - lo) / scale);
    }
}
