//! Quality measures: which simplices need an operation.
//!
//! A [`QualityMeasure`] is configured once per batch round from
//! `(operation name, label, parameters)` and then asked `is_bad` for every
//! eligible simplex. Every measure answers `false` for a simplex that is no
//! longer in the mesh.
//!
//! The threshold family marks a simplex bad when its metric lies strictly
//! inside `(lower, upper)`. Either bound can be replaced per simplex by an
//! edge or face attribute acting as a sizing field.

use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::geometry::checks::longest_edge_of;
use crate::geometry::primitives::{
    Vec2, angle, area_edge_ratio, deg_to_rad, edge_length, in_circle, maxmin_edge_ratio,
    signed_triangle_area, triangle_area,
};
use crate::operations::AnySimplex;
use crate::topology::mesh::InterfaceMesh;
use crate::topology::predicates::{Predicate, filter};
use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};

/// Quality measure selector used to configure a batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeasureKind {
    EdgeLength,
    TriangleArea,
    MaxMinEdgeRatio,
    AreaEdgeRatio,
    Delaunay,
    InterfaceFlatness,
    Merge,
    MergeEdgeCollapse,
    NoEars,
    VertexSplit,
    AlwaysBad,
}

impl MeasureKind {
    /// Dimension of the simplices the measure judges; `None` for any.
    pub fn dimension(self) -> Option<u8> {
        match self {
            MeasureKind::InterfaceFlatness | MeasureKind::VertexSplit => Some(0),
            MeasureKind::EdgeLength
            | MeasureKind::Delaunay
            | MeasureKind::MergeEdgeCollapse
            | MeasureKind::NoEars => Some(1),
            MeasureKind::TriangleArea
            | MeasureKind::MaxMinEdgeRatio
            | MeasureKind::AreaEdgeRatio
            | MeasureKind::Merge => Some(2),
            MeasureKind::AlwaysBad => None,
        }
    }
}

/// Bounds of the threshold family together with their sizing-field overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct Thresholds {
    pub lower: f64,
    pub upper: f64,
    pub lower_attribute: Option<String>,
    pub upper_attribute: Option<String>,
}

impl Thresholds {
    pub fn new(name: &str, label: u32, parameters: &Parameters) -> Self {
        Thresholds {
            lower: parameters.get_lower_threshold(name, label),
            upper: parameters.get_upper_threshold(name, label),
            lower_attribute: parameters.lower_threshold_attribute(name).map(str::to_string),
            upper_attribute: parameters.upper_threshold_attribute(name).map(str::to_string),
        }
    }

    fn bound<F>(default: f64, attribute: &Option<String>, lookup: F) -> f64
    where
        F: Fn(&str) -> Option<f64>,
    {
        attribute
            .as_deref()
            .and_then(lookup)
            .unwrap_or(default)
    }

    /// `lower < value < upper`, bounds overridden by the edge's sizing field.
    pub fn edge_inside(&self, value: f64, e: &Simplex1, attrs: &Attributes) -> bool {
        let lookup = |name: &str| attrs.get_edge_attribute(name, e).ok();
        let lower = Self::bound(self.lower, &self.lower_attribute, lookup);
        let upper = Self::bound(self.upper, &self.upper_attribute, lookup);
        value > lower && value < upper
    }

    /// `lower < value < upper`, bounds overridden by the triangle's sizing field.
    pub fn face_inside(&self, value: f64, t: &Simplex2, attrs: &Attributes) -> bool {
        let lookup = |name: &str| attrs.get_face_attribute(name, t).ok();
        let lower = Self::bound(self.lower, &self.lower_attribute, lookup);
        let upper = Self::bound(self.upper, &self.upper_attribute, lookup);
        value > lower && value < upper
    }
}

/// A configured quality measure.
#[derive(Clone, Debug, PartialEq)]
pub enum QualityMeasure {
    EdgeLength(Thresholds),
    TriangleArea(Thresholds),
    MaxMinEdgeRatio(Thresholds),
    AreaEdgeRatio(Thresholds),
    /// Interior edge whose quad violates the empty-circumcircle property.
    Delaunay,
    /// Interface vertex whose two interface neighbours span an angle above the
    /// threshold, i.e. a nearly straight piece of interface.
    InterfaceFlatness { max_angle: f64 },
    /// Thin triangle squeezed between two interface pieces.
    Merge { angle: f64, distance: f64 },
    /// Short non-interface edge joining two interface vertices.
    MergeEdgeCollapse { distance: f64 },
    /// Interior edge next to a triangle with two boundary or two interface edges.
    NoEars,
    /// Interface vertex whose labels disagree on the target position.
    VertexSplit {
        label: u32,
        distance: f64,
        active: bool,
    },
    AlwaysBad,
}

impl QualityMeasure {
    /// Reads the settings of `kind` for operation `name` in phase `label`.
    pub fn new(kind: MeasureKind, name: &str, label: u32, parameters: &Parameters) -> Self {
        match kind {
            MeasureKind::EdgeLength => {
                QualityMeasure::EdgeLength(Thresholds::new(name, label, parameters))
            }
            MeasureKind::TriangleArea => {
                QualityMeasure::TriangleArea(Thresholds::new(name, label, parameters))
            }
            MeasureKind::MaxMinEdgeRatio => {
                QualityMeasure::MaxMinEdgeRatio(Thresholds::new(name, label, parameters))
            }
            MeasureKind::AreaEdgeRatio => {
                QualityMeasure::AreaEdgeRatio(Thresholds::new(name, label, parameters))
            }
            MeasureKind::Delaunay => QualityMeasure::Delaunay,
            MeasureKind::InterfaceFlatness => QualityMeasure::InterfaceFlatness {
                max_angle: deg_to_rad(parameters.get_angle_threshold(name, label)),
            },
            MeasureKind::Merge => QualityMeasure::Merge {
                angle: deg_to_rad(parameters.get_angle_threshold(name, label)),
                distance: parameters.get_distance_threshold(name, label),
            },
            MeasureKind::MergeEdgeCollapse => QualityMeasure::MergeEdgeCollapse {
                distance: parameters.get_distance_threshold(name, label),
            },
            MeasureKind::NoEars => QualityMeasure::NoEars,
            MeasureKind::VertexSplit => QualityMeasure::VertexSplit {
                label,
                distance: parameters.get_distance_threshold(name, label),
                active: parameters.use_ambient && label != parameters.ambient_label,
            },
            MeasureKind::AlwaysBad => QualityMeasure::AlwaysBad,
        }
    }

    /// True when `s` should be handed to the operation.
    pub fn is_bad<M: InterfaceMesh + ?Sized>(
        &self,
        s: AnySimplex,
        mesh: &M,
        attrs: &Attributes,
    ) -> bool {
        let pos = |v: Simplex0| attrs.get_current_value(v);
        match (self, s) {
            (QualityMeasure::AlwaysBad, _) => s.is_valid(mesh),

            (QualityMeasure::EdgeLength(th), AnySimplex::Edge(e)) => {
                mesh.is_valid_edge(&e)
                    && th.edge_inside(edge_length(pos(e.v0()), pos(e.v1())), &e, attrs)
            }
            (QualityMeasure::TriangleArea(th), AnySimplex::Triangle(t)) => {
                face_metric(mesh, &t, attrs, th, triangle_area)
            }
            (QualityMeasure::MaxMinEdgeRatio(th), AnySimplex::Triangle(t)) => {
                face_metric(mesh, &t, attrs, th, maxmin_edge_ratio)
            }
            (QualityMeasure::AreaEdgeRatio(th), AnySimplex::Triangle(t)) => {
                face_metric(mesh, &t, attrs, th, area_edge_ratio)
            }

            (QualityMeasure::Delaunay, AnySimplex::Edge(e)) => is_non_delaunay(mesh, &e, attrs),
            (QualityMeasure::InterfaceFlatness { max_angle }, AnySimplex::Vertex(v)) => {
                if mesh.is_submesh_boundary_vertex(v)
                    || !mesh.is_interface_vertex(v)
                    || mesh.is_boundary_vertex(v)
                {
                    return false;
                }
                match interface_neighbours(mesh, v) {
                    Some((p, q)) => angle(pos(p), pos(v), pos(q)) > *max_angle,
                    None => false,
                }
            }
            (QualityMeasure::Merge { angle, distance }, AnySimplex::Triangle(t)) => {
                is_squeezed(mesh, &t, attrs, *angle, *distance)
            }
            (QualityMeasure::MergeEdgeCollapse { distance }, AnySimplex::Edge(e)) => {
                mesh.is_valid_edge(&e)
                    && !mesh.is_interface_edge(&e)
                    && mesh.is_interface_vertex(e.v0())
                    && mesh.is_interface_vertex(e.v1())
                    && edge_length(pos(e.v0()), pos(e.v1())) < *distance
            }
            (QualityMeasure::NoEars, AnySimplex::Edge(e)) => {
                if !mesh.is_valid_edge(&e) || mesh.is_boundary_edge(&e) || mesh.is_interface_edge(&e)
                {
                    return false;
                }
                mesh.edge_faces(&e).iter().any(|t| {
                    let edges = t.edges();
                    edges.iter().filter(|x| mesh.is_boundary_edge(x)).count() > 1
                        || edges.iter().filter(|x| mesh.is_interface_edge(x)).count() > 1
                })
            }
            (
                QualityMeasure::VertexSplit {
                    label,
                    distance,
                    active,
                },
                AnySimplex::Vertex(v),
            ) => {
                if !*active
                    || !mesh.is_valid_vertex(v)
                    || mesh.is_submesh_boundary_vertex(v)
                    || !mesh.is_interface_vertex(v)
                {
                    return false;
                }
                let labels = attrs.get_simplex0_labels(v);
                if labels.len() < 2 {
                    return false;
                }
                let own = attrs.get_target_value(v, *label);
                labels
                    .iter()
                    .filter(|&&other| other != *label)
                    .any(|&other| (attrs.get_target_value(v, other) - own).length() > *distance)
            }

            // a measure handed a simplex of the wrong dimension never selects it
            _ => false,
        }
    }
}

fn face_metric<M, F>(mesh: &M, t: &Simplex2, attrs: &Attributes, th: &Thresholds, metric: F) -> bool
where
    M: InterfaceMesh + ?Sized,
    F: Fn(Vec2, Vec2, Vec2) -> f64,
{
    if !mesh.is_valid_triangle(t) {
        return false;
    }
    let [a, b, c] = t.vertices().map(|v| attrs.get_current_value(v));
    th.face_inside(metric(a, b, c), t, attrs)
}

/// The two vertices joined to `v` by interface edges, if there are exactly two.
pub(crate) fn interface_neighbours<M: InterfaceMesh + ?Sized>(
    mesh: &M,
    v: Simplex0,
) -> Option<(Simplex0, Simplex0)> {
    let interface = filter(
        &mesh.star_vertex(v),
        mesh,
        &(Predicate::IsDimension(1) & Predicate::IsInterface),
    );
    let mut closure = mesh.closure(&interface).of_dimension(0);
    closure.remove(v);
    closure.vertex_pair()
}

/// Whether flipping `(a, b)` to `(c, d)` restores the Delaunay property.
fn should_flip(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    in_circle(a, b, c, d) > 0.0
}

fn is_non_delaunay<M: InterfaceMesh + ?Sized>(mesh: &M, e: &Simplex1, attrs: &Attributes) -> bool {
    let faces = mesh.edge_faces(e);
    let [t1, t2] = faces else {
        return false;
    };
    let pos = |v: Simplex0| attrs.get_current_value(v);
    let area = |t: &Simplex2| {
        let [a, b, c] = t.vertices().map(pos);
        signed_triangle_area(a, b, c)
    };
    if area(t1) <= 0.0 || area(t2) <= 0.0 {
        return false;
    }
    let (Some(w1), Some(w2)) = (t1.opposite_vertex(e), t2.opposite_vertex(e)) else {
        return false;
    };
    let [w1, w2] = if w1 < w2 { [w1, w2] } else { [w2, w1] };
    should_flip(pos(e.v0()), pos(e.v1()), pos(w1), pos(w2))
}

fn is_squeezed<M: InterfaceMesh + ?Sized>(
    mesh: &M,
    s: &Simplex2,
    attrs: &Attributes,
    angle_threshold: f64,
    distance_threshold: f64,
) -> bool {
    if !mesh.is_valid_triangle(s) {
        return false;
    }
    let Some((edge, _)) = longest_edge_of(mesh, s, attrs) else {
        return false;
    };
    if !mesh.is_interface_edge(&edge) {
        return false;
    }
    let Some(vo) = s.opposite_vertex(&edge) else {
        return false;
    };
    if !mesh.is_interface_vertex(vo) {
        return false;
    }
    let Some(t) = mesh.edge_faces(&edge).iter().find(|t| *t != s) else {
        return false;
    };
    let Some(w) = t.opposite_vertex(&edge) else {
        return false;
    };

    let [v1, v2] = edge.sorted().map(Simplex0::new);
    let pos = |v: Simplex0| attrs.get_current_value(v);
    let (p1, p2, po, pw) = (pos(v1), pos(v2), pos(vo), pos(w));

    let a0 = (pw - p1).cross(po - p1);
    let a1 = (pw - p2).cross(po - p2);
    if a0 * a1 > 0.0 || a0.abs() < 1e-9 || a1.abs() < 1e-9 {
        return false;
    }

    let e = (p2 - p1).normalize();
    let r = po - p1;
    let h = r - e * r.dot(e);
    let e1 = (p1 - po).normalize();
    let e2 = (p2 - po).normalize();
    let flat = e1.dot(e2) > angle_threshold.cos();
    let tall = h.length_squared() > distance_threshold * distance_threshold;
    !(flat && tall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::TriangleMesh;

    // unit square split along the 0-2 diagonal
    fn square(labels: [u32; 2]) -> (TriangleMesh, Attributes) {
        let mesh = TriangleMesh::from_triangles(4, &[[0, 1, 2], [0, 2, 3]], &labels).unwrap();
        let attrs = Attributes::with_positions(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        (mesh, attrs)
    }

    #[test]
    fn edge_length_interval_and_sizing_field() {
        let (mesh, mut attrs) = square([1, 1]);
        let mut p = Parameters::default();
        p.set_lower_threshold("refinement", 1, 1.2)
            .set_upper_threshold("refinement", 1, 10.0);
        let m = QualityMeasure::new(MeasureKind::EdgeLength, "refinement", 1, &p);
        let diagonal = Simplex1::new(0, 2);
        let side = Simplex1::new(0, 1);
        assert!(m.is_bad(diagonal.into(), &mesh, &attrs));
        assert!(!m.is_bad(side.into(), &mesh, &attrs));
        assert!(!m.is_bad(Simplex1::new(1, 3).into(), &mesh, &attrs));

        attrs.create_attribute("size", 1).unwrap();
        attrs.set_edge_attribute("size", &diagonal, 2.0).unwrap();
        p.set_lower_threshold_attribute("refinement", "size");
        let m = QualityMeasure::new(MeasureKind::EdgeLength, "refinement", 1, &p);
        assert!(!m.is_bad(diagonal.into(), &mesh, &attrs));
    }

    #[test]
    fn delaunay_detects_bad_diagonal() {
        let (mesh, mut attrs) = square([1, 1]);
        let m = QualityMeasure::Delaunay;
        // cocircular square: not strictly inside
        assert!(!m.is_bad(Simplex1::new(0, 2).into(), &mesh, &attrs));
        // squash vertex 3 towards the diagonal's far side
        attrs.set_current_value(Simplex0::new(3), Vec2::new(0.6, 0.9));
        attrs.set_current_value(Simplex0::new(1), Vec2::new(0.4, 0.1));
        assert!(m.is_bad(Simplex1::new(0, 2).into(), &mesh, &attrs));
        assert!(!m.is_bad(Simplex1::new(0, 1).into(), &mesh, &attrs));
    }

    #[test]
    fn wrong_dimension_and_invalid_simplices_are_never_bad() {
        let (mesh, attrs) = square([1, 2]);
        let p = Parameters::default();
        let m = QualityMeasure::new(MeasureKind::EdgeLength, "refinement", 1, &p);
        assert!(!m.is_bad(Simplex0::new(0).into(), &mesh, &attrs));
        assert!(!QualityMeasure::NoEars.is_bad(Simplex1::new(1, 3).into(), &mesh, &attrs));
        assert!(QualityMeasure::AlwaysBad.is_bad(Simplex0::new(0).into(), &mesh, &attrs));
        assert!(!QualityMeasure::AlwaysBad.is_bad(Simplex0::new(9).into(), &mesh, &attrs));
        assert!(!QualityMeasure::AlwaysBad.is_bad(Simplex1::new(1, 3).into(), &mesh, &attrs));
    }

    #[test]
    fn edge_longer_than_upper_threshold_is_not_bad() {
        // a single triangle with a length-2 edge; the interval (0, 1) does not contain 2
        let mesh = TriangleMesh::from_triangles(3, &[[0, 1, 2]], &[1]).unwrap();
        let attrs = Attributes::with_positions(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
        ]);
        let mut p = Parameters::default();
        p.set_lower_threshold("refinement", 1, 0.0)
            .set_upper_threshold("refinement", 1, 1.0);
        let m = QualityMeasure::new(MeasureKind::EdgeLength, "refinement", 1, &p);
        assert!(!m.is_bad(Simplex1::new(0, 1).into(), &mesh, &attrs));

        p.set_upper_threshold("refinement", 1, 3.0);
        let m = QualityMeasure::new(MeasureKind::EdgeLength, "refinement", 1, &p);
        assert!(m.is_bad(Simplex1::new(0, 1).into(), &mesh, &attrs));
    }

    #[test]
    fn merge_edge_collapse_selects_short_bridges() {
        // a band of phase 2 between two phase-1 caps; 1-3 is a short side of the band
        let mesh = TriangleMesh::from_triangles(
            6,
            &[[0, 2, 1], [1, 2, 3], [2, 4, 3], [3, 4, 5]],
            &[1, 2, 2, 1],
        )
        .unwrap();
        let attrs = Attributes::with_positions(vec![
            Vec2::new(0.5, -1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.1),
            Vec2::new(1.0, 0.1),
            Vec2::new(0.5, 1.0),
        ]);
        let m = QualityMeasure::MergeEdgeCollapse { distance: 0.5 };
        assert!(m.is_bad(Simplex1::new(1, 3).into(), &mesh, &attrs));
        // interior to the band but long
        assert!(!m.is_bad(Simplex1::new(2, 3).into(), &mesh, &attrs));
        // interface edges are never bridges
        assert!(!m.is_bad(Simplex1::new(1, 2).into(), &mesh, &attrs));
    }

    #[test]
    fn interface_flatness_measures_the_kink() {
        // phase 1 below the polyline 0-1-2, phase 2 above
        let mesh = TriangleMesh::from_triangles(
            5,
            &[[0, 3, 1], [1, 3, 2], [0, 1, 4], [1, 2, 4]],
            &[1, 1, 2, 2],
        )
        .unwrap();
        let mut attrs = Attributes::with_positions(vec![
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0),
        ]);
        let mut p = Parameters::default();
        p.set_angle_threshold("interface_smoothing", 1, 170.0);
        let m = QualityMeasure::new(MeasureKind::InterfaceFlatness, "interface_smoothing", 1, &p);
        // straight interface: only nearly flat vertices are smoothed
        assert!(m.is_bad(Simplex0::new(1).into(), &mesh, &attrs));
        // a corner is kept
        attrs.set_current_value(Simplex0::new(1), Vec2::new(0.0, 0.5));
        assert!(!m.is_bad(Simplex0::new(1).into(), &mesh, &attrs));
        // end points of the interface lie on the boundary
        assert!(!m.is_bad(Simplex0::new(0).into(), &mesh, &attrs));
    }
}
