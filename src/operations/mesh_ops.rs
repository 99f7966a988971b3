//! Local mesh operations.
//!
//! An operation either moves a vertex in place (`update`, the smoothing and
//! move family) or plans a connectivity change (`plan`): it returns the
//! simplices to remove, the simplices to create and, for every created
//! edge and triangle, the old simplex it inherits attributes from. Planning
//! never edits the mesh beyond allocating fresh vertices; the caller commits
//! the plan with [`InterfaceMesh::replace`] after attribute assignment.

use std::collections::BTreeMap;

use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::geometry::checks::{changes_phase_area, is_any_inverted_after_move, longest_edge_of};
use crate::geometry::primitives::{
    Vec2, barycentric_edge, barycentric_triangle, triangle_area, weights_inside,
};
use crate::mesh_error::RemeshError;
use crate::operations::AnySimplex;
use crate::operations::quality::interface_neighbours;
use crate::topology::mesh::{InterfaceMesh, ParentLut, TriangleMesh};
use crate::topology::phase::{compute_interface, compute_phase};
use crate::topology::predicates::{Predicate, filter};
use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};
use crate::topology::simplex_set::{SimplexSet, difference, intersection};

/// Barycentric weights closer than this to `[0, 1]` count as inside.
const INSIDE_TOLERANCE: f64 = 1e-12;
/// Smoothing moves shorter than this are not applied.
const STATIONARY_TOLERANCE: f64 = 1e-12;

/// Per-label substep targets the move monitor writes for [`OperationKind::Move`].
pub const SUBSTEP_TARGET_X: &str = "__move_substep_target_x";
pub const SUBSTEP_TARGET_Y: &str = "__move_substep_target_y";

/// Mesh operation selector used to configure a batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperationKind {
    EdgeSplit,
    EdgeFlip,
    /// Collapse that may move the interface.
    EdgeCollapse,
    /// Collapse that keeps interface vertices on the interface and phase areas intact.
    InterfacePreservingEdgeCollapse,
    LaplacianSmoothing,
    SmoothingInterface,
    Move,
    Merge,
    VertexSplit,
}

impl OperationKind {
    /// Dimension of the simplices the operation acts on.
    pub fn dimension(self) -> u8 {
        match self {
            OperationKind::LaplacianSmoothing
            | OperationKind::SmoothingInterface
            | OperationKind::Move
            | OperationKind::VertexSplit => 0,
            OperationKind::EdgeSplit
            | OperationKind::EdgeFlip
            | OperationKind::EdgeCollapse
            | OperationKind::InterfacePreservingEdgeCollapse => 1,
            OperationKind::Merge => 2,
        }
    }
}

/// A planned connectivity change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    pub new: SimplexSet,
    pub old: SimplexSet,
    /// New edge → old edge it inherits from.
    pub simplex1_lut: ParentLut<Simplex1>,
    /// New triangle → old triangle it inherits from (and takes the label of).
    pub simplex2_lut: ParentLut<Simplex2>,
}

/// A configured mesh operation for one `(name, label)` round.
#[derive(Clone, Debug)]
pub struct MeshOperation {
    kind: OperationKind,
    label: u32,
    strength: f64,
    area_threshold: f64,
    distance_threshold: f64,
    interpolate: bool,
    use_only_interface: bool,
    use_sparse_edge_attributes: bool,
    new_positions: BTreeMap<Simplex0, Vec2>,
}

impl MeshOperation {
    pub fn new(kind: OperationKind, name: &str, label: u32, parameters: &Parameters) -> Self {
        let settings = parameters.settings(name, label);
        MeshOperation {
            kind,
            label,
            strength: settings.strength,
            area_threshold: settings.area_threshold,
            distance_threshold: settings.distance_threshold,
            interpolate: !(parameters.use_ambient && label == parameters.ambient_label),
            use_only_interface: parameters.use_only_interface,
            use_sparse_edge_attributes: parameters.use_sparse_edge_attributes,
            new_positions: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn dimension(&self) -> u8 {
        self.kind.dimension()
    }

    /// Precomputes smoothing targets for the phase; a no-op for other kinds.
    pub fn init(&mut self, mesh: &TriangleMesh, attrs: &Attributes) {
        self.new_positions.clear();
        match self.kind {
            OperationKind::LaplacianSmoothing => self.init_laplacian(mesh, attrs),
            OperationKind::SmoothingInterface => self.init_interface(mesh, attrs),
            _ => {}
        }
    }

    fn init_laplacian(&mut self, mesh: &TriangleMesh, attrs: &Attributes) {
        let bulk = filter(
            &compute_phase(mesh, self.label),
            mesh,
            &(Predicate::IsDimension(0)
                & !Predicate::IsSubmeshBoundary
                & !Predicate::IsInterface
                & !Predicate::IsBoundary),
        );
        for &v in bulk.vertices() {
            let link = mesh.link(v);
            let n = link.size(0);
            if n == 0 {
                continue;
            }
            let sum = link
                .vertices()
                .fold(Vec2::ZERO, |acc, u| acc + attrs.get_current_value(*u));
            let barycenter = sum / n as f64;
            let p = attrs.get_current_value(v);
            self.new_positions
                .insert(v, barycenter * self.strength + p * (1.0 - self.strength));
        }
    }

    fn init_interface(&mut self, mesh: &TriangleMesh, attrs: &Attributes) {
        let interface = filter(
            &compute_interface(mesh, &compute_phase(mesh, self.label)),
            mesh,
            &(Predicate::IsDimension(0) & !Predicate::IsSubmeshBoundary & !Predicate::IsBoundary),
        );
        for &v in interface.vertices() {
            let p = attrs.get_current_value(v);
            let target = match interface_neighbours(mesh, v) {
                Some((u, w)) => {
                    let barycenter = (attrs.get_current_value(u) + attrs.get_current_value(w)) * 0.5;
                    p * (1.0 - self.strength) + barycenter * self.strength
                }
                None => p,
            };
            self.new_positions.insert(v, target);
        }
    }

    /// Applies an in-place change to `s`. `Ok(false)` means nothing was done.
    pub fn update(
        &self,
        s: AnySimplex,
        mesh: &TriangleMesh,
        attrs: &mut Attributes,
    ) -> Result<bool, RemeshError> {
        let AnySimplex::Vertex(v) = s else {
            return Ok(false);
        };
        match self.kind {
            OperationKind::LaplacianSmoothing => self.update_laplacian(v, mesh, attrs),
            OperationKind::SmoothingInterface => self.update_interface(v, mesh, attrs),
            OperationKind::Move => self.update_move(v, mesh, attrs),
            _ => Ok(false),
        }
    }

    fn update_laplacian(
        &self,
        v: Simplex0,
        mesh: &TriangleMesh,
        attrs: &mut Attributes,
    ) -> Result<bool, RemeshError> {
        if mesh.is_submesh_boundary_vertex(v)
            || mesh.is_interface_vertex(v)
            || mesh.is_boundary_vertex(v)
            || !mesh.is_valid_vertex(v)
        {
            return Ok(false);
        }
        let Some(&new_pos) = self.new_positions.get(&v) else {
            return Ok(false);
        };
        if (new_pos - attrs.get_current_value(v)).length() <= STATIONARY_TOLERANCE {
            return Ok(false);
        }
        let star = mesh.star_vertex(v);
        if is_any_inverted_after_move(v, &star, attrs, new_pos, 0.0) {
            return Ok(false);
        }
        if self.interpolate {
            for t in star.triangles() {
                let [a, b, c] = t.vertices();
                let (w1, w2, w3) = barycentric_triangle(
                    attrs.get_current_value(a),
                    attrs.get_current_value(b),
                    attrs.get_current_value(c),
                    new_pos,
                );
                if !weights_inside(&[w1, w2, w3], INSIDE_TOLERANCE) {
                    continue;
                }
                let names = attrs.attribute_names(0).to_vec();
                for name in &names {
                    let value = w1 * attrs.get_vertex_attribute(name, a, self.label)?
                        + w2 * attrs.get_vertex_attribute(name, b, self.label)?
                        + w3 * attrs.get_vertex_attribute(name, c, self.label)?;
                    attrs.set_vertex_attribute(name, v, self.label, value)?;
                }
                break;
            }
        }
        attrs.set_current_value(v, new_pos);
        Ok(true)
    }

    fn update_interface(
        &self,
        v: Simplex0,
        mesh: &TriangleMesh,
        attrs: &mut Attributes,
    ) -> Result<bool, RemeshError> {
        if mesh.is_submesh_boundary_vertex(v)
            || !mesh.is_interface_vertex(v)
            || mesh.is_boundary_vertex(v)
            || !mesh.is_valid_vertex(v)
        {
            return Ok(false);
        }
        let Some(&new_pos) = self.new_positions.get(&v) else {
            return Ok(false);
        };
        if (new_pos - attrs.get_current_value(v)).length() <= STATIONARY_TOLERANCE {
            return Ok(false);
        }
        let star = mesh.star_vertex(v);
        if is_any_inverted_after_move(v, &star, attrs, new_pos, 0.0) {
            return Ok(false);
        }
        if self.interpolate {
            // both ends of the edge must carry the phase label
            let edges = filter(
                &star,
                mesh,
                &(Predicate::IsDimension(1) & Predicate::IsInterface & Predicate::InPhase(self.label)),
            );
            for e in edges.edges() {
                let [a, b] = e.vertices();
                let (w1, w2) = barycentric_edge(
                    attrs.get_current_value(a),
                    attrs.get_current_value(b),
                    new_pos,
                );
                if !weights_inside(&[w1, w2], INSIDE_TOLERANCE) {
                    continue;
                }
                let names = attrs.attribute_names(0).to_vec();
                for name in &names {
                    let value = w1 * attrs.get_vertex_attribute(name, a, self.label)?
                        + w2 * attrs.get_vertex_attribute(name, b, self.label)?;
                    attrs.set_vertex_attribute(name, v, self.label, value)?;
                }
                break;
            }
        }
        attrs.set_current_value(v, new_pos);
        Ok(true)
    }

    fn update_move(
        &self,
        v: Simplex0,
        mesh: &TriangleMesh,
        attrs: &mut Attributes,
    ) -> Result<bool, RemeshError> {
        if mesh.is_submesh_boundary_vertex(v)
            || mesh.is_boundary_vertex(v)
            || !mesh.is_valid_vertex(v)
        {
            return Ok(false);
        }
        if !mesh.is_interface_vertex(v) && self.use_only_interface {
            return Ok(false);
        }
        if !attrs.exist_attribute(SUBSTEP_TARGET_X, 0) || !attrs.exist_attribute(SUBSTEP_TARGET_Y, 0)
        {
            return Ok(false);
        }
        let new_pos = Vec2::new(
            attrs.get_vertex_attribute(SUBSTEP_TARGET_X, v, self.label)?,
            attrs.get_vertex_attribute(SUBSTEP_TARGET_Y, v, self.label)?,
        );
        if is_any_inverted_after_move(v, &mesh.star_vertex(v), attrs, new_pos, 0.0) {
            return Ok(false);
        }
        attrs.set_current_value(v, new_pos);
        Ok(true)
    }

    /// Plans a connectivity change around `s`, allocating new vertices in
    /// `mesh`. `None` when the operation declines.
    pub fn plan(&self, s: AnySimplex, mesh: &mut TriangleMesh, attrs: &Attributes) -> Option<Plan> {
        match (self.kind, s) {
            (OperationKind::EdgeSplit, AnySimplex::Edge(e)) => self.plan_split(&e, mesh),
            (OperationKind::EdgeFlip, AnySimplex::Edge(e)) => plan_flip(&e, mesh, attrs),
            (OperationKind::EdgeCollapse, AnySimplex::Edge(e)) => {
                self.plan_collapse(&e, mesh, attrs, false)
            }
            (OperationKind::InterfacePreservingEdgeCollapse, AnySimplex::Edge(e)) => {
                self.plan_collapse(&e, mesh, attrs, true)
            }
            (OperationKind::Merge, AnySimplex::Triangle(t)) => plan_merge(&t, mesh, attrs),
            (OperationKind::VertexSplit, AnySimplex::Vertex(v)) => {
                self.plan_vertex_split(v, mesh, attrs)
            }
            _ => None,
        }
    }

    fn plan_split(&self, edge: &Simplex1, mesh: &mut TriangleMesh) -> Option<Plan> {
        if mesh.is_submesh_boundary_edge(edge) || !mesh.is_valid_edge(edge) {
            return None;
        }
        let star = mesh.star_edge(edge);
        let m = mesh.insert_vertex();
        let [v1, v2] = edge.vertices();

        let mut plan = Plan::default();
        plan.old.insert_all(&star);
        plan.new.insert(m);
        for t in star.triangles() {
            let vo = t.opposite_vertex(edge)?;
            for v in [v1, v2] {
                let n = Simplex2::from_vertices(vo, m, v);
                plan.new.insert(n);
                plan.simplex2_lut.insert(n, *t);
                let side = Simplex1::from_vertices(m, v);
                plan.new.insert(side);
                plan.simplex1_lut.insert(side, *edge);
            }
            let cut = Simplex1::from_vertices(m, vo);
            plan.new.insert(cut);
            if !self.use_sparse_edge_attributes {
                plan.simplex1_lut.insert(cut, *edge);
            }
        }
        Some(plan)
    }

    fn plan_collapse(
        &self,
        edge: &Simplex1,
        mesh: &TriangleMesh,
        attrs: &Attributes,
        preserve_interface: bool,
    ) -> Option<Plan> {
        let star = mesh.star_edge(edge);
        let [v1, v2] = edge.vertices();
        let candidates = find_collapsable_vertices(edge, mesh, preserve_interface);
        for &v in candidates.vertices() {
            let vp = if v == v1 { v2 } else { v1 };
            let star_v = mesh.star_vertex(v);
            let remaining = difference(&star_v, &star);
            let target = attrs.get_current_value(vp);
            if is_any_inverted_after_move(v, &remaining, attrs, target, self.area_threshold) {
                continue;
            }
            if preserve_interface
                && changes_phase_area(v, vp, &star_v, attrs, mesh, self.distance_threshold + 1e-12)
            {
                continue;
            }
            return Some(collapse(v, vp, edge, mesh));
        }
        None
    }

    fn plan_vertex_split(
        &self,
        v: Simplex0,
        mesh: &mut TriangleMesh,
        attrs: &Attributes,
    ) -> Option<Plan> {
        if mesh.is_submesh_boundary_vertex(v) || !mesh.is_interface_vertex(v) {
            return None;
        }
        if attrs.get_simplex0_labels(v).len() < 2 {
            return None;
        }
        let star = mesh.star_vertex(v);
        let in_phase = Predicate::InPhase(self.label);
        let phase_interface = filter(
            &star,
            &*mesh,
            &(Predicate::IsDimension(1) & in_phase.clone() & Predicate::IsInterface),
        );
        if phase_interface.size(1) != 2 {
            log::debug!("vertex split skipped at {v}: non-manifold phase boundary");
            return None;
        }

        let w = mesh.insert_vertex();

        let mut plan = Plan::default();
        plan.new.insert(w);
        plan.new.insert(v);
        for e in star.edges() {
            if !in_phase.eval(&*mesh, e) {
                continue;
            }
            let u = e.other(v)?;
            let spoke = Simplex1::from_vertices(u, w);
            plan.new.insert(spoke);
            plan.simplex1_lut.insert(spoke, *e);
            if mesh.is_interface_edge(e) {
                // the gap opened between the two copies of `v` belongs to the ambient phase
                plan.new.insert(Simplex2::from_vertices(v, u, w));
                let bridge = Simplex1::from_vertices(w, v);
                plan.new.insert(bridge);
                plan.simplex1_lut.insert(bridge, *e);
            } else {
                plan.old.insert(*e);
            }
        }
        plan.new.insert(Simplex1::from_vertices(w, v));
        for t in star.triangles() {
            if !in_phase.eval(&*mesh, t) {
                continue;
            }
            let n = t.substitute(v, w);
            plan.old.insert(*t);
            plan.new.insert(n);
            plan.simplex2_lut.insert(n, *t);
        }
        Some(plan)
    }
}

fn plan_flip(edge: &Simplex1, mesh: &TriangleMesh, attrs: &Attributes) -> Option<Plan> {
    if mesh.is_interface_edge(edge)
        || mesh.is_submesh_boundary_edge(edge)
        || mesh.is_boundary_edge(edge)
        || !mesh.is_valid_edge(edge)
    {
        return None;
    }
    let star = mesh.star_edge(edge);
    let (t1, t2) = star.triangle_pair()?;
    let [v1, v2] = edge.vertices();
    let w1 = t1.opposite_vertex(edge)?;
    let w2 = t2.opposite_vertex(edge)?;

    let n1 = Simplex2::from_vertices(w1, w2, v1);
    let n2 = Simplex2::from_vertices(w1, w2, v2);
    let pos = |v: Simplex0| attrs.get_current_value(v);
    if triangle_area(pos(w1), pos(w2), pos(v1)) <= 0.0
        || triangle_area(pos(w1), pos(w2), pos(v2)) <= 0.0
    {
        return None;
    }
    // the flipped diagonal must cross the old one
    let crosses = (pos(v2) - pos(v1)).cross(pos(w1) - pos(v1))
        * (pos(v2) - pos(v1)).cross(pos(w2) - pos(v1))
        < 0.0
        && (pos(w2) - pos(w1)).cross(pos(v1) - pos(w1))
            * (pos(w2) - pos(w1)).cross(pos(v2) - pos(w1))
            < 0.0;
    if !crosses {
        return None;
    }

    let mut plan = Plan::default();
    plan.old = star;
    let diagonal = Simplex1::from_vertices(w1, w2);
    plan.new.insert(n1);
    plan.new.insert(n2);
    plan.new.insert(diagonal);
    plan.simplex2_lut.insert(n1, t1);
    plan.simplex2_lut.insert(n2, t2);
    plan.simplex1_lut.insert(diagonal, *edge);
    Some(plan)
}

fn plan_merge(t: &Simplex2, mesh: &TriangleMesh, attrs: &Attributes) -> Option<Plan> {
    if !mesh.is_valid_triangle(t) {
        return None;
    }
    let (edge, _) = longest_edge_of(mesh, t, attrs)?;
    if mesh.is_submesh_boundary_edge(&edge) {
        return None;
    }
    let vo = t.opposite_vertex(&edge)?;
    if mesh.is_submesh_boundary_vertex(vo) {
        return None;
    }
    let star = mesh.star_edge(&edge);
    let (a, b) = star.triangle_pair()?;
    let other = if a == *t { b } else { a };
    let w = other.opposite_vertex(&edge)?;
    let [v1, v2] = edge.vertices();

    let pos = |v: Simplex0| attrs.get_current_value(v);
    if triangle_area(pos(w), pos(vo), pos(v1)) <= 0.0
        || triangle_area(pos(w), pos(vo), pos(v2)) <= 0.0
    {
        return None;
    }

    let mut plan = Plan::default();
    plan.old = star;
    plan.new.insert(vo);
    for v in [v1, v2] {
        let n = Simplex2::from_vertices(w, vo, v);
        plan.new.insert(n);
        plan.simplex2_lut.insert(n, other);
    }
    let bridge = Simplex1::from_vertices(w, vo);
    plan.new.insert(bridge);
    plan.simplex1_lut.insert(bridge, edge);
    Some(plan)
}

/// True unless collapsing `v` onto `vo` along `e` would tear a submesh cut
/// or pull a boundary vertex inwards.
fn preserves_boundary(v: Simplex0, vo: Simplex0, e: &Simplex1, mesh: &TriangleMesh) -> bool {
    if mesh.is_submesh_boundary_vertex(v) || mesh.is_submesh_boundary_vertex(vo) {
        return false;
    }
    !(mesh.is_boundary_vertex(v) && !mesh.is_boundary_edge(e))
}

/// True if `v` is off the interface, or slides along it: `e` is an interface
/// edge and `v` has exactly two interface edges.
fn preserves_interface(v: Simplex0, e: &Simplex1, mesh: &TriangleMesh) -> bool {
    if !mesh.is_interface_vertex(v) {
        return true;
    }
    if !mesh.is_interface_edge(e) {
        return false;
    }
    let interface_edges = filter(
        &mesh.star_vertex(v),
        mesh,
        &(Predicate::IsDimension(1) & Predicate::IsInterface),
    );
    interface_edges.size(1) == 2
}

/// Endpoints of `edge` that can be collapsed onto the other endpoint
/// without changing the mesh topology, the boundary or (optionally) the
/// interface.
pub fn find_collapsable_vertices(
    edge: &Simplex1,
    mesh: &TriangleMesh,
    preserve_interface: bool,
) -> SimplexSet {
    let mut result = SimplexSet::new();
    if mesh.is_submesh_boundary_edge(edge) || !mesh.is_valid_edge(edge) {
        return result;
    }
    let closure = mesh.closure_edge(edge);
    let star = mesh.star_edge(edge);
    let [v1, v2] = edge.vertices();

    // link condition
    let shared = intersection(&mesh.link(v1), &mesh.link(v2));
    let edge_link = difference(&mesh.closure(&star), &mesh.star(&closure));
    if difference(&shared, &edge_link).size(0) != 0 {
        return result;
    }

    result.insert(v1);
    result.insert(v2);
    if !preserves_boundary(v1, v2, edge, mesh) {
        result.remove(v1);
    }
    if !preserves_boundary(v2, v1, edge, mesh) {
        result.remove(v2);
    }
    if preserve_interface {
        if !preserves_interface(v1, edge, mesh) {
            result.remove(v1);
        }
        if !preserves_interface(v2, edge, mesh) {
            result.remove(v2);
        }
    }
    result
}

/// Plan that removes the star of `from` and reconnects it to `to`.
fn collapse(from: Simplex0, to: Simplex0, edge: &Simplex1, mesh: &TriangleMesh) -> Plan {
    let star = mesh.star_edge(edge);
    let star_from = mesh.star_vertex(from);
    let moved_triangles = difference(&star_from, &star);
    let moved_edges = difference(&star_from, &mesh.closure(&star));

    let mut plan = Plan::default();
    plan.old.insert_all(&star_from);
    for t in moved_triangles.triangles() {
        let n = t.substitute(from, to);
        plan.new.insert(n);
        plan.simplex2_lut.insert(n, *t);
    }
    for e in moved_edges.edges() {
        let [a, b] = e.vertices();
        let n = Simplex1::from_vertices(
            if a == from { to } else { a },
            if b == from { to } else { b },
        );
        plan.new.insert(n);
        plan.simplex1_lut.insert(n, *e);
    }
    plan.new.insert(to);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x3 grid of unit squares' corners, split along the same diagonal, one phase
    fn grid() -> (TriangleMesh, Attributes) {
        let mut tris = Vec::new();
        for j in 0..2u64 {
            for i in 0..2u64 {
                let a = j * 3 + i;
                tris.push([a, a + 1, a + 4]);
                tris.push([a, a + 4, a + 3]);
            }
        }
        let labels = vec![1; tris.len()];
        let mesh = TriangleMesh::from_triangles(9, &tris, &labels).unwrap();
        let positions = (0..9)
            .map(|k| Vec2::new((k % 3) as f64, (k / 3) as f64))
            .collect();
        (mesh, Attributes::with_positions(positions))
    }

    fn params() -> Parameters {
        let mut p = Parameters::default();
        p.labels = vec![1];
        p
    }

    #[test]
    fn split_replaces_star_with_four_triangles() {
        let (mut mesh, attrs) = grid();
        let op = MeshOperation::new(OperationKind::EdgeSplit, "refinement", 1, &params());
        let e = Simplex1::new(0, 4);
        let plan = op.plan(e.into(), &mut mesh, &attrs).unwrap();
        assert_eq!(plan.old.size(2), 2);
        assert!(plan.old.contains(&e));
        assert_eq!(plan.new.size(0), 1);
        assert_eq!(plan.new.size(2), 4);
        assert_eq!(plan.new.size(1), 4);
        assert!(plan.simplex2_lut.values().all(|t| plan.old.contains(t)));
        assert!(plan.simplex1_lut.values().all(|p| *p == e));
    }

    #[test]
    fn sparse_edge_attributes_skip_the_cut_edges() {
        let (mut mesh, attrs) = grid();
        let mut p = params();
        p.use_sparse_edge_attributes = true;
        let op = MeshOperation::new(OperationKind::EdgeSplit, "refinement", 1, &p);
        let plan = op.plan(Simplex1::new(0, 4).into(), &mut mesh, &attrs).unwrap();
        assert_eq!(plan.simplex1_lut.len(), 2);
    }

    #[test]
    fn flip_needs_a_convex_quad() {
        let (mesh, mut attrs) = grid();
        let e = Simplex1::new(0, 4);
        let plan = plan_flip(&e, &mesh, &attrs).unwrap();
        assert!(plan.new.contains(&Simplex1::new(1, 3)));
        assert!(plan_flip(&Simplex1::new(0, 1), &mesh, &attrs).is_none());

        // pull vertex 4 back so the quad 0-1-4-3 becomes a dart
        attrs.set_current_value(Simplex0::new(4), Vec2::new(0.3, 0.3));
        assert!(plan_flip(&e, &mesh, &attrs).is_none());
    }

    #[test]
    fn collapsable_vertices_respect_boundary() {
        let (mesh, _) = grid();
        // interior vertex 4 may slide onto 1, boundary vertex 1 may not move inwards
        let w = find_collapsable_vertices(&Simplex1::new(1, 4), &mesh, false);
        assert!(w.contains(&Simplex0::new(4)));
        assert!(!w.contains(&Simplex0::new(1)));
        // along the boundary both ends qualify
        let w = find_collapsable_vertices(&Simplex1::new(0, 1), &mesh, false);
        assert_eq!(w.size(0), 2);
    }

    #[test]
    fn collapse_reconnects_the_star() {
        let (mut mesh, attrs) = grid();
        let op = MeshOperation::new(OperationKind::EdgeCollapse, "merge", 1, &params());
        let plan = op.plan(Simplex1::new(1, 4).into(), &mut mesh, &attrs).unwrap();
        assert!(plan.old.contains(&Simplex0::new(4)));
        assert!(plan.new.contains(&Simplex0::new(1)));
        assert_eq!(plan.old.size(2), 6);
        assert_eq!(plan.new.size(2), 4);
        assert!(plan.new.triangles().all(|t| !t.contains(Simplex0::new(4))));
    }

    #[test]
    fn laplacian_moves_interior_vertex_to_barycenter() {
        let (mesh, mut attrs) = grid();
        attrs.set_current_value(Simplex0::new(4), Vec2::new(1.2, 0.9));
        let mut p = params();
        p.set_strength("smoothing", 1, 1.0);
        let mut op = MeshOperation::new(OperationKind::LaplacianSmoothing, "smoothing", 1, &p);
        op.init(&mesh, &attrs);
        assert!(op.update(Simplex0::new(4).into(), &mesh, &mut attrs).unwrap());
        let p4 = attrs.get_current_value(Simplex0::new(4));
        assert!((p4 - Vec2::new(1.0, 1.0)).length() < 1e-12);
        // boundary vertices stay put
        assert!(!op.update(Simplex0::new(0).into(), &mesh, &mut attrs).unwrap());
    }

    #[test]
    fn vertex_split_opens_a_gap_at_the_interface() {
        // phase 1 below the polyline 0-1-2, phase 2 above
        let mut mesh = TriangleMesh::from_triangles(
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
        let v1 = Simplex0::new(1);
        attrs.add_simplex0_label(v1, 1);
        attrs.add_simplex0_label(v1, 2);
        let op = MeshOperation::new(OperationKind::VertexSplit, "vertex_split", 1, &params());

        let plan = op.plan(v1.into(), &mut mesh, &attrs).unwrap();
        let w = Simplex0::new(5);
        assert!(mesh.is_valid_vertex(w));
        assert!(!mesh.is_submesh_boundary_vertex(w));
        assert_eq!(plan.new.size(2), 4);
        assert!(plan.old.contains(&Simplex2::new(0, 3, 1)));
        assert!(plan.new.contains(&Simplex2::new(0, 3, 5)));
        assert!(plan.new.contains(&Simplex2::new(1, 0, 5)));

        attrs.insert(&plan.new);
        attrs.set_current_value(w, Vec2::new(0.0, -0.1));
        let positions = attrs.clone();
        mesh.replace(&plan.old, &plan.new, &plan.simplex2_lut, &params(), |v| {
            positions.get_current_value(v)
        })
        .unwrap();
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(mesh.label(&Simplex2::new(0, 3, 5)), Some(1));
        assert_eq!(mesh.label(&Simplex2::new(1, 0, 5)), Some(params().ambient_label));
    }

    #[test]
    fn smoothing_at_rest_reports_nothing() {
        let (mesh, mut attrs) = grid();
        let mut p = params();
        p.set_strength("smoothing", 1, 1.0);
        let mut op = MeshOperation::new(OperationKind::LaplacianSmoothing, "smoothing", 1, &p);
        op.init(&mesh, &attrs);
        // vertex 4 already sits at the barycentre of its ring
        assert!(!op.update(Simplex0::new(4).into(), &mesh, &mut attrs).unwrap());

        attrs.set_current_value(Simplex0::new(4), Vec2::new(1.2, 0.9));
        let p = params();
        let mut op = MeshOperation::new(OperationKind::LaplacianSmoothing, "smoothing", 1, &p);
        op.init(&mesh, &attrs);
        // zero strength keeps the vertex in place
        assert!(!op.update(Simplex0::new(4).into(), &mesh, &mut attrs).unwrap());
        assert_eq!(attrs.get_current_value(Simplex0::new(4)), Vec2::new(1.2, 0.9));
    }
}
