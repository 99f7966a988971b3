//! Slab domain decomposition.
//!
//! Triangles are sorted by the smallest x coordinate of their corners and
//! cut into `number_of_subdomains` contiguous slabs. Every slab becomes a
//! standalone [`Subdomain`] with its own mesh and attribute store; vertices
//! shared with another slab are flagged as submesh boundary and stay frozen
//! while the subdomains are processed. Successive decompositions alternate
//! between whole and half-shifted slabs so seams do not stay in place.

use std::collections::BTreeMap;

use itertools::{Itertools, MinMaxResult};
use log::debug;

use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::mesh_error::RemeshError;
use crate::topology::mesh::{InterfaceMesh, TriangleMesh};
use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};
use crate::topology::simplex_set::{SimplexSet, union};

/// One independent piece of a decomposed mesh.
#[derive(Clone, Debug, Default)]
pub struct Subdomain {
    pub id: usize,
    pub operations_done: usize,
    pub mesh: TriangleMesh,
    pub attributes: Attributes,
    pub parameters: Parameters,
}

/// Owns the subdomains produced by one decomposition.
#[derive(Clone, Debug, Default)]
pub struct DomainManager {
    subdomains: Vec<Subdomain>,
}

impl DomainManager {
    pub fn new(subdomains: Vec<Subdomain>) -> Self {
        DomainManager { subdomains }
    }

    pub fn len(&self) -> usize {
        self.subdomains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subdomains.is_empty()
    }

    pub fn subdomain(&self, i: usize) -> Option<&Subdomain> {
        self.subdomains.get(i)
    }

    pub fn subdomains(&self) -> &[Subdomain] {
        &self.subdomains
    }

    pub fn subdomains_mut(&mut self) -> &mut [Subdomain] {
        &mut self.subdomains
    }

    /// Sum of the operation counts reported by every subdomain.
    pub fn operations_done(&self) -> usize {
        self.subdomains.iter().map(|s| s.operations_done).sum()
    }
}

/// Slab decomposition state carried between `create_subdomains` and
/// `merge_subdomains`.
#[derive(Clone, Debug)]
pub struct SlabDecomposition {
    simplex_sets: Vec<SimplexSet>,
    /// Per subdomain: submesh boundary vertex → global vertex.
    submesh_to_mesh: Vec<BTreeMap<Simplex0, Simplex0>>,
    submesh_index: BTreeMap<Simplex2, usize>,
    is_black: bool,
}

impl Default for SlabDecomposition {
    fn default() -> Self {
        SlabDecomposition {
            simplex_sets: Vec::new(),
            submesh_to_mesh: Vec::new(),
            submesh_index: BTreeMap::new(),
            is_black: true,
        }
    }
}

fn min_x(t: &Simplex2, attrs: &Attributes) -> f64 {
    t.vertices()
        .into_iter()
        .map(|v| attrs.get_current_value(v).x)
        .fold(f64::INFINITY, f64::min)
}

impl SlabDecomposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest subdomain index among the triangles around `v`; `None` when
    /// they all belong to one subdomain.
    fn on_submesh_boundary(&self, v: Simplex0, mesh: &TriangleMesh) -> Option<usize> {
        let star = mesh.star_vertex(v);
        match star
            .triangles()
            .filter_map(|t| self.submesh_index.get(t).copied())
            .minmax()
        {
            MinMaxResult::MinMax(lo, hi) if lo != hi => Some(hi),
            _ => None,
        }
    }

    /// Cuts the triangle list into slabs; the closure of each slab is one
    /// subdomain's simplex set.
    fn compute_slabs(
        &mut self,
        parameters: &Parameters,
        mesh: &TriangleMesh,
        attrs: &Attributes,
    ) -> Result<(), RemeshError> {
        let n = parameters.number_of_subdomains;
        if n == 0 {
            return Err(RemeshError::InvalidParameters(
                "number_of_subdomains must be positive".into(),
            ));
        }
        let mut sorted: Vec<(f64, Simplex2)> =
            mesh.triangles().map(|(t, _)| (min_x(t, attrs), *t)).collect();
        if sorted.is_empty() {
            return Err(RemeshError::EmptyMesh);
        }
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let total = sorted.len();
        let size = total / n;
        if size == 0 {
            return Err(RemeshError::EmptySubdomain {
                triangles: total,
                subdomains: n,
            });
        }
        let mut remainder = total % n;

        self.simplex_sets.clear();
        let mut begin = 0usize;
        let mut remaining = total;
        let mut next = if self.is_black { size } else { size / 2 };
        while remaining > 0 {
            if remainder > 0 {
                next += 1;
                remainder -= 1;
            }
            let end = (begin + next).min(total);
            let slab: SimplexSet = sorted[begin..end].iter().map(|(_, t)| *t).collect();
            let closure = mesh.closure(&slab);
            match self.simplex_sets.first_mut() {
                // the trailing half slab wraps around onto the first one
                Some(first) if remaining <= next && !self.is_black => {
                    *first = union(&*first, &closure);
                }
                _ => self.simplex_sets.push(closure),
            }
            remaining -= end - begin;
            begin = end;
            next = size.min(remaining);
        }

        if self.simplex_sets.len() != n {
            return Err(RemeshError::SizeMismatch {
                what: "slabs",
                expected: n,
                found: self.simplex_sets.len(),
            });
        }

        self.submesh_index.clear();
        for (i, set) in self.simplex_sets.iter().enumerate() {
            for t in set.triangles() {
                self.submesh_index.insert(*t, i);
            }
        }
        Ok(())
    }

    /// Splits `mesh` into `parameters.number_of_subdomains` subdomains.
    pub fn create_subdomains(
        &mut self,
        parameters: &Parameters,
        mesh: &TriangleMesh,
        attrs: &Attributes,
    ) -> Result<DomainManager, RemeshError> {
        self.compute_slabs(parameters, mesh, attrs)?;

        let mut seams = Vec::with_capacity(self.simplex_sets.len());
        let mut subdomains = Vec::with_capacity(self.simplex_sets.len());
        for (i, set) in self.simplex_sets.iter().enumerate() {
            let mut sub = Subdomain {
                id: i,
                parameters: parameters.clone(),
                ..Subdomain::default()
            };
            sub.attributes.copy_attribute_names(attrs);

            let mut mesh_to_submesh = BTreeMap::new();
            let mut to_global = BTreeMap::new();
            for &v in set.vertices() {
                let local = sub.mesh.insert_vertex();
                mesh_to_submesh.insert(v, local);
                sub.attributes.copy_vertex_values(local, v, attrs);
                let seam = self.on_submesh_boundary(v, mesh).is_some();
                sub.mesh.set_submesh_boundary(local, seam)?;
                if seam {
                    to_global.insert(local, v);
                }
            }
            let local = |v: Simplex0| {
                mesh_to_submesh
                    .get(&v)
                    .copied()
                    .ok_or(RemeshError::UnknownVertex(v))
            };

            for (t, label) in mesh.triangles() {
                if !set.contains(t) {
                    continue;
                }
                let [a, b, c] = t.vertices();
                let nt = Simplex2::from_vertices(local(a)?, local(b)?, local(c)?);
                sub.mesh.insert_triangle(nt, label)?;
                sub.attributes.copy_face_values(&nt, t, attrs);
            }
            for e in set.edges() {
                let ne = Simplex1::from_vertices(local(e.v0())?, local(e.v1())?);
                sub.attributes.copy_edge_values(&ne, e, attrs);
            }

            debug!(
                "subdomain {i}: {} triangles, {} seam vertices",
                sub.mesh.triangle_count(),
                to_global.len()
            );
            seams.push(to_global);
            subdomains.push(sub);
        }

        self.submesh_to_mesh = seams;
        self.is_black = !self.is_black;
        Ok(DomainManager::new(subdomains))
    }

    /// Stitches processed subdomains back into one mesh.
    ///
    /// `mesh` must still be the mesh `create_subdomains` was called with;
    /// it and `attrs` are replaced by the merged result. Seam vertices are
    /// taken from the highest-indexed subdomain that touches them.
    pub fn merge_subdomains(
        &self,
        domains: &DomainManager,
        parameters: &Parameters,
        mesh: &mut TriangleMesh,
        attrs: &mut Attributes,
    ) -> Result<(), RemeshError> {
        if domains.is_empty() {
            return Err(RemeshError::EmptyMesh);
        }
        if domains.len() != self.submesh_to_mesh.len() {
            return Err(RemeshError::SizeMismatch {
                what: "subdomains",
                expected: self.submesh_to_mesh.len(),
                found: domains.len(),
            });
        }

        let mut new_mesh = TriangleMesh::new();
        let mut merged = Attributes::new();
        merged.copy_attribute_names(attrs);
        let mut mesh_to_new_mesh: BTreeMap<Simplex0, Simplex0> = BTreeMap::new();

        for (i, sub) in domains.subdomains().iter().enumerate().rev() {
            if parameters.verbose {
                debug!("merging subdomain {i}");
            }
            let to_global = &self.submesh_to_mesh[i];
            let mut submesh_to_new_mesh = BTreeMap::new();

            for v in sub.mesh.vertices() {
                match to_global.get(&v) {
                    Some(&g) => {
                        if self.on_submesh_boundary(g, mesh) == Some(i) {
                            let nv = new_mesh.insert_vertex();
                            mesh_to_new_mesh.insert(g, nv);
                            merged.copy_vertex_values(nv, v, &sub.attributes);
                        }
                    }
                    None => {
                        let nv = new_mesh.insert_vertex();
                        submesh_to_new_mesh.insert(v, nv);
                        merged.copy_vertex_values(nv, v, &sub.attributes);
                    }
                }
            }

            let new_vertex = |v: Simplex0| {
                match to_global.get(&v) {
                    Some(g) => mesh_to_new_mesh.get(g),
                    None => submesh_to_new_mesh.get(&v),
                }
                .copied()
                .ok_or(RemeshError::UnknownVertex(v))
            };

            for (t, label) in sub.mesh.triangles() {
                let [a, b, c] = t.vertices();
                let nt = Simplex2::from_vertices(new_vertex(a)?, new_vertex(b)?, new_vertex(c)?);
                new_mesh.insert_triangle(nt, label)?;
                merged.copy_face_values(&nt, t, &sub.attributes);
            }
            // seam edges are written by both sides; they never change while decomposed
            for e in sub.mesh.edges() {
                let ne = Simplex1::from_vertices(new_vertex(e.v0())?, new_vertex(e.v1())?);
                merged.copy_edge_values(&ne, e, &sub.attributes);
            }
        }

        *mesh = new_mesh;
        *attrs = merged;
        Ok(())
    }
}
