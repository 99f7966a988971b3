//! Named per-simplex attribute storage.
//!
//! `Attributes` owns the current vertex positions and an open set of named
//! real-valued attributes for each simplex dimension:
//!
//! - **vertex attributes are label-multiplexed.** A vertex touching phases
//!   `{2, 5}` carries the label list `[2, 5]` and one value per label for
//!   every named vertex attribute. The value vector of each attribute is
//!   kept the same length as the label list: adding a label appends a zero
//!   slot everywhere, erasing one drops its slot everywhere.
//! - **edge and face attributes are single-valued** and sparse: a simplex
//!   may simply have no value yet.
//!
//! Target positions are stored as the reserved vertex attributes
//! [`TARGET_X`]/[`TARGET_Y`], created on first use by
//! [`Attributes::set_target_value`]. Names starting with `__` are reserved
//! for the engine.

use std::collections::BTreeMap;

use crate::geometry::primitives::Vec2;
use crate::mesh_error::RemeshError;
use crate::topology::simplex::{Simplex, Simplex0, Simplex1, Simplex2};
use crate::topology::simplex_set::SimplexSet;

pub const TARGET_X: &str = "__target_x";
pub const TARGET_Y: &str = "__target_y";

/// Values of one named vertex attribute, indexed by vertex slot then label slot.
type VertexColumn = Vec<Vec<f64>>;

/// Current positions plus named vertex, edge and face attributes.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    current: Vec<Vec2>,
    labels: Vec<Vec<u32>>,
    vertex_names: Vec<String>,
    vertex_values: BTreeMap<String, VertexColumn>,
    edge_names: Vec<String>,
    edge_values: BTreeMap<String, BTreeMap<Simplex1, f64>>,
    face_names: Vec<String>,
    face_values: BTreeMap<String, BTreeMap<Simplex2, f64>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `positions` as the current vertex positions and no labels.
    pub fn with_positions(positions: Vec<Vec2>) -> Self {
        let n = positions.len();
        Attributes {
            current: positions,
            labels: vec![Vec::new(); n],
            ..Self::default()
        }
    }

    /// Number of vertex slots.
    pub fn capacity(&self) -> usize {
        self.current.len()
    }

    /// Grows every per-vertex vector so that `v` has a slot.
    fn ensure_slot(&mut self, v: Simplex0) {
        let need = v.slot() + 1;
        if self.current.len() < need {
            self.current.resize(need, Vec2::ZERO);
            self.labels.resize(need, Vec::new());
            for column in self.vertex_values.values_mut() {
                column.resize(need, Vec::new());
            }
        }
    }

    // --- attribute registry ---------------------------------------------

    /// Registers a named attribute for simplices of dimension `dim`.
    pub fn create_attribute(&mut self, name: &str, dim: u8) -> Result<(), RemeshError> {
        if dim > 2 {
            return Err(RemeshError::InvalidDimension(dim));
        }
        if self.exist_attribute(name, dim) {
            return Err(RemeshError::DuplicateAttribute {
                name: name.to_string(),
                dimension: dim,
            });
        }
        match dim {
            0 => {
                let column = self.labels.iter().map(|l| vec![0.0; l.len()]).collect();
                self.vertex_names.push(name.to_string());
                self.vertex_values.insert(name.to_string(), column);
            }
            1 => {
                self.edge_names.push(name.to_string());
                self.edge_values.insert(name.to_string(), BTreeMap::new());
            }
            _ => {
                self.face_names.push(name.to_string());
                self.face_values.insert(name.to_string(), BTreeMap::new());
            }
        }
        Ok(())
    }

    pub fn exist_attribute(&self, name: &str, dim: u8) -> bool {
        match dim {
            0 => self.vertex_values.contains_key(name),
            1 => self.edge_values.contains_key(name),
            2 => self.face_values.contains_key(name),
            _ => false,
        }
    }

    /// Attribute names of dimension `dim` in creation order.
    pub fn attribute_names(&self, dim: u8) -> &[String] {
        match dim {
            0 => &self.vertex_names,
            1 => &self.edge_names,
            2 => &self.face_names,
            _ => &[],
        }
    }

    fn missing(name: &str, dim: u8) -> RemeshError {
        RemeshError::MissingAttribute {
            name: name.to_string(),
            dimension: dim,
        }
    }

    // --- current positions ----------------------------------------------

    /// Current position of `v`; the origin for a vertex without a slot.
    pub fn get_current_value(&self, v: Simplex0) -> Vec2 {
        self.current.get(v.slot()).copied().unwrap_or(Vec2::ZERO)
    }

    /// Moves `v` without any validity check.
    pub fn set_current_value(&mut self, v: Simplex0, p: Vec2) {
        self.ensure_slot(v);
        self.current[v.slot()] = p;
    }

    /// All current positions indexed by vertex slot.
    pub fn current_values(&self) -> &[Vec2] {
        &self.current
    }

    /// Overwrites every current position.
    pub fn set_current_values(&mut self, positions: &[Vec2]) -> Result<(), RemeshError> {
        if positions.len() != self.current.len() {
            return Err(RemeshError::SizeMismatch {
                what: "current positions",
                expected: self.current.len(),
                found: positions.len(),
            });
        }
        self.current.copy_from_slice(positions);
        Ok(())
    }

    // --- labels -----------------------------------------------------------

    /// Labels carried by `v`, in insertion order.
    pub fn get_simplex0_labels(&self, v: Simplex0) -> &[u32] {
        self.labels.get(v.slot()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_label(&self, v: Simplex0, label: u32) -> bool {
        self.get_simplex0_labels(v).contains(&label)
    }

    fn label_slot(&self, v: Simplex0, label: u32) -> Result<usize, RemeshError> {
        self.get_simplex0_labels(v)
            .iter()
            .position(|&l| l == label)
            .ok_or(RemeshError::MissingLabel { vertex: v, label })
    }

    /// Appends `label` to `v` with a zero value in every vertex attribute.
    ///
    /// Adding a label the vertex already carries is a no-op.
    pub fn add_simplex0_label(&mut self, v: Simplex0, label: u32) {
        self.ensure_slot(v);
        if self.labels[v.slot()].contains(&label) {
            return;
        }
        self.labels[v.slot()].push(label);
        for column in self.vertex_values.values_mut() {
            column[v.slot()].push(0.0);
        }
    }

    /// Drops `label` and its value slot from every vertex attribute of `v`.
    pub fn erase_simplex0_label(&mut self, v: Simplex0, label: u32) {
        let Ok(idx) = self.label_slot(v, label) else {
            return;
        };
        self.labels[v.slot()].remove(idx);
        for column in self.vertex_values.values_mut() {
            let values = &mut column[v.slot()];
            if idx < values.len() {
                values.remove(idx);
            }
        }
    }

    /// Removes every label and vertex attribute value of `v`.
    pub fn clear_simplex0_labels(&mut self, v: Simplex0) {
        if let Some(labels) = self.labels.get_mut(v.slot()) {
            labels.clear();
        }
        for column in self.vertex_values.values_mut() {
            if let Some(values) = column.get_mut(v.slot()) {
                values.clear();
            }
        }
    }

    // --- vertex values ----------------------------------------------------

    pub fn get_vertex_attribute(
        &self,
        name: &str,
        v: Simplex0,
        label: u32,
    ) -> Result<f64, RemeshError> {
        let column = self
            .vertex_values
            .get(name)
            .ok_or_else(|| Self::missing(name, 0))?;
        let idx = self.label_slot(v, label)?;
        Ok(column
            .get(v.slot())
            .and_then(|values| values.get(idx))
            .copied()
            .unwrap_or(0.0))
    }

    pub fn set_vertex_attribute(
        &mut self,
        name: &str,
        v: Simplex0,
        label: u32,
        value: f64,
    ) -> Result<(), RemeshError> {
        if !self.vertex_values.contains_key(name) {
            return Err(Self::missing(name, 0));
        }
        let idx = self.label_slot(v, label)?;
        let n_labels = self.labels[v.slot()].len();
        if let Some(values) = self
            .vertex_values
            .get_mut(name)
            .and_then(|column| column.get_mut(v.slot()))
        {
            if values.len() < n_labels {
                values.resize(n_labels, 0.0);
            }
            values[idx] = value;
        }
        Ok(())
    }

    // --- edge and face values ---------------------------------------------

    pub fn exist_edge_value(&self, name: &str, e: &Simplex1) -> bool {
        self.edge_values.get(name).is_some_and(|m| m.contains_key(e))
    }

    pub fn exist_face_value(&self, name: &str, t: &Simplex2) -> bool {
        self.face_values.get(name).is_some_and(|m| m.contains_key(t))
    }

    pub fn get_edge_attribute(&self, name: &str, e: &Simplex1) -> Result<f64, RemeshError> {
        let values = self
            .edge_values
            .get(name)
            .ok_or_else(|| Self::missing(name, 1))?;
        values
            .get(e)
            .copied()
            .ok_or_else(|| RemeshError::MissingEdgeValue {
                name: name.to_string(),
                simplex: *e,
            })
    }

    pub fn set_edge_attribute(
        &mut self,
        name: &str,
        e: &Simplex1,
        value: f64,
    ) -> Result<(), RemeshError> {
        let values = self
            .edge_values
            .get_mut(name)
            .ok_or_else(|| Self::missing(name, 1))?;
        values.insert(*e, value);
        Ok(())
    }

    pub fn get_face_attribute(&self, name: &str, t: &Simplex2) -> Result<f64, RemeshError> {
        let values = self
            .face_values
            .get(name)
            .ok_or_else(|| Self::missing(name, 2))?;
        values
            .get(t)
            .copied()
            .ok_or_else(|| RemeshError::MissingFaceValue {
                name: name.to_string(),
                simplex: *t,
            })
    }

    pub fn set_face_attribute(
        &mut self,
        name: &str,
        t: &Simplex2,
        value: f64,
    ) -> Result<(), RemeshError> {
        let values = self
            .face_values
            .get_mut(name)
            .ok_or_else(|| Self::missing(name, 2))?;
        values.insert(*t, value);
        Ok(())
    }

    // --- target positions -------------------------------------------------

    pub fn has_target(&self) -> bool {
        self.exist_attribute(TARGET_X, 0) && self.exist_attribute(TARGET_Y, 0)
    }

    /// Target position of `v` in phase `label`.
    ///
    /// Falls back to the current position, with a warning, when no target
    /// was ever set or `v` does not carry `label`.
    pub fn get_target_value(&self, v: Simplex0, label: u32) -> Vec2 {
        if !self.has_target() {
            log::warn!("target vector was not defined; using current value of vertex {v}");
            return self.get_current_value(v);
        }
        match (
            self.get_vertex_attribute(TARGET_X, v, label),
            self.get_vertex_attribute(TARGET_Y, v, label),
        ) {
            (Ok(x), Ok(y)) => Vec2::new(x, y),
            _ => {
                log::warn!("label {label} not found at vertex {v}; using current value");
                self.get_current_value(v)
            }
        }
    }

    /// Sets the target of `v` in phase `label`, creating the target attributes if needed.
    pub fn set_target_value(&mut self, v: Simplex0, label: u32, p: Vec2) -> Result<(), RemeshError> {
        if !self.exist_attribute(TARGET_X, 0) {
            self.create_attribute(TARGET_X, 0)?;
        }
        if !self.exist_attribute(TARGET_Y, 0) {
            self.create_attribute(TARGET_Y, 0)?;
        }
        self.set_vertex_attribute(TARGET_X, v, label, p.x)?;
        self.set_vertex_attribute(TARGET_Y, v, label, p.y)
    }

    // --- lifecycle --------------------------------------------------------

    /// Prepares slots for the simplices of `set` that are about to enter the mesh.
    pub fn insert(&mut self, set: &SimplexSet) {
        for v in set.vertices() {
            if v.is_null() {
                continue;
            }
            self.ensure_slot(*v);
            if self.labels[v.slot()].is_empty() {
                self.clear_simplex0_labels(*v);
            }
        }
    }

    /// Drops every value held by the simplices of `set`.
    pub fn remove(&mut self, set: &SimplexSet) {
        for v in set.vertices() {
            self.clear_simplex0_labels(*v);
        }
        for values in self.edge_values.values_mut() {
            for e in set.edges() {
                values.remove(e);
            }
        }
        for values in self.face_values.values_mut() {
            for t in set.triangles() {
                values.remove(t);
            }
        }
    }

    /// Drops every vertex slot, label and value while keeping attribute names.
    pub fn clear_values(&mut self) {
        self.current.clear();
        self.labels.clear();
        for column in self.vertex_values.values_mut() {
            column.clear();
        }
        for values in self.edge_values.values_mut() {
            values.clear();
        }
        for values in self.face_values.values_mut() {
            values.clear();
        }
    }

    // --- copying between stores ------------------------------------------

    /// Resets this store's attributes to the names registered in `from`.
    pub fn copy_attribute_names(&mut self, from: &Attributes) {
        self.vertex_names.clear();
        self.vertex_values.clear();
        self.edge_names.clear();
        self.edge_values.clear();
        self.face_names.clear();
        self.face_values.clear();
        for dim in 0..=2u8 {
            for name in from.attribute_names(dim) {
                // names are unique per dimension in `from`
                let _ = self.create_attribute(name, dim);
            }
        }
    }

    /// Copies position, labels and vertex values of `from_v` in `from` to `to`.
    pub fn copy_vertex_values(&mut self, to: Simplex0, from_v: Simplex0, from: &Attributes) {
        self.set_current_value(to, from.get_current_value(from_v));
        self.clear_simplex0_labels(to);
        for &label in from.get_simplex0_labels(from_v) {
            self.add_simplex0_label(to, label);
            for name in from.attribute_names(0) {
                if let Ok(value) = from.get_vertex_attribute(name, from_v, label) {
                    // absent names in this store are skipped
                    let _ = self.set_vertex_attribute(name, to, label, value);
                }
            }
        }
    }

    /// Copies every edge value `from` holds for `from_e` onto `to`.
    pub fn copy_edge_values(&mut self, to: &Simplex1, from_e: &Simplex1, from: &Attributes) {
        for name in from.attribute_names(1) {
            if let Ok(value) = from.get_edge_attribute(name, from_e) {
                let _ = self.set_edge_attribute(name, to, value);
            }
        }
    }

    /// Copies every face value `from` holds for `from_t` onto `to`.
    pub fn copy_face_values(&mut self, to: &Simplex2, from_t: &Simplex2, from: &Attributes) {
        for name in from.attribute_names(2) {
            if let Ok(value) = from.get_face_attribute(name, from_t) {
                let _ = self.set_face_attribute(name, to, value);
            }
        }
    }
}
