//! Remeshing parameters.
//!
//! Numeric knobs are looked up by `(operation name, phase label)`. An
//! operation that was never configured for a label reads as the default
//! [`OperationSettings`], so a partially filled table is always usable.
//! Module-wide iteration caps (`"algorithm"`, `"scheduler"`) are stored under
//! label 0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mesh_error::RemeshError;

/// Numeric settings of one operation in one phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationSettings {
    pub max_iterations: u32,
    pub strength: f64,
    /// Degrees.
    pub angle_threshold: f64,
    pub area_threshold: f64,
    pub distance_threshold: f64,
    pub lower_threshold: f64,
    pub upper_threshold: f64,
}

impl Default for OperationSettings {
    fn default() -> Self {
        DEFAULT_SETTINGS
    }
}

/// Global flags plus the per-operation, per-label settings table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Labels found in input meshes, paired index-wise with `labels`.
    pub input_labels: Vec<u32>,
    /// Labels the engine works with.
    pub labels: Vec<u32>,
    pub ambient_label: u32,
    pub number_of_subdomains: usize,
    /// Scale the input into the unit box on initialisation.
    pub make_unit: bool,
    pub profiling: bool,
    pub verbose: bool,
    /// Suppress per-subdomain progress logging from worker threads.
    pub silent_threads: bool,
    pub use_ambient: bool,
    /// Only interface vertices move towards their targets.
    pub use_only_interface: bool,
    pub use_manifold: bool,
    pub no_ears: bool,
    pub use_simple_boundary: bool,
    pub no_multiple_vertices: bool,
    pub use_sparse_edge_attributes: bool,
    pub multiple_vertices_threshold: f64,
    /// Operation name → edge/face attribute overriding the lower threshold.
    pub lower_threshold_attribute: BTreeMap<String, String>,
    /// Operation name → edge/face attribute overriding the upper threshold.
    pub upper_threshold_attribute: BTreeMap<String, String>,
    pub operations: BTreeMap<String, BTreeMap<u32, OperationSettings>>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            input_labels: Vec::new(),
            labels: Vec::new(),
            ambient_label: 0,
            number_of_subdomains: 1,
            make_unit: false,
            profiling: false,
            verbose: false,
            silent_threads: true,
            use_ambient: true,
            use_only_interface: true,
            use_manifold: true,
            no_ears: false,
            use_simple_boundary: true,
            no_multiple_vertices: true,
            use_sparse_edge_attributes: false,
            multiple_vertices_threshold: 1e-4,
            lower_threshold_attribute: BTreeMap::new(),
            upper_threshold_attribute: BTreeMap::new(),
            operations: BTreeMap::new(),
        }
    }
}

const DEFAULT_SETTINGS: OperationSettings = OperationSettings {
    max_iterations: 0,
    strength: 0.0,
    angle_threshold: 180.0,
    area_threshold: 0.0,
    distance_threshold: 0.0,
    lower_threshold: 0.0,
    upper_threshold: 0.0,
};

impl Parameters {
    /// Settings of `operation` for `label`, or the defaults.
    pub fn settings(&self, operation: &str, label: u32) -> &OperationSettings {
        self.operations
            .get(operation)
            .and_then(|by_label| by_label.get(&label))
            .unwrap_or(&DEFAULT_SETTINGS)
    }

    /// Mutable settings of `operation` for `label`, created on first use.
    pub fn settings_mut(&mut self, operation: &str, label: u32) -> &mut OperationSettings {
        self.operations
            .entry(operation.to_string())
            .or_default()
            .entry(label)
            .or_default()
    }

    /// Names of all configured operations.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.operations.keys().map(String::as_str)
    }

    /// Module-wide iteration cap (`"algorithm"`, `"scheduler"`).
    pub fn max_iterations(&self, module: &str) -> u32 {
        self.settings(module, 0).max_iterations
    }

    pub fn get_max_iterations(&self, operation: &str, label: u32) -> u32 {
        self.settings(operation, label).max_iterations
    }

    pub fn get_strength(&self, operation: &str, label: u32) -> f64 {
        self.settings(operation, label).strength
    }

    pub fn get_angle_threshold(&self, operation: &str, label: u32) -> f64 {
        self.settings(operation, label).angle_threshold
    }

    pub fn get_area_threshold(&self, operation: &str, label: u32) -> f64 {
        self.settings(operation, label).area_threshold
    }

    pub fn get_distance_threshold(&self, operation: &str, label: u32) -> f64 {
        self.settings(operation, label).distance_threshold
    }

    pub fn get_lower_threshold(&self, operation: &str, label: u32) -> f64 {
        self.settings(operation, label).lower_threshold
    }

    pub fn get_upper_threshold(&self, operation: &str, label: u32) -> f64 {
        self.settings(operation, label).upper_threshold
    }

    pub fn set_max_iterations(&mut self, operation: &str, label: u32, value: u32) -> &mut Self {
        self.settings_mut(operation, label).max_iterations = value;
        self
    }

    pub fn set_strength(&mut self, operation: &str, label: u32, value: f64) -> &mut Self {
        self.settings_mut(operation, label).strength = value;
        self
    }

    pub fn set_angle_threshold(&mut self, operation: &str, label: u32, value: f64) -> &mut Self {
        self.settings_mut(operation, label).angle_threshold = value;
        self
    }

    pub fn set_area_threshold(&mut self, operation: &str, label: u32, value: f64) -> &mut Self {
        self.settings_mut(operation, label).area_threshold = value;
        self
    }

    pub fn set_distance_threshold(&mut self, operation: &str, label: u32, value: f64) -> &mut Self {
        self.settings_mut(operation, label).distance_threshold = value;
        self
    }

    pub fn set_lower_threshold(&mut self, operation: &str, label: u32, value: f64) -> &mut Self {
        self.settings_mut(operation, label).lower_threshold = value;
        self
    }

    pub fn set_upper_threshold(&mut self, operation: &str, label: u32, value: f64) -> &mut Self {
        self.settings_mut(operation, label).upper_threshold = value;
        self
    }

    pub fn lower_threshold_attribute(&self, operation: &str) -> Option<&str> {
        self.lower_threshold_attribute.get(operation).map(String::as_str)
    }

    pub fn upper_threshold_attribute(&self, operation: &str) -> Option<&str> {
        self.upper_threshold_attribute.get(operation).map(String::as_str)
    }

    pub fn set_lower_threshold_attribute(&mut self, operation: &str, attribute: &str) -> &mut Self {
        self.lower_threshold_attribute
            .insert(operation.to_string(), attribute.to_string());
        self
    }

    pub fn set_upper_threshold_attribute(&mut self, operation: &str, attribute: &str) -> &mut Self {
        self.upper_threshold_attribute
            .insert(operation.to_string(), attribute.to_string());
        self
    }

    /// Registers an input label and the engine label it maps to.
    pub fn add_label_pair(&mut self, input_label: u32, label: u32) -> &mut Self {
        self.input_labels.push(input_label);
        self.labels.push(label);
        self
    }

    /// Rejects inconsistent configurations.
    pub fn validate(&self) -> Result<(), RemeshError> {
        if self.input_labels.len() != self.labels.len() {
            return Err(RemeshError::InvalidParameters(format!(
                "input_labels has {} entries but labels has {}",
                self.input_labels.len(),
                self.labels.len()
            )));
        }
        if self.use_ambient && self.get_max_iterations("move", self.ambient_label) > 0 {
            return Err(RemeshError::InvalidParameters(
                "the ambient phase cannot be moved; set move max_iterations to 0 for it".into(),
            ));
        }
        if self.multiple_vertices_threshold < 0.0 {
            return Err(RemeshError::InvalidParameters(
                "multiple_vertices_threshold must be non-negative".into(),
            ));
        }
        if self.number_of_subdomains == 0 {
            return Err(RemeshError::InvalidParameters(
                "number_of_subdomains must be at least 1".into(),
            ));
        }
        for (operation, by_label) in &self.operations {
            for (label, s) in by_label {
                let negative = [
                    s.strength,
                    s.area_threshold,
                    s.distance_threshold,
                    s.lower_threshold,
                    s.upper_threshold,
                ]
                .iter()
                .any(|&x| x < 0.0);
                if negative {
                    return Err(RemeshError::InvalidParameters(format!(
                        "negative setting for operation `{operation}` in phase {label}"
                    )));
                }
            }
        }
        Ok(())
    }
}
