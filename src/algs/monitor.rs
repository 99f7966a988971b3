//! Monitors decide when an iterative stage stops.
//!
//! [`CountMonitor`] caps a loop by an iteration count read from
//! [`Parameters::max_iterations`]. [`MoveMonitor`] drives vertex motion
//! towards target positions in CFL-limited substeps: every substep advances
//! at most to the earliest time any triangle would collapse, scaled by the
//! "move" strength.

use log::{debug, info};

use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::geometry::primitives::{Vec2, collapse_time};
use crate::mesh_error::RemeshError;
use crate::operations::mesh_ops::{SUBSTEP_TARGET_X, SUBSTEP_TARGET_Y};
use crate::topology::mesh::{InterfaceMesh, TriangleMesh};
use crate::topology::simplex::Simplex0;

pub const VELOCITY_X: &str = "__velocity_x";
pub const VELOCITY_Y: &str = "__velocity_y";

/// Loop controller shared by the algorithm and the scheduler.
pub trait Monitor {
    fn name(&self) -> &str;

    /// True while another iteration should run.
    fn next(&self) -> bool;

    fn reset(&mut self);

    /// Reads limits from `parameters`.
    fn init(&mut self, parameters: &Parameters);

    /// Records one finished iteration.
    fn update(
        &mut self,
        mesh: &TriangleMesh,
        attrs: &mut Attributes,
        parameters: &Parameters,
    ) -> Result<(), RemeshError>;
}

/// Stops after `max_iterations` updates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountMonitor {
    name: String,
    max_iterations: u32,
    iterations: u32,
    verbose: bool,
}

impl CountMonitor {
    pub fn new(name: impl Into<String>, max_iterations: u32, verbose: bool) -> Self {
        CountMonitor {
            name: name.into(),
            max_iterations,
            iterations: 0,
            verbose,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Counts one iteration without touching mesh state.
    pub fn tick(&mut self) {
        self.iterations += 1;
    }
}

impl Monitor for CountMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn next(&self) -> bool {
        if self.iterations >= self.max_iterations {
            if self.verbose {
                info!("max iterations reached for {}", self.name);
            }
            return false;
        }
        true
    }

    fn reset(&mut self) {
        self.iterations = 0;
    }

    fn init(&mut self, parameters: &Parameters) {
        self.max_iterations = parameters.max_iterations(&self.name);
        self.verbose = parameters.verbose;
    }

    fn update(
        &mut self,
        _mesh: &TriangleMesh,
        _attrs: &mut Attributes,
        _parameters: &Parameters,
    ) -> Result<(), RemeshError> {
        self.tick();
        Ok(())
    }
}

/// Substep controller for motion towards `__target_x/__target_y`.
///
/// Velocities are `target - position` per vertex and label, so a full pass
/// spans unit time; `progress` is the fraction already covered.
#[derive(Clone, Debug)]
pub struct MoveMonitor {
    progress: f64,
    strength: f64,
    distance_threshold: f64,
    counter: CountMonitor,
}

fn is_nonambient(parameters: &Parameters, label: u32) -> bool {
    !parameters.use_ambient || label != parameters.ambient_label
}

fn is_movable(mesh: &TriangleMesh, v: Simplex0, parameters: &Parameters) -> bool {
    !mesh.is_boundary_vertex(v)
        && !mesh.is_submesh_boundary_vertex(v)
        && (mesh.is_interface_vertex(v) || !parameters.use_only_interface)
}

impl MoveMonitor {
    /// Reads the "move" settings and, when targets exist, seeds velocities
    /// and substep targets for every vertex and non-ambient label.
    pub fn new(
        mesh: &TriangleMesh,
        attrs: &mut Attributes,
        parameters: &Parameters,
    ) -> Result<Self, RemeshError> {
        let (mut strength, mut distance_threshold) = (0.0, 0.0);
        // the last non-ambient label wins
        for &label in parameters.labels.iter().filter(|&&l| is_nonambient(parameters, l)) {
            strength = parameters.get_strength("move", label);
            distance_threshold = parameters.get_distance_threshold("move", label);
        }
        let monitor = MoveMonitor {
            progress: 0.0,
            strength,
            distance_threshold,
            counter: CountMonitor::new(
                "",
                parameters.max_iterations("algorithm"),
                parameters.verbose,
            ),
        };
        if !attrs.has_target() {
            return Ok(monitor);
        }

        for name in [VELOCITY_X, VELOCITY_Y, SUBSTEP_TARGET_X, SUBSTEP_TARGET_Y] {
            if !attrs.exist_attribute(name, 0) {
                attrs.create_attribute(name, 0)?;
            }
        }
        for v in mesh.vertices() {
            let movable = is_movable(mesh, v, parameters);
            let p = attrs.get_current_value(v);
            let labels = attrs.get_simplex0_labels(v).to_vec();
            for label in labels.into_iter().filter(|&l| is_nonambient(parameters, l)) {
                attrs.set_vertex_attribute(SUBSTEP_TARGET_X, v, label, p.x)?;
                attrs.set_vertex_attribute(SUBSTEP_TARGET_Y, v, label, p.y)?;
                let mut u = if movable {
                    attrs.get_target_value(v, label) - p
                } else {
                    Vec2::ZERO
                };
                if !u.x.is_finite() {
                    u.x = 0.0;
                }
                if !u.y.is_finite() {
                    u.y = 0.0;
                }
                attrs.set_vertex_attribute(VELOCITY_X, v, label, u.x)?;
                attrs.set_vertex_attribute(VELOCITY_Y, v, label, u.y)?;
            }
        }
        Ok(monitor)
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Velocity of `v`, taken from the last non-ambient label it carries.
    fn velocity(
        &self,
        v: Simplex0,
        attrs: &Attributes,
        parameters: &Parameters,
    ) -> Result<Vec2, RemeshError> {
        let mut u = Vec2::ZERO;
        for &label in attrs.get_simplex0_labels(v) {
            if is_nonambient(parameters, label) {
                u = Vec2::new(
                    attrs.get_vertex_attribute(VELOCITY_X, v, label)?,
                    attrs.get_vertex_attribute(VELOCITY_Y, v, label)?,
                );
            }
        }
        Ok(u)
    }

    /// Earliest positive collapse time over all triangles, capped at one
    /// and otherwise scaled by the strength.
    fn first_collapse_time(
        &self,
        mesh: &TriangleMesh,
        attrs: &Attributes,
        parameters: &Parameters,
    ) -> Result<f64, RemeshError> {
        let mut first = f64::INFINITY;
        for (t, _) in mesh.triangles() {
            let [a, b, c] = t.vertices();
            let t = collapse_time(
                attrs.get_current_value(a),
                attrs.get_current_value(b),
                attrs.get_current_value(c),
                self.velocity(a, attrs, parameters)?,
                self.velocity(b, attrs, parameters)?,
                self.velocity(c, attrs, parameters)?,
            );
            if t > 0.0 && t < first {
                first = t;
            }
        }
        Ok(if first > 1.0 { 1.0 } else { first * self.strength })
    }
}

impl Monitor for MoveMonitor {
    fn name(&self) -> &str {
        "move"
    }

    fn next(&self) -> bool {
        self.counter.next() && self.progress < 1.0 - self.distance_threshold
    }

    fn reset(&mut self) {
        self.progress = 0.0;
        self.counter.reset();
    }

    fn init(&mut self, _parameters: &Parameters) {
        self.reset();
    }

    /// Computes the next substep and writes per-label substep targets.
    fn update(
        &mut self,
        mesh: &TriangleMesh,
        attrs: &mut Attributes,
        parameters: &Parameters,
    ) -> Result<(), RemeshError> {
        if !attrs.has_target() {
            self.progress = 1.0;
            return Ok(());
        }
        let first = self.first_collapse_time(mesh, attrs, parameters)?;
        let chatty = parameters.verbose && !parameters.silent_threads;
        if chatty {
            debug!("earliest collapse time {first}");
        }

        let dt = (1.0 - self.progress).min(first);
        for v in mesh.vertices() {
            let movable = is_movable(mesh, v, parameters);
            let p = attrs.get_current_value(v);
            let labels = attrs.get_simplex0_labels(v).to_vec();
            for label in labels.into_iter().filter(|&l| is_nonambient(parameters, l)) {
                let target = if movable {
                    let u = Vec2::new(
                        attrs.get_vertex_attribute(VELOCITY_X, v, label)?,
                        attrs.get_vertex_attribute(VELOCITY_Y, v, label)?,
                    );
                    p + u * dt
                } else {
                    p
                };
                attrs.set_vertex_attribute(SUBSTEP_TARGET_X, v, label, target.x)?;
                attrs.set_vertex_attribute(SUBSTEP_TARGET_Y, v, label, target.y)?;
            }
        }

        self.progress += first;
        if chatty {
            debug!("move progress {}", self.progress);
        }
        self.counter.tick();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_monitor_stops_at_cap() {
        let mut p = Parameters::default();
        p.set_max_iterations("scheduler", 0, 2);
        let mut m = CountMonitor::new("scheduler", 0, false);
        m.init(&p);
        let mesh = TriangleMesh::new();
        let mut attrs = Attributes::new();
        assert!(m.next());
        m.update(&mesh, &mut attrs, &p).unwrap();
        assert!(m.next());
        m.update(&mesh, &mut attrs, &p).unwrap();
        assert!(!m.next());
        m.reset();
        assert!(m.next());
    }

    fn moving_square() -> (TriangleMesh, Attributes, Parameters) {
        // two phases; the interface 0-2 moves right by 0.2
        let mesh = TriangleMesh::from_triangles(4, &[[0, 1, 2], [0, 2, 3]], &[1, 2]).unwrap();
        let mut attrs = Attributes::with_positions(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        for (v, labels) in [(0u64, vec![1, 2]), (1, vec![1]), (2, vec![1, 2]), (3, vec![2])] {
            for l in labels {
                let v = Simplex0::new(v);
                attrs.add_simplex0_label(v, l);
                let p = attrs.get_current_value(v);
                attrs.set_target_value(v, l, p + Vec2::new(0.2, 0.0)).unwrap();
            }
        }
        let mut p = Parameters::default();
        p.labels = vec![1, 2];
        p.use_only_interface = false;
        p.set_max_iterations("algorithm", 0, 10)
            .set_strength("move", 2, 0.5);
        (mesh, attrs, p)
    }

    #[test]
    fn without_targets_one_update_finishes() {
        let mesh = TriangleMesh::from_triangles(3, &[[0, 1, 2]], &[1]).unwrap();
        let mut attrs = Attributes::with_positions(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ]);
        let mut p = Parameters::default();
        p.set_max_iterations("algorithm", 0, 5);
        let mut m = MoveMonitor::new(&mesh, &mut attrs, &p).unwrap();
        assert!(m.next());
        m.update(&mesh, &mut attrs, &p).unwrap();
        assert!(!m.next());
    }

    #[test]
    fn boundary_vertices_do_not_move() {
        let (mesh, mut attrs, p) = moving_square();
        let mut m = MoveMonitor::new(&mesh, &mut attrs, &p).unwrap();
        // every vertex lies on the outer boundary, so nothing is movable
        let v = Simplex0::new(0);
        assert_eq!(attrs.get_vertex_attribute(VELOCITY_X, v, 1).unwrap(), 0.0);
        m.update(&mesh, &mut attrs, &p).unwrap();
        assert_eq!(m.progress(), 1.0);
        assert!(!m.next());
        assert_eq!(attrs.get_vertex_attribute(SUBSTEP_TARGET_X, v, 1).unwrap(), 0.0);
    }

    #[test]
    fn interior_vertex_gets_substep_target() {
        let mesh = TriangleMesh::from_triangles(
            5,
            &[[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
            &[1, 1, 1, 1],
        )
        .unwrap();
        let mut attrs = Attributes::with_positions(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.5, 0.5),
        ]);
        for v in 0..5 {
            attrs.add_simplex0_label(Simplex0::new(v), 1);
        }
        let center = Simplex0::new(4);
        attrs.set_target_value(center, 1, Vec2::new(0.75, 0.5)).unwrap();
        let mut p = Parameters::default();
        p.labels = vec![1];
        p.use_only_interface = false;
        p.set_max_iterations("algorithm", 0, 10)
            .set_strength("move", 1, 0.5);

        let mut m = MoveMonitor::new(&mesh, &mut attrs, &p).unwrap();
        assert_eq!(attrs.get_vertex_attribute(VELOCITY_X, center, 1).unwrap(), 0.25);
        // the fan collapses at t = 2, so the whole remaining step is taken
        m.update(&mesh, &mut attrs, &p).unwrap();
        assert_eq!(m.progress(), 1.0);
        assert_eq!(attrs.get_vertex_attribute(SUBSTEP_TARGET_X, center, 1).unwrap(), 0.75);
        assert_eq!(attrs.get_vertex_attribute(SUBSTEP_TARGET_Y, center, 1).unwrap(), 0.5);
    }
}
