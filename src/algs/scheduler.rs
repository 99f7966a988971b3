//! Decompose, remesh every subdomain, merge; repeated until the "scheduler"
//! iteration cap is hit or nothing was done.

use log::{info, warn};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::algs::default_algorithm::{Algorithm, DefaultAlgorithm};
use crate::algs::monitor::{CountMonitor, Monitor};
use crate::algs::slab_decomposition::{SlabDecomposition, Subdomain};
use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::mesh_error::RemeshError;
use crate::topology::mesh::TriangleMesh;
use crate::topology::phase::compute_phase_labels;

/// Runs an [`Algorithm`] over slab subdomains, one rayon task per subdomain.
#[derive(Clone, Debug)]
pub struct Scheduler<A: Algorithm = DefaultAlgorithm> {
    monitor: CountMonitor,
    decomposition: SlabDecomposition,
    algorithm: A,
}

impl Default for Scheduler<DefaultAlgorithm> {
    fn default() -> Self {
        Scheduler::new(DefaultAlgorithm::new())
    }
}

fn run_subdomain<A: Algorithm>(algorithm: &A, sub: &mut Subdomain) -> Result<(), RemeshError> {
    if sub.parameters.verbose && !sub.parameters.silent_threads {
        info!("working on subdomain {}", sub.id);
    }
    let labels = compute_phase_labels(&sub.mesh);
    sub.operations_done = algorithm.run(&mut sub.mesh, &mut sub.attributes, &sub.parameters, &labels)?;
    Ok(())
}

impl<A: Algorithm> Scheduler<A> {
    pub fn new(algorithm: A) -> Self {
        Scheduler {
            monitor: CountMonitor::new("scheduler", 0, false),
            decomposition: SlabDecomposition::new(),
            algorithm,
        }
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    pub fn monitor(&self) -> &CountMonitor {
        &self.monitor
    }

    /// Runs the scheduler loop on `mesh`/`attrs` and returns the total
    /// number of operations applied.
    ///
    /// The loop ends when the "scheduler" iteration cap is reached or no
    /// round has applied anything yet.
    pub fn run(
        &mut self,
        mesh: &mut TriangleMesh,
        attrs: &mut Attributes,
        parameters: &Parameters,
    ) -> Result<usize, RemeshError> {
        self.monitor.reset();
        self.monitor.set_name("scheduler");
        self.monitor.init(parameters);

        if parameters.max_iterations("scheduler") < 2 && parameters.number_of_subdomains > 1 {
            warn!("possibly too few scheduler iterations for a multithreaded setup");
        }

        let mut operations_done = 0usize;
        loop {
            let mut domains = self.decomposition.create_subdomains(parameters, mesh, attrs)?;

            #[cfg(feature = "rayon")]
            domains
                .subdomains_mut()
                .par_iter_mut()
                .try_for_each(|sub| run_subdomain(&self.algorithm, sub))?;
            #[cfg(not(feature = "rayon"))]
            domains
                .subdomains_mut()
                .iter_mut()
                .try_for_each(|sub| run_subdomain(&self.algorithm, sub))?;

            operations_done += domains.operations_done();
            if parameters.verbose {
                info!("scheduler: {operations_done} operations done");
            }
            self.decomposition
                .merge_subdomains(&domains, parameters, mesh, attrs)?;
            self.monitor.update(mesh, attrs, parameters)?;

            if !self.monitor.next() || operations_done == 0 {
                break;
            }
        }
        if parameters.verbose {
            info!(
                "scheduler finished after {} iterations on {} subdomains",
                self.monitor.iterations(),
                parameters.number_of_subdomains
            );
        }
        Ok(operations_done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::default_algorithm::EmptyAlgorithm;
    use crate::geometry::primitives::Vec2;

    fn strip(cells: u64) -> (TriangleMesh, Attributes) {
        let w = cells + 1;
        let mut positions = Vec::new();
        for j in 0..2 {
            for i in 0..w {
                positions.push(Vec2::new(i as f64, j as f64));
            }
        }
        let mut tris = Vec::new();
        for i in 0..cells {
            tris.push([i, i + 1, i + w + 1]);
            tris.push([i, i + w + 1, i + w]);
        }
        let labels = vec![1; tris.len()];
        let mesh = TriangleMesh::from_triangles(2 * w as usize, &tris, &labels).unwrap();
        let mut attrs = Attributes::with_positions(positions);
        for v in mesh.vertices().collect::<Vec<_>>() {
            attrs.add_simplex0_label(v, 1);
        }
        (mesh, attrs)
    }

    #[test]
    fn idle_algorithm_stops_after_one_round() {
        let (mut mesh, mut attrs) = strip(4);
        let mut p = Parameters::default();
        p.number_of_subdomains = 2;
        p.set_max_iterations("scheduler", 0, 5);
        let mut scheduler = Scheduler::new(EmptyAlgorithm);
        let done = scheduler.run(&mut mesh, &mut attrs, &p).unwrap();
        assert_eq!(done, 0);
        assert_eq!(scheduler.monitor().iterations(), 1);
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.vertex_count(), 10);
    }

    #[test]
    fn refinement_runs_in_every_subdomain() {
        let (mut mesh, mut attrs) = strip(4);
        let mut p = Parameters::default();
        p.labels = vec![1];
        p.number_of_subdomains = 2;
        p.set_max_iterations("scheduler", 0, 2)
            .set_max_iterations("refinement", 1, 1)
            .set_lower_threshold("refinement", 1, 1.2)
            .set_upper_threshold("refinement", 1, 1e9);
        let done = Scheduler::default().run(&mut mesh, &mut attrs, &p).unwrap();
        assert!(done > 0);
        assert!(mesh.triangle_count() > 8);
    }
}
