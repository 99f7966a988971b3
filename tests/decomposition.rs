use grit_remesh::geometry::checks::is_manifold;
use grit_remesh::geometry::primitives::signed_triangle_area;
use grit_remesh::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// `nx` x `ny` jittered grid; the left half is phase 1, the right half phase 2.
fn grid(nx: u64, ny: u64, seed: u64) -> (TriangleMesh, Attributes) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let w = nx + 1;
    let mut points = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            let mut p = Vec2::new(i as f64, j as f64);
            if i > 0 && i < nx && j > 0 && j < ny {
                p.x += rng.gen_range(-0.1..0.1);
                p.y += rng.gen_range(-0.1..0.1);
            }
            points.push(p);
        }
    }
    let mut triangles = Vec::new();
    let mut labels = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            let a = j * w + i;
            triangles.push([a, a + 1, a + w + 1]);
            triangles.push([a, a + w + 1, a + w]);
            let l = if 2 * i < nx { 1 } else { 2 };
            labels.extend([l, l]);
        }
    }
    let mesh = TriangleMesh::from_triangles(points.len(), &triangles, &labels).unwrap();
    let mut attrs = Attributes::with_positions(points);
    attrs.create_attribute("temperature", 0).unwrap();
    attrs.create_attribute("flux", 1).unwrap();
    for (t, l) in mesh.triangles() {
        for v in t.vertices() {
            attrs.add_simplex0_label(v, l);
            let x = attrs.get_current_value(v).x;
            attrs.set_vertex_attribute("temperature", v, l, x * l as f64).unwrap();
        }
    }
    for e in mesh.edges().copied().collect::<Vec<_>>() {
        let len = (attrs.get_current_value(e.v0()) - attrs.get_current_value(e.v1())).length();
        attrs.set_edge_attribute("flux", &e, len).unwrap();
    }
    (mesh, attrs)
}

fn sorted_labels(mesh: &TriangleMesh) -> Vec<u32> {
    let mut labels: Vec<u32> = mesh.triangles().map(|(_, l)| l).collect();
    labels.sort_unstable();
    labels
}

#[test]
fn create_then_merge_reproduces_the_mesh() {
    let (mesh, attrs) = grid(9, 4, 3);
    let p = Parameters {
        number_of_subdomains: 3,
        ..Parameters::default()
    };
    let mut slabs = SlabDecomposition::new();
    // whole slabs, then half-shifted slabs
    for _ in 0..2 {
        let domains = slabs.create_subdomains(&p, &mesh, &attrs).unwrap();
        assert_eq!(domains.len(), 3);

        let (mut merged, mut merged_attrs) = (mesh.clone(), attrs.clone());
        slabs
            .merge_subdomains(&domains, &p, &mut merged, &mut merged_attrs)
            .unwrap();
        assert_eq!(merged.triangle_count(), mesh.triangle_count());
        assert_eq!(merged.vertex_count(), mesh.vertex_count());
        assert_eq!(merged.edge_count(), mesh.edge_count());
        assert_eq!(sorted_labels(&merged), sorted_labels(&mesh));
        assert!(is_manifold(&merged));

        for vtx in merged.vertices() {
            let x = merged_attrs.get_current_value(vtx).x;
            for &l in merged_attrs.get_simplex0_labels(vtx) {
                let t = merged_attrs.get_vertex_attribute("temperature", vtx, l).unwrap();
                assert!((t - x * l as f64).abs() < 1e-12);
            }
        }
        for e in merged.edges() {
            let len =
                (merged_attrs.get_current_value(e.v0()) - merged_attrs.get_current_value(e.v1())).length();
            assert!((merged_attrs.get_edge_attribute("flux", e).unwrap() - len).abs() < 1e-12);
        }
    }
}

#[test]
fn seam_vertices_are_frozen_in_subdomains() {
    let (mesh, attrs) = grid(8, 2, 11);
    let p = Parameters {
        number_of_subdomains: 2,
        ..Parameters::default()
    };
    let mut slabs = SlabDecomposition::new();
    let domains = slabs.create_subdomains(&p, &mesh, &attrs).unwrap();
    let seams: usize = domains
        .subdomains()
        .iter()
        .map(|s| {
            s.mesh
                .vertices()
                .filter(|&v| s.mesh.is_submesh_boundary_vertex(v))
                .count()
        })
        .sum();
    // one column of three vertices, seen from both sides
    assert_eq!(seams, 6);
    // the cut itself is not reported as mesh boundary
    for sub in domains.subdomains() {
        let cut = sub
            .mesh
            .edges()
            .filter(|e| sub.mesh.is_submesh_boundary_edge(e))
            .count();
        assert_eq!(cut, 2);
        assert!(
            sub.mesh
                .edges()
                .filter(|e| sub.mesh.is_submesh_boundary_edge(e))
                .all(|e| !sub.mesh.is_boundary_edge(e))
        );
    }
}

#[test]
fn parallel_refinement_merges_consistently() {
    let (mut mesh, mut attrs) = grid(8, 3, 5);
    let mut p = Parameters::default();
    p.add_label_pair(1, 1).add_label_pair(2, 2);
    p.number_of_subdomains = 2;
    p.set_max_iterations("scheduler", 0, 2);
    for l in [1, 2] {
        p.set_max_iterations("refinement", l, 1)
            .set_lower_threshold("refinement", l, 1.2)
            .set_upper_threshold("refinement", l, 1e9);
    }
    let area = |mesh: &TriangleMesh, attrs: &Attributes| -> f64 {
        mesh.triangles()
            .map(|(t, _)| {
                let [a, b, c] = t.vertices().map(|v| attrs.get_current_value(v));
                signed_triangle_area(a, b, c)
            })
            .sum()
    };
    let before = area(&mesh, &attrs);

    let done = Scheduler::default().run(&mut mesh, &mut attrs, &p).unwrap();
    assert!(done > 0);
    assert!(is_manifold(&mesh));
    assert!((area(&mesh, &attrs) - before).abs() < 1e-9);
    for (t, _) in mesh.triangles() {
        let [a, b, c] = t.vertices().map(|v| attrs.get_current_value(v));
        assert!(signed_triangle_area(a, b, c) > 0.0);
    }
    let labels = sorted_labels(&mesh);
    assert!(labels.iter().all(|&l| l == 1 || l == 2));
}

#[test]
fn idle_scheduler_leaves_the_mesh_alone() {
    let (mut mesh, mut attrs) = grid(6, 2, 1);
    let triangles = mesh.triangle_count();
    let mut p = Parameters::default();
    p.number_of_subdomains = 3;
    p.set_max_iterations("scheduler", 0, 4);
    let mut scheduler = Scheduler::new(EmptyAlgorithm);
    assert_eq!(scheduler.run(&mut mesh, &mut attrs, &p).unwrap(), 0);
    assert_eq!(mesh.triangle_count(), triangles);
    assert_eq!(scheduler.monitor().iterations(), 1);
}
