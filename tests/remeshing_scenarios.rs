use grit_remesh::geometry::checks::is_manifold;
use grit_remesh::geometry::primitives::signed_triangle_area;
use grit_remesh::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn v(i: u64) -> Simplex0 {
    Simplex0::new(i)
}

fn refinement_batch() -> Batch {
    Batch::new(
        "refinement",
        Predicate::Bool(true),
        MeasureKind::EdgeLength,
        OperationKind::EdgeSplit,
        AttributeAssignment::EdgeSplit,
    )
}

/// `n` x `n` grid on the unit square with interior vertices jittered by a
/// fixed seed; cells whose centre lies within 0.3 of the middle get label 2.
fn jittered_disc(n: u64, seed: u64) -> (Vec<Vec2>, Vec<[u64; 3]>, Vec<u32>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let h = 1.0 / n as f64;
    let w = n + 1;
    let mut points = Vec::new();
    for j in 0..w {
        for i in 0..w {
            let mut p = Vec2::new(i as f64 * h, j as f64 * h);
            if i > 0 && i < n && j > 0 && j < n {
                p.x += rng.gen_range(-0.1..0.1) * h;
                p.y += rng.gen_range(-0.1..0.1) * h;
            }
            points.push(p);
        }
    }
    let mut triangles = Vec::new();
    let mut labels = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let a = j * w + i;
            let centre = Vec2::new((i as f64 + 0.5) * h, (j as f64 + 0.5) * h);
            let label = if (centre - Vec2::new(0.5, 0.5)).length() < 0.3 { 2 } else { 1 };
            triangles.push([a, a + 1, a + w + 1]);
            triangles.push([a, a + w + 1, a + w]);
            labels.extend([label, label]);
        }
    }
    (points, triangles, labels)
}

fn assert_positive(mesh: &TriangleMesh, attrs: &Attributes) {
    for (t, _) in mesh.triangles() {
        let [a, b, c] = t.vertices().map(|v| attrs.get_current_value(v));
        assert!(signed_triangle_area(a, b, c) > 0.0, "inverted triangle {t:?}");
    }
}

#[test]
fn long_edge_is_split_at_its_midpoint() {
    let mut mesh = TriangleMesh::from_triangles(3, &[[0, 1, 2]], &[1]).unwrap();
    let mut attrs = Attributes::with_positions(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(1.0, 0.5),
    ]);
    for i in 0..3 {
        attrs.add_simplex0_label(v(i), 1);
    }
    let mut p = Parameters::default();
    p.add_label_pair(1, 1);
    // only the base (length 2) lies inside the refinement interval
    p.set_max_iterations("refinement", 1, 1)
        .set_lower_threshold("refinement", 1, 1.5)
        .set_upper_threshold("refinement", 1, 1e9);

    let done = refinement_batch().run(&mut mesh, &mut attrs, &p, &[1]).unwrap();
    assert_eq!(done, 1);
    assert_eq!(mesh.triangle_count(), 2);
    assert!(!mesh.is_valid_edge(&Simplex1::new(0, 1)));

    let m = v(3);
    assert!(mesh.is_valid_vertex(m));
    let pm = attrs.get_current_value(m);
    assert!((pm.x - 1.0).abs() < 1e-12 && pm.y.abs() < 1e-12);
    assert_eq!(attrs.get_simplex0_labels(m), &[1]);
    for (t, label) in mesh.triangles() {
        assert!(t.contains(m));
        assert_eq!(label, 1);
    }
    assert_positive(&mesh, &attrs);
}

#[test]
fn engine_refines_through_the_scheduler() {
    let mut p = Parameters::default();
    p.add_label_pair(1, 1);
    p.set_max_iterations("scheduler", 0, 1)
        .set_max_iterations("refinement", 1, 1)
        .set_lower_threshold("refinement", 1, 1.5)
        .set_upper_threshold("refinement", 1, 1e9);
    let points = [Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(1.0, 0.5)];
    let mut engine = Engine2D::init_with_mesh(&points, &[[0, 1, 2]], &[1], &p).unwrap();
    let done = engine.update(&p).unwrap();
    assert_eq!(done, 1);
    assert_eq!(engine.mesh().triangle_count(), 2);
    assert_eq!(engine.mesh().vertex_count(), 4);
}

#[test]
fn batch_stays_at_its_fixed_point() {
    let (points, triangles, labels) = jittered_disc(4, 7);
    let mut p = Parameters::default();
    p.add_label_pair(1, 1).add_label_pair(2, 2);
    for l in [1, 2] {
        p.set_max_iterations("refinement", l, 1)
            .set_lower_threshold("refinement", l, 0.2)
            .set_upper_threshold("refinement", l, 1e9);
    }
    let mut engine = Engine2D::init_with_mesh(&points, &triangles, &labels, &p).unwrap();
    let (mesh, attrs) = engine.parts_mut();

    let batch = refinement_batch();
    let mut rounds = 0;
    while batch.run(mesh, attrs, &p, &[1, 2]).unwrap() > 0 {
        rounds += 1;
        assert!(rounds < 20, "refinement did not converge");
    }
    let count = mesh.triangle_count();
    assert_eq!(batch.run(mesh, attrs, &p, &[1, 2]).unwrap(), 0);
    assert_eq!(mesh.triangle_count(), count);
}

#[test]
fn always_bad_smoothing_reaches_a_fixed_point() {
    // fan of eight triangles around vertex 4, which starts off centre
    let mut tris = Vec::new();
    for j in 0..2u64 {
        for i in 0..2u64 {
            let a = j * 3 + i;
            tris.push([a, a + 1, a + 4]);
            tris.push([a, a + 4, a + 3]);
        }
    }
    let mut mesh = TriangleMesh::from_triangles(9, &tris, &[1; 8]).unwrap();
    let mut points: Vec<Vec2> = (0..9)
        .map(|k| Vec2::new((k % 3) as f64, (k / 3) as f64))
        .collect();
    points[4] = Vec2::new(1.3, 0.8);
    let mut attrs = Attributes::with_positions(points);
    for i in 0..9 {
        attrs.add_simplex0_label(v(i), 1);
    }
    let mut p = Parameters::default();
    p.add_label_pair(1, 1);
    p.set_max_iterations("smoothing", 1, 1)
        .set_strength("smoothing", 1, 1.0);
    let smoothing = Batch::new(
        "smoothing",
        Predicate::Bool(true),
        MeasureKind::AlwaysBad,
        OperationKind::LaplacianSmoothing,
        AttributeAssignment::Empty,
    );

    assert_eq!(smoothing.run(&mut mesh, &mut attrs, &p, &[1]).unwrap(), 1);
    let centre = attrs.get_current_value(v(4));
    assert!((centre - Vec2::new(1.0, 1.0)).length() < 1e-12);

    let mut rounds = 0;
    while smoothing.run(&mut mesh, &mut attrs, &p, &[1]).unwrap() > 0 {
        rounds += 1;
        assert!(rounds < 20, "smoothing did not converge");
    }
    assert_eq!(smoothing.run(&mut mesh, &mut attrs, &p, &[1]).unwrap(), 0);
    assert!((attrs.get_current_value(v(4)) - centre).length() < 1e-12);
    assert_eq!(mesh.triangle_count(), 8);
    assert_positive(&mesh, &attrs);
}

#[test]
fn edge_above_the_upper_threshold_is_left_alone() {
    let mut mesh = TriangleMesh::from_triangles(3, &[[0, 1, 2]], &[1]).unwrap();
    let mut attrs = Attributes::with_positions(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(1.0, 0.5),
    ]);
    for i in 0..3 {
        attrs.add_simplex0_label(v(i), 1);
    }
    let mut p = Parameters::default();
    p.add_label_pair(1, 1);
    // a length-2 edge is outside the open interval (0, 1)
    p.set_max_iterations("refinement", 1, 1)
        .set_lower_threshold("refinement", 1, 0.0)
        .set_upper_threshold("refinement", 1, 1.0);

    let done = refinement_batch().run(&mut mesh, &mut attrs, &p, &[1]).unwrap();
    assert_eq!(done, 0);
    assert_eq!(mesh.triangle_count(), 1);
    assert!(mesh.is_valid_edge(&Simplex1::new(0, 1)));
}

#[test]
fn motion_and_smoothing_never_invert() {
    let (points, triangles, labels) = jittered_disc(8, 42);
    let mut p = Parameters::default();
    p.add_label_pair(1, 1).add_label_pair(2, 2);
    p.set_max_iterations("scheduler", 0, 1)
        .set_max_iterations("algorithm", 0, 8);
    for l in [1, 2] {
        p.set_max_iterations("move", l, 1)
            .set_strength("move", l, 0.5)
            .set_max_iterations("smoothing", l, 1)
            .set_max_iterations("optimization", l, 1)
            .set_max_iterations("interface_smoothing", l, 1)
            .set_angle_threshold("interface_smoothing", l, 170.0);
    }
    let mut engine = Engine2D::init_with_mesh(&points, &triangles, &labels, &p).unwrap();

    // push the disc to the right
    let (mesh, attrs) = engine.parts_mut();
    for vtx in mesh.vertices().collect::<Vec<_>>() {
        let pos = attrs.get_current_value(vtx);
        for label in attrs.get_simplex0_labels(vtx).to_vec() {
            attrs
                .set_target_value(vtx, label, pos + Vec2::new(0.04, 0.0))
                .unwrap();
        }
    }
    let before: f64 = mesh
        .triangles()
        .filter(|(_, l)| *l == 2)
        .map(|(t, _)| {
            let [a, b, c] = t.vertices().map(|v| attrs.get_current_value(v));
            signed_triangle_area(a, b, c)
        })
        .sum();

    engine.update(&p).unwrap();
    let (mesh, attrs) = (engine.mesh(), engine.attributes());
    assert_positive(mesh, attrs);
    assert!(is_manifold(mesh));
    let after: f64 = mesh
        .triangles()
        .filter(|(_, l)| *l == 2)
        .map(|(t, _)| {
            let [a, b, c] = t.vertices().map(|v| attrs.get_current_value(v));
            signed_triangle_area(a, b, c)
        })
        .sum();
    assert!(after > 0.0 && (after - before).abs() < 0.5 * before);
}
