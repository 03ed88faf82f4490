use std::sync::Arc;

use ridge_geom::Vec3;
use ridge_world::{InlineSource, Section, SectionOrigin, SectionStore, TerrainConfig};

fn small_config(seed: u64) -> TerrainConfig {
    TerrainConfig {
        seed,
        section_size: 8,
        samples_per_unit: 2,
        mountain_count: 20,
        ..TerrainConfig::default()
    }
}

fn store(cfg: TerrainConfig) -> SectionStore<InlineSource> {
    SectionStore::inline(Arc::new(cfg))
}

#[test]
fn first_query_places_tile_and_neighbors() {
    // Reference dimensions: 40 unit tiles sampled 5 times per unit
    let mut terrain = store(TerrainConfig::default());
    assert!(terrain.is_empty());

    let h = terrain.height(0.0, 0.0);
    assert!(h.is_finite());
    assert_eq!(terrain.len(), 9);
    for dx in -1..=1 {
        for dz in -1..=1 {
            assert!(terrain.find(SectionOrigin::new(dx * 40, dz * 40)).is_some());
        }
    }
    let stats = terrain.stats();
    assert_eq!(stats.sections, 9);
    assert_eq!(stats.ready, 1);

    assert_eq!(terrain.height(0.0, 0.0).to_bits(), h.to_bits());
    assert_eq!(terrain.len(), 9);

    let a = terrain.height(39.9, 0.0);
    let b = terrain.height(40.1, 0.0);
    assert!(a.is_finite() && b.is_finite());
    let n = terrain.normal(40.0, 0.0);
    // n = (-2h*dy, 4h^2, -2h*dz), so |n.x / n.y| is the x slope
    let slope = (n.x / n.y).abs();
    assert!(
        (a - b).abs() <= 0.2 * slope.max(1.0) + 0.05,
        "height jump across border: {a} vs {b} (slope {slope})"
    );
}

#[test]
fn no_seam_along_dense_line_across_border() {
    let mut terrain = store(small_config(5));
    let border = 8.0;
    let step = 0.05;
    for &z in &[-3.3f32, 0.0, 2.75, 7.9] {
        let xs: Vec<f32> = (0..=80).map(|i| border - 2.0 + i as f32 * step).collect();
        let hs: Vec<f32> = xs.iter().map(|&x| terrain.height(x, z)).collect();
        let mut crossing = 0.0f32;
        let mut inside = 0.0f32;
        for i in 0..xs.len() - 1 {
            let d = (hs[i + 1] - hs[i]).abs();
            if xs[i] < border && xs[i + 1] >= border {
                crossing = crossing.max(d);
            } else {
                inside = inside.max(d);
            }
        }
        assert!(
            crossing <= 2.0 * inside + 0.01,
            "seam at z={z}: crossing step {crossing}, largest interior step {inside}"
        );
    }
}

#[test]
fn grid_nodes_are_returned_exactly() {
    let mut terrain = store(TerrainConfig::default());
    let origin = SectionOrigin::new(-40, 0);
    let samples: Vec<(f32, f32, usize, usize)> = vec![
        (-40.0, 0.0, 0, 0),
        (-37.0, 12.0, 15, 60),
        (-1.0, 39.0, 195, 195),
        (-20.0, 20.0, 100, 100),
    ];
    let heights: Vec<f32> = samples
        .iter()
        .map(|&(x, z, _, _)| terrain.height(x, z))
        .collect();
    let view = terrain.view(origin);
    for (&(_, _, ix, iz), h) in samples.iter().zip(heights) {
        assert_eq!(h.to_bits(), view.height_at(ix, iz).to_bits());
    }
}

#[test]
fn far_edge_of_a_tile_matches_next_tile_start() {
    let mut terrain = store(small_config(1));
    terrain.height(0.0, 0.0);
    terrain.height(8.0, 0.0);
    let left = terrain.try_view(SectionOrigin::new(0, 0)).unwrap();
    let right = terrain.try_view(SectionOrigin::new(8, 0)).unwrap();
    let side = left.samples_per_side();
    for iz in 0..side {
        let a = left.height_at(side - 1, iz);
        let b = right.height_at(0, iz);
        assert!((a - b).abs() < 0.05, "edge mismatch at iz={iz}: {a} vs {b}");
    }
}

#[test]
fn queries_are_idempotent() {
    let mut terrain = store(small_config(2));
    let points = [(0.3f32, 0.7f32), (-12.25, 3.5), (100.0, -42.0), (7.99, 8.01)];
    let first: Vec<(f32, Vec3)> = points
        .iter()
        .map(|&(x, z)| (terrain.height(x, z), terrain.normal(x, z)))
        .collect();
    let placed = terrain.len();
    let second: Vec<(f32, Vec3)> = points
        .iter()
        .map(|&(x, z)| (terrain.height(x, z), terrain.normal(x, z)))
        .collect();
    assert_eq!(first, second);
    assert_eq!(terrain.len(), placed);
}

#[test]
fn normal_points_up_and_rotation_follows_it() {
    let mut terrain = store(small_config(3));
    let step = terrain.config().normal_step;
    for &(x, z) in &[(1.0f32, 1.0f32), (-5.5, 9.25), (30.0, -30.0)] {
        let n = terrain.normal(x, z);
        assert!(n.is_finite());
        assert!((n.y - 4.0 * step * step).abs() < 1e-6);
        let up = terrain.rotation(x, z) * Vec3::UP;
        let expect = n.normalized();
        assert!((up - expect).length() < 1e-4);
    }
}

#[test]
fn same_seed_same_terrain() {
    let mut a = store(small_config(42));
    let mut b = store(small_config(42));
    let mut c = store(small_config(43));
    let mut differs = false;
    for i in 0..40 {
        let x = i as f32 * 1.7 - 30.0;
        let z = i as f32 * -0.9 + 11.0;
        let ha = a.height(x, z);
        assert_eq!(ha.to_bits(), b.height(x, z).to_bits());
        differs |= ha != c.height(x, z);
    }
    assert!(differs);
}

#[test]
fn section_generation_is_deterministic_per_stream() {
    let cfg = small_config(77);
    let s1 = Section::generate(&cfg, 12);
    let s2 = Section::generate(&cfg, 12);
    let s3 = Section::generate(&cfg, 13);
    assert_eq!(s1.mountains(), s2.mountains());
    assert_eq!(s1.raw(), s2.raw());
    assert_ne!(s1.mountains(), s3.mountains());
    assert!(!s1.is_ready());
    assert!(s1.origin().is_none());
    assert_eq!(s1.raw().len(), cfg.raw_side() * cfg.raw_side());
}

#[test]
fn lookups_survive_index_growth() {
    let mut cfg = small_config(8);
    cfg.table.initial_capacity = 1;
    let mut terrain = store(cfg);
    let mut origins = Vec::new();
    for i in 0..12 {
        let x = (i * 37 - 200) as f32;
        let z = (i * -23 + 50) as f32;
        terrain.height(x, z);
        origins.push(terrain.origin_at(x, z));
    }
    let stats = terrain.stats();
    assert!(stats.index_grows > 0);
    assert!(stats.load_factor <= 0.7);
    for (origin, section) in terrain.iter() {
        let id = terrain.find(origin).expect("placed origin must resolve");
        assert_eq!(terrain.section(id).origin(), Some(origin));
        assert_eq!(section.origin(), Some(origin));
    }
    for o in origins {
        assert!(terrain.get(o).unwrap().is_ready());
    }
}

#[test]
fn view_exposes_triangles_in_world_space() {
    let mut terrain = store(small_config(4));
    let origin = SectionOrigin::new(8, -16);
    let view = terrain.view(origin);
    let cells = 8 * 2;
    assert_eq!(view.samples_per_side(), cells + 1);
    assert_eq!(view.triangle_count(), 2 * cells * cells);
    let tris: Vec<[Vec3; 3]> = view.triangles().collect();
    assert_eq!(tris.len(), view.triangle_count());
    let first = tris[0];
    assert_eq!(first[0], view.world_position(0, 0));
    assert_eq!(first[1], Vec3::new(8.5, view.height_at(1, 0), -16.0));
    assert_eq!(first[2], Vec3::new(8.0, view.height_at(0, 1), -15.5));
    let last = tris[tris.len() - 1];
    assert_eq!(last[0], view.world_position(cells, cells));
}

#[test]
fn visibility_ranges() {
    let mut terrain = store(TerrainConfig {
        section_size: 40,
        samples_per_unit: 1,
        mountain_count: 10,
        ..TerrainConfig::default()
    });
    let visible = terrain.visible_origins(20.0, 20.0, 80.0);
    assert_eq!(visible.len(), 25);
    assert_eq!(visible[0], SectionOrigin::new(-80, -80));
    assert_eq!(visible[24], SectionOrigin::new(80, 80));

    assert!(terrain.sections_within_circle(20.0, 20.0, 25.0).is_empty());
    assert!(terrain.try_view(SectionOrigin::new(0, 0)).is_none());
    let prepared = terrain.prepare_visible(20.0, 20.0, 10.0);
    assert_eq!(prepared, vec![SectionOrigin::new(0, 0)]);
    assert!(terrain.try_view(SectionOrigin::new(0, 0)).is_some());
    assert!(terrain.try_view(SectionOrigin::new(40, 0)).is_none());
    let near = terrain.sections_within_circle(20.0, 20.0, 25.0);
    // Diagonal neighbors are 28.3 units away at their closest corner.
    assert!(near.contains(&SectionOrigin::new(0, 0)));
    assert!(near.contains(&SectionOrigin::new(-40, 0)));
    assert!(!near.contains(&SectionOrigin::new(-40, -40)));
    assert!(near.iter().all(|&o| terrain.find(o).is_some()));
}

#[test]
fn far_away_queries_still_resolve() {
    let mut terrain = store(small_config(11));
    for &(x, z) in &[(1.0e10f32, 0.0f32), (-1.0e10, 0.0), (0.0, 3.0e9), (-3.0e9, 1.0e10)] {
        let before = terrain.len();
        let h = terrain.height(x, z);
        assert!(h.is_finite(), "height at ({x}, {z}) = {h}");
        assert_eq!(terrain.len(), before + 9, "neighbors at ({x}, {z}) must be distinct");
        assert!(terrain.normal(x, z).is_finite());
        let origin = terrain.origin_at(x, z);
        assert!(origin.is_aligned(8));
        assert!(terrain.get(origin).unwrap().is_ready());
    }
}
