//! End-to-end scenarios: from a density or a sampled shape to its holes.

use approx::assert_relative_eq;
use ndarray::{Array1, Array2};

use tda_cubical::{
    Bandwidth, CubeRole, Filtration, FiltrationConfig, Grid, PersistenceEngine,
    PersistentHomology, Shape, TdaError,
};

fn two_bumps(p: &Array2<f64>) -> Array1<f64> {
    p.row(0)
        .mapv(|x| (-(x - 2.0).powi(2)).exp() + (-(x - 8.0).powi(2)).exp())
}

#[test]
fn two_clusters_on_a_line_merge_at_the_gap() {
    let grid = Grid::from_bounds(&[(0.0, 10.0)], 11, 0.0).unwrap();
    let filtration = Filtration::from_grid(grid, &two_bumps, None).unwrap();
    let homology = PersistentHomology::compute(&filtration).unwrap();

    let holes = homology.holes(0);
    assert_eq!(holes.len(), 2);
    assert!(holes.iter().all(|g| g.born == 0.0));

    let maximum = 1.0 + (-36.0f64).exp();
    let gap = 1.0 - 2.0 * (-9.0f64).exp() / maximum;
    let closed: Vec<_> = holes.iter().filter(|g| !g.is_open()).collect();
    assert_eq!(closed.len(), 1);
    assert_relative_eq!(closed[0].death(), gap, epsilon = 1e-12);
    assert_eq!(holes.iter().filter(|g| g.is_open()).count(), 1);

    assert!(homology.holes(1).is_empty());
    assert_eq!(homology.betti_at(0.5).beta(0), 2);
    assert_eq!(homology.betti_numbers().beta(0), 1);
}

#[test]
fn circle_has_one_dominant_loop() {
    let cloud = Shape::circle().sample(400, 0.05, 42).unwrap();
    let config = FiltrationConfig {
        precision: 20,
        margin: 0.0,
        pruning: None,
        bandwidth: Bandwidth::Scott,
    };
    let homology = cloud.persistent_homology(&config).unwrap();

    let mut lives: Vec<f64> = homology.holes(1).iter().map(|g| g.life()).collect();
    lives.sort_by(|a, b| b.total_cmp(a));
    assert!(!lives.is_empty());
    assert!(lives[0] > 0.5, "loop life {}", lives[0]);
    assert!(lives[1..].iter().all(|&l| l < lives[0] / 2.0), "lives {lives:?}");

    let components = homology.holes(0);
    assert_eq!(components.iter().filter(|g| g.is_open()).count(), 1);
}

#[test]
fn sphere_encloses_a_void() {
    let cloud = Shape::sphere().sample(600, 0.05, 7).unwrap();
    let config = FiltrationConfig { precision: 12, ..Default::default() };
    let homology = cloud.persistent_homology(&config).unwrap();

    let longest = homology
        .holes(2)
        .iter()
        .map(|g| g.life())
        .fold(0.0, f64::max);
    assert!(longest > 0.2, "void life {longest}");
}

#[test]
fn vertices_never_destroy() {
    let cloud = Shape::S1vS1 { radius: 1.0 }.sample(300, 0.05, 3).unwrap();
    let kde = cloud.kde(Bandwidth::Scott).unwrap();
    let config = FiltrationConfig { precision: 12, ..Default::default() };
    let filtration = cloud.filtration(&kde, &config).unwrap();

    let mut engine = PersistenceEngine::new(&filtration);
    for &id in filtration.body() {
        let role = engine.step(&filtration, id).unwrap();
        if filtration.cube(id).dimension() == 0 {
            assert!(matches!(role, CubeRole::Creator(_)));
        }
    }
}

#[test]
fn pruning_keeps_the_order_of_the_survivors() {
    let cloud = Shape::circle().sample(200, 0.1, 11).unwrap();
    let kde = cloud.kde(Bandwidth::Scott).unwrap();
    let full = cloud
        .filtration(&kde, &FiltrationConfig { precision: 12, ..Default::default() })
        .unwrap();
    let pruned = cloud
        .filtration(
            &kde,
            &FiltrationConfig { precision: 12, pruning: Some(0.7), ..Default::default() },
        )
        .unwrap();

    let expected: Vec<_> = full
        .body()
        .iter()
        .copied()
        .filter(|&id| full.cube(id).value() < 0.7)
        .collect();
    assert_eq!(pruned.body(), expected.as_slice());
    assert!(pruned.body().len() < full.body().len());

    let homology = PersistentHomology::compute(&pruned).unwrap();
    assert_eq!(homology.euler_characteristic(), pruned.euler_characteristic());
}

#[test]
fn detail_report_lists_every_dimension_below_the_ambient_one() {
    let cloud = Shape::circle().sample(200, 0.05, 5).unwrap();
    let homology = cloud.persistent_homology(&FiltrationConfig::default()).unwrap();
    let report = homology.to_string();

    assert!(report.starts_with("Dimension 0:\n"));
    assert!(report.contains("Dimension 1:\n"));
    assert!(!report.contains("Dimension 2:"));
    for line in report.lines().filter(|l| !l.starts_with("Dimension")) {
        assert!(line.contains(" -> ") || line == "    No holes", "{line}");
    }
}

#[test]
fn errors_surface_before_any_work() {
    let cloud = Shape::circle().sample(50, 0.05, 1).unwrap();

    let config = FiltrationConfig { precision: 0, ..Default::default() };
    assert!(matches!(
        cloud.persistent_homology(&config),
        Err(TdaError::InvalidGrid(_))
    ));

    let config = FiltrationConfig { pruning: Some(0.0), ..Default::default() };
    assert!(matches!(
        cloud.persistent_homology(&config),
        Err(TdaError::InvalidConfig(_))
    ));

    let flat = |p: &Array2<f64>| Array1::<f64>::zeros(p.ncols());
    assert!(matches!(
        cloud.filtration(&flat, &FiltrationConfig::default()),
        Err(TdaError::InvalidDensityField(_))
    ));

    let sphere_kde = Shape::sphere().sample(50, 0.05, 1).unwrap().kde(Bandwidth::Scott).unwrap();
    assert!(matches!(
        cloud.filtration(&sphere_kde, &FiltrationConfig::default()),
        Err(TdaError::InvalidDensityField(_))
    ));
}

#[test]
fn diagram_matches_holes() {
    let grid = Grid::from_bounds(&[(0.0, 10.0)], 11, 0.0).unwrap();
    let filtration = Filtration::from_grid(grid, &two_bumps, None).unwrap();
    let homology = PersistentHomology::compute(&filtration).unwrap();
    let diagram = homology.diagram();

    assert_eq!(diagram.count(0), 2);
    assert_eq!(diagram.finite_intervals(0).len(), 1);
    let bars = diagram.barcode();
    assert!(bars[0].essential);
    assert_eq!(bars[0].death, 1.0);
}
