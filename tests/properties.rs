//! Structural properties of filtrations and of the persistence reduction on
//! random density grids.

use ndarray::{ArrayD, IxDyn};
use proptest::prelude::*;
use std::collections::HashSet;

use tda_cubical::{
    CubeId, CubeRole, Filtration, GeneratorSet, Grid, PersistenceEngine, PersistentHomology,
};

fn filtration(shape: &[usize], densities: Vec<f64>, pruning: Option<f64>) -> Filtration {
    let bounds = vec![(0.0, 1.0); shape.len()];
    let grid = Grid::from_bounds(&bounds, shape[0], 0.0).unwrap();
    let values = ArrayD::from_shape_vec(IxDyn(shape), densities).unwrap();
    Filtration::from_density_values(grid, values, pruning).unwrap()
}

fn square_grid() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..1.0, 16)
}

fn cube_grid() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..1.0, 27)
}

proptest! {
    #[test]
    fn higher_cubes_enter_with_their_last_facet(densities in square_grid()) {
        let f = filtration(&[4, 4], densities, None);
        for (i, cube) in f.cubes().iter().enumerate() {
            if cube.dimension() == 0 {
                continue;
            }
            let max = f
                .border(CubeId(i))
                .iter()
                .map(|&b| f.cube(b).value())
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(cube.value(), max);
        }
    }

    #[test]
    fn body_is_ascending(densities in cube_grid()) {
        let f = filtration(&[3, 3, 3], densities, None);
        for pair in f.body().windows(2) {
            let (a, b) = (f.cube(pair[0]), f.cube(pair[1]));
            prop_assert!(a.value() <= b.value());
            if a.value() == b.value() {
                prop_assert!(a.dimension() <= b.dimension());
            }
        }
        prop_assert!(f.validate().is_ok());
    }

    #[test]
    fn classes_stay_distinct_at_every_step(densities in square_grid()) {
        let f = filtration(&[4, 4], densities, None);
        let mut engine = PersistenceEngine::new(&f);
        for &id in f.body() {
            let role = engine.step(&f, id).unwrap();
            if f.cube(id).dimension() == 0 {
                prop_assert!(matches!(role, CubeRole::Creator(_)));
            }
            for d in 0..=f.dimension() {
                let classes = engine.classes(d);
                let sets: HashSet<&GeneratorSet> = classes.iter().map(|c| &c.generators).collect();
                prop_assert_eq!(sets.len(), classes.len());
            }
        }
    }

    #[test]
    fn full_grid_is_contractible(densities in cube_grid()) {
        let f = filtration(&[3, 3, 3], densities, None);
        let homology = PersistentHomology::compute(&f).unwrap();

        prop_assert_eq!(f.euler_characteristic(), 1);
        prop_assert_eq!(homology.euler_characteristic(), 1);
        prop_assert_eq!(homology.betti_numbers().values, vec![1, 0, 0, 0]);

        for d in 0..=f.dimension() {
            for g in homology.holes(d) {
                prop_assert!(g.life() > 0.0);
                prop_assert!(g.born >= 0.0 && g.death() <= 1.0);
            }
        }
    }

    #[test]
    fn pruning_filters_without_reordering(densities in square_grid(), p in 0.05f64..=1.0) {
        let full = filtration(&[4, 4], densities.clone(), None);
        let pruned = filtration(&[4, 4], densities, Some(p));

        let expected: Vec<CubeId> = full
            .body()
            .iter()
            .copied()
            .filter(|&id| full.cube(id).value() < p)
            .collect();
        prop_assert_eq!(pruned.body(), expected.as_slice());

        let homology = PersistentHomology::compute(&pruned).unwrap();
        prop_assert_eq!(homology.euler_characteristic(), pruned.euler_characteristic());
    }
}
