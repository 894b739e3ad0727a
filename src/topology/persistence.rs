//! Persistent Homology of a Cubical Filtration
//!
//! Single pass over `body`, mod 2. Each cube's differential is the sum of the
//! classes of its facets:
//!
//! - empty differential: the cube is a **creator**. A new generator is born
//!   at the cube's value and a new class `{g}` is represented by the cube.
//! - otherwise the cube is a **destroyer**. The youngest generator `g` of the
//!   differential dies (elder rule; equal births resolved towards the highest
//!   id). Every class of the facet dimension containing `g` is replaced by its
//!   sum with the differential, and classes that become equal are collapsed.
//!   The cube itself joins the null class of its dimension.
//!
//! ## Representation Invariant
//!
//! Between two steps, the active classes of a dimension have pairwise distinct
//! generator sets. A lookup table from generator set to class keeps this
//! check O(1) per transformed class.
//!
//! ## Interpretation
//!
//! - Generators with a long life `death − born` are robust features
//! - Zero-life generators are dropped from the holes
//! - A generator never killed is reported with death 1 (open)

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::{info, trace};

use super::betti::{BettiCurve, BettiNumbers};
use super::cube::CubeId;
use super::diagram::{PersistenceDiagram, PersistenceInterval};
use super::filtration::Filtration;
use super::generators::{ClassId, GeneratorId, GeneratorSet, HomologyClass, HomologyGenerator};
use crate::error::{TdaError, TdaResult};

/// What a cube did to the homology when it entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeRole {
    Creator(GeneratorId),
    Destroyer { killed: GeneratorId },
}

/// Mutable state of the reduction, advanced one cube at a time.
#[derive(Debug, Clone)]
pub struct PersistenceEngine {
    generators: Vec<HomologyGenerator>,
    classes: Vec<HomologyClass>,
    /// Active classes per dimension, null class first
    active: Vec<Vec<ClassId>>,
    lookup: Vec<HashMap<GeneratorSet, ClassId>>,
    null: Vec<ClassId>,
    cube_class: Vec<Option<ClassId>>,
    holes: Vec<Vec<GeneratorId>>,
    creators: Vec<usize>,
    destroyers: Vec<usize>,
    last: Option<(f64, usize)>,
}

impl PersistenceEngine {
    /// Empty state sized for the cubes of `filtration`.
    pub fn new(filtration: &Filtration) -> Self {
        let dimensions = filtration.dimension() + 1;
        let mut engine = Self {
            generators: Vec::new(),
            classes: Vec::new(),
            active: vec![Vec::new(); dimensions],
            lookup: vec![HashMap::new(); dimensions],
            null: Vec::with_capacity(dimensions),
            cube_class: vec![None; filtration.len()],
            holes: vec![Vec::new(); dimensions],
            creators: vec![0; dimensions],
            destroyers: vec![0; dimensions],
            last: None,
        };
        for dimension in 0..dimensions {
            let null = engine.new_class(dimension, GeneratorSet::new(), Vec::new());
            engine.null.push(null);
        }
        engine
    }

    /// Process the next cube of the filtration.
    ///
    /// Rejects with `NonMonotoneFiltration` a cube that comes before the
    /// previous one in `(value, dimension)`, a cube processed twice, or a cube
    /// with a facet that is unprocessed or has a larger value.
    pub fn step(&mut self, filtration: &Filtration, id: CubeId) -> TdaResult<CubeRole> {
        if id.0 >= self.cube_class.len() {
            return Err(TdaError::InvalidData(format!("no cube with id {}", id.0)));
        }
        let cube = filtration.cube(id);
        let (value, dimension) = (cube.value(), cube.dimension());

        if !value.is_finite() {
            return Err(TdaError::NonMonotoneFiltration(format!("{cube} has a non-finite value")));
        }
        if let Some((last_value, last_dimension)) = self.last {
            if value < last_value || (value == last_value && dimension < last_dimension) {
                return Err(TdaError::NonMonotoneFiltration(format!(
                    "{cube} comes after a cube of dimension {last_dimension} with value {last_value}"
                )));
            }
        }
        if self.cube_class[id.0].is_some() {
            return Err(TdaError::NonMonotoneFiltration(format!("{cube} was already processed")));
        }

        let mut differential = GeneratorSet::new();
        for &facet in filtration.border(id) {
            let face = filtration.cube(facet);
            if face.value() > value {
                return Err(TdaError::NonMonotoneFiltration(format!(
                    "facet {face} has a larger value than {cube}"
                )));
            }
            let class = self.cube_class[facet.0].ok_or_else(|| {
                TdaError::NonMonotoneFiltration(format!("facet {face} is processed after {cube}"))
            })?;
            differential ^= &self.classes[class.0].generators;
        }
        self.last = Some((value, dimension));

        let role = match self.youngest(&differential) {
            None => self.create(id, dimension, value),
            Some(killed) => self.destroy(id, dimension, value, killed, &differential),
        };
        Ok(role)
    }

    fn create(&mut self, id: CubeId, dimension: usize, value: f64) -> CubeRole {
        let generator = GeneratorId(self.generators.len());
        self.generators.push(HomologyGenerator::new(generator, dimension, value));
        self.holes[dimension].push(generator);

        let class = self.new_class(dimension, GeneratorSet::singleton(generator), vec![id]);
        self.cube_class[id.0] = Some(class);
        self.creators[dimension] += 1;

        trace!(cube = id.0, dimension, value, generator = generator.0, "creator");
        CubeRole::Creator(generator)
    }

    fn destroy(
        &mut self,
        id: CubeId,
        dimension: usize,
        value: f64,
        killed: GeneratorId,
        differential: &GeneratorSet,
    ) -> CubeRole {
        // A non-empty differential only arises from facets, so dimension ≥ 1.
        let target = dimension - 1;

        let affected: Vec<ClassId> = self.active[target]
            .iter()
            .copied()
            .filter(|c| self.classes[c.0].generators.contains(killed))
            .collect();

        for class in affected {
            if !self.classes[class.0].active {
                continue;
            }
            let old = self.classes[class.0].generators.clone();
            let new = &old ^ differential;
            self.lookup[target].remove(&old);

            match self.lookup[target].get(&new).copied() {
                Some(existing) => self.collapse(target, class, existing),
                None => {
                    self.classes[class.0].generators = new.clone();
                    self.lookup[target].insert(new, class);
                }
            }
        }

        let generator = &mut self.generators[killed.0];
        generator.death = Some(value);
        if generator.life() <= 0.0 {
            self.holes[target].retain(|&g| g != killed);
        }

        let null = self.null[dimension];
        self.classes[null.0].representatives.push(id);
        self.cube_class[id.0] = Some(null);
        self.destroyers[dimension] += 1;

        trace!(cube = id.0, dimension, value, killed = killed.0, "destroyer");
        CubeRole::Destroyer { killed }
    }

    /// Merge `from` into `into`: representatives move over and point at `into`,
    /// and `from` leaves the active list. Collapsing an inactive class is a no-op.
    pub(crate) fn collapse(&mut self, dimension: usize, from: ClassId, into: ClassId) {
        if from == into || !self.classes[from.0].active {
            return;
        }
        let representatives = std::mem::take(&mut self.classes[from.0].representatives);
        for &cube in &representatives {
            self.cube_class[cube.0] = Some(into);
        }
        self.classes[into.0].representatives.extend(representatives);

        if self.lookup[dimension].get(&self.classes[from.0].generators) == Some(&from) {
            self.lookup[dimension].remove(&self.classes[from.0].generators);
        }
        self.classes[from.0].active = false;
        self.active[dimension].retain(|&c| c != from);
    }

    fn new_class(
        &mut self,
        dimension: usize,
        generators: GeneratorSet,
        representatives: Vec<CubeId>,
    ) -> ClassId {
        let id = ClassId(self.classes.len());
        self.lookup[dimension].insert(generators.clone(), id);
        self.classes.push(HomologyClass::new(dimension, generators, representatives));
        self.active[dimension].push(id);
        id
    }

    /// Generator with the largest birth; equal births go to the highest id.
    fn youngest(&self, set: &GeneratorSet) -> Option<GeneratorId> {
        set.iter().max_by(|a, b| {
            self.generators[a.0]
                .born
                .total_cmp(&self.generators[b.0].born)
                .then(a.cmp(b))
        })
    }

    /// Active classes of a dimension, null class included.
    pub fn classes(&self, dimension: usize) -> Vec<&HomologyClass> {
        self.active
            .get(dimension)
            .map(|ids| ids.iter().map(|c| &self.classes[c.0]).collect())
            .unwrap_or_default()
    }

    pub fn class_of(&self, cube: CubeId) -> Option<&HomologyClass> {
        let class = (*self.cube_class.get(cube.0)?)?;
        Some(&self.classes[class.0])
    }

    pub fn generator(&self, id: GeneratorId) -> Option<&HomologyGenerator> {
        self.generators.get(id.0)
    }

    /// Freeze the state into the final result.
    pub fn finish(self, dimension: usize) -> PersistentHomology {
        PersistentHomology {
            dimension,
            generators: self.generators,
            classes: self.classes,
            active: self.active,
            cube_class: self.cube_class,
            holes: self.holes,
            creators: self.creators,
            destroyers: self.destroyers,
        }
    }
}

/// Lifetimes of the homology features of a filtration.
#[derive(Debug, Clone)]
pub struct PersistentHomology {
    dimension: usize,
    generators: Vec<HomologyGenerator>,
    classes: Vec<HomologyClass>,
    active: Vec<Vec<ClassId>>,
    cube_class: Vec<Option<ClassId>>,
    holes: Vec<Vec<GeneratorId>>,
    creators: Vec<usize>,
    destroyers: Vec<usize>,
}

impl PersistentHomology {
    /// Validate `filtration` and run the reduction over its body.
    pub fn compute(filtration: &Filtration) -> TdaResult<Self> {
        filtration.validate()?;
        let start = Instant::now();
        let mut engine = PersistenceEngine::new(filtration);
        for &id in filtration.body() {
            engine.step(filtration, id)?;
        }
        let homology = engine.finish(filtration.dimension());
        info!(
            cubes = filtration.body().len(),
            holes = ?homology.holes.iter().map(Vec::len).collect::<Vec<_>>(),
            elapsed = ?start.elapsed(),
            "persistent homology computed"
        );
        Ok(homology)
    }

    /// Ambient dimension of the filtration.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Generators of dimension `d` with a positive life, in birth order.
    pub fn holes(&self, d: usize) -> Vec<&HomologyGenerator> {
        self.holes
            .get(d)
            .map(|ids| ids.iter().map(|g| &self.generators[g.0]).collect())
            .unwrap_or_default()
    }

    pub fn generator(&self, id: GeneratorId) -> Option<&HomologyGenerator> {
        self.generators.get(id.0)
    }

    /// Non-null classes of dimension `d` still alive at the end.
    pub fn open_classes(&self, d: usize) -> Vec<&HomologyClass> {
        self.active
            .get(d)
            .map(|ids| {
                ids.iter()
                    .map(|c| &self.classes[c.0])
                    .filter(|c| !c.is_null())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Class a processed cube belongs to; `None` for pruned cubes.
    pub fn class_of(&self, cube: CubeId) -> Option<&HomologyClass> {
        let class = (*self.cube_class.get(cube.0)?)?;
        Some(&self.classes[class.0])
    }

    /// Cubes of dimension `d` that created a generator.
    pub fn creators(&self, d: usize) -> usize {
        self.creators.get(d).copied().unwrap_or(0)
    }

    /// Cubes of dimension `d` that killed a generator of dimension `d − 1`.
    pub fn destroyers(&self, d: usize) -> usize {
        self.destroyers.get(d).copied().unwrap_or(0)
    }

    /// Σ (−1)ᵈ (creators(d) − destroyers(d + 1)), the alternating sum of the
    /// generators left alive. Equals the Euler characteristic of the
    /// processed complex.
    pub fn euler_characteristic(&self) -> i64 {
        (0..self.creators.len())
            .map(|d| {
                let alive = self.creators(d) as i64 - self.destroyers(d + 1) as i64;
                if d % 2 == 0 {
                    alive
                } else {
                    -alive
                }
            })
            .sum()
    }

    /// Betti numbers at the end of the filtration.
    pub fn betti_numbers(&self) -> BettiNumbers {
        BettiNumbers::at(self, f64::INFINITY)
    }

    pub fn betti_at(&self, t: f64) -> BettiNumbers {
        BettiNumbers::at(self, t)
    }

    pub fn betti_curve(&self, steps: usize) -> BettiCurve {
        BettiCurve::compute(self, steps)
    }

    /// One interval per hole.
    pub fn diagram(&self) -> PersistenceDiagram {
        let mut diagram = PersistenceDiagram::new();
        for (d, ids) in self.holes.iter().enumerate() {
            for g in ids {
                let generator = &self.generators[g.0];
                diagram.add(PersistenceInterval::new(
                    generator.born,
                    generator.death(),
                    d,
                    generator.is_open(),
                ));
            }
        }
        diagram
    }
}

impl fmt::Display for PersistentHomology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in 0..self.dimension {
            writeln!(f, "Dimension {d}:")?;
            let holes = self.holes(d);
            if holes.is_empty() {
                writeln!(f, "    No holes")?;
            }
            for g in holes {
                writeln!(f, "   {:.6} -> {:.6}  ({:.6})", g.born, g.death(), g.life())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::cube::CubeKey;
    use crate::topology::grid::Grid;
    use ndarray::{array, ArrayD, IxDyn};

    fn line(densities: &[f64]) -> Filtration {
        let grid = Grid::from_bounds(&[(0.0, 1.0)], densities.len(), 0.0).unwrap();
        let values = ArrayD::from_shape_vec(IxDyn(&[densities.len()]), densities.to_vec()).unwrap();
        Filtration::from_density_values(grid, values, None).unwrap()
    }

    fn square(densities: ndarray::Array2<f64>) -> Filtration {
        let n = densities.nrows();
        let grid = Grid::from_bounds(&[(0.0, 1.0), (0.0, 1.0)], n, 0.0).unwrap();
        Filtration::from_density_values(grid, densities.into_dyn(), None).unwrap()
    }

    #[test]
    fn test_two_peaks_on_a_line() {
        // Values: 0, 0.5, 0.9, 0.5, 0
        let f = line(&[1.0, 0.5, 0.1, 0.5, 1.0]);
        let ph = PersistentHomology::compute(&f).unwrap();
        let holes = ph.holes(0);
        assert_eq!(holes.len(), 2);
        assert!(holes.iter().all(|g| g.born == 0.0));
        let open: Vec<_> = holes.iter().filter(|g| g.is_open()).collect();
        assert_eq!(open.len(), 1);
        let closed = holes.iter().find(|g| !g.is_open()).unwrap();
        assert!((closed.death() - 0.9).abs() < 1e-12);
        assert!(ph.holes(1).is_empty());
        assert_eq!(ph.euler_characteristic(), 1);
    }

    #[test]
    fn test_zero_life_generators_are_dropped() {
        // Plateau: vertices created at 0.5 are merged at 0.5.
        let f = line(&[1.0, 0.5, 0.5, 0.5]);
        let ph = PersistentHomology::compute(&f).unwrap();
        assert_eq!(ph.holes(0).len(), 1);
        assert_eq!(ph.creators(0), 4);
        assert_eq!(ph.destroyers(1), 3);
    }

    #[test]
    fn test_ring_of_density_has_a_loop() {
        let f = square(array![
            [1.0, 1.0, 1.0],
            [1.0, 0.1, 1.0],
            [1.0, 1.0, 1.0]
        ]);
        let ph = PersistentHomology::compute(&f).unwrap();
        let loops = ph.holes(1);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].born, 0.0);
        assert!((loops[0].death() - 0.9).abs() < 1e-12);
        assert_eq!(ph.betti_numbers().values, vec![1, 0, 0]);
        assert_eq!(ph.to_string(), "Dimension 0:\n   0.000000 -> 1.000000  (1.000000)\nDimension 1:\n   0.000000 -> 0.900000  (0.900000)\n");
    }

    #[test]
    fn test_vertices_are_always_creators() {
        let f = square(array![[0.3, 0.9, 0.2], [0.5, 0.1, 0.7], [1.0, 0.4, 0.6]]);
        let mut engine = PersistenceEngine::new(&f);
        for &id in f.body() {
            let role = engine.step(&f, id).unwrap();
            if f.cube(id).dimension() == 0 {
                assert!(matches!(role, CubeRole::Creator(_)));
            }
        }
    }

    #[test]
    fn test_out_of_order_steps_are_rejected() {
        let f = line(&[1.0, 0.5, 0.1]);
        let edge = f.get(&CubeKey::new(vec![0], vec![0])).unwrap();
        let mut engine = PersistenceEngine::new(&f);
        assert!(matches!(
            engine.step(&f, edge),
            Err(TdaError::NonMonotoneFiltration(_))
        ));

        let first = f.body()[0];
        let mut engine = PersistenceEngine::new(&f);
        engine.step(&f, first).unwrap();
        assert!(matches!(
            engine.step(&f, first),
            Err(TdaError::NonMonotoneFiltration(_))
        ));
    }

    #[test]
    fn test_non_monotone_override_is_rejected() {
        let mut f = line(&[1.0, 0.5, 0.1]);
        let edge = f.get(&CubeKey::new(vec![1], vec![0])).unwrap();
        f.set_value(edge, 0.0).unwrap();
        assert!(matches!(
            PersistentHomology::compute(&f),
            Err(TdaError::NonMonotoneFiltration(_))
        ));
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let f = line(&[1.0, 0.2, 1.0]);
        let mut engine = PersistenceEngine::new(&f);
        for &id in f.body().iter().take(3) {
            engine.step(&f, id).unwrap();
        }
        let classes: Vec<ClassId> = engine.active[0][1..].to_vec();
        let (a, b) = (classes[0], classes[1]);

        engine.collapse(0, a, b);
        let once = engine.classes[b.0].representatives.clone();
        engine.collapse(0, a, b);
        assert_eq!(engine.classes[b.0].representatives, once);
        assert_eq!(once.len(), 2);
        assert_eq!(engine.classes(0).len(), 3);
    }

    #[test]
    fn test_no_steps_means_no_holes() {
        let f = line(&[1.0, 0.5, 0.1]);
        let ph = PersistenceEngine::new(&f).finish(f.dimension());
        assert!(ph.holes(0).is_empty());
        assert!(ph.holes(1).is_empty());
        assert_eq!(ph.euler_characteristic(), 0);
        assert_eq!(ph.to_string(), "Dimension 0:\n    No holes\n");
    }

    #[test]
    fn test_pruned_cubes_have_no_class() {
        let grid = Grid::from_bounds(&[(0.0, 1.0)], 3, 0.0).unwrap();
        let values = array![1.0, 0.5, 0.0].into_dyn();
        let f = Filtration::from_density_values(grid, values, Some(0.6)).unwrap();
        let ph = PersistentHomology::compute(&f).unwrap();
        let sparse = f.get(&CubeKey::vertex(vec![2])).unwrap();
        assert!(ph.class_of(sparse).is_none());
        assert!(ph.class_of(f.body()[0]).is_some());
        assert_eq!(ph.holes(0).len(), 1);
        assert_eq!(ph.open_classes(0).len(), 1);
    }
}
