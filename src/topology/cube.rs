//! Elementary Cubes
//!
//! A cube is anchored at a lattice point (`root`) and extends one lattice step
//! along each axis in `directions`. Its dimension is the number of directions:
//! vertices are 0-cubes, edges 1-cubes, squares 2-cubes, and so on.
//!
//! The border of a `d`-cube consists of its `2d` facets: removing direction
//! `k` leaves one facet at `root` and one at `root + eₖ`.

use std::fmt;

/// Index of a cube in its filtration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubeId(pub usize);

/// Identity of a cube: lattice root and the sorted set of extension axes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubeKey {
    root: Vec<usize>,
    directions: Vec<usize>,
}

impl CubeKey {
    pub fn new(root: Vec<usize>, mut directions: Vec<usize>) -> Self {
        directions.sort_unstable();
        directions.dedup();
        Self { root, directions }
    }

    pub fn vertex(root: Vec<usize>) -> Self {
        Self { root, directions: Vec::new() }
    }

    pub fn root(&self) -> &[usize] {
        &self.root
    }

    pub fn directions(&self) -> &[usize] {
        &self.directions
    }

    pub fn dimension(&self) -> usize {
        self.directions.len()
    }

    pub fn space_dimension(&self) -> usize {
        self.root.len()
    }

    /// Lattice vertices, `2^dimension` of them.
    ///
    /// Starting from `[root]`, each direction in turn duplicates the list and
    /// steps the copies along that axis, so the last vertex is always the one
    /// diagonally opposite the root.
    pub fn points(&self) -> Vec<Vec<usize>> {
        let mut points = vec![self.root.clone()];
        for &d in &self.directions {
            let shifted: Vec<Vec<usize>> = points
                .iter()
                .map(|p| {
                    let mut q = p.clone();
                    q[d] += 1;
                    q
                })
                .collect();
            points.extend(shifted);
        }
        points
    }

    /// Keys of the `2·dimension` facets; empty for a vertex.
    pub fn border(&self) -> Vec<CubeKey> {
        let mut facets = Vec::with_capacity(2 * self.dimension());
        for (i, &d) in self.directions.iter().enumerate() {
            let mut rest = self.directions.clone();
            rest.remove(i);

            let mut shifted = self.root.clone();
            shifted[d] += 1;

            facets.push(Self { root: self.root.clone(), directions: rest.clone() });
            facets.push(Self { root: shifted, directions: rest });
        }
        facets
    }
}

/// A cube together with its filtration value.
///
/// Equality and hashing go through the key only.
#[derive(Debug, Clone)]
pub struct Cube {
    key: CubeKey,
    value: f64,
}

impl Cube {
    pub fn new(key: CubeKey, value: f64) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &CubeKey {
        &self.key
    }

    pub fn root(&self) -> &[usize] {
        self.key.root()
    }

    pub fn directions(&self) -> &[usize] {
        self.key.directions()
    }

    pub fn dimension(&self) -> usize {
        self.key.dimension()
    }

    pub fn space_dimension(&self) -> usize {
        self.key.space_dimension()
    }

    /// Threshold at which the cube enters the complex.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn points(&self) -> Vec<Vec<usize>> {
        self.key.points()
    }
}

impl PartialEq for Cube {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Cube {}

impl std::hash::Hash for Cube {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cube of dimension {} at {:?} along {:?} (value {:.4})",
            self.dimension(),
            self.root(),
            self.directions(),
            self.value
        )
    }
}

/// All `k`-element subsets of `items`, in lexicographic order of positions.
pub fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    if k > items.len() {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut picks: Vec<usize> = (0..k).collect();
    loop {
        result.push(picks.iter().map(|&i| items[i]).collect());

        // Rightmost pick that can still advance.
        let Some(i) = (0..k).rev().find(|&i| picks[i] < items.len() - k + i) else {
            return result;
        };
        picks[i] += 1;
        for j in i + 1..k {
            picks[j] = picks[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_vertices_end_at_the_diagonal() {
        let square = CubeKey::new(vec![2, 5], vec![0, 1]);
        assert_eq!(
            square.points(),
            vec![vec![2, 5], vec![3, 5], vec![2, 6], vec![3, 6]]
        );
        assert_eq!(square.dimension(), 2);
        assert_eq!(square.space_dimension(), 2);

        let cube = CubeKey::new(vec![0, 0, 0], vec![0, 1, 2]);
        let points = cube.points();
        assert_eq!(points.len(), 8);
        assert_eq!(points[7], vec![1, 1, 1]);
    }

    #[test]
    fn test_border_of_a_square() {
        let square = CubeKey::new(vec![1, 1], vec![1, 0]);
        assert_eq!(square.directions(), &[0, 1]);
        assert_eq!(
            square.border(),
            vec![
                CubeKey::new(vec![1, 1], vec![1]),
                CubeKey::new(vec![2, 1], vec![1]),
                CubeKey::new(vec![1, 1], vec![0]),
                CubeKey::new(vec![1, 2], vec![0]),
            ]
        );
    }

    #[test]
    fn test_vertex_has_no_border() {
        let vertex = CubeKey::vertex(vec![3, 4]);
        assert!(vertex.border().is_empty());
        assert_eq!(vertex.points(), vec![vec![3, 4]]);
    }

    #[test]
    fn test_identity_ignores_value() {
        let a = Cube::new(CubeKey::new(vec![0], vec![0]), 0.2);
        let b = Cube::new(CubeKey::new(vec![0], vec![0]), 0.9);
        let c = Cube::new(CubeKey::vertex(vec![0]), 0.2);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: std::collections::HashSet<Cube> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_combinations() {
        assert_eq!(
            combinations(&[0, 2, 3], 2),
            vec![vec![0, 2], vec![0, 3], vec![2, 3]]
        );
        assert_eq!(combinations(&[4, 5], 0), vec![Vec::<usize>::new()]);
        assert!(combinations(&[1], 2).is_empty());
        assert_eq!(combinations(&[0, 1, 2, 3], 3).len(), 4);
    }
}
