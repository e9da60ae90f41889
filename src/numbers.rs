//! Constraints for puzzles that write a number into every cell.

use ndarray::Array2;

use crate::grid::Dims;
use crate::rooms::Room;
use crate::solutions::{enumerate, observed_all, MAX_SOLUTIONS};
use crate::solver::{CellVar, IntVar, Session};

/// All `(a, b)` with `a * b == n`, in ascending order of `a`.
pub fn factor_pairs(n: usize) -> Vec<(usize, usize)> {
    (1..=n).filter(|a| n % a == 0).map(|a| (a, n / a)).collect()
}

/// Number-placement constraints over a rectangular grid.
pub struct NumberSolver {
    dims: Dims,
    grid: Array2<IntVar>,
}

impl NumberSolver {
    /// One integer variable per cell, each over `min_value..=max_value`.
    pub fn new(session: &mut Session, dims: Dims, min_value: i64, max_value: i64) -> Self {
        let grid =
            Array2::from_shape_simple_fn(dims, || session.int_var(min_value, max_value));
        Self { dims, grid }
    }

    /// The grid dimensions this solver was built for.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// The cell variables, for layering puzzle-specific constraints.
    pub fn grid(&self) -> &Array2<IntVar> {
        &self.grid
    }

    /// All values within each of `regions` are distinct.
    pub fn regions(&self, session: &mut Session, regions: &[Room]) {
        for region in regions {
            let cells: Vec<IntVar> = region
                .iter()
                .map(|coord| self.grid[coord.as_index()].clone())
                .collect();
            session.all_different(&cells);
        }
    }

    /// All values within each row and each column are distinct.
    pub fn rows_and_cols(&self, session: &mut Session) {
        for row in self.grid.rows() {
            let cells: Vec<IntVar> = row.iter().cloned().collect();
            session.all_different(&cells);
        }
        for col in self.grid.columns() {
            let cells: Vec<IntVar> = col.iter().cloned().collect();
            session.all_different(&cells);
        }
    }

    /// Enumerate up to [`MAX_SOLUTIONS`] distinct value grids.
    pub fn solutions(&self, session: &mut Session) -> Vec<Array2<i64>> {
        let cells: Vec<CellVar> =
            self.grid.iter().map(|var| CellVar::from(var.clone())).collect();
        enumerate(
            session,
            |s| Array2::from_shape_fn(self.dims, |index| self.grid[index].value(s)),
            |s| observed_all(s, &cells),
            MAX_SOLUTIONS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coord;

    #[test]
    fn factor_pairs_of_12() {
        assert_eq!(
            factor_pairs(12),
            vec![(1, 12), (2, 6), (3, 4), (4, 3), (6, 2), (12, 1)]
        );
    }

    #[test]
    fn latin_square_of_order_2() {
        let mut session = Session::new();
        let solver = NumberSolver::new(&mut session, (2, 2), 1, 2);
        solver.rows_and_cols(&mut session);
        assert!(session.solve());
        let g = solver.grid();
        assert_ne!(g[(0, 0)].value(&session), g[(0, 1)].value(&session));
        assert_ne!(g[(0, 0)].value(&session), g[(1, 0)].value(&session));

        let solutions = solver.solutions(&mut session);
        assert_eq!(solutions.len(), 2);
    }

    #[test]
    fn region_distinctness_caps_region_size() {
        let mut session = Session::new();
        let solver = NumberSolver::new(&mut session, (1, 3), 1, 2);
        let region: Room = [Coord(0, 0), Coord(0, 1), Coord(0, 2)].into_iter().collect();
        solver.regions(&mut session, &[region]);
        // three distinct values cannot fit in 1..=2
        assert!(!session.solve());
    }
}
