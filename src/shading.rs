//! Constraints over shaded/unshaded cell grids.

use ndarray::{arr2, Array2};

use crate::grid::{neighbors, Coord, Dims};
use crate::solutions::{enumerate, MAX_SOLUTIONS};
use crate::solver::{all_of, BoolExpr, CellVar, Session};

/// One cell of a rectangular pattern template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PatternCell {
    /// The cell must be shaded for the template to match.
    Shaded,
    /// The cell must be unshaded for the template to match.
    Unshaded,
    /// The cell does not affect the match.
    Any,
}

/// Shading constraints over a rectangular grid.
///
/// A standalone solver owns a fresh boolean grid where `true` means
/// shaded; an auxiliary solver layers shading semantics on another
/// encoder's grid by declaring which of its values count as shaded.
pub struct ShadingSolver {
    dims: Dims,
    grid: Array2<CellVar>,
    shading_symbols: Vec<i64>,
}

impl ShadingSolver {
    /// A standalone solver with one fresh boolean variable per cell.
    pub fn new(session: &mut Session, dims: Dims) -> Self {
        let grid = Array2::from_shape_simple_fn(dims, || CellVar::from(session.bool_var()));
        Self { dims, grid, shading_symbols: vec![1] }
    }

    /// An auxiliary solver over an existing grid; a cell counts as shaded
    /// when it holds one of `shading_symbols`.
    pub fn over_grid(grid: Array2<CellVar>, shading_symbols: Vec<i64>) -> Self {
        let dims = grid.dim();
        Self { dims, grid, shading_symbols }
    }

    /// The grid dimensions this solver was built for.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// The cell variables, for layering puzzle-specific constraints.
    pub fn grid(&self) -> &Array2<CellVar> {
        &self.grid
    }

    /// "The cell at `coord` is shaded."
    pub fn shaded(&self, coord: Coord) -> BoolExpr {
        self.grid[coord.as_index()].in_values(&self.shading_symbols)
    }

    /// Forbid every placement of `pattern` from matching exactly.
    ///
    /// The template is anchored at every position where it fits entirely
    /// inside the grid; placements that hang off the grid impose nothing.
    pub fn avoid_pattern(&self, session: &mut Session, pattern: &Array2<PatternCell>) {
        let (pattern_rows, pattern_cols) = pattern.dim();
        let (rows, cols) = self.dims;
        for anchor_r in 0..rows.saturating_sub(pattern_rows - 1) {
            for anchor_c in 0..cols.saturating_sub(pattern_cols - 1) {
                let matched = all_of(pattern.indexed_iter().filter_map(|((dr, dc), cell)| {
                    let here = self.shaded(Coord(anchor_r + dr, anchor_c + dc));
                    match cell {
                        PatternCell::Shaded => Some(here),
                        PatternCell::Unshaded => Some(!here),
                        PatternCell::Any => None,
                    }
                }));
                session.require(!matched);
            }
        }
    }

    /// No two shaded cells orthogonally adjacent.
    pub fn no_adjacent(&self, session: &mut Session) {
        use PatternCell::Shaded as S;
        self.avoid_pattern(session, &arr2(&[[S, S]]));
        self.avoid_pattern(session, &arr2(&[[S], [S]]));
    }

    /// No two shaded cells adjacent, diagonals included.
    pub fn no_surrounding(&self, session: &mut Session) {
        use PatternCell::{Any as A, Shaded as S};
        self.no_adjacent(session);
        self.avoid_pattern(session, &arr2(&[[S, A], [A, S]]));
        self.avoid_pattern(session, &arr2(&[[A, S], [S, A]]));
    }

    /// No fully unshaded 2x2 square.
    pub fn no_white_2x2(&self, session: &mut Session) {
        use PatternCell::Unshaded as W;
        self.avoid_pattern(session, &arr2(&[[W, W], [W, W]]));
    }

    /// No fully shaded 2x2 square.
    pub fn no_black_2x2(&self, session: &mut Session) {
        use PatternCell::Shaded as S;
        self.avoid_pattern(session, &arr2(&[[S, S], [S, S]]));
    }

    /// Clue cells are never shaded.
    pub fn white_clues<'a>(
        &self,
        session: &mut Session,
        clue_cells: impl IntoIterator<Item = &'a Coord>,
    ) {
        for coord in clue_cells {
            let unshaded = !self.shaded(*coord);
            session.require(unshaded);
        }
    }

    /// Unshaded cells form one orthogonally connected area.
    pub fn white_connectivity(&self, session: &mut Session, known_root: Option<Coord>) {
        self.connectivity(session, false, known_root);
    }

    /// Shaded cells form one orthogonally connected area.
    pub fn black_connectivity(&self, session: &mut Session, known_root: Option<Coord>) {
        self.connectivity(session, true, known_root);
    }

    fn color(&self, coord: Coord, shaded: bool) -> BoolExpr {
        match shaded {
            true => self.shaded(coord),
            false => !self.shaded(coord),
        }
    }

    /// Reachability proofs for one color.
    ///
    /// With a known root, that cell is unconditionally proven and every
    /// other cell of the color must reach it through same-colored
    /// neighbors. Without one, a fresh "chosen" flag per cell seeds the
    /// proofs and exactly one flag is required true. The chosen-witness
    /// form is unsatisfiable for a color forced to have zero cells only
    /// through the color requirement itself, not through the witness, so
    /// callers whose color class may legitimately be empty must skip this
    /// constraint.
    fn connectivity(&self, session: &mut Session, shaded: bool, known_root: Option<Coord>) {
        let atoms = Array2::from_shape_simple_fn(self.dims, || session.atom());

        let chosen = match known_root {
            Some(root) => {
                session.prove_if(atoms[root.as_index()], BoolExpr::Const(true));
                None
            }
            None => Some(Array2::from_shape_simple_fn(self.dims, || session.bool_var())),
        };

        for (index, atom) in atoms.indexed_iter() {
            let coord = Coord(index.0, index.1);
            for neighbor in neighbors(self.dims, coord) {
                let through = self.color(neighbor, shaded)
                    & atoms[neighbor.as_index()].proven();
                let justification = match &chosen {
                    Some(chosen) => chosen[index].expr() | through,
                    None => through,
                };
                session.prove_if(*atom, justification);
            }
            session.require(atom.proven() | !self.color(coord, shaded));
        }

        if let Some(chosen) = chosen {
            let flags: Vec<BoolExpr> = chosen.iter().map(|flag| flag.expr()).collect();
            let one_witness = session.exactly(1, &flags);
            session.require(one_witness);
        }
    }

    /// Every shaded cell reaches the grid boundary through shaded cells.
    pub fn black_edge_connectivity(&self, session: &mut Session) {
        let (rows, cols) = self.dims;
        let atoms = Array2::from_shape_simple_fn(self.dims, || session.atom());

        for (index, atom) in atoms.indexed_iter() {
            let coord = Coord(index.0, index.1);
            if index.0 == 0 || index.0 == rows - 1 || index.1 == 0 || index.1 == cols - 1 {
                session.prove_if(*atom, BoolExpr::Const(true));
            } else {
                for neighbor in neighbors(self.dims, coord) {
                    let through =
                        self.shaded(neighbor) & atoms[neighbor.as_index()].proven();
                    session.prove_if(*atom, through);
                }
            }
            session.require(atom.proven() | !self.shaded(coord));
        }
    }

    /// Enumerate up to [`MAX_SOLUTIONS`] distinct shadings, `true` for
    /// shaded.
    ///
    /// Two models that differ only in values within the same shadedness
    /// class count as one solution.
    pub fn solutions(&self, session: &mut Session) -> Vec<Array2<bool>> {
        enumerate(
            session,
            |s| {
                Array2::from_shape_fn(self.dims, |index| {
                    self.shading_symbols
                        .contains(&self.grid[index].value(s))
                })
            },
            |s| {
                all_of(self.grid.indexed_iter().map(|(index, cell)| {
                    let shaded = cell.in_values(&self.shading_symbols);
                    match self.shading_symbols.contains(&cell.value(s)) {
                        true => shaded,
                        false => !shaded,
                    }
                }))
            },
            MAX_SOLUTIONS,
        )
    }
}
