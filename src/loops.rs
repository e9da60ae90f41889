//! Constraints for drawing closed loops through cells.
//!
//! Each cell holds one symbol of a connection-pattern alphabet: empty,
//! optionally shaded, or a piece with exactly two connectors toward
//! orthogonal neighbors (undirected, or directed with one inbound and one
//! outbound connector). Local pairwise rules make connectors match up
//! across cell borders, which forbids any dangling end; proof atoms seeded
//! by per-cell loop-start flags make every piece reachable, so the number
//! of true start flags bounds the number of disjoint closed curves.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use ndarray::Array2;
use strum::VariantArray;

use crate::grid::{Coord, Dims, Direction};
use crate::rooms::Room;
use crate::solutions::{enumerate, MAX_SOLUTIONS};
use crate::solver::{Atom, BoolExpr, BoolVar, IntVar, Session, SymVar};

/// The six ways a loop can pass through one cell, named by where the two
/// connectors point.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, VariantArray)]
pub enum PieceShape {
    /// Connectors toward the top and left neighbors.
    UpLeft,
    /// Connectors toward the bottom and left neighbors.
    DownLeft,
    /// Connectors toward the top and right neighbors.
    UpRight,
    /// Connectors toward the bottom and right neighbors.
    DownRight,
    /// Connectors toward the left and right neighbors.
    Horizontal,
    /// Connectors toward the top and bottom neighbors.
    Vertical,
}

impl PieceShape {
    /// The two directions this piece connects toward.
    pub fn connectors(&self) -> [Direction; 2] {
        match self {
            PieceShape::UpLeft => [Direction::Top, Direction::Left],
            PieceShape::DownLeft => [Direction::Bottom, Direction::Left],
            PieceShape::UpRight => [Direction::Top, Direction::Right],
            PieceShape::DownRight => [Direction::Bottom, Direction::Right],
            PieceShape::Horizontal => [Direction::Left, Direction::Right],
            PieceShape::Vertical => [Direction::Top, Direction::Bottom],
        }
    }

    fn has_connector(&self, dir: Direction) -> bool {
        self.connectors().contains(&dir)
    }
}

/// One cell's loop symbol.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LoopSymbol {
    /// No loop and no shading.
    Empty,
    /// Shaded, for puzzles that combine a loop with shading.
    Shaded,
    /// An undirected loop piece.
    Und(PieceShape),
    /// A directed loop piece; the direction is the outbound connector,
    /// the shape's other connector is inbound.
    Dir(PieceShape, Direction),
}

impl LoopSymbol {
    /// Whether this symbol carries no loop piece.
    pub fn is_isolated(&self) -> bool {
        matches!(self, LoopSymbol::Empty | LoopSymbol::Shaded)
    }

    fn has_connector(&self, dir: Direction) -> bool {
        match self {
            LoopSymbol::Empty | LoopSymbol::Shaded => false,
            LoopSymbol::Und(shape) | LoopSymbol::Dir(shape, _) => shape.has_connector(dir),
        }
    }

    fn flows(&self, dir: Direction, outbound: bool) -> bool {
        match self {
            LoopSymbol::Dir(shape, out) => match outbound {
                true => *out == dir,
                false => shape.has_connector(dir) && *out != dir,
            },
            _ => false,
        }
    }
}

impl Display for LoopSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use Direction::*;
        use PieceShape::*;
        let c = match self {
            LoopSymbol::Empty => ' ',
            LoopSymbol::Shaded => '.',
            LoopSymbol::Und(UpLeft) => '┘',
            LoopSymbol::Und(DownLeft) => '┐',
            LoopSymbol::Und(UpRight) => '└',
            LoopSymbol::Und(DownRight) => '┌',
            LoopSymbol::Und(Horizontal) => '─',
            LoopSymbol::Und(Vertical) => '│',
            LoopSymbol::Dir(UpLeft, Top) => '⬏',
            LoopSymbol::Dir(UpLeft, Left) => '↲',
            LoopSymbol::Dir(DownLeft, Bottom) => '↴',
            LoopSymbol::Dir(DownLeft, Left) => '↰',
            LoopSymbol::Dir(UpRight, Top) => '⬑',
            LoopSymbol::Dir(UpRight, Right) => '↳',
            LoopSymbol::Dir(DownRight, Right) => '↱',
            LoopSymbol::Dir(DownRight, Bottom) => '⬐',
            LoopSymbol::Dir(Horizontal, Right) => '→',
            LoopSymbol::Dir(Horizontal, Left) => '←',
            LoopSymbol::Dir(Vertical, Top) => '↑',
            LoopSymbol::Dir(Vertical, Bottom) => '↓',
            LoopSymbol::Dir(..) => unreachable!("outbound direction is always a connector"),
        };
        write!(f, "{c}")
    }
}

/// How the loop interacts with clue cells and blanks.
#[derive(Clone, Copy, Debug)]
pub struct LoopRules {
    /// The loop may pass through clue cells.
    pub includes_clues: bool,
    /// Non-clue cells may stay empty.
    pub allow_blanks: bool,
    /// Clue cells may be shaded instead of forced empty.
    pub transparent: bool,
}

impl Default for LoopRules {
    fn default() -> Self {
        Self { includes_clues: false, allow_blanks: true, transparent: false }
    }
}

/// Options fixed at solver construction.
#[derive(Clone, Copy, Debug)]
pub struct LoopConfig {
    /// Use the directed symbol alphabet.
    pub directed: bool,
    /// Extend the alphabet with the shaded symbol.
    pub shading: bool,
    /// Minimum number of disjoint loops.
    pub min_loops: usize,
    /// Maximum number of disjoint loops.
    pub max_loops: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { directed: false, shading: false, min_loops: 1, max_loops: 1 }
    }
}

/// Loop constraints over a rectangular grid.
pub struct LoopSolver {
    dims: Dims,
    config: LoopConfig,
    alphabet: Vec<LoopSymbol>,
    grid: Array2<SymVar>,
    atoms: Array2<Atom>,
    loop_start: Array2<BoolVar>,
    loop_id: Option<Array2<IntVar>>,
}

impl LoopSolver {
    /// Allocates one symbol variable per cell over the alphabet implied by `config`.
    pub fn new(session: &mut Session, dims: Dims, config: LoopConfig) -> Self {
        assert!(config.min_loops <= config.max_loops && config.max_loops >= 1);

        let mut alphabet = vec![LoopSymbol::Empty];
        if config.shading {
            alphabet.push(LoopSymbol::Shaded);
        }
        for &shape in PieceShape::VARIANTS {
            match config.directed {
                false => alphabet.push(LoopSymbol::Und(shape)),
                true => alphabet
                    .extend(shape.connectors().map(|out| LoopSymbol::Dir(shape, out))),
            }
        }

        let domain = alphabet.len();
        let grid = Array2::from_shape_simple_fn(dims, || session.sym_var(domain));
        let atoms = Array2::from_shape_simple_fn(dims, || session.atom());
        let loop_start = Array2::from_shape_simple_fn(dims, || session.bool_var());
        let loop_id = (config.max_loops > 1).then(|| {
            Array2::from_shape_simple_fn(dims, || session.int_var(0, config.max_loops as i64))
        });

        Self { dims, config, alphabet, grid, atoms, loop_start, loop_id }
    }

    /// The grid dimensions this solver was built for.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// The symbol variables, for layering puzzle-specific constraints.
    pub fn grid(&self) -> &Array2<SymVar> {
        &self.grid
    }

    /// The loop-id variables; present only when `max_loops > 1`. A cell
    /// not on any loop holds id `max_loops`.
    pub fn loop_id(&self) -> Option<&Array2<IntVar>> {
        self.loop_id.as_ref()
    }

    /// "The cell at `coord` holds `symbol`." Panics if the symbol is not
    /// in this solver's alphabet.
    pub fn is(&self, coord: Coord, symbol: LoopSymbol) -> BoolExpr {
        let index = self
            .alphabet
            .iter()
            .position(|s| *s == symbol)
            .unwrap_or_else(|| panic!("{symbol:?} is not in the symbol alphabet"));
        self.grid[coord.as_index()].is(index)
    }

    fn matching(&self, coord: Coord, pred: impl Fn(&LoopSymbol) -> bool) -> BoolExpr {
        let indices: Vec<usize> = self
            .alphabet
            .iter()
            .enumerate()
            .filter_map(|(i, s)| pred(s).then_some(i))
            .collect();
        self.grid[coord.as_index()].is_in(indices)
    }

    /// "The cell at `coord` carries no loop piece."
    pub fn isolated(&self, coord: Coord) -> BoolExpr {
        self.matching(coord, LoopSymbol::is_isolated)
    }

    /// "The cell at `coord` has a connector toward `dir`."
    pub fn connects(&self, coord: Coord, dir: Direction) -> BoolExpr {
        self.matching(coord, |s| s.has_connector(dir))
    }

    fn flow(&self, coord: Coord, dir: Direction, outbound: bool) -> BoolExpr {
        self.matching(coord, |s| s.flows(dir, outbound))
    }

    /// Wire up the loop structure.
    ///
    /// For every cell and every piece symbol whose connectors stay on the
    /// grid, holding that symbol is equivalent to both connected neighbors
    /// connecting back (for directed pieces, the inbound neighbor flowing
    /// in and the outbound neighbor accepting the flow). Symbols with an
    /// off-grid connector are forbidden outright. Reachability proofs flow
    /// through connections (inbound only, when directed) from loop-start
    /// cells, and the count of non-isolated loop starts is bounded by the
    /// configured loop range.
    pub fn draw_loop(
        &self,
        session: &mut Session,
        clue_cells: &BTreeSet<Coord>,
        rules: LoopRules,
    ) {
        for coord in crate::grid::iter_coords(self.dims) {
            self.clue_cell_rules(session, coord, clue_cells, rules);
            self.piece_rules(session, coord);
            self.border_rules(session, coord);

            if let Some(loop_id) = &self.loop_id {
                let off_loop = loop_id[coord.as_index()]
                    .expr()
                    .eq(self.config.max_loops as i64)
                    .iff(self.isolated(coord));
                session.require(off_loop);
            }

            // every loop piece must be reachable from a start
            let reachable = self.atoms[coord.as_index()].proven() | self.isolated(coord);
            session.require(reachable);
        }

        let starts: Vec<BoolExpr> = crate::grid::iter_coords(self.dims)
            .map(|coord| self.loop_start[coord.as_index()].expr() & !self.isolated(coord))
            .collect();
        let enough = session.at_least(self.config.min_loops, &starts);
        session.require(enough);
        let not_too_many = session.at_most(self.config.max_loops, &starts);
        session.require(not_too_many);
    }

    fn clue_cell_rules(
        &self,
        session: &mut Session,
        coord: Coord,
        clue_cells: &BTreeSet<Coord>,
        rules: LoopRules,
    ) {
        let is_clue = clue_cells.contains(&coord);
        if !rules.includes_clues {
            if is_clue {
                let blocked = match rules.transparent {
                    true => self.isolated(coord),
                    false => self.is(coord, LoopSymbol::Empty),
                };
                session.require(blocked);
            }
            if !rules.allow_blanks {
                let empty_iff_clue = self
                    .is(coord, LoopSymbol::Empty)
                    .iff(BoolExpr::Const(is_clue));
                session.require(empty_iff_clue);
            }
        } else if !rules.allow_blanks {
            let not_empty = !self.is(coord, LoopSymbol::Empty);
            session.require(not_empty);
        }
    }

    fn piece_rules(&self, session: &mut Session, coord: Coord) {
        for symbol in &self.alphabet {
            let (shape, out) = match symbol {
                LoopSymbol::Und(shape) => (*shape, None),
                LoopSymbol::Dir(shape, out) => (*shape, Some(*out)),
                _ => continue,
            };
            let neighbor = |dir: Direction| {
                let n = dir.attempt_from(coord);
                n.in_bounds(self.dims).then_some(n)
            };
            let Some(both) = shape
                .connectors()
                .iter()
                .map(|&dir| neighbor(dir).map(|n| (dir, n)))
                .collect::<Option<Vec<_>>>()
            else {
                // a connector points off the grid; the border rule forbids
                // the symbol, no pairwise constraint needed
                continue;
            };

            let connected_back = match out {
                None => both
                    .iter()
                    .map(|&(dir, n)| self.connects(n, dir.opposite()))
                    .reduce(|a, b| a & b)
                    .unwrap(),
                Some(out) => both
                    .iter()
                    .map(|&(dir, n)| match dir == out {
                        // the outbound neighbor receives our flow
                        true => self.flow(n, dir.opposite(), false),
                        // the inbound neighbor sends flow toward us
                        false => self.flow(n, dir.opposite(), true),
                    })
                    .reduce(|a, b| a & b)
                    .unwrap(),
            };
            let shaped = connected_back.iff(self.is(coord, *symbol));
            session.require(shaped);

            // proofs travel along connections; only inbound ones when
            // directed
            let feeds: Vec<Coord> = both
                .iter()
                .filter(|&&(dir, _)| out != Some(dir))
                .map(|&(_, n)| n)
                .collect();
            let through = feeds
                .iter()
                .map(|n| self.atoms[n.as_index()].proven())
                .reduce(|a, b| a | b)
                .unwrap();
            let justification = self.loop_start[coord.as_index()].expr()
                | (self.is(coord, *symbol) & through);
            session.prove_if(self.atoms[coord.as_index()], justification);

            if let Some(loop_id) = &self.loop_id {
                let id = loop_id[coord.as_index()].expr();
                let same_id = both
                    .iter()
                    .map(|&(_, n)| id.clone().eq(&loop_id[n.as_index()]))
                    .reduce(|a, b| a & b)
                    .unwrap();
                session.require(same_id | !self.is(coord, *symbol));
            }
        }
    }

    fn border_rules(&self, session: &mut Session, coord: Coord) {
        for &dir in Direction::VARIANTS {
            if !dir.attempt_from(coord).in_bounds(self.dims) {
                let no_dangling = !self.connects(coord, dir);
                session.require(no_dangling);
            }
        }
    }

    /// No loop may enter any of `regions` more than once: per region (and
    /// per loop id, when several loops are allowed), the number of
    /// connectors crossing the region boundary must be below 3. Crossings
    /// of a closed curve come in pairs, so this allows exactly one pass.
    pub fn no_reentrance(&self, session: &mut Session, regions: &[Room]) {
        let ids: Vec<Option<i64>> = match &self.loop_id {
            Some(_) => (0..self.config.max_loops as i64).map(Some).collect(),
            None => vec![None],
        };
        for region in regions {
            for &id in &ids {
                let crossings: Vec<_> = region
                    .iter()
                    .flat_map(|&coord| {
                        Direction::VARIANTS.iter().filter_map(move |&dir| {
                            let n = dir.attempt_from(coord);
                            let outside = !n.in_bounds(self.dims) || !region.contains(&n);
                            outside.then_some((coord, dir))
                        })
                    })
                    .collect();
                let total = crossings
                    .into_iter()
                    .map(|(coord, dir)| {
                        let crossing = match id {
                            Some(id) => {
                                self.connects(coord, dir)
                                    & self.loop_id.as_ref().unwrap()[coord.as_index()]
                                        .expr()
                                        .eq(id)
                            }
                            None => self.connects(coord, dir),
                        };
                        crate::solver::IntExpr::cond(crossing, 1, 0)
                    })
                    .fold(crate::solver::IntExpr::Const(0), |acc, c| acc + c);
                session.require(total.lt(3));
            }
        }
    }

    /// Some loop passes through every region; with `every_loop`, every
    /// loop id passes through every region.
    pub fn hit_every_region(
        &self,
        session: &mut Session,
        regions: &[Room],
        every_loop: bool,
    ) {
        match (&self.loop_id, every_loop) {
            (Some(loop_id), true) => {
                for region in regions {
                    for id in 0..self.config.max_loops as i64 {
                        let members: Vec<BoolExpr> = region
                            .iter()
                            .map(|&coord| loop_id[coord.as_index()].expr().eq(id))
                            .collect();
                        let hit = session.at_least(1, &members);
                        session.require(hit);
                    }
                }
            }
            _ => {
                for region in regions {
                    let members: Vec<BoolExpr> =
                        region.iter().map(|&coord| !self.isolated(coord)).collect();
                    let hit = session.at_least(1, &members);
                    session.require(hit);
                }
            }
        }
    }

    /// Parity of left-pointing connectors in the column above `coord`;
    /// odd means the cell sits inside the loop.
    fn inside_parity(&self, coord: Coord) -> BoolExpr {
        (0..coord.row()).fold(BoolExpr::Const(false), |parity, row| {
            parity.ne(self.connects(Coord(row, coord.col()), Direction::Left))
        })
    }

    /// Force each of `coords` to be an empty cell lying inside the loop.
    pub fn inside(&self, session: &mut Session, coords: impl IntoIterator<Item = Coord>) {
        for coord in coords {
            session.require(self.isolated(coord));
            session.require(self.inside_parity(coord));
        }
    }

    /// Force each of `coords` to be an empty cell lying outside the loop.
    pub fn outside(&self, session: &mut Session, coords: impl IntoIterator<Item = Coord>) {
        for coord in coords {
            session.require(self.isolated(coord));
            session.require(!self.inside_parity(coord));
        }
    }

    /// Enumerate up to [`MAX_SOLUTIONS`] distinct symbol grids.
    pub fn solutions(&self, session: &mut Session) -> Vec<Array2<LoopSymbol>> {
        enumerate(
            session,
            |s| Array2::from_shape_fn(self.dims, |index| self.alphabet[self.grid[index].value(s)]),
            |s| crate::solver::all_of(self.grid.iter().map(|cell| cell.observed(s))),
            MAX_SOLUTIONS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::iter_coords;

    fn ring_2x2() -> Vec<(Coord, PieceShape)> {
        vec![
            (Coord(0, 0), PieceShape::DownRight),
            (Coord(0, 1), PieceShape::DownLeft),
            (Coord(1, 0), PieceShape::UpRight),
            (Coord(1, 1), PieceShape::UpLeft),
        ]
    }

    #[test]
    fn undirected_2x2_without_blanks_is_the_ring() {
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (2, 2), LoopConfig::default());
        solver.draw_loop(
            &mut session,
            &BTreeSet::new(),
            LoopRules { allow_blanks: false, ..Default::default() },
        );
        let solutions = solver.solutions(&mut session);
        assert_eq!(solutions.len(), 1);
        for (coord, shape) in ring_2x2() {
            assert_eq!(solutions[0][coord.as_index()], LoopSymbol::Und(shape));
        }
    }

    #[test]
    fn directed_2x2_without_blanks_has_both_orientations() {
        let mut session = Session::new();
        let solver = LoopSolver::new(
            &mut session,
            (2, 2),
            LoopConfig { directed: true, ..Default::default() },
        );
        solver.draw_loop(
            &mut session,
            &BTreeSet::new(),
            LoopRules { allow_blanks: false, ..Default::default() },
        );
        let solutions = solver.solutions(&mut session);
        // the same ring traversed clockwise and counterclockwise
        assert_eq!(solutions.len(), 2);
    }

    #[test]
    fn forced_cell_is_never_isolated() {
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (3, 3), LoopConfig::default());
        solver.draw_loop(&mut session, &BTreeSet::new(), LoopRules::default());
        session.require(!solver.isolated(Coord(1, 1)));
        let solutions = solver.solutions(&mut session);
        assert!(!solutions.is_empty());
        for solution in &solutions {
            assert!(!solution[Coord(1, 1).as_index()].is_isolated());
        }
    }

    #[test]
    fn every_solved_piece_has_degree_two() {
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (3, 3), LoopConfig::default());
        solver.draw_loop(&mut session, &BTreeSet::new(), LoopRules::default());
        for grid in solver.solutions(&mut session) {
            for coord in iter_coords((3, 3)) {
                let degree = match grid[coord.as_index()] {
                    LoopSymbol::Und(_) => 2,
                    _ => 0,
                };
                let connected_neighbors = crate::grid::neighbors((3, 3), coord)
                    .into_iter()
                    .filter(|n| !grid[n.as_index()].is_isolated())
                    .count();
                if degree == 2 {
                    assert!(connected_neighbors >= 2);
                }
            }
        }
    }

    #[test]
    fn clue_cell_stays_off_the_loop() {
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (3, 3), LoopConfig::default());
        let clues = BTreeSet::from([Coord(1, 1)]);
        solver.draw_loop(&mut session, &clues, LoopRules::default());
        for grid in solver.solutions(&mut session) {
            assert_eq!(grid[(1, 1)], LoopSymbol::Empty);
        }
    }

    #[test]
    fn center_of_3x3_can_be_inside_but_not_outside() {
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (3, 3), LoopConfig::default());
        solver.draw_loop(&mut session, &BTreeSet::new(), LoopRules::default());
        solver.inside(&mut session, [Coord(1, 1)]);
        assert!(session.solve());

        // every closed curve on a 3x3 grid surrounds the center
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (3, 3), LoopConfig::default());
        solver.draw_loop(&mut session, &BTreeSet::new(), LoopRules::default());
        solver.outside(&mut session, [Coord(1, 1)]);
        assert!(!session.solve());
    }

    #[test]
    fn reentrance_limit_counts_boundary_crossings() {
        let columns: Vec<Room> = (0..3)
            .map(|c| [Coord(0, c), Coord(1, c)].into_iter().collect())
            .collect();
        let rows: Vec<Room> = (0..2)
            .map(|r| (0..3).map(|c| Coord(r, c)).collect())
            .collect();

        // the ring around a 2x3 grid crosses the middle column 4 times
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (2, 3), LoopConfig::default());
        solver.draw_loop(
            &mut session,
            &BTreeSet::new(),
            LoopRules { allow_blanks: false, ..Default::default() },
        );
        solver.no_reentrance(&mut session, &columns);
        assert!(!session.solve());

        // but each row only twice
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (2, 3), LoopConfig::default());
        solver.draw_loop(
            &mut session,
            &BTreeSet::new(),
            LoopRules { allow_blanks: false, ..Default::default() },
        );
        solver.no_reentrance(&mut session, &rows);
        assert!(session.solve());
    }

    #[test]
    fn hit_every_region_forbids_the_empty_grid() {
        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (2, 2), LoopConfig::default());
        solver.draw_loop(&mut session, &BTreeSet::new(), LoopRules::default());
        let regions: Vec<Room> = vec![[Coord(0, 0)].into_iter().collect()];
        solver.hit_every_region(&mut session, &regions, false);
        assert!(session.solve());
        let held = solver.alphabet[solver.grid()[(0, 0)].value(&session)];
        assert!(!held.is_isolated());
    }

    fn two_rings_on_2x5(session: &mut Session) -> LoopSolver {
        // an empty middle column splits the grid, so two rings are the
        // only way to cover the remaining cells
        let solver = LoopSolver::new(
            session,
            (2, 5),
            LoopConfig { min_loops: 2, max_loops: 2, ..Default::default() },
        );
        let clues: BTreeSet<Coord> = [Coord(0, 2), Coord(1, 2)].into();
        solver.draw_loop(
            session,
            &clues,
            LoopRules { allow_blanks: false, ..Default::default() },
        );
        solver
    }

    #[test]
    fn two_loops_take_real_ids_and_isolated_cells_the_spare() {
        let mut session = Session::new();
        let solver = two_rings_on_2x5(&mut session);
        assert!(session.solve());
        let loop_id = solver.loop_id().unwrap();
        for coord in iter_coords((2, 5)) {
            let id = loop_id[coord.as_index()].value(&session);
            match coord.col() {
                2 => assert_eq!(id, 2),
                _ => assert!(id < 2),
            }
        }
    }

    #[test]
    fn hit_every_region_per_loop_forces_distinct_ids() {
        let mut session = Session::new();
        let solver = two_rings_on_2x5(&mut session);
        // each row touches both rings, so demanding every id in every
        // row splits the ids between the rings
        let rows: Vec<Room> = (0..2)
            .map(|r| (0..5).map(|c| Coord(r, c)).collect())
            .collect();
        solver.hit_every_region(&mut session, &rows, true);
        assert!(session.solve());
        let loop_id = solver.loop_id().unwrap();
        assert_ne!(
            loop_id[Coord(0, 0).as_index()].value(&session),
            loop_id[Coord(0, 4).as_index()].value(&session)
        );
    }

    #[test]
    fn reentrance_counts_crossings_per_loop_id() {
        // the ring around a 3x3 grid crosses the middle row four times
        let room: Room = [Coord(1, 0), Coord(1, 1), Coord(1, 2)].into();
        let clues: BTreeSet<Coord> = [Coord(1, 1)].into();
        let config = LoopConfig { min_loops: 1, max_loops: 2, ..Default::default() };
        let rules = LoopRules { allow_blanks: false, ..Default::default() };

        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (3, 3), config);
        solver.draw_loop(&mut session, &clues, rules);
        assert!(session.solve());

        let mut session = Session::new();
        let solver = LoopSolver::new(&mut session, (3, 3), config);
        solver.draw_loop(&mut session, &clues, rules);
        solver.no_reentrance(&mut session, &[room]);
        assert!(!session.solve());
    }

    #[test]
    #[should_panic]
    fn inverted_loop_bounds_are_rejected() {
        let mut session = Session::new();
        LoopSolver::new(
            &mut session,
            (2, 2),
            LoopConfig { min_loops: 2, max_loops: 1, ..Default::default() },
        );
    }
}
