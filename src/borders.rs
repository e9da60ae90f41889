//! Constraints for drawing borders along cell edges.
//!
//! Unlike the cell-based loop encoder, this one works in the dual graph:
//! one boolean "drawn" flag per canonical edge. A drawn edge needs exactly
//! one drawn edge among its in-neighbors and one among its out-neighbors,
//! which rules out dead ends and branches, and the usual proof-atom
//! machinery with chosen witnesses bounds the number of closed curves.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::edge::{all_edges, canonicalize, edge_neighbors, EdgeId};
use crate::grid::{Coord, Dims, Direction};
use crate::puzzle::InputError;
use crate::solutions::{enumerate, MAX_SOLUTIONS};
use crate::solver::{all_of, Atom, BoolExpr, BoolVar, IntVar, Session};
use strum::VariantArray;

/// Border constraints over the canonical edges of a rectangular grid.
pub struct BorderSolver {
    dims: Dims,
    drawn: BTreeMap<EdgeId, BoolVar>,
    atoms: BTreeMap<EdgeId, Atom>,
    chosen: BTreeMap<EdgeId, BoolVar>,
}

impl BorderSolver {
    /// Allocates a drawn and a chosen variable for every edge of a `dims` grid.
    pub fn new(session: &mut Session, dims: Dims) -> Self {
        let mut drawn = BTreeMap::new();
        let mut atoms = BTreeMap::new();
        let mut chosen = BTreeMap::new();
        for edge in all_edges(dims) {
            drawn.insert(edge, session.bool_var());
            atoms.insert(edge, session.atom());
            chosen.insert(edge, session.bool_var());
        }
        Self { dims, drawn, atoms, chosen }
    }

    /// The grid dimensions this solver was built for.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// "The edge referenced as `(coord, dir)` is drawn." The reference
    /// need not be canonical.
    pub fn drawn(&self, coord: Coord, dir: Direction) -> BoolExpr {
        self.drawn[&canonicalize(self.dims, coord, dir)].expr()
    }

    /// Wire up the drawn edges into between `min_loops` and `max_loops`
    /// simple closed curves.
    pub fn draw_loop(&self, session: &mut Session, min_loops: usize, max_loops: usize) {
        for (&edge, flag) in &self.drawn {
            let (ins, outs) = edge_neighbors(self.dims, edge.coord, edge.dir);

            let mut sides = BoolExpr::Const(true);
            for side in [&ins, &outs] {
                let shaded: Vec<BoolExpr> =
                    side.iter().map(|n| self.drawn[n].expr()).collect();
                sides = sides & session.exactly(1, &shaded);
            }
            session.require(sides | !flag.expr());

            for neighbor in ins.iter().chain(&outs) {
                let justification = (self.drawn[neighbor].expr()
                    & self.atoms[neighbor].proven())
                    | self.chosen[&edge].expr();
                session.prove_if(self.atoms[&edge], justification);
            }
            session.require(self.atoms[&edge].proven() | !flag.expr());
        }

        let witnesses: Vec<BoolExpr> =
            self.chosen.values().map(|flag| flag.expr()).collect();
        let enough = session.at_least(min_loops, &witnesses);
        session.require(enough);
        let not_too_many = session.at_most(max_loops, &witnesses);
        session.require(not_too_many);
    }

    /// Per clue cell, exactly the clued number of its four incident edges
    /// are drawn.
    pub fn clues(
        &self,
        session: &mut Session,
        clue_cells: &BTreeMap<Coord, usize>,
    ) -> Result<(), InputError> {
        for (&coord, &count) in clue_cells {
            if count > 4 {
                return Err(InputError::ClueOutOfRange { coord, value: count, max: 4 });
            }
            let incident: Vec<BoolExpr> = Direction::VARIANTS
                .iter()
                .map(|&dir| self.drawn(coord, dir))
                .collect();
            let satisfied = session.exactly(count, &incident);
            session.require(satisfied);
        }
        Ok(())
    }

    /// Parity of drawn vertical edges from the row start through the
    /// cell's own left edge; odd means the cell sits inside a loop.
    fn inside_parity(&self, coord: Coord) -> BoolExpr {
        (0..=coord.col()).fold(BoolExpr::Const(false), |parity, col| {
            parity.ne(self.drawn(Coord(coord.row(), col), Direction::Left))
        })
    }

    /// Force each of `cells` inside some loop.
    pub fn inside_loop(&self, session: &mut Session, cells: impl IntoIterator<Item = Coord>) {
        for coord in cells {
            session.require(self.inside_parity(coord));
        }
    }

    /// Force each of `cells` outside every loop.
    pub fn outside_loop(&self, session: &mut Session, cells: impl IntoIterator<Item = Coord>) {
        for coord in cells {
            session.require(!self.inside_parity(coord));
        }
    }

    /// Tie the edges to a region-id grid: every perimeter edge is drawn,
    /// and an interior edge is drawn iff the ids on its two sides differ.
    pub fn from_region_ids(&self, session: &mut Session, region_id: &Array2<IntVar>) {
        for (&edge, flag) in &self.drawn {
            match edge.separated_cells(self.dims) {
                None => session.require(flag.expr()),
                Some(pair) => {
                    let same = region_id[pair.0.as_index()]
                        .expr()
                        .eq(&region_id[pair.1.as_index()]);
                    session.require(flag.expr().ne(same));
                }
            }
        }
    }

    /// Enumerate up to [`MAX_SOLUTIONS`] distinct drawn-edge sets.
    pub fn solutions(&self, session: &mut Session) -> Vec<Vec<EdgeId>> {
        enumerate(
            session,
            |s| {
                self.drawn
                    .iter()
                    .filter(|(_, flag)| flag.value(s))
                    .map(|(&edge, _)| edge)
                    .collect()
            },
            |s| all_of(self.drawn.values().map(|flag| flag.observed(s))),
            MAX_SOLUTIONS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell_loop_draws_its_four_edges() {
        let mut session = Session::new();
        let solver = BorderSolver::new(&mut session, (1, 1));
        solver.draw_loop(&mut session, 1, 1);
        // one drawn edge forces the curve around the single cell closed
        session.require(solver.drawn(Coord(0, 0), Direction::Top));
        assert!(session.solve());
        for &dir in Direction::VARIANTS {
            let edge = canonicalize((1, 1), Coord(0, 0), dir);
            assert!(solver.drawn[&edge].value(&session));
        }
    }

    #[test]
    fn drawn_edges_never_dead_end() {
        let mut session = Session::new();
        let solver = BorderSolver::new(&mut session, (2, 2));
        solver.draw_loop(&mut session, 0, 1);
        // drawing a single edge leaves it without a closed curve
        session.require(solver.drawn(Coord(0, 0), Direction::Top));
        session.require(!solver.drawn(Coord(0, 0), Direction::Left));
        session.require(!solver.drawn(Coord(0, 1), Direction::Top));
        session.require(!solver.drawn(Coord(0, 0), Direction::Right));
        assert!(!session.solve());
    }

    #[test]
    fn clue_of_four_boxes_in_the_cell() {
        let mut session = Session::new();
        let solver = BorderSolver::new(&mut session, (2, 2));
        solver.draw_loop(&mut session, 1, 1);
        let clues = BTreeMap::from([(Coord(0, 0), 4usize)]);
        solver.clues(&mut session, &clues).unwrap();
        assert!(session.solve());
        for &dir in Direction::VARIANTS {
            let edge = canonicalize((2, 2), Coord(0, 0), dir);
            assert!(solver.drawn[&edge].value(&session));
        }
    }

    #[test]
    fn oversized_clue_is_rejected_before_solving() {
        let mut session = Session::new();
        let solver = BorderSolver::new(&mut session, (2, 2));
        let clues = BTreeMap::from([(Coord(0, 0), 5usize)]);
        assert!(matches!(
            solver.clues(&mut session, &clues),
            Err(InputError::ClueOutOfRange { .. })
        ));
    }

    #[test]
    fn inside_and_outside_are_mutually_exclusive() {
        let mut session = Session::new();
        let solver = BorderSolver::new(&mut session, (1, 2));
        solver.draw_loop(&mut session, 1, 1);
        solver.inside_loop(&mut session, [Coord(0, 0)]);
        solver.outside_loop(&mut session, [Coord(0, 1)]);
        assert!(session.solve());
        // the loop must box in exactly the left cell
        assert!(solver.drawn[&canonicalize((1, 2), Coord(0, 0), Direction::Right)]
            .value(&session));
    }

    #[test]
    fn region_ids_induce_their_borders() {
        let mut session = Session::new();
        let ids = Array2::from_shape_fn((1, 2), |(_, c)| {
            let var = session.int_var(0, 2);
            let fixed = var.expr().eq(c as i64);
            session.require(fixed);
            var
        });
        let solver = BorderSolver::new(&mut session, (1, 2));
        solver.from_region_ids(&mut session, &ids);
        assert!(session.solve());
        assert!(solver.drawn[&canonicalize((1, 2), Coord(0, 0), Direction::Right)]
            .value(&session));
        let solutions = solver.solutions(&mut session);
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].len(), 7);
    }
}
