#![warn(missing_docs)]

//! # `pencilmark`
//!
//! Constraint encodings for Nikoli-style grid logic puzzles: loop drawing
//! (Slitherlink, Masyu and friends), region partitioning (Fillomino,
//! Shikaku), shading (Nurikabe, Hitori) and border drawing, solved by
//! reduction to Boolean satisfiability.
//!
//! A puzzle front end builds a [`PuzzleInput`], opens a [`Session`], and
//! instantiates the encoder matching its puzzle family: the
//! [`shading`], [`loops`], [`regions`], [`borders`] or [`numbers`]
//! module. Each encoder exposes its variable grid so puzzle-specific
//! rules can be layered on top, then `solutions()` enumerates distinct
//! answers through [`solutions::enumerate`].
//!
//! # Internals
//! Structural rules with global reach are reduced to local form so the
//! encoding stays linear in grid size:
//!
//! 1. Loops never dangle because every loop symbol is pairwise matched
//!    against its neighbors' connectors; a closed curve is the only shape
//!    degree-two pieces can form.
//! 2. Connectivity is encoded with monotone proof atoms: a cell's atom
//!    becomes provable only through an already-proven neighbor, levels
//!    forbid circular proofs, and requiring the atom forces a real path
//!    to a witness. No transitive closure is ever materialized.
//! 3. Region sizes come from counting along a spanning forest of parent
//!    pointers rather than enumerating region members.
//!
//! The [`solver`] module lowers the resulting variables and expressions
//! to CNF and hands them to [`varisat`].

pub use grid::{Coord, Dims, Direction};
pub use puzzle::{Clue, InputError, PuzzleInput};
pub use solver::Session;

pub mod borders;
pub mod edge;
pub mod grid;
pub mod loops;
pub mod numbers;
pub mod puzzle;
pub mod regions;
pub mod rooms;
pub mod shading;
pub mod shapes;
pub mod solutions;
pub mod solver;
