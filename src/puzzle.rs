//! Structured puzzle input handed to the encoders.
//!
//! Parsing a serialized puzzle is up to the caller; this module only
//! defines the structured form and validates it against the grid before
//! any constraint is built.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::edge::{canonicalize, EdgeId};
use crate::grid::{Coord, Dims, Direction};
use crate::rooms::{clue_rooms, decompose, Room, RoomError};

/// Problems with a puzzle's input, all detected before any solve attempt.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum InputError {
    /// A clue string that is neither a number, a blank, `?`, nor a single
    /// letter.
    #[error("unrecognized clue value {0:?}")]
    InvalidClue(String),
    /// A clue placed outside the grid.
    #[error("clue at {0:?} lies outside the grid")]
    ClueOutsideGrid(Coord),
    /// A clue value exceeding what the structure can accommodate.
    #[error("clue at {coord:?} asks for {value}, but at most {max} is possible")]
    ClueOutOfRange { coord: Coord, value: usize, max: usize },
    /// A wall whose edge does not exist on this grid.
    #[error("wall at {0:?} lies outside the grid")]
    WallOutsideGrid(EdgeId),
    /// An outside clue indexed past the side it annotates.
    #[error("outside clue index {index} on a side of length {len}")]
    OutsideClueOutOfRange { index: usize, len: usize },
    /// The wall set failed room decomposition.
    #[error(transparent)]
    Rooms(#[from] RoomError),
}

/// One clue cell's value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Clue {
    /// A numeric clue.
    Number(i64),
    /// A single-letter clue.
    Letter(char),
    /// An explicit `?`, constraining structure but not value.
    Unknown,
    /// A clue marker with no value at all.
    Empty,
}

impl Clue {
    /// Interpret a raw clue string.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        // digits only; no sign, so "-3" is malformed rather than negative
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw
                .parse::<i64>()
                .map(Clue::Number)
                .map_err(|_| InputError::InvalidClue(raw.to_owned()));
        }
        match raw {
            "" => Ok(Clue::Empty),
            "?" => Ok(Clue::Unknown),
            _ => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_alphabetic() => Ok(Clue::Letter(c)),
                    _ => Err(InputError::InvalidClue(raw.to_owned())),
                }
            }
        }
    }

    /// The numeric value, if this is a number clue.
    pub fn number(&self) -> Option<i64> {
        match self {
            Clue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A structured puzzle: dimensions, clue cells, declared walls, and
/// optional outside clues along each side.
#[derive(Clone, Debug, Default)]
pub struct PuzzleInput {
    /// Grid dimensions as `(rows, cols)`.
    pub dims: Dims,
    /// Clue cells and their values.
    pub clues: HashMap<Coord, Clue>,
    /// Declared walls, in canonical edge form.
    pub walls: HashSet<EdgeId>,
    /// Outside clues above each column.
    pub top_clues: HashMap<usize, Clue>,
    /// Outside clues right of each row.
    pub right_clues: HashMap<usize, Clue>,
    /// Outside clues below each column.
    pub bottom_clues: HashMap<usize, Clue>,
    /// Outside clues left of each row.
    pub left_clues: HashMap<usize, Clue>,
}

impl PuzzleInput {
    /// An empty input over a `dims` grid.
    pub fn new(dims: Dims) -> Self {
        Self { dims, ..Default::default() }
    }

    /// Add the full grid perimeter to the wall set. Inputs that carry
    /// borders usually imply it rather than listing every perimeter edge.
    pub fn add_perimeter_walls(&mut self) {
        let (rows, cols) = self.dims;
        for r in 0..rows {
            self.walls.insert(canonicalize(self.dims, Coord(r, 0), Direction::Left));
            self.walls
                .insert(canonicalize(self.dims, Coord(r, cols - 1), Direction::Right));
        }
        for c in 0..cols {
            self.walls.insert(canonicalize(self.dims, Coord(0, c), Direction::Top));
            self.walls
                .insert(canonicalize(self.dims, Coord(rows - 1, c), Direction::Bottom));
        }
    }

    /// Check every coordinate and index against the grid dimensions.
    pub fn validate(&self) -> Result<(), InputError> {
        let (rows, cols) = self.dims;
        for coord in self.clues.keys() {
            if !coord.in_bounds(self.dims) {
                return Err(InputError::ClueOutsideGrid(*coord));
            }
        }
        for wall in &self.walls {
            // Left/Top anywhere on the grid, Right/Bottom only along the
            // far perimeter; anything else is non-canonical
            let canonical = match wall.dir {
                Direction::Left | Direction::Top => wall.coord.in_bounds(self.dims),
                Direction::Right => wall.coord.row() < rows && wall.coord.col() == cols - 1,
                Direction::Bottom => wall.coord.row() == rows - 1 && wall.coord.col() < cols,
            };
            if !canonical {
                return Err(InputError::WallOutsideGrid(*wall));
            }
        }
        for (side, len) in [
            (&self.top_clues, cols),
            (&self.bottom_clues, cols),
            (&self.left_clues, rows),
            (&self.right_clues, rows),
        ] {
            if let Some(&index) = side.keys().find(|&&index| index >= len) {
                return Err(InputError::OutsideClueOutOfRange { index, len });
            }
        }
        Ok(())
    }

    /// The rooms the wall set cuts the grid into.
    pub fn rooms(&self) -> Result<Vec<Room>, InputError> {
        Ok(decompose(self.dims, &self.walls)?)
    }

    /// The room enclosing each clue cell.
    pub fn clue_rooms(&self) -> Result<HashMap<Coord, Room>, InputError> {
        Ok(clue_rooms(self.dims, &self.walls, &self.clues)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clue_parsing() {
        assert_eq!(Clue::parse("7"), Ok(Clue::Number(7)));
        assert_eq!(Clue::parse("12"), Ok(Clue::Number(12)));
        assert_eq!(Clue::parse(""), Ok(Clue::Empty));
        assert_eq!(Clue::parse("?"), Ok(Clue::Unknown));
        assert_eq!(Clue::parse("W"), Ok(Clue::Letter('W')));
        assert!(matches!(Clue::parse("??"), Err(InputError::InvalidClue(_))));
    }

    #[test]
    fn signed_clue_text_is_rejected() {
        assert!(matches!(Clue::parse("-3"), Err(InputError::InvalidClue(_))));
        assert!(matches!(Clue::parse("+3"), Err(InputError::InvalidClue(_))));
        assert_eq!(Clue::parse("007"), Ok(Clue::Number(7)));
    }

    #[test]
    fn validation_catches_out_of_bounds() {
        let mut input = PuzzleInput::new((2, 2));
        input.clues.insert(Coord(0, 0), Clue::Number(1));
        assert_eq!(input.validate(), Ok(()));

        input.clues.insert(Coord(2, 0), Clue::Number(1));
        assert!(matches!(input.validate(), Err(InputError::ClueOutsideGrid(_))));
    }

    #[test]
    fn validation_requires_canonical_walls() {
        let mut input = PuzzleInput::new((2, 2));
        input.walls.insert(canonicalize((2, 2), Coord(1, 1), Direction::Top));
        assert_eq!(input.validate(), Ok(()));

        input.walls.insert(EdgeId { coord: Coord(0, 5), dir: Direction::Left });
        assert!(matches!(input.validate(), Err(InputError::WallOutsideGrid(_))));
    }

    #[test]
    fn outside_clue_indices_are_bounded() {
        let mut input = PuzzleInput::new((2, 3));
        input.top_clues.insert(2, Clue::Number(1));
        assert_eq!(input.validate(), Ok(()));
        input.left_clues.insert(2, Clue::Number(1));
        assert!(matches!(
            input.validate(),
            Err(InputError::OutsideClueOutOfRange { .. })
        ));
    }

    #[test]
    fn perimeter_walls_keep_one_room() {
        let mut input = PuzzleInput::new((2, 2));
        input.add_perimeter_walls();
        let rooms = input.rooms().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].len(), 4);
    }
}
