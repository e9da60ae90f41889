//! Coordinates, dimensions, and the four cardinal directions.
use strum::VariantArray;

/// Grid dimensions as `(rows, cols)`.
pub type Dims = (usize, usize);

/// A cell position as `(row, col)`, used as a map key throughout the crate.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Coord(pub usize, pub usize);

impl Coord {
    /// The row of this coordinate.
    pub fn row(&self) -> usize {
        self.0
    }

    /// The column of this coordinate.
    pub fn col(&self) -> usize {
        self.1
    }

    pub(crate) fn as_index(&self) -> (usize, usize) {
        (self.0, self.1)
    }

    /// Offset by a signed `(d_row, d_col)` pair.
    ///
    /// Stepping off the top or left wraps around `usize`, which always fails
    /// the subsequent bounds check.
    pub fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// Whether this coordinate lies within a `dims`-sized grid.
    pub fn in_bounds(&self, dims: Dims) -> bool {
        self.0 < dims.0 && self.1 < dims.1
    }
}

impl From<(usize, usize)> for Coord {
    fn from(value: (usize, usize)) -> Self {
        Self(value.0, value.1)
    }
}

/// One of the four sides of a cell, doubling as a step direction.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Direction {
    /// Toward the previous column.
    Left,
    /// Toward the previous row.
    Top,
    /// Toward the next column.
    Right,
    /// Toward the next row.
    Bottom,
}

impl Direction {
    /// Attempt the step from `coord` in the direction specified by `self`.
    pub fn attempt_from(&self, coord: Coord) -> Coord {
        match self {
            Self::Left => coord.offset_by((0, -1)),
            Self::Top => coord.offset_by((-1, 0)),
            Self::Right => coord.offset_by((0, 1)),
            Self::Bottom => coord.offset_by((1, 0)),
        }
    }

    /// Invert the direction specified by `self`.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
        }
    }
}

/// The 90-degree neighbors of `coord` that exist in a `dims`-sized grid.
pub fn neighbors(dims: Dims, coord: Coord) -> Vec<Coord> {
    Direction::VARIANTS
        .iter()
        .map(|dir| dir.attempt_from(coord))
        .filter(|c| c.in_bounds(dims))
        .collect()
}

/// The surroundings (including diagonals) of `coord` that exist in a
/// `dims`-sized grid.
pub fn surroundings(dims: Dims, coord: Coord) -> Vec<Coord> {
    let mut out = Vec::with_capacity(8);
    for dr in -1..=1isize {
        for dc in -1..=1isize {
            if (dr, dc) == (0, 0) {
                continue;
            }
            let c = coord.offset_by((dr, dc));
            if c.in_bounds(dims) {
                out.push(c);
            }
        }
    }
    out
}

/// All coordinates of a `dims`-sized grid in row-major order.
pub fn iter_coords(dims: Dims) -> impl Iterator<Item = Coord> {
    (0..dims.0).flat_map(move |r| (0..dims.1).map(move |c| Coord(r, c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_counts() {
        assert_eq!(neighbors((3, 3), Coord(1, 1)).len(), 4);
        assert_eq!(neighbors((3, 3), Coord(0, 0)).len(), 2);
        assert_eq!(neighbors((3, 3), Coord(0, 1)).len(), 3);
        assert_eq!(neighbors((1, 1), Coord(0, 0)).len(), 0);
    }

    #[test]
    fn surrounding_counts() {
        assert_eq!(surroundings((3, 3), Coord(1, 1)).len(), 8);
        assert_eq!(surroundings((3, 3), Coord(0, 0)).len(), 3);
        assert_eq!(surroundings((3, 3), Coord(2, 1)).len(), 5);
    }

    #[test]
    fn stepping_off_grid_is_out_of_bounds() {
        let stepped = Direction::Top.attempt_from(Coord(0, 4));
        assert!(!stepped.in_bounds((5, 5)));
        let stepped = Direction::Left.attempt_from(Coord(4, 0));
        assert!(!stepped.in_bounds((5, 5)));
    }

    #[test]
    fn row_major_iteration() {
        let coords: Vec<_> = iter_coords((2, 2)).collect();
        assert_eq!(coords, vec![Coord(0, 0), Coord(0, 1), Coord(1, 0), Coord(1, 1)]);
    }
}
