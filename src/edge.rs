//! Cell-edge identifiers and adjacency on the grid graph.
use unordered_pair::UnorderedPair;

use crate::grid::{Coord, Dims, Direction};

/// The canonical identity of one wall/border position of the grid.
///
/// Every interior edge can be referenced from either adjacent cell; the
/// canonical form always uses the `Left`/`Top` reference, except on the
/// right and bottom grid perimeter where no such reference exists and the
/// `Right`/`Bottom` form is kept instead. [`canonicalize`] maps any
/// reference to this form.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeId {
    /// The cell this edge is referenced from.
    pub coord: Coord,
    /// The side of that cell.
    pub dir: Direction,
}

impl EdgeId {
    /// The displayable position of this edge on the doubled lattice, where
    /// cell `(r, c)` sits at `(2r+1, 2c+1)` and edges occupy the positions
    /// with exactly one even component.
    pub fn border_coord(&self) -> (usize, usize) {
        let Coord(r, c) = self.coord;
        match self.dir {
            Direction::Top => (2 * r, 2 * c + 1),
            Direction::Left => (2 * r + 1, 2 * c),
            Direction::Bottom => (2 * (r + 1), 2 * c + 1),
            Direction::Right => (2 * r + 1, 2 * (c + 1)),
        }
    }

    /// Parse a doubled-lattice border position back into a canonical edge.
    ///
    /// Inverse of [`EdgeId::border_coord`] for all edges of a `dims`-sized
    /// grid.
    pub fn from_border_coord(dims: Dims, pos: (usize, usize)) -> Self {
        let (rows, cols) = dims;
        let (i, j) = pos;
        if j % 2 == 0 {
            // vertical edge
            if j / 2 == cols {
                Self { coord: Coord(i / 2, cols - 1), dir: Direction::Right }
            } else {
                Self { coord: Coord(i / 2, j / 2), dir: Direction::Left }
            }
        } else if i / 2 == rows {
            Self { coord: Coord(rows - 1, j / 2), dir: Direction::Bottom }
        } else {
            Self { coord: Coord(i / 2, j / 2), dir: Direction::Top }
        }
    }

    /// The pair of grid cells this edge separates, or [`None`] for a
    /// perimeter edge, which has a cell on only one side.
    pub fn separated_cells(&self, dims: Dims) -> Option<UnorderedPair<Coord>> {
        let other = self.dir.attempt_from(self.coord);
        (self.coord.in_bounds(dims) && other.in_bounds(dims))
            .then(|| UnorderedPair(self.coord, other))
    }
}

/// Map a possibly non-canonical `(coord, dir)` edge reference to its
/// canonical [`EdgeId`].
///
/// Total over all coordinates and idempotent: canonical references map to
/// themselves.
pub fn canonicalize(dims: Dims, coord: Coord, dir: Direction) -> EdgeId {
    let (rows, cols) = dims;
    let Coord(r, c) = coord;
    match dir {
        Direction::Left | Direction::Top => EdgeId { coord, dir },
        Direction::Right => {
            if c == cols - 1 {
                EdgeId { coord, dir }
            } else {
                EdgeId { coord: Coord(r, c + 1), dir: Direction::Left }
            }
        }
        Direction::Bottom => {
            if r == rows - 1 {
                EdgeId { coord, dir }
            } else {
                EdgeId { coord: Coord(r + 1, c), dir: Direction::Top }
            }
        }
    }
}

/// All canonical edges of a `dims`-sized grid, row-major.
pub fn all_edges(dims: Dims) -> Vec<EdgeId> {
    let (rows, cols) = dims;
    let mut out = Vec::with_capacity(2 * rows * cols + rows + cols);
    for r in 0..rows {
        for c in 0..cols {
            out.push(EdgeId { coord: Coord(r, c), dir: Direction::Left });
            out.push(EdgeId { coord: Coord(r, c), dir: Direction::Top });
            if r == rows - 1 {
                out.push(EdgeId { coord: Coord(r, c), dir: Direction::Bottom });
            }
            if c == cols - 1 {
                out.push(EdgeId { coord: Coord(r, c), dir: Direction::Right });
            }
        }
    }
    out
}

/// The canonical edges meeting the two endpoint corners of an edge, split
/// into `(in_neighbors, out_neighbors)`.
///
/// The "in" side is the topmost/leftmost endpoint of the edge and the "out"
/// side the bottommost/rightmost one. The border-drawing encoder treats a
/// drawn border as a directed loop in this dual graph even though physical
/// borders are undirected; the split is what makes that orientation
/// possible. Only edges that exist for the given grid dimensions are
/// returned, so each list holds at most three entries.
pub fn edge_neighbors(
    dims: Dims,
    coord: Coord,
    dir: Direction,
) -> (Vec<EdgeId>, Vec<EdgeId>) {
    let Coord(r, c) = coord;
    // candidate references, possibly off-grid; offset_by wraps below zero
    // and the bounds filter drops those
    let refs = |candidates: [(Coord, Direction); 3]| {
        candidates
            .into_iter()
            .map(|(coord, dir)| canonicalize(dims, coord, dir))
            .filter(|e| e.coord.in_bounds(dims))
            .collect::<Vec<_>>()
    };
    let left = |coord: Coord| coord.offset_by((0, -1));
    let up = |coord: Coord| coord.offset_by((-1, 0));

    match dir {
        Direction::Left => (
            refs([
                (left(coord), Direction::Top),
                (coord, Direction::Top),
                (up(coord), Direction::Left),
            ]),
            refs([
                (left(coord), Direction::Bottom),
                (coord, Direction::Bottom),
                (Coord(r + 1, c), Direction::Left),
            ]),
        ),
        Direction::Top => (
            refs([
                (up(coord), Direction::Left),
                (coord, Direction::Left),
                (left(coord), Direction::Top),
            ]),
            refs([
                (up(coord), Direction::Right),
                (coord, Direction::Right),
                (Coord(r, c + 1), Direction::Top),
            ]),
        ),
        Direction::Right => (
            refs([
                (coord, Direction::Top),
                (Coord(r, c + 1), Direction::Top),
                (up(coord), Direction::Right),
            ]),
            refs([
                (coord, Direction::Bottom),
                (Coord(r, c + 1), Direction::Bottom),
                (Coord(r + 1, c), Direction::Right),
            ]),
        ),
        Direction::Bottom => (
            refs([
                (coord, Direction::Left),
                (Coord(r + 1, c), Direction::Left),
                (left(coord), Direction::Bottom),
            ]),
            refs([
                (coord, Direction::Right),
                (Coord(r + 1, c), Direction::Right),
                (Coord(r, c + 1), Direction::Bottom),
            ]),
        ),
    }
}
