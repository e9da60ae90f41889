//! Polyomino shapes and their symmetry orbits.
use std::collections::BTreeSet;

use crate::grid::{neighbors, Coord, Dims};

/// A polyomino as a list of `(row, col)` offsets.
///
/// The canonical form (see [`canonicalize`]) is sorted with the
/// lexicographically first offset translated to the origin; every function
/// in this module returns shapes in canonical form.
pub type Shape = Vec<(isize, isize)>;

/// Canonicalize a shape: sort its offsets, then translate so the first
/// offset is `(0, 0)`.
pub fn canonicalize(shape: impl IntoIterator<Item = (isize, isize)>) -> Shape {
    let mut cells: Vec<_> = shape.into_iter().collect();
    cells.sort_unstable();
    let (dy, dx) = cells.first().copied().unwrap_or((0, 0));
    cells.into_iter().map(|(y, x)| (y - dy, x - dx)).collect()
}

/// Rotate a shape 90 degrees.
pub fn rotate(shape: &Shape) -> Shape {
    canonicalize(shape.iter().map(|&(y, x)| (-x, y)))
}

/// Reflect a shape.
pub fn reflect(shape: &Shape) -> Shape {
    canonicalize(shape.iter().map(|&(y, x)| (-y, x)))
}

/// All canonical forms reachable from `shape` under the selected
/// transformations.
///
/// Fixed-point iteration: apply every selected transform to the set until
/// it stops growing. The symmetry group of a finite shape has at most 8
/// elements, so this terminates quickly.
pub fn variants(shape: &Shape, allow_rotations: bool, allow_reflections: bool) -> BTreeSet<Shape> {
    let mut transforms: Vec<fn(&Shape) -> Shape> = Vec::new();
    if allow_rotations {
        transforms.push(rotate);
    }
    if allow_reflections {
        transforms.push(reflect);
    }

    let mut result = BTreeSet::new();
    result.insert(canonicalize(shape.clone()));
    loop {
        let new_shapes: Vec<Shape> = transforms
            .iter()
            .flat_map(|f| result.iter().map(f))
            .collect();
        let before = result.len();
        result.extend(new_shapes);
        if result.len() == before {
            return result;
        }
    }
}

fn offset_from(anchor: Coord, offset: (isize, isize)) -> Option<(isize, isize)> {
    let y = anchor.0 as isize + offset.0;
    let x = anchor.1 as isize + offset.1;
    (y >= 0 && x >= 0).then_some((y, x))
}

/// Place `shape` with its first offset at `anchor`, returning the absolute
/// coordinates, or [`None`] if any cell would fall outside the grid.
pub fn place_in_grid(dims: Dims, shape: &Shape, anchor: Coord) -> Option<Vec<Coord>> {
    shape
        .iter()
        .map(|&off| {
            let (y, x) = offset_from(anchor, off)?;
            let coord = Coord(y as usize, x as usize);
            coord.in_bounds(dims).then_some(coord)
        })
        .collect()
}

/// Place `shape` with its first offset at `anchor`, returning the absolute
/// coordinates, or [`None`] if any cell would fall outside `cells`.
pub fn place_in_cells(
    cells: &BTreeSet<Coord>,
    shape: &Shape,
    anchor: Coord,
) -> Option<Vec<Coord>> {
    shape
        .iter()
        .map(|&off| {
            let (y, x) = offset_from(anchor, off)?;
            let coord = Coord(y as usize, x as usize);
            cells.contains(&coord).then_some(coord)
        })
        .collect()
}

/// The deduplicated grid neighbors of a placement, excluding the placement
/// itself.
pub fn adjacent_cells(dims: Dims, placement: &[Coord]) -> BTreeSet<Coord> {
    let mut out: BTreeSet<Coord> = placement
        .iter()
        .flat_map(|&coord| neighbors(dims, coord))
        .collect();
    for coord in placement {
        out.remove(coord);
    }
    out
}

/// Parse an ASCII picture into a canonical shape; any non-space character
/// is a cell.
pub fn shape_from_str(s: &str) -> Shape {
    canonicalize(s.lines().enumerate().flat_map(|(r, line)| {
        line.chars()
            .enumerate()
            .filter(|(_, ch)| !ch.is_whitespace())
            .map(move |(c, _)| (r as isize, c as isize))
    }))
}

/// The named tetrominoes, canonical.
pub fn tetromino(name: char) -> Option<Shape> {
    let cells: &[(isize, isize)] = match name {
        'T' => &[(0, 0), (1, 0), (1, 1), (2, 0)],
        'O' => &[(0, 0), (0, 1), (1, 0), (1, 1)],
        'I' => &[(0, 0), (1, 0), (2, 0), (3, 0)],
        'L' => &[(0, 0), (1, 0), (2, 0), (2, 1)],
        'S' => &[(0, 0), (0, 1), (1, 1), (1, 2)],
        _ => return None,
    };
    Some(canonicalize(cells.iter().copied()))
}

/// The named pentominoes, canonical.
pub fn pentomino(name: char) -> Option<Shape> {
    let cells: &[(isize, isize)] = match name {
        'F' => &[(0, 0), (0, 1), (1, -1), (1, 0), (2, 0)],
        'I' => &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
        'L' => &[(0, 0), (1, 0), (2, 0), (3, 0), (3, 1)],
        'N' => &[(0, 0), (0, 1), (1, 1), (1, 2), (1, 3)],
        'P' => &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)],
        'T' => &[(0, 0), (0, 1), (0, 2), (1, 1), (2, 1)],
        'U' => &[(0, 0), (0, 2), (1, 0), (1, 1), (1, 2)],
        'V' => &[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)],
        'W' => &[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)],
        'X' => &[(0, 0), (1, -1), (1, 0), (1, 1), (2, 0)],
        'Y' => &[(0, 0), (1, -1), (1, 0), (1, 1), (1, 2)],
        'Z' => &[(0, 0), (0, 1), (1, 1), (2, 1), (2, 2)],
        _ => return None,
    };
    Some(canonicalize(cells.iter().copied()))
}
