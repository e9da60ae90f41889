//! Decomposing a walled grid into rooms.
use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use thiserror::Error;
use tracing::debug;

use crate::edge::{canonicalize, EdgeId};
use crate::grid::{iter_coords, Coord, Dims, Direction};

/// A maximal set of cells mutually reachable without crossing a wall.
pub type Room = BTreeSet<Coord>;

/// Structural problems with a declared wall set.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RoomError {
    /// A wall claims to separate two cells that end up in the same room,
    /// so the wall has no effect. Several puzzle families depend on every
    /// declared wall being load-bearing, so this is rejected up front.
    #[error("wall at {0:?} does not separate its two cells")]
    DanglingEdge(EdgeId),
}

fn cell_graph(dims: Dims, walls: &HashSet<EdgeId>) -> UnGraphMap<Coord, ()> {
    let (rows, cols) = dims;
    let mut graph = UnGraphMap::with_capacity(
        rows * cols,
        rows.saturating_sub(1) * cols + cols.saturating_sub(1) * rows,
    );
    for coord in iter_coords(dims) {
        graph.add_node(coord);
        // add edges down and to the right, skipping wall-separated pairs
        for dir in [Direction::Right, Direction::Bottom] {
            let other = dir.attempt_from(coord);
            if other.in_bounds(dims) && !walls.contains(&canonicalize(dims, coord, dir)) {
                graph.add_edge(coord, other, ());
            }
        }
    }
    graph
}

/// Partition a `dims`-sized grid into [`Room`]s by flood fill bounded by
/// the wall set.
///
/// The returned rooms are pairwise disjoint and their union is the full
/// coordinate space. Fails with [`RoomError::DanglingEdge`] if any wall
/// fails to actually separate the two cells it lies between.
pub fn decompose(dims: Dims, walls: &HashSet<EdgeId>) -> Result<Vec<Room>, RoomError> {
    let graph = cell_graph(dims, walls);
    let mut rooms: Vec<Room> = Vec::new();
    let mut seen: HashSet<Coord> = HashSet::new();

    for start in iter_coords(dims) {
        if seen.contains(&start) {
            continue;
        }
        let mut room = Room::new();
        let mut bfs = Bfs::new(&graph, start);
        while let Some(coord) = bfs.next(&graph) {
            seen.insert(coord);
            room.insert(coord);
        }
        rooms.push(room);
    }
    debug!(rooms = rooms.len(), walls = walls.len(), "grid decomposed");

    // every interior wall must be load-bearing
    for wall in walls {
        if let Some(pair) = wall.separated_cells(dims) {
            let room = rooms
                .iter()
                .find(|room| room.contains(&pair.0))
                .unwrap_or_else(|| unreachable!("rooms cover the grid"));
            if room.contains(&pair.1) {
                return Err(RoomError::DanglingEdge(*wall));
            }
        }
    }

    Ok(rooms)
}

/// Like [`decompose`], but return the room enclosing each clue cell.
///
/// Rooms containing no clue are dropped; a room containing several clues
/// appears once per clue.
pub fn clue_rooms<V>(
    dims: Dims,
    walls: &HashSet<EdgeId>,
    clues: &HashMap<Coord, V>,
) -> Result<HashMap<Coord, Room>, RoomError> {
    let rooms = decompose(dims, walls)?;
    Ok(clues
        .keys()
        .filter_map(|clue| {
            rooms
                .iter()
                .find(|room| room.contains(clue))
                .map(|room| (*clue, room.clone()))
        })
        .collect())
}
