use std::collections::VecDeque;

use super::grid::{Direction, TileCoord, TileGrid};
use super::overlay::PoiOverlay;
use super::walk::is_walkable;

/// Breadth-first shortest path from `start` to `goal`.
///
/// The returned route excludes `start` and includes `goal`; it is empty when
/// the two coincide inside the grid and `None` when either lies outside it.
/// Intermediate hops must be ground-class tiles, while the goal only has to be
/// walkable, so an overlay tile sitting on a wall can be reached but never
/// walked through.
pub fn find_path(
    grid: &TileGrid,
    overlay: &PoiOverlay,
    start: TileCoord,
    goal: TileCoord,
) -> Option<Vec<TileCoord>> {
    let start_index = grid.index_of(start)?;
    let goal_index = grid.index_of(goal)?;
    if start == goal {
        return Some(Vec::new());
    }
    if !is_walkable(grid, overlay, goal) {
        return None;
    }

    let mut visited = vec![false; grid.cell_count()];
    let mut parent = vec![None::<usize>; grid.cell_count()];
    let mut queue = VecDeque::new();
    visited[start_index] = true;
    queue.push_back(start_index);

    while let Some(current_index) = queue.pop_front() {
        let current = grid.coord_of(current_index);
        for direction in Direction::SEARCH_ORDER {
            let neighbor = current.step(direction);
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            if visited[neighbor_index] {
                continue;
            }
            if neighbor_index == goal_index {
                parent[neighbor_index] = Some(current_index);
                return reconstruct(grid, &parent, start_index, goal_index);
            }
            if !grid.is_ground_class(neighbor) {
                continue;
            }
            visited[neighbor_index] = true;
            parent[neighbor_index] = Some(current_index);
            queue.push_back(neighbor_index);
        }
    }

    None
}

/// Number of steps on the route `find_path` would return.
pub fn bfs_distance(
    grid: &TileGrid,
    overlay: &PoiOverlay,
    start: TileCoord,
    goal: TileCoord,
) -> Option<usize> {
    find_path(grid, overlay, start, goal).map(|path| path.len())
}

/// Count of ground-class tiles connected to `start`, including `start` when it
/// is itself ground-class.
pub fn reachable_from(grid: &TileGrid, start: TileCoord) -> usize {
    let Some(start_index) = grid.index_of(start) else {
        return 0;
    };
    if !grid.is_ground_class(start) {
        return 0;
    }

    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::from([start_index]);
    visited[start_index] = true;
    let mut count = 0usize;

    while let Some(index) = queue.pop_front() {
        count += 1;
        let current = grid.coord_of(index);
        for direction in Direction::SEARCH_ORDER {
            let neighbor = current.step(direction);
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            if visited[neighbor_index] || !grid.is_ground_class(neighbor) {
                continue;
            }
            visited[neighbor_index] = true;
            queue.push_back(neighbor_index);
        }
    }

    count
}

fn reconstruct(
    grid: &TileGrid,
    parent: &[Option<usize>],
    start_index: usize,
    goal_index: usize,
) -> Option<Vec<TileCoord>> {
    let mut cursor = goal_index;
    let mut path = vec![grid.coord_of(cursor)];
    while let Some(previous) = parent.get(cursor).copied().flatten() {
        if previous == start_index {
            path.reverse();
            return Some(path);
        }
        cursor = previous;
        path.push(grid.coord_of(cursor));
    }
    None
}
