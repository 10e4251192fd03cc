use super::grid::{TileCoord, TileGrid};
use super::overlay::PoiOverlay;

/// A coordinate is walkable when it is inside the grid and either carries a
/// ground-class tile or hosts a point of interest. Overlay presence wins over
/// the underlying tile code.
pub fn is_walkable(grid: &TileGrid, overlay: &PoiOverlay, coord: TileCoord) -> bool {
    match grid.tile_at(coord) {
        None => false,
        Some(kind) => kind.is_ground_class() || overlay.contains(coord),
    }
}
