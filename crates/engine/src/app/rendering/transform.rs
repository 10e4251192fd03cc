use crate::nav::{TileCoord, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Inclusive tile range that intersects the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TileRange {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileRange {
    pub(crate) fn tiles(self) -> impl Iterator<Item = TileCoord> {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| TileCoord::new(x, y)))
    }
}

/// Top-left pixel of `tile` once the pan offset is applied.
pub fn tile_to_screen_px(tile: TileCoord, offset: Vec2, tile_size_px: f32) -> (i32, i32) {
    let x = tile.x as f32 * tile_size_px + offset.x;
    let y = tile.y as f32 * tile_size_px + offset.y;
    (x.round() as i32, y.round() as i32)
}

pub(crate) fn visible_tile_range(
    offset: Vec2,
    tile_size_px: f32,
    viewport: Viewport,
    cols: usize,
    rows: usize,
) -> Option<TileRange> {
    if cols == 0 || rows == 0 || viewport.width == 0 || viewport.height == 0 {
        return None;
    }
    let tile = tile_size_px.max(1.0);
    let min_x = ((-offset.x) / tile).floor() as i32;
    let min_y = ((-offset.y) / tile).floor() as i32;
    let max_x = ((viewport.width as f32 - offset.x) / tile).ceil() as i32 - 1;
    let max_y = ((viewport.height as f32 - offset.y) / tile).ceil() as i32 - 1;

    let range = TileRange {
        min_x: min_x.max(0),
        min_y: min_y.max(0),
        max_x: max_x.min(cols as i32 - 1),
        max_y: max_y.min(rows as i32 - 1),
    };
    (range.min_x <= range.max_x && range.min_y <= range.max_y).then_some(range)
}
