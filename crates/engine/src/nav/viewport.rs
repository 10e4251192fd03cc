use super::grid::TileCoord;

pub const DEFAULT_TILE_SIZE_PX: u32 = 32;
pub const DEFAULT_CLICK_SLOP_PX: f32 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEnd {
    /// Pointer released without travelling past the click slop.
    Click(Vec2),
    Drag,
    NoGesture,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    origin: Vec2,
    last: Vec2,
    exceeded_slop: bool,
}

/// Pan offset for a grid larger than its container. The offset is always in
/// `[min(container - grid, 0), 0]` per axis, which pins an axis to zero when
/// the grid fits.
#[derive(Debug, Clone)]
pub struct ViewportController {
    offset: Vec2,
    container: Vec2,
    grid_px: Vec2,
    tile_size_px: f32,
    click_slop_px: f32,
    drag: Option<DragState>,
}

impl ViewportController {
    pub fn new(cols: usize, rows: usize, tile_size_px: u32, click_slop_px: f32) -> Self {
        let tile_size_px = tile_size_px.max(1) as f32;
        Self {
            offset: Vec2::ZERO,
            container: Vec2::ZERO,
            grid_px: Vec2::new(cols as f32 * tile_size_px, rows as f32 * tile_size_px),
            tile_size_px,
            click_slop_px: click_slop_px.max(0.0),
            drag: None,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn grid_px(&self) -> Vec2 {
        self.grid_px
    }

    pub fn container(&self) -> Vec2 {
        self.container
    }

    pub fn tile_size_px(&self) -> f32 {
        self.tile_size_px
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Updates the container size and re-clamps the current offset. Returns
    /// true when the offset moved.
    pub fn set_container(&mut self, width: f32, height: f32) -> bool {
        self.container = Vec2::new(width.max(0.0), height.max(0.0));
        self.apply(self.offset)
    }

    pub fn pointer_down(&mut self, at: Vec2) {
        self.drag = Some(DragState {
            origin: at,
            last: at,
            exceeded_slop: false,
        });
    }

    /// Returns the new offset when the move panned the view.
    pub fn pointer_move(&mut self, at: Vec2) -> Option<Vec2> {
        let drag = self.drag.as_mut()?;
        let delta = Vec2::new(at.x - drag.last.x, at.y - drag.last.y);
        drag.last = at;
        let travelled_x = at.x - drag.origin.x;
        let travelled_y = at.y - drag.origin.y;
        if travelled_x.hypot(travelled_y) > self.click_slop_px {
            drag.exceeded_slop = true;
        }

        let proposed = Vec2::new(self.offset.x + delta.x, self.offset.y + delta.y);
        self.apply(proposed).then_some(self.offset)
    }

    pub fn pointer_up(&mut self, at: Vec2) -> GestureEnd {
        if self.drag.is_some() {
            self.pointer_move(at);
        }
        self.finish(true)
    }

    /// Leaving the surface ends the gesture without producing a click.
    pub fn pointer_leave(&mut self) -> GestureEnd {
        match self.finish(false) {
            GestureEnd::Click(_) => GestureEnd::NoGesture,
            other => other,
        }
    }

    pub fn touch_start(&mut self, at: Vec2) {
        self.pointer_down(at);
    }

    pub fn touch_move(&mut self, at: Vec2) -> Option<Vec2> {
        self.pointer_move(at)
    }

    /// Touch end carries no position; a tap resolves at the last known point.
    pub fn touch_end(&mut self) -> GestureEnd {
        self.finish(true)
    }

    pub fn screen_to_tile(&self, at: Vec2) -> Option<TileCoord> {
        let local_x = at.x - self.offset.x;
        let local_y = at.y - self.offset.y;
        if local_x < 0.0 || local_y < 0.0 || local_x >= self.grid_px.x || local_y >= self.grid_px.y
        {
            return None;
        }
        Some(TileCoord::new(
            (local_x / self.tile_size_px).floor() as i32,
            (local_y / self.tile_size_px).floor() as i32,
        ))
    }

    /// Top-left corner of `tile` in container pixels.
    pub fn tile_to_screen(&self, tile: TileCoord) -> Vec2 {
        Vec2::new(
            tile.x as f32 * self.tile_size_px + self.offset.x,
            tile.y as f32 * self.tile_size_px + self.offset.y,
        )
    }

    pub fn reset(&mut self) {
        self.drag = None;
        self.offset = Vec2::ZERO;
    }

    fn finish(&mut self, allow_click: bool) -> GestureEnd {
        match self.drag.take() {
            None => GestureEnd::NoGesture,
            Some(drag) if drag.exceeded_slop => GestureEnd::Drag,
            Some(drag) if allow_click => GestureEnd::Click(drag.last),
            Some(_) => GestureEnd::NoGesture,
        }
    }

    fn apply(&mut self, proposed: Vec2) -> bool {
        let next = Vec2::new(
            clamp_axis(proposed.x, self.container.x, self.grid_px.x),
            clamp_axis(proposed.y, self.container.y, self.grid_px.y),
        );
        let changed = next != self.offset;
        self.offset = next;
        changed
    }
}

fn clamp_axis(value: f32, container: f32, content: f32) -> f32 {
    let min = (container - content).min(0.0);
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(min, 0.0)
}
