use crate::nav::Vec2;

use super::transform::Viewport;

pub(crate) const ORBIT_MARGIN_X: i32 = 48;
pub(crate) const ORBIT_LIST_TOP: i32 = 120;
pub(crate) const ORBIT_ROW_HEIGHT: i32 = 72;
pub(crate) const ORBIT_ROW_GAP: i32 = 12;
pub(crate) const CLOSE_BUTTON_SIZE: i32 = 36;
pub(crate) const CLOSE_BUTTON_MARGIN: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub(crate) fn contains(self, point: Vec2) -> bool {
        point.x >= self.x as f32
            && point.y >= self.y as f32
            && point.x < (self.x + self.width) as f32
            && point.y < (self.y + self.height) as f32
    }
}

pub(crate) fn orbit_row_rect(index: usize, viewport: Viewport) -> ScreenRect {
    ScreenRect {
        x: ORBIT_MARGIN_X,
        y: ORBIT_LIST_TOP + index as i32 * (ORBIT_ROW_HEIGHT + ORBIT_ROW_GAP),
        width: (viewport.width as i32 - ORBIT_MARGIN_X * 2).max(1),
        height: ORBIT_ROW_HEIGHT,
    }
}

/// Index of the orbit entry under `point`, if any. Gaps between rows hit
/// nothing.
pub fn orbit_row_at(point: Vec2, viewport: Viewport, count: usize) -> Option<usize> {
    (0..count).find(|index| orbit_row_rect(*index, viewport).contains(point))
}

/// Top-right button of the world view. It closes the open panel, or leaves
/// the world when none is open.
pub(crate) fn close_button_rect(viewport: Viewport) -> ScreenRect {
    ScreenRect {
        x: (viewport.width as i32 - CLOSE_BUTTON_MARGIN - CLOSE_BUTTON_SIZE).max(0),
        y: CLOSE_BUTTON_MARGIN,
        width: CLOSE_BUTTON_SIZE,
        height: CLOSE_BUTTON_SIZE,
    }
}

pub fn close_button_at(point: Vec2, viewport: Viewport) -> bool {
    close_button_rect(viewport).contains(point)
}

/// Centered modal box, at most `max_width` wide and never wider than the
/// viewport minus a margin.
pub(crate) fn centered_panel_rect(viewport: Viewport, max_width: i32, height: i32) -> ScreenRect {
    let margin = 16;
    let width = max_width.min(viewport.width as i32 - margin * 2).max(1);
    let height = height.min(viewport.height as i32 - margin * 2).max(1);
    ScreenRect {
        x: (viewport.width as i32 - width) / 2,
        y: (viewport.height as i32 - height) / 2,
        width,
        height,
    }
}
