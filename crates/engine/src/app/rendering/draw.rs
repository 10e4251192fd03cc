//! Clipped pixel primitives over an RGBA8 frame buffer.

pub(crate) fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    width: usize,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    let Some(range) = pixel_range(frame.len(), width, x, y) else {
        return;
    };
    frame[range].copy_from_slice(&color);
}

/// Source-over blend using the alpha channel of `color`.
pub(crate) fn blend_pixel_rgba_clipped(
    frame: &mut [u8],
    width: usize,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    let Some(range) = pixel_range(frame.len(), width, x, y) else {
        return;
    };
    let alpha = u32::from(color[3]);
    let inverse = 255 - alpha;
    let pixel = &mut frame[range];
    for channel in 0..3 {
        let blended = (u32::from(color[channel]) * alpha + u32::from(pixel[channel]) * inverse) / 255;
        pixel[channel] = blended as u8;
    }
    pixel[3] = 255;
}

fn pixel_range(frame_len: usize, width: usize, x: i32, y: i32) -> Option<std::ops::Range<usize>> {
    if x < 0 || y < 0 || x as usize >= width {
        return None;
    }
    let pixel_offset = (y as usize).checked_mul(width)?.checked_add(x as usize)?;
    let start = pixel_offset.checked_mul(4)?;
    let end = start.checked_add(4)?;
    (end <= frame_len).then_some(start..end)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_filled_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: [u8; 4],
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(width as i32);
    let end_y = y.saturating_add(rect_height).min(height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }

    let opaque = color[3] == 255;
    for py in start_y..end_y {
        for px in start_x..end_x {
            if opaque {
                write_pixel_rgba_clipped(frame, width as usize, px, py, color);
            } else {
                blend_pixel_rgba_clipped(frame, width as usize, px, py, color);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    thickness: i32,
    color: [u8; 4],
) {
    if rect_width <= 1 || rect_height <= 1 || thickness <= 0 {
        return;
    }
    let t = thickness.min(rect_width / 2).min(rect_height / 2).max(1);
    draw_filled_rect(frame, width, height, x, y, rect_width, t, color);
    draw_filled_rect(
        frame,
        width,
        height,
        x,
        y + rect_height - t,
        rect_width,
        t,
        color,
    );
    draw_filled_rect(frame, width, height, x, y, t, rect_height, color);
    draw_filled_rect(
        frame,
        width,
        height,
        x + rect_width - t,
        y,
        t,
        rect_height,
        color,
    );
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}
