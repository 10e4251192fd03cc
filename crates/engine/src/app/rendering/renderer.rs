use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{LoopMetricsSnapshot, OrbitView, SceneView, WorldView};
use crate::asset_keys::resolve_asset_path;
use crate::nav::{ContentEntry, TileKind};

use super::draw::{clear, draw_filled_rect, draw_rect_outline};
use super::layout::{
    centered_panel_rect, close_button_rect, orbit_row_rect, ScreenRect, ORBIT_MARGIN_X,
};
use super::text::{draw_text, glyph_advance, line_advance, printable_text, text_width_px, wrap_text};
use super::transform::{tile_to_screen_px, visible_tile_range, Viewport};

const CLEAR_COLOR_WORLD: [u8; 4] = [14, 16, 24, 255];
const CLEAR_COLOR_ORBIT: [u8; 4] = [8, 10, 22, 255];
const TILE_WALL_COLOR: [u8; 4] = [38, 44, 58, 255];
const TILE_GROUND_COLOR: [u8; 4] = [74, 112, 56, 255];
const TILE_PATH_COLOR: [u8; 4] = [140, 112, 72, 255];
const TILE_SEAM_COLOR: [u8; 4] = [0, 0, 0, 40];
const ROUTE_COLOR: [u8; 4] = [255, 236, 120, 255];
const POI_COLOR: [u8; 4] = [255, 170, 60, 255];
const POI_NEARBY_COLOR: [u8; 4] = [255, 240, 200, 255];
const PLAYER_COLOR: [u8; 4] = [80, 200, 255, 255];
const PLAYER_OUTLINE_COLOR: [u8; 4] = [240, 250, 255, 255];
const HUD_BG_COLOR: [u8; 4] = [8, 10, 14, 190];
const PANEL_BACKDROP_COLOR: [u8; 4] = [0, 0, 0, 140];
const PANEL_BG_COLOR: [u8; 4] = [18, 22, 32, 240];
const PANEL_BORDER_COLOR: [u8; 4] = [120, 140, 170, 255];
const TEXT_PRIMARY_COLOR: [u8; 4] = [244, 248, 252, 255];
const TEXT_DIM_COLOR: [u8; 4] = [170, 188, 210, 255];
const TEXT_LINK_COLOR: [u8; 4] = [120, 200, 255, 255];
const ORBIT_ROW_COLOR: [u8; 4] = [24, 30, 48, 255];
const ORBIT_SELECTED_COLOR: [u8; 4] = [40, 60, 100, 255];
const ORBIT_SELECTED_BORDER_COLOR: [u8; 4] = [120, 180, 255, 255];
const CLOSE_BUTTON_COLOR: [u8; 4] = [40, 46, 64, 230];

const HUD_TEXT_SCALE: i32 = 2;
const TITLE_TEXT_SCALE: i32 = 3;
const ORBIT_TITLE_SCALE: i32 = 4;
const HUD_PADDING: i32 = 8;
const PANEL_MAX_WIDTH: i32 = 560;
const PANEL_PADDING: i32 = 20;
const WORLD_HINT: &str = "CLICK/ARROWS: MOVE  DRAG: PAN  ENTER: OPEN  ESC/X: BACK";
const PANEL_HINT: &str = "ESC/X: CLOSE";
const ORBIT_HINT: &str = "ARROWS/TAB: SELECT  ENTER/CLICK: VISIT  ESC/Q: QUIT";

#[derive(Debug)]
struct LoadedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    assets_dir: PathBuf,
    image_cache: HashMap<String, Option<LoadedImage>>,
    warned_image_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, assets_dir: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            assets_dir,
            image_cache: HashMap::new(),
            warned_image_keys: HashSet::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render(
        &mut self,
        view: &SceneView<'_>,
        stats: Option<&LoopMetricsSnapshot>,
    ) -> Result<(), Error> {
        let viewport = self.viewport;
        let background_key = match view {
            SceneView::World(world_view) => world_view.world.background(),
            SceneView::Orbit(_) => None,
        };
        let background = match background_key {
            Some(key) => resolve_cached_image(
                &mut self.image_cache,
                &mut self.warned_image_keys,
                &self.assets_dir,
                key,
            ),
            None => None,
        };

        let frame = self.pixels.frame_mut();
        match view {
            SceneView::World(world_view) => draw_world(frame, viewport, world_view, background),
            SceneView::Orbit(orbit_view) => draw_orbit(frame, viewport, orbit_view),
        }
        if let Some(stats) = stats {
            draw_stats(frame, viewport, stats);
        }
        self.pixels.render()
    }
}

fn draw_world(
    frame: &mut [u8],
    viewport: Viewport,
    view: &WorldView<'_>,
    background: Option<&LoadedImage>,
) {
    clear(frame, CLEAR_COLOR_WORLD);
    let grid = view.world.grid();
    let snapshot = &view.snapshot;
    let tile = view.tile_size_px;
    let tile_px = tile.round().max(1.0) as i32;
    let Some(range) = visible_tile_range(snapshot.offset, tile, viewport, grid.cols(), grid.rows())
    else {
        return;
    };
    let Viewport { width, height } = viewport;

    match background {
        Some(image) => draw_background(
            frame,
            viewport,
            image,
            snapshot.offset.x,
            snapshot.offset.y,
            grid.cols() as f32 * tile,
            grid.rows() as f32 * tile,
        ),
        None => {
            for coord in range.tiles() {
                let color = match grid.tile_at(coord) {
                    Some(TileKind::Wall) | None => TILE_WALL_COLOR,
                    Some(TileKind::Ground) => TILE_GROUND_COLOR,
                    Some(TileKind::Path) => TILE_PATH_COLOR,
                };
                let (x, y) = tile_to_screen_px(coord, snapshot.offset, tile);
                draw_filled_rect(frame, width, height, x, y, tile_px, tile_px, color);
                draw_rect_outline(frame, width, height, x, y, tile_px, tile_px, 1, TILE_SEAM_COLOR);
            }
        }
    }

    if let Some(path) = &snapshot.active_path {
        let inset = tile_px * 3 / 8;
        for step in path {
            let (x, y) = tile_to_screen_px(*step, snapshot.offset, tile);
            draw_filled_rect(
                frame,
                width,
                height,
                x + inset,
                y + inset,
                tile_px - inset * 2,
                tile_px - inset * 2,
                ROUTE_COLOR,
            );
        }
    }

    for (at, _) in view.world.overlay().iter() {
        let (x, y) = tile_to_screen_px(at, snapshot.offset, tile);
        let inset = tile_px / 4;
        draw_filled_rect(
            frame,
            width,
            height,
            x + inset,
            y + inset,
            tile_px - inset * 2,
            tile_px - inset * 2,
            POI_COLOR,
        );
        if snapshot.nearby.contains(&at) {
            draw_rect_outline(frame, width, height, x, y, tile_px, tile_px, 2, POI_NEARBY_COLOR);
        }
    }

    let (px, py) = tile_to_screen_px(snapshot.position, snapshot.offset, tile);
    let inset = tile_px / 6;
    draw_filled_rect(
        frame,
        width,
        height,
        px + inset,
        py + inset,
        tile_px - inset * 2,
        tile_px - inset * 2,
        PLAYER_COLOR,
    );
    draw_rect_outline(
        frame,
        width,
        height,
        px + inset,
        py + inset,
        tile_px - inset * 2,
        tile_px - inset * 2,
        2,
        PLAYER_OUTLINE_COLOR,
    );

    draw_world_hud(frame, viewport, view);
    if let Some(entry) = &snapshot.open_panel {
        draw_content_panel(frame, viewport, entry);
    }
    draw_close_button(frame, viewport);
}

fn draw_close_button(frame: &mut [u8], viewport: Viewport) {
    let Viewport { width, height } = viewport;
    let ScreenRect {
        x,
        y,
        width: size,
        height: _,
    } = close_button_rect(viewport);
    draw_filled_rect(frame, width, height, x, y, size, size, CLOSE_BUTTON_COLOR);
    draw_rect_outline(frame, width, height, x, y, size, size, 2, PANEL_BORDER_COLOR);
    let glyph = text_width_px("X", TITLE_TEXT_SCALE) - TITLE_TEXT_SCALE;
    draw_text(
        frame,
        width,
        height,
        x + (size - glyph) / 2,
        y + (size - line_advance(TITLE_TEXT_SCALE)) / 2 + TITLE_TEXT_SCALE,
        "X",
        TITLE_TEXT_SCALE,
        TEXT_PRIMARY_COLOR,
    );
}

fn draw_world_hud(frame: &mut [u8], viewport: Viewport, view: &WorldView<'_>) {
    let Viewport { width, height } = viewport;
    let mut lines = vec![(printable_text(view.world.title()), TEXT_PRIMARY_COLOR)];
    if view.snapshot.open_panel.is_none() {
        let nearby = view
            .snapshot
            .nearby
            .iter()
            .filter_map(|at| view.world.overlay().get(*at))
            .map(|entry| printable_text(&entry.title))
            .collect::<Vec<_>>();
        if let Some(on_tile) = view.world.overlay().get(view.snapshot.position) {
            lines.push((
                format!("ENTER: OPEN {}", printable_text(&on_tile.title)),
                ROUTE_COLOR,
            ));
        } else if !nearby.is_empty() {
            lines.push((format!("NEARBY: {}", nearby.join(", ")), ROUTE_COLOR));
        }
        lines.push((WORLD_HINT.to_string(), TEXT_DIM_COLOR));
    }

    let hud_height = HUD_PADDING * 2 + line_advance(HUD_TEXT_SCALE) * lines.len() as i32;
    draw_filled_rect(frame, width, height, 0, 0, width as i32, hud_height, HUD_BG_COLOR);
    for (index, (line, color)) in lines.iter().enumerate() {
        draw_text(
            frame,
            width,
            height,
            HUD_PADDING,
            HUD_PADDING + index as i32 * line_advance(HUD_TEXT_SCALE),
            line,
            HUD_TEXT_SCALE,
            *color,
        );
    }
}

fn draw_content_panel(frame: &mut [u8], viewport: Viewport, entry: &ContentEntry) {
    let Viewport { width, height } = viewport;
    draw_filled_rect(
        frame,
        width,
        height,
        0,
        0,
        width as i32,
        height as i32,
        PANEL_BACKDROP_COLOR,
    );

    let inner_width = PANEL_MAX_WIDTH.min(width as i32 - 32) - PANEL_PADDING * 2;
    let max_chars = (inner_width / glyph_advance(HUD_TEXT_SCALE)).max(1) as usize;
    let title_lines = wrap_text(
        &entry.title,
        (inner_width / glyph_advance(TITLE_TEXT_SCALE)).max(1) as usize,
    );
    let body_lines = wrap_text(&entry.description, max_chars);
    let link_lines = entry
        .link
        .as_deref()
        .map(|link| wrap_text(link, max_chars))
        .unwrap_or_default();

    let body_advance = line_advance(HUD_TEXT_SCALE);
    let content_height = title_lines.len() as i32 * line_advance(TITLE_TEXT_SCALE)
        + body_advance
        + (body_lines.len() + link_lines.len()) as i32 * body_advance
        + body_advance * 2;
    let rect = centered_panel_rect(viewport, PANEL_MAX_WIDTH, content_height + PANEL_PADDING * 2);
    let ScreenRect {
        x,
        y,
        width: rect_width,
        height: rect_height,
    } = rect;
    draw_filled_rect(frame, width, height, x, y, rect_width, rect_height, PANEL_BG_COLOR);
    draw_rect_outline(frame, width, height, x, y, rect_width, rect_height, 2, PANEL_BORDER_COLOR);

    let text_x = x + PANEL_PADDING;
    let mut cursor_y = y + PANEL_PADDING;
    for line in &title_lines {
        draw_text(frame, width, height, text_x, cursor_y, line, TITLE_TEXT_SCALE, TEXT_PRIMARY_COLOR);
        cursor_y += line_advance(TITLE_TEXT_SCALE);
    }
    cursor_y += body_advance;
    for line in &body_lines {
        draw_text(frame, width, height, text_x, cursor_y, line, HUD_TEXT_SCALE, TEXT_DIM_COLOR);
        cursor_y += body_advance;
    }
    for line in &link_lines {
        draw_text(frame, width, height, text_x, cursor_y, line, HUD_TEXT_SCALE, TEXT_LINK_COLOR);
        cursor_y += body_advance;
    }
    let hint_x = x + rect_width - PANEL_PADDING - text_width_px(PANEL_HINT, HUD_TEXT_SCALE);
    draw_text(
        frame,
        width,
        height,
        hint_x,
        y + rect_height - PANEL_PADDING - line_advance(HUD_TEXT_SCALE),
        PANEL_HINT,
        HUD_TEXT_SCALE,
        TEXT_DIM_COLOR,
    );
}

fn draw_orbit(frame: &mut [u8], viewport: Viewport, view: &OrbitView<'_>) {
    clear(frame, CLEAR_COLOR_ORBIT);
    let Viewport { width, height } = viewport;
    draw_text(
        frame,
        width,
        height,
        ORBIT_MARGIN_X,
        40,
        &printable_text(view.title),
        ORBIT_TITLE_SCALE,
        TEXT_PRIMARY_COLOR,
    );

    for (index, world) in view.worlds.iter().enumerate() {
        let rect = orbit_row_rect(index, viewport);
        let selected = index == view.selected;
        let fill = if selected {
            ORBIT_SELECTED_COLOR
        } else {
            ORBIT_ROW_COLOR
        };
        draw_filled_rect(frame, width, height, rect.x, rect.y, rect.width, rect.height, fill);
        if selected {
            draw_rect_outline(
                frame,
                width,
                height,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                2,
                ORBIT_SELECTED_BORDER_COLOR,
            );
        }
        draw_text(
            frame,
            width,
            height,
            rect.x + 16,
            rect.y + 14,
            &printable_text(&world.entry.name),
            TITLE_TEXT_SCALE,
            TEXT_PRIMARY_COLOR,
        );
        draw_text(
            frame,
            width,
            height,
            rect.x + 16,
            rect.y + 14 + line_advance(TITLE_TEXT_SCALE),
            &printable_text(&world.entry.description),
            HUD_TEXT_SCALE,
            TEXT_DIM_COLOR,
        );
    }

    draw_text(
        frame,
        width,
        height,
        ORBIT_MARGIN_X,
        height as i32 - 40,
        ORBIT_HINT,
        HUD_TEXT_SCALE,
        TEXT_DIM_COLOR,
    );
}

fn draw_stats(frame: &mut [u8], viewport: Viewport, stats: &LoopMetricsSnapshot) {
    let Viewport { width, height } = viewport;
    let line = format_stats_line(stats);
    let line_height = line_advance(HUD_TEXT_SCALE);
    let y = height as i32 - line_height - HUD_PADDING;
    draw_filled_rect(
        frame,
        width,
        height,
        0,
        y - HUD_PADDING / 2,
        text_width_px(&line, HUD_TEXT_SCALE) + HUD_PADDING * 2,
        line_height + HUD_PADDING,
        HUD_BG_COLOR,
    );
    draw_text(frame, width, height, HUD_PADDING, y, &line, HUD_TEXT_SCALE, TEXT_DIM_COLOR);
}

fn format_stats_line(stats: &LoopMetricsSnapshot) -> String {
    format!(
        "FPS {:.0}  TPS {:.0}  FRAME {:.1}MS  WORST {:.1}MS",
        stats.fps, stats.tps, stats.frame_time_ms, stats.worst_frame_ms
    )
}

/// Stretches `image` over the grid rectangle with nearest sampling.
fn draw_background(
    frame: &mut [u8],
    viewport: Viewport,
    image: &LoadedImage,
    offset_x: f32,
    offset_y: f32,
    grid_width: f32,
    grid_height: f32,
) {
    if image.width == 0 || image.height == 0 || grid_width <= 0.0 || grid_height <= 0.0 {
        return;
    }
    if image.rgba.len() < image.width as usize * image.height as usize * 4 {
        return;
    }
    let start_x = offset_x.max(0.0) as i32;
    let start_y = offset_y.max(0.0) as i32;
    let end_x = (offset_x + grid_width).min(viewport.width as f32) as i32;
    let end_y = (offset_y + grid_height).min(viewport.height as f32) as i32;
    let scale_x = image.width as f32 / grid_width;
    let scale_y = image.height as f32 / grid_height;
    let frame_width = viewport.width as usize;

    for py in start_y..end_y {
        let src_y = (((py as f32 - offset_y) * scale_y) as u32).min(image.height - 1) as usize;
        for px in start_x..end_x {
            let src_x = (((px as f32 - offset_x) * scale_x) as u32).min(image.width - 1) as usize;
            let src = (src_y * image.width as usize + src_x) * 4;
            let dst = (py as usize * frame_width + px as usize) * 4;
            if dst + 4 > frame.len() {
                continue;
            }
            frame[dst..dst + 3].copy_from_slice(&image.rgba[src..src + 3]);
            frame[dst + 3] = 255;
        }
    }
}

fn resolve_cached_image<'a>(
    cache: &'a mut HashMap<String, Option<LoadedImage>>,
    warned_keys: &mut HashSet<String>,
    assets_dir: &Path,
    key: &str,
) -> Option<&'a LoadedImage> {
    if !cache.contains_key(key) {
        let image = match resolve_asset_path(assets_dir, key, "png") {
            Ok(path) => match load_image_rgba(&path) {
                Ok(image) => Some(image),
                Err(reason) => {
                    warn_image_load_once(warned_keys, key, Some(&path), &reason);
                    None
                }
            },
            Err(error) => {
                warn_image_load_once(warned_keys, key, None, &format!("invalid_key:{error}"));
                None
            }
        };
        cache.insert(key.to_string(), image);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn load_image_rgba(path: &Path) -> Result<LoadedImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_image_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        image_key = key,
        path = %path_display,
        reason = reason,
        "renderer_background_load_failed_using_tiles"
    );
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::content::{CatalogEntry, CatalogWorld, World, WorldDefinition};
    use crate::nav::{SessionSnapshot, TileCoord, Vec2};

    const VIEWPORT: Viewport = Viewport {
        width: 320,
        height: 240,
    };

    fn frame() -> Vec<u8> {
        vec![0; (VIEWPORT.width * VIEWPORT.height * 4) as usize]
    }

    fn pixel(frame: &[u8], x: i32, y: i32) -> [u8; 4] {
        let offset = ((y as u32 * VIEWPORT.width + x as u32) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn world() -> World {
        let definition: WorldDefinition = serde_json::from_value(json!({
            "id": "skills",
            "title": "Skills",
            "spawn": { "x": 1, "y": 1 },
            "layout": ["WWWWWW", "WGGGPW", "WGGGGW", "WWWWWW"],
            "points_of_interest": [{ "x": 3, "y": 2, "content": "skills" }],
            "content": [{
                "id": "skills",
                "title": "Skills",
                "description": "Technical expertise and capabilities",
                "icon": "⚡"
            }]
        }))
        .expect("definition");
        World::from_definition(definition).expect("world")
    }

    fn snapshot(position: TileCoord, open_panel: Option<ContentEntry>) -> SessionSnapshot {
        SessionSnapshot {
            world_id: "skills".to_string(),
            position,
            active_path: None,
            open_panel,
            offset: Vec2::ZERO,
            locked: false,
            nearby: Vec::new(),
        }
    }

    fn tile_center(tile: TileCoord) -> (i32, i32) {
        (tile.x * 32 + 16, tile.y * 32 + 16)
    }

    #[test]
    fn world_draws_tiles_poi_and_player() {
        let world = world();
        let view = WorldView {
            world: &world,
            snapshot: snapshot(TileCoord::new(1, 2), None),
            tile_size_px: 32.0,
        };
        let mut buffer = frame();
        draw_world(&mut buffer, VIEWPORT, &view, None);

        let (gx, gy) = tile_center(TileCoord::new(2, 2));
        assert_eq!(pixel(&buffer, gx, gy), TILE_GROUND_COLOR);
        let (poi_x, poi_y) = tile_center(TileCoord::new(3, 2));
        assert_eq!(pixel(&buffer, poi_x, poi_y), POI_COLOR);
        let (player_x, player_y) = tile_center(TileCoord::new(1, 2));
        assert_eq!(pixel(&buffer, player_x, player_y), PLAYER_COLOR);
        let (path_x, path_y) = tile_center(TileCoord::new(4, 1));
        assert_eq!(pixel(&buffer, path_x, path_y), TILE_PATH_COLOR);
    }

    #[test]
    fn route_marks_remaining_steps() {
        let world = world();
        let mut state = snapshot(TileCoord::new(1, 2), None);
        state.active_path = Some(vec![TileCoord::new(2, 2), TileCoord::new(3, 2)]);
        let view = WorldView {
            world: &world,
            snapshot: state,
            tile_size_px: 32.0,
        };
        let mut buffer = frame();
        draw_world(&mut buffer, VIEWPORT, &view, None);

        let (x, y) = tile_center(TileCoord::new(2, 2));
        assert_eq!(pixel(&buffer, x, y), ROUTE_COLOR);
    }

    #[test]
    fn open_panel_dims_the_world() {
        let world = world();
        let entry = world
            .overlay()
            .get(TileCoord::new(3, 2))
            .cloned()
            .expect("entry");
        let view = WorldView {
            world: &world,
            snapshot: snapshot(TileCoord::new(3, 2), Some(entry)),
            tile_size_px: 32.0,
        };
        let mut buffer = frame();
        draw_world(&mut buffer, VIEWPORT, &view, None);

        let (x, y) = tile_center(TileCoord::new(4, 2));
        assert_ne!(pixel(&buffer, x, y), TILE_GROUND_COLOR);
    }

    #[test]
    fn close_button_is_drawn_over_world_and_panel() {
        let world = world();
        let entry = world
            .overlay()
            .get(TileCoord::new(3, 2))
            .cloned()
            .expect("entry");
        for open_panel in [None, Some(entry)] {
            let view = WorldView {
                world: &world,
                snapshot: snapshot(TileCoord::new(3, 2), open_panel),
                tile_size_px: 32.0,
            };
            let mut buffer = frame();
            draw_world(&mut buffer, VIEWPORT, &view, None);

            let rect = close_button_rect(VIEWPORT);
            assert_eq!(pixel(&buffer, rect.x, rect.y), PANEL_BORDER_COLOR);
            assert_ne!(pixel(&buffer, rect.x + 3, rect.y + 3), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn background_image_replaces_tile_colors() {
        let world = world();
        let image = LoadedImage {
            width: 2,
            height: 2,
            rgba: [[200, 10, 10, 255]; 4].concat(),
        };
        let view = WorldView {
            world: &world,
            snapshot: snapshot(TileCoord::new(1, 1), None),
            tile_size_px: 32.0,
        };
        let mut buffer = frame();
        draw_world(&mut buffer, VIEWPORT, &view, Some(&image));

        let (x, y) = tile_center(TileCoord::new(2, 2));
        assert_eq!(pixel(&buffer, x, y), [200, 10, 10, 255]);
    }

    #[test]
    fn orbit_highlights_selected_row() {
        let world = Arc::new(world());
        let worlds = ["profile", "projects"]
            .iter()
            .map(|id| CatalogWorld {
                entry: CatalogEntry {
                    id: id.to_string(),
                    name: id.to_string(),
                    description: String::new(),
                    icon: String::new(),
                },
                world: Arc::clone(&world),
            })
            .collect::<Vec<_>>();
        let view = OrbitView {
            title: "Source Walker",
            worlds: &worlds,
            selected: 1,
        };
        let mut buffer = frame();
        draw_orbit(&mut buffer, VIEWPORT, &view);

        let first = orbit_row_rect(0, VIEWPORT);
        let second = orbit_row_rect(1, VIEWPORT);
        assert_eq!(pixel(&buffer, first.x + 2, first.y + 2), ORBIT_ROW_COLOR);
        assert_eq!(
            pixel(&buffer, second.x + second.width - 1, second.y + 20),
            ORBIT_SELECTED_BORDER_COLOR
        );
    }

    #[test]
    fn missing_background_warns_once_and_caches_absence() {
        let temp = TempDir::new().expect("tempdir");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();

        assert!(
            resolve_cached_image(&mut cache, &mut warned, temp.path(), "backgrounds/none")
                .is_none()
        );
        assert!(
            resolve_cached_image(&mut cache, &mut warned, temp.path(), "backgrounds/none")
                .is_none()
        );
        assert_eq!(warned.len(), 1);
        assert!(cache.contains_key("backgrounds/none"));
    }

    #[test]
    fn stats_line_is_ascii() {
        let line = format_stats_line(&LoopMetricsSnapshot {
            fps: 59.6,
            tps: 60.0,
            frame_time_ms: 16.7,
            worst_frame_ms: 21.04,
            dropped_backlog_ms: 0,
        });
        assert_eq!(line, "FPS 60  TPS 60  FRAME 16.7MS  WORST 21.0MS");
    }
}
