mod draw;
mod layout;
mod renderer;
mod text;
mod transform;

pub use layout::{close_button_at, orbit_row_at};
pub use renderer::Renderer;
pub use transform::{tile_to_screen_px, Viewport};
