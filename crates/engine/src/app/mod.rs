mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, PointerEvent};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{close_button_at, orbit_row_at, tile_to_screen_px, Renderer, Viewport};
pub use scene::{InputSnapshot, OrbitView, Scene, SceneCommand, SceneView, WorldView};
