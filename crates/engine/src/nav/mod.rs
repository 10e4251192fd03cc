mod grid;
mod interaction;
mod movement;
mod overlay;
mod path;
mod scheduler;
mod session;
mod viewport;
mod walk;

pub use grid::{Direction, GridError, TileCoord, TileGrid, TileKind};
pub use interaction::{is_adjacent, points_nearby, CancelOutcome, InteractionResolver, OpenPanel};
pub use movement::{
    MoveEvent, MovementConfig, MovementController, MovementState, Rejection,
    DEFAULT_KEY_COOLDOWN, DEFAULT_PATH_STEP_INTERVAL,
};
pub use overlay::{ContentEntry, OverlayError, PoiOverlay, PointOfInterest};
pub use path::{bfs_distance, find_path, reachable_from};
pub use scheduler::{TickScheduler, TimerHandle};
pub use session::{NavConfig, NavEvent, NavInput, NavKey, SessionSnapshot, WorldSession};
pub use viewport::{
    GestureEnd, Vec2, ViewportController, DEFAULT_CLICK_SLOP_PX, DEFAULT_TILE_SIZE_PX,
};
pub use walk::is_walkable;
