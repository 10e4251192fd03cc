use std::time::Duration;

use crate::content::{CatalogWorld, World};
use crate::nav::SessionSnapshot;

use super::input::{InputAction, PointerEvent};

/// Everything the window saw since the previous tick. Press edges and pointer
/// events are delivered to exactly one tick.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    pressed: Vec<InputAction>,
    pointer_events: Vec<PointerEvent>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        pressed: Vec<InputAction>,
        pointer_events: Vec<PointerEvent>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            pressed,
            pointer_events,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn pressed(&self) -> &[InputAction] {
        &self.pressed
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.contains(&action)
    }

    pub fn pointer_events(&self) -> &[PointerEvent] {
        &self.pointer_events
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_pressed(mut self, action: InputAction) -> Self {
        self.pressed.push(action);
        self
    }

    pub fn with_pointer_event(mut self, event: PointerEvent) -> Self {
        self.pointer_events.push(event);
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitView<'a> {
    pub title: &'a str,
    pub worlds: &'a [CatalogWorld],
    pub selected: usize,
}

#[derive(Debug, Clone)]
pub struct WorldView<'a> {
    pub world: &'a World,
    pub snapshot: SessionSnapshot,
    pub tile_size_px: f32,
}

#[derive(Debug, Clone)]
pub enum SceneView<'a> {
    Orbit(OrbitView<'a>),
    World(WorldView<'a>),
}

pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt: Duration, input: &InputSnapshot) -> SceneCommand;
    fn view(&self) -> SceneView<'_>;
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}
