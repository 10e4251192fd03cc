use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use walker_engine::app::{close_button_at, orbit_row_at, Viewport};
use walker_engine::nav::{NavConfig, NavEvent, NavInput, NavKey, Vec2, WorldSession};
use walker_engine::{
    CatalogWorld, InputAction, InputSnapshot, OrbitView, PointerEvent, Scene, SceneCommand,
    SceneView, WorldView,
};

const ORBIT_TITLE: &str = "Source Walker";

/// Switches between the world selection screen and one live world session.
pub(crate) struct PortfolioDirector {
    worlds: Vec<CatalogWorld>,
    selected: usize,
    nav_config: NavConfig,
    start_world: Option<usize>,
    session: Option<WorldSession>,
    window_size: (u32, u32),
    orbit_press: Option<usize>,
    close_press: Option<Vec2>,
}

impl PortfolioDirector {
    pub(crate) fn new(
        worlds: Vec<CatalogWorld>,
        nav_config: NavConfig,
        start_world: Option<usize>,
    ) -> Self {
        Self {
            worlds,
            selected: 0,
            nav_config,
            start_world,
            session: None,
            window_size: (0, 0),
            orbit_press: None,
            close_press: None,
        }
    }

    fn enter_world(&mut self, index: usize) {
        let Some(world) = self.worlds.get(index).map(|entry| Arc::clone(&entry.world)) else {
            return;
        };
        self.leave_world();
        self.selected = index;
        let mut session = WorldSession::enter(world, self.nav_config);
        let (width, height) = self.window_size;
        if width > 0 && height > 0 {
            session.handle(NavInput::Resized {
                width: width as f32,
                height: height as f32,
            });
        }
        self.session = Some(session);
    }

    fn leave_world(&mut self) {
        self.close_press = None;
        if let Some(session) = self.session.take() {
            session.exit();
        }
    }

    fn update_world(&mut self, fixed_dt: Duration, input: &InputSnapshot) -> SceneCommand {
        let Some(session) = self.session.as_mut() else {
            return SceneCommand::None;
        };
        let mut events = Vec::new();

        let (width, height) = input.window_size();
        if (width, height) != self.window_size {
            events.extend(session.handle(NavInput::Resized {
                width: width as f32,
                height: height as f32,
            }));
            self.window_size = (width, height);
        }
        let viewport = Viewport { width, height };
        for pointer in input.pointer_events() {
            match claim_close_gesture(&mut self.close_press, *pointer, viewport) {
                None => events.extend(session.handle(nav_input_for_pointer(*pointer))),
                Some(true) => events.extend(session.handle(NavInput::KeyPressed(NavKey::Cancel))),
                Some(false) => {}
            }
        }
        for action in input.pressed() {
            if *action == InputAction::Quit {
                return SceneCommand::Quit;
            }
            if let Some(key) = action.nav_key() {
                events.extend(session.handle(NavInput::KeyPressed(key)));
            }
        }
        events.extend(session.tick(fixed_dt));

        let mut exit_requested = false;
        for event in &events {
            debug!(event = ?event, "nav_event");
            exit_requested |= matches!(event, NavEvent::ExitRequested);
        }
        if exit_requested {
            self.leave_world();
            info!(selected = self.selected, "returned_to_orbit");
        }
        SceneCommand::None
    }

    fn update_orbit(&mut self, input: &InputSnapshot) -> SceneCommand {
        let count = self.worlds.len();
        if count == 0 {
            return SceneCommand::None;
        }
        let (width, height) = input.window_size();
        let viewport = Viewport { width, height };

        for pointer in input.pointer_events() {
            let target = match *pointer {
                PointerEvent::Down(at) | PointerEvent::TouchStart(at) => {
                    self.orbit_press = orbit_row_at(at, viewport, count);
                    None
                }
                PointerEvent::Move(at) | PointerEvent::TouchMove(at) => {
                    if self.orbit_press != orbit_row_at(at, viewport, count) {
                        self.orbit_press = None;
                    }
                    None
                }
                PointerEvent::Up(at) => {
                    let pressed = self.orbit_press.take();
                    pressed.filter(|index| orbit_row_at(at, viewport, count) == Some(*index))
                }
                PointerEvent::TouchEnd => self.orbit_press.take(),
                PointerEvent::Leave => {
                    self.orbit_press = None;
                    None
                }
            };
            if let Some(index) = target {
                self.enter_world(index);
                return SceneCommand::None;
            }
        }

        for action in input.pressed() {
            match action {
                InputAction::MoveUp | InputAction::MoveLeft => {
                    self.selected = (self.selected + count - 1) % count;
                }
                InputAction::MoveDown | InputAction::MoveRight | InputAction::NextWorld => {
                    self.selected = (self.selected + 1) % count;
                }
                InputAction::Confirm => {
                    self.enter_world(self.selected);
                    return SceneCommand::None;
                }
                InputAction::Cancel | InputAction::Quit => return SceneCommand::Quit,
            }
        }
        SceneCommand::None
    }
}

/// Gestures that start on the close button never reach the map. Returns
/// `None` for events the map should see, otherwise whether the press was
/// released over the button.
fn claim_close_gesture(
    press: &mut Option<Vec2>,
    event: PointerEvent,
    viewport: Viewport,
) -> Option<bool> {
    match event {
        PointerEvent::Down(at) | PointerEvent::TouchStart(at) => {
            if !close_button_at(at, viewport) {
                return None;
            }
            *press = Some(at);
            Some(false)
        }
        PointerEvent::Move(at) | PointerEvent::TouchMove(at) => {
            let last = press.as_mut()?;
            *last = at;
            Some(false)
        }
        PointerEvent::Up(at) => {
            press.take()?;
            Some(close_button_at(at, viewport))
        }
        PointerEvent::TouchEnd => {
            let last = press.take()?;
            Some(close_button_at(last, viewport))
        }
        PointerEvent::Leave => {
            press.take()?;
            Some(false)
        }
    }
}

fn nav_input_for_pointer(event: PointerEvent) -> NavInput {
    match event {
        PointerEvent::Down(at) => NavInput::PointerDown(at),
        PointerEvent::Move(at) => NavInput::PointerMove(at),
        PointerEvent::Up(at) => NavInput::PointerUp(at),
        PointerEvent::Leave => NavInput::PointerLeave,
        PointerEvent::TouchStart(at) => NavInput::TouchStart(at),
        PointerEvent::TouchMove(at) => NavInput::TouchMove(at),
        PointerEvent::TouchEnd => NavInput::TouchEnd,
    }
}

impl Scene for PortfolioDirector {
    fn load(&mut self) {
        info!(world_count = self.worlds.len(), "director_loaded");
        if let Some(index) = self.start_world.take() {
            self.enter_world(index);
        }
    }

    fn update(&mut self, fixed_dt: Duration, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        if self.session.is_some() {
            self.update_world(fixed_dt, input)
        } else {
            self.window_size = input.window_size();
            self.update_orbit(input)
        }
    }

    fn view(&self) -> SceneView<'_> {
        match &self.session {
            Some(session) => SceneView::World(WorldView {
                world: session.world(),
                snapshot: session.snapshot(),
                tile_size_px: session.viewport().tile_size_px(),
            }),
            None => SceneView::Orbit(OrbitView {
                title: ORBIT_TITLE,
                worlds: &self.worlds,
                selected: self.selected,
            }),
        }
    }

    fn unload(&mut self) {
        self.leave_world();
        self.orbit_press = None;
        info!("director_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| format!("{ORBIT_TITLE} | {}", session.world().title()))
    }
}

#[cfg(test)]
impl PortfolioDirector {
    fn active_world(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.world().id())
    }

    fn selected(&self) -> usize {
        self.selected
    }
}
