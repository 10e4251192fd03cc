use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::content::World;

use super::grid::{Direction, TileCoord};
use super::interaction::{points_nearby, CancelOutcome, InteractionResolver};
use super::movement::{MoveEvent, MovementConfig, MovementController};
use super::overlay::ContentEntry;
use super::viewport::{
    GestureEnd, Vec2, ViewportController, DEFAULT_CLICK_SLOP_PX, DEFAULT_TILE_SIZE_PX,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavConfig {
    pub movement: MovementConfig,
    pub tile_size_px: u32,
    pub click_slop_px: f32,
    pub open_panel_on_arrival: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            tile_size_px: DEFAULT_TILE_SIZE_PX,
            click_slop_px: DEFAULT_CLICK_SLOP_PX,
            open_panel_on_arrival: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
}

impl NavKey {
    /// Maps DOM-style key names (`ArrowUp`, `w`, `Enter`, `Escape`, ...) and
    /// the plain aliases used by replay scripts.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" | "w" | "W" | "up" => Some(NavKey::Up),
            "ArrowDown" | "s" | "S" | "down" => Some(NavKey::Down),
            "ArrowLeft" | "a" | "A" | "left" => Some(NavKey::Left),
            "ArrowRight" | "d" | "D" | "right" => Some(NavKey::Right),
            "Enter" | " " | "Space" | "e" | "E" | "confirm" => Some(NavKey::Confirm),
            "Escape" | "Esc" | "cancel" => Some(NavKey::Cancel),
            _ => None,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            NavKey::Up => Some(Direction::Up),
            NavKey::Down => Some(Direction::Down),
            NavKey::Left => Some(Direction::Left),
            NavKey::Right => Some(Direction::Right),
            NavKey::Confirm | NavKey::Cancel => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavInput {
    TileClicked(TileCoord),
    KeyPressed(NavKey),
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    PointerLeave,
    TouchStart(Vec2),
    TouchMove(Vec2),
    TouchEnd,
    Resized { width: f32, height: f32 },
    ExitRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    Movement(MoveEvent),
    PanelOpened { at: TileCoord, content_id: String },
    PanelClosed { content_id: String },
    ExitRequested,
    Panned { offset: Vec2 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub world_id: String,
    pub position: TileCoord,
    pub active_path: Option<Vec<TileCoord>>,
    pub open_panel: Option<ContentEntry>,
    pub offset: Vec2,
    pub locked: bool,
    pub nearby: Vec<TileCoord>,
}

/// One visit to a world. Entering builds fresh controllers (player on spawn,
/// panel closed, view at the origin); leaving drops them with every pending
/// timer.
#[derive(Debug)]
pub struct WorldSession {
    world: Arc<World>,
    movement: MovementController,
    interaction: InteractionResolver,
    viewport: ViewportController,
    open_panel_on_arrival: bool,
    arrival_target: Option<TileCoord>,
}

impl WorldSession {
    pub fn enter(world: Arc<World>, config: NavConfig) -> Self {
        let grid = world.grid();
        let viewport = ViewportController::new(
            grid.cols(),
            grid.rows(),
            config.tile_size_px,
            config.click_slop_px,
        );
        let movement = MovementController::new(world.spawn(), config.movement);
        info!(
            world = %world.id(),
            spawn_x = world.spawn().x,
            spawn_y = world.spawn().y,
            points_of_interest = world.overlay().len(),
            "world_entered"
        );
        Self {
            world,
            movement,
            interaction: InteractionResolver::new(),
            viewport,
            open_panel_on_arrival: config.open_panel_on_arrival,
            arrival_target: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn position(&self) -> TileCoord {
        self.movement.position()
    }

    pub fn is_locked(&self) -> bool {
        self.movement.is_locked()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn pending_timers(&self) -> usize {
        self.movement.pending_timers()
    }

    pub fn handle(&mut self, input: NavInput) -> Vec<NavEvent> {
        let mut events = Vec::new();
        match input {
            NavInput::TileClicked(tile) => self.click_tile(tile, &mut events),
            NavInput::KeyPressed(key) => self.press_key(key, &mut events),
            NavInput::PointerDown(at) | NavInput::TouchStart(at) => {
                if self.interaction.is_open() {
                    debug!("pointer_ignored_panel_open");
                } else {
                    self.viewport.pointer_down(at);
                }
            }
            NavInput::PointerMove(at) | NavInput::TouchMove(at) => {
                if self.interaction.is_open() {
                    return events;
                }
                if let Some(offset) = self.viewport.pointer_move(at) {
                    events.push(NavEvent::Panned { offset });
                }
            }
            NavInput::PointerUp(at) => {
                let before = self.viewport.offset();
                let end = self.viewport.pointer_up(at);
                self.finish_gesture(before, end, &mut events);
            }
            NavInput::TouchEnd => {
                let before = self.viewport.offset();
                let end = self.viewport.touch_end();
                self.finish_gesture(before, end, &mut events);
            }
            NavInput::PointerLeave => {
                self.viewport.pointer_leave();
            }
            NavInput::Resized { width, height } => {
                if self.viewport.set_container(width, height) {
                    events.push(NavEvent::Panned {
                        offset: self.viewport.offset(),
                    });
                }
            }
            NavInput::ExitRequested => {
                self.movement.cancel();
                self.arrival_target = None;
                events.push(NavEvent::ExitRequested);
            }
        }
        events
    }

    pub fn tick(&mut self, dt: Duration) -> Vec<NavEvent> {
        let mut events = Vec::new();
        for event in self.movement.tick(dt) {
            let finished_at = match &event {
                MoveEvent::PathFinished { at } => Some(*at),
                _ => None,
            };
            events.push(NavEvent::Movement(event));
            if let Some(at) = finished_at {
                if self.arrival_target.take() == Some(at) {
                    self.open_panel_at(at, &mut events);
                }
            }
        }
        events
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let position = self.movement.position();
        SessionSnapshot {
            world_id: self.world.id().to_string(),
            position,
            active_path: self.movement.remaining_path().map(<[TileCoord]>::to_vec),
            open_panel: self
                .interaction
                .open_content(self.world.overlay())
                .cloned(),
            offset: self.viewport.offset(),
            locked: self.movement.is_locked(),
            nearby: points_nearby(self.world.overlay(), position),
        }
    }

    /// Leaves the world, releasing every pending timer.
    pub fn exit(mut self) {
        self.movement.cancel();
        info!(
            world = %self.world.id(),
            x = self.movement.position().x,
            y = self.movement.position().y,
            "world_exited"
        );
    }

    fn click_tile(&mut self, tile: TileCoord, events: &mut Vec<NavEvent>) {
        if self.interaction.is_open() {
            debug!(x = tile.x, y = tile.y, "click_ignored_panel_open");
            return;
        }
        if self.movement.is_locked() {
            debug!(x = tile.x, y = tile.y, "click_ignored_locked");
            return;
        }
        if tile == self.movement.position() {
            self.open_panel_at(tile, events);
            return;
        }

        match self
            .movement
            .request_path_to(self.world.grid(), self.world.overlay(), tile)
        {
            Ok(event) => {
                self.arrival_target = (self.open_panel_on_arrival
                    && self.world.overlay().contains(tile))
                .then_some(tile);
                events.push(NavEvent::Movement(event));
            }
            Err(reason) => {
                debug!(x = tile.x, y = tile.y, ?reason, "click_ignored");
            }
        }
    }

    fn press_key(&mut self, key: NavKey, events: &mut Vec<NavEvent>) {
        match key {
            NavKey::Confirm => {
                let position = self.movement.position();
                self.open_panel_at(position, events);
            }
            NavKey::Cancel => match self.interaction.cancel() {
                CancelOutcome::PanelClosed(panel) => {
                    info!(content = %panel.content_id, "panel_closed");
                    events.push(NavEvent::PanelClosed {
                        content_id: panel.content_id,
                    });
                }
                CancelOutcome::ExitRequested => {
                    self.movement.cancel();
                    self.arrival_target = None;
                    events.push(NavEvent::ExitRequested);
                }
            },
            NavKey::Up | NavKey::Down | NavKey::Left | NavKey::Right => {
                if self.interaction.is_open() {
                    debug!(?key, "key_ignored_panel_open");
                    return;
                }
                let Some(direction) = key.direction() else {
                    return;
                };
                match self
                    .movement
                    .request_step(self.world.grid(), self.world.overlay(), direction)
                {
                    Ok(event) => events.push(NavEvent::Movement(event)),
                    Err(reason) => debug!(?key, ?reason, "key_ignored"),
                }
            }
        }
    }

    fn open_panel_at(&mut self, at: TileCoord, events: &mut Vec<NavEvent>) {
        if let Some(panel) = self.interaction.confirm(self.world.overlay(), at) {
            // A drag in progress ends with the panel opening.
            self.viewport.pointer_leave();
            info!(content = %panel.content_id, x = at.x, y = at.y, "panel_opened");
            events.push(NavEvent::PanelOpened {
                at,
                content_id: panel.content_id.clone(),
            });
        }
    }

    fn finish_gesture(&mut self, before: Vec2, end: GestureEnd, events: &mut Vec<NavEvent>) {
        let after = self.viewport.offset();
        if after != before {
            events.push(NavEvent::Panned { offset: after });
        }
        if let GestureEnd::Click(at) = end {
            match self.viewport.screen_to_tile(at) {
                Some(tile) => self.click_tile(tile, events),
                None => debug!(x = at.x, y = at.y, "click_outside_grid"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::content::WorldDefinition;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn world(value: serde_json::Value) -> Arc<World> {
        let definition: WorldDefinition = serde_json::from_value(value).expect("definition");
        Arc::new(World::from_definition(definition).expect("world"))
    }

    fn ringed_world() -> Arc<World> {
        world(json!({
            "id": "test",
            "title": "Test",
            "spawn": { "x": 2, "y": 2 },
            "layout": ["WWWWW", "WGGGW", "WGGGW", "WGGGW", "WWWWW"],
            "points_of_interest": [
                { "x": 3, "y": 3, "content": "intro" },
                { "x": 4, "y": 2, "content": "door" }
            ],
            "content": [
                { "id": "intro", "title": "The Journey Begins", "description": "My path", "icon": "rocket" },
                { "id": "door", "title": "Door", "description": "In the wall", "icon": "door" }
            ]
        }))
    }

    fn enter() -> WorldSession {
        WorldSession::enter(ringed_world(), NavConfig::default())
    }

    fn moves(events: &[NavEvent]) -> Vec<TileCoord> {
        events
            .iter()
            .filter_map(|event| match event {
                NavEvent::Movement(MoveEvent::Moved { to, .. }) => Some(*to),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn enter_starts_at_spawn_with_closed_panel() {
        let session = enter();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.world_id, "test");
        assert_eq!(snapshot.position, TileCoord::new(2, 2));
        assert_eq!(snapshot.open_panel, None);
        assert_eq!(snapshot.offset, Vec2::ZERO);
        assert!(!snapshot.locked);
        assert_eq!(snapshot.active_path, None);
    }

    #[test]
    fn scenario_clicks_on_ringed_grid() {
        let mut session = enter();
        assert!(session
            .handle(NavInput::TileClicked(TileCoord::new(2, 2)))
            .is_empty());
        assert!(session
            .handle(NavInput::TileClicked(TileCoord::new(0, 0)))
            .is_empty());

        let started = session.handle(NavInput::TileClicked(TileCoord::new(1, 1)));
        assert_eq!(
            started,
            vec![NavEvent::Movement(MoveEvent::PathStarted {
                from: TileCoord::new(2, 2),
                goal: TileCoord::new(1, 1),
                steps: 2
            })]
        );
        assert_eq!(
            session.snapshot().active_path,
            Some(vec![TileCoord::new(2, 1), TileCoord::new(1, 1)])
        );

        let events = session.tick(ms(200));
        assert_eq!(moves(&events), vec![TileCoord::new(2, 1), TileCoord::new(1, 1)]);
        assert_eq!(session.position(), TileCoord::new(1, 1));
        assert!(!session.is_locked());
    }

    #[test]
    fn second_click_during_playback_is_ignored() {
        let mut session = enter();
        session.handle(NavInput::TileClicked(TileCoord::new(1, 1)));
        assert!(session
            .handle(NavInput::TileClicked(TileCoord::new(3, 1)))
            .is_empty());
        assert!(session
            .handle(NavInput::KeyPressed(NavKey::Down))
            .is_empty());

        session.tick(ms(1_000));
        assert_eq!(session.position(), TileCoord::new(1, 1));
    }

    #[test]
    fn arriving_on_clicked_poi_opens_its_panel() {
        let mut session = enter();
        session.handle(NavInput::TileClicked(TileCoord::new(3, 3)));
        let events = session.tick(ms(200));

        assert_eq!(
            events.last(),
            Some(&NavEvent::PanelOpened {
                at: TileCoord::new(3, 3),
                content_id: "intro".to_string()
            })
        );
        assert_eq!(
            session.snapshot().open_panel.map(|entry| entry.title),
            Some("The Journey Begins".to_string())
        );
    }

    #[test]
    fn arrival_panel_can_be_disabled() {
        let config = NavConfig {
            open_panel_on_arrival: false,
            ..NavConfig::default()
        };
        let mut session = WorldSession::enter(ringed_world(), config);
        session.handle(NavInput::TileClicked(TileCoord::new(3, 3)));
        session.tick(ms(200));
        assert_eq!(session.position(), TileCoord::new(3, 3));
        assert_eq!(session.snapshot().open_panel, None);
    }

    #[test]
    fn confirm_requires_standing_on_poi() {
        let mut session = enter();
        session.handle(NavInput::KeyPressed(NavKey::Right));
        session.tick(ms(120));
        assert_eq!(session.position(), TileCoord::new(3, 2));
        assert_eq!(session.snapshot().nearby, vec![TileCoord::new(3, 3), TileCoord::new(4, 2)]);

        assert!(session
            .handle(NavInput::KeyPressed(NavKey::Confirm))
            .is_empty());

        session.handle(NavInput::KeyPressed(NavKey::Down));
        let opened = session.handle(NavInput::KeyPressed(NavKey::Confirm));
        assert_eq!(
            opened,
            vec![NavEvent::PanelOpened {
                at: TileCoord::new(3, 3),
                content_id: "intro".to_string()
            }]
        );
    }

    #[test]
    fn confirm_is_not_gated_by_key_cooldown() {
        let mut session = enter();
        session.handle(NavInput::KeyPressed(NavKey::Right));
        session.tick(ms(120));
        session.handle(NavInput::KeyPressed(NavKey::Down));
        assert!(session.is_locked());
        assert_eq!(
            session.handle(NavInput::KeyPressed(NavKey::Confirm)).len(),
            1
        );
    }

    #[test]
    fn panel_is_modal_for_positional_input() {
        let mut session = enter();
        session.handle(NavInput::TileClicked(TileCoord::new(3, 3)));
        session.tick(ms(200));
        assert!(session.snapshot().open_panel.is_some());

        assert!(session
            .handle(NavInput::TileClicked(TileCoord::new(1, 1)))
            .is_empty());
        assert!(session
            .handle(NavInput::KeyPressed(NavKey::Up))
            .is_empty());
        assert_eq!(session.position(), TileCoord::new(3, 3));

        assert_eq!(
            session.handle(NavInput::KeyPressed(NavKey::Cancel)),
            vec![NavEvent::PanelClosed {
                content_id: "intro".to_string()
            }]
        );
        assert_eq!(
            session.handle(NavInput::KeyPressed(NavKey::Cancel)),
            vec![NavEvent::ExitRequested]
        );
    }

    #[test]
    fn clicking_current_poi_tile_opens_panel() {
        let mut session = enter();
        session.handle(NavInput::KeyPressed(NavKey::Right));
        session.tick(ms(120));
        session.handle(NavInput::KeyPressed(NavKey::Down));
        session.tick(ms(120));

        let events = session.handle(NavInput::TileClicked(TileCoord::new(3, 3)));
        assert!(matches!(events.as_slice(), [NavEvent::PanelOpened { .. }]));
    }

    #[test]
    fn wall_poi_is_reachable_by_click() {
        let mut session = enter();
        session.handle(NavInput::TileClicked(TileCoord::new(4, 2)));
        let events = session.tick(ms(1_000));
        assert_eq!(moves(&events), vec![TileCoord::new(3, 2), TileCoord::new(4, 2)]);
        assert!(matches!(
            events.last(),
            Some(NavEvent::PanelOpened { content_id, .. }) if content_id == "door"
        ));
    }

    #[test]
    fn exit_request_cancels_pending_path() {
        let mut session = enter();
        session.handle(NavInput::TileClicked(TileCoord::new(1, 1)));
        assert_eq!(session.pending_timers(), 1);

        assert_eq!(
            session.handle(NavInput::ExitRequested),
            vec![NavEvent::ExitRequested]
        );
        assert_eq!(session.pending_timers(), 0);
        assert!(moves(&session.tick(ms(1_000))).is_empty());
        session.exit();
    }

    #[test]
    fn pointer_tap_clicks_tile_under_cursor() {
        let mut session = enter();
        session.handle(NavInput::Resized {
            width: 100.0,
            height: 100.0,
        });
        session.handle(NavInput::PointerDown(Vec2::new(40.0, 40.0)));
        let events = session.handle(NavInput::PointerUp(Vec2::new(41.0, 40.0)));
        assert_eq!(
            events,
            vec![NavEvent::Movement(MoveEvent::PathStarted {
                from: TileCoord::new(2, 2),
                goal: TileCoord::new(1, 1),
                steps: 2
            })]
        );
    }

    #[test]
    fn touch_tap_clicks_tile_at_last_touch_point() {
        let mut session = enter();
        session.handle(NavInput::Resized {
            width: 100.0,
            height: 100.0,
        });
        session.handle(NavInput::TouchStart(Vec2::new(38.0, 40.0)));
        assert!(session
            .handle(NavInput::TouchMove(Vec2::new(40.0, 41.0)))
            .is_empty());
        let events = session.handle(NavInput::TouchEnd);
        assert_eq!(
            events,
            vec![NavEvent::Movement(MoveEvent::PathStarted {
                from: TileCoord::new(2, 2),
                goal: TileCoord::new(1, 1),
                steps: 2
            })]
        );
    }

    #[test]
    fn touch_tap_on_current_poi_opens_panel() {
        let mut session = enter();
        session.handle(NavInput::KeyPressed(NavKey::Right));
        session.tick(ms(120));
        session.handle(NavInput::KeyPressed(NavKey::Down));
        session.tick(ms(120));

        session.handle(NavInput::TouchStart(Vec2::new(112.0, 112.0)));
        let events = session.handle(NavInput::TouchEnd);
        assert!(matches!(
            events.as_slice(),
            [NavEvent::PanelOpened { content_id, .. }] if content_id == "intro"
        ));
    }

    #[test]
    fn panel_opening_mid_drag_stops_the_pan() {
        let mut session = enter();
        session.handle(NavInput::Resized {
            width: 100.0,
            height: 100.0,
        });
        session.handle(NavInput::TileClicked(TileCoord::new(3, 3)));
        session.handle(NavInput::PointerDown(Vec2::new(90.0, 90.0)));
        session.tick(ms(200));
        assert!(session.snapshot().open_panel.is_some());

        assert!(session
            .handle(NavInput::PointerMove(Vec2::new(50.0, 70.0)))
            .is_empty());
        assert!(session
            .handle(NavInput::PointerUp(Vec2::new(50.0, 70.0)))
            .is_empty());
        assert_eq!(session.snapshot().offset, Vec2::ZERO);
        assert!(!session.viewport().is_dragging());
    }

    #[test]
    fn drag_pans_without_clicking() {
        let mut session = enter();
        session.handle(NavInput::Resized {
            width: 100.0,
            height: 100.0,
        });
        session.handle(NavInput::PointerDown(Vec2::new(90.0, 90.0)));
        let panned = session.handle(NavInput::PointerMove(Vec2::new(50.0, 70.0)));
        assert_eq!(
            panned,
            vec![NavEvent::Panned {
                offset: Vec2::new(-40.0, -20.0)
            }]
        );
        let released = session.handle(NavInput::PointerUp(Vec2::new(50.0, 70.0)));
        assert!(released.is_empty());
        assert!(!session.is_locked());
        assert_eq!(session.snapshot().offset, Vec2::new(-40.0, -20.0));
    }

    #[test]
    fn key_codes_map_to_nav_keys() {
        assert_eq!(NavKey::from_code("ArrowUp"), Some(NavKey::Up));
        assert_eq!(NavKey::from_code("a"), Some(NavKey::Left));
        assert_eq!(NavKey::from_code("Enter"), Some(NavKey::Confirm));
        assert_eq!(NavKey::from_code(" "), Some(NavKey::Confirm));
        assert_eq!(NavKey::from_code("Escape"), Some(NavKey::Cancel));
        assert_eq!(NavKey::from_code("q"), None);
        assert_eq!(NavKey::Confirm.direction(), None);
    }
}
