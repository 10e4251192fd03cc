use std::time::Duration;

use tracing::debug;

use super::grid::{Direction, TileCoord, TileGrid};
use super::overlay::PoiOverlay;
use super::path::find_path;
use super::scheduler::{TickScheduler, TimerHandle};
use super::walk::is_walkable;

pub const DEFAULT_PATH_STEP_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_KEY_COOLDOWN: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementConfig {
    pub path_step_interval: Duration,
    pub key_cooldown: Duration,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            path_step_interval: DEFAULT_PATH_STEP_INTERVAL,
            key_cooldown: DEFAULT_KEY_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementState {
    Idle,
    AnimatingPath {
        path: Vec<TileCoord>,
        next_index: usize,
        timer: TimerHandle,
    },
    SteppingKey {
        timer: TimerHandle,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveEvent {
    PathStarted {
        from: TileCoord,
        goal: TileCoord,
        steps: usize,
    },
    Moved {
        from: TileCoord,
        to: TileCoord,
    },
    PathFinished {
        at: TileCoord,
    },
    StepBlocked {
        at: TileCoord,
        target: TileCoord,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Locked,
    OutOfBounds,
    NotWalkable,
    AlreadyThere,
    Unreachable,
}

/// Owns the player's tile position. Path playback and keyboard cooldowns both
/// hold the lock; positional requests made while locked are rejected.
#[derive(Debug)]
pub struct MovementController {
    position: TileCoord,
    state: MovementState,
    scheduler: TickScheduler,
    config: MovementConfig,
}

impl MovementController {
    pub fn new(spawn: TileCoord, config: MovementConfig) -> Self {
        Self {
            position: spawn,
            state: MovementState::Idle,
            scheduler: TickScheduler::new(),
            config,
        }
    }

    pub fn position(&self) -> TileCoord {
        self.position
    }

    pub fn state(&self) -> &MovementState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        !matches!(self.state, MovementState::Idle)
    }

    /// Steps of the active path that have not been walked yet.
    pub fn remaining_path(&self) -> Option<&[TileCoord]> {
        match &self.state {
            MovementState::AnimatingPath {
                path, next_index, ..
            } => Some(&path[(*next_index).min(path.len())..]),
            _ => None,
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn request_path_to(
        &mut self,
        grid: &TileGrid,
        overlay: &PoiOverlay,
        target: TileCoord,
    ) -> Result<MoveEvent, Rejection> {
        if self.is_locked() {
            return Err(Rejection::Locked);
        }
        if !grid.in_bounds(target) {
            return Err(Rejection::OutOfBounds);
        }
        if !is_walkable(grid, overlay, target) {
            return Err(Rejection::NotWalkable);
        }
        if target == self.position {
            return Err(Rejection::AlreadyThere);
        }

        let path = match find_path(grid, overlay, self.position, target) {
            Some(path) if !path.is_empty() => path,
            _ => return Err(Rejection::Unreachable),
        };

        let timer = self
            .scheduler
            .schedule_repeating(self.config.path_step_interval);
        let event = MoveEvent::PathStarted {
            from: self.position,
            goal: target,
            steps: path.len(),
        };
        self.state = MovementState::AnimatingPath {
            path,
            next_index: 0,
            timer,
        };
        Ok(event)
    }

    /// Single keyboard step. A blocked step leaves the position alone but
    /// still starts the cooldown.
    pub fn request_step(
        &mut self,
        grid: &TileGrid,
        overlay: &PoiOverlay,
        direction: Direction,
    ) -> Result<MoveEvent, Rejection> {
        if self.is_locked() {
            return Err(Rejection::Locked);
        }

        let from = self.position;
        let target = from.step(direction);
        let event = if is_walkable(grid, overlay, target) {
            self.position = target;
            MoveEvent::Moved { from, to: target }
        } else {
            MoveEvent::StepBlocked { at: from, target }
        };

        let timer = self.scheduler.schedule_once(self.config.key_cooldown);
        self.state = MovementState::SteppingKey { timer };
        Ok(event)
    }

    /// Handles fires one at a time, so a finished path stops its timer before
    /// the rest of `dt` is spent.
    pub fn tick(&mut self, dt: Duration) -> Vec<MoveEvent> {
        let mut events = Vec::new();
        let mut budget = dt;
        while let Some(handle) = self.scheduler.next_fire(&mut budget) {
            self.on_timer(handle, &mut events);
        }
        self.scheduler.elapse(budget);
        events
    }

    pub fn cancel(&mut self) {
        match &self.state {
            MovementState::AnimatingPath { timer, .. } | MovementState::SteppingKey { timer } => {
                self.scheduler.cancel(*timer);
            }
            MovementState::Idle => {}
        }
        self.state = MovementState::Idle;
    }

    pub fn reset(&mut self, spawn: TileCoord) {
        self.cancel();
        self.scheduler.cancel_all();
        self.position = spawn;
    }

    fn on_timer(&mut self, handle: TimerHandle, events: &mut Vec<MoveEvent>) {
        match &mut self.state {
            MovementState::AnimatingPath {
                path,
                next_index,
                timer,
            } if *timer == handle => {
                let Some(next) = path.get(*next_index).copied() else {
                    self.scheduler.cancel(handle);
                    self.state = MovementState::Idle;
                    return;
                };
                let from = self.position;
                self.position = next;
                *next_index += 1;
                events.push(MoveEvent::Moved { from, to: next });
                if *next_index >= path.len() {
                    self.scheduler.cancel(handle);
                    self.state = MovementState::Idle;
                    events.push(MoveEvent::PathFinished { at: next });
                }
            }
            MovementState::SteppingKey { timer } if *timer == handle => {
                self.state = MovementState::Idle;
            }
            _ => {
                debug!(?handle, "stale_timer_fire_ignored");
            }
        }
    }
}
