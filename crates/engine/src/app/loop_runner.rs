use std::env;
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::nav::Vec2;

use super::input::{action_for_key, InputAction, PointerEvent};
use super::metrics::MetricsAccumulator;
use super::{InputSnapshot, MetricsHandle, Renderer, Scene, SceneCommand};

pub const SLOW_FRAME_ENV_VAR: &str = "WALKER_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub show_stats: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Source Walker".to_string(),
            window_width: 960,
            window_height: 640,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: Some(60),
            show_stats: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    assets_dir: PathBuf,
) -> Result<(), AppError> {
    run_app_with_metrics(config, scene, assets_dir, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    mut scene: Box<dyn Scene>,
    assets_dir: PathBuf,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), assets_dir).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let initial_size = window.inner_size();
    let mut input_collector = InputCollector::new(initial_size.width, initial_size.height);

    scene.load();
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;
    let mut stats_visible = config.show_stats;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::Touch(touch) => {
                    input_collector.handle_touch(
                        touch.id,
                        touch.phase,
                        touch.location.x as f32,
                        touch.location.y as f32,
                    );
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    if input_collector.take_stats_toggle_pressed() {
                        stats_visible = !stats_visible;
                        info!(stats_visible, "stats_overlay_toggled");
                    }

                    if slow_frame_delay > Duration::ZERO {
                        // Debug perturbation only; not the FPS cap.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let command = scene.update(fixed_dt, &input_snapshot);
                        metrics_accumulator.record_tick();
                        if command == SceneCommand::Quit {
                            info!(reason = "scene_quit", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        metrics_accumulator.record_dropped_backlog(step_plan.dropped_backlog);
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    // Single FPS cap sleep point for render pacing.
                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    let stats = stats_visible.then(|| metrics_handle.snapshot());
                    if let Err(error) = renderer.render(&scene.view(), stats.as_ref()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(&config.window_title));
                        last_applied_title = next_title;
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    pressed: Vec<InputAction>,
    pointer_events: Vec<PointerEvent>,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    active_touch: Option<u64>,
    stats_toggle_is_down: bool,
    stats_toggle_pressed_edge: bool,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        if let PhysicalKey::Code(code) = key_event.physical_key {
            self.handle_key(code, key_event.state, key_event.repeat);
        }
    }

    fn handle_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        if code == KeyCode::F3 {
            self.handle_stats_toggle_key_state(state);
            return;
        }
        let Some(action) = action_for_key(code) else {
            return;
        };
        if state == ElementState::Pressed && (!repeat || action.repeats_while_held()) {
            self.pressed.push(action);
        }
    }

    fn handle_stats_toggle_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.stats_toggle_is_down {
                    self.stats_toggle_pressed_edge = true;
                }
                self.stats_toggle_is_down = true;
            }
            ElementState::Released => self.stats_toggle_is_down = false,
        }
    }

    fn take_stats_toggle_pressed(&mut self) -> bool {
        mem::take(&mut self.stats_toggle_pressed_edge)
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            mem::take(&mut self.pressed),
            mem::take(&mut self.pointer_events),
            self.window_width,
            self.window_height,
        )
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        let at = Vec2::new(x, y);
        self.cursor_position_px = Some(at);
        if self.left_mouse_is_down {
            self.pointer_events.push(PointerEvent::Move(at));
        }
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
        self.left_mouse_is_down = false;
        self.pointer_events.push(PointerEvent::Leave);
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if self.left_mouse_is_down {
                    return;
                }
                self.left_mouse_is_down = true;
                if let Some(at) = self.cursor_position_px {
                    self.pointer_events.push(PointerEvent::Down(at));
                }
            }
            ElementState::Released => {
                if !self.left_mouse_is_down {
                    return;
                }
                self.left_mouse_is_down = false;
                if let Some(at) = self.cursor_position_px {
                    self.pointer_events.push(PointerEvent::Up(at));
                }
            }
        }
    }

    /// Tracks the first finger only; other touches are ignored until it lifts.
    fn handle_touch(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) {
        let at = Vec2::new(x, y);
        match phase {
            TouchPhase::Started => {
                if self.active_touch.is_none() {
                    self.active_touch = Some(id);
                    self.pointer_events.push(PointerEvent::TouchStart(at));
                }
            }
            TouchPhase::Moved => {
                if self.active_touch == Some(id) {
                    self.pointer_events.push(PointerEvent::TouchMove(at));
                }
            }
            TouchPhase::Ended => {
                if self.active_touch == Some(id) {
                    self.active_touch = None;
                    self.pointer_events.push(PointerEvent::TouchEnd);
                }
            }
            TouchPhase::Cancelled => {
                if self.active_touch == Some(id) {
                    self.active_touch = None;
                    self.pointer_events.push(PointerEvent::Leave);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let result = plan_sim_steps(Duration::from_millis(50), Duration::from_millis(16), 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let result = plan_sim_steps(Duration::from_millis(120), Duration::from_millis(16), 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn key_presses_reach_exactly_one_tick_in_order() {
        let mut input = InputCollector::new(960, 640);
        input.handle_key(KeyCode::ArrowRight, ElementState::Pressed, false);
        input.handle_key(KeyCode::Enter, ElementState::Pressed, false);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();
        assert_eq!(
            first.pressed(),
            &[InputAction::MoveRight, InputAction::Confirm]
        );
        assert!(second.pressed().is_empty());
    }

    #[test]
    fn os_repeat_only_repeats_movement() {
        let mut input = InputCollector::default();
        input.handle_key(KeyCode::KeyS, ElementState::Pressed, false);
        input.handle_key(KeyCode::KeyS, ElementState::Pressed, true);
        input.handle_key(KeyCode::Enter, ElementState::Pressed, false);
        input.handle_key(KeyCode::Enter, ElementState::Pressed, true);
        input.handle_key(KeyCode::KeyS, ElementState::Released, false);

        assert_eq!(
            input.snapshot_for_tick().pressed(),
            &[
                InputAction::MoveDown,
                InputAction::MoveDown,
                InputAction::Confirm
            ]
        );
    }

    #[test]
    fn f3_toggle_is_edge_triggered() {
        let mut input = InputCollector::default();

        input.handle_key(KeyCode::F3, ElementState::Pressed, false);
        assert!(input.take_stats_toggle_pressed());

        input.handle_key(KeyCode::F3, ElementState::Pressed, true);
        assert!(!input.take_stats_toggle_pressed());

        input.handle_key(KeyCode::F3, ElementState::Released, false);
        input.handle_key(KeyCode::F3, ElementState::Pressed, false);
        assert!(input.take_stats_toggle_pressed());
        assert!(input.snapshot_for_tick().pressed().is_empty());
    }

    #[test]
    fn mouse_drag_is_queued_as_pointer_events() {
        let mut input = InputCollector::new(960, 640);
        input.set_cursor_position_px(10.0, 10.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.set_cursor_position_px(30.0, 15.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        input.set_cursor_position_px(50.0, 50.0);

        assert_eq!(
            input.snapshot_for_tick().pointer_events(),
            &[
                PointerEvent::Down(Vec2::new(10.0, 10.0)),
                PointerEvent::Move(Vec2::new(30.0, 15.0)),
                PointerEvent::Up(Vec2::new(30.0, 15.0)),
            ]
        );
        assert!(input.snapshot_for_tick().pointer_events().is_empty());
    }

    #[test]
    fn held_button_does_not_repeat_down() {
        let mut input = InputCollector::new(960, 640);
        input.set_cursor_position_px(5.0, 5.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);

        assert_eq!(input.snapshot_for_tick().pointer_events().len(), 1);
    }

    #[test]
    fn cursor_leaving_window_ends_gesture() {
        let mut input = InputCollector::new(960, 640);
        input.set_cursor_position_px(5.0, 5.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.clear_cursor_position();
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);

        assert_eq!(
            input.snapshot_for_tick().pointer_events(),
            &[PointerEvent::Down(Vec2::new(5.0, 5.0)), PointerEvent::Leave]
        );
    }

    #[test]
    fn only_first_touch_is_tracked() {
        let mut input = InputCollector::new(960, 640);
        input.handle_touch(1, TouchPhase::Started, 10.0, 10.0);
        input.handle_touch(2, TouchPhase::Started, 90.0, 90.0);
        input.handle_touch(2, TouchPhase::Moved, 80.0, 80.0);
        input.handle_touch(1, TouchPhase::Moved, 20.0, 12.0);
        input.handle_touch(1, TouchPhase::Ended, 20.0, 12.0);
        input.handle_touch(3, TouchPhase::Started, 1.0, 1.0);
        input.handle_touch(3, TouchPhase::Cancelled, 1.0, 1.0);

        assert_eq!(
            input.snapshot_for_tick().pointer_events(),
            &[
                PointerEvent::TouchStart(Vec2::new(10.0, 10.0)),
                PointerEvent::TouchMove(Vec2::new(20.0, 12.0)),
                PointerEvent::TouchEnd,
                PointerEvent::TouchStart(Vec2::new(1.0, 1.0)),
                PointerEvent::Leave,
            ]
        );
    }

    #[test]
    fn snapshot_carries_window_size_and_quit() {
        let mut input = InputCollector::new(1280, 720);
        input.set_window_size(800, 600);
        input.mark_quit_requested();
        let snapshot = input.snapshot_for_tick();

        assert_eq!(snapshot.window_size(), (800, 600));
        assert!(snapshot.quit_requested());
    }

    #[test]
    fn render_cap_helpers() {
        assert_eq!(target_frame_duration(None), None);
        let frame = target_frame_duration(Some(60)).expect("duration");
        assert!((frame.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
        assert_eq!(
            compute_cap_sleep(Duration::from_millis(20), Some(frame)),
            Duration::ZERO
        );
        assert!(compute_cap_sleep(Duration::from_millis(5), Some(frame)) > Duration::ZERO);
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(format_render_cap(None), "off");
    }
}
