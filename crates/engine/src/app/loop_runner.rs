use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::geometry::Vec2;
use crate::{resolve_app_paths, StartupError};

use super::input::ActionStates;
use super::scene::{SceneMachine, SceneResources, SceneSet};
use super::{InputAction, InputSnapshot, RenderFrame, Renderer, SceneCommand, SceneError, SceneKey};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub logical_width: u32,
    pub logical_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub max_render_fps: Option<u32>,
    pub initial_scene: SceneKey,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "RPG".to_string(),
            window_width: 640,
            window_height: 480,
            logical_width: 320,
            logical_height: 240,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            max_render_fps: None,
            initial_scene: SceneKey::Start,
        }
    }
}

impl LoopConfig {
    pub fn logical_size(&self) -> (u32, u32) {
        (self.logical_width.max(1), self.logical_height.max(1))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("scene failed: {0}")]
    Scene(#[from] SceneError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scenes: SceneSet) -> Result<(), AppError> {
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        asset_dir = %app_paths.asset_dir.display(),
        "startup"
    );

    let logical_size = config.logical_size();
    let resources = SceneResources::new(app_paths.asset_dir.clone(), logical_size);
    let mut scenes = SceneMachine::new(scenes, config.initial_scene, resources);
    scenes.load_active()?;
    info!(scene = ?scenes.active_scene(), "scene_loaded");

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
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, logical_size.0, logical_size.1)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::new(logical_size.0, logical_size.1);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        logical_width = logical_size.0,
        logical_height = logical_size.1,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let failure: Rc<RefCell<Option<SceneError>>> = Rc::new(RefCell::new(None));
    let failure_in_loop = Rc::clone(&failure);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;
    let mut frame = RenderFrame::default();

    let run_result = event_loop.run(move |event, window_target| match event {
        Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
            match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window_for_loop.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let logical =
                        renderer.window_pos_to_logical(position.x as f32, position.y as f32);
                    input_collector.set_cursor_position_px(logical);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        match step_scenes(&mut scenes, &input_snapshot) {
                            Ok(TickFlow::Continue) => {}
                            Ok(TickFlow::Quit) => {
                                info!(reason = "scene_quit", "shutdown_requested");
                                window_target.exit();
                                break;
                            }
                            Err(err) => {
                                error!(error = %err, scene = ?scenes.active_scene(), "scene_failed");
                                *failure_in_loop.borrow_mut() = Some(err);
                                window_target.exit();
                                break;
                            }
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
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

                    frame.clear();
                    scenes.render_active(&mut frame);
                    if let Err(error) = renderer.render(&frame, &scenes.resources().images) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = scenes.window_title_active();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window_for_loop.set_title(title),
                            None => window_for_loop.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            window_for_loop.request_redraw();
        }
        Event::LoopExiting => {
            scenes.shutdown_all();
            info!("shutdown");
        }
        _ => {}
    });

    if let Some(err) = failure.borrow_mut().take() {
        return Err(AppError::Scene(err));
    }
    run_result.map_err(AppError::EventLoopRun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickFlow {
    Continue,
    Quit,
}

/// Runs one tick of the active scene and applies the command it returns.
fn step_scenes(scenes: &mut SceneMachine, input: &InputSnapshot) -> Result<TickFlow, SceneError> {
    if input.quit_requested() {
        return Ok(TickFlow::Quit);
    }
    match scenes.update_active(input)? {
        SceneCommand::None => Ok(TickFlow::Continue),
        SceneCommand::Quit => Ok(TickFlow::Quit),
        SceneCommand::SwitchTo(next_scene) => {
            let from = scenes.active_scene();
            if scenes.switch_to(next_scene)? {
                info!(from = ?from, to = ?next_scene, "scene_switched");
            }
            Ok(TickFlow::Continue)
        }
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    pause_is_down: bool,
    pause_pressed_edge: bool,
    confirm_is_down: bool,
    confirm_pressed_edge: bool,
    action_states: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    left_click_pressed_edge: bool,
    logical_width: u32,
    logical_height: u32,
}

impl InputCollector {
    fn new(logical_width: u32, logical_height: u32) -> Self {
        Self {
            logical_width,
            logical_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
        self.handle_pause_key_state(is_pause_key(key_event.physical_key), key_event.state);
        self.handle_confirm_key_state(is_confirm_key(key_event.physical_key), key_event.state);
    }

    fn handle_pause_key_state(&mut self, is_pause_key: bool, state: ElementState) {
        if !is_pause_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.pause_is_down {
                    self.pause_pressed_edge = true;
                }
                self.pause_is_down = true;
            }
            ElementState::Released => self.pause_is_down = false,
        }
    }

    fn handle_confirm_key_state(&mut self, is_confirm_key: bool, state: ElementState) {
        if !is_confirm_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.confirm_is_down {
                    self.confirm_pressed_edge = true;
                }
                self.confirm_is_down = true;
            }
            ElementState::Released => self.confirm_is_down = false,
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.pause_pressed_edge,
            self.confirm_pressed_edge,
            self.action_states,
            self.cursor_position_px,
            self.left_click_pressed_edge,
            self.logical_width,
            self.logical_height,
        );
        self.pause_pressed_edge = false;
        self.confirm_pressed_edge = false;
        self.left_click_pressed_edge = false;
        snapshot
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyC) => {
                self.action_states.set(InputAction::ShowColliders, is_pressed);
            }
            _ => {}
        }
    }

    fn set_cursor_position_px(&mut self, position: Vec2) {
        self.cursor_position_px = Some(position);
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    self.left_click_pressed_edge = true;
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }
}

fn is_pause_key(key: PhysicalKey) -> bool {
    matches!(key, PhysicalKey::Code(KeyCode::Escape))
}

fn is_confirm_key(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(KeyCode::Enter) | PhysicalKey::Code(KeyCode::NumpadEnter)
    )
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

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
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

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::{Scene, SceneResources};

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn pause_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::new(320, 240);
        input.handle_pause_key_state(true, ElementState::Pressed);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.pause_pressed());
        assert!(!second.pause_pressed());
    }

    #[test]
    fn held_confirm_does_not_spam_press_edges() {
        let mut input = InputCollector::new(320, 240);

        input.handle_confirm_key_state(true, ElementState::Pressed);
        let first = input.snapshot_for_tick();

        input.handle_confirm_key_state(true, ElementState::Pressed);
        let second = input.snapshot_for_tick();

        input.handle_confirm_key_state(true, ElementState::Released);
        input.handle_confirm_key_state(true, ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.confirm_pressed());
        assert!(!second.confirm_pressed());
        assert!(third.confirm_pressed());
    }

    #[test]
    fn non_matching_keys_do_not_set_edges() {
        let mut input = InputCollector::new(320, 240);
        input.handle_pause_key_state(false, ElementState::Pressed);
        input.handle_confirm_key_state(false, ElementState::Pressed);
        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.pause_pressed());
        assert!(!snapshot.confirm_pressed());
    }

    #[test]
    fn key_classification_matches_bindings() {
        assert!(is_pause_key(PhysicalKey::Code(KeyCode::Escape)));
        assert!(is_confirm_key(PhysicalKey::Code(KeyCode::Enter)));
        assert!(is_confirm_key(PhysicalKey::Code(KeyCode::NumpadEnter)));
        assert!(!is_confirm_key(PhysicalKey::Code(KeyCode::Space)));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveDown));
    }

    #[test]
    fn held_actions_survive_snapshots_until_release() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyC), true);
        assert!(input.snapshot_for_tick().is_down(InputAction::ShowColliders));
        assert!(input.snapshot_for_tick().is_down(InputAction::ShowColliders));

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyC), false);
        assert!(!input.snapshot_for_tick().is_down(InputAction::ShowColliders));
    }

    #[test]
    fn left_click_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::new(320, 240);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let second = input.snapshot_for_tick();

        assert!(first.left_click_pressed());
        assert!(!second.left_click_pressed());
    }

    #[test]
    fn right_click_is_ignored() {
        let mut input = InputCollector::new(320, 240);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert!(!input.snapshot_for_tick().left_click_pressed());
    }

    #[test]
    fn snapshot_carries_cursor_and_logical_size() {
        let mut input = InputCollector::new(320, 240);
        input.set_cursor_position_px(Vec2::new(100.0, 200.0));
        let snapshot = input.snapshot_for_tick();

        assert_eq!(snapshot.window_size(), (320, 240));
        let cursor = snapshot.cursor_position_px().expect("cursor");
        assert!((cursor.x - 100.0).abs() < 0.0001);
        assert!((cursor.y - 200.0).abs() < 0.0001);

        input.clear_cursor_position();
        assert!(input.snapshot_for_tick().cursor_position_px().is_none());
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(5), target_frame_duration(Some(60)));
        assert!(sleep > Duration::ZERO);
        let over = compute_cap_sleep(Duration::from_millis(20), target_frame_duration(Some(60)));
        assert_eq!(over, Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
    }

    struct CommandScene(SceneCommand);

    impl Scene for CommandScene {
        fn load(&mut self, _resources: &mut SceneResources) -> Result<(), SceneError> {
            Ok(())
        }

        fn update(
            &mut self,
            _input: &InputSnapshot,
            _resources: &mut SceneResources,
        ) -> Result<SceneCommand, SceneError> {
            Ok(self.0)
        }

        fn render(&self, _resources: &SceneResources, _frame: &mut RenderFrame) {}
    }

    fn machine(start: SceneCommand) -> SceneMachine {
        let mut scenes = SceneMachine::new(
            SceneSet {
                start: Box::new(CommandScene(start)),
                game: Box::new(CommandScene(SceneCommand::None)),
                pause: Box::new(CommandScene(SceneCommand::Quit)),
            },
            SceneKey::Start,
            SceneResources::new(PathBuf::from("assets"), (320, 240)),
        );
        scenes.load_active().expect("load");
        scenes
    }

    #[test]
    fn step_applies_switch_command() {
        let mut scenes = machine(SceneCommand::SwitchTo(SceneKey::Game));
        let flow = step_scenes(&mut scenes, &InputSnapshot::empty()).expect("step");
        assert_eq!(flow, TickFlow::Continue);
        assert_eq!(scenes.active_scene(), SceneKey::Game);
    }

    #[test]
    fn step_reports_quit_from_scene_or_window() {
        let mut scenes = machine(SceneCommand::Quit);
        assert_eq!(
            step_scenes(&mut scenes, &InputSnapshot::empty()).expect("step"),
            TickFlow::Quit
        );

        let mut scenes = machine(SceneCommand::None);
        let mut input = InputCollector::new(320, 240);
        input.mark_quit_requested();
        assert_eq!(
            step_scenes(&mut scenes, &input.snapshot_for_tick()).expect("step"),
            TickFlow::Quit
        );
    }
}
