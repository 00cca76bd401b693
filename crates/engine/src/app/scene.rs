use std::path::PathBuf;

use thiserror::Error;

use super::input::{ActionStates, InputAction};
use super::rendering::RenderFrame;
use crate::assets::{AssetError, ImageStore};
use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Start,
    Game,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    Quit,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("{context}: {source}")]
    Failed {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl SceneError {
    pub fn failed(
        context: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::Failed {
            context,
            source: source.into(),
        }
    }
}

/// Per-tick input. Cursor coordinates are already in logical (buffer) pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    pause_pressed: bool,
    confirm_pressed: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        pause_pressed: bool,
        confirm_pressed: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            pause_pressed,
            confirm_pressed,
            actions,
            cursor_position_px,
            left_click_pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn pause_pressed(&self) -> bool {
        self.pause_pressed
    }

    pub fn confirm_pressed(&self) -> bool {
        self.confirm_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_pause_pressed(mut self, pause_pressed: bool) -> Self {
        self.pause_pressed = pause_pressed;
        self
    }

    pub fn with_confirm_pressed(mut self, confirm_pressed: bool) -> Self {
        self.confirm_pressed = confirm_pressed;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

/// State shared by every scene: decoded images and where assets live.
#[derive(Debug)]
pub struct SceneResources {
    pub images: ImageStore,
    pub asset_root: PathBuf,
    pub screen_size: (u32, u32),
}

impl SceneResources {
    pub fn new(asset_root: PathBuf, screen_size: (u32, u32)) -> Self {
        Self {
            images: ImageStore::default(),
            asset_root,
            screen_size,
        }
    }
}

pub trait Scene {
    fn load(&mut self, resources: &mut SceneResources) -> Result<(), SceneError>;
    fn update(
        &mut self,
        input: &InputSnapshot,
        resources: &mut SceneResources,
    ) -> Result<SceneCommand, SceneError>;
    fn render(&self, resources: &SceneResources, frame: &mut RenderFrame);
    fn unload(&mut self, _resources: &mut SceneResources) {}
    fn window_title(&self) -> Option<String> {
        None
    }
}

/// One boxed scene per [`SceneKey`].
pub struct SceneSet {
    pub start: Box<dyn Scene>,
    pub game: Box<dyn Scene>,
    pub pause: Box<dyn Scene>,
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneRuntime {
    fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }
}

/// Owns the scenes and switches between them. A scene is loaded the first
/// time it becomes active and keeps its state while inactive, so leaving the
/// game for the pause screen and coming back resumes where it stopped.
pub struct SceneMachine {
    start: SceneRuntime,
    game: SceneRuntime,
    pause: SceneRuntime,
    active_scene: SceneKey,
    resources: SceneResources,
}

impl SceneMachine {
    pub fn new(scenes: SceneSet, active_scene: SceneKey, resources: SceneResources) -> Self {
        Self {
            start: SceneRuntime::new(scenes.start),
            game: SceneRuntime::new(scenes.game),
            pause: SceneRuntime::new(scenes.pause),
            active_scene,
            resources,
        }
    }

    pub fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub fn resources(&self) -> &SceneResources {
        &self.resources
    }

    pub fn is_loaded(&self, key: SceneKey) -> bool {
        self.runtime_ref(key).is_loaded
    }

    pub fn load_active(&mut self) -> Result<(), SceneError> {
        self.load_scene_if_needed(self.active_scene)
    }

    pub fn update_active(&mut self, input: &InputSnapshot) -> Result<SceneCommand, SceneError> {
        let key = self.active_scene;
        let (runtime, resources) = self.runtime_and_resources(key);
        runtime.scene.update(input, resources)
    }

    pub fn render_active(&self, frame: &mut RenderFrame) {
        self.active_runtime_ref()
            .scene
            .render(&self.resources, frame);
    }

    pub fn window_title_active(&self) -> Option<String> {
        self.active_runtime_ref().scene.window_title()
    }

    /// Makes `next_scene` active, loading it first if it never ran. Returns
    /// whether the active scene changed.
    pub fn switch_to(&mut self, next_scene: SceneKey) -> Result<bool, SceneError> {
        if self.active_scene == next_scene {
            return Ok(false);
        }
        self.load_scene_if_needed(next_scene)?;
        self.active_scene = next_scene;
        Ok(true)
    }

    pub fn shutdown_all(&mut self) {
        for key in [SceneKey::Start, SceneKey::Game, SceneKey::Pause] {
            let (runtime, resources) = self.runtime_and_resources(key);
            if runtime.is_loaded {
                runtime.scene.unload(resources);
                runtime.is_loaded = false;
            }
        }
    }

    fn load_scene_if_needed(&mut self, key: SceneKey) -> Result<(), SceneError> {
        let (runtime, resources) = self.runtime_and_resources(key);
        if runtime.is_loaded {
            return Ok(());
        }
        runtime.scene.load(resources)?;
        runtime.is_loaded = true;
        Ok(())
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        self.runtime_ref(self.active_scene)
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::Start => &self.start,
            SceneKey::Game => &self.game,
            SceneKey::Pause => &self.pause,
        }
    }

    fn runtime_and_resources(&mut self, key: SceneKey) -> (&mut SceneRuntime, &mut SceneResources) {
        let runtime = match key {
            SceneKey::Start => &mut self.start,
            SceneKey::Game => &mut self.game,
            SceneKey::Pause => &mut self.pause,
        };
        (runtime, &mut self.resources)
    }
}
