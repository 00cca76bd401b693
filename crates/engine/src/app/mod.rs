mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    text_width, HudBar, RenderFrame, Renderer, ScreenRect, ScreenText, SpriteDraw,
    DEFAULT_CLEAR_COLOR, LINE_HEIGHT,
};
pub use scene::{
    InputSnapshot, Scene, SceneCommand, SceneError, SceneKey, SceneMachine, SceneResources,
    SceneSet,
};
