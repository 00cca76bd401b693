use engine::{
    InputSnapshot, Rect, RenderFrame, Scene, SceneCommand, SceneError, SceneKey, SceneResources,
};
use tracing::info;

const MENU_CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];
const MENU_TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
const PROMPT_PANEL_COLOR: [u8; 4] = [40, 44, 56, 255];
const PROMPT_PANEL: Rect = Rect::new(100, 100, 300, 200);
const EXIT_PANEL: Rect = Rect::new(100, 150, 300, 170);
const EXIT_PANEL_COLOR: [u8; 4] = [90, 30, 30, 255];
const TEXT_INSET: i32 = 4;

const START_PROMPT: &str = "Press ENTER to start.";
const PAUSED_TITLE: &str = "PAUSED";
const PAUSED_TITLE_POS: (i32, i32) = (150, 10);
const RESUME_PROMPT: &str = "Press ENTER to unpause.";
const EXIT_PROMPT: &str = "Press ESCAPE to exit.";

fn push_panel_text(frame: &mut RenderFrame, panel: Rect, text: &str) {
    frame.push_text(
        panel.min_x + TEXT_INSET,
        panel.min_y + TEXT_INSET,
        text,
        MENU_TEXT_COLOR,
    );
}

/// Title screen. Enter starts the game.
#[derive(Debug, Default)]
pub(crate) struct StartScene;

impl Scene for StartScene {
    fn load(&mut self, _resources: &mut SceneResources) -> Result<(), SceneError> {
        info!(scene = "start", "scene_loaded");
        Ok(())
    }

    fn update(
        &mut self,
        input: &InputSnapshot,
        _resources: &mut SceneResources,
    ) -> Result<SceneCommand, SceneError> {
        if input.confirm_pressed() {
            return Ok(SceneCommand::SwitchTo(SceneKey::Game));
        }
        Ok(SceneCommand::None)
    }

    fn render(&self, _resources: &SceneResources, frame: &mut RenderFrame) {
        frame.set_clear_color(MENU_CLEAR_COLOR);
        frame.push_panel(PROMPT_PANEL, PROMPT_PANEL_COLOR);
        push_panel_text(frame, PROMPT_PANEL, START_PROMPT);
    }

    fn window_title(&self) -> Option<String> {
        Some("RPG".to_string())
    }
}

/// Enter resumes the game where it left off; Escape quits.
#[derive(Debug, Default)]
pub(crate) struct PauseScene;

impl Scene for PauseScene {
    fn load(&mut self, _resources: &mut SceneResources) -> Result<(), SceneError> {
        info!(scene = "pause", "scene_loaded");
        Ok(())
    }

    fn update(
        &mut self,
        input: &InputSnapshot,
        _resources: &mut SceneResources,
    ) -> Result<SceneCommand, SceneError> {
        if input.pause_pressed() {
            return Ok(SceneCommand::Quit);
        }
        if input.confirm_pressed() {
            return Ok(SceneCommand::SwitchTo(SceneKey::Game));
        }
        Ok(SceneCommand::None)
    }

    fn render(&self, _resources: &SceneResources, frame: &mut RenderFrame) {
        frame.set_clear_color(MENU_CLEAR_COLOR);
        frame.push_panel(PROMPT_PANEL, PROMPT_PANEL_COLOR);
        frame.push_panel(EXIT_PANEL, EXIT_PANEL_COLOR);
        frame.push_text(
            PAUSED_TITLE_POS.0,
            PAUSED_TITLE_POS.1,
            PAUSED_TITLE,
            MENU_TEXT_COLOR,
        );
        push_panel_text(frame, PROMPT_PANEL, RESUME_PROMPT);
        push_panel_text(frame, EXIT_PANEL, EXIT_PROMPT);
    }

    fn window_title(&self) -> Option<String> {
        Some("RPG | Paused".to_string())
    }
}
