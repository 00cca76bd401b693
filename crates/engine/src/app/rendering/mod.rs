mod frame;
mod renderer;
mod text;

pub use frame::{
    HudBar, RenderFrame, ScreenRect, ScreenText, SpriteDraw, DEFAULT_CLEAR_COLOR,
};
pub use renderer::Renderer;
pub use text::{text_width, LINE_HEIGHT};
