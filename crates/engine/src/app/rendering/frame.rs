use crate::assets::ImageHandle;
use crate::geometry::Rect;

pub const DEFAULT_CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];

/// One image region placed at a screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub image: ImageHandle,
    pub source: Rect,
    pub screen_x: i32,
    pub screen_y: i32,
    /// World Y used for ordering; lower values draw first.
    pub depth: f32,
}

/// Horizontal gauge, e.g. a health bar. `fill_width` is clamped to `width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudBar {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub fill_width: i32,
    pub back_color: [u8; 4],
    pub fill_color: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub rect: Rect,
    pub color: [u8; 4],
}

/// A line of bitmap text; `x`/`y` is the top-left of the first glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenText {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub color: [u8; 4],
}

/// Everything one frame draws, in screen pixels of the logical buffer.
///
/// Layers are painted in a fixed order: clear, panels, tiles (push order),
/// sprites (ascending depth, stable), outlines, bars, text.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    clear_color: [u8; 4],
    panels: Vec<ScreenRect>,
    tiles: Vec<SpriteDraw>,
    sprites: Vec<SpriteDraw>,
    outlines: Vec<ScreenRect>,
    bars: Vec<HudBar>,
    texts: Vec<ScreenText>,
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_COLOR)
    }
}

impl RenderFrame {
    pub fn new(clear_color: [u8; 4]) -> Self {
        Self {
            clear_color,
            panels: Vec::new(),
            tiles: Vec::new(),
            sprites: Vec::new(),
            outlines: Vec::new(),
            bars: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.panels.clear();
        self.tiles.clear();
        self.sprites.clear();
        self.outlines.clear();
        self.bars.clear();
        self.texts.clear();
    }

    pub fn set_clear_color(&mut self, color: [u8; 4]) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> [u8; 4] {
        self.clear_color
    }

    pub fn push_panel(&mut self, rect: Rect, color: [u8; 4]) {
        self.panels.push(ScreenRect { rect, color });
    }

    pub fn push_tile(&mut self, draw: SpriteDraw) {
        self.tiles.push(draw);
    }

    pub fn push_sprite(&mut self, draw: SpriteDraw) {
        self.sprites.push(draw);
    }

    pub fn push_outline(&mut self, rect: Rect, color: [u8; 4]) {
        self.outlines.push(ScreenRect { rect, color });
    }

    pub fn push_bar(&mut self, bar: HudBar) {
        self.bars.push(bar);
    }

    pub fn push_text(&mut self, x: i32, y: i32, text: impl Into<String>, color: [u8; 4]) {
        self.texts.push(ScreenText {
            x,
            y,
            text: text.into(),
            color,
        });
    }

    pub fn panels(&self) -> &[ScreenRect] {
        &self.panels
    }

    pub fn tiles(&self) -> &[SpriteDraw] {
        &self.tiles
    }

    pub fn outlines(&self) -> &[ScreenRect] {
        &self.outlines
    }

    pub fn bars(&self) -> &[HudBar] {
        &self.bars
    }

    pub fn texts(&self) -> &[ScreenText] {
        &self.texts
    }

    /// Sprites ordered by ascending depth. Equal depths keep push order.
    pub fn sprites_in_draw_order(&self) -> Vec<&SpriteDraw> {
        let mut ordered: Vec<&SpriteDraw> = self.sprites.iter().collect();
        ordered.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        ordered
    }
}
