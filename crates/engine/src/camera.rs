use crate::geometry::{Rect, Vec2};

/// Screen-space translation applied to world positions: `screen = world + offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub offset: Vec2,
}

impl Camera2D {
    pub fn new(offset: Vec2) -> Self {
        Self { offset }
    }

    /// Centers the view on `target`.
    pub fn follow(&mut self, target: Vec2, screen_size: (u32, u32)) {
        self.offset = Vec2 {
            x: -target.x + screen_size.0 as f32 / 2.0,
            y: -target.y + screen_size.1 as f32 / 2.0,
        };
    }

    /// Keeps the view inside a map of `map_size_px`. Each axis is clamped to
    /// `[screen - map, 0]`; when the map is smaller than the screen the lower
    /// bound wins and the map sits against the bottom-right edge.
    pub fn constrain(&mut self, map_size_px: (u32, u32), screen_size: (u32, u32)) {
        self.offset.x = clamp_axis(self.offset.x, map_size_px.0, screen_size.0);
        self.offset.y = clamp_axis(self.offset.y, map_size_px.1, screen_size.1);
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2 {
            x: world.x + self.offset.x,
            y: world.y + self.offset.y,
        }
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2 {
            x: screen.x - self.offset.x,
            y: screen.y - self.offset.y,
        }
    }

    /// World-space rectangle currently visible on a screen of `screen_size`.
    pub fn view_rect(&self, screen_size: (u32, u32)) -> Rect {
        let min_x = (-self.offset.x) as i32;
        let min_y = (-self.offset.y) as i32;
        Rect::from_position_size(min_x, min_y, screen_size.0 as i32, screen_size.1 as i32)
    }
}

fn clamp_axis(offset: f32, map_px: u32, screen_px: u32) -> f32 {
    offset.min(0.0).max(screen_px as f32 - map_px as f32)
}
