use crate::geometry::Rect;

/// Looping frame clock over sprite-sheet indices `first..=last` in `step`
/// increments.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    first: usize,
    last: usize,
    step: usize,
    ticks_per_frame: f32,
    frame_counter: f32,
    frame: usize,
}

impl Animation {
    pub fn new(first: usize, last: usize, step: usize, ticks_per_frame: f32) -> Self {
        Self {
            first,
            last,
            step,
            ticks_per_frame,
            frame_counter: ticks_per_frame,
            frame: first,
        }
    }

    /// Advances the clock by one tick. The frame moves once the counter drops
    /// below zero, i.e. every `ticks_per_frame + 1` ticks.
    pub fn update(&mut self) {
        self.frame_counter -= 1.0;
        if self.frame_counter < 0.0 {
            self.frame_counter = self.ticks_per_frame;
            self.frame += self.step;
            if self.frame > self.last {
                self.frame = self.first;
            }
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn first_frame(&self) -> usize {
        self.first
    }

    pub fn reset(&mut self) {
        self.frame_counter = self.ticks_per_frame;
        self.frame = self.first;
    }
}

/// Grid layout of equally sized frames inside one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSheet {
    pub columns: u32,
    pub rows: u32,
    pub tile_size: u32,
}

impl SpriteSheet {
    pub fn new(columns: u32, rows: u32, tile_size: u32) -> Self {
        Self {
            columns: columns.max(1),
            rows,
            tile_size,
        }
    }

    /// Source rectangle of frame `index`, laid out row-major.
    pub fn rect(&self, index: usize) -> Rect {
        let index = index as u32;
        let x = (index % self.columns) * self.tile_size;
        let y = (index / self.columns) * self.tile_size;
        Rect::from_position_size(
            x as i32,
            y as i32,
            self.tile_size as i32,
            self.tile_size as i32,
        )
    }
}
