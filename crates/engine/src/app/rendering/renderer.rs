use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::assets::{ImageRegion, ImageStore};
use crate::geometry::{Rect, Vec2};

use super::frame::{HudBar, RenderFrame, SpriteDraw};
use super::text::draw_text_clipped;

/// Software rasterizer over a fixed-size logical buffer that pixels scales
/// to the window.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, buffer_width: u32, buffer_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            size.width,
            size.height,
            buffer_width,
            buffer_height,
        )?;
        Ok(Self {
            window,
            pixels,
            buffer_width,
            buffer_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            width,
            height,
            self.buffer_width,
            self.buffer_height,
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        surface_width: u32,
        surface_height: u32,
        buffer_width: u32,
        buffer_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(buffer_width, buffer_height, surface)
    }

    /// Maps a physical window position to logical buffer pixels. Positions in
    /// the letterbox area are clamped to the nearest buffer edge.
    pub fn window_pos_to_logical(&self, x: f32, y: f32) -> Vec2 {
        match self.pixels.window_pos_to_pixel((x, y)) {
            Ok((px, py)) => Vec2::new(px as f32, py as f32),
            Err((px, py)) => {
                let (cx, cy) = self.pixels.clamp_pixel_pos((px, py));
                Vec2::new(cx as f32, cy as f32)
            }
        }
    }

    pub fn render(&mut self, frame: &RenderFrame, images: &ImageStore) -> Result<(), Error> {
        rasterize(
            self.pixels.frame_mut(),
            self.buffer_width,
            self.buffer_height,
            frame,
            images,
        );
        self.pixels.render()
    }
}

pub(crate) fn rasterize(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    frame: &RenderFrame,
    images: &ImageStore,
) {
    if width == 0 || height == 0 {
        return;
    }
    let clear_color = frame.clear_color();
    for chunk in buffer.chunks_exact_mut(4) {
        chunk.copy_from_slice(&clear_color);
    }
    for panel in frame.panels() {
        fill_rect_clipped(buffer, width, height, panel.rect, panel.color);
    }
    for tile in frame.tiles() {
        draw_sprite(buffer, width, height, tile, images);
    }
    for sprite in frame.sprites_in_draw_order() {
        draw_sprite(buffer, width, height, sprite, images);
    }
    for outline in frame.outlines() {
        draw_rect_outline(buffer, width, height, outline.rect, outline.color);
    }
    for bar in frame.bars() {
        draw_bar(buffer, width, height, bar);
    }
    for text in frame.texts() {
        draw_text_clipped(buffer, width, height, text.x, text.y, &text.text, text.color);
    }
}

fn draw_sprite(buffer: &mut [u8], width: u32, height: u32, draw: &SpriteDraw, images: &ImageStore) {
    let Some(region) = images.sub_region(draw.image, draw.source) else {
        return;
    };
    blit_region(buffer, width, height, &region, draw.screen_x, draw.screen_y);
}

fn blit_region(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    region: &ImageRegion<'_>,
    left: i32,
    top: i32,
) {
    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = (left + region.width() as i32).min(width as i32);
    let draw_bottom = (top + region.height() as i32).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    for out_y in draw_top..draw_bottom {
        for out_x in draw_left..draw_right {
            let Some(src) = region.pixel((out_x - left) as u32, (out_y - top) as u32) else {
                continue;
            };
            blend_pixel_clipped(buffer, width as usize, out_x, out_y, src);
        }
    }
}

fn draw_bar(buffer: &mut [u8], width: u32, height: u32, bar: &HudBar) {
    let back = Rect::from_position_size(bar.x, bar.y, bar.width, bar.height);
    fill_rect_clipped(buffer, width, height, back, bar.back_color);
    let fill_width = bar.fill_width.clamp(0, bar.width);
    if fill_width > 0 {
        let fill = Rect::from_position_size(bar.x, bar.y, fill_width, bar.height);
        fill_rect_clipped(buffer, width, height, fill, bar.fill_color);
    }
}

fn fill_rect_clipped(buffer: &mut [u8], width: u32, height: u32, rect: Rect, color: [u8; 4]) {
    let left = rect.min_x.max(0);
    let top = rect.min_y.max(0);
    let right = rect.max_x.min(width as i32);
    let bottom = rect.max_y.min(height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(buffer, width as usize, x, y, color);
        }
    }
}

fn draw_rect_outline(buffer: &mut [u8], width: u32, height: u32, rect: Rect, color: [u8; 4]) {
    if rect.is_empty() || width == 0 || height == 0 {
        return;
    }
    let right = rect.max_x - 1;
    let bottom = rect.max_y - 1;
    for x in rect.min_x..=right {
        write_pixel_rgba_clipped(buffer, width as usize, x, rect.min_y, color);
        write_pixel_rgba_clipped(buffer, width as usize, x, bottom, color);
    }
    for y in rect.min_y..=bottom {
        write_pixel_rgba_clipped(buffer, width as usize, rect.min_x, y, color);
        write_pixel_rgba_clipped(buffer, width as usize, right, y, color);
    }
}

fn pixel_byte_range(buffer_len: usize, width: usize, x: i32, y: i32) -> Option<(usize, usize)> {
    if x < 0 || y < 0 || x as usize >= width {
        return None;
    }
    let pixel_offset = (y as usize).checked_mul(width)?.checked_add(x as usize)?;
    let byte_offset = pixel_offset.checked_mul(4)?;
    let end = byte_offset.checked_add(4)?;
    (end <= buffer_len).then_some((byte_offset, end))
}

pub(super) fn write_pixel_rgba_clipped(buffer: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if let Some((start, end)) = pixel_byte_range(buffer.len(), width, x, y) {
        buffer[start..end].copy_from_slice(&color);
    }
}

fn blend_pixel_clipped(buffer: &mut [u8], width: usize, x: i32, y: i32, src: [u8; 4]) {
    let alpha = src[3];
    if alpha == 0 {
        return;
    }
    let Some((start, end)) = pixel_byte_range(buffer.len(), width, x, y) else {
        return;
    };
    let dst = &mut buffer[start..end];
    if alpha == u8::MAX {
        dst.copy_from_slice(&src);
        return;
    }
    let a = alpha as u32;
    for channel in 0..3 {
        let blended = (src[channel] as u32 * a + dst[channel] as u32 * (255 - a)) / 255;
        dst[channel] = blended as u8;
    }
    dst[3] = u8::MAX;
}
