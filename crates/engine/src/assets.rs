use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::geometry::Rect;

/// Opaque reference to an image owned by an [`ImageStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("rgba buffer for {width}x{height} image has {actual} bytes")]
    BufferSize {
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Image {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::BufferSize {
                width,
                height,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn open(path: &Path) -> Result<Self, AssetError> {
        let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// View of the part of `rect` that lies inside the image; `None` when
    /// nothing is left after clipping.
    pub fn sub_region(&self, rect: Rect) -> Option<ImageRegion<'_>> {
        let bounds = self.bounds();
        let clipped = Rect::new(
            rect.min_x.max(bounds.min_x),
            rect.min_y.max(bounds.min_y),
            rect.max_x.min(bounds.max_x),
            rect.max_y.min(bounds.max_y),
        );
        if clipped.is_empty() {
            return None;
        }
        Some(ImageRegion {
            image: self,
            rect: clipped,
        })
    }
}

/// Borrowed rectangular window into an [`Image`].
#[derive(Debug, Clone, Copy)]
pub struct ImageRegion<'a> {
    image: &'a Image,
    rect: Rect,
}

impl ImageRegion<'_> {
    pub fn width(&self) -> u32 {
        self.rect.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.rect.height() as u32
    }

    pub fn source_rect(&self) -> Rect {
        self.rect
    }

    /// Pixel at region-local coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.image.pixel(
            self.rect.min_x as u32 + x,
            self.rect.min_y as u32 + y,
        )
    }
}

/// Images keyed by logical name. Loading the same name twice returns the
/// existing handle.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: Vec<Image>,
    handles_by_name: HashMap<String, ImageHandle>,
}

impl ImageStore {
    pub fn load_file(&mut self, name: &str, path: &Path) -> Result<ImageHandle, AssetError> {
        if let Some(handle) = self.handle(name) {
            return Ok(handle);
        }
        let image = Image::open(path)?;
        debug!(
            name,
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "image_loaded"
        );
        Ok(self.insert(name, image))
    }

    pub fn insert(&mut self, name: &str, image: Image) -> ImageHandle {
        if let Some(handle) = self.handle(name) {
            self.images[handle.0 as usize] = image;
            return handle;
        }
        let handle = ImageHandle(self.images.len() as u32);
        self.images.push(image);
        self.handles_by_name.insert(name.to_string(), handle);
        handle
    }

    pub fn handle(&self, name: &str) -> Option<ImageHandle> {
        self.handles_by_name.get(name).copied()
    }

    pub fn get(&self, handle: ImageHandle) -> Option<&Image> {
        self.images.get(handle.0 as usize)
    }

    pub fn sub_region(&self, handle: ImageHandle, rect: Rect) -> Option<ImageRegion<'_>> {
        self.get(handle)?.sub_region(rect)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> Image {
        let mut rgba = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) % 2) as u8 * 255;
                rgba.extend_from_slice(&[v, x as u8, y as u8, 255]);
            }
        }
        Image::from_rgba(width, height, rgba).expect("image")
    }

    #[test]
    fn from_rgba_rejects_wrong_buffer_size() {
        let result = Image::from_rgba(2, 2, vec![0; 15]);
        assert!(matches!(result, Err(AssetError::BufferSize { actual: 15, .. })));
    }

    #[test]
    fn sub_region_reads_with_local_coordinates() {
        let image = checker(8, 8);
        let region = image.sub_region(Rect::new(4, 2, 8, 6)).expect("region");
        assert_eq!(region.width(), 4);
        assert_eq!(region.height(), 4);
        assert_eq!(region.pixel(0, 0), image.pixel(4, 2));
        assert_eq!(region.pixel(3, 3), image.pixel(7, 5));
        assert_eq!(region.pixel(4, 0), None);
    }

    #[test]
    fn sub_region_clips_to_image_bounds() {
        let image = checker(8, 8);
        let region = image.sub_region(Rect::new(6, 6, 20, 20)).expect("region");
        assert_eq!(region.source_rect(), Rect::new(6, 6, 8, 8));
        assert!(image.sub_region(Rect::new(10, 10, 20, 20)).is_none());
    }

    #[test]
    fn store_reuses_handle_for_same_name() {
        let mut store = ImageStore::default();
        let first = store.insert("potion", Image::solid(2, 2, [255, 0, 0, 255]));
        let second = store.insert("potion", Image::solid(4, 4, [0, 255, 0, 255]));
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(first).map(Image::width), Some(4));
        assert_eq!(store.handle("potion"), Some(first));
        assert_eq!(store.handle("missing"), None);
    }

    #[test]
    fn load_file_reports_missing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = ImageStore::default();
        let result = store.load_file("ghost", &dir.path().join("ghost.png"));
        assert!(matches!(result, Err(AssetError::Open { .. })));
    }

    #[test]
    fn load_file_decodes_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tiny.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .expect("write png");

        let mut store = ImageStore::default();
        let handle = store.load_file("tiny", &path).expect("load");
        let image = store.get(handle).expect("image");
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.pixel(2, 1), Some([1, 2, 3, 255]));
    }
}
