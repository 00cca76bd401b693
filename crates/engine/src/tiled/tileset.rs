use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{parse_json, TiledError, TiledMap};
use crate::assets::{ImageHandle, ImageStore};
use crate::geometry::Rect;

const FLIP_FLAGS_MASK: u32 = 0xE000_0000;
const DEFAULT_TILE_SIZE: u32 = 16;

/// Strips Tiled's horizontal, vertical and diagonal flip bits from a GID.
pub fn clear_flip_flags(gid: u32) -> u32 {
    gid & !FLIP_FLAGS_MASK
}

/// External tileset file as exported by Tiled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TilesetDef {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub columns: u32,
    #[serde(default = "default_tile_size")]
    pub tilewidth: u32,
    #[serde(default = "default_tile_size")]
    pub tileheight: u32,
    #[serde(default)]
    pub tiles: Vec<TileDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileDef {
    pub id: u32,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

#[derive(Debug, Clone, PartialEq)]
pub enum TilesetImages {
    /// One image cut into a grid of `columns` tiles per row.
    Atlas { image: ImageHandle, columns: u32 },
    /// One image per local tile id.
    Collection(HashMap<u32, (ImageHandle, Rect)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    pub first_gid: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub images: TilesetImages,
}

impl Tileset {
    pub fn new(first_gid: u32, tile_width: u32, tile_height: u32, images: TilesetImages) -> Self {
        Self {
            first_gid,
            tile_width,
            tile_height,
            images,
        }
    }

    pub fn load(path: &Path, first_gid: u32, images: &mut ImageStore) -> Result<Self, TiledError> {
        let raw = fs::read_to_string(path).map_err(|source| TiledError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let def: TilesetDef = parse_json(&raw, &path.display().to_string())?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_def(&def, path, base_dir, first_gid, images)
    }

    /// Builds a tileset from an already parsed definition. Image paths resolve
    /// against `base_dir`; `path` only names the tileset in logs and errors.
    pub fn from_def(
        def: &TilesetDef,
        path: &Path,
        base_dir: &Path,
        first_gid: u32,
        images: &mut ImageStore,
    ) -> Result<Self, TiledError> {
        let tile_width = def.tilewidth.max(1);
        let tile_height = def.tileheight.max(1);

        if let Some(image) = def.image.as_deref().filter(|image| !image.is_empty()) {
            let image_path = base_dir.join(image);
            let handle = images.load_file(&image_path.display().to_string(), &image_path)?;
            let mut columns = def.columns;
            if columns == 0 {
                let width = images.get(handle).map(|image| image.width()).unwrap_or(0);
                columns = (width / tile_width).max(1);
                warn!(
                    tileset = %path.display(),
                    columns,
                    "tileset_columns_missing"
                );
            }
            debug!(tileset = %path.display(), first_gid, columns, "atlas_tileset_loaded");
            return Ok(Self::new(
                first_gid,
                tile_width,
                tile_height,
                TilesetImages::Atlas {
                    image: handle,
                    columns,
                },
            ));
        }

        let mut tiles = HashMap::new();
        for tile in &def.tiles {
            let Some(image) = tile.image.as_deref() else {
                continue;
            };
            let image_path = base_dir.join(image);
            let handle = images.load_file(&image_path.display().to_string(), &image_path)?;
            let bounds = images
                .get(handle)
                .map(|image| image.bounds())
                .unwrap_or_default();
            tiles.insert(tile.id, (handle, bounds));
        }
        if tiles.is_empty() {
            return Err(TiledError::EmptyTileset {
                path: path.to_path_buf(),
            });
        }
        debug!(
            tileset = %path.display(),
            first_gid,
            tiles = tiles.len(),
            "collection_tileset_loaded"
        );
        Ok(Self::new(
            first_gid,
            tile_width,
            tile_height,
            TilesetImages::Collection(tiles),
        ))
    }

    /// Image and source rectangle for `gid`, which must already belong to
    /// this tileset.
    pub fn tile_source(&self, gid: u32) -> Option<(ImageHandle, Rect)> {
        let local = clear_flip_flags(gid).checked_sub(self.first_gid)?;
        match &self.images {
            TilesetImages::Atlas { image, columns } => {
                let columns = (*columns).max(1);
                let x = (local % columns) * self.tile_width;
                let y = (local / columns) * self.tile_height;
                Some((
                    *image,
                    Rect::from_position_size(
                        x as i32,
                        y as i32,
                        self.tile_width as i32,
                        self.tile_height as i32,
                    ),
                ))
            }
            TilesetImages::Collection(tiles) => tiles.get(&local).copied(),
        }
    }
}

/// All tilesets of one map, ordered by `first_gid`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tilesets {
    sets: Vec<Tileset>,
}

impl Tilesets {
    pub fn new(mut sets: Vec<Tileset>) -> Self {
        sets.sort_by_key(|set| set.first_gid);
        Self { sets }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Tileset owning `gid`: the one with the greatest `first_gid <= gid`.
    /// GID 0 is an empty cell.
    pub fn resolve(&self, gid: u32) -> Option<&Tileset> {
        let gid = clear_flip_flags(gid);
        if gid == 0 {
            return None;
        }
        self.sets.iter().rev().find(|set| set.first_gid <= gid)
    }

    pub fn tile_source(&self, gid: u32) -> Option<(ImageHandle, Rect)> {
        self.resolve(gid)?.tile_source(gid)
    }
}

/// Loads every tileset referenced by `map`, resolving `source` paths against
/// `map_dir`.
pub fn load_tilesets(
    map: &TiledMap,
    map_dir: &Path,
    images: &mut ImageStore,
) -> Result<Tilesets, TiledError> {
    let mut sets = Vec::with_capacity(map.tilesets.len());
    for reference in &map.tilesets {
        let Some(source) = reference.source.as_deref() else {
            return Err(TiledError::EmbeddedTileset {
                first_gid: reference.firstgid,
            });
        };
        sets.push(Tileset::load(
            &map_dir.join(source),
            reference.firstgid,
            images,
        )?);
    }
    Ok(Tilesets::new(sets))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn atlas(first_gid: u32, handle: u32, columns: u32) -> Tileset {
        Tileset::new(
            first_gid,
            16,
            16,
            TilesetImages::Atlas {
                image: ImageHandle(handle),
                columns,
            },
        )
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([9, 9, 9, 255]))
            .save(path)
            .expect("write png");
    }

    #[test]
    fn flip_flags_are_masked() {
        assert_eq!(clear_flip_flags(0x8000_0005), 5);
        assert_eq!(clear_flip_flags(0xE000_0001), 1);
        assert_eq!(clear_flip_flags(42), 42);
    }

    #[test]
    fn resolve_picks_greatest_first_gid_not_above_gid() {
        let sets = Tilesets::new(vec![atlas(33, 1, 4), atlas(1, 0, 4), atlas(100, 2, 4)]);
        assert!(sets.resolve(0).is_none());
        assert_eq!(sets.resolve(1).map(|s| s.first_gid), Some(1));
        assert_eq!(sets.resolve(32).map(|s| s.first_gid), Some(1));
        assert_eq!(sets.resolve(33).map(|s| s.first_gid), Some(33));
        assert_eq!(sets.resolve(99).map(|s| s.first_gid), Some(33));
        assert_eq!(sets.resolve(0x4000_0064).map(|s| s.first_gid), Some(100));
    }

    #[test]
    fn gid_below_every_first_gid_is_unresolved() {
        let sets = Tilesets::new(vec![atlas(10, 0, 4)]);
        assert!(sets.resolve(3).is_none());
    }

    #[test]
    fn atlas_source_rect_uses_columns() {
        let sets = Tilesets::new(vec![atlas(1, 0, 4), atlas(50, 7, 2)]);
        assert_eq!(
            sets.tile_source(1),
            Some((ImageHandle(0), Rect::new(0, 0, 16, 16)))
        );
        assert_eq!(
            sets.tile_source(6),
            Some((ImageHandle(0), Rect::new(16, 16, 32, 32)))
        );
        assert_eq!(
            sets.tile_source(53),
            Some((ImageHandle(7), Rect::new(16, 16, 32, 32)))
        );
    }

    #[test]
    fn atlas_without_columns_derives_them_from_image_width() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(&dir.path().join("floor.png"), 64, 32);
        let def: TilesetDef = serde_json::from_value(json!({
            "image": "floor.png", "tilewidth": 16, "tileheight": 16
        }))
        .expect("def");

        let mut images = ImageStore::default();
        let tileset = Tileset::from_def(&def, Path::new("floor.json"), dir.path(), 1, &mut images)
            .expect("tileset");
        assert!(matches!(tileset.images, TilesetImages::Atlas { columns: 4, .. }));
        assert_eq!(tileset.tile_source(5).map(|(_, r)| r), Some(Rect::new(0, 16, 16, 32)));
    }

    #[test]
    fn collection_tileset_maps_local_ids_to_whole_images() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(&dir.path().join("tree.png"), 32, 48);
        write_png(&dir.path().join("rock.png"), 16, 16);
        let def: TilesetDef = serde_json::from_value(json!({
            "tiles": [
                { "id": 0, "image": "tree.png" },
                { "id": 3, "image": "rock.png" }
            ]
        }))
        .expect("def");

        let mut images = ImageStore::default();
        let tileset = Tileset::from_def(&def, Path::new("props.json"), dir.path(), 20, &mut images)
            .expect("tileset");
        assert_eq!(tileset.tile_source(20).map(|(_, r)| r), Some(Rect::new(0, 0, 32, 48)));
        assert_eq!(tileset.tile_source(23).map(|(_, r)| r), Some(Rect::new(0, 0, 16, 16)));
        assert!(tileset.tile_source(21).is_none());
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn empty_tileset_is_rejected() {
        let def: TilesetDef = serde_json::from_value(json!({ "tiles": [] })).expect("def");
        let mut images = ImageStore::default();
        let result = Tileset::from_def(&def, Path::new("void.json"), Path::new("."), 1, &mut images);
        assert!(matches!(result, Err(TiledError::EmptyTileset { .. })));
    }

    #[test]
    fn load_tilesets_reads_external_files_next_to_map() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(&dir.path().join("floor.png"), 32, 32);
        fs::write(
            dir.path().join("floor.json"),
            json!({ "image": "floor.png", "columns": 2, "tilewidth": 16, "tileheight": 16 })
                .to_string(),
        )
        .expect("write tileset");
        let map = TiledMap::from_json_str(
            &json!({ "layers": [], "tilesets": [{ "firstgid": 1, "source": "floor.json" }] })
                .to_string(),
        )
        .expect("map");

        let mut images = ImageStore::default();
        let sets = load_tilesets(&map, dir.path(), &mut images).expect("tilesets");
        assert_eq!(sets.len(), 1);
        assert_eq!(sets.tile_source(4).map(|(_, r)| r), Some(Rect::new(16, 16, 32, 32)));
    }

    #[test]
    fn embedded_tilesets_are_rejected() {
        let map = TiledMap::from_json_str(
            &json!({ "layers": [], "tilesets": [{ "firstgid": 1 }] }).to_string(),
        )
        .expect("map");
        let mut images = ImageStore::default();
        let result = load_tilesets(&map, Path::new("."), &mut images);
        assert!(matches!(result, Err(TiledError::EmbeddedTileset { first_gid: 1 })));
    }
}
