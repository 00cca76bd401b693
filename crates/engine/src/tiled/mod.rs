//! Tiled JSON map and tileset formats.
//!
//! Maps are parsed once per load and treated as read-only afterwards. Only
//! external tilesets (`source` + `firstgid`) are supported.

mod map;
mod tileset;

use std::path::PathBuf;

use thiserror::Error;

use crate::assets::AssetError;

pub use map::{
    ObjectLayer, TileLayer, TiledLayer, TiledMap, TiledObject, TiledProperty, TilesetRef,
};
pub use tileset::{
    clear_flip_flags, load_tilesets, TileDef, Tileset, TilesetDef, TilesetImages, Tilesets,
};

#[derive(Debug, Error)]
pub enum TiledError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tiled json in {origin} at '{json_path}': {source}")]
    Parse {
        origin: String,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tileset with firstgid {first_gid} is embedded; only external tilesets are supported")]
    EmbeddedTileset { first_gid: u32 },
    #[error("tileset {path} declares neither an atlas image nor per-tile images")]
    EmptyTileset { path: PathBuf },
    #[error(transparent)]
    Asset(#[from] AssetError),
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    raw: &str,
    origin: &str,
) -> Result<T, TiledError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        TiledError::Parse {
            origin: origin.to_string(),
            json_path,
            source: error.into_inner(),
        }
    })
}
