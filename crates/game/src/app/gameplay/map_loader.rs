use std::collections::HashMap;
use std::path::{Path, PathBuf};

use engine::tiled::{TiledError, TiledMap, TiledObject};
use engine::{CollisionGrid, Rect, Vec2};
use thiserror::Error;
use tracing::{info, warn};

use super::entities::{Enemy, Potion, TrainingDummy};
use super::{COLLISION_CELL_SIZE, DEFAULT_POTION_HEAL, DEFAULT_SPAWN_NAME, TILE_SIZE};

const COLLISION_LAYER_NAME: &str = "collisions";
const COLLISION_OBJECT: &str = "collision";
const PLAYER_SPAWN_OBJECT: &str = "player_spawn";
const ENEMY_SPAWN_OBJECT: &str = "enemy_spawn";
const POTION_SPAWN_OBJECT: &str = "potion_spawn";
const TRAINING_DUMMY_OBJECT: &str = "training_dummy";
const TRANSITION_OBJECT: &str = "transition";

#[derive(Debug, Error)]
pub(crate) enum MapLoadError {
    #[error(transparent)]
    Tiled(#[from] TiledError),
    #[error("map '{map}' is not available from this map source")]
    UnknownMap { map: String },
    #[error("map '{map}' has no tile layer and no size in its header")]
    NoTileLayer { map: String },
    #[error("map '{map}' has neither spawn point '{requested}' nor 'default'")]
    NoSpawnPoint { map: String, requested: String },
}

/// Where maps come from. Ids are paths relative to the maps root, e.g.
/// `spawn.json` or `dungeon/level1.json`.
pub(crate) trait MapSource {
    fn load(&self, map_id: &str) -> Result<TiledMap, MapLoadError>;

    /// Directory tileset `source` paths of `map_id` are relative to, if the
    /// map lives on disk.
    fn tileset_dir(&self, _map_id: &str) -> Option<PathBuf> {
        None
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DirMapSource {
    maps_dir: PathBuf,
}

impl DirMapSource {
    pub(crate) fn new(maps_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
        }
    }

    fn map_path(&self, map_id: &str) -> PathBuf {
        self.maps_dir.join(map_id)
    }
}

impl MapSource for DirMapSource {
    fn load(&self, map_id: &str) -> Result<TiledMap, MapLoadError> {
        Ok(TiledMap::load(&self.map_path(map_id))?)
    }

    fn tileset_dir(&self, map_id: &str) -> Option<PathBuf> {
        self.map_path(map_id).parent().map(Path::to_path_buf)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryMapSource {
    maps: HashMap<String, TiledMap>,
}

impl InMemoryMapSource {
    pub(crate) fn insert(&mut self, map_id: impl Into<String>, map: TiledMap) {
        self.maps.insert(map_id.into(), map);
    }
}

impl MapSource for InMemoryMapSource {
    fn load(&self, map_id: &str) -> Result<TiledMap, MapLoadError> {
        self.maps
            .get(map_id)
            .cloned()
            .ok_or_else(|| MapLoadError::UnknownMap {
                map: map_id.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) bounds: Rect,
    pub(crate) target_map: String,
    pub(crate) target_spawn: String,
}

#[derive(Debug, Clone)]
pub(crate) struct LoadedMap {
    pub(crate) id: String,
    pub(crate) map: TiledMap,
    pub(crate) size_px: (u32, u32),
    pub(crate) grid: CollisionGrid,
    pub(crate) player_spawn: Vec2,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) potions: Vec<Potion>,
    pub(crate) dummies: Vec<TrainingDummy>,
    pub(crate) transitions: Vec<Transition>,
}

pub(crate) fn load_map(
    source: &dyn MapSource,
    map_id: &str,
    requested_spawn: &str,
) -> Result<LoadedMap, MapLoadError> {
    let map = source.load(map_id)?;
    build_map(map_id, map, requested_spawn)
}

pub(crate) fn build_map(
    map_id: &str,
    map: TiledMap,
    requested_spawn: &str,
) -> Result<LoadedMap, MapLoadError> {
    let (width_tiles, height_tiles) = map.size_in_tiles().ok_or_else(|| MapLoadError::NoTileLayer {
        map: map_id.to_string(),
    })?;
    let size_px = (width_tiles * TILE_SIZE as u32, height_tiles * TILE_SIZE as u32);
    let mut grid =
        CollisionGrid::with_cell_size(size_px.0 as i32, size_px.1 as i32, COLLISION_CELL_SIZE);

    let mut spawn_points = HashMap::new();
    let mut enemies = Vec::new();
    let mut potions = Vec::new();
    let mut dummies = Vec::new();
    let mut transitions = Vec::new();

    for (layer, object) in map.objects() {
        if layer.name == COLLISION_LAYER_NAME || object.kind == COLLISION_OBJECT {
            grid.insert(collider_rect(object));
        }

        let position = Vec2::new(object.x, object.y);
        match object.kind.as_str() {
            PLAYER_SPAWN_OBJECT => {
                let name = if object.name.is_empty() {
                    DEFAULT_SPAWN_NAME.to_string()
                } else {
                    object.name.clone()
                };
                spawn_points.insert(name, position);
            }
            ENEMY_SPAWN_OBJECT => {
                let follows_player = object.bool_property("followsPlayer").unwrap_or(false);
                enemies.push(Enemy::new(position, follows_player));
            }
            POTION_SPAWN_OBJECT => {
                let heal_amount = object
                    .int_property("amount")
                    .and_then(|amount| i32::try_from(amount).ok())
                    .unwrap_or(DEFAULT_POTION_HEAL);
                potions.push(Potion {
                    position,
                    heal_amount,
                });
            }
            TRAINING_DUMMY_OBJECT => dummies.push(TrainingDummy::new(position)),
            TRANSITION_OBJECT => {
                if let Some(transition) = transition_from_object(object) {
                    transitions.push(transition);
                }
            }
            _ => {}
        }
    }

    let player_spawn = pick_spawn(map_id, &spawn_points, requested_spawn)?;

    info!(
        map = %map_id,
        width_px = size_px.0,
        height_px = size_px.1,
        colliders = grid.len(),
        enemies = enemies.len(),
        potions = potions.len(),
        dummies = dummies.len(),
        transitions = transitions.len(),
        "map_loaded"
    );

    Ok(LoadedMap {
        id: map_id.to_string(),
        map,
        size_px,
        grid,
        player_spawn,
        enemies,
        potions,
        dummies,
        transitions,
    })
}

// Tile objects anchor at their bottom-left corner.
fn collider_rect(object: &TiledObject) -> Rect {
    let mut y = object.y;
    if object.gid > 0 {
        y -= object.height;
    }
    Rect::new(
        object.x as i32,
        y as i32,
        (object.x + object.width) as i32,
        (y + object.height) as i32,
    )
}

fn transition_from_object(object: &TiledObject) -> Option<Transition> {
    let target_map = object.string_property("targetMap").unwrap_or_default();
    if target_map.is_empty() {
        warn!(object_id = object.id, "transition_without_target_map");
        return None;
    }
    let target_spawn = object
        .string_property("targetSpawn")
        .filter(|spawn| !spawn.is_empty())
        .unwrap_or(DEFAULT_SPAWN_NAME);
    Some(Transition {
        bounds: object.rect(),
        target_map: target_map.to_string(),
        target_spawn: target_spawn.to_string(),
    })
}

fn pick_spawn(
    map_id: &str,
    spawn_points: &HashMap<String, Vec2>,
    requested: &str,
) -> Result<Vec2, MapLoadError> {
    if let Some(position) = spawn_points.get(requested) {
        return Ok(*position);
    }
    if let Some(position) = spawn_points.get(DEFAULT_SPAWN_NAME) {
        warn!(
            map = %map_id,
            requested = %requested,
            fallback = DEFAULT_SPAWN_NAME,
            "spawn_point_missing"
        );
        return Ok(*position);
    }
    Err(MapLoadError::NoSpawnPoint {
        map: map_id.to_string(),
        requested: requested.to_string(),
    })
}
