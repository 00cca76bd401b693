mod combat;
mod entities;
mod hud;
mod map_loader;
mod motion;
mod scene;
mod world;


pub(crate) use scene::GameScene;

pub(crate) const TILE_SIZE: i32 = 16;
pub(crate) const COLLISION_CELL_SIZE: i32 = 64;
pub(crate) const DEFAULT_SPAWN_NAME: &str = "default";

const PLAYER_INPUT_STEP: f32 = 2.0;
const PLAYER_SPEED: f32 = 2.0;
const CHASE_STEP: f32 = 1.0;
const CHASE_DEAD_ZONE: f32 = 1.0;
const ATTACK_RANGE_PX: f32 = TILE_SIZE as f32 * 2.5;

const PLAYER_HEALTH: i32 = 10;
const PLAYER_ATTACK_POWER: i32 = 1;
const PLAYER_ATTACK_TICKS: u32 = 20;

const ENEMY_HEALTH: i32 = 3;
const ENEMY_ATTACK_POWER: i32 = 1;
const ENEMY_ATTACK_COOLDOWN_TICKS: u32 = 60;

const DEFAULT_POTION_HEAL: i32 = 2;

const DUMMY_FRAME_COUNT: u32 = 4;
const DUMMY_TICKS_PER_FRAME: u32 = 10;
