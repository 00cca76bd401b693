use std::mem;

use engine::tiled::TiledMap;
use engine::{Camera2D, CollisionGrid, InputSnapshot, Vec2};
use tracing::{debug, info};

use super::combat::Combat;
use super::entities::{Enemy, Player, Potion, TrainingDummy};
use super::map_loader::{load_map, LoadedMap, MapLoadError, MapSource, Transition};
use super::motion::{chase_velocity, move_and_collide, player_velocity};
use super::{ATTACK_RANGE_PX, TILE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickStage {
    PlayerMovement,
    Animation,
    Enemies,
    Combat,
    Collectibles,
    Transitions,
    Camera,
}

const TICK_PIPELINE: [TickStage; 7] = [
    TickStage::PlayerMovement,
    TickStage::Animation,
    TickStage::Enemies,
    TickStage::Combat,
    TickStage::Collectibles,
    TickStage::Transitions,
    TickStage::Camera,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Continue,
    MapChanged { map: String, spawn: String },
}

#[derive(Debug, Clone)]
pub(crate) struct World {
    pub(crate) player: Player,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) potions: Vec<Potion>,
    pub(crate) dummies: Vec<TrainingDummy>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) grid: CollisionGrid,
    pub(crate) camera: Camera2D,
    pub(crate) map: TiledMap,
    pub(crate) map_id: String,
    pub(crate) map_size_px: (u32, u32),
    pub(crate) screen_size: (u32, u32),
    pub(crate) tick: u64,
    pub(crate) player_dead: bool,
    last_tick_stages: Vec<TickStage>,
}

impl World {
    pub(crate) fn new(loaded: LoadedMap, screen_size: (u32, u32)) -> Self {
        let mut world = Self {
            player: Player::new(loaded.player_spawn),
            enemies: Vec::new(),
            potions: Vec::new(),
            dummies: Vec::new(),
            transitions: Vec::new(),
            grid: CollisionGrid::new(0, 0),
            camera: Camera2D::default(),
            map: TiledMap {
                width: 0,
                height: 0,
                layers: Vec::new(),
                tilesets: Vec::new(),
            },
            map_id: String::new(),
            map_size_px: (0, 0),
            screen_size,
            tick: 0,
            player_dead: false,
            last_tick_stages: Vec::with_capacity(TICK_PIPELINE.len()),
        };
        world.apply_map(loaded);
        world.update_camera();
        world
    }

    pub(crate) fn load(
        source: &dyn MapSource,
        map_id: &str,
        spawn: &str,
        screen_size: (u32, u32),
    ) -> Result<Self, MapLoadError> {
        let loaded = load_map(source, map_id, spawn)?;
        Ok(Self::new(loaded, screen_size))
    }

    pub(crate) fn apply_map(&mut self, loaded: LoadedMap) {
        self.player.body.position = loaded.player_spawn;
        self.player.body.velocity = Vec2::ZERO;
        self.enemies = loaded.enemies;
        self.potions = loaded.potions;
        self.dummies = loaded.dummies;
        self.transitions = loaded.transitions;
        self.grid = loaded.grid;
        self.map = loaded.map;
        self.map_id = loaded.id;
        self.map_size_px = loaded.size_px;
    }

    /// Advances the simulation by one tick. A map transition ends the tick
    /// right after the new map is in place, before the camera moves.
    pub(crate) fn step(
        &mut self,
        input: &InputSnapshot,
        maps: &dyn MapSource,
    ) -> Result<TickOutcome, MapLoadError> {
        self.tick += 1;
        self.last_tick_stages.clear();
        for stage in TICK_PIPELINE {
            self.last_tick_stages.push(stage);
            match stage {
                TickStage::PlayerMovement => self.move_player(input),
                TickStage::Animation => self.advance_animations(),
                TickStage::Enemies => self.update_enemies(),
                TickStage::Combat => self.resolve_combat(input),
                TickStage::Collectibles => self.collect_potions(),
                TickStage::Transitions => {
                    if let Some(outcome) = self.follow_transition(maps)? {
                        return Ok(outcome);
                    }
                }
                TickStage::Camera => self.update_camera(),
            }
        }
        Ok(TickOutcome::Continue)
    }

    #[cfg(test)]
    pub(crate) fn last_tick_stages(&self) -> &[TickStage] {
        &self.last_tick_stages
    }

    fn move_player(&mut self, input: &InputSnapshot) {
        self.player.body.velocity = player_velocity(input);
        move_and_collide(&mut self.player.body, &self.grid);
    }

    fn advance_animations(&mut self) {
        self.player.update_attack();
        self.player.advance_animation();
        for dummy in &mut self.dummies {
            dummy.update();
        }
    }

    fn update_enemies(&mut self) {
        let target = self.player.body.position;
        for enemy in &mut self.enemies {
            enemy.combat.update(self.tick);
            enemy.body.velocity = if enemy.follows_player {
                chase_velocity(enemy.body.position, target)
            } else {
                Vec2::ZERO
            };
            move_and_collide(&mut enemy.body, &self.grid);
        }
    }

    fn resolve_combat(&mut self, input: &InputSnapshot) {
        let clicked = input.left_click_pressed();
        // Without a cursor the swing still plays; only the hit tests are skipped.
        let click_world = input
            .cursor_position_px()
            .filter(|_| clicked)
            .map(|cursor| self.camera.screen_to_world(cursor));

        self.player.combat.update(self.tick);
        if clicked {
            self.player.start_attack();
            self.player.combat.attack();
        }

        let player_box = self.player.body.bounds();
        let player_position = self.player.body.position;
        let player_attack = self.player.combat.attack_power();
        let mut dead = Vec::new();

        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            if enemy.body.bounds().overlaps(&player_box) && enemy.combat.attack() {
                let damage = enemy.combat.attack_power();
                self.player.combat.damage(damage);
                let health = self.player.combat.health();
                info!(damage, health, "player_damaged");
                if health <= 0 && !self.player_dead {
                    self.player_dead = true;
                    info!(health, tick = self.tick, "player_died");
                }
            }

            let Some(point) = click_world else {
                continue;
            };
            if !enemy.body.bounds().contains_point(point)
                || enemy.body.position.distance(player_position) >= ATTACK_RANGE_PX
            {
                continue;
            }
            enemy.combat.damage(player_attack);
            let health = enemy.combat.health();
            info!(damage = player_attack, health, "enemy_damaged");
            if health <= 0 {
                dead.push(index);
            }
        }

        if let Some(point) = click_world {
            for dummy in &mut self.dummies {
                if dummy.bounds().contains_point(point)
                    && dummy.position.distance(player_position) < ATTACK_RANGE_PX
                    && dummy.hit()
                {
                    info!(x = dummy.position.x, y = dummy.position.y, "dummy_hit");
                }
            }
        }

        if !dead.is_empty() {
            self.enemies = mem::take(&mut self.enemies)
                .into_iter()
                .enumerate()
                .filter(|(index, _)| !dead.contains(index))
                .map(|(_, enemy)| enemy)
                .collect();
            info!(killed = dead.len(), remaining = self.enemies.len(), "enemy_killed");
        }
    }

    fn collect_potions(&mut self) {
        let player_box = self.player.body.bounds();
        let mut collected = Vec::new();
        for (index, potion) in self.potions.iter().enumerate() {
            if !potion.bounds().overlaps(&player_box) {
                continue;
            }
            if self.player.combat.health() >= self.player.combat.max_health() {
                continue;
            }
            self.player.combat.heal(potion.heal_amount);
            let health = self.player.combat.health();
            info!(amount = potion.heal_amount, health, "player_healed");
            collected.push(index);
        }

        if collected.is_empty() {
            return;
        }
        if self.player.combat.health() > 0 {
            self.player_dead = false;
        }
        self.potions = mem::take(&mut self.potions)
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !collected.contains(index))
            .map(|(_, potion)| potion)
            .collect();
    }

    fn follow_transition(
        &mut self,
        maps: &dyn MapSource,
    ) -> Result<Option<TickOutcome>, MapLoadError> {
        let player_box = self.player.body.bounds();
        let Some(transition) = self
            .transitions
            .iter()
            .find(|transition| transition.bounds.overlaps(&player_box))
            .cloned()
        else {
            return Ok(None);
        };

        let loaded = load_map(maps, &transition.target_map, &transition.target_spawn)?;
        info!(
            from = %self.map_id,
            to = %transition.target_map,
            spawn = %transition.target_spawn,
            "map_transition"
        );
        self.apply_map(loaded);
        Ok(Some(TickOutcome::MapChanged {
            map: transition.target_map,
            spawn: transition.target_spawn,
        }))
    }

    fn update_camera(&mut self) {
        let half_tile = TILE_SIZE as f32 / 2.0;
        let target = Vec2::new(
            self.player.body.position.x + half_tile,
            self.player.body.position.y + half_tile,
        );
        self.camera.follow(target, self.screen_size);
        self.camera.constrain(self.map_size_px, self.screen_size);
        debug!(x = self.camera.offset.x, y = self.camera.offset.y, "camera_updated");
    }
}
