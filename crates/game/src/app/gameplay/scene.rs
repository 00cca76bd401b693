use engine::tiled::{load_tilesets, TiledError, Tilesets};
use engine::{
    AssetError, Camera2D, ImageHandle, ImageStore, InputAction, InputSnapshot, Rect, RenderFrame,
    Scene, SceneCommand, SceneError, SceneKey, SceneResources, SpriteDraw, SpriteSheet, Vec2,
};
use tracing::{debug, info};

use super::combat::Combat;
use super::hud::push_health;
use super::map_loader::{DirMapSource, MapSource};
use super::world::{TickOutcome, World};
use super::TILE_SIZE;
use crate::app::config::GameConfig;

const GAME_CLEAR_COLOR: [u8; 4] = [144, 208, 128, 255];
const COLLIDER_OUTLINE_COLOR: [u8; 4] = [255, 0, 0, 255];
const PLAYER_SHEET: SpriteSheet = SpriteSheet {
    columns: 4,
    rows: 7,
    tile_size: 16,
};
const MAPS_DIR: &str = "maps";

#[derive(Debug, Clone, Copy)]
struct SpriteImages {
    player: ImageHandle,
    enemy: ImageHandle,
    potion: ImageHandle,
    dummy: ImageHandle,
}

impl SpriteImages {
    fn load(resources: &mut SceneResources) -> Result<Self, AssetError> {
        Ok(Self {
            player: ensure_image(resources, "player", "images/ninja.png")?,
            enemy: ensure_image(resources, "enemy", "images/skeleton.png")?,
            potion: ensure_image(resources, "potion", "images/health.png")?,
            dummy: ensure_image(resources, "dummy", "images/dummy.png")?,
        })
    }
}

fn ensure_image(
    resources: &mut SceneResources,
    name: &str,
    relative_path: &str,
) -> Result<ImageHandle, AssetError> {
    if let Some(handle) = resources.images.handle(name) {
        return Ok(handle);
    }
    let path = resources.asset_root.join(relative_path);
    resources.images.load_file(name, &path)
}

struct GameState {
    world: World,
    tilesets: Tilesets,
    sprites: SpriteImages,
    show_colliders: bool,
}

pub(crate) struct GameScene {
    config: GameConfig,
    maps: Option<Box<dyn MapSource>>,
    state: Option<GameState>,
}

impl GameScene {
    pub(crate) fn new(config: GameConfig) -> Self {
        Self {
            config,
            maps: None,
            state: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_map_source(config: GameConfig, maps: Box<dyn MapSource>) -> Self {
        Self {
            config,
            maps: Some(maps),
            state: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn world(&self) -> Option<&World> {
        self.state.as_ref().map(|state| &state.world)
    }
}

impl Scene for GameScene {
    fn load(&mut self, resources: &mut SceneResources) -> Result<(), SceneError> {
        if self.state.is_some() {
            return Ok(());
        }
        let maps_dir = resources.asset_root.join(MAPS_DIR);
        let maps: &dyn MapSource = &**self
            .maps
            .get_or_insert_with(|| Box::new(DirMapSource::new(maps_dir)) as Box<dyn MapSource>);

        let sprites = SpriteImages::load(resources)?;
        let world = World::load(
            maps,
            &self.config.start_map,
            &self.config.start_spawn,
            resources.screen_size,
        )
        .map_err(|err| SceneError::failed("loading start map", err))?;
        let tilesets = scene_tilesets(maps, &world.map_id, &world, &mut resources.images)
            .map_err(|err| SceneError::failed("loading tilesets", err))?;

        info!(
            map = %world.map_id,
            spawn = %self.config.start_spawn,
            tilesets = tilesets.len(),
            "game_scene_loaded"
        );
        self.state = Some(GameState {
            world,
            tilesets,
            sprites,
            show_colliders: false,
        });
        Ok(())
    }

    fn update(
        &mut self,
        input: &InputSnapshot,
        resources: &mut SceneResources,
    ) -> Result<SceneCommand, SceneError> {
        if input.pause_pressed() {
            return Ok(SceneCommand::SwitchTo(SceneKey::Pause));
        }
        let (Some(state), Some(maps)) = (self.state.as_mut(), self.maps.as_deref()) else {
            return Ok(SceneCommand::None);
        };

        state.show_colliders = input.is_down(InputAction::ShowColliders);
        let outcome = state
            .world
            .step(input, maps)
            .map_err(|err| SceneError::failed("map transition", err))?;
        if let TickOutcome::MapChanged { map, spawn } = outcome {
            state.tilesets = scene_tilesets(maps, &map, &state.world, &mut resources.images)
                .map_err(|err| SceneError::failed("loading tilesets", err))?;
            debug!(map = %map, spawn = %spawn, tilesets = state.tilesets.len(), "tilesets_reloaded");
        }
        Ok(SceneCommand::None)
    }

    fn render(&self, _resources: &SceneResources, frame: &mut RenderFrame) {
        frame.set_clear_color(GAME_CLEAR_COLOR);
        let Some(state) = &self.state else {
            return;
        };
        let world = &state.world;
        let view = world.camera.view_rect(world.screen_size);

        push_tile_layers(world, &state.tilesets, &view, frame);

        let camera = &world.camera;
        let player = &world.player;
        frame.push_sprite(sprite_draw(
            camera,
            state.sprites.player,
            PLAYER_SHEET.rect(player.sprite_frame()),
            player.body.position,
        ));
        for enemy in &world.enemies {
            frame.push_sprite(sprite_draw(
                camera,
                state.sprites.enemy,
                Rect::new(0, 0, TILE_SIZE, TILE_SIZE),
                enemy.body.position,
            ));
        }
        for potion in &world.potions {
            frame.push_sprite(sprite_draw(
                camera,
                state.sprites.potion,
                Rect::new(0, 0, TILE_SIZE, TILE_SIZE),
                potion.position,
            ));
        }
        for dummy in &world.dummies {
            frame.push_sprite(sprite_draw(
                camera,
                state.sprites.dummy,
                dummy.source_rect(),
                dummy.position,
            ));
        }

        if state.show_colliders {
            for (_, collider) in world.grid.nearby_colliders(&view) {
                frame.push_outline(to_screen_rect(camera, collider), COLLIDER_OUTLINE_COLOR);
            }
        }

        push_health(frame, world.player.combat.snapshot(), world.screen_size.0);
    }

    fn window_title(&self) -> Option<String> {
        let state = self.state.as_ref()?;
        let snapshot = state.world.player.combat.snapshot();
        Some(format!(
            "RPG | {} | HP {}/{}",
            state.world.map_id, snapshot.health, snapshot.max_health
        ))
    }
}

fn scene_tilesets(
    maps: &dyn MapSource,
    map_id: &str,
    world: &World,
    images: &mut ImageStore,
) -> Result<Tilesets, TiledError> {
    match maps.tileset_dir(map_id) {
        Some(dir) => load_tilesets(&world.map, &dir, images),
        None => Ok(Tilesets::default()),
    }
}

/// Tiles taller than a cell grow upward from the cell's bottom edge.
fn push_tile_layers(world: &World, tilesets: &Tilesets, view: &Rect, frame: &mut RenderFrame) {
    for layer in world.map.tile_layers() {
        if layer.width == 0 {
            continue;
        }
        for (index, gid) in layer.data.iter().enumerate() {
            let index = index as u32;
            let cell_x = ((index % layer.width) as i32) * TILE_SIZE;
            let cell_y = ((index / layer.width) as i32) * TILE_SIZE;
            let cell = Rect::from_position_size(cell_x, cell_y, TILE_SIZE, TILE_SIZE);
            if !cell.overlaps(view) {
                continue;
            }
            let Some((image, source)) = tilesets.tile_source(*gid) else {
                continue;
            };
            let lift = (source.height() - TILE_SIZE).max(0);
            let position = Vec2::new(cell_x as f32, (cell_y - lift) as f32);
            let screen = world.camera.world_to_screen(position);
            frame.push_tile(SpriteDraw {
                image,
                source,
                screen_x: screen.x as i32,
                screen_y: screen.y as i32,
                depth: 0.0,
            });
        }
    }
}

fn sprite_draw(camera: &Camera2D, image: ImageHandle, source: Rect, position: Vec2) -> SpriteDraw {
    let screen = camera.world_to_screen(position);
    SpriteDraw {
        image,
        source,
        screen_x: screen.x.floor() as i32,
        screen_y: screen.y.floor() as i32,
        depth: position.y,
    }
}

fn to_screen_rect(camera: &Camera2D, rect: &Rect) -> Rect {
    let screen = camera.world_to_screen(Vec2::new(rect.min_x as f32, rect.min_y as f32));
    Rect::from_position_size(
        screen.x.floor() as i32,
        screen.y.floor() as i32,
        rect.width(),
        rect.height(),
    )
}
