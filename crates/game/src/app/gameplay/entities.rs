use engine::{Animation, Rect, Vec2};

use super::combat::{BasicCombat, EnemyCombat};
use super::{
    DUMMY_FRAME_COUNT, DUMMY_TICKS_PER_FRAME, ENEMY_ATTACK_COOLDOWN_TICKS, ENEMY_ATTACK_POWER,
    ENEMY_HEALTH, PLAYER_ATTACK_POWER, PLAYER_ATTACK_TICKS, PLAYER_HEALTH, TILE_SIZE,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Body {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
}

impl Body {
    pub(crate) fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    pub(crate) fn bounds(&self) -> Rect {
        Rect::square_at(self.position, TILE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerAnimationKind {
    Up,
    Down,
    Left,
    Right,
    Attack,
}

#[derive(Debug, Clone, PartialEq)]
struct PlayerAnimations {
    up: Animation,
    down: Animation,
    left: Animation,
    right: Animation,
    attack: Animation,
}

impl PlayerAnimations {
    fn new() -> Self {
        Self {
            up: Animation::new(5, 13, 4, 20.0),
            down: Animation::new(4, 12, 4, 20.0),
            left: Animation::new(6, 14, 4, 20.0),
            right: Animation::new(7, 15, 4, 20.0),
            attack: Animation::new(19, 19, 0, 20.0),
        }
    }

    fn get(&self, kind: PlayerAnimationKind) -> &Animation {
        match kind {
            PlayerAnimationKind::Up => &self.up,
            PlayerAnimationKind::Down => &self.down,
            PlayerAnimationKind::Left => &self.left,
            PlayerAnimationKind::Right => &self.right,
            PlayerAnimationKind::Attack => &self.attack,
        }
    }

    fn get_mut(&mut self, kind: PlayerAnimationKind) -> &mut Animation {
        match kind {
            PlayerAnimationKind::Up => &mut self.up,
            PlayerAnimationKind::Down => &mut self.down,
            PlayerAnimationKind::Left => &mut self.left,
            PlayerAnimationKind::Right => &mut self.right,
            PlayerAnimationKind::Attack => &mut self.attack,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Player {
    pub(crate) body: Body,
    pub(crate) combat: BasicCombat,
    animations: PlayerAnimations,
    attack_ticks: Option<u32>,
}

impl Player {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            body: Body::at(position),
            combat: BasicCombat::new(PLAYER_HEALTH, PLAYER_ATTACK_POWER),
            animations: PlayerAnimations::new(),
            attack_ticks: None,
        }
    }

    pub(crate) fn is_attacking(&self) -> bool {
        self.attack_ticks.is_some()
    }

    pub(crate) fn start_attack(&mut self) -> bool {
        if self.is_attacking() {
            return false;
        }
        self.attack_ticks = Some(0);
        self.animations.attack.reset();
        true
    }

    pub(crate) fn update_attack(&mut self) {
        let Some(ticks) = self.attack_ticks.as_mut() else {
            return;
        };
        *ticks += 1;
        if *ticks >= PLAYER_ATTACK_TICKS {
            self.attack_ticks = None;
        }
    }

    // Attack wins over walking; horizontal wins over vertical.
    pub(crate) fn active_animation(&self) -> Option<PlayerAnimationKind> {
        if self.is_attacking() {
            return Some(PlayerAnimationKind::Attack);
        }
        let velocity = self.body.velocity;
        if velocity.x > 0.0 {
            Some(PlayerAnimationKind::Right)
        } else if velocity.x < 0.0 {
            Some(PlayerAnimationKind::Left)
        } else if velocity.y > 0.0 {
            Some(PlayerAnimationKind::Down)
        } else if velocity.y < 0.0 {
            Some(PlayerAnimationKind::Up)
        } else {
            None
        }
    }

    pub(crate) fn advance_animation(&mut self) {
        if let Some(kind) = self.active_animation() {
            self.animations.get_mut(kind).update();
        }
    }

    pub(crate) fn sprite_frame(&self) -> usize {
        match self.active_animation() {
            Some(kind) => self.animations.get(kind).frame(),
            None => self.animations.down.first_frame(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) body: Body,
    pub(crate) combat: EnemyCombat,
    pub(crate) follows_player: bool,
}

impl Enemy {
    pub(crate) fn new(position: Vec2, follows_player: bool) -> Self {
        Self {
            body: Body::at(position),
            combat: EnemyCombat::new(ENEMY_HEALTH, ENEMY_ATTACK_POWER, ENEMY_ATTACK_COOLDOWN_TICKS),
            follows_player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Potion {
    pub(crate) position: Vec2,
    pub(crate) heal_amount: i32,
}

impl Potion {
    pub(crate) fn bounds(&self) -> Rect {
        Rect::square_at(self.position, TILE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TrainingDummy {
    pub(crate) position: Vec2,
    animating: bool,
    tick: u32,
    frame: u32,
}

impl TrainingDummy {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            animating: false,
            tick: 0,
            frame: 0,
        }
    }

    pub(crate) fn bounds(&self) -> Rect {
        let x = self.position.x as i32;
        let y = self.position.y as i32;
        Rect::from_position_size(x, y, TILE_SIZE, TILE_SIZE * 2)
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.animating
    }

    pub(crate) fn frame(&self) -> u32 {
        self.frame
    }

    pub(crate) fn hit(&mut self) -> bool {
        if self.animating {
            return false;
        }
        self.animating = true;
        self.tick = 0;
        self.frame = 1;
        true
    }

    pub(crate) fn update(&mut self) {
        if !self.animating {
            return;
        }
        self.tick += 1;
        if self.tick > DUMMY_TICKS_PER_FRAME {
            self.tick = 0;
            self.frame = (self.frame + 1) % DUMMY_FRAME_COUNT;
        }
        if self.tick == 0 && self.frame == 0 {
            self.animating = false;
        }
    }

    pub(crate) fn source_rect(&self) -> Rect {
        let frame = self.frame as i32;
        Rect::new(frame * TILE_SIZE, 0, (frame + 1) * TILE_SIZE, TILE_SIZE * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::combat::Combat;

    #[test]
    fn player_starts_with_full_health() {
        let player = Player::new(Vec2::new(0.0, 0.0));
        assert_eq!(player.combat.health(), PLAYER_HEALTH);
        assert_eq!(player.combat.max_health(), PLAYER_HEALTH);
    }

    #[test]
    fn idle_player_shows_first_down_frame() {
        let player = Player::new(Vec2::ZERO);
        assert_eq!(player.active_animation(), None);
        assert_eq!(player.sprite_frame(), 4);
    }

    #[test]
    fn horizontal_velocity_picks_animation_first() {
        let mut player = Player::new(Vec2::ZERO);
        player.body.velocity = Vec2::new(-1.4, 1.4);
        assert_eq!(player.active_animation(), Some(PlayerAnimationKind::Left));
        player.body.velocity = Vec2::new(0.0, -2.0);
        assert_eq!(player.active_animation(), Some(PlayerAnimationKind::Up));
    }

    #[test]
    fn attack_lasts_fixed_ticks_and_ignores_reclicks() {
        let mut player = Player::new(Vec2::ZERO);
        player.body.velocity = Vec2::new(2.0, 0.0);
        assert!(player.start_attack());
        assert_eq!(player.sprite_frame(), 19);

        for _ in 0..PLAYER_ATTACK_TICKS - 1 {
            player.update_attack();
            assert!(!player.start_attack());
        }
        assert!(player.is_attacking());
        player.update_attack();
        assert!(!player.is_attacking());
        assert_eq!(player.active_animation(), Some(PlayerAnimationKind::Right));
    }

    #[test]
    fn walk_animation_steps_through_frames() {
        let mut player = Player::new(Vec2::ZERO);
        player.body.velocity = Vec2::new(0.0, 2.0);
        assert_eq!(player.sprite_frame(), 4);
        for _ in 0..21 {
            player.advance_animation();
        }
        assert_eq!(player.sprite_frame(), 8);
    }

    #[test]
    fn dummy_hit_runs_three_frames_then_stops() {
        let mut dummy = TrainingDummy::new(Vec2::new(32.0, 32.0));
        assert!(dummy.hit());
        assert_eq!(dummy.frame(), 1);
        assert!(!dummy.hit());

        let mut ticks = 0;
        while dummy.is_animating() {
            dummy.update();
            ticks += 1;
            assert!(ticks < 100, "dummy animation never finished");
        }
        assert_eq!(ticks, 33);
        assert_eq!(dummy.frame(), 0);
        assert!(dummy.hit());
    }

    #[test]
    fn dummy_source_rect_is_one_by_two_tiles() {
        let mut dummy = TrainingDummy::new(Vec2::ZERO);
        dummy.hit();
        assert_eq!(dummy.source_rect(), Rect::new(16, 0, 32, 32));
        assert_eq!(dummy.bounds(), Rect::new(0, 0, 16, 32));
    }
}
