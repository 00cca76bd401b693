use engine::{CollisionGrid, InputAction, InputSnapshot, Vec2};

use super::entities::Body;
use super::{CHASE_DEAD_ZONE, CHASE_STEP, PLAYER_INPUT_STEP, PLAYER_SPEED, TILE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

pub(crate) fn player_velocity(input: &InputSnapshot) -> Vec2 {
    let mut raw = Vec2::ZERO;
    if input.is_down(InputAction::MoveUp) {
        raw.y -= PLAYER_INPUT_STEP;
    }
    if input.is_down(InputAction::MoveDown) {
        raw.y += PLAYER_INPUT_STEP;
    }
    if input.is_down(InputAction::MoveLeft) {
        raw.x -= PLAYER_INPUT_STEP;
    }
    if input.is_down(InputAction::MoveRight) {
        raw.x += PLAYER_INPUT_STEP;
    }
    normalize_to_speed(raw, PLAYER_SPEED)
}

pub(crate) fn normalize_to_speed(raw: Vec2, speed: f32) -> Vec2 {
    let magnitude = raw.length();
    if magnitude <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2 {
        x: raw.x / magnitude * speed,
        y: raw.y / magnitude * speed,
    }
}

// Diagonal chase steps are left unnormalized.
pub(crate) fn chase_velocity(from: Vec2, target: Vec2) -> Vec2 {
    Vec2 {
        x: chase_axis(from.x, target.x),
        y: chase_axis(from.y, target.y),
    }
}

fn chase_axis(from: f32, target: f32) -> f32 {
    if (from - target).abs() <= CHASE_DEAD_ZONE {
        0.0
    } else if from < target {
        CHASE_STEP
    } else {
        -CHASE_STEP
    }
}

/// Applies `body.velocity` one axis at a time, snapping out of any collider
/// after each axis. Velocity is left untouched.
pub(crate) fn move_and_collide(body: &mut Body, grid: &CollisionGrid) {
    body.position.x += body.velocity.x;
    resolve_axis(body, grid, Axis::Horizontal);
    body.position.y += body.velocity.y;
    resolve_axis(body, grid, Axis::Vertical);
}

fn resolve_axis(body: &mut Body, grid: &CollisionGrid, axis: Axis) {
    let candidates = grid.query_nearby(&body.bounds());
    for id in candidates {
        let Some(collider) = grid.collider(id) else {
            continue;
        };
        if !body.bounds().overlaps(collider) {
            continue;
        }
        match axis {
            Axis::Horizontal => {
                if body.velocity.x > 0.0 {
                    body.position.x = (collider.min_x - TILE_SIZE) as f32;
                } else if body.velocity.x < 0.0 {
                    body.position.x = collider.max_x as f32;
                }
            }
            Axis::Vertical => {
                if body.velocity.y > 0.0 {
                    body.position.y = (collider.min_y - TILE_SIZE) as f32;
                } else if body.velocity.y < 0.0 {
                    body.position.y = collider.max_y as f32;
                }
            }
        }
    }
}
