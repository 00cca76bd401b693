use engine::{HudBar, RenderFrame, LINE_HEIGHT};

use super::combat::CombatSnapshot;

const HEALTH_BAR_WIDTH: i32 = 50;
const HEALTH_BAR_HEIGHT: i32 = 8;
const HEALTH_BAR_MARGIN: i32 = 5;
const HEALTH_BAR_BACK: [u8; 4] = [100, 0, 0, 255];
const HEALTH_BAR_FILL: [u8; 4] = [0, 255, 0, 255];
const HEALTH_TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
const HEALTH_TEXT_INSET: i32 = 2;

pub(crate) fn push_health(frame: &mut RenderFrame, snapshot: CombatSnapshot, screen_width: u32) {
    let bar = health_bar(snapshot, screen_width);
    frame.push_bar(bar);
    frame.push_text(
        bar.x + HEALTH_TEXT_INSET,
        bar.y + (bar.height - LINE_HEIGHT) / 2,
        health_text(snapshot),
        HEALTH_TEXT_COLOR,
    );
}

fn health_text(snapshot: CombatSnapshot) -> String {
    format!("{} / {}", snapshot.health, snapshot.max_health)
}

pub(crate) fn health_bar(snapshot: CombatSnapshot, screen_width: u32) -> HudBar {
    let fill_width = (HEALTH_BAR_WIDTH as f32 * snapshot.fraction()) as i32;
    HudBar {
        x: screen_width as i32 - HEALTH_BAR_WIDTH - HEALTH_BAR_MARGIN,
        y: HEALTH_BAR_MARGIN,
        width: HEALTH_BAR_WIDTH,
        height: HEALTH_BAR_HEIGHT,
        fill_width,
        back_color: HEALTH_BAR_BACK,
        fill_color: HEALTH_BAR_FILL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_sits_five_pixels_from_top_right() {
        let bar = health_bar(
            CombatSnapshot {
                health: 10,
                max_health: 10,
            },
            320,
        );
        assert_eq!((bar.x, bar.y, bar.width, bar.height), (265, 5, 50, 8));
        assert_eq!(bar.fill_width, 50);
    }

    #[test]
    fn fill_tracks_health_fraction() {
        let bar = health_bar(
            CombatSnapshot {
                health: 3,
                max_health: 10,
            },
            320,
        );
        assert_eq!(bar.fill_width, 15);
    }

    #[test]
    fn label_prints_health_inside_the_bar() {
        let mut frame = RenderFrame::default();
        push_health(
            &mut frame,
            CombatSnapshot {
                health: 7,
                max_health: 10,
            },
            320,
        );
        assert_eq!(frame.bars().len(), 1);
        let label = &frame.texts()[0];
        assert_eq!(label.text, "7 / 10");
        assert_eq!((label.x, label.y), (267, 6));
        assert!(label.x + engine::text_width(&label.text) <= 265 + HEALTH_BAR_WIDTH);
    }

    #[test]
    fn negative_health_draws_empty_bar() {
        let bar = health_bar(
            CombatSnapshot {
                health: -4,
                max_health: 10,
            },
            320,
        );
        assert_eq!(bar.fill_width, 0);
    }
}
