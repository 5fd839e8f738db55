use crate::anim::AnimState;
use crate::display::Display;
use crate::model::{Mood, PetState, DISPLAY_H, DISPLAY_W};

const BUNNY_X: i32 = 56;
const BUNNY_Y: i32 = 20;

const BAR_X: i32 = 45;
const BAR_SEGMENTS: i32 = 12;
const DASH_LEN: i32 = 4;
const DASH_GAP: i32 = 3;
const DASH_H: i32 = 4;

const ZZZ_TEXT: &str = "z Z z Z z Z";

const BUNNY_NORMAL: [&str; 2] = [
    r#" (\_/)
 (•ᴥ•)
(")_(")"#,
    r#" (\_/)
 (•ᴥ•)
(")^(")"#,
];

const BUNNY_HAPPY: [&str; 2] = [
    r#" (\_/)
 (^ᴥ^)
(")_(")"#,
    r#" (\_/)
 (^ᴥ^)
(")^(")"#,
];

const BUNNY_SAD: [&str; 2] = [
    r#" (\_/)
 (•︵•)
(")_(")"#,
    r#" (\_/)
 (•︵•)
(")^(")"#,
];

const BUNNY_SLEEPING: [&str; 2] = [
    r#"   (\ /)
  (- . -)
  ("|"|)"#,
    r#"   (\ /)
  (- . -)
   ("|"|)"#,
];

/// Dashed meter: filled segments are solid rectangles, empty ones a single
/// baseline dash.
fn draw_status_bar(display: &mut dyn Display, y: i32, value: f32, label: &str) {
    display.draw_text(0, y, label, true);
    let filled = ((value / 100.0) * BAR_SEGMENTS as f32) as i32;
    for i in 0..BAR_SEGMENTS {
        let x = BAR_X + i * (DASH_LEN + DASH_GAP);
        if i < filled {
            display.draw_rect(x, y + 2, x + DASH_LEN - 1, y + DASH_H + 1, true, true);
        } else {
            display.draw_line(x, y + 4, x + DASH_LEN - 1, y + 4, true);
        }
    }
}

/// Compose one frame onto the display collaborator. Pure projection of the
/// shared state; never mutates it.
pub(crate) fn draw_frame(display: &mut dyn Display, pet: &PetState, anim: &AnimState) {
    display.clear_frame();

    if pet.is_sleeping {
        let x = DISPLAY_W - anim.scroll_offset;
        display.draw_text(x, DISPLAY_H / 3, ZZZ_TEXT, true);
        display.draw_text(BUNNY_X, BUNNY_Y, BUNNY_SLEEPING[anim.frame_index], true);
        return;
    }

    draw_status_bar(display, 0, pet.hunger, "Hunger:");
    draw_status_bar(display, 8, pet.happiness, "Happy:");

    let frames = match pet.mood() {
        Mood::Happy => BUNNY_HAPPY,
        Mood::Content => BUNNY_NORMAL,
        Mood::Unhappy | Mood::Miserable => BUNNY_SAD,
    };
    display.draw_text(BUNNY_X, BUNNY_Y, frames[anim.frame_index], true);

    if let Some(p) = anim.pellet {
        let (x, y) = (p.x as i32, p.y as i32);
        display.draw_ellipse(x - 2, y - 2, x + 2, y + 2, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear,
        Text { x: i32, y: i32, s: String },
        Rect,
        Line,
        Ellipse { x0: i32, y0: i32 },
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Display for Recorder {
        fn clear_frame(&mut self) {
            self.ops.push(Op::Clear);
        }
        fn draw_text(&mut self, x: i32, y: i32, s: &str, _color: bool) {
            self.ops.push(Op::Text {
                x,
                y,
                s: s.to_string(),
            });
        }
        fn draw_rect(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32, _o: bool, _f: bool) {
            self.ops.push(Op::Rect);
        }
        fn draw_line(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32, _c: bool) {
            self.ops.push(Op::Line);
        }
        fn draw_ellipse(&mut self, x0: i32, y0: i32, _x1: i32, _y1: i32, _fill: bool) {
            self.ops.push(Op::Ellipse { x0, y0 });
        }
        fn present(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn pet(hunger: f32, happiness: f32) -> PetState {
        let mut p = PetState::new(Utc.timestamp_opt(0, 0).unwrap());
        p.hunger = hunger;
        p.happiness = happiness;
        p
    }

    fn count_rects(rec: &Recorder) -> usize {
        rec.ops.iter().filter(|op| matches!(op, Op::Rect)).count()
    }

    fn count_lines(rec: &Recorder) -> usize {
        rec.ops.iter().filter(|op| matches!(op, Op::Line)).count()
    }

    #[test]
    fn awake_frame_shows_bars_with_floored_fill() {
        let mut rec = Recorder::default();
        // 50/100 → 6 of 12 dashes, 99/100 → 11 of 12
        let p = pet(50.0, 99.0);
        draw_frame(&mut rec, &p, &AnimState::new());
        assert_eq!(rec.ops.first(), Some(&Op::Clear));
        assert_eq!(count_rects(&rec), 6 + 11);
        assert_eq!(count_lines(&rec), 6 + 1);
    }

    #[test]
    fn sleeping_frame_hides_bars_and_scrolls_zzz() {
        let mut rec = Recorder::default();
        let mut p = pet(80.0, 80.0);
        p.is_sleeping = true;
        let mut anim = AnimState::new();
        anim.scroll_offset = 40;
        draw_frame(&mut rec, &p, &anim);

        assert_eq!(count_rects(&rec), 0);
        assert_eq!(count_lines(&rec), 0);
        let zzz = rec.ops.iter().find(|op| matches!(op, Op::Text { s, .. } if s == ZZZ_TEXT));
        assert!(matches!(zzz, Some(Op::Text { x: 88, y: 21, .. })));
    }

    #[test]
    fn mood_selects_glyph_family() {
        for (avg, marker) in [(90.0, "^ᴥ^"), (60.0, "•ᴥ•"), (20.0, "•︵•")] {
            let mut rec = Recorder::default();
            let p = pet(avg, avg);
            draw_frame(&mut rec, &p, &AnimState::new());
            let found = rec
                .ops
                .iter()
                .any(|op| matches!(op, Op::Text { s, .. } if s.contains(marker)));
            assert!(found, "avg={avg} missing {marker}");
        }
    }

    #[test]
    fn frame_index_picks_alternate_ear_pose() {
        let mut anim = AnimState::new();
        anim.frame_index = 1;
        let mut rec = Recorder::default();
        draw_frame(&mut rec, &pet(60.0, 60.0), &anim);
        let found = rec
            .ops
            .iter()
            .any(|op| matches!(op, Op::Text { s, .. } if s.contains("(\")^(\")")));
        assert!(found);
    }

    #[test]
    fn pellet_drawn_only_while_awake() {
        let mut anim = AnimState::new();
        anim.start_pellet();

        let mut awake = Recorder::default();
        draw_frame(&mut awake, &pet(60.0, 60.0), &anim);
        assert!(awake
            .ops
            .iter()
            .any(|op| matches!(op, Op::Ellipse { x0: 8, y0: 30 })));

        let mut asleep_pet = pet(60.0, 60.0);
        asleep_pet.is_sleeping = true;
        let mut asleep = Recorder::default();
        draw_frame(&mut asleep, &asleep_pet, &anim);
        assert!(!asleep.ops.iter().any(|op| matches!(op, Op::Ellipse { .. })));
    }
}
