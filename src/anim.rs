use crate::model::{DISPLAY_H, DISPLAY_W};

pub(crate) const PELLET_SPAWN_X: f32 = 10.0;
pub(crate) const PELLET_SPAWN_Y: f32 = 32.0;
pub(crate) const PELLET_FLOOR_Y: f32 = (DISPLAY_H - 6) as f32;

const DROP_VX: f32 = 3.0;
const DROP_VY: f32 = 4.0;
const BOUNCE_SECS: f32 = 1.5;
const BOUNCE_REACH_X: f32 = 40.0;
const BOUNCE_HEIGHT: f32 = 20.0;
const ARC_SECS: f32 = 1.0;
const MOUTH_X: f32 = (DISPLAY_W / 2) as f32;
const MOUTH_Y: f32 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PelletPhase {
    Drop,
    Bounce,
    Arc,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Pellet {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) phase: PelletPhase,
    pub(crate) phase_elapsed: f32,
    pub(crate) bounce_origin: (f32, f32),
}

impl Pellet {
    fn spawn() -> Self {
        Self {
            x: PELLET_SPAWN_X,
            y: PELLET_SPAWN_Y,
            phase: PelletPhase::Drop,
            phase_elapsed: 0.0,
            bounce_origin: (PELLET_SPAWN_X, PELLET_FLOOR_Y),
        }
    }
}

/// Visual state owned by the animation engine. `frame_index`/`scroll_offset`
/// advance on the idle cadence (the ticker thread); the pellet advances once
/// per main tick.
#[derive(Clone, Debug)]
pub(crate) struct AnimState {
    pub(crate) frame_index: usize,
    pub(crate) scroll_offset: i32,
    pub(crate) pellet: Option<Pellet>,
}

impl AnimState {
    pub(crate) fn new() -> Self {
        Self {
            frame_index: 0,
            scroll_offset: 0,
            pellet: None,
        }
    }

    /// One idle-cadence step: alternate the bunny frame, and while sleeping
    /// scroll the ZZZ banner two pixels, wrapping at the display width.
    pub(crate) fn idle_tick(&mut self, sleeping: bool) {
        self.frame_index = (self.frame_index + 1) % 2;
        if sleeping {
            self.scroll_offset = (self.scroll_offset + 2) % DISPLAY_W;
        }
    }

    /// A feed restarts the trajectory from spawn; pellets never queue.
    pub(crate) fn start_pellet(&mut self) {
        self.pellet = Some(Pellet::spawn());
    }

    /// Advance the pellet by one main tick of `dt` seconds. Drop moves at a
    /// fixed per-tick velocity until the floor line; Bounce sweeps a fixed
    /// parabola over 1.5s; Arc eases toward the mouth from the current
    /// position each step and clears the pellet after 1.0s.
    pub(crate) fn advance_pellet(&mut self, dt: f32) {
        let Some(p) = self.pellet.as_mut() else {
            return;
        };
        p.phase_elapsed += dt;
        let mut done = false;
        match p.phase {
            PelletPhase::Drop => {
                p.x += DROP_VX;
                p.y += DROP_VY;
                if p.y >= PELLET_FLOOR_Y {
                    p.y = PELLET_FLOOR_Y;
                    p.bounce_origin = (p.x, PELLET_FLOOR_Y);
                    p.phase = PelletPhase::Bounce;
                    p.phase_elapsed = 0.0;
                }
            }
            PelletPhase::Bounce => {
                let t = (p.phase_elapsed / BOUNCE_SECS).min(1.0);
                p.x = p.bounce_origin.0 + BOUNCE_REACH_X * t;
                p.y = p.bounce_origin.1 - BOUNCE_HEIGHT * t * (2.0 - t);
                if p.phase_elapsed >= BOUNCE_SECS {
                    p.phase = PelletPhase::Arc;
                    p.phase_elapsed = 0.0;
                }
            }
            PelletPhase::Arc => {
                let t = (p.phase_elapsed / ARC_SECS).min(1.0);
                p.x += (MOUTH_X - p.x) * t;
                p.y += (MOUTH_Y - p.y) * t;
                if p.phase_elapsed >= ARC_SECS {
                    done = true;
                }
            }
        }
        if done {
            self.pellet = None;
        }
    }
}
