use chrono::{DateTime, Utc};

pub(crate) const DISPLAY_W: i32 = 128;
pub(crate) const DISPLAY_H: i32 = 64;

/// Derived classification of the pet's overall state. Recomputed on demand
/// from the meters, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mood {
    Happy,
    Content,
    Unhappy,
    Miserable,
}

#[derive(Clone, Debug)]
pub(crate) struct PetState {
    pub(crate) hunger: f32,
    pub(crate) happiness: f32,
    pub(crate) is_sleeping: bool,
    pub(crate) last_interaction: DateTime<Utc>,
    pub(crate) last_update: DateTime<Utc>,
}

impl PetState {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            hunger: 100.0,
            happiness: 100.0,
            is_sleeping: false,
            last_interaction: now,
            last_update: now,
        }
    }

    /// Boundary values fall into the lower bucket: an average of exactly
    /// 75 is Content, 50 is Unhappy, 25 is Miserable.
    pub(crate) fn mood(&self) -> Mood {
        let avg = (self.hunger + self.happiness) / 2.0;
        if avg > 75.0 {
            Mood::Happy
        } else if avg > 50.0 {
            Mood::Content
        } else if avg > 25.0 {
            Mood::Unhappy
        } else {
            Mood::Miserable
        }
    }
}

/// Simulation tunables. Defaults reproduce the classic hardware build:
/// 5 hunger / 7 happiness per minute, two-minute sleep timeout, and a
/// sudden-hunger rate that works out to p=0.01 per 100ms tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rules {
    pub(crate) hunger_decay_per_min: f32,
    pub(crate) happiness_decay_per_min: f32,
    pub(crate) sleep_timeout_secs: f32,
    pub(crate) feed_hunger: f32,
    pub(crate) pet_happiness: f32,
    pub(crate) play_hunger_cost: f32,
    pub(crate) play_happiness: f32,
    pub(crate) sudden_hunger_per_sec: f32,
    pub(crate) sudden_hunger_delta: f32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            hunger_decay_per_min: 5.0,
            happiness_decay_per_min: 7.0,
            sleep_timeout_secs: 120.0,
            feed_hunger: 15.0,
            pet_happiness: 15.0,
            play_hunger_cost: 5.0,
            play_happiness: 10.0,
            sudden_hunger_per_sec: 0.1,
            sudden_hunger_delta: 20.0,
        }
    }
}

/// SplitMix64: deterministic and cheap, so random-event tests can replay
/// exact sequences from a fixed seed.
#[derive(Clone, Debug)]
pub(crate) struct PetRng {
    state: u64,
}

impl PetRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    pub(crate) fn next_f32(&mut self) -> f32 {
        // [0,1) from the top 24 bits
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }

    pub(crate) fn roll(&mut self, p: f32) -> bool {
        self.next_f32() < p.clamp(0.0, 1.0)
    }
}
