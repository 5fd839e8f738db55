use crate::model::{PetRng, PetState, Rules};
use chrono::{DateTime, Utc};

/// Things the simulation wants the frontend to announce. The app shows these
/// in the feed line; tests assert on them directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SimEvent {
    FellAsleep,
    WokeUp,
    Fed,
    Petted,
    Played,
    SuddenHunger,
}

impl SimEvent {
    pub(crate) fn label(self) -> &'static str {
        match self {
            SimEvent::FellAsleep => "Pet is going to sleep...",
            SimEvent::WokeUp => "Pet woke up!",
            SimEvent::Fed => "Feeding pet!",
            SimEvent::Petted => "Petting!",
            SimEvent::Played => "Playing!",
            SimEvent::SuddenHunger => "Pet is suddenly hungry!",
        }
    }
}

/// One tick's worth of debounced rising edges, one flag per button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ButtonEdges {
    pub(crate) feed: bool,
    pub(crate) pet: bool,
    pub(crate) play: bool,
}

impl ButtonEdges {
    pub(crate) fn any(self) -> bool {
        self.feed || self.pet || self.play
    }
}

impl PetState {
    /// Time-based stat decay. Correct for arbitrary elapsed time, including
    /// zero (a second call with the same `now` changes nothing).
    pub(crate) fn advance(&mut self, now: DateTime<Utc>, rules: &Rules) {
        let minutes = (now - self.last_update).num_milliseconds().max(0) as f32 / 60_000.0;
        self.hunger = (self.hunger - rules.hunger_decay_per_min * minutes).clamp(0.0, 100.0);
        self.happiness =
            (self.happiness - rules.happiness_decay_per_min * minutes).clamp(0.0, 100.0);
        self.last_update = now;
    }

    /// Sleep hysteresis. Returns the falling-asleep event only on the
    /// awake-to-asleep transition, never while already asleep.
    pub(crate) fn check_sleep(&mut self, now: DateTime<Utc>, rules: &Rules) -> Option<SimEvent> {
        let idle_secs = (now - self.last_interaction).num_milliseconds().max(0) as f32 / 1000.0;
        if idle_secs > rules.sleep_timeout_secs {
            if !self.is_sleeping {
                self.is_sleeping = true;
                return Some(SimEvent::FellAsleep);
            }
        } else {
            self.is_sleeping = false;
        }
        None
    }

    /// Apply button edges. While sleeping, any press wakes the pet and
    /// consumes the tick; otherwise all three actions apply independently.
    pub(crate) fn handle_buttons(
        &mut self,
        edges: ButtonEdges,
        now: DateTime<Utc>,
        rules: &Rules,
    ) -> Vec<SimEvent> {
        if self.is_sleeping {
            if edges.any() {
                self.is_sleeping = false;
                self.last_interaction = now;
                return vec![SimEvent::WokeUp];
            }
            return Vec::new();
        }

        let mut events = Vec::new();
        if edges.feed {
            self.hunger = (self.hunger + rules.feed_hunger).min(100.0);
            self.last_interaction = now;
            events.push(SimEvent::Fed);
        }
        if edges.pet {
            self.happiness = (self.happiness + rules.pet_happiness).min(100.0);
            self.last_interaction = now;
            events.push(SimEvent::Petted);
        }
        if edges.play {
            self.hunger = (self.hunger - rules.play_hunger_cost).max(0.0);
            self.happiness = (self.happiness + rules.play_happiness).min(100.0);
            self.last_interaction = now;
            events.push(SimEvent::Played);
        }
        events
    }

    /// Bernoulli trial per tick. The per-tick probability is derived from a
    /// per-second rate and the actual tick length, so the event frequency
    /// does not drift with scheduling jitter.
    pub(crate) fn maybe_sudden_hunger(
        &mut self,
        rng: &mut PetRng,
        tick_secs: f32,
        rules: &Rules,
    ) -> Option<SimEvent> {
        if self.is_sleeping {
            return None;
        }
        let p = (rules.sudden_hunger_per_sec * tick_secs).clamp(0.0, 1.0);
        if rng.roll(p) {
            self.hunger = (self.hunger - rules.sudden_hunger_delta).clamp(0.0, 100.0);
            return Some(SimEvent::SuddenHunger);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn pet_at(hunger: f32, happiness: f32, start: DateTime<Utc>) -> PetState {
        let mut pet = PetState::new(start);
        pet.hunger = hunger;
        pet.happiness = happiness;
        pet
    }

    #[test]
    fn decay_stays_in_bounds_for_large_elapsed() {
        let rules = Rules::default();
        let mut pet = PetState::new(at(0));
        pet.advance(at(0) + Duration::days(30), &rules);
        assert_eq!(pet.hunger, 0.0);
        assert_eq!(pet.happiness, 0.0);
    }

    #[test]
    fn decay_rates_apply_per_minute() {
        let rules = Rules::default();
        let mut pet = PetState::new(at(0));
        pet.advance(at(60), &rules);
        assert!((pet.hunger - 95.0).abs() < 1e-4);
        assert!((pet.happiness - 93.0).abs() < 1e-4);
    }

    #[test]
    fn decay_is_linear_in_elapsed_time() {
        let rules = Rules::default();
        let mut once = pet_at(90.0, 90.0, at(0));
        once.advance(at(240), &rules);

        let mut twice = pet_at(90.0, 90.0, at(0));
        twice.advance(at(120), &rules);
        twice.advance(at(240), &rules);

        assert!((once.hunger - twice.hunger).abs() < 1e-3);
        assert!((once.happiness - twice.happiness).abs() < 1e-3);
    }

    #[test]
    fn decay_is_idempotent_at_zero_elapsed() {
        let rules = Rules::default();
        let mut pet = pet_at(60.0, 60.0, at(0));
        pet.advance(at(30), &rules);
        let (h, p) = (pet.hunger, pet.happiness);
        pet.advance(at(30), &rules);
        assert_eq!(pet.hunger, h);
        assert_eq!(pet.happiness, p);
    }

    #[test]
    fn sleep_transition_fires_exactly_once() {
        let rules = Rules::default();
        let mut pet = PetState::new(at(0));
        let mut fired = 0;
        // poll every second from just before the timeout to well past it
        for s in 115..200 {
            if pet.check_sleep(at(s), &rules) == Some(SimEvent::FellAsleep) {
                fired += 1;
            }
        }
        assert!(pet.is_sleeping);
        assert_eq!(fired, 1);
    }

    #[test]
    fn no_sleep_before_timeout() {
        let rules = Rules::default();
        let mut pet = PetState::new(at(0));
        assert_eq!(pet.check_sleep(at(120), &rules), None);
        assert!(!pet.is_sleeping);
    }

    #[test]
    fn wake_consumes_tick_without_stat_change() {
        let rules = Rules::default();
        let mut pet = pet_at(50.0, 50.0, at(0));
        pet.is_sleeping = true;

        let edges = ButtonEdges {
            feed: true,
            ..Default::default()
        };
        let events = pet.handle_buttons(edges, at(300), &rules);
        assert_eq!(events, vec![SimEvent::WokeUp]);
        assert!(!pet.is_sleeping);
        assert_eq!(pet.last_interaction, at(300));
        assert_eq!(pet.hunger, 50.0);
        assert_eq!(pet.happiness, 50.0);
    }

    #[test]
    fn sleeping_with_no_press_does_nothing() {
        let rules = Rules::default();
        let mut pet = pet_at(50.0, 50.0, at(0));
        pet.is_sleeping = true;
        let events = pet.handle_buttons(ButtonEdges::default(), at(300), &rules);
        assert!(events.is_empty());
        assert!(pet.is_sleeping);
        assert_eq!(pet.last_interaction, at(0));
    }

    #[test]
    fn feed_delta_from_baseline() {
        let rules = Rules::default();
        let mut pet = pet_at(50.0, 50.0, at(0));
        let edges = ButtonEdges {
            feed: true,
            ..Default::default()
        };
        let events = pet.handle_buttons(edges, at(1), &rules);
        assert_eq!(events, vec![SimEvent::Fed]);
        assert_eq!(pet.hunger, 65.0);
        assert_eq!(pet.happiness, 50.0);
        assert_eq!(pet.last_interaction, at(1));
    }

    #[test]
    fn pet_delta_from_baseline() {
        let rules = Rules::default();
        let mut pet = pet_at(50.0, 50.0, at(0));
        let edges = ButtonEdges {
            pet: true,
            ..Default::default()
        };
        pet.handle_buttons(edges, at(1), &rules);
        assert_eq!(pet.hunger, 50.0);
        assert_eq!(pet.happiness, 65.0);
    }

    #[test]
    fn play_delta_from_baseline() {
        let rules = Rules::default();
        let mut pet = pet_at(50.0, 50.0, at(0));
        let edges = ButtonEdges {
            play: true,
            ..Default::default()
        };
        pet.handle_buttons(edges, at(1), &rules);
        assert_eq!(pet.hunger, 45.0);
        assert_eq!(pet.happiness, 60.0);
    }

    #[test]
    fn all_three_buttons_apply_in_one_tick() {
        let rules = Rules::default();
        let mut pet = pet_at(50.0, 50.0, at(0));
        let edges = ButtonEdges {
            feed: true,
            pet: true,
            play: true,
        };
        let events = pet.handle_buttons(edges, at(1), &rules);
        assert_eq!(events.len(), 3);
        // 50 +15 -5 hunger, 50 +15 +10 happiness
        assert_eq!(pet.hunger, 60.0);
        assert_eq!(pet.happiness, 75.0);
    }

    #[test]
    fn feed_clamps_at_full() {
        let rules = Rules::default();
        let mut pet = pet_at(95.0, 95.0, at(0));
        let edges = ButtonEdges {
            feed: true,
            ..Default::default()
        };
        pet.handle_buttons(edges, at(1), &rules);
        assert_eq!(pet.hunger, 100.0);
    }

    #[test]
    fn sudden_hunger_suppressed_while_sleeping() {
        let rules = Rules::default();
        let mut rng = PetRng::new(7);
        let mut pet = pet_at(80.0, 80.0, at(0));
        pet.is_sleeping = true;
        for _ in 0..10_000 {
            assert_eq!(pet.maybe_sudden_hunger(&mut rng, 0.1, &rules), None);
        }
        assert_eq!(pet.hunger, 80.0);
    }

    #[test]
    fn sudden_hunger_applies_delta_and_clamps() {
        let rules = Rules::default();
        let mut rng = PetRng::new(7);
        let mut pet = pet_at(10.0, 80.0, at(0));
        // with p=1 the first trial must fire
        let hit = pet.maybe_sudden_hunger(&mut rng, 1.0 / rules.sudden_hunger_per_sec, &rules);
        assert_eq!(hit, Some(SimEvent::SuddenHunger));
        assert_eq!(pet.hunger, 0.0);
    }

    #[test]
    fn sudden_hunger_rate_tracks_tick_length() {
        // roughly 1% of 100ms ticks should fire at the default rate
        let rules = Rules::default();
        let mut rng = PetRng::new(0xBEEF);
        let mut hits = 0u32;
        for _ in 0..100_000 {
            let mut pet = pet_at(80.0, 80.0, at(0));
            if pet.maybe_sudden_hunger(&mut rng, 0.1, &rules).is_some() {
                hits += 1;
            }
        }
        assert!((800..1200).contains(&hits), "hits={hits}");
    }
}
