use crate::anim::AnimState;
use crate::config::{load_settings, project_paths, save_settings_atomic, Settings};
use crate::display::{Display, TermDisplay};
use crate::input::{poll_keys, EdgeDetector, KeyButtons};
use crate::model::{PetRng, PetState, Rules};
use crate::render::draw_frame;
use crate::sim::SimEvent;
use anyhow::anyhow;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Everything both schedules touch, behind one lock. The main loop is the
/// only writer of the pet and the pellet; the idle ticker only reads
/// `is_sleeping` and only writes the frame/scroll counters.
struct Shared {
    pet: PetState,
    anim: AnimState,
}

pub(crate) fn run() -> anyhow::Result<()> {
    let paths = project_paths()?;
    let settings = load_settings(&paths.settings_path);
    let rules = settings.rules();

    let shared = Arc::new(Mutex::new(Shared {
        pet: PetState::new(Utc::now()),
        anim: AnimState::new(),
    }));
    let running = Arc::new(AtomicBool::new(true));

    // no display, no pet: resource acquisition is fatal here
    let mut display = TermDisplay::new()?;

    let ticker = spawn_idle_ticker(Arc::clone(&shared), Arc::clone(&running));

    let result = main_loop(&settings, &rules, &shared, &running, &mut display);

    // cleanup runs exactly once, whatever the loop's outcome
    running.store(false, Ordering::SeqCst);
    let _ = ticker.join();
    display.shutdown()?;
    save_settings_atomic(&paths.settings_path, &settings)?;
    result
}

/// Independent cadence for the idle animation: 0.25s while sleeping, 0.5s
/// awake. The nap between steps bounds shutdown latency.
fn spawn_idle_ticker(shared: Arc<Mutex<Shared>>, running: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            let sleeping = match shared.lock() {
                Ok(mut guard) => {
                    let sleeping = guard.pet.is_sleeping;
                    guard.anim.idle_tick(sleeping);
                    sleeping
                }
                Err(_) => break,
            };
            let nap = if sleeping {
                Duration::from_millis(250)
            } else {
                Duration::from_millis(500)
            };
            thread::sleep(nap);
        }
    })
}

fn main_loop(
    settings: &Settings,
    rules: &Rules,
    shared: &Arc<Mutex<Shared>>,
    running: &Arc<AtomicBool>,
    display: &mut TermDisplay,
) -> anyhow::Result<()> {
    let tick = Duration::from_millis(settings.tick_ms.max(10));
    let tick_secs = tick.as_secs_f32();
    let mut rng = PetRng::new(settings.seed);
    let mut buttons = KeyButtons::default();
    let mut detector = EdgeDetector::new(chrono::Duration::milliseconds(settings.debounce_ms));
    let mut feed_line = String::new();

    while running.load(Ordering::SeqCst) {
        let frame_start = Instant::now();

        poll_keys(&mut buttons)?;
        if buttons.quit {
            break;
        }

        let now = Utc::now();
        let edges = detector.sample(&mut buttons, now);

        // One guard across the whole tick: the renderer can never observe a
        // partially applied update.
        {
            let mut guard = shared
                .lock()
                .map_err(|_| anyhow!("pet state lock poisoned"))?;

            guard.pet.advance(now, rules);

            let mut events: Vec<SimEvent> = Vec::new();
            events.extend(guard.pet.check_sleep(now, rules));

            let actions = guard.pet.handle_buttons(edges, now, rules);
            if settings.enable_pellet && actions.contains(&SimEvent::Fed) {
                guard.anim.start_pellet();
            }
            events.extend(actions);

            events.extend(guard.pet.maybe_sudden_hunger(&mut rng, tick_secs, rules));

            if !guard.pet.is_sleeping {
                guard.anim.advance_pellet(tick_secs);
            }

            if let Some(ev) = events.last() {
                feed_line = format!("{}  {}", now.format("%H:%M:%S"), ev.label());
            }
            display.set_status(&format!("{feed_line}   [f]eed [p]et p[l]ay [q]uit"));
            draw_frame(display, &guard.pet, &guard.anim);
        }

        display.present()?;

        let spent = frame_start.elapsed();
        if spent < tick {
            thread::sleep(tick - spent);
        }
    }

    Ok(())
}
