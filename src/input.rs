use crate::sim::ButtonEdges;
use chrono::{DateTime, Duration, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

pub(crate) const BUTTON_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Button {
    Feed,
    Pet,
    Play,
}

impl Button {
    pub(crate) const ALL: [Button; BUTTON_COUNT] = [Button::Feed, Button::Pet, Button::Play];

    fn index(self) -> usize {
        match self {
            Button::Feed => 0,
            Button::Pet => 1,
            Button::Play => 2,
        }
    }
}

/// Level-read collaborator: `true` while the physical (or emulated) button
/// is held high. Debouncing is the caller's problem, not the reader's.
pub(crate) trait ButtonReader {
    fn read(&mut self, button: Button) -> bool;
}

/// Turns raw levels into debounced rising edges by tracking the previous
/// sample per button, with a settle window instead of a blocking sleep so
/// the logic is testable without real time passing.
pub(crate) struct EdgeDetector {
    prev: [bool; BUTTON_COUNT],
    settle_until: [Option<DateTime<Utc>>; BUTTON_COUNT],
    settle: Duration,
}

impl EdgeDetector {
    pub(crate) fn new(settle: Duration) -> Self {
        Self {
            prev: [false; BUTTON_COUNT],
            settle_until: [None; BUTTON_COUNT],
            settle,
        }
    }

    pub(crate) fn sample(&mut self, reader: &mut dyn ButtonReader, now: DateTime<Utc>) -> ButtonEdges {
        let mut edges = ButtonEdges::default();
        for button in Button::ALL {
            let i = button.index();
            let level = reader.read(button);
            let settling = self.settle_until[i].is_some_and(|until| now < until);
            if level && !self.prev[i] && !settling {
                self.settle_until[i] = Some(now + self.settle);
                match button {
                    Button::Feed => edges.feed = true,
                    Button::Pet => edges.pet = true,
                    Button::Play => edges.play = true,
                }
            }
            self.prev[i] = level;
        }
        edges
    }
}

/// Terminal stand-in for the three hardware buttons: key presses latch a
/// level that holds high for exactly one sample.
#[derive(Default)]
pub(crate) struct KeyButtons {
    latch: [bool; BUTTON_COUNT],
    pub(crate) quit: bool,
}

impl KeyButtons {
    pub(crate) fn latch(&mut self, button: Button) {
        self.latch[button.index()] = true;
    }
}

impl ButtonReader for KeyButtons {
    fn read(&mut self, button: Button) -> bool {
        std::mem::take(&mut self.latch[button.index()])
    }
}

/// Drain pending terminal events into the key latch without blocking the
/// tick. `q` and Ctrl-C request shutdown.
pub(crate) fn poll_keys(buttons: &mut KeyButtons) -> anyhow::Result<()> {
    while event::poll(std::time::Duration::from_millis(1))? {
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press && k.kind != KeyEventKind::Repeat {
                continue;
            }
            if matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
                && k.modifiers.contains(KeyModifiers::CONTROL)
            {
                buttons.quit = true;
                continue;
            }
            match k.code {
                KeyCode::Char('f') | KeyCode::Char('F') => buttons.latch(Button::Feed),
                KeyCode::Char('p') | KeyCode::Char('P') => buttons.latch(Button::Pet),
                KeyCode::Char('l') | KeyCode::Char('L') => buttons.latch(Button::Play),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => buttons.quit = true,
                _ => {}
            }
        }
    }
    Ok(())
}
