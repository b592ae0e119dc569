//! Event Debouncer
//!
//! Raw falling edges arrive from the edge context (an interrupt handler, a
//! key reader task). An edge is accepted only if the shared quiescence
//! interval has passed since the last accepted edge on *any* button. Accepted
//! edges queue up as `ButtonEvent`s and are drained in arrival order by
//! `poll()` at the start of each tick.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Physical button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Next,
    Back,
    Set,
}

impl Button {
    fn bit(self) -> u8 {
        match self {
            Button::Next => 0b001,
            Button::Back => 0b010,
            Button::Set => 0b100,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::Next => "NEXT",
            Button::Back => "BACK",
            Button::Set => "SET",
        };
        f.write_str(name)
    }
}

/// Set of buttons held down at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: ButtonSet = ButtonSet(0);

    pub fn with(mut self, button: Button) -> Self {
        self.0 |= button.bit();
        self
    }

    pub fn without(mut self, button: Button) -> Self {
        self.0 &= !button.bit();
        self
    }

    pub fn contains(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter().fold(ButtonSet::EMPTY, ButtonSet::with)
    }
}

/// Event kind. Only presses are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Press,
}

/// A debounced button press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub source: Button,
    pub kind: EventKind,
    /// Other buttons held down when the press was accepted
    pub held: ButtonSet,
}

impl ButtonEvent {
    pub fn press(source: Button) -> Self {
        Self {
            source,
            kind: EventKind::Press,
            held: ButtonSet::EMPTY,
        }
    }

    /// Press of `source` while `other` is held
    pub fn chord(source: Button, other: Button) -> Self {
        Self {
            source,
            kind: EventKind::Press,
            held: ButtonSet::EMPTY.with(other),
        }
    }

    pub fn is_chord_with(&self, other: Button) -> bool {
        self.held.contains(other)
    }
}

/// Shared-clock debouncer with a pending-event queue
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiescence: Duration,
    last_accepted: Option<Duration>,
    pending: VecDeque<ButtonEvent>,
}

impl Debouncer {
    pub fn new(quiescence: Duration) -> Self {
        Self {
            quiescence,
            last_accepted: None,
            pending: VecDeque::new(),
        }
    }

    /// Report a falling edge on `button` at `now`, with the current level of
    /// the other buttons. Returns whether the edge was accepted.
    pub fn on_edge(&mut self, button: Button, held: ButtonSet, now: Duration) -> bool {
        if let Some(last) = self.last_accepted {
            if now.saturating_sub(last) < self.quiescence {
                tracing::trace!("Debounced {} edge at {:?}", button, now);
                return false;
            }
        }
        self.last_accepted = Some(now);
        self.pending.push_back(ButtonEvent {
            source: button,
            kind: EventKind::Press,
            held: held.without(button),
        });
        true
    }

    /// Drain accepted events, oldest first
    pub fn poll(&mut self) -> Vec<ButtonEvent> {
        self.pending.drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
