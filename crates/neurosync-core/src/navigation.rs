//! Mode/Navigation Controller
//!
//! Top-level modes cycle with Next/Back. Configuration is an orthogonal
//! sub-state entered with Set from any mode but Train; the active mode is
//! left untouched, so finishing a cycle returns to where the user was.
//! While configuring, Next/Back adjust the
//! selected threshold and Set walks through the four parameters. Walking
//! past the last parameter leaves configuration with *no* selection, so the
//! next Set always starts over at the first one.
//!
//! In Train mode Set and Next belong to the training session; only Back
//! still cycles the mode.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::input::{Button, ButtonEvent};
use crate::stats::ClearConfirmation;
use crate::thresholds::{Direction, ThresholdParam};

/// Top-level mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Monitor,
    Configure,
    Train,
    History,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Monitor, Mode::Configure, Mode::Train, Mode::History];

    /// Forward, wrapping
    pub fn next(self) -> Self {
        match self {
            Mode::Monitor => Mode::Configure,
            Mode::Configure => Mode::Train,
            Mode::Train => Mode::History,
            Mode::History => Mode::Monitor,
        }
    }

    /// Backward, wrapping
    pub fn prev(self) -> Self {
        match self {
            Mode::Monitor => Mode::History,
            Mode::Configure => Mode::Monitor,
            Mode::Train => Mode::Configure,
            Mode::History => Mode::Train,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Monitor => "Monitor",
            Mode::Configure => "Configure",
            Mode::Train => "Train",
            Mode::History => "History",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the controller must do in response to one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// The active mode changed
    ModeChanged(Mode),
    /// Configuration moved to this parameter (entered or advanced)
    Selected(ThresholdParam),
    /// Walked past the last parameter; selection is cleared
    ConfigDone,
    /// Adjust the selected threshold
    Adjust(ThresholdParam, Direction),
    /// Hand the button to the training session
    Training(Button),
    /// Confirmed statistics wipe
    ClearStatistics(ClearConfirmation),
}

/// Navigation state. Only mutated through [`NavigationState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    active_mode: Mode,
    /// `Some` exactly while configuring
    selected: Option<ThresholdParam>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            active_mode: Mode::Monitor,
            selected: None,
        }
    }
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_mode(&self) -> Mode {
        self.active_mode
    }

    pub fn is_configuring(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<ThresholdParam> {
        self.selected
    }

    /// Apply one debounced event
    pub fn apply(&mut self, event: &ButtonEvent) -> NavAction {
        if let Some(param) = self.selected {
            return match event.source {
                Button::Next => NavAction::Adjust(param, Direction::Increase),
                Button::Back => NavAction::Adjust(param, Direction::Decrease),
                Button::Set => match param.next() {
                    Some(next) => {
                        self.selected = Some(next);
                        tracing::debug!("Configuring {}", next);
                        NavAction::Selected(next)
                    }
                    None => {
                        self.selected = None;
                        tracing::debug!("Configuration finished");
                        NavAction::ConfigDone
                    }
                },
            };
        }

        match (self.active_mode, event.source) {
            (Mode::Train, Button::Set | Button::Next) => NavAction::Training(event.source),
            (Mode::History, Button::Set) => match ClearConfirmation::from_event(event) {
                Some(confirmed) => NavAction::ClearStatistics(confirmed),
                None => self.enter_configuring(),
            },
            (_, Button::Set) => self.enter_configuring(),
            (mode, Button::Next) => self.switch_to(mode.next()),
            (mode, Button::Back) => self.switch_to(mode.prev()),
        }
    }

    fn enter_configuring(&mut self) -> NavAction {
        let first = ThresholdParam::AttnLow;
        self.selected = Some(first);
        tracing::debug!("Configuring {} (from {})", first, self.active_mode);
        NavAction::Selected(first)
    }

    fn switch_to(&mut self, mode: Mode) -> NavAction {
        self.active_mode = mode;
        tracing::info!("Mode -> {}", mode);
        NavAction::ModeChanged(mode)
    }
}
