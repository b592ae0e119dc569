//! Session Statistics Aggregator
//!
//! Running sums, counts and maxima over every Monitor/Train sample, plus the
//! completed-session counter. Clearing needs a `ClearConfirmation`, which can
//! only be obtained from a Set press made while Next is held.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::input::{Button, ButtonEvent};
use crate::output::PatternId;
use crate::wave::{CognitiveReading, ATTENTION_MAX, RELAXATION_MAX};

/// Sessions the history matrix can show
const MAX_SESSION_PIXELS: u32 = 15;

/// Accumulated statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStatistics {
    attention_sum: f64,
    relaxation_sum: f64,
    sample_count: u64,
    attention_max: f64,
    relaxation_max: f64,
    start_time: Duration,
    completed_sessions: u32,
    last_session_duration: Duration,
}

/// Read-only view of the statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub mean_attention: f64,
    pub mean_relaxation: f64,
    pub max_attention: f64,
    pub max_relaxation: f64,
    pub sample_count: u64,
    pub completed_sessions: u32,
    pub last_session_duration: Duration,
    pub total_elapsed: Duration,
}

impl StatsSnapshot {
    /// History rows for the matrix
    pub fn pattern(&self) -> PatternId {
        let row = |mean: f64, max: f64| ((mean / max) * 5.0).clamp(0.0, 5.0) as u8;
        PatternId::StatsBars {
            attention: row(self.mean_attention, ATTENTION_MAX),
            relaxation: row(self.mean_relaxation, RELAXATION_MAX),
            sessions: self.completed_sessions.min(MAX_SESSION_PIXELS) as u8,
        }
    }
}

/// Proof that the user confirmed a statistics wipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearConfirmation(());

impl ClearConfirmation {
    /// Set pressed while Next is held
    pub fn from_event(event: &ButtonEvent) -> Option<Self> {
        (event.source == Button::Set && event.is_chord_with(Button::Next))
            .then_some(ClearConfirmation(()))
    }
}

impl SessionStatistics {
    /// Start accumulating with `now` as the elapsed-time origin
    pub fn new(now: Duration) -> Self {
        Self {
            start_time: now,
            ..Self::default()
        }
    }

    /// Add one sample
    pub fn record(&mut self, reading: &CognitiveReading) {
        self.attention_sum += reading.attention;
        self.relaxation_sum += reading.relaxation;
        self.sample_count += 1;
        self.attention_max = self.attention_max.max(reading.attention);
        self.relaxation_max = self.relaxation_max.max(reading.relaxation);
    }

    /// Count a finished training session
    pub fn record_session(&mut self, duration: Duration) {
        self.completed_sessions = self.completed_sessions.saturating_add(1);
        self.last_session_duration = duration;
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn snapshot(&self, now: Duration) -> StatsSnapshot {
        let (mean_attention, mean_relaxation) = if self.sample_count == 0 {
            (0.0, 0.0)
        } else {
            let n = self.sample_count as f64;
            (self.attention_sum / n, self.relaxation_sum / n)
        };

        StatsSnapshot {
            mean_attention,
            mean_relaxation,
            max_attention: self.attention_max,
            max_relaxation: self.relaxation_max,
            sample_count: self.sample_count,
            completed_sessions: self.completed_sessions,
            last_session_duration: self.last_session_duration,
            total_elapsed: now.saturating_sub(self.start_time),
        }
    }

    /// Wipe everything and restart the elapsed-time origin
    pub fn clear(&mut self, _confirmed: ClearConfirmation, now: Duration) {
        tracing::warn!(
            "Clearing statistics ({} samples, {} sessions)",
            self.sample_count,
            self.completed_sessions
        );
        *self = Self::new(now);
    }
}
