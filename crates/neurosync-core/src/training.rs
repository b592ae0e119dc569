//! Training Session State Machine
//!
//! ```text
//!            Start                 level == max
//!   Idle ───────────▶ Active ─────────────────────▶ Succeeded ─┐
//!    ▲  ◀──────────── │  │      timeout, level < max            │ Reset
//!    │     Cancel     │  └──────────────────────────▶ Failed ───┤
//!    └────────────────┴────────────────────────────────────────┘
//! ```
//!
//! Terminal states stay put until an explicit Reset. A session exists for the
//! whole process lifetime; Start reuses it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::TrainingSettings;
use crate::output::{CueId, PatternId, Rgb, MATRIX_PIXELS};
use crate::thresholds::ThresholdSet;
use crate::wave::CognitiveReading;

/// What the user is training for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Attention,
    Relaxation,
    Flow,
}

impl Objective {
    /// Attention -> Relaxation -> Flow -> Attention
    pub fn next(self) -> Self {
        match self {
            Objective::Attention => Objective::Relaxation,
            Objective::Relaxation => Objective::Flow,
            Objective::Flow => Objective::Attention,
        }
    }

    /// Whether a reading meets the objective under the given thresholds
    pub fn is_satisfied(self, reading: &CognitiveReading, thresholds: &ThresholdSet) -> bool {
        let focused = reading.attention >= thresholds.attn_high;
        let relaxed = reading.relaxation >= thresholds.relax_high;
        match self {
            Objective::Attention => focused,
            Objective::Relaxation => relaxed,
            Objective::Flow => focused && relaxed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Objective::Attention => "Attention",
            Objective::Relaxation => "Relaxation",
            Objective::Flow => "Flow",
        }
    }

    fn indicator(self) -> Rgb {
        match self {
            Objective::Attention => Rgb::BLUE,
            Objective::Relaxation => Rgb::CYAN,
            Objective::Flow => Rgb::GREEN,
        }
    }

    fn glyph(self) -> PatternId {
        match self {
            Objective::Attention => PatternId::FocusGlyph,
            Objective::Relaxation => PatternId::RelaxGlyph,
            Objective::Flow => PatternId::WaveGlyph,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Idle,
    Active,
    Succeeded,
    Failed,
}

impl TrainingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TrainingStatus::Succeeded | TrainingStatus::Failed)
    }
}

/// User intent delivered to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingEvent {
    /// Cycle the objective (Idle only)
    AdvanceObjective,
    /// Begin a session (Idle only)
    Start,
    /// Abandon the running session (Active only)
    Cancel,
    /// Leave a terminal state (Succeeded/Failed only)
    Reset,
}

/// A session that reached a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub status: TrainingStatus,
    pub duration: Duration,
}

/// Side effects of one evaluation or event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainingUpdate {
    pub cue: Option<CueId>,
    pub completed: Option<Completion>,
}

impl TrainingUpdate {
    fn cue(cue: CueId) -> Self {
        Self {
            cue: Some(cue),
            completed: None,
        }
    }
}

/// Render snapshot of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingView {
    pub objective: Objective,
    pub status: TrainingStatus,
    pub level: u8,
    pub max_level: u8,
    pub score: u32,
    pub elapsed_secs: u64,
}

/// The single training session
#[derive(Debug, Clone)]
pub struct TrainingSession {
    objective: Objective,
    status: TrainingStatus,
    level: u8,
    score: u32,
    started_at: Duration,
    duration: Duration,
    settings: TrainingSettings,
}

impl TrainingSession {
    pub fn new(settings: TrainingSettings) -> Self {
        Self {
            objective: Objective::Attention,
            status: TrainingStatus::Idle,
            level: 1,
            score: 0,
            started_at: Duration::ZERO,
            duration: Duration::ZERO,
            settings,
        }
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn status(&self) -> TrainingStatus {
        self.status
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Recorded duration of the last terminal session
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whole seconds elapsed, as shown on screen
    pub fn elapsed_secs(&self, now: Duration) -> u64 {
        match self.status {
            TrainingStatus::Idle => 0,
            TrainingStatus::Active => now.saturating_sub(self.started_at).as_secs(),
            TrainingStatus::Succeeded | TrainingStatus::Failed => self.duration.as_secs(),
        }
    }

    /// Apply a user event. Events that do not fit the current status are ignored.
    pub fn apply(&mut self, event: TrainingEvent, now: Duration) -> TrainingUpdate {
        match (self.status, event) {
            (TrainingStatus::Idle, TrainingEvent::AdvanceObjective) => {
                self.objective = self.objective.next();
                tracing::debug!("Training objective -> {}", self.objective);
                TrainingUpdate::cue(CueId::Beep)
            }
            (TrainingStatus::Idle, TrainingEvent::Start) => {
                self.status = TrainingStatus::Active;
                self.level = 1;
                self.score = 0;
                self.started_at = now;
                self.duration = Duration::ZERO;
                tracing::info!("Training started: objective={}", self.objective);
                TrainingUpdate::cue(CueId::Success)
            }
            (TrainingStatus::Active, TrainingEvent::Cancel) => {
                self.status = TrainingStatus::Idle;
                tracing::info!(
                    "Training cancelled at level {} (score {})",
                    self.level,
                    self.score
                );
                TrainingUpdate::cue(CueId::Beep)
            }
            (TrainingStatus::Succeeded | TrainingStatus::Failed, TrainingEvent::Reset) => {
                self.status = TrainingStatus::Idle;
                TrainingUpdate::cue(CueId::Beep)
            }
            (status, event) => {
                tracing::trace!("Ignoring {:?} while {:?}", event, status);
                TrainingUpdate::default()
            }
        }
    }

    /// Evaluate one tick of an active session against the live reading.
    pub fn evaluate(
        &mut self,
        reading: &CognitiveReading,
        thresholds: &ThresholdSet,
        now: Duration,
    ) -> TrainingUpdate {
        if self.status != TrainingStatus::Active {
            return TrainingUpdate::default();
        }

        let mut update = TrainingUpdate::default();
        let max_level = self.settings.max_level;

        if self.objective.is_satisfied(reading, thresholds) {
            self.score = self.score.saturating_add(1);

            let per_level = self.settings.points_per_level.max(1);
            if self.score % per_level == 0 && self.level < max_level {
                self.level += 1;
                update.cue = Some(CueId::Success);
                tracing::info!("Training level up -> {}/{}", self.level, max_level);

                if self.level == max_level {
                    update.completed = Some(self.finish(TrainingStatus::Succeeded, now));
                }
            }
        }

        if self.status == TrainingStatus::Active {
            let elapsed = now.saturating_sub(self.started_at).as_secs();
            if elapsed >= self.settings.session_timeout_secs {
                let status = if self.level < max_level {
                    TrainingStatus::Failed
                } else {
                    TrainingStatus::Succeeded
                };
                update.completed = Some(self.finish(status, now));
                update.cue = Some(match status {
                    TrainingStatus::Failed => CueId::Failure,
                    _ => CueId::Success,
                });
            }
        }

        update
    }

    fn finish(&mut self, status: TrainingStatus, now: Duration) -> Completion {
        let elapsed = Duration::from_secs(now.saturating_sub(self.started_at).as_secs());
        self.status = status;
        self.duration = elapsed;
        match status {
            TrainingStatus::Failed => tracing::info!(
                "Training failed at level {}/{} after {}s",
                self.level,
                self.settings.max_level,
                elapsed.as_secs()
            ),
            _ => tracing::info!(
                "Training succeeded at level {} after {}s",
                self.level,
                elapsed.as_secs()
            ),
        }
        Completion {
            status,
            duration: elapsed,
        }
    }

    pub fn view(&self, now: Duration) -> TrainingView {
        TrainingView {
            objective: self.objective,
            status: self.status,
            level: self.level,
            max_level: self.settings.max_level,
            score: self.score,
            elapsed_secs: self.elapsed_secs(now),
        }
    }

    /// Matrix pattern for the current status
    pub fn pattern(&self) -> PatternId {
        match self.status {
            TrainingStatus::Idle => self.objective.glyph(),
            TrainingStatus::Active => {
                let per_level = MATRIX_PIXELS / self.settings.max_level.max(1);
                let lit = per_level.saturating_mul(self.level).min(MATRIX_PIXELS);
                PatternId::ProgressBar {
                    lit,
                    total: MATRIX_PIXELS,
                }
            }
            TrainingStatus::Succeeded => PatternId::HappyFace,
            TrainingStatus::Failed => PatternId::SadFace,
        }
    }

    /// Indicator colour for the current status
    pub fn indicator(&self) -> Rgb {
        match self.status {
            TrainingStatus::Idle | TrainingStatus::Active => self.objective.indicator(),
            TrainingStatus::Succeeded => Rgb::GREEN,
            TrainingStatus::Failed => Rgb::RED,
        }
    }
}
