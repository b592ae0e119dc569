//! NeuroSync Core - cognitive state engine for a biofeedback trainer
//!
//! Classifies a user's (simulated) cognitive state from two continuous
//! signals, attention and relaxation, and drives a four-mode interactive
//! session: live monitoring, threshold configuration, timed training
//! challenges and historical statistics.
//!
//! # Architecture
//!
//! ```text
//!   edge context                      tick loop
//!   (buttons)                         (every tick_interval)
//!       │                                  │
//!       ▼                                  ▼
//! ┌─────────────────────────── SharedController (one mutex) ───────────────┐
//! │  ┌───────────┐   poll()   ┌────────────┐  Adjust   ┌────────────────┐  │
//! │  │ Debouncer │──────────▶│ Navigation │─────────▶│ ThresholdStore │  │
//! │  └───────────┘            └─────┬──────┘           └───────┬────────┘  │
//! │                                 │ Training(button)          │           │
//! │                                 ▼                           ▼           │
//! │  SignalSource ──▶ derive ──▶ classify ──▶ TrainingSession ──▶ Statistics│
//! └──────────────────────────────────┬──────────────────────────────────────┘
//!                                    ▼
//!                    Frontend: text / pattern / indicator / cue
//! ```
//!
//! # Quick Start
//!
//! ```
//! use neurosync_core::{Controller, EngineConfig, FixedSignals, RecordingFrontend};
//! use neurosync_core::{CognitiveState, Rgb};
//! use std::time::Duration;
//!
//! let mut engine = Controller::new(&EngineConfig::default(), Duration::ZERO);
//! let mut signals = FixedSignals::new(75.0, 8.0);
//! let mut frontend = RecordingFrontend::new();
//!
//! let summary = engine.tick(Duration::from_millis(50), &mut signals, &mut frontend);
//! assert_eq!(summary.state, Some(CognitiveState::Flow));
//! assert_eq!(frontend.last_indicator(), Some(Rgb::TEAL));
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod audio;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod navigation;
pub mod output;
pub mod signal;
pub mod stats;
pub mod thresholds;
pub mod training;
pub mod wave;

pub use audio::{ToneDevice, ToneScheduler};
pub use classifier::{classify, CognitiveState};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{EngineConfig, PlaybackMode, TrainingSettings};
pub use controller::{Controller, SharedController, TickSummary};
pub use error::{NeuroSyncError, Result, ResultExt};
pub use input::{Button, ButtonEvent, ButtonSet, Debouncer, EventKind};
pub use navigation::{Mode, NavAction, NavigationState};
pub use output::{
    Bitmap, Buzzer, CueId, Frontend, Output, PatternId, RecordingFrontend, Rgb, Screen, Tone,
    MATRIX_PIXELS, SPLASH_STEP,
};
pub use signal::{FixedSignals, RawSignals, SignalSource, SimulatedSensor};
pub use stats::{ClearConfirmation, SessionStatistics, StatsSnapshot};
pub use thresholds::{Direction, ThresholdParam, ThresholdSet, ThresholdStore};
pub use training::{Objective, TrainingEvent, TrainingSession, TrainingStatus, TrainingView};
pub use wave::{derive, CognitiveReading};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
