//! State Classifier
//!
//! Maps a reading and the current thresholds to one of six cognitive states.
//! Rules are checked in a fixed priority order and the first match wins:
//!
//! 1. high attention + high relaxation  -> Flow
//! 2. high attention + low relaxation   -> Anxiety
//! 3. high attention                    -> HighFocus
//! 4. low attention                     -> Distracted
//! 5. high relaxation                   -> DeepRelax
//! 6. anything else                     -> Normal

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::output::{PatternId, Rgb};
use crate::thresholds::ThresholdSet;
use crate::wave::CognitiveReading;

/// Six-way cognitive state classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveState {
    Distracted,
    Normal,
    HighFocus,
    DeepRelax,
    Flow,
    Anxiety,
}

impl CognitiveState {
    pub const ALL: [CognitiveState; 6] = [
        CognitiveState::Distracted,
        CognitiveState::Normal,
        CognitiveState::HighFocus,
        CognitiveState::DeepRelax,
        CognitiveState::Flow,
        CognitiveState::Anxiety,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CognitiveState::Distracted => "Distracted",
            CognitiveState::Normal => "Normal",
            CognitiveState::HighFocus => "Focused",
            CognitiveState::DeepRelax => "Relaxed",
            CognitiveState::Flow => "Flow",
            CognitiveState::Anxiety => "Anxious",
        }
    }

    /// Indicator colour shown while monitoring
    pub fn indicator(self) -> Rgb {
        match self {
            CognitiveState::Distracted => Rgb::YELLOW,
            CognitiveState::Normal => Rgb::BLUE,
            CognitiveState::HighFocus => Rgb::GREEN,
            CognitiveState::DeepRelax => Rgb::CYAN,
            CognitiveState::Flow => Rgb::TEAL,
            CognitiveState::Anxiety => Rgb::RED,
        }
    }

    /// Face drawn on the matrix while monitoring
    pub fn face(self) -> PatternId {
        match self {
            CognitiveState::Distracted | CognitiveState::Anxiety => PatternId::SadFace,
            CognitiveState::Normal | CognitiveState::DeepRelax => PatternId::NeutralFace,
            CognitiveState::HighFocus | CognitiveState::Flow => PatternId::HappyFace,
        }
    }
}

impl fmt::Display for CognitiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a reading. Stateless; call it every tick.
pub fn classify(reading: &CognitiveReading, thresholds: &ThresholdSet) -> CognitiveState {
    let focused = reading.attention >= thresholds.attn_high;
    let relaxed = reading.relaxation >= thresholds.relax_high;

    if focused && relaxed {
        CognitiveState::Flow
    } else if focused && reading.relaxation < thresholds.relax_low {
        CognitiveState::Anxiety
    } else if focused {
        CognitiveState::HighFocus
    } else if reading.attention < thresholds.attn_low {
        CognitiveState::Distracted
    } else if relaxed {
        CognitiveState::DeepRelax
    } else {
        CognitiveState::Normal
    }
}
