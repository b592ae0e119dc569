//! Output model - what the core asks the drivers to do
//!
//! The core never touches hardware. Each tick it pushes a screen, a matrix
//! pattern, an indicator colour and zero or more cues through a [`Frontend`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::classifier::CognitiveState;
use crate::stats::StatsSnapshot;
use crate::thresholds::{ThresholdParam, ThresholdSet};
use crate::training::TrainingView;
use crate::wave::CognitiveReading;

/// Pixels on the 5x5 matrix
pub const MATRIX_PIXELS: u8 = 25;

/// Delay between splash animation frames
pub const SPLASH_STEP: Duration = Duration::from_millis(50);

/// 5x5 matrix bitmap, row-major
pub type Bitmap = [[bool; 5]; 5];

/// Indicator colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    pub const TEAL: Rgb = Rgb::new(0, 255, 128);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const PURPLE: Rgb = Rgb::new(128, 0, 128);
    /// Matrix colour of the startup animation
    pub const DIM_BLUE: Rgb = Rgb::new(20, 20, 50);
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Matrix pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternId {
    NeutralFace,
    HappyFace,
    SadFace,
    WaveGlyph,
    FocusGlyph,
    RelaxGlyph,
    /// First `lit` of `total` pixels, row-major
    ProgressBar { lit: u8, total: u8 },
    /// Full matrix with the first `cleared` pixels switched off, row-major
    Wipe { cleared: u8 },
    /// History rows: mean attention (0..=5), mean relaxation (0..=5),
    /// completed sessions (0..=15) over the remaining three rows
    StatsBars {
        attention: u8,
        relaxation: u8,
        sessions: u8,
    },
}

const X: bool = true;
const O: bool = false;

const NEUTRAL_FACE: Bitmap = [
    [O, X, O, X, O],
    [O, X, O, X, O],
    [O, O, O, O, O],
    [X, O, O, O, X],
    [O, X, X, X, O],
];

const HAPPY_FACE: Bitmap = [
    [O, X, O, X, O],
    [O, X, O, X, O],
    [O, O, O, O, O],
    [X, X, X, X, X],
    [X, O, O, O, X],
];

const SAD_FACE: Bitmap = [
    [O, X, O, X, O],
    [O, X, O, X, O],
    [O, O, O, O, O],
    [O, X, X, X, O],
    [X, O, O, O, X],
];

const DIAMOND: Bitmap = [
    [O, O, X, O, O],
    [O, X, X, X, O],
    [X, X, X, X, X],
    [O, X, X, X, O],
    [O, O, X, O, O],
];

const CROSS: Bitmap = [
    [X, O, O, O, X],
    [O, X, O, X, O],
    [O, O, X, O, O],
    [O, X, O, X, O],
    [X, O, O, O, X],
];

impl PatternId {
    /// Progress bar lighting `fraction` of the matrix (truncated)
    pub fn fraction_bar(fraction: f64) -> Self {
        let lit = (fraction.clamp(0.0, 1.0) * f64::from(MATRIX_PIXELS)) as u8;
        PatternId::ProgressBar {
            lit,
            total: MATRIX_PIXELS,
        }
    }

    /// Startup animation: light every pixel in turn, then switch them off
    /// in the same order. One frame per [`SPLASH_STEP`].
    pub fn splash_sequence() -> Vec<PatternId> {
        let fill = (1..=MATRIX_PIXELS).map(|lit| PatternId::ProgressBar {
            lit,
            total: MATRIX_PIXELS,
        });
        let clear = (1..=MATRIX_PIXELS).map(|cleared| PatternId::Wipe { cleared });
        fill.chain(clear).collect()
    }

    /// Pixels to draw
    pub fn bitmap(&self) -> Bitmap {
        match *self {
            PatternId::NeutralFace => NEUTRAL_FACE,
            PatternId::HappyFace => HAPPY_FACE,
            PatternId::SadFace => SAD_FACE,
            PatternId::WaveGlyph | PatternId::FocusGlyph => DIAMOND,
            PatternId::RelaxGlyph => CROSS,
            PatternId::ProgressBar { lit, total } => {
                let lit = lit.min(total).min(MATRIX_PIXELS);
                let mut bitmap = [[false; 5]; 5];
                for i in 0..usize::from(lit) {
                    bitmap[i / 5][i % 5] = true;
                }
                bitmap
            }
            PatternId::Wipe { cleared } => {
                let mut bitmap = [[true; 5]; 5];
                for i in 0..usize::from(cleared.min(MATRIX_PIXELS)) {
                    bitmap[i / 5][i % 5] = false;
                }
                bitmap
            }
            PatternId::StatsBars {
                attention,
                relaxation,
                sessions,
            } => {
                let mut bitmap = [[false; 5]; 5];
                for col in 0..usize::from(attention.min(5)) {
                    bitmap[0][col] = true;
                }
                for col in 0..usize::from(relaxation.min(5)) {
                    bitmap[1][col] = true;
                }
                for i in 0..usize::from(sessions.min(15)) {
                    bitmap[2 + i / 5][i % 5] = true;
                }
                bitmap
            }
        }
    }
}

/// Physical buzzer a tone plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Buzzer {
    /// Feedback buzzer (melodies)
    Primary,
    /// Alert buzzer (beeps, errors)
    Alert,
}

/// One note of a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub buzzer: Buzzer,
    pub frequency_hz: u32,
    pub duration: Duration,
    /// Delay from this note's start to the next note's start
    pub spacing: Duration,
}

const fn tone(buzzer: Buzzer, frequency_hz: u32, duration_ms: u64, spacing_ms: u64) -> Tone {
    Tone {
        buzzer,
        frequency_hz,
        duration: Duration::from_millis(duration_ms),
        spacing: Duration::from_millis(spacing_ms),
    }
}

const SUCCESS_TONES: [Tone; 3] = [
    tone(Buzzer::Primary, 523, 200, 220),
    tone(Buzzer::Primary, 659, 200, 220),
    tone(Buzzer::Primary, 784, 400, 400),
];

const FAILURE_TONES: [Tone; 2] = [
    tone(Buzzer::Alert, 440, 200, 250),
    tone(Buzzer::Alert, 349, 400, 400),
];

const BEEP_TONES: [Tone; 1] = [tone(Buzzer::Alert, 392, 100, 100)];

const STARTUP_TONES: [Tone; 4] = [
    tone(Buzzer::Primary, 523, 200, 250),
    tone(Buzzer::Primary, 659, 200, 250),
    tone(Buzzer::Primary, 784, 200, 250),
    tone(Buzzer::Primary, 1047, 400, 400),
];

/// Audible cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueId {
    Beep,
    Success,
    Failure,
    /// Power-on jingle, played by the binary before the first tick
    Startup,
}

impl CueId {
    /// Notes that make up the cue
    pub fn tones(self) -> &'static [Tone] {
        match self {
            CueId::Beep => &BEEP_TONES,
            CueId::Success => &SUCCESS_TONES,
            CueId::Failure => &FAILURE_TONES,
            CueId::Startup => &STARTUP_TONES,
        }
    }

    /// Time from the first note's start to the last note's end
    pub fn total_duration(self) -> Duration {
        let tones = self.tones();
        match tones.split_last() {
            Some((last, rest)) => rest.iter().map(|t| t.spacing).sum::<Duration>() + last.duration,
            None => Duration::ZERO,
        }
    }
}

/// Text screen payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Screen {
    /// Title card shown once at startup
    Splash,
    Monitor {
        reading: CognitiveReading,
        state: CognitiveState,
    },
    /// `selected == None` shows the threshold overview
    Configure {
        selected: Option<ThresholdParam>,
        thresholds: ThresholdSet,
    },
    Train(TrainingView),
    History(StatsSnapshot),
}

impl Screen {
    /// Title line
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Splash => "NeuroSync",
            Screen::Monitor { .. } => "NeuroSync - Monitor",
            Screen::Configure { .. } => "NeuroSync - Config",
            Screen::Train(_) => "NeuroSync - Training",
            Screen::History(_) => "NeuroSync - History",
        }
    }

    /// Three display lines: title and two body lines
    pub fn lines(&self) -> [String; 3] {
        let title = self.title().to_string();
        match self {
            Screen::Splash => [
                title,
                "Biofeedback System".to_string(),
                "Cognitive Training".to_string(),
            ],
            Screen::Monitor { reading, state } => [
                title,
                format!(
                    "Attn: {:.1}% Rel: {:.1}",
                    reading.attention, reading.relaxation
                ),
                format!("State: {}", state),
            ],
            Screen::Configure {
                selected: Some(param),
                thresholds,
            } => {
                let value = thresholds.value(*param);
                let value = if param.is_attention() {
                    format!("Value: {:.1}%", value)
                } else {
                    format!("Value: {:.1}", value)
                };
                [title, param.label().to_string(), value]
            }
            Screen::Configure {
                selected: None,
                thresholds,
            } => [
                title,
                format!(
                    "Attn {:.0}-{:.0}%",
                    thresholds.attn_low, thresholds.attn_high
                ),
                format!(
                    "Relax {:.1}-{:.1}",
                    thresholds.relax_low, thresholds.relax_high
                ),
            ],
            Screen::Train(view) => [
                title,
                format!(
                    "Goal: {} Lvl:{}/{}",
                    view.objective, view.level, view.max_level
                ),
                format!("Score: {} Time: {}s", view.score, view.elapsed_secs),
            ],
            Screen::History(snapshot) => {
                let total = snapshot.total_elapsed.as_secs();
                [
                    title,
                    format!(
                        "At: {:.1}% Rx: {:.1}",
                        snapshot.mean_attention, snapshot.mean_relaxation
                    ),
                    format!(
                        "Sessions: {} Time: {:02}m{:02}s",
                        snapshot.completed_sessions,
                        total / 60,
                        total % 60
                    ),
                ]
            }
        }
    }
}

/// Driver-side sink for everything the core emits
pub trait Frontend {
    /// Push the active mode's screen
    fn render_text(&mut self, screen: &Screen);

    /// Draw a pattern on the matrix
    fn render_pattern(&mut self, pattern: PatternId);

    /// Set the indicator light
    fn set_indicator(&mut self, color: Rgb);

    /// Play an audible cue
    fn play_cue(&mut self, cue: CueId);
}

/// One recorded frontend call
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Text(Screen),
    Pattern(PatternId),
    Indicator(Rgb),
    Cue(CueId),
}

/// Frontend that records every call, for tests and replays
#[derive(Debug, Default, Clone)]
pub struct RecordingFrontend {
    pub outputs: Vec<Output>,
}

impl RecordingFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<CueId> {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Cue(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    pub fn last_screen(&self) -> Option<&Screen> {
        self.outputs.iter().rev().find_map(|o| match o {
            Output::Text(s) => Some(s),
            _ => None,
        })
    }

    pub fn last_pattern(&self) -> Option<PatternId> {
        self.outputs.iter().rev().find_map(|o| match o {
            Output::Pattern(p) => Some(*p),
            _ => None,
        })
    }

    pub fn last_indicator(&self) -> Option<Rgb> {
        self.outputs.iter().rev().find_map(|o| match o {
            Output::Indicator(c) => Some(*c),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
    }
}

impl Frontend for RecordingFrontend {
    fn render_text(&mut self, screen: &Screen) {
        self.outputs.push(Output::Text(screen.clone()));
    }

    fn render_pattern(&mut self, pattern: PatternId) {
        self.outputs.push(Output::Pattern(pattern));
    }

    fn set_indicator(&mut self, color: Rgb) {
        self.outputs.push(Output::Indicator(color));
    }

    fn play_cue(&mut self, cue: CueId) {
        self.outputs.push(Output::Cue(cue));
    }
}
