//! Terminal stand-ins for the trainer board peripherals
//!
//! `TerminalFrontend` keeps the last text screen, matrix pattern and
//! indicator colour the engine pushed, and queues cues so the caller can
//! hand them to the tone scheduler after releasing the engine lock.
//! `TerminalBuzzer` is the tone device: it tracks which buzzers are sounding.

use colored::Colorize;
use neurosync_core::{Buzzer, CueId, Frontend, PatternId, Rgb, Screen, ToneDevice};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Everything visible on the board at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub lines: [String; 3],
    pub pattern: Option<PatternId>,
    pub indicator: Rgb,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            lines: Default::default(),
            pattern: None,
            indicator: Rgb::OFF,
        }
    }
}

impl Frame {
    /// Plain-text matrix rows, `#` lit and `.` dark
    pub fn matrix_rows(&self) -> Vec<String> {
        let Some(pattern) = self.pattern else {
            return vec![".....".to_string(); 5];
        };
        pattern
            .bitmap()
            .iter()
            .map(|row| row.iter().map(|lit| if *lit { '#' } else { '.' }).collect())
            .collect()
    }

    /// Colour rendering for the headless runner
    pub fn render(&self) -> String {
        let Rgb { r, g, b } = self.indicator;
        let mut out = format!("{} {}\n", "●".truecolor(r, g, b), self.lines[0].bold());
        let rows = self.matrix_rows();
        for (i, row) in rows.iter().enumerate() {
            let pixels: String = row
                .chars()
                .map(|c| {
                    if c == '#' {
                        "■ ".truecolor(r, g, b).to_string()
                    } else {
                        "· ".dimmed().to_string()
                    }
                })
                .collect();
            let text = match i {
                1 => self.lines[1].as_str(),
                2 => self.lines[2].as_str(),
                _ => "",
            };
            out.push_str(&format!("  {}  {}\n", pixels, text));
        }
        out
    }
}

/// Frontend backed by an in-memory frame
#[derive(Debug, Default)]
pub struct TerminalFrontend {
    frame: Frame,
    screen: Option<Screen>,
    cues: Vec<CueId>,
    last_cue: Option<CueId>,
}

impl TerminalFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn last_cue(&self) -> Option<CueId> {
        self.last_cue
    }

    /// Cues queued since the last call
    pub fn take_cues(&mut self) -> Vec<CueId> {
        std::mem::take(&mut self.cues)
    }
}

impl Frontend for TerminalFrontend {
    fn render_text(&mut self, screen: &Screen) {
        self.frame.lines = screen.lines();
        self.screen = Some(screen.clone());
    }

    fn render_pattern(&mut self, pattern: PatternId) {
        self.frame.pattern = Some(pattern);
    }

    fn set_indicator(&mut self, color: Rgb) {
        self.frame.indicator = color;
    }

    fn play_cue(&mut self, cue: CueId) {
        self.cues.push(cue);
        self.last_cue = Some(cue);
    }
}

/// Startup title card with the matrix sweep, one frame per `SPLASH_STEP`
pub fn splash_frames() -> Vec<Frame> {
    let lines = Screen::Splash.lines();
    PatternId::splash_sequence()
        .into_iter()
        .map(|pattern| Frame {
            lines: lines.clone(),
            pattern: Some(pattern),
            indicator: Rgb::DIM_BLUE,
        })
        .collect()
}

/// Tone device that only keeps track of what is sounding
#[derive(Debug, Default)]
pub struct TerminalBuzzer {
    active: Mutex<BTreeMap<Buzzer, u32>>,
    finished: AtomicUsize,
}

impl TerminalBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buzzers currently on, with their frequency
    pub fn active(&self) -> Vec<(Buzzer, u32)> {
        self.active.lock().iter().map(|(b, f)| (*b, *f)).collect()
    }

    /// Notes that have been stopped so far
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::Relaxed)
    }
}

impl ToneDevice for TerminalBuzzer {
    fn start(&self, buzzer: Buzzer, frequency_hz: u32) {
        tracing::debug!("{:?} buzzer on at {} Hz", buzzer, frequency_hz);
        self.active.lock().insert(buzzer, frequency_hz);
    }

    fn stop(&self, buzzer: Buzzer) {
        tracing::trace!("{:?} buzzer off", buzzer);
        if self.active.lock().remove(&buzzer).is_some() {
            self.finished.fetch_add(1, Ordering::Relaxed);
        }
    }
}
