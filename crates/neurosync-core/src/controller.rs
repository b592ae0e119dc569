//! Tick loop orchestration
//!
//! [`Controller`] owns every piece of mutable engine state and is driven from
//! two places: the edge context reports raw button edges, the tick loop calls
//! [`Controller::tick`]. [`SharedController`] wraps it in one mutex so both
//! contexts go through the same serialization point.

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::classifier::{classify, CognitiveState};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::input::{Button, ButtonEvent, ButtonSet, Debouncer};
use crate::navigation::{Mode, NavAction, NavigationState};
use crate::output::{CueId, Frontend, PatternId, Rgb, Screen, MATRIX_PIXELS};
use crate::signal::SignalSource;
use crate::stats::SessionStatistics;
use crate::thresholds::{ThresholdParam, ThresholdStore};
use crate::training::{TrainingEvent, TrainingSession, TrainingStatus};
use crate::wave::{derive, CognitiveReading};

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Mode after events were applied
    pub mode: Mode,
    /// Events consumed this tick
    pub events: usize,
    /// Reading taken (Monitor/Train only)
    pub reading: Option<CognitiveReading>,
    /// Classification of the reading
    pub state: Option<CognitiveState>,
}

/// Single-threaded engine
#[derive(Debug)]
pub struct Controller {
    debouncer: Debouncer,
    navigation: NavigationState,
    thresholds: ThresholdStore,
    training: TrainingSession,
    statistics: SessionStatistics,
}

impl Controller {
    /// Build an engine whose statistics start at `now`
    pub fn new(config: &EngineConfig, now: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce()),
            navigation: NavigationState::new(),
            thresholds: ThresholdStore::new(config.thresholds),
            training: TrainingSession::new(config.training),
            statistics: SessionStatistics::new(now),
        }
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn thresholds(&self) -> &ThresholdStore {
        &self.thresholds
    }

    pub fn training(&self) -> &TrainingSession {
        &self.training
    }

    pub fn statistics(&self) -> &SessionStatistics {
        &self.statistics
    }

    /// Report a falling edge. Returns whether it survived debouncing.
    pub fn signal_edge(&mut self, button: Button, held: ButtonSet, now: Duration) -> bool {
        self.debouncer.on_edge(button, held, now)
    }

    /// One read-classify-update-render cycle. Pending events are applied
    /// first, in arrival order. While configuring, the configuration screen
    /// replaces whatever the active mode would render and nothing is sampled.
    pub fn tick(
        &mut self,
        now: Duration,
        signals: &mut dyn SignalSource,
        frontend: &mut dyn Frontend,
    ) -> TickSummary {
        let events = self.debouncer.poll();
        for event in &events {
            if let Some(cue) = self.dispatch(event, now) {
                frontend.play_cue(cue);
            }
        }

        let mode = self.navigation.active_mode();
        let mut summary = TickSummary {
            mode,
            events: events.len(),
            reading: None,
            state: None,
        };

        if self.navigation.is_configuring() {
            self.render_configure(frontend);
            return summary;
        }

        match mode {
            Mode::Monitor => {
                let reading = self.sample(signals);
                let state = classify(&reading, &self.thresholds.current());
                frontend.render_text(&Screen::Monitor { reading, state });
                frontend.render_pattern(state.face());
                frontend.set_indicator(state.indicator());
                summary.reading = Some(reading);
                summary.state = Some(state);
            }
            Mode::Configure => self.render_configure(frontend),
            Mode::Train => {
                let reading = self.sample(signals);
                let thresholds = self.thresholds.current();
                let update = self.training.evaluate(&reading, &thresholds, now);
                if let Some(done) = update.completed {
                    self.statistics.record_session(done.duration);
                }
                if let Some(cue) = update.cue {
                    frontend.play_cue(cue);
                }
                frontend.render_text(&Screen::Train(self.training.view(now)));
                frontend.render_pattern(self.training.pattern());
                frontend.set_indicator(self.training.indicator());
                summary.reading = Some(reading);
                summary.state = Some(classify(&reading, &thresholds));
            }
            Mode::History => {
                let snapshot = self.statistics.snapshot(now);
                frontend.render_text(&Screen::History(snapshot));
                frontend.render_pattern(snapshot.pattern());
                frontend.set_indicator(Rgb::PURPLE);
            }
        }

        summary
    }

    fn sample(&mut self, signals: &mut dyn SignalSource) -> CognitiveReading {
        let raw = signals.read_signals();
        let reading = derive(raw.attention, raw.relaxation);
        self.statistics.record(&reading);
        reading
    }

    fn dispatch(&mut self, event: &ButtonEvent, now: Duration) -> Option<CueId> {
        match self.navigation.apply(event) {
            NavAction::ModeChanged(_) | NavAction::Selected(_) | NavAction::ConfigDone => {
                Some(CueId::Beep)
            }
            NavAction::Adjust(param, direction) => {
                self.thresholds.adjust(param, direction);
                Some(CueId::Beep)
            }
            NavAction::Training(button) => {
                let event = training_event(button, self.training.status())?;
                let update = self.training.apply(event, now);
                if let Some(done) = update.completed {
                    self.statistics.record_session(done.duration);
                }
                update.cue
            }
            NavAction::ClearStatistics(confirmed) => {
                self.statistics.clear(confirmed, now);
                Some(CueId::Success)
            }
        }
    }

    fn render_configure(&self, frontend: &mut dyn Frontend) {
        let thresholds = self.thresholds.current();
        let selected = self.navigation.selected();
        frontend.render_text(&Screen::Configure {
            selected,
            thresholds,
        });
        match selected {
            Some(param) => {
                frontend.render_pattern(PatternId::fraction_bar(thresholds.fraction(param)));
                frontend.set_indicator(configure_indicator(param));
            }
            None => {
                frontend.render_pattern(PatternId::ProgressBar {
                    lit: 0,
                    total: MATRIX_PIXELS,
                });
                frontend.set_indicator(Rgb::BLUE);
            }
        }
    }
}

fn configure_indicator(param: ThresholdParam) -> Rgb {
    if param.is_attention() {
        Rgb::BLUE
    } else {
        Rgb::CYAN
    }
}

/// Training meaning of a Set/Next press for the current status
fn training_event(button: Button, status: TrainingStatus) -> Option<TrainingEvent> {
    match (button, status) {
        (Button::Next, TrainingStatus::Idle) => Some(TrainingEvent::AdvanceObjective),
        (Button::Set, TrainingStatus::Idle) => Some(TrainingEvent::Start),
        (Button::Set, TrainingStatus::Active) => Some(TrainingEvent::Cancel),
        (Button::Set, TrainingStatus::Succeeded | TrainingStatus::Failed) => {
            Some(TrainingEvent::Reset)
        }
        _ => None,
    }
}

/// Controller shared between the edge context and the tick loop
#[derive(Clone)]
pub struct SharedController {
    inner: Arc<Mutex<Controller>>,
    clock: Arc<dyn Clock>,
}

impl SharedController {
    pub fn new(config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let controller = Controller::new(config, clock.now());
        Self {
            inner: Arc::new(Mutex::new(controller)),
            clock,
        }
    }

    /// Current time on the shared clock
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Report an edge, stamped with the shared clock
    pub fn signal_edge(&self, button: Button, held: ButtonSet) -> bool {
        let now = self.clock.now();
        self.inner.lock().signal_edge(button, held, now)
    }

    /// Run one tick under the lock
    pub fn tick(&self, signals: &mut dyn SignalSource, frontend: &mut dyn Frontend) -> TickSummary {
        let now = self.clock.now();
        self.inner.lock().tick(now, signals, frontend)
    }

    /// Direct access, e.g. for reports
    pub fn lock(&self) -> MutexGuard<'_, Controller> {
        self.inner.lock()
    }
}

impl fmt::Debug for SharedController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedController")
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingFrontend;
    use crate::signal::FixedSignals;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn controller() -> Controller {
        Controller::new(&EngineConfig::default(), Duration::ZERO)
    }

    #[test]
    fn test_training_event_mapping() {
        assert_eq!(
            training_event(Button::Next, TrainingStatus::Idle),
            Some(TrainingEvent::AdvanceObjective)
        );
        assert_eq!(training_event(Button::Next, TrainingStatus::Active), None);
        assert_eq!(
            training_event(Button::Set, TrainingStatus::Failed),
            Some(TrainingEvent::Reset)
        );
        assert_eq!(training_event(Button::Back, TrainingStatus::Idle), None);
    }

    #[test]
    fn test_monitor_tick_records_and_renders() {
        let mut c = controller();
        let mut signals = FixedSignals::new(20.0, 5.0);
        let mut frontend = RecordingFrontend::new();

        let summary = c.tick(ms(50), &mut signals, &mut frontend);
        assert_eq!(summary.mode, Mode::Monitor);
        assert_eq!(summary.state, Some(CognitiveState::Distracted));
        assert_eq!(frontend.last_indicator(), Some(Rgb::YELLOW));
        assert_eq!(frontend.last_pattern(), Some(PatternId::SadFace));
        assert_eq!(c.statistics().sample_count(), 1);
        assert!(frontend.cues().is_empty());
    }

    #[test]
    fn test_configure_does_not_sample() {
        let mut c = controller();
        let mut signals = FixedSignals::new(50.0, 5.0);
        let mut frontend = RecordingFrontend::new();

        c.signal_edge(Button::Set, ButtonSet::EMPTY, ms(0));
        let summary = c.tick(ms(50), &mut signals, &mut frontend);
        assert_eq!(summary.mode, Mode::Monitor);
        assert_eq!(summary.reading, None);
        assert!(matches!(
            frontend.last_screen(),
            Some(Screen::Configure { selected: Some(ThresholdParam::AttnLow), .. })
        ));
        assert_eq!(c.statistics().sample_count(), 0);
        assert_eq!(frontend.cues(), vec![CueId::Beep]);
        // attn_low 30 of 100 -> 7 pixels
        assert_eq!(
            frontend.last_pattern(),
            Some(PatternId::ProgressBar { lit: 7, total: 25 })
        );
        assert_eq!(frontend.last_indicator(), Some(Rgb::BLUE));
    }

    #[test]
    fn test_finished_config_cycle_resumes_monitor() {
        let mut c = controller();
        let mut signals = FixedSignals::new(75.0, 8.0);
        let mut frontend = RecordingFrontend::new();

        for i in 0..4 {
            assert!(c.signal_edge(Button::Set, ButtonSet::EMPTY, ms(i * 250)));
            c.tick(ms(i * 250 + 50), &mut signals, &mut frontend);
        }
        assert_eq!(c.statistics().sample_count(), 0);

        assert!(c.signal_edge(Button::Set, ButtonSet::EMPTY, ms(1000)));
        let summary = c.tick(ms(1050), &mut signals, &mut frontend);
        assert!(!c.navigation().is_configuring());
        assert_eq!(summary.mode, Mode::Monitor);
        assert_eq!(summary.state, Some(CognitiveState::Flow));
        assert!(matches!(frontend.last_screen(), Some(Screen::Monitor { .. })));
        assert_eq!(c.statistics().sample_count(), 1);
    }

    #[test]
    fn test_history_renders_purple() {
        let mut c = controller();
        let mut frontend = RecordingFrontend::new();
        c.signal_edge(Button::Back, ButtonSet::EMPTY, ms(0));
        c.tick(ms(50), &mut FixedSignals::new(0.0, 0.0), &mut frontend);
        assert!(matches!(frontend.last_screen(), Some(Screen::History(_))));
        assert_eq!(frontend.last_indicator(), Some(Rgb::PURPLE));
    }

    #[test]
    fn test_shared_controller_uses_clock() {
        let clock = crate::clock::ManualClock::new();
        let shared = SharedController::new(&EngineConfig::default(), Arc::new(clock.clone()));

        assert!(shared.signal_edge(Button::Next, ButtonSet::EMPTY));
        clock.advance(ms(100));
        assert!(!shared.signal_edge(Button::Next, ButtonSet::EMPTY));
        clock.advance(ms(100));
        assert!(shared.signal_edge(Button::Next, ButtonSet::EMPTY));

        let mut frontend = RecordingFrontend::new();
        let summary = shared.tick(&mut FixedSignals::new(50.0, 5.0), &mut frontend);
        assert_eq!(summary.events, 2);
        assert_eq!(summary.mode, Mode::Train);
        assert_eq!(shared.lock().navigation().active_mode(), Mode::Train);
    }
}
