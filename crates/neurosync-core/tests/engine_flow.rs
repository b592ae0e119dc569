//! End-to-end tests driving the engine through the shared controller
//!
//! Buttons are reported on the edge side, ticks run on the loop side, and a
//! manual clock keeps everything deterministic.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use neurosync_core::{
    Button, ButtonSet, CognitiveState, CueId, EngineConfig, FixedSignals, ManualClock, Mode,
    PatternId, RecordingFrontend, Rgb, Screen, SharedController, ThresholdParam, TickSummary,
    TrainingStatus,
};

const TICK: Duration = Duration::from_millis(50);

struct Rig {
    clock: ManualClock,
    engine: SharedController,
    signals: FixedSignals,
    frontend: RecordingFrontend,
}

impl Rig {
    fn new(attention: f64, relaxation: f64) -> Self {
        let clock = ManualClock::new();
        let engine = SharedController::new(&EngineConfig::default(), Arc::new(clock.clone()));
        Self {
            clock,
            engine,
            signals: FixedSignals::new(attention, relaxation),
            frontend: RecordingFrontend::new(),
        }
    }

    /// Wait out the debounce window, then press
    fn press(&mut self, button: Button) {
        self.clock.advance(Duration::from_millis(250));
        assert!(self.engine.signal_edge(button, ButtonSet::EMPTY));
    }

    fn press_with(&mut self, button: Button, held: Button) {
        self.clock.advance(Duration::from_millis(250));
        assert!(self.engine.signal_edge(button, ButtonSet::EMPTY.with(held)));
    }

    fn tick(&mut self) -> TickSummary {
        self.clock.advance(TICK);
        self.engine.tick(&mut self.signals, &mut self.frontend)
    }

    fn cues(&self) -> Vec<CueId> {
        self.frontend.cues()
    }
}

#[test]
fn e2e_monitor_classifies_flow() {
    let mut rig = Rig::new(75.0, 8.0);
    let before = rig.engine.lock().statistics().sample_count();

    let summary = rig.tick();

    assert_eq!(summary.mode, Mode::Monitor);
    assert_eq!(summary.state, Some(CognitiveState::Flow));
    assert_eq!(rig.frontend.last_indicator(), Some(Rgb::TEAL));
    assert_eq!(rig.frontend.last_pattern(), Some(PatternId::HappyFace));
    assert_eq!(rig.engine.lock().statistics().sample_count(), before + 1);

    let lines = rig.frontend.last_screen().unwrap().lines();
    assert_eq!(lines[1], "Attn: 75.0% Rel: 8.0");
    assert_eq!(lines[2], "State: Flow");
}

#[test]
fn e2e_events_apply_before_render() {
    let mut rig = Rig::new(50.0, 5.0);
    rig.press(Button::Next);
    let summary = rig.tick();

    assert_eq!(summary.events, 1);
    assert_eq!(summary.mode, Mode::Configure);
    assert!(matches!(
        rig.frontend.last_screen(),
        Some(Screen::Configure { selected: None, .. })
    ));
    assert_eq!(rig.cues(), vec![CueId::Beep]);
}

#[test]
fn e2e_bounces_are_dropped() {
    let mut rig = Rig::new(50.0, 5.0);
    assert!(rig.engine.signal_edge(Button::Next, ButtonSet::EMPTY));
    for _ in 0..3 {
        rig.clock.advance(Duration::from_millis(50));
        assert!(!rig.engine.signal_edge(Button::Back, ButtonSet::EMPTY));
    }

    let summary = rig.tick();
    assert_eq!(summary.events, 1);
    assert_eq!(summary.mode, Mode::Configure);
}

#[test]
fn e2e_configuration_cycle_resets_selection() {
    let mut rig = Rig::new(50.0, 5.0);
    rig.press(Button::Next);
    rig.tick();

    for param in ThresholdParam::ALL {
        rig.press(Button::Set);
        rig.tick();
        assert_eq!(rig.engine.lock().navigation().selected(), Some(param));
    }

    rig.press(Button::Set);
    rig.tick();
    {
        let engine = rig.engine.lock();
        assert!(!engine.navigation().is_configuring());
        assert_eq!(engine.navigation().selected(), None);
    }
    assert_eq!(rig.frontend.last_screen().unwrap().lines()[1], "Attn 30-70%");

    rig.press(Button::Set);
    rig.tick();
    assert_eq!(
        rig.engine.lock().navigation().selected(),
        Some(ThresholdParam::AttnLow)
    );
    assert_eq!(rig.frontend.last_screen().unwrap().lines()[1], "Attention low threshold");
    assert!(rig.cues().iter().all(|c| *c == CueId::Beep));
}

#[test]
fn e2e_threshold_adjustment_clamps_to_partner() {
    let mut rig = Rig::new(50.0, 5.0);
    rig.press(Button::Set);
    for _ in 0..20 {
        rig.press(Button::Next);
        rig.tick();
    }

    let thresholds = rig.engine.lock().thresholds().current();
    assert_eq!(thresholds.attn_low, 65.0);
    assert_eq!(thresholds.attn_high, 70.0);
    assert_eq!(
        rig.frontend.last_pattern(),
        Some(PatternId::ProgressBar { lit: 16, total: 25 })
    );

    // Back still means "decrease" while configuring
    rig.press(Button::Back);
    rig.tick();
    assert_eq!(rig.engine.lock().thresholds().current().attn_low, 60.0);
    assert_eq!(rig.engine.lock().navigation().active_mode(), Mode::Monitor);
}

#[test]
fn e2e_configuration_from_monitor_returns_to_monitor() {
    let mut rig = Rig::new(75.0, 8.0);

    for _ in ThresholdParam::ALL {
        rig.press(Button::Set);
        let summary = rig.tick();
        assert_eq!(summary.mode, Mode::Monitor);
        assert_eq!(summary.reading, None);
        assert!(matches!(
            rig.frontend.last_screen(),
            Some(Screen::Configure { selected: Some(_), .. })
        ));
    }

    rig.press(Button::Set);
    let summary = rig.tick();
    assert_eq!(summary.mode, Mode::Monitor);
    assert_eq!(summary.state, Some(CognitiveState::Flow));
    assert!(matches!(rig.frontend.last_screen(), Some(Screen::Monitor { .. })));
    assert_eq!(rig.engine.lock().statistics().sample_count(), 1);
}

#[test]
fn e2e_training_reaches_max_level() {
    let mut rig = Rig::new(85.0, 5.0);
    rig.press(Button::Next);
    rig.press(Button::Next);
    rig.press(Button::Set);
    rig.tick();
    assert_eq!(rig.engine.lock().training().status(), TrainingStatus::Active);

    for _ in 0..500 {
        rig.tick();
    }

    {
        let engine = rig.engine.lock();
        assert_eq!(engine.training().status(), TrainingStatus::Succeeded);
        assert_eq!(engine.training().level(), 10);
        assert_eq!(engine.statistics().completed_sessions(), 1);
        assert_eq!(engine.statistics().sample_count(), 501);
    }

    let successes = rig.cues().iter().filter(|c| **c == CueId::Success).count();
    assert_eq!(successes, 1 + 9);
    assert_eq!(rig.frontend.last_pattern(), Some(PatternId::HappyFace));
    assert_eq!(rig.frontend.last_indicator(), Some(Rgb::GREEN));

    rig.press(Button::Set);
    rig.tick();
    assert_eq!(rig.engine.lock().training().status(), TrainingStatus::Idle);
    assert_eq!(rig.cues().last(), Some(&CueId::Beep));
}

#[test]
fn e2e_training_timeout_fails_once() {
    let mut rig = Rig::new(20.0, 2.0);
    rig.press(Button::Back);
    rig.press(Button::Back);
    rig.press(Button::Set);
    rig.tick();

    for _ in 0..320 {
        rig.clock.advance(Duration::from_secs(1));
        rig.tick();
    }

    let engine = rig.engine.lock();
    assert_eq!(engine.training().status(), TrainingStatus::Failed);
    assert_eq!(engine.statistics().completed_sessions(), 1);
    assert_eq!(
        rig.frontend.cues().iter().filter(|c| **c == CueId::Failure).count(),
        1
    );
    assert_eq!(rig.frontend.last_pattern(), Some(PatternId::SadFace));
}

#[test]
fn e2e_cancelled_session_is_not_counted() {
    let mut rig = Rig::new(85.0, 5.0);
    rig.press(Button::Next);
    rig.press(Button::Next);
    rig.press(Button::Next); // not configuring in Train: next objective
    rig.tick();
    assert_eq!(rig.engine.lock().navigation().active_mode(), Mode::Train);

    rig.press(Button::Set);
    rig.tick();
    rig.press(Button::Set);
    rig.tick();

    let engine = rig.engine.lock();
    assert_eq!(engine.training().status(), TrainingStatus::Idle);
    assert_eq!(engine.statistics().completed_sessions(), 0);
}

#[test]
fn e2e_history_clear_needs_chord() {
    let mut rig = Rig::new(60.0, 4.0);
    for _ in 0..10 {
        rig.tick();
    }
    rig.press(Button::Back);
    rig.tick();
    assert_eq!(rig.engine.lock().statistics().sample_count(), 10);
    assert!(matches!(rig.frontend.last_screen(), Some(Screen::History(_))));

    rig.press_with(Button::Set, Button::Next);
    rig.tick();

    assert_eq!(rig.engine.lock().statistics().sample_count(), 0);
    assert_eq!(rig.engine.lock().navigation().active_mode(), Mode::History);
    assert_eq!(rig.cues().last(), Some(&CueId::Success));
    assert_eq!(
        rig.frontend.last_pattern(),
        Some(PatternId::StatsBars {
            attention: 0,
            relaxation: 0,
            sessions: 0
        })
    );
}

#[test]
fn e2e_edges_from_another_thread() {
    let mut rig = Rig::new(50.0, 5.0);
    let clock = rig.clock.clone();
    let engine = rig.engine.clone();

    let edges = thread::spawn(move || {
        let mut accepted = 0;
        for _ in 0..10 {
            clock.advance(Duration::from_millis(250));
            if engine.signal_edge(Button::Next, ButtonSet::EMPTY) {
                accepted += 1;
            }
            thread::sleep(Duration::from_millis(2));
        }
        accepted
    });

    // Ticks race the edge thread on the same lock
    let mut consumed = 0;
    let mut ticks = 0;
    while !edges.is_finished() {
        consumed += rig.tick().events;
        ticks += 1;
        thread::yield_now();
    }
    let accepted = edges.join().unwrap();
    consumed += rig.tick().events;

    assert_eq!(accepted, 10);
    assert_eq!(consumed, accepted);
    assert!(ticks > 0);
    assert_eq!(rig.tick().events, 0);
    assert_eq!(rig.engine.lock().navigation().active_mode(), Mode::Train);
}
