//! Headless tick loop
//!
//! Button edges come from stdin, one command per line:
//!
//! ```text
//! n     NEXT
//! b     BACK
//! s     SET
//! s+n   SET while NEXT is held (statistics clear in History)
//! ```
//!
//! Frames are printed whenever they change.

use anyhow::Result;
use neurosync_core::{
    Button, ButtonSet, CueId, EngineConfig, MonotonicClock, SharedController, SimulatedSensor,
    ToneScheduler, MATRIX_PIXELS,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Interval, MissedTickBehavior};

use crate::drivers::{splash_frames, Frame, TerminalBuzzer, TerminalFrontend};

/// Options for `neurosync run`
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub attention_knob: u16,
    pub relaxation_knob: u16,
    pub drift: u16,
    pub seed: Option<u64>,
    pub ticks: Option<u64>,
    pub json: bool,
    pub quiet: bool,
}

/// Parse one stdin command into a button edge
pub fn parse_command(line: &str) -> Option<(Button, ButtonSet)> {
    let mut parts = line.trim().split('+').map(str::trim);
    let source = parse_button(parts.next()?)?;
    let mut held = ButtonSet::EMPTY;
    for part in parts {
        held = held.with(parse_button(part)?);
    }
    Some((source, held))
}

fn parse_button(token: &str) -> Option<Button> {
    match token.to_ascii_lowercase().as_str() {
        "n" | "next" => Some(Button::Next),
        "b" | "back" => Some(Button::Back),
        "s" | "set" => Some(Button::Set),
        _ => None,
    }
}

fn spawn_stdin_reader(engine: SharedController) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match parse_command(&line) {
                    Some((button, held)) => {
                        if !engine.signal_edge(button, held) {
                            tracing::debug!("{} ignored (debounce)", button);
                        }
                    }
                    None => tracing::warn!("Unknown command {:?} (use n, b, s or s+n)", line),
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("stdin closed: {}", e);
                    break;
                }
            }
        }
        tracing::debug!("stdin reader stopped");
    });
}

/// Tick timer. A tick that overran (blocking cues) pushes the schedule back
/// instead of firing a burst of catch-up ticks.
fn tick_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

pub async fn run(config: EngineConfig, opts: RunOptions) -> Result<()> {
    let engine = SharedController::new(&config, Arc::new(MonotonicClock::new()));
    let scheduler = ToneScheduler::new(TerminalBuzzer::new(), config.playback);
    let mut sensor =
        SimulatedSensor::new(opts.attention_knob, opts.relaxation_knob).with_drift(opts.drift);
    if let Some(seed) = opts.seed {
        sensor = sensor.with_seed(seed);
    }
    let mut frontend = TerminalFrontend::new();

    tracing::info!(
        "Running: tick={}ms debounce={}ms playback={:?}",
        config.tick_interval_ms,
        config.debounce_ms,
        config.playback
    );
    if !opts.quiet {
        // Title card at full sweep; the animation itself is left to the dashboard
        if let Some(card) = splash_frames().get(usize::from(MATRIX_PIXELS) - 1) {
            print!("{}", card.render());
        }
    }
    scheduler.play_cue(CueId::Startup).await;
    spawn_stdin_reader(engine.clone());

    let mut interval = tick_interval(config.tick_interval());
    let mut last_frame = Frame::default();
    let mut ticks = 0u64;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                tracing::info!("Interrupted");
                break;
            }
        }

        engine.tick(&mut sensor, &mut frontend);
        ticks += 1;

        for cue in frontend.take_cues() {
            scheduler.play_cue(cue).await;
        }

        if !opts.quiet && *frontend.frame() != last_frame {
            print!("{}", frontend.frame().render());
            last_frame = frontend.frame().clone();
        }

        if opts.ticks.is_some_and(|limit| ticks >= limit) {
            break;
        }
    }

    if opts.json {
        let now = engine.now();
        let guard = engine.lock();
        let report = json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "version": neurosync_core::VERSION,
            "ticks": ticks,
            "mode": guard.navigation().active_mode(),
            "thresholds": guard.thresholds().current(),
            "training": guard.training().view(now),
            "statistics": guard.statistics().snapshot(now),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_buttons() {
        assert_eq!(parse_command("n"), Some((Button::Next, ButtonSet::EMPTY)));
        assert_eq!(parse_command(" B \n"), Some((Button::Back, ButtonSet::EMPTY)));
        assert_eq!(parse_command("set"), Some((Button::Set, ButtonSet::EMPTY)));
    }

    #[test]
    fn test_parse_chord() {
        let (button, held) = parse_command("s+n").unwrap();
        assert_eq!(button, Button::Set);
        assert!(held.contains(Button::Next));
        assert!(!held.contains(Button::Back));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrun_tick_does_not_burst() {
        let period = Duration::from_millis(50);
        let mut interval = tick_interval(period);
        assert_eq!(interval.missed_tick_behavior(), MissedTickBehavior::Delay);

        interval.tick().await;
        // A blocking cue holds the loop for most of a second
        tokio::time::advance(Duration::from_millis(840)).await;

        interval.tick().await;
        let late = tokio::time::Instant::now();
        interval.tick().await;
        assert!(tokio::time::Instant::now() - late >= period);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_command("x"), None);
        assert_eq!(parse_command("s+q"), None);
        assert_eq!(parse_command(""), None);
    }
}
