//! Tone scheduler
//!
//! Plays cue note sequences on a [`ToneDevice`]. In blocking mode the caller
//! awaits the whole sequence. In non-blocking mode every note's stop is a
//! spawned deferred task; each buzzer carries a generation counter so a stop
//! only fires if nothing was started on that buzzer in the meantime
//! (last write wins).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::PlaybackMode;
use crate::output::{Buzzer, CueId, Tone};

/// Something that can sound a square wave on a buzzer
pub trait ToneDevice: Send + Sync + 'static {
    fn start(&self, buzzer: Buzzer, frequency_hz: u32);
    fn stop(&self, buzzer: Buzzer);
}

/// Tokio-driven cue player
pub struct ToneScheduler<D: ToneDevice> {
    device: Arc<D>,
    mode: PlaybackMode,
    generations: Arc<Mutex<HashMap<Buzzer, u64>>>,
}

impl<D: ToneDevice> Clone for ToneScheduler<D> {
    fn clone(&self) -> Self {
        Self {
            device: self.device.clone(),
            mode: self.mode,
            generations: self.generations.clone(),
        }
    }
}

impl<D: ToneDevice> fmt::Debug for ToneScheduler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToneScheduler")
            .field("mode", &self.mode)
            .field("generations", &*self.generations.lock())
            .finish()
    }
}

impl<D: ToneDevice> ToneScheduler<D> {
    pub fn new(device: D, mode: PlaybackMode) -> Self {
        Self {
            device: Arc::new(device),
            mode,
            generations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Play a cue. Blocking mode returns once the last note has stopped;
    /// non-blocking mode returns immediately.
    pub async fn play_cue(&self, cue: CueId) {
        tracing::trace!("Cue {:?}", cue);
        match self.mode {
            PlaybackMode::Blocking => self.play_sequence(cue.tones()).await,
            PlaybackMode::NonBlocking => {
                let this = self.clone();
                tokio::spawn(async move { this.play_sequence_deferred(cue.tones()).await });
            }
        }
    }

    /// Start one tone and schedule its stop. Must be called inside a runtime.
    pub fn play_tone(&self, tone: Tone) -> JoinHandle<()> {
        let generation = self.begin(tone.buzzer, tone.frequency_hz);
        let device = self.device.clone();
        let generations = self.generations.clone();

        tokio::spawn(async move {
            tokio::time::sleep(tone.duration).await;
            let current = generations.lock().get(&tone.buzzer).copied();
            if current == Some(generation) {
                device.stop(tone.buzzer);
            } else {
                tracing::trace!("Skipping stale stop on {:?}", tone.buzzer);
            }
        })
    }

    async fn play_sequence(&self, tones: &[Tone]) {
        for tone in tones {
            self.begin(tone.buzzer, tone.frequency_hz);
            tokio::time::sleep(tone.duration).await;
            self.device.stop(tone.buzzer);
            if let Some(gap) = tone.spacing.checked_sub(tone.duration) {
                tokio::time::sleep(gap).await;
            }
        }
    }

    async fn play_sequence_deferred(&self, tones: &[Tone]) {
        for (i, tone) in tones.iter().enumerate() {
            let _stop = self.play_tone(*tone);
            if i + 1 < tones.len() {
                tokio::time::sleep(tone.spacing).await;
            }
        }
    }

    fn begin(&self, buzzer: Buzzer, frequency_hz: u32) -> u64 {
        let mut generations = self.generations.lock();
        let generation = generations.entry(buzzer).or_insert(0);
        *generation += 1;
        self.device.start(buzzer, frequency_hz);
        *generation
    }
}
