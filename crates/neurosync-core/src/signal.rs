//! Signal Reader collaborators
//!
//! The engine pulls one attention/relaxation pair per Monitor/Train tick.
//! `SimulatedSensor` stands in for the two potentiometers of the trainer
//! board: a 12-bit reading per knob, scaled to its range with uniform noise.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::wave::{clamp_to_scale, ATTENTION_MAX, RELAXATION_MAX};

/// Largest 12-bit ADC value
pub const ADC_MAX: u16 = 4095;

const ATTENTION_NOISE: f64 = 2.5;
const RELAXATION_NOISE: f64 = 0.25;

/// Raw pair as produced by a signal source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSignals {
    pub attention: f64,
    pub relaxation: f64,
}

/// Pull interface for attention/relaxation samples
pub trait SignalSource {
    fn read_signals(&mut self) -> RawSignals;
}

/// Constant signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSignals(pub RawSignals);

impl FixedSignals {
    pub fn new(attention: f64, relaxation: f64) -> Self {
        Self(RawSignals {
            attention,
            relaxation,
        })
    }

    pub fn set(&mut self, attention: f64, relaxation: f64) {
        self.0 = RawSignals {
            attention,
            relaxation,
        };
    }
}

impl SignalSource for FixedSignals {
    fn read_signals(&mut self) -> RawSignals {
        self.0
    }
}

/// Two noisy knobs
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    attention_adc: u16,
    relaxation_adc: u16,
    /// Max knob movement per read, in ADC counts (0 = knobs stay put)
    drift: u16,
    rng: StdRng,
}

impl SimulatedSensor {
    pub fn new(attention_adc: u16, relaxation_adc: u16) -> Self {
        Self {
            attention_adc: attention_adc.min(ADC_MAX),
            relaxation_adc: relaxation_adc.min(ADC_MAX),
            drift: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic noise
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Let the knobs wander by up to `counts` per read
    pub fn with_drift(mut self, counts: u16) -> Self {
        self.drift = counts;
        self
    }

    pub fn knobs(&self) -> (u16, u16) {
        (self.attention_adc, self.relaxation_adc)
    }

    pub fn set_knobs(&mut self, attention_adc: u16, relaxation_adc: u16) {
        self.attention_adc = attention_adc.min(ADC_MAX);
        self.relaxation_adc = relaxation_adc.min(ADC_MAX);
    }

    /// Turn the knobs by a signed amount, saturating at the ends
    pub fn nudge(&mut self, attention: i32, relaxation: i32) {
        self.attention_adc = offset(self.attention_adc, attention);
        self.relaxation_adc = offset(self.relaxation_adc, relaxation);
    }

    fn wander(&mut self) {
        if self.drift == 0 {
            return;
        }
        let d = i32::from(self.drift);
        let (a, r) = (self.rng.gen_range(-d..=d), self.rng.gen_range(-d..=d));
        self.nudge(a, r);
    }
}

fn offset(adc: u16, by: i32) -> u16 {
    (i32::from(adc) + by).clamp(0, i32::from(ADC_MAX)) as u16
}

fn scaled(adc: u16, max: f64) -> f64 {
    f64::from(adc) / f64::from(ADC_MAX) * max
}

impl SignalSource for SimulatedSensor {
    fn read_signals(&mut self) -> RawSignals {
        self.wander();
        let attention = scaled(self.attention_adc, ATTENTION_MAX)
            + self.rng.gen_range(-ATTENTION_NOISE..=ATTENTION_NOISE);
        let relaxation = scaled(self.relaxation_adc, RELAXATION_MAX)
            + self.rng.gen_range(-RELAXATION_NOISE..=RELAXATION_NOISE);
        RawSignals {
            attention: clamp_to_scale(attention, ATTENTION_MAX),
            relaxation: clamp_to_scale(relaxation, RELAXATION_MAX),
        }
    }
}
