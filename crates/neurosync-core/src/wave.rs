//! Wave Model - synthetic band amplitudes
//!
//! Derives four "brain-wave" amplitudes from the two input signals. The bands
//! have no causal role in classification or training; they exist for display.
//!
//! ```text
//! beta  = 10 + attention/100 * 20      (rises with attention)
//! theta = 20 - attention/100 * 15      (falls with attention)
//! alpha =  5 + relaxation/10 * 10      (rises with relaxation)
//! delta = 20 - activation * 18         (activation = mean of both, normalised)
//! ```

use serde::{Deserialize, Serialize};

/// Upper bound of the attention scale
pub const ATTENTION_MAX: f64 = 100.0;

/// Upper bound of the relaxation scale
pub const RELAXATION_MAX: f64 = 10.0;

/// One tick's worth of cognitive signal, with derived band amplitudes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CognitiveReading {
    /// Attention level in [0, 100]
    pub attention: f64,
    /// Relaxation level in [0, 10]
    pub relaxation: f64,
    /// Alpha band (8-12 Hz)
    pub alpha: f64,
    /// Beta band (12-30 Hz)
    pub beta: f64,
    /// Theta band (4-8 Hz)
    pub theta: f64,
    /// Delta band (0.5-4 Hz)
    pub delta: f64,
}

impl CognitiveReading {
    /// Build a reading from raw attention/relaxation. See [`derive`].
    pub fn new(attention: f64, relaxation: f64) -> Self {
        derive(attention, relaxation)
    }
}

/// Derive a reading from attention and relaxation.
///
/// Inputs are clamped to their scales first (NaN counts as 0), so the
/// function is total and every band is finite and non-negative.
pub fn derive(attention: f64, relaxation: f64) -> CognitiveReading {
    let attention = clamp_to_scale(attention, ATTENTION_MAX);
    let relaxation = clamp_to_scale(relaxation, RELAXATION_MAX);

    let attn_norm = attention / ATTENTION_MAX;
    let relax_norm = relaxation / RELAXATION_MAX;

    let beta = 10.0 + attn_norm * 20.0;
    let theta = 20.0 - attn_norm * 15.0;
    let alpha = 5.0 + relax_norm * 10.0;

    let activation = (attn_norm + relax_norm) / 2.0;
    let delta = 20.0 - activation * 18.0;

    CognitiveReading {
        attention,
        relaxation,
        alpha: alpha.max(0.0),
        beta: beta.max(0.0),
        theta: theta.max(0.0),
        delta: delta.max(0.0),
    }
}

pub(crate) fn clamp_to_scale(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_band_formulas() {
        let r = derive(50.0, 5.0);
        assert!(approx(r.beta, 20.0));
        assert!(approx(r.theta, 12.5));
        assert!(approx(r.alpha, 10.0));
        assert!(approx(r.delta, 11.0));
    }

    #[test]
    fn test_extremes() {
        let low = derive(0.0, 0.0);
        assert!(approx(low.beta, 10.0));
        assert!(approx(low.theta, 20.0));
        assert!(approx(low.alpha, 5.0));
        assert!(approx(low.delta, 20.0));

        let high = derive(100.0, 10.0);
        assert!(approx(high.beta, 30.0));
        assert!(approx(high.theta, 5.0));
        assert!(approx(high.alpha, 15.0));
        assert!(approx(high.delta, 2.0));
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let r = derive(250.0, -3.0);
        assert_eq!(r.attention, 100.0);
        assert_eq!(r.relaxation, 0.0);

        let r = derive(f64::NAN, f64::INFINITY);
        assert_eq!(r.attention, 0.0);
        assert_eq!(r.relaxation, 10.0);
        assert!(r.delta.is_finite());
    }

    #[test]
    fn test_bands_never_negative() {
        for a in (0..=100).step_by(10) {
            for x in 0..=10 {
                let r = derive(a as f64, x as f64);
                assert!(r.alpha >= 0.0 && r.beta >= 0.0 && r.theta >= 0.0 && r.delta >= 0.0);
            }
        }
    }
}
