//! Threshold Store
//!
//! Owns the four classification thresholds. Adjustments never fail: after
//! every step the value is pulled back inside its absolute bounds and inside
//! the minimum gap to its partner, so `low < high` always holds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::wave::{ATTENTION_MAX, RELAXATION_MAX};

/// Step and minimum gap for attention thresholds
pub const ATTENTION_STEP: f64 = 5.0;

/// Step and minimum gap for relaxation thresholds
pub const RELAXATION_STEP: f64 = 0.5;

/// Classification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub attn_low: f64,
    pub attn_high: f64,
    pub relax_low: f64,
    pub relax_high: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            attn_low: 30.0,
            attn_high: 70.0,
            relax_low: 3.0,
            relax_high: 7.0,
        }
    }
}

impl ThresholdSet {
    /// Current value of one parameter
    pub fn value(&self, param: ThresholdParam) -> f64 {
        match param {
            ThresholdParam::AttnLow => self.attn_low,
            ThresholdParam::AttnHigh => self.attn_high,
            ThresholdParam::RelaxLow => self.relax_low,
            ThresholdParam::RelaxHigh => self.relax_high,
        }
    }

    /// Value of a parameter as a fraction of its scale, in [0, 1]
    pub fn fraction(&self, param: ThresholdParam) -> f64 {
        (self.value(param) / param.scale_max()).clamp(0.0, 1.0)
    }

    /// Whether bounds and minimum gaps hold
    pub fn is_valid(&self) -> bool {
        let in_range = |v: f64, max: f64| (0.0..=max).contains(&v);
        in_range(self.attn_low, ATTENTION_MAX)
            && in_range(self.attn_high, ATTENTION_MAX)
            && in_range(self.relax_low, RELAXATION_MAX)
            && in_range(self.relax_high, RELAXATION_MAX)
            && self.attn_high - self.attn_low >= ATTENTION_STEP
            && self.relax_high - self.relax_low >= RELAXATION_STEP
    }
}

/// Adjustable parameter, in configuration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdParam {
    AttnLow,
    AttnHigh,
    RelaxLow,
    RelaxHigh,
}

impl ThresholdParam {
    /// All parameters in the order Set walks through them
    pub const ALL: [ThresholdParam; 4] = [
        ThresholdParam::AttnLow,
        ThresholdParam::AttnHigh,
        ThresholdParam::RelaxLow,
        ThresholdParam::RelaxHigh,
    ];

    /// Position in configuration order (0..=3)
    pub fn index(self) -> usize {
        match self {
            ThresholdParam::AttnLow => 0,
            ThresholdParam::AttnHigh => 1,
            ThresholdParam::RelaxLow => 2,
            ThresholdParam::RelaxHigh => 3,
        }
    }

    /// Parameter at a configuration index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Following parameter, or `None` after the last one
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn is_attention(self) -> bool {
        matches!(self, ThresholdParam::AttnLow | ThresholdParam::AttnHigh)
    }

    pub fn step(self) -> f64 {
        if self.is_attention() {
            ATTENTION_STEP
        } else {
            RELAXATION_STEP
        }
    }

    fn scale_max(self) -> f64 {
        if self.is_attention() {
            ATTENTION_MAX
        } else {
            RELAXATION_MAX
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            ThresholdParam::AttnLow => "Attention low threshold",
            ThresholdParam::AttnHigh => "Attention high threshold",
            ThresholdParam::RelaxLow => "Relaxation low threshold",
            ThresholdParam::RelaxHigh => "Relaxation high threshold",
        }
    }
}

impl fmt::Display for ThresholdParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Adjustment direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Increase,
    Decrease,
}

/// Exclusive owner of the live `ThresholdSet`
#[derive(Debug, Clone, Default)]
pub struct ThresholdStore {
    set: ThresholdSet,
}

impl ThresholdStore {
    /// Create a store. An initial set that breaks the invariant is replaced by
    /// the defaults; `EngineConfig::validate` reports that case up front.
    pub fn new(initial: ThresholdSet) -> Self {
        let set = if initial.is_valid() {
            initial
        } else {
            tracing::warn!("Initial thresholds {:?} are inconsistent, using defaults", initial);
            ThresholdSet::default()
        };
        Self { set }
    }

    /// Current thresholds
    pub fn current(&self) -> ThresholdSet {
        self.set
    }

    /// Step one parameter up or down, then re-clamp against bounds and partner.
    pub fn adjust(&mut self, param: ThresholdParam, direction: Direction) -> ThresholdSet {
        let step = match direction {
            Direction::Increase => param.step(),
            Direction::Decrease => -param.step(),
        };
        let s = &mut self.set;

        match param {
            ThresholdParam::AttnLow => {
                s.attn_low = (s.attn_low + step).clamp(0.0, s.attn_high - ATTENTION_STEP);
            }
            ThresholdParam::AttnHigh => {
                s.attn_high =
                    (s.attn_high + step).clamp(s.attn_low + ATTENTION_STEP, ATTENTION_MAX);
            }
            ThresholdParam::RelaxLow => {
                s.relax_low = (s.relax_low + step).clamp(0.0, s.relax_high - RELAXATION_STEP);
            }
            ThresholdParam::RelaxHigh => {
                s.relax_high =
                    (s.relax_high + step).clamp(s.relax_low + RELAXATION_STEP, RELAXATION_MAX);
            }
        }

        tracing::debug!(
            "Threshold {:?} {:?} -> {:.1}",
            param,
            direction,
            self.set.value(param)
        );
        self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let set = ThresholdSet::default();
        assert_eq!(set.attn_low, 30.0);
        assert_eq!(set.attn_high, 70.0);
        assert_eq!(set.relax_low, 3.0);
        assert_eq!(set.relax_high, 7.0);
        assert!(set.is_valid());
    }

    #[test]
    fn test_step_sizes() {
        let mut store = ThresholdStore::default();
        assert_eq!(store.adjust(ThresholdParam::AttnLow, Direction::Increase).attn_low, 35.0);
        assert_eq!(store.adjust(ThresholdParam::RelaxHigh, Direction::Decrease).relax_high, 6.5);
    }

    #[test]
    fn test_low_is_pulled_back_below_high() {
        let mut store = ThresholdStore::default();
        for _ in 0..20 {
            store.adjust(ThresholdParam::AttnLow, Direction::Increase);
        }
        let set = store.current();
        assert_eq!(set.attn_low, 65.0);
        assert_eq!(set.attn_high, 70.0);
    }

    #[test]
    fn test_high_is_pulled_back_above_low() {
        let mut store = ThresholdStore::default();
        for _ in 0..20 {
            store.adjust(ThresholdParam::RelaxHigh, Direction::Decrease);
        }
        let set = store.current();
        assert_eq!(set.relax_high, 3.5);
    }

    #[test]
    fn test_absolute_bounds() {
        let mut store = ThresholdStore::default();
        for _ in 0..40 {
            store.adjust(ThresholdParam::AttnHigh, Direction::Increase);
            store.adjust(ThresholdParam::RelaxLow, Direction::Decrease);
        }
        let set = store.current();
        assert_eq!(set.attn_high, 100.0);
        assert_eq!(set.relax_low, 0.0);
    }

    #[test]
    fn test_param_order() {
        assert_eq!(ThresholdParam::from_index(0), Some(ThresholdParam::AttnLow));
        assert_eq!(ThresholdParam::RelaxLow.next(), Some(ThresholdParam::RelaxHigh));
        assert_eq!(ThresholdParam::RelaxHigh.next(), None);
        assert_eq!(ThresholdParam::from_index(4), None);
    }

    #[test]
    fn test_invalid_initial_set_falls_back() {
        let bad = ThresholdSet {
            attn_low: 80.0,
            attn_high: 70.0,
            ..ThresholdSet::default()
        };
        assert_eq!(ThresholdStore::new(bad).current(), ThresholdSet::default());
    }

    fn any_param() -> impl Strategy<Value = ThresholdParam> {
        (0usize..4).prop_map(|i| ThresholdParam::ALL[i])
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Increase), Just(Direction::Decrease)]
    }

    proptest! {
        #[test]
        fn prop_ordering_holds_after_any_adjustments(
            ops in proptest::collection::vec((any_param(), any_direction()), 0..200)
        ) {
            let mut store = ThresholdStore::default();
            for (param, direction) in ops {
                let set = store.adjust(param, direction);
                prop_assert!(set.attn_low < set.attn_high);
                prop_assert!(set.relax_low < set.relax_high);
                prop_assert!(set.is_valid());
            }
        }
    }
}
