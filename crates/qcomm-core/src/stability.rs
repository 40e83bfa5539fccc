//! Triad stability oscillator.
//!
//! A single scalar that decays each tick unless boosting is on, in which case
//! it climbs. Emergency mode pins a floor under the drift and, once engaged,
//! stays engaged for the lifetime of the oscillator.

use crate::config::StabilityConfig;
use crate::random::{SimRng, uniform};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilitySnapshot {
    pub stability: f64,
    pub boost_active: bool,
    pub emergency_active: bool,
}

pub struct StabilityOscillator {
    stability: f64,
    boost_active: bool,
    emergency_active: bool,
    config: StabilityConfig,
    rng: SimRng,
}

impl StabilityOscillator {
    /// Starts at a uniform draw from the configured initial range.
    pub fn new(config: StabilityConfig, mut rng: SimRng) -> Self {
        let initial = uniform(rng.as_mut(), config.initial_min, config.initial_max)
            .clamp(config.floor, config.ceiling);
        Self {
            stability: initial,
            boost_active: false,
            emergency_active: false,
            config,
            rng,
        }
    }

    /// Applies one drift step and returns the new stability.
    pub fn tick(&mut self) -> f64 {
        let mut next = if self.boost_active {
            self.stability + uniform(self.rng.as_mut(), 0.0, self.config.boost_step)
        } else {
            self.stability - uniform(self.rng.as_mut(), 0.0, self.config.decay_step)
        };

        if self.emergency_active {
            next = next.max(self.config.emergency_floor);
        }

        self.stability = next.clamp(self.config.floor, self.config.ceiling);
        tracing::trace!(target: "stability", stability = self.stability, "Tick");
        self.stability
    }

    /// Flips boosting and returns the new state.
    pub fn toggle_boost(&mut self) -> bool {
        self.boost_active = !self.boost_active;
        tracing::info!(target: "stability", boost_active = self.boost_active, "Boost toggled");
        self.boost_active
    }

    /// Engages emergency mode.
    ///
    /// Returns `false` without touching anything when already engaged.
    /// Otherwise forces boosting on and raises stability immediately.
    pub fn activate_emergency(&mut self) -> bool {
        if self.emergency_active {
            return false;
        }

        self.emergency_active = true;
        self.boost_active = true;
        self.stability = self
            .stability
            .max(self.config.emergency_raise)
            .clamp(self.config.floor, self.config.ceiling);

        tracing::warn!(target: "stability", stability = self.stability, "Emergency stabilization engaged");
        true
    }

    pub fn stability(&self) -> f64 {
        self.stability
    }

    pub fn boost_active(&self) -> bool {
        self.boost_active
    }

    pub fn emergency_active(&self) -> bool {
        self.emergency_active
    }

    pub fn snapshot(&self) -> StabilitySnapshot {
        StabilitySnapshot {
            stability: self.stability,
            boost_active: self.boost_active,
            emergency_active: self.emergency_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;
    use crate::random::testing::MaxRng;

    fn oscillator(seed: u64) -> StabilityOscillator {
        StabilityOscillator::new(StabilityConfig::default(), seeded_rng(seed))
    }

    #[test]
    fn test_initial_value_in_range() {
        for seed in 0..50 {
            let s = oscillator(seed).stability();
            assert!((0.7..=1.0).contains(&s), "seed {} gave {}", seed, s);
        }
    }

    #[test]
    fn test_stability_stays_in_band_under_decay() {
        let mut osc = oscillator(1);
        for _ in 0..500 {
            let s = osc.tick();
            assert!((0.4..=1.0).contains(&s));
        }
        // Enough ticks to hit the floor with max decay 0.03
        assert!(osc.stability() < 0.7);
    }

    #[test]
    fn test_stability_stays_in_band_under_boost() {
        let mut osc = oscillator(2);
        osc.toggle_boost();
        for _ in 0..500 {
            let s = osc.tick();
            assert!((0.4..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_full_decay_hits_floor() {
        let mut osc = StabilityOscillator::new(StabilityConfig::default(), Box::new(MaxRng));
        for _ in 0..100 {
            osc.tick();
        }
        assert_eq!(osc.stability(), 0.4);
    }

    #[test]
    fn test_toggle_boost_flips_without_numeric_change() {
        let mut osc = oscillator(3);
        let before = osc.stability();
        assert!(osc.toggle_boost());
        assert!(!osc.toggle_boost());
        assert_eq!(osc.stability(), before);
    }

    #[test]
    fn test_activate_emergency_raises_immediately() {
        let mut osc = StabilityOscillator::new(StabilityConfig::default(), Box::new(MaxRng));
        for _ in 0..100 {
            osc.tick();
        }
        assert!(osc.stability() < 0.9);

        assert!(osc.activate_emergency());

        assert!(osc.stability() >= 0.9);
        assert!(osc.boost_active());
        assert!(osc.emergency_active());
    }

    #[test]
    fn test_activate_emergency_twice_is_noop() {
        let mut osc = oscillator(4);
        assert!(osc.activate_emergency());
        osc.toggle_boost();
        let before = osc.snapshot();

        assert!(!osc.activate_emergency());

        assert_eq!(osc.snapshot(), before);
    }

    #[test]
    fn test_emergency_floor_holds_while_decaying() {
        let mut osc = oscillator(5);
        osc.activate_emergency();
        // Turn boosting off so the drift runs downward
        osc.toggle_boost();
        for _ in 0..200 {
            let s = osc.tick();
            assert!(s >= 0.85 && s <= 1.0);
        }
    }
}
