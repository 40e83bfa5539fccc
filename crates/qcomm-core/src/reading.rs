//! Biofeedback reading generator.
//!
//! Readings are decorative values drawn independently from fixed ranges.

use crate::config::{ReadingRanges, ValueRange};
use crate::random::uniform;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// A single biofeedback-style reading attached to a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Heart-rate-variability-like value.
    pub hrv: f64,
    /// Alpha sub-band in Hz.
    pub alpha_hz: f64,
    /// Theta sub-band in Hz.
    pub theta_hz: f64,
}

/// Produces [`Reading`] values within the configured ranges.
#[derive(Debug, Clone, Default)]
pub struct ReadingGenerator {
    ranges: ReadingRanges,
}

impl ReadingGenerator {
    pub fn new(ranges: ReadingRanges) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> &ReadingRanges {
        &self.ranges
    }

    /// Generates a reading from the thread-local, entropy-seeded generator.
    pub fn generate(&self) -> Reading {
        self.generate_with(&mut rand::thread_rng())
    }

    /// Generates a reading from an injected random source.
    pub fn generate_with(&self, rng: &mut dyn RngCore) -> Reading {
        Reading {
            hrv: draw(rng, &self.ranges.hrv),
            alpha_hz: draw(rng, &self.ranges.alpha_hz),
            theta_hz: draw(rng, &self.ranges.theta_hz),
        }
    }
}

fn draw(rng: &mut dyn RngCore, range: &ValueRange) -> f64 {
    uniform(rng, range.min, range.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;
    use crate::random::testing::ZeroRng;

    #[test]
    fn test_generated_values_stay_in_range() {
        let generator = ReadingGenerator::default();
        let mut rng = seeded_rng(11);
        for _ in 0..200 {
            let reading = generator.generate_with(rng.as_mut());
            assert!((40.0..100.0).contains(&reading.hrv));
            assert!((8.0..12.0).contains(&reading.alpha_hz));
            assert!((4.0..8.0).contains(&reading.theta_hz));
        }
    }

    #[test]
    fn test_zero_draw_yields_range_minimums() {
        let generator = ReadingGenerator::default();
        let reading = generator.generate_with(&mut ZeroRng);
        assert_eq!(reading.hrv, 40.0);
        assert_eq!(reading.alpha_hz, 8.0);
        assert_eq!(reading.theta_hz, 4.0);
    }

    #[test]
    fn test_custom_ranges_are_honored() {
        let generator = ReadingGenerator::new(ReadingRanges {
            hrv: ValueRange::new(60.0, 61.0),
            ..ReadingRanges::default()
        });
        let reading = generator.generate();
        assert!((60.0..61.0).contains(&reading.hrv));
    }
}
