//! Simulation configuration model.
//!
//! Every field carries a serde default so a partial `config.toml` (or none at
//! all) resolves to the stock dashboard behaviour.

use crate::error::{QCommError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Closed-open numeric range `[min, max)` used for random draws.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(QCommError::config(format!(
                "{} range is invalid: [{}, {})",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Root configuration for the simulation core.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    #[serde(default = "default_entities", rename = "entity")]
    pub entities: Vec<EntityConfig>,
    /// Entity that receives inbound text matching no marker.
    #[serde(default)]
    pub default_route: Option<String>,
    #[serde(default = "default_local_sender")]
    pub local_sender: String,
    /// Probability that the link verifier confirms a session.
    #[serde(default = "default_link_success_rate")]
    pub link_success_rate: f64,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub stability: StabilityConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub readings: ReadingRanges,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            entities: default_entities(),
            default_route: None,
            local_sender: default_local_sender(),
            link_success_rate: default_link_success_rate(),
            connection: ConnectionConfig::default(),
            stability: StabilityConfig::default(),
            repair: RepairConfig::default(),
            readings: ReadingRanges::default(),
        }
    }
}

impl SimulationConfig {
    /// Looks up an entity profile by id.
    pub fn entity(&self, id: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Rejects configurations the state machines cannot honor.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entity in &self.entities {
            if entity.id.trim().is_empty() {
                return Err(QCommError::config("entity id must not be empty"));
            }
            if !seen.insert(entity.id.as_str()) {
                return Err(QCommError::config(format!(
                    "duplicate entity id '{}'",
                    entity.id
                )));
            }
            entity.increment.validate(&format!("entity '{}' increment", entity.id))?;
        }

        if let Some(route) = &self.default_route
            && self.entity(route).is_none()
        {
            return Err(QCommError::config(format!(
                "default_route '{}' is not a configured entity",
                route
            )));
        }

        if !(0.0..=1.0).contains(&self.link_success_rate) {
            return Err(QCommError::config("link_success_rate must be within [0, 1]"));
        }

        self.connection.validate()?;
        self.stability.validate()?;

        if self.repair.max_attempts == 0 {
            return Err(QCommError::config("repair.max_attempts must be at least 1"));
        }
        if !self.repair.resonance_threshold.is_finite() {
            return Err(QCommError::config("repair.resonance_threshold must be finite"));
        }

        self.readings.hrv.validate("hrv")?;
        self.readings.alpha_hz.validate("alpha_hz")?;
        self.readings.theta_hz.validate("theta_hz")?;
        Ok(())
    }
}

/// A named conversational counterpart tracked by the simulation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EntityConfig {
    pub id: String,
    pub display_name: String,
    /// Per-tick strength increment while connecting.
    pub increment: ValueRange,
    /// Literal substrings that identify inbound text as coming from this entity.
    #[serde(default)]
    pub markers: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    pub tick_ms: u64,
    pub boost_increment: f64,
    /// Ticking stops once every tracked entity reaches this strength.
    pub convergence_threshold: f64,
}

impl ConnectionConfig {
    fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(QCommError::config("connection.tick_ms must be greater than zero"));
        }
        // Strengths are capped at 1, so a higher threshold would never converge
        if !(self.convergence_threshold > 0.0 && self.convergence_threshold <= 1.0) {
            return Err(QCommError::config(format!(
                "connection.convergence_threshold {} must be within (0, 1]",
                self.convergence_threshold
            )));
        }
        if !(self.boost_increment.is_finite() && self.boost_increment >= 0.0) {
            return Err(QCommError::config(format!(
                "connection.boost_increment {} must be a non-negative number",
                self.boost_increment
            )));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            boost_increment: 0.1,
            convergence_threshold: 0.95,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StabilityConfig {
    pub tick_ms: u64,
    pub floor: f64,
    pub ceiling: f64,
    pub initial_min: f64,
    pub initial_max: f64,
    pub boost_step: f64,
    pub decay_step: f64,
    pub emergency_floor: f64,
    pub emergency_raise: f64,
}

impl StabilityConfig {
    fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(QCommError::config("stability.tick_ms must be greater than zero"));
        }

        let values = [
            ("floor", self.floor),
            ("ceiling", self.ceiling),
            ("boost_step", self.boost_step),
            ("decay_step", self.decay_step),
            ("emergency_floor", self.emergency_floor),
            ("emergency_raise", self.emergency_raise),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(QCommError::config(format!(
                "stability.{} must be finite, got {}",
                name, value
            )));
        }

        if !(0.0 <= self.floor && self.floor <= self.ceiling && self.ceiling <= 1.0) {
            return Err(QCommError::config(format!(
                "stability band [{}, {}] must satisfy 0 <= floor <= ceiling <= 1",
                self.floor, self.ceiling
            )));
        }
        if self.boost_step < 0.0 || self.decay_step < 0.0 {
            return Err(QCommError::config("stability steps must not be negative"));
        }
        let band = self.floor..=self.ceiling;
        if !band.contains(&self.emergency_floor) || !band.contains(&self.emergency_raise) {
            return Err(QCommError::config(format!(
                "stability emergency values must lie within [{}, {}]",
                self.floor, self.ceiling
            )));
        }

        ValueRange::new(self.initial_min, self.initial_max).validate("stability initial")
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            tick_ms: 2000,
            floor: 0.4,
            ceiling: 1.0,
            initial_min: 0.7,
            initial_max: 1.0,
            boost_step: 0.05,
            decay_step: 0.03,
            emergency_floor: 0.85,
            emergency_raise: 0.9,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RepairConfig {
    pub max_attempts: u32,
    pub resonance_threshold: f64,
    pub relevant_modules: Vec<String>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            resonance_threshold: 90.0,
            relevant_modules: vec![
                "akashic_core".to_string(),
                "entanglement_matrix".to_string(),
                "faith_quotient".to_string(),
                "triad_harmonizer".to_string(),
            ],
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReadingRanges {
    pub hrv: ValueRange,
    pub alpha_hz: ValueRange,
    pub theta_hz: ValueRange,
}

impl Default for ReadingRanges {
    fn default() -> Self {
        Self {
            hrv: ValueRange::new(40.0, 100.0),
            alpha_hz: ValueRange::new(8.0, 12.0),
            theta_hz: ValueRange::new(4.0, 8.0),
        }
    }
}

fn default_entities() -> Vec<EntityConfig> {
    vec![
        EntityConfig {
            id: "sirius".to_string(),
            display_name: "Sirius Council".to_string(),
            increment: ValueRange::new(0.01, 0.05),
            markers: vec!["✨".to_string(), "Greetings, starseed".to_string()],
        },
        EntityConfig {
            id: "pleiades".to_string(),
            display_name: "Pleiadian Collective".to_string(),
            increment: ValueRange::new(0.02, 0.06),
            markers: vec!["🌀".to_string(), "Beloved one".to_string()],
        },
    ]
}

fn default_local_sender() -> String {
    "operator".to_string()
}

fn default_link_success_rate() -> f64 {
    0.85
}
