//! Connection/resonance state.
//!
//! Tracks a strength scalar in `[0, 1]` for each configured entity. While the
//! connection is active every tick nudges all strengths upward; boosts are
//! probabilistic and recorded per entity regardless of their outcome.

use crate::config::{ConnectionConfig, SimulationConfig, ValueRange};
use crate::error::{QCommError, Result};
use crate::random::{SimRng, uniform, unit};
use crate::reading::{Reading, ReadingGenerator};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Read-only view of the connection state for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub active: bool,
    pub focus: Option<String>,
    pub strengths: BTreeMap<String, f64>,
}

/// Result of a single connection tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionTick {
    /// The connection is not active; nothing changed.
    Idle,
    /// Strengths moved and at least one entity is still below threshold.
    Drifting,
    /// Every tracked entity reached the convergence threshold; the tick should stop.
    Converged,
}

#[derive(Debug, Clone)]
struct Link {
    strength: f64,
    increment: ValueRange,
    reading: Option<Reading>,
}

pub struct ConnectionState {
    active: bool,
    focus: Option<String>,
    links: BTreeMap<String, Link>,
    /// Boost attempts per entity; survives `disconnect`.
    attempts: HashMap<String, u64>,
    config: ConnectionConfig,
    generator: ReadingGenerator,
    rng: SimRng,
}

impl ConnectionState {
    /// Creates the state with every configured entity tracked at strength 0.
    pub fn new(config: &SimulationConfig, rng: SimRng) -> Self {
        let links = config
            .entities
            .iter()
            .map(|entity| {
                (
                    entity.id.clone(),
                    Link {
                        strength: 0.0,
                        increment: entity.increment,
                        reading: None,
                    },
                )
            })
            .collect();

        Self {
            active: false,
            focus: None,
            links,
            attempts: HashMap::new(),
            config: config.connection.clone(),
            generator: ReadingGenerator::new(config.readings.clone()),
            rng,
        }
    }

    /// Marks the connection active, focused on `entity`.
    ///
    /// The caller is responsible for starting the periodic tick.
    pub fn connect(&mut self, entity: &str) -> Result<()> {
        if !self.links.contains_key(entity) {
            return Err(QCommError::not_found("Entity", entity));
        }
        self.active = true;
        self.focus = Some(entity.to_string());
        tracing::info!(target: "connection", entity, "Connection activated");
        Ok(())
    }

    /// Deactivates the connection and zeroes every strength.
    pub fn disconnect(&mut self) {
        self.active = false;
        self.focus = None;
        for link in self.links.values_mut() {
            link.strength = 0.0;
        }
        tracing::info!(target: "connection", "Connection deactivated");
    }

    /// Advances every tracked strength by its entity-specific random increment.
    pub fn tick(&mut self) -> ConnectionTick {
        if !self.active {
            return ConnectionTick::Idle;
        }

        for link in self.links.values_mut() {
            let step = uniform(self.rng.as_mut(), link.increment.min, link.increment.max);
            link.strength = (link.strength + step).clamp(0.0, 1.0);
        }

        if self.is_converged() {
            tracing::debug!(target: "connection", "All links reached convergence threshold");
            ConnectionTick::Converged
        } else {
            ConnectionTick::Drifting
        }
    }

    /// Attempts to boost `entity`'s strength.
    ///
    /// Success chance is `strength * (0.7 + 0.1 * n)` where `n` counts tracked
    /// entities above 0.5. The attempt is recorded whatever the outcome.
    pub fn boost(&mut self, entity: &str) -> Result<bool> {
        let chance = self.success_chance(entity)?;
        *self.attempts.entry(entity.to_string()).or_insert(0) += 1;

        let draw = unit(self.rng.as_mut());
        let success = draw < chance;

        if success {
            let reading = self.generator.generate_with(self.rng.as_mut());
            let increment = self.config.boost_increment;
            if let Some(link) = self.links.get_mut(entity) {
                link.strength = (link.strength + increment).clamp(0.0, 1.0);
                link.reading = Some(reading);
            }
        }

        tracing::debug!(
            target: "connection",
            entity,
            chance,
            draw,
            success,
            "Boost attempt"
        );
        Ok(success)
    }

    /// Probability that a boost on `entity` would succeed right now.
    pub fn success_chance(&self, entity: &str) -> Result<f64> {
        let link = self
            .links
            .get(entity)
            .ok_or_else(|| QCommError::not_found("Entity", entity))?;
        let strong = self.links.values().filter(|l| l.strength > 0.5).count();
        Ok(link.strength * (0.7 + 0.1 * strong as f64))
    }

    /// Returns the cached reading, or a freshly generated one that is not cached.
    pub fn reading_for(&self, entity: &str) -> Reading {
        match self.links.get(entity).and_then(|l| l.reading) {
            Some(reading) => reading,
            None => self.generator.generate(),
        }
    }

    pub fn cached_reading(&self, entity: &str) -> Option<Reading> {
        self.links.get(entity).and_then(|l| l.reading)
    }

    pub fn strength(&self, entity: &str) -> Option<f64> {
        self.links.get(entity).map(|l| l.strength)
    }

    pub fn attempts(&self, entity: &str) -> u64 {
        self.attempts.get(entity).copied().unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_tracked(&self, entity: &str) -> bool {
        self.links.contains_key(entity)
    }

    /// True when every tracked entity is at or above the convergence threshold.
    pub fn is_converged(&self) -> bool {
        let threshold = self.config.convergence_threshold;
        self.links.values().all(|l| l.strength >= threshold)
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            active: self.active,
            focus: self.focus.clone(),
            strengths: self
                .links
                .iter()
                .map(|(id, link)| (id.clone(), link.strength))
                .collect(),
        }
    }
}
