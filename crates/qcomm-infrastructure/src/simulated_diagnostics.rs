//! In-memory diagnostic modules driven by the repair loop.
//!
//! Each module carries a resonance in `[0, 100]`. Repairs and remediation
//! steps push resonance up by random amounts; status is derived from it.

use async_trait::async_trait;
use qcomm_core::error::Result;
use qcomm_core::random::SimRng;
use qcomm_core::repair::{DiagnosticResult, DiagnosticSystem, ModuleStatus};
use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;

const MAX_RESONANCE: f64 = 100.0;

/// Module whose resonance `boost_faith_quotient` targets.
pub const FAITH_QUOTIENT_MODULE: &str = "faith_quotient";

struct ModuleState {
    name: String,
    resonance: f64,
}

struct Inner {
    modules: Vec<ModuleState>,
    rng: SimRng,
}

pub struct SimulatedDiagnostics {
    inner: Mutex<Inner>,
    latency: Option<Duration>,
}

impl SimulatedDiagnostics {
    /// Creates modules with a random starting resonance in `[20, 70)`.
    pub fn new(module_names: &[String], mut rng: SimRng) -> Self {
        let modules = module_names
            .iter()
            .map(|name| ModuleState {
                name: name.clone(),
                resonance: rng.gen_range(20.0..70.0),
            })
            .collect();
        Self {
            inner: Mutex::new(Inner { modules, rng }),
            latency: None,
        }
    }

    /// Creates modules at explicit resonances.
    pub fn with_resonances(modules: Vec<(String, f64)>, rng: SimRng) -> Self {
        let modules = modules
            .into_iter()
            .map(|(name, resonance)| ModuleState {
                name,
                resonance: resonance.clamp(0.0, MAX_RESONANCE),
            })
            .collect();
        Self {
            inner: Mutex::new(Inner { modules, rng }),
            latency: None,
        }
    }

    /// Adds a fixed delay to every call, mimicking a remote subsystem.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn raise_all(&self, min: f64, max: f64) {
        let mut inner = self.inner.lock().await;
        let Inner { modules, rng } = &mut *inner;
        for module in modules.iter_mut() {
            let step = rng.gen_range(min..max);
            module.resonance = (module.resonance + step).min(MAX_RESONANCE);
        }
    }
}

/// Maps a resonance score onto a module status.
pub fn status_for(resonance: f64) -> ModuleStatus {
    match resonance {
        r if r >= 90.0 => ModuleStatus::Optimal,
        r if r >= 60.0 => ModuleStatus::Degraded,
        r if r > 0.0 => ModuleStatus::Critical,
        _ => ModuleStatus::Offline,
    }
}

#[async_trait]
impl DiagnosticSystem for SimulatedDiagnostics {
    async fn repair(&self) -> Result<()> {
        self.pause().await;
        self.raise_all(5.0, 20.0).await;
        tracing::debug!(target: "repair", "Simulated repair pass applied");
        Ok(())
    }

    async fn diagnostics(&self) -> Result<Vec<DiagnosticResult>> {
        self.pause().await;
        let inner = self.inner.lock().await;
        Ok(inner
            .modules
            .iter()
            .map(|m| DiagnosticResult {
                module_name: m.name.clone(),
                status: status_for(m.resonance),
                resonance: m.resonance,
            })
            .collect())
    }

    async fn recalibrate(&self) -> Result<()> {
        self.pause().await;
        self.raise_all(0.0, 5.0).await;
        Ok(())
    }

    async fn boost_faith_quotient(&self) -> Result<()> {
        self.pause().await;
        let mut inner = self.inner.lock().await;
        if let Some(module) = inner
            .modules
            .iter_mut()
            .find(|m| m.name == FAITH_QUOTIENT_MODULE)
        {
            module.resonance = (module.resonance + 10.0).min(MAX_RESONANCE);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcomm_core::config::RepairConfig;
    use qcomm_core::random::seeded_rng;
    use qcomm_core::repair::RepairLoop;

    fn modules() -> Vec<String> {
        RepairConfig::default().relevant_modules
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(status_for(95.0), ModuleStatus::Optimal);
        assert_eq!(status_for(90.0), ModuleStatus::Optimal);
        assert_eq!(status_for(75.0), ModuleStatus::Degraded);
        assert_eq!(status_for(10.0), ModuleStatus::Critical);
        assert_eq!(status_for(0.0), ModuleStatus::Offline);
    }

    #[tokio::test]
    async fn test_repair_never_lowers_or_overflows() {
        let system = SimulatedDiagnostics::new(&modules(), seeded_rng(1));
        let before = system.diagnostics().await.unwrap();

        for _ in 0..20 {
            system.repair().await.unwrap();
        }

        let after = system.diagnostics().await.unwrap();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!(a.resonance >= b.resonance);
            assert!(a.resonance <= 100.0);
        }
    }

    #[tokio::test]
    async fn test_faith_boost_targets_one_module() {
        let system = SimulatedDiagnostics::with_resonances(
            vec![
                ("faith_quotient".to_string(), 50.0),
                ("akashic_core".to_string(), 50.0),
            ],
            seeded_rng(2),
        );

        system.boost_faith_quotient().await.unwrap();

        let results = system.diagnostics().await.unwrap();
        assert_eq!(results[0].resonance, 60.0);
        assert_eq!(results[1].resonance, 50.0);
    }

    #[tokio::test]
    async fn test_repair_loop_converges_on_simulation() {
        // Two repair passes add at least 10 to every module
        let system = SimulatedDiagnostics::with_resonances(
            modules().into_iter().map(|m| (m, 80.0)).collect(),
            seeded_rng(3),
        );

        let report = RepairLoop::new(RepairConfig::default()).run(&system).await;

        assert!(report.converged);
        assert!(report.attempts <= 2);
    }
}
