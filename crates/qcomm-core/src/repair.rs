//! Bounded repair loop.
//!
//! Repeatedly repairs and re-diagnoses an external system until every
//! relevant module reports healthy or the attempt ceiling is reached.
//! Running out of attempts is a normal negative outcome, not an error.

use crate::config::RepairConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModuleStatus {
    Optimal,
    Degraded,
    Critical,
    Offline,
}

/// Health report for a single diagnostic module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub module_name: String,
    pub status: ModuleStatus,
    pub resonance: f64,
}

/// The external subsystem the repair loop drives.
///
/// Implementations own module naming and scoring. All methods may suspend.
#[async_trait]
pub trait DiagnosticSystem: Send + Sync {
    /// Mutates the underlying diagnostic state toward health.
    async fn repair(&self) -> Result<()>;

    async fn diagnostics(&self) -> Result<Vec<DiagnosticResult>>;

    async fn recalibrate(&self) -> Result<()>;

    async fn boost_faith_quotient(&self) -> Result<()>;
}

/// Outcome of a [`RepairLoop::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    pub converged: bool,
    pub attempts: u32,
    /// Number of iterations that ran both remediation steps.
    pub remediation_rounds: u32,
    /// The relevant results observed on the final diagnostic pass.
    pub last_results: Vec<DiagnosticResult>,
    /// Set when a collaborator call failed and ended the loop early.
    pub failure: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RepairLoop {
    config: RepairConfig,
}

impl RepairLoop {
    pub fn new(config: RepairConfig) -> Self {
        Self { config }
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// True when every relevant module is optimal or above the resonance threshold.
    ///
    /// Modules outside the relevant set are ignored.
    pub fn is_stabilized(&self, relevant: &[DiagnosticResult]) -> bool {
        relevant.iter().all(|r| {
            r.status == ModuleStatus::Optimal || r.resonance >= self.config.resonance_threshold
        })
    }

    fn relevant(&self, results: Vec<DiagnosticResult>) -> Vec<DiagnosticResult> {
        results
            .into_iter()
            .filter(|r| self.config.relevant_modules.contains(&r.module_name))
            .collect()
    }

    /// Runs repair/diagnose iterations until convergence or the attempt ceiling.
    ///
    /// A collaborator error stops the loop and is reported through
    /// `RepairReport::failure` with `converged == false`.
    pub async fn run(&self, system: &dyn DiagnosticSystem) -> RepairReport {
        let mut report = RepairReport {
            converged: false,
            attempts: 0,
            remediation_rounds: 0,
            last_results: Vec::new(),
            failure: None,
        };

        while !report.converged && report.attempts < self.config.max_attempts {
            report.attempts += 1;
            tracing::info!(
                target: "repair",
                attempt = report.attempts,
                max = self.config.max_attempts,
                "Repair attempt"
            );

            if let Err(e) = self.iterate(system, &mut report).await {
                tracing::error!(target: "repair", attempt = report.attempts, "Repair aborted: {}", e);
                report.failure = Some(e.to_string());
                report.converged = false;
                break;
            }
        }

        if report.converged {
            tracing::info!(target: "repair", attempts = report.attempts, "Diagnostics stabilized");
        } else if report.failure.is_none() {
            tracing::warn!(
                target: "repair",
                attempts = report.attempts,
                "Diagnostics did not stabilize"
            );
        }
        report
    }

    async fn iterate(&self, system: &dyn DiagnosticSystem, report: &mut RepairReport) -> Result<()> {
        system.repair().await?;
        let relevant = self.relevant(system.diagnostics().await?);
        report.converged = self.is_stabilized(&relevant);
        report.last_results = relevant;

        if !report.converged {
            system.recalibrate().await?;
            system.boost_faith_quotient().await?;
            report.remediation_rounds += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QCommError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports every relevant module at a fixed resonance, or a resonance
    /// that climbs by `step` on every repair.
    struct MockDiagnostics {
        resonance: Mutex<f64>,
        step: f64,
        status: ModuleStatus,
        fail_recalibrate: bool,
        repairs: AtomicUsize,
        recalibrations: AtomicUsize,
        faith_boosts: AtomicUsize,
    }

    impl MockDiagnostics {
        fn fixed(resonance: f64) -> Self {
            Self::climbing(resonance, 0.0)
        }

        fn climbing(start: f64, step: f64) -> Self {
            Self {
                resonance: Mutex::new(start),
                step,
                status: ModuleStatus::Degraded,
                fail_recalibrate: false,
                repairs: AtomicUsize::new(0),
                recalibrations: AtomicUsize::new(0),
                faith_boosts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DiagnosticSystem for MockDiagnostics {
        async fn repair(&self) -> Result<()> {
            self.repairs.fetch_add(1, Ordering::SeqCst);
            *self.resonance.lock().unwrap() += self.step;
            Ok(())
        }

        async fn diagnostics(&self) -> Result<Vec<DiagnosticResult>> {
            let resonance = *self.resonance.lock().unwrap();
            let mut results: Vec<DiagnosticResult> = RepairConfig::default()
                .relevant_modules
                .into_iter()
                .map(|module_name| DiagnosticResult {
                    module_name,
                    status: self.status,
                    resonance,
                })
                .collect();
            // Irrelevant modules never block convergence
            results.push(DiagnosticResult {
                module_name: "chrono_buffer".to_string(),
                status: ModuleStatus::Critical,
                resonance: 0.0,
            });
            Ok(results)
        }

        async fn recalibrate(&self) -> Result<()> {
            self.recalibrations.fetch_add(1, Ordering::SeqCst);
            if self.fail_recalibrate {
                return Err(QCommError::generation_failure("calibration rejected"));
            }
            Ok(())
        }

        async fn boost_faith_quotient(&self) -> Result<()> {
            self.faith_boosts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn repair_loop() -> RepairLoop {
        RepairLoop::new(RepairConfig::default())
    }

    #[tokio::test]
    async fn test_converges_first_try_without_remediation() {
        let system = MockDiagnostics::fixed(95.0);

        let report = repair_loop().run(&system).await;

        assert!(report.converged);
        assert_eq!(report.attempts, 1);
        assert_eq!(report.remediation_rounds, 0);
        assert_eq!(system.repairs.load(Ordering::SeqCst), 1);
        assert_eq!(system.recalibrations.load(Ordering::SeqCst), 0);
        assert_eq!(system.faith_boosts.load(Ordering::SeqCst), 0);
        assert_eq!(report.last_results.len(), 4);
    }

    #[tokio::test]
    async fn test_exhausts_attempts_at_zero_resonance() {
        let system = MockDiagnostics::fixed(0.0);

        let report = repair_loop().run(&system).await;

        assert!(!report.converged);
        assert!(report.failure.is_none());
        assert_eq!(report.attempts, 6);
        assert_eq!(report.remediation_rounds, 6);
        assert_eq!(system.repairs.load(Ordering::SeqCst), 6);
        assert_eq!(system.recalibrations.load(Ordering::SeqCst), 6);
        assert_eq!(system.faith_boosts.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_stops_as_soon_as_it_converges() {
        // First repair lifts resonance to 75, second to 90
        let system = MockDiagnostics::climbing(60.0, 15.0);

        let report = repair_loop().run(&system).await;

        assert!(report.converged);
        assert_eq!(report.attempts, 2);
        assert_eq!(report.remediation_rounds, 1);
        assert_eq!(system.repairs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_optimal_status_converges_regardless_of_resonance() {
        let mut system = MockDiagnostics::fixed(10.0);
        system.status = ModuleStatus::Optimal;

        let report = repair_loop().run(&system).await;

        assert!(report.converged);
        assert_eq!(report.attempts, 1);
    }

    #[tokio::test]
    async fn test_collaborator_failure_ends_loop_negative() {
        let mut system = MockDiagnostics::fixed(0.0);
        system.fail_recalibrate = true;

        let report = repair_loop().run(&system).await;

        assert!(!report.converged);
        assert_eq!(report.attempts, 1);
        assert_eq!(system.faith_boosts.load(Ordering::SeqCst), 0);
        assert!(report.failure.unwrap().contains("calibration rejected"));
    }

    #[test]
    fn test_status_parses_snake_case() {
        use std::str::FromStr;
        assert_eq!(ModuleStatus::from_str("optimal").unwrap(), ModuleStatus::Optimal);
        assert_eq!(ModuleStatus::Critical.to_string(), "critical");
    }
}
