//! Dashboard service.
//!
//! `DashboardService` is the single, explicitly constructed owner of the
//! simulation state. Presentation reads snapshots from it and mutates state
//! only through its operations, each of which returns an
//! [`OperationOutcome`] instead of an error.

use crate::outcome::OperationOutcome;
use crate::scheduler::{Clock, TickControl, TimerHandle, TimerKind, TokioClock, spawn_periodic};
use qcomm_core::config::SimulationConfig;
use qcomm_core::connection::{ConnectionState, ConnectionStatus, ConnectionTick};
use qcomm_core::dispatch::{MessageDispatcher, ResponseRouter};
use qcomm_core::error::QCommError;
use qcomm_core::notification::{Notification, Notifier};
use qcomm_core::random::{SimRng, default_rng, seeded_rng};
use qcomm_core::reading::Reading;
use qcomm_core::repair::{DiagnosticSystem, RepairLoop, RepairReport};
use qcomm_core::session::{
    LinkVerification, LinkVerifier, Message, PatternAnalysis, PatternAnalyzer, Session,
    SessionRegistry,
};
use qcomm_core::stability::{StabilityOscillator, StabilitySnapshot};
use qcomm_core::translation::Translator;
use qcomm_infrastructure::{
    KeywordPatternAnalyzer, LocalTransmitter, SignatureLinkVerifier, SimulatedDiagnostics,
    TracingNotifier, TransmissionReceipt,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Aggregated read-only view for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub connection: ConnectionStatus,
    pub stability: StabilitySnapshot,
    pub sessions: Vec<Session>,
}

/// An outbound message together with its local transmission receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentMessage {
    pub message: Message,
    pub receipt: TransmissionReceipt,
}

/// An inbound response after routing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedResponse {
    pub entity: String,
    pub session_id: String,
    pub message: Message,
}

pub struct DashboardService {
    config: SimulationConfig,
    connection: Arc<RwLock<ConnectionState>>,
    stability: Arc<RwLock<StabilityOscillator>>,
    sessions: Arc<RwLock<SessionRegistry>>,
    dispatcher: MessageDispatcher,
    router: ResponseRouter,
    repair_loop: RepairLoop,
    diagnostics: Arc<dyn DiagnosticSystem>,
    link_verifier: Arc<dyn LinkVerifier>,
    pattern_analyzer: Arc<dyn PatternAnalyzer>,
    /// Resolved once at construction; `None` stores responses verbatim.
    translator: Option<Arc<dyn Translator>>,
    notifier: Arc<dyn Notifier>,
    transmitter: LocalTransmitter,
    clock: Arc<dyn Clock>,
    connection_timer: Mutex<Option<TimerHandle>>,
    stability_timer: Mutex<Option<TimerHandle>>,
}

/// Builder for [`DashboardService`]. Unset collaborators fall back to the
/// in-process simulations from `qcomm-infrastructure`.
pub struct DashboardBuilder {
    config: SimulationConfig,
    seed: Option<u64>,
    diagnostics: Option<Arc<dyn DiagnosticSystem>>,
    link_verifier: Option<Arc<dyn LinkVerifier>>,
    pattern_analyzer: Option<Arc<dyn PatternAnalyzer>>,
    translator: Option<Arc<dyn Translator>>,
    notifier: Option<Arc<dyn Notifier>>,
    transmitter: Option<LocalTransmitter>,
    clock: Option<Arc<dyn Clock>>,
}

impl DashboardBuilder {
    /// Seeds every internal random source, making runs reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSystem>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn link_verifier(mut self, verifier: Arc<dyn LinkVerifier>) -> Self {
        self.link_verifier = Some(verifier);
        self
    }

    pub fn pattern_analyzer(mut self, analyzer: Arc<dyn PatternAnalyzer>) -> Self {
        self.pattern_analyzer = Some(analyzer);
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn transmitter(mut self, transmitter: LocalTransmitter) -> Self {
        self.transmitter = Some(transmitter);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validates the configuration and assembles the service.
    pub fn build(self) -> Result<DashboardService, QCommError> {
        self.config.validate()?;

        // Distinct streams per component so one consumer cannot shift another's draws
        let seed = self.seed;
        let rng = |offset: u64| -> SimRng {
            match seed {
                Some(seed) => seeded_rng(seed.wrapping_add(offset)),
                None => default_rng(),
            }
        };

        let config = self.config;
        let diagnostics = self.diagnostics.unwrap_or_else(|| {
            Arc::new(SimulatedDiagnostics::new(
                &config.repair.relevant_modules,
                rng(3),
            ))
        });
        let link_verifier = self.link_verifier.unwrap_or_else(|| {
            Arc::new(SignatureLinkVerifier::new(config.link_success_rate, rng(4)))
        });

        Ok(DashboardService {
            connection: Arc::new(RwLock::new(ConnectionState::new(&config, rng(1)))),
            stability: Arc::new(RwLock::new(StabilityOscillator::new(
                config.stability.clone(),
                rng(2),
            ))),
            sessions: Arc::new(RwLock::new(SessionRegistry::new())),
            dispatcher: MessageDispatcher::new(config.local_sender.clone()),
            router: ResponseRouter::from_config(&config),
            repair_loop: RepairLoop::new(config.repair.clone()),
            diagnostics,
            link_verifier,
            pattern_analyzer: self
                .pattern_analyzer
                .unwrap_or_else(|| Arc::new(KeywordPatternAnalyzer::default())),
            translator: self.translator,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            transmitter: self.transmitter.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock)),
            connection_timer: Mutex::new(None),
            stability_timer: Mutex::new(None),
            config,
        })
    }
}

impl DashboardService {
    pub fn builder(config: SimulationConfig) -> DashboardBuilder {
        DashboardBuilder {
            config,
            seed: None,
            diagnostics: None,
            link_verifier: None,
            pattern_analyzer: None,
            translator: None,
            notifier: None,
            transmitter: None,
            clock: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Logs and reports a failed operation; state is left as it was.
    fn fail<T>(&self, operation: &str, err: QCommError) -> OperationOutcome<T> {
        tracing::warn!("[DashboardService] {} failed: {}", operation, err);
        self.notifier
            .notify(Notification::error(format!("{} failed", operation), err.to_string()));
        OperationOutcome::from_error(&err)
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Starts the stability timer. Calling it again while running is a no-op.
    pub async fn start(&self) {
        let mut timer = self.stability_timer.lock().await;
        if timer.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let period = Duration::from_millis(self.config.stability.tick_ms);
        let stability = Arc::clone(&self.stability);
        *timer = Some(spawn_periodic(
            "stability",
            self.clock.ticks(TimerKind::Stability, period),
            move || {
                let stability = Arc::clone(&stability);
                async move {
                    stability.write().await.tick();
                    TickControl::Continue
                }
            },
        ));
        tracing::info!("[DashboardService] Stability timer started ({}ms)", period.as_millis());
    }

    /// Cancels both timers.
    pub async fn shutdown(&self) {
        if let Some(timer) = self.connection_timer.lock().await.take() {
            timer.cancel();
        }
        if let Some(timer) = self.stability_timer.lock().await.take() {
            timer.cancel();
        }
        tracing::info!("[DashboardService] Timers cancelled");
    }

    // ============================================================================
    // Connection / resonance
    // ============================================================================

    /// Activates the connection and starts the connection tick if it is not running.
    pub async fn connect(&self, entity: &str) -> OperationOutcome<()> {
        if let Err(e) = self.connection.write().await.connect(entity) {
            return self.fail("Connect", e);
        }

        let mut timer = self.connection_timer.lock().await;
        if !timer.as_ref().is_some_and(|t| !t.is_finished()) {
            let period = Duration::from_millis(self.config.connection.tick_ms);
            let connection = Arc::clone(&self.connection);
            let notifier = Arc::clone(&self.notifier);
            *timer = Some(spawn_periodic(
                "connection",
                self.clock.ticks(TimerKind::Connection, period),
                move || {
                    let connection = Arc::clone(&connection);
                    let notifier = Arc::clone(&notifier);
                    async move {
                        let tick = connection.write().await.tick();
                        match tick {
                            ConnectionTick::Drifting => TickControl::Continue,
                            ConnectionTick::Idle => TickControl::Stop,
                            ConnectionTick::Converged => {
                                notifier.notify(Notification::success(
                                    "Resonance locked",
                                    "All entity links reached full resonance",
                                ));
                                TickControl::Stop
                            }
                        }
                    }
                },
            ));
        }

        self.notifier.notify(Notification::info(
            "Connecting",
            format!("Opening resonance channel to {}", entity),
        ));
        OperationOutcome::ok(())
    }

    /// Deactivates the connection, zeroes strengths and cancels the tick.
    pub async fn disconnect(&self) -> OperationOutcome<()> {
        if let Some(timer) = self.connection_timer.lock().await.take() {
            timer.cancel();
        }
        self.connection.write().await.disconnect();
        self.notifier
            .notify(Notification::info("Disconnected", "Resonance channel closed"));
        OperationOutcome::ok(())
    }

    /// Attempts a probabilistic boost; `value` carries whether it succeeded.
    pub async fn boost(&self, entity: &str) -> OperationOutcome<bool> {
        let result = self.connection.write().await.boost(entity);
        match result {
            Ok(true) => {
                self.notifier.notify(Notification::success(
                    "Boost succeeded",
                    format!("Resonance with {} amplified", entity),
                ));
                OperationOutcome::ok(true)
            }
            Ok(false) => {
                self.notifier.notify(Notification::warning(
                    "Boost failed",
                    format!("{} did not respond to the boost", entity),
                ));
                OperationOutcome::ok(false)
            }
            Err(e) => self.fail("Boost", e),
        }
    }

    pub async fn reading_for(&self, entity: &str) -> Reading {
        self.connection.read().await.reading_for(entity)
    }

    pub async fn boost_attempts(&self, entity: &str) -> u64 {
        self.connection.read().await.attempts(entity)
    }

    /// Runs one connection tick by hand.
    pub async fn tick_connection(&self) -> ConnectionTick {
        self.connection.write().await.tick()
    }

    pub async fn connection_status(&self) -> ConnectionStatus {
        self.connection.read().await.status()
    }

    // ============================================================================
    // Stability
    // ============================================================================

    /// Flips the boost flag; `value` is the new state.
    pub async fn toggle_boost(&self) -> OperationOutcome<bool> {
        let active = self.stability.write().await.toggle_boost();
        let body = if active {
            "Triad stability boost engaged"
        } else {
            "Triad stability boost released"
        };
        self.notifier.notify(Notification::info("Stability boost", body));
        OperationOutcome::ok(active)
    }

    /// Engages emergency stabilization; `value` is `false` when it was already engaged.
    pub async fn activate_emergency(&self) -> OperationOutcome<bool> {
        let engaged = self.stability.write().await.activate_emergency();
        if engaged {
            self.notifier.notify(Notification::warning(
                "Emergency stabilization",
                "Stability forced to the emergency floor",
            ));
        } else {
            tracing::debug!("[DashboardService] Emergency already active");
        }
        OperationOutcome::ok(engaged)
    }

    /// Runs one stability tick by hand.
    pub async fn tick_stability(&self) -> f64 {
        self.stability.write().await.tick()
    }

    pub async fn stability(&self) -> StabilitySnapshot {
        self.stability.read().await.snapshot()
    }

    // ============================================================================
    // Sessions
    // ============================================================================

    /// Returns the session id for `entity`, creating it on first use.
    ///
    /// New sessions start at the entity's current connection strength.
    pub async fn open_session(&self, entity: &str) -> OperationOutcome<String> {
        let strength = self
            .connection
            .read()
            .await
            .strength(entity)
            .unwrap_or(0.0);
        let id = self.sessions.write().await.create_or_get(entity, strength);
        OperationOutcome::ok(id)
    }

    pub async fn verify_link(&self, session_id: &str) -> OperationOutcome<LinkVerification> {
        let result = self
            .sessions
            .write()
            .await
            .verify_link(session_id, self.link_verifier.as_ref())
            .await;
        match result {
            Ok(verification) => {
                if verification.verified {
                    self.notifier
                        .notify(Notification::success("Link verified", verification.signature.clone()));
                } else {
                    self.notifier.notify(Notification::warning(
                        "Link unverified",
                        "The link could not be confirmed",
                    ));
                }
                OperationOutcome::ok(verification)
            }
            Err(e) => self.fail("Link verification", e),
        }
    }

    pub async fn analyze_history(&self, session_id: &str) -> OperationOutcome<PatternAnalysis> {
        let result = self
            .sessions
            .read()
            .await
            .analyze_history(session_id, self.pattern_analyzer.as_ref())
            .await;
        match result {
            Ok(analysis) => OperationOutcome::ok(analysis),
            Err(e) => self.fail("History analysis", e),
        }
    }

    /// Appends an outbound message and transmits it locally.
    pub async fn send_message(
        &self,
        session_id: &str,
        recipient: &str,
        content: &str,
    ) -> OperationOutcome<SentMessage> {
        let result = {
            let mut sessions = self.sessions.write().await;
            self.dispatcher
                .send(&mut sessions, session_id, recipient, content)
        };
        let message = match result {
            Ok(message) => message,
            Err(e) => return self.fail("Send", e),
        };

        let receipt = self.transmitter.transmit(session_id, content).await;
        OperationOutcome::ok(SentMessage { message, receipt })
    }

    /// Routes inbound text to the entity whose markers it carries and stores
    /// it in that entity's session.
    pub async fn receive_response(&self, text: &str) -> OperationOutcome<RoutedResponse> {
        let Some(entity) = self.router.route_or_default(text).map(str::to_string) else {
            return self.fail(
                "Response routing",
                QCommError::not_found("Entity", "unmatched response"),
            );
        };

        let content = match &self.translator {
            Some(translator) => match translator.translate(&entity, text).await {
                Ok(translated) => translated,
                Err(e) => return self.fail("Translation", e),
            },
            None => text.to_string(),
        };

        let strength = self
            .connection
            .read()
            .await
            .strength(&entity)
            .unwrap_or(0.0);
        let result = {
            let mut sessions = self.sessions.write().await;
            let session_id = sessions.create_or_get(&entity, strength);
            sessions
                .receive(&session_id, &entity, self.dispatcher.local_sender(), &content)
                .map(|message| (session_id, message))
        };
        match result {
            Ok((session_id, message)) => OperationOutcome::ok(RoutedResponse {
                entity,
                session_id,
                message,
            }),
            Err(e) => self.fail("Receive", e),
        }
    }

    /// Marks a session read; `value` is the number of messages cleared.
    pub async fn mark_read(&self, session_id: &str) -> OperationOutcome<u32> {
        let result = self.sessions.write().await.mark_read(session_id);
        match result {
            Ok(cleared) => OperationOutcome::ok(cleared),
            Err(e) => self.fail("Mark read", e),
        }
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.sessions.read().await.list()
    }

    pub async fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    // ============================================================================
    // Repair
    // ============================================================================

    /// Runs the bounded repair loop against the diagnostic collaborator.
    ///
    /// On convergence every session is marked verified and its strength is
    /// lifted to at least the current stability. Non-convergence is reported
    /// as a warning with state unchanged; a collaborator failure is a failed
    /// outcome.
    pub async fn repair_links(&self) -> OperationOutcome<RepairReport> {
        let report = self.repair_loop.run(self.diagnostics.as_ref()).await;

        if let Some(reason) = &report.failure {
            return self.fail("Repair", QCommError::generation_failure(reason.clone()));
        }

        if report.converged {
            let stability = self.stability.read().await.stability();
            self.sessions.write().await.update_all(|session| {
                session.link_verified = true;
                session.connection_strength = session.connection_strength.max(stability);
            });
            self.notifier.notify(Notification::success(
                "Links repaired",
                format!("Diagnostics stabilized after {} attempt(s)", report.attempts),
            ));
        } else {
            self.notifier.notify(Notification::warning(
                "Repair incomplete",
                format!(
                    "Diagnostics still unstable after {} attempts",
                    report.attempts
                ),
            ));
        }

        OperationOutcome::ok(report)
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            connection: self.connection_status().await,
            stability: self.stability().await,
            sessions: self.sessions().await,
        }
    }
}
