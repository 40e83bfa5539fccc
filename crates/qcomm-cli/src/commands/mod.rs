pub mod chat;
pub mod config;
pub mod output;
pub mod repair;
pub mod simulate;

use anyhow::Result;
use qcomm_application::{DashboardService, ManualClock};
use qcomm_core::config::SimulationConfig;
use qcomm_infrastructure::ConfigService;
use std::path::PathBuf;
use std::sync::Arc;

/// Options shared by every command.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub json: bool,
}

impl Context {
    pub fn load_config(&self) -> Result<SimulationConfig> {
        let service = match &self.config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };
        Ok(service.get_config()?)
    }

    /// Builds a dashboard whose timers only advance when the command ticks them.
    pub fn dashboard(&self) -> Result<DashboardService> {
        let mut builder =
            DashboardService::builder(self.load_config()?).clock(Arc::new(ManualClock::new()));
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        Ok(builder.build()?)
    }
}
