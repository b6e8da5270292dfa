use crate::domain::allocation::{FanInPolicy, FanOutPolicy};
use crate::error::{Result, TransferError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Batch execution limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum number of transfers in flight at once.
    pub batch_size: usize,
    /// Pause between two consecutive batches.
    pub rate_limit_ms: u64,
    /// Extra delay per position inside a batch.
    pub per_item_delay_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            rate_limit_ms: 100,
            per_item_delay_ms: 0,
        }
    }
}

impl SchedulerConfig {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn per_item_delay(&self) -> Duration {
        Duration::from_millis(self.per_item_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TransferError::InvalidInput(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Network costs, in lamports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub transaction_fee: u64,
    /// Minimum balance a swept account keeps (rent exemption of an empty account).
    pub fan_in_reserve: u64,
    /// A distribution pool at or below this is refused.
    pub fan_out_min_distributable: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            transaction_fee: 5_000,
            fan_in_reserve: 890_880,
            fan_out_min_distributable: 2_000_000,
        }
    }
}

impl FeeSchedule {
    pub fn fan_out_policy(&self) -> FanOutPolicy {
        FanOutPolicy {
            fee: self.transaction_fee,
            min_distributable: self.fan_out_min_distributable,
        }
    }

    pub fn fan_in_policy(&self) -> FanInPolicy {
        FanInPolicy {
            reserve: self.fan_in_reserve,
            fee: self.transaction_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub scheduler: SchedulerConfig,
    pub fees: FeeSchedule,
    pub log_level: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            fees: FeeSchedule::default(),
            log_level: "info".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Reads a JSON config file. Missing fields fall back to defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate()
    }
}
