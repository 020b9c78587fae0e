// Application state management

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::system::BettingSystem;

pub type SharedState = Arc<Mutex<AppState>>;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct AppState {
    pub system: BettingSystem,
    pub config: Config,
}

impl AppState {
    /// Restore the persisted snapshot, or start a fresh ledger when none exists.
    ///
    /// An unreadable snapshot is an error and stays on disk as it is.
    pub fn new(config: Config) -> Result<Self, PersistError> {
        info!("🚀 Initializing betting ledger...");

        let system = match Self::load_from_disk(&config.state_file)? {
            Some(system) => {
                info!(
                    "✅ Loaded persisted state from {} ({} projects, {} tickets)",
                    config.state_file.display(),
                    system.get_project_count(),
                    system.ticket_count()
                );
                for key in config_drift(&system, &config) {
                    warn!("⚠️  {} in config differs from the snapshot, keeping the snapshot value", key);
                }
                system
            }
            None => {
                info!("ℹ️  No persisted state found, starting fresh");
                BettingSystem::from_config(&config)
            }
        };

        Ok(Self { system, config })
    }

    /// Fresh state that never touches the disk
    pub fn in_memory(system: BettingSystem, config: Config) -> Self {
        Self { system, config }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn save_to_disk(&self) -> Result<(), PersistError> {
        let path = &self.config.state_file;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.system)?;
        fs::write(path, json)?;

        info!("💾 State saved to {}", path.display());
        Ok(())
    }

    fn load_from_disk(path: &Path) -> Result<Option<BettingSystem>, PersistError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}

/// Config keys whose value disagrees with a restored snapshot
fn config_drift(system: &BettingSystem, config: &Config) -> Vec<&'static str> {
    let mut drift = Vec::new();
    if system.manager() != config.manager_address {
        drift.push("MANAGER_ADDRESS");
    }
    if system.airdrop_amount() != config.airdrop_amount {
        drift.push("AIRDROP_AMOUNT");
    }
    if system.name() != config.token_name {
        drift.push("TOKEN_NAME");
    }
    if system.symbol() != config.token_symbol {
        drift.push("TOKEN_SYMBOL");
    }
    drift
}
