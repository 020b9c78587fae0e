// Runtime configuration, read from the environment (and `.env` if present)

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::system::{SYSTEM_CONTRACT, TICKET_CONTRACT};
use crate::{contract_address, Amount};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:1234";
pub const DEFAULT_MANAGER: &str = "MANAGER";
pub const DEFAULT_AIRDROP_AMOUNT: Amount = 10_000;
pub const DEFAULT_TOKEN_NAME: &str = "BettingToken";
pub const DEFAULT_TOKEN_SYMBOL: &str = "BT";
pub const DEFAULT_STATE_FILE: &str = "data/state.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub manager_address: String,
    pub airdrop_amount: Amount,
    pub token_name: String,
    pub token_symbol: String,
    pub state_file: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 1234)),
            manager_address: DEFAULT_MANAGER.to_string(),
            airdrop_amount: DEFAULT_AIRDROP_AMOUNT,
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            token_symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `.env`, then read each setting with its default
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_raw = get("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue { key: "BIND_ADDR", value: bind_raw.clone() })?;

        let airdrop_raw = get("AIRDROP_AMOUNT", &DEFAULT_AIRDROP_AMOUNT.to_string());
        let airdrop_amount = airdrop_raw
            .parse::<Amount>()
            .map_err(|_| ConfigError::InvalidValue { key: "AIRDROP_AMOUNT", value: airdrop_raw.clone() })?;

        let manager_address = get("MANAGER_ADDRESS", DEFAULT_MANAGER);
        let reserved = [contract_address(SYSTEM_CONTRACT), contract_address(TICKET_CONTRACT)];
        if manager_address.trim().is_empty() || reserved.contains(&manager_address) {
            return Err(ConfigError::InvalidValue { key: "MANAGER_ADDRESS", value: manager_address });
        }

        Ok(Self {
            bind_addr,
            manager_address,
            airdrop_amount,
            token_name: get("TOKEN_NAME", DEFAULT_TOKEN_NAME),
            token_symbol: get("TOKEN_SYMBOL", DEFAULT_TOKEN_SYMBOL),
            state_file: PathBuf::from(get("STATE_FILE", DEFAULT_STATE_FILE)),
            log_level: get("LOG_LEVEL", "info"),
        })
    }
}
