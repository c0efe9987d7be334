//! Liquidator configuration.
//!
//! The configuration names the pool's custody identity, the two assets it
//! converts between, the registry attributes that gate validators and
//! beneficiaries, and the settlement policy knobs.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::utils::constants::*;
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// LIQUIDATOR CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Liquidator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidatorConfig {
    /// Address holding the pool's staked collateral; the sender wallet of every order
    pub custody: Address,
    /// Asset staked in the pool and paid out on liquidation
    pub stake_token: Address,
    /// Asset received from the swap and forwarded to beneficiaries
    pub reward_token: Address,
    /// Registry attribute marking approved validators
    #[serde(default = "default_validator_attribute")]
    pub validator_attribute: String,
    /// Registry attribute marking approved beneficiaries
    #[serde(default = "default_beneficiary_attribute")]
    pub beneficiary_attribute: String,
    /// Whether reclaim re-checks order expiry at settlement time
    #[serde(default = "default_true")]
    pub recheck_expiry_on_reclaim: bool,
    /// Maximum events kept in memory
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

impl LiquidatorConfig {
    /// Create a configuration with default policy for the given identities
    pub fn new(custody: Address, stake_token: Address, reward_token: Address) -> Self {
        Self {
            custody,
            stake_token,
            reward_token,
            validator_attribute: default_validator_attribute(),
            beneficiary_attribute: default_beneficiary_attribute(),
            recheck_expiry_on_reclaim: true,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }

    /// Set the expiry re-check policy
    pub fn with_expiry_recheck(mut self, recheck: bool) -> Self {
        self.recheck_expiry_on_reclaim = recheck;
        self
    }

    /// Set the event history bound
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Overlay `LIQUIDATOR_*` environment variables on top of this configuration
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = std::env::var("LIQUIDATOR_CUSTODY") {
            self.custody = parse_address("LIQUIDATOR_CUSTODY", &v)?;
        }

        if let Ok(v) = std::env::var("LIQUIDATOR_STAKE_TOKEN") {
            self.stake_token = parse_address("LIQUIDATOR_STAKE_TOKEN", &v)?;
        }

        if let Ok(v) = std::env::var("LIQUIDATOR_REWARD_TOKEN") {
            self.reward_token = parse_address("LIQUIDATOR_REWARD_TOKEN", &v)?;
        }

        if let Ok(v) = std::env::var("LIQUIDATOR_RECHECK_EXPIRY") {
            self.recheck_expiry_on_reclaim = v
                .parse()
                .map_err(|_| ConfigError::Parse(format!("LIQUIDATOR_RECHECK_EXPIRY: {}", v)))?;
        }

        if let Ok(v) = std::env::var("LIQUIDATOR_MAX_EVENTS") {
            self.max_events = v
                .parse()
                .map_err(|_| ConfigError::Parse(format!("LIQUIDATOR_MAX_EVENTS: {}", v)))?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.custody.is_zero() {
            return Err(ConfigError::Validation("custody address cannot be zero".into()));
        }

        if self.stake_token.is_zero() || self.reward_token.is_zero() {
            return Err(ConfigError::Validation("token addresses cannot be zero".into()));
        }

        if self.stake_token == self.reward_token {
            return Err(ConfigError::Validation(
                "stake and reward tokens must differ".into(),
            ));
        }

        if self.validator_attribute.is_empty() || self.beneficiary_attribute.is_empty() {
            return Err(ConfigError::Validation("attribute names cannot be empty".into()));
        }

        if self.max_events == 0 {
            return Err(ConfigError::Validation("max_events must be greater than 0".into()));
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

fn default_validator_attribute() -> String {
    IS_VALIDATOR_ATTRIBUTE.to_string()
}

fn default_beneficiary_attribute() -> String {
    APPROVED_BENEFICIARY_ATTRIBUTE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

fn parse_address(var: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_hex(value).map_err(|e| ConfigError::Parse(format!("{}: {}", var, e)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
