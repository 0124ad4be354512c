/**
* filename : config
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::TradingError;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const FUTURES_TESTNET_URL: &str = "https://testnet.binancefuture.com";
pub const SPOT_TESTNET_URL: &str = "https://testnet.binance.vision";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
}

/// Market family the orders are routed to
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    /// USDT-M futures (`/fapi`)
    #[default]
    Futures,
    /// Spot (`/api`)
    Spot,
}

impl Venue {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Venue::Futures => FUTURES_TESTNET_URL,
            Venue::Spot => SPOT_TESTNET_URL,
        }
    }
}

impl FromStr for Venue {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "futures" | "fapi" => Ok(Venue::Futures),
            "spot" | "api" => Ok(Venue::Spot),
            other => Err(TradingError::ConfigError(format!("unknown venue: {}", other))),
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Futures => f.write_str("futures"),
            Venue::Spot => f.write_str("spot"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExchangeConfig {
    pub venue: Venue,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Falls back to the venue's testnet URL when unset
    pub base_url: Option<String>,
    pub recv_window_ms: u64,
    pub timeout_ms: u64,
    /// Echo orders locally instead of sending them
    pub dry_run: bool,
}

impl ExchangeConfig {
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.venue.default_base_url().to_string(),
        }
    }

    /// Key and secret, both required for signed endpoints
    pub fn credentials(&self) -> Result<(String, String), TradingError> {
        let key = self.api_key.clone().filter(|k| !k.is_empty());
        let secret = self.api_secret.clone().filter(|s| !s.is_empty());
        match (key, secret) {
            (Some(k), Some(s)) => Ok((k, s)),
            (None, _) => Err(TradingError::ConfigError("missing API key (BINANCE_API_KEY or --api-key)".to_string())),
            (_, None) => Err(TradingError::ConfigError("missing API secret (BINANCE_API_SECRET or --api-secret)".to_string())),
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            venue: Venue::Futures,
            api_key: None,
            api_secret: None,
            base_url: None,
            recv_window_ms: 5000,
            timeout_ms: 10_000,
            dry_run: false,
        }
    }
}

/// What the TWAP loop does after a step fails
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepFailurePolicy {
    /// Record the failure and keep going
    #[default]
    Continue,
    /// Stop the run after the first failed step
    Abort,
}

impl FromStr for StepFailurePolicy {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(StepFailurePolicy::Continue),
            "abort" => Ok(StepFailurePolicy::Abort),
            other => Err(TradingError::ConfigError(format!("unknown step failure policy: {}", other))),
        }
    }
}

/// How the piece that does not divide evenly is handled
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Every piece is `total / parts`; the submitted sum may drift from the total
    #[default]
    None,
    /// Final piece absorbs the difference so the sum equals the total
    LastPiece,
}

impl FromStr for RemainderPolicy {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(RemainderPolicy::None),
            "last_piece" | "last" => Ok(RemainderPolicy::LastPiece),
            other => Err(TradingError::ConfigError(format!("unknown remainder policy: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Floor quantity/price to the symbol's lot step and tick before submitting
    pub round_to_instrument_increments: bool,
    pub on_step_failure: StepFailurePolicy,
    pub remainder: RemainderPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Append-only audit log of every order attempt
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file_path: Some("bot.log".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self, TradingError> {
        let mut cfg = if config_path.exists() {
            let mut file = File::open(config_path)
                .map_err(|e| TradingError::ConfigError(format!("Failed to open config file: {}", e)))?;

            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .map_err(|e| TradingError::ConfigError(format!("Failed to read config file: {}", e)))?;

            serde_json::from_str::<Config>(&contents)
                .map_err(|e| TradingError::ConfigError(format!("Failed to parse config file: {}", e)))?
        } else {
            Config::default()
        };

        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Apply environment variable overrides for sensitive/runtime fields
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = var("BINANCE_API_KEY") { self.exchange.api_key = Some(v); }
        if let Some(v) = var("BINANCE_API_SECRET") { self.exchange.api_secret = Some(v); }
        if let Some(v) = var("BASE_URL") { self.exchange.base_url = Some(v); }
        if let Some(v) = var("BOT_LOGFILE") { self.logging.file_path = Some(v); }
        if let Some(v) = var("BOT_VENUE") {
            match v.parse::<Venue>() {
                Ok(venue) => self.exchange.venue = venue,
                Err(e) => log::warn!("ignoring BOT_VENUE: {}", e),
            }
        }
        if let Some(v) = var("BOT_DRY_RUN") {
            let lower = v.to_lowercase();
            if ["1", "true", "yes"].contains(&lower.as_str()) { self.exchange.dry_run = true; }
            if ["0", "false", "no"].contains(&lower.as_str()) { self.exchange.dry_run = false; }
        }
    }
}
