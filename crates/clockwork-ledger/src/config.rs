//! Ledger configuration.
//!
//! Provides [`LedgerConfig`] with defaults for the data directory, logging,
//! auction house and lotteries. Values are layered: built-in defaults, then an
//! optional TOML/JSON file, then `CLOCKWORK__*` environment variables
//! (`CLOCKWORK__AUCTION__CUT_BPS=500`).

use std::path::{Path, PathBuf};

use clockwork_auction::AuctionConfig;
use clockwork_core::constants::{
    BPS_PRECISION, DEFAULT_CUT_BPS, GEN0_AUCTION_DURATION, GEN0_CREATION_LIMIT, GEN0_STARTING_PRICE,
    LOTTERY_DURATION, MIN_STAKE,
};
use clockwork_core::types::Identity;
use clockwork_lottery::LotteryConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::label;

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "CLOCKWORK";

/// File name of the ledger state inside the data directory.
pub const STATE_FILE: &str = "state.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("auction cut {0} bps exceeds {BPS_PRECISION}")]
    CutTooHigh(u64),
    #[error("{0} must be positive")]
    ZeroValue(&'static str),
    #[error("{0} must not be a reserved identity")]
    ReservedIdentity(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionSettings {
    pub cut_bps: u64,
    #[serde(deserialize_with = "label::deserialize")]
    pub admin: Identity,
    /// Fee beneficiary and sweeper.
    #[serde(deserialize_with = "label::deserialize")]
    pub cfo: Identity,
    pub gen0_starting_price: u64,
    pub gen0_duration: u64,
    pub gen0_creation_limit: u64,
    pub start_paused: bool,
}

impl Default for AuctionSettings {
    fn default() -> Self {
        Self {
            cut_bps: DEFAULT_CUT_BPS,
            admin: Identity::derive("admin"),
            cfo: Identity::derive("cfo"),
            gen0_starting_price: GEN0_STARTING_PRICE,
            gen0_duration: GEN0_AUCTION_DURATION,
            gen0_creation_limit: GEN0_CREATION_LIMIT,
            start_paused: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotterySettings {
    /// Length of each commit-reveal window.
    pub duration: u64,
    pub min_stake: u64,
    /// Owner of the open lottery.
    #[serde(deserialize_with = "label::deserialize")]
    pub owner: Identity,
}

impl Default for LotterySettings {
    fn default() -> Self {
        Self {
            duration: LOTTERY_DURATION,
            min_stake: MIN_STAKE,
            owner: Identity::derive("owner"),
        }
    }
}

/// Configuration for a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Root directory for the state file.
    pub data_dir: PathBuf,
    /// Log level filter string (e.g. "info", "debug", "clockwork_ledger=trace").
    pub log_level: String,
    pub log_format: LogFormat,
    pub auction: AuctionSettings,
    pub lottery: LotterySettings,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clockwork");

        Self {
            data_dir,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            auction: AuctionSettings::default(),
            lottery: LotterySettings::default(),
        }
    }
}

impl LedgerConfig {
    /// Load defaults, then `path` (if given), then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load), reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let cfg: LedgerConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auction.cut_bps > BPS_PRECISION {
            return Err(ConfigError::CutTooHigh(self.auction.cut_bps));
        }
        if self.auction.gen0_duration == 0 {
            return Err(ConfigError::ZeroValue("auction.gen0_duration"));
        }
        if self.lottery.duration == 0 {
            return Err(ConfigError::ZeroValue("lottery.duration"));
        }
        for (name, id) in [
            ("auction.admin", self.auction.admin),
            ("auction.cfo", self.auction.cfo),
            ("lottery.owner", self.lottery.owner),
        ] {
            if id.is_reserved() {
                return Err(ConfigError::ReservedIdentity(name));
            }
        }
        Ok(())
    }

    /// Path to the JSON ledger state file.
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    pub fn auction_config(&self) -> AuctionConfig {
        let a = &self.auction;
        AuctionConfig {
            cut_bps: a.cut_bps,
            admin: a.admin,
            fee_beneficiary: a.cfo,
            fee_sweepers: vec![a.cfo],
            gen0_starting_price: a.gen0_starting_price,
            gen0_duration: a.gen0_duration,
            gen0_creation_limit: a.gen0_creation_limit,
            start_paused: a.start_paused,
        }
    }

    pub fn lottery_config(&self) -> LotteryConfig {
        LotteryConfig { duration: self.lottery.duration, min_stake: self.lottery.min_stake }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = LedgerConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.auction.cut_bps, DEFAULT_CUT_BPS);
        assert_eq!(cfg.lottery.duration, LOTTERY_DURATION);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn default_data_dir_ends_with_clockwork() {
        let cfg = LedgerConfig::default();
        assert!(cfg.data_dir.ends_with("clockwork"), "data_dir: {:?}", cfg.data_dir);
    }

    #[test]
    fn state_path_appends_file() {
        let cfg = LedgerConfig { data_dir: PathBuf::from("/tmp/cw"), ..LedgerConfig::default() };
        assert_eq!(cfg.state_path(), PathBuf::from("/tmp/cw/state.json"));
    }

    #[test]
    fn load_without_sources_gives_defaults() {
        let cfg = LedgerConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(cfg, LedgerConfig::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clockwork.toml");
        std::fs::write(
            &path,
            r#"
log_format = "json"

[auction]
cut_bps = 500
admin = "root"

[lottery]
duration = 10
"#,
        )
        .unwrap();

        let cfg = LedgerConfig::load_with_env(Some(&path), env(&[])).unwrap();
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.auction.cut_bps, 500);
        assert_eq!(cfg.auction.admin, Identity::derive("root"));
        assert_eq!(cfg.auction.cfo, Identity::derive("cfo"));
        assert_eq!(cfg.lottery.duration, 10);
        assert_eq!(cfg.lottery.min_stake, MIN_STAKE);
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clockwork.toml");
        std::fs::write(&path, "[auction]\ncut_bps = 500\n").unwrap();

        let cfg = LedgerConfig::load_with_env(
            Some(&path),
            env(&[("CLOCKWORK__AUCTION__CUT_BPS", "250"), ("CLOCKWORK__LOG_LEVEL", "debug")]),
        )
        .unwrap();
        assert_eq!(cfg.auction.cut_bps, 250);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LedgerConfig::load_with_env(Some(&dir.path().join("nope.toml")), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn excessive_cut_rejected() {
        let err = LedgerConfig::load_with_env(None, env(&[("CLOCKWORK__AUCTION__CUT_BPS", "10001")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::CutTooHigh(10_001)));
    }

    #[test]
    fn zero_lottery_duration_rejected() {
        let mut cfg = LedgerConfig::default();
        cfg.lottery.duration = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroValue("lottery.duration"))));
    }

    #[test]
    fn escrow_admin_rejected() {
        let mut cfg = LedgerConfig::default();
        cfg.auction.admin = Identity::AUCTION_ESCROW;
        assert!(matches!(cfg.validate(), Err(ConfigError::ReservedIdentity("auction.admin"))));
    }

    #[test]
    fn engine_configs_follow_settings() {
        let cfg = LedgerConfig::default();
        let auction = cfg.auction_config();
        assert_eq!(auction.fee_beneficiary, cfg.auction.cfo);
        assert_eq!(auction.fee_sweepers, vec![cfg.auction.cfo]);
        assert_eq!(cfg.lottery_config(), LotteryConfig::default());
    }
}
