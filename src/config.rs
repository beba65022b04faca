//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed sections. Every
//! section and field is optional; missing values fall back to the standard
//! six-deck, quarter-Kelly setup.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;

use crate::shoe::ranks::{RankTable, MAX_DECKS};
use crate::strategy::bust::BustConfig;
use crate::strategy::edge::AdvantageConfig;
use crate::strategy::kelly::KellyConfig;
use crate::types::ShoeError;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SHOECOUNT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub shoe: ShoeSection,
    pub advantage: AdvantageSection,
    pub bust: BustSection,
    pub betting: BettingSection,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ShoeSection {
    /// Decks in a fresh shoe.
    pub decks: u32,
}

impl Default for ShoeSection {
    fn default() -> Self {
        Self { decks: 6 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdvantageSection {
    /// Player edge off the top of a full shoe, in percent.
    pub base_house_edge: f64,
}

impl Default for AdvantageSection {
    fn default() -> Self {
        Self {
            base_house_edge: RankTable::base_house_edge(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BustSection {
    pub high_sensitivity: f64,
    pub low_sensitivity: f64,
}

impl Default for BustSection {
    fn default() -> Self {
        let d = BustConfig::default();
        Self {
            high_sensitivity: d.high_sensitivity,
            low_sensitivity: d.low_sensitivity,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BettingSection {
    pub bankroll_units: Decimal,
    pub kelly_fraction: f64,
    pub variance: f64,
    pub minimum_units: Decimal,
    pub max_bet_pct: Decimal,
    pub granularity: Decimal,
}

impl Default for BettingSection {
    fn default() -> Self {
        let d = KellyConfig::default();
        Self {
            bankroll_units: dec!(1000),
            kelly_fraction: d.kelly_fraction,
            variance: d.variance,
            minimum_units: d.minimum_units,
            max_bet_pct: d.max_bet_pct,
            granularity: d.granularity,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config file: {path}"))
    }

    /// Parse and validate TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(contents).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$SHOECOUNT_CONFIG`, or `config.toml`. A missing default
    /// file means built-in defaults; a missing explicit path is an error.
    pub fn load_from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(&path),
            Err(_) if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(DEFAULT_CONFIG_PATH)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ShoeError> {
        let invalid = |msg: String| Err(ShoeError::InvalidConfiguration(msg));

        if self.shoe.decks == 0 || self.shoe.decks > MAX_DECKS {
            return invalid(format!(
                "shoe.decks must be between 1 and {MAX_DECKS}, got {}",
                self.shoe.decks
            ));
        }
        let b = &self.betting;
        if b.bankroll_units <= Decimal::ZERO {
            return Err(ShoeError::InvalidBankroll {
                bankroll: b.bankroll_units,
            });
        }
        if !(b.kelly_fraction > 0.0 && b.kelly_fraction <= 1.0) {
            return invalid(format!(
                "betting.kelly_fraction must be in (0, 1], got {}",
                b.kelly_fraction
            ));
        }
        if !(b.variance > 0.0) {
            return invalid(format!("betting.variance must be positive, got {}", b.variance));
        }
        if b.granularity <= Decimal::ZERO {
            return invalid(format!(
                "betting.granularity must be positive, got {}",
                b.granularity
            ));
        }
        if b.minimum_units < Decimal::ZERO {
            return invalid(format!(
                "betting.minimum_units must not be negative, got {}",
                b.minimum_units
            ));
        }
        if b.max_bet_pct <= Decimal::ZERO || b.max_bet_pct > Decimal::ONE {
            return invalid(format!(
                "betting.max_bet_pct must be in (0, 1], got {}",
                b.max_bet_pct
            ));
        }
        let k = &self.bust;
        if !(k.high_sensitivity.is_finite() && k.low_sensitivity.is_finite()) {
            return invalid("bust sensitivities must be finite".to_string());
        }
        if !self.advantage.base_house_edge.is_finite() {
            return invalid("advantage.base_house_edge must be finite".to_string());
        }
        Ok(())
    }

    pub fn advantage_config(&self) -> AdvantageConfig {
        AdvantageConfig {
            base_house_edge: self.advantage.base_house_edge,
        }
    }

    pub fn bust_config(&self) -> BustConfig {
        BustConfig {
            high_sensitivity: self.bust.high_sensitivity,
            low_sensitivity: self.bust.low_sensitivity,
        }
    }

    pub fn kelly_config(&self) -> KellyConfig {
        KellyConfig {
            kelly_fraction: self.betting.kelly_fraction,
            variance: self.betting.variance,
            minimum_units: self.betting.minimum_units,
            max_bet_pct: self.betting.max_bet_pct,
            granularity: self.betting.granularity,
        }
    }
}
