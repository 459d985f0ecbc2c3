use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;

use crate::address_codec::decode_bech32;
use crate::gas::GasConfig;
use crate::packet::{validate_channel_id, validate_port_id};
use crate::types::validate_denom;

/// Configuration shared by the precompiles
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrecompileConfig {
    /// Bech32 prefix of local ledger accounts
    #[serde(default = "default_bech32_prefix")]
    pub bech32_prefix: String,
    /// Lifetime of allowances created through ERC-20 `approve`
    #[serde(default = "default_approval_expiration_secs")]
    pub approval_expiration_secs: u64,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub outpost: OutpostConfig,
    #[serde(default)]
    pub stride: StrideConfig,
}

/// Upper bound on allowance lifetimes, keeps grant expiries representable
pub const MAX_APPROVAL_EXPIRATION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Osmosis outpost configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutpostConfig {
    #[serde(default = "default_port_id")]
    pub port_id: String,
    /// Channel to Osmosis on the local chain
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
    /// Packet timeout, in blocks past the current height
    #[serde(default = "default_timeout_blocks")]
    pub timeout_blocks: u64,
    /// Cross-chain swap contract on Osmosis
    #[serde(default = "default_xcs_contract")]
    pub xcs_contract: String,
    #[serde(default = "default_slippage_percentage")]
    pub slippage_percentage: u8,
    /// TWAP window used for the slippage check
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

/// Stride outpost configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StrideConfig {
    #[serde(default = "default_port_id")]
    pub port_id: String,
    /// Channel to Stride on the local chain
    #[serde(default = "default_stride_channel_id")]
    pub channel_id: String,
    #[serde(default = "default_timeout_blocks")]
    pub timeout_blocks: u64,
    /// The only denomination Stride liquid-stakes for this chain
    #[serde(default = "default_bond_denom")]
    pub bond_denom: String,
}

/// Default functions
fn default_bech32_prefix() -> String {
    "evmos".to_string()
}

fn default_approval_expiration_secs() -> u64 {
    // one year
    365 * 24 * 60 * 60
}

fn default_port_id() -> String {
    "transfer".to_string()
}

fn default_channel_id() -> String {
    "channel-0".to_string()
}

fn default_timeout_blocks() -> u64 {
    100
}

fn default_xcs_contract() -> String {
    "osmo18rj46qcpr57m3qncrj9cuzm0gn3km08w5jxxlnw002c9y7xex5xsu74ytz".to_string()
}

fn default_stride_channel_id() -> String {
    "channel-25".to_string()
}

fn default_bond_denom() -> String {
    "aevmos".to_string()
}

fn default_slippage_percentage() -> u8 {
    10
}

fn default_window_seconds() -> u64 {
    30
}

impl Default for PrecompileConfig {
    fn default() -> Self {
        Self {
            bech32_prefix: default_bech32_prefix(),
            approval_expiration_secs: default_approval_expiration_secs(),
            gas: GasConfig::default(),
            outpost: OutpostConfig::default(),
            stride: StrideConfig::default(),
        }
    }
}

impl Default for OutpostConfig {
    fn default() -> Self {
        Self {
            port_id: default_port_id(),
            channel_id: default_channel_id(),
            timeout_blocks: default_timeout_blocks(),
            xcs_contract: default_xcs_contract(),
            slippage_percentage: default_slippage_percentage(),
            window_seconds: default_window_seconds(),
        }
    }
}

impl Default for StrideConfig {
    fn default() -> Self {
        Self {
            port_id: default_port_id(),
            channel_id: default_stride_channel_id(),
            timeout_blocks: default_timeout_blocks(),
            bond_denom: default_bond_denom(),
        }
    }
}

/// Read `key` from the environment, falling back to `default` when unset.
/// A value that is set but does not parse is an error.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v
            .parse()
            .wrap_err_with(|| format!("{} has an invalid value: {:?}", key, v)),
        Err(_) => Ok(default),
    }
}

impl PrecompileConfig {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env").or_else(|_| Self::load_from_env())
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::load_from_env()
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    fn load_from_env() -> Result<Self> {
        let outpost = OutpostConfig {
            port_id: env::var("OUTPOST_PORT_ID").unwrap_or_else(|_| default_port_id()),
            channel_id: env::var("OUTPOST_CHANNEL_ID").unwrap_or_else(|_| default_channel_id()),
            timeout_blocks: env_or("OUTPOST_TIMEOUT_BLOCKS", default_timeout_blocks())?,
            xcs_contract: env::var("OUTPOST_XCS_CONTRACT")
                .unwrap_or_else(|_| default_xcs_contract()),
            slippage_percentage: env_or(
                "OUTPOST_SLIPPAGE_PERCENTAGE",
                default_slippage_percentage(),
            )?,
            window_seconds: env_or("OUTPOST_WINDOW_SECONDS", default_window_seconds())?,
        };

        let stride = StrideConfig {
            port_id: env::var("STRIDE_PORT_ID").unwrap_or_else(|_| default_port_id()),
            channel_id: env::var("STRIDE_CHANNEL_ID")
                .unwrap_or_else(|_| default_stride_channel_id()),
            timeout_blocks: env_or("STRIDE_TIMEOUT_BLOCKS", default_timeout_blocks())?,
            bond_denom: env::var("STRIDE_BOND_DENOM").unwrap_or_else(|_| default_bond_denom()),
        };

        let config = PrecompileConfig {
            bech32_prefix: env::var("PRECOMPILE_BECH32_PREFIX")
                .unwrap_or_else(|_| default_bech32_prefix()),
            approval_expiration_secs: env_or(
                "PRECOMPILE_APPROVAL_EXPIRATION_SECS",
                default_approval_expiration_secs(),
            )?,
            gas: GasConfig::default(),
            outpost,
            stride,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bech32_prefix.is_empty()
            || !self
                .bech32_prefix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(eyre!(
                "bech32_prefix must be non-empty lowercase alphanumeric, got {:?}",
                self.bech32_prefix
            ));
        }

        if self.approval_expiration_secs == 0
            || self.approval_expiration_secs > MAX_APPROVAL_EXPIRATION_SECS
        {
            return Err(eyre!(
                "approval_expiration_secs must be between 1 and {}, got {}",
                MAX_APPROVAL_EXPIRATION_SECS,
                self.approval_expiration_secs
            ));
        }

        validate_port_id(&self.outpost.port_id).map_err(|e| eyre!("outpost.port_id: {}", e))?;
        validate_channel_id(&self.outpost.channel_id)
            .map_err(|e| eyre!("outpost.channel_id: {}", e))?;

        if self.outpost.timeout_blocks == 0 {
            return Err(eyre!("outpost.timeout_blocks must be greater than 0"));
        }

        decode_bech32(&self.outpost.xcs_contract)
            .map_err(|e| eyre!("outpost.xcs_contract is not a bech32 address: {}", e))?;

        if self.outpost.slippage_percentage == 0 || self.outpost.slippage_percentage > 100 {
            return Err(eyre!(
                "outpost.slippage_percentage must be between 1 and 100"
            ));
        }

        if self.outpost.window_seconds == 0 {
            return Err(eyre!("outpost.window_seconds must be greater than 0"));
        }

        validate_port_id(&self.stride.port_id).map_err(|e| eyre!("stride.port_id: {}", e))?;
        validate_channel_id(&self.stride.channel_id)
            .map_err(|e| eyre!("stride.channel_id: {}", e))?;
        if self.stride.timeout_blocks == 0 {
            return Err(eyre!("stride.timeout_blocks must be greater than 0"));
        }
        validate_denom(&self.stride.bond_denom).map_err(|e| eyre!("stride.bond_denom: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_KEYS: &[&str] = &[
        "PRECOMPILE_BECH32_PREFIX",
        "PRECOMPILE_APPROVAL_EXPIRATION_SECS",
        "OUTPOST_PORT_ID",
        "OUTPOST_CHANNEL_ID",
        "OUTPOST_TIMEOUT_BLOCKS",
        "OUTPOST_XCS_CONTRACT",
        "OUTPOST_SLIPPAGE_PERCENTAGE",
        "OUTPOST_WINDOW_SECONDS",
        "STRIDE_PORT_ID",
        "STRIDE_CHANNEL_ID",
        "STRIDE_TIMEOUT_BLOCKS",
        "STRIDE_BOND_DENOM",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_approval_expiration() {
        assert_eq!(default_approval_expiration_secs(), 31_536_000);
    }

    #[test]
    fn test_default_timeout_blocks() {
        assert_eq!(default_timeout_blocks(), 100);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(PrecompileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: PrecompileConfig =
            serde_json::from_str(r#"{"outpost":{"channel_id":"channel-215"}}"#).unwrap();
        assert_eq!(config.bech32_prefix, "evmos");
        assert_eq!(config.outpost.channel_id, "channel-215");
        assert_eq!(config.outpost.port_id, "transfer");
        assert_eq!(config.gas, GasConfig::default());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = PrecompileConfig::default();
        config.bech32_prefix = "Evmos".to_string();
        assert!(config.validate().is_err());

        let mut config = PrecompileConfig::default();
        config.outpost.channel_id = "ch".to_string();
        assert!(config.validate().is_err());

        let mut config = PrecompileConfig::default();
        config.outpost.xcs_contract = "osmo1invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = PrecompileConfig::default();
        config.outpost.slippage_percentage = 101;
        assert!(config.validate().is_err());

        let mut config = PrecompileConfig::default();
        config.stride.bond_denom = "1x".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_approval_expiration_bounds() {
        let mut config = PrecompileConfig::default();
        config.approval_expiration_secs = MAX_APPROVAL_EXPIRATION_SECS;
        assert!(config.validate().is_ok());

        config.approval_expiration_secs = MAX_APPROVAL_EXPIRATION_SECS + 1;
        assert!(config.validate().is_err());

        config.approval_expiration_secs = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        clear_env();
        env::set_var("PRECOMPILE_BECH32_PREFIX", "osmo");
        env::set_var("OUTPOST_TIMEOUT_BLOCKS", "250");
        env::set_var("STRIDE_CHANNEL_ID", "channel-326");

        let config = PrecompileConfig::load_from_file("/nonexistent/.env").unwrap();
        assert_eq!(config.bech32_prefix, "osmo");
        assert_eq!(config.outpost.timeout_blocks, 250);
        assert_eq!(config.outpost.channel_id, "channel-0");
        assert_eq!(config.stride.channel_id, "channel-326");
        assert_eq!(config.stride.bond_denom, "aevmos");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_rejects_bad_number() {
        clear_env();
        env::set_var("OUTPOST_TIMEOUT_BLOCKS", "soon");
        assert!(PrecompileConfig::load_from_file("/nonexistent/.env").is_err());

        clear_env();
        env::set_var("OUTPOST_SLIPPAGE_PERCENTAGE", "ten");
        assert!(PrecompileConfig::load_from_file("/nonexistent/.env").is_err());

        clear_env();
        env::set_var("OUTPOST_WINDOW_SECONDS", "-1");
        assert!(PrecompileConfig::load_from_file("/nonexistent/.env").is_err());

        clear_env();
    }
}
