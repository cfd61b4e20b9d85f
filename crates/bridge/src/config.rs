//! Bridge configuration management

use crate::negotiator::SettleDelays;
use anyhow::{Context, Result, anyhow};
use protocol::{AccessoryIdentity, DEFAULT_VENDOR_ID, parse_vendor_id};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub bridge: BridgeSettings,
    /// Identification strings sent during the handshake
    #[serde(default)]
    pub accessory: AccessoryIdentity,
    #[serde(default)]
    pub timing: TimingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSettings {
    #[serde(default = "BridgeSettings::default_log_level")]
    pub log_level: String,
    /// Target vendor ID, hexadecimal (e.g. "18d1" or "0x18d1")
    #[serde(default = "BridgeSettings::default_vendor_id")]
    pub vendor_id: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            vendor_id: Self::default_vendor_id(),
        }
    }
}

impl BridgeSettings {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_vendor_id() -> String {
        format!("{:#06x}", DEFAULT_VENDOR_ID)
    }
}

/// Delays and timeouts, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Wait after the start-accessory request
    #[serde(default = "TimingSettings::default_settle_ms")]
    pub mode_switch_settle_ms: u64,
    /// Wait after claiming the accessory configuration
    #[serde(default = "TimingSettings::default_settle_ms")]
    pub accessory_settle_ms: u64,
    /// Bound on one bulk read; a timeout just means no key activity
    #[serde(default = "TimingSettings::default_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Bound on each handshake control transfer
    #[serde(default = "TimingSettings::default_timeout_ms")]
    pub control_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            mode_switch_settle_ms: Self::default_settle_ms(),
            accessory_settle_ms: Self::default_settle_ms(),
            read_timeout_ms: Self::default_timeout_ms(),
            control_timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl TimingSettings {
    fn default_settle_ms() -> u64 {
        1000
    }

    fn default_timeout_ms() -> u64 {
        1000
    }
}

impl BridgeConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref())
        } else {
            // Try standard locations in order
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/aoa-keyboard-bridge/bridge.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: BridgeConfig = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("aoa-keyboard-bridge").join("bridge.toml")
        } else {
            PathBuf::from(".config/aoa-keyboard-bridge/bridge.toml")
        }
    }

    /// Configured vendor ID
    pub fn vendor_id(&self) -> Result<u16> {
        Ok(parse_vendor_id(&self.bridge.vendor_id)?)
    }

    pub fn settle_delays(&self) -> SettleDelays {
        SettleDelays {
            mode_switch: Duration::from_millis(self.timing.mode_switch_settle_ms),
            accessory_attach: Duration::from_millis(self.timing.accessory_settle_ms),
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.read_timeout_ms)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.control_timeout_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        Self::validate_log_level(&self.bridge.log_level)?;

        self.vendor_id()
            .with_context(|| format!("Invalid vendor_id '{}'", self.bridge.vendor_id))?;

        self.accessory.validate()?;

        // libusb treats 0 as "wait forever", which would hang shutdown
        if self.timing.read_timeout_ms == 0 {
            return Err(anyhow!("read_timeout_ms must be greater than 0"));
        }
        if self.timing.control_timeout_ms == 0 {
            return Err(anyhow!("control_timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Validate a log level name
    pub fn validate_log_level(level: &str) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}
