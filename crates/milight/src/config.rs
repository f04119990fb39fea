//! User configuration
//!
//! Settings live in a TOML file, by default `<config dir>/milight/config.toml`.
//! A missing file means defaults. Only settings are stored here, never the
//! state of the lights.

use anyhow::{Context, Result};
use milight_ambient::{AmbientConfig, AveragingMethod, CaptureRegion, DEFAULT_PERIOD, DEFAULT_STRIDE};
use milight_control::pacing::DEFAULT_DELAY;
use milight_control::receiver::COMMAND_PORT;
use milight_control::Receiver;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub receiver: ReceiverSettings,
    pub ambient: AmbientSettings,
    pub logging: crate::logging::LogConfig,
}

/// Which receiver to talk to and how fast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverSettings {
    /// `ip` or `ip:port`; discovered on the network when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub port: u16,
    pub delay_ms: u64,
    pub auto_delay: bool,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            address: None,
            port: COMMAND_PORT,
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
            auto_delay: true,
        }
    }
}

impl ReceiverSettings {
    /// Build a receiver from `address` (or the configured one), applying the
    /// configured port when the address has none.
    pub fn receiver(&self, address: Option<&str>) -> Result<Option<Receiver>> {
        let Some(text) = address.or(self.address.as_deref()) else {
            return Ok(None);
        };

        let mut receiver =
            Receiver::parse(text).with_context(|| format!("Invalid receiver address '{}'", text))?;
        if text.parse::<SocketAddr>().is_err() {
            receiver.port = self.port;
        }

        Ok(Some(self.apply(receiver)))
    }

    /// Apply the configured pacing to a discovered receiver.
    pub fn apply(&self, receiver: Receiver) -> Receiver {
        receiver
            .with_delay(Duration::from_millis(self.delay_ms))
            .with_auto_delay(self.auto_delay)
    }
}

/// Ambient loop and sampler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientSettings {
    pub group: u8,
    pub period_ms: u64,
    /// Pixel spacing of the sample grid
    pub grid_size: u32,
    pub method: AveragingMethod,
    pub smoothing: bool,
    /// Monitor name; the primary monitor when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
    /// Part of the monitor to sample; the whole monitor when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<CaptureRegion>,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            group: 0,
            period_ms: DEFAULT_PERIOD.as_millis() as u64,
            grid_size: DEFAULT_STRIDE,
            method: AveragingMethod::default(),
            smoothing: true,
            monitor: None,
            region: None,
        }
    }
}

impl AmbientSettings {
    pub fn loop_config(&self) -> AmbientConfig {
        AmbientConfig {
            group: self.group,
            period: Duration::from_millis(self.period_ms),
        }
    }
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("milight");
            p.push("config.toml");
            p
        })
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Write to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file {:?}", path))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
