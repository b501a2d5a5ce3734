//! Configuration management for loalias

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{AliasError, AliasResult};

/// Environment variable consulted when no `--config` is given
pub const CONFIG_ENV: &str = "LOALIAS_CONFIG";

/// Main loalias configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasConfig {
    /// Device the aliases live on
    #[serde(default = "default_device")]
    pub device: String,
    /// How commands get elevated
    #[serde(default)]
    pub elevation: ElevationSettings,
    /// External tool names or paths
    #[serde(default)]
    pub tools: ToolPaths,
    /// Reachability probe bounds
    #[serde(default)]
    pub probe: ProbeSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMode {
    /// Always go through the helper
    Sudo,
    /// Go through the helper unless already running as root
    Auto,
    /// Run the shell line directly
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationSettings {
    #[serde(default = "default_elevation_mode")]
    pub mode: ElevationMode,
    /// Elevation helper binary
    #[serde(default = "default_helper")]
    pub helper: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPaths {
    #[serde(default = "default_ip")]
    pub ip: String,
    #[serde(default = "default_ping")]
    pub ping: String,
    /// Shell used to run the quoted command line
    #[serde(default = "default_shell")]
    pub shell: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Echo requests sent per probe
    #[serde(default = "default_probe_count")]
    pub count: u32,
    /// Deadline for the whole probe (seconds)
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u32,
}

fn default_device() -> String {
    "lo".to_string()
}

fn default_elevation_mode() -> ElevationMode {
    ElevationMode::Sudo
}

fn default_helper() -> String {
    "sudo".to_string()
}

fn default_ip() -> String {
    "ip".to_string()
}

fn default_ping() -> String {
    "ping".to_string()
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_probe_count() -> u32 {
    1
}

fn default_probe_timeout() -> u32 {
    1
}

impl Default for ElevationSettings {
    fn default() -> Self {
        Self {
            mode: default_elevation_mode(),
            helper: default_helper(),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            ping: default_ping(),
            shell: default_shell(),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            count: default_probe_count(),
            timeout_secs: default_probe_timeout(),
        }
    }
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            elevation: ElevationSettings::default(),
            tools: ToolPaths::default(),
            probe: ProbeSettings::default(),
        }
    }
}

impl AliasConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> AliasResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AliasError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AliasError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AliasResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AliasError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| AliasError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Resolve the configuration: explicit path first, then `LOALIAS_CONFIG`, then defaults
    pub fn resolve(explicit: Option<&Path>) -> AliasResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Reject settings that cannot produce a runnable command line
    pub fn validate(&self) -> AliasResult<()> {
        let required = [
            ("device", &self.device),
            ("elevation.helper", &self.elevation.helper),
            ("tools.ip", &self.tools.ip),
            ("tools.ping", &self.tools.ping),
            ("tools.shell", &self.tools.shell),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(AliasError::ConfigError(format!("'{}' cannot be empty", key)));
            }
        }

        if self.probe.count == 0 {
            return Err(AliasError::ConfigError("'probe.count' must be at least 1".to_string()));
        }
        if self.probe.timeout_secs == 0 {
            return Err(AliasError::ConfigError(
                "'probe.timeout_secs' must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
