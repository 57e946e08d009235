//! Relay configuration parsing and validation.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::mode::{FeedAddress, TenancyMode};
use crate::{AppError, Result};

fn default_listen_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_lines() -> u32 {
    15
}

/// Dashboard polling behaviour rendered into the page script.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DashboardConfig {
    /// Delay between consecutive feed polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Line count after which the output area is cleared.
    #[serde(default = "default_max_lines")]
    pub max_lines: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_lines: default_max_lines(),
        }
    }
}

/// Process configuration, optionally read from a TOML file and then
/// overridden from the command line.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RelayConfig {
    /// `host:port` the HTTP listener binds to, e.g. `127.0.0.1:8080`,
    /// `localhost:8080` or `:8080`.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Single- or multi-tenant behaviour.
    #[serde(default)]
    pub mode: TenancyMode,
    /// Explicit dashboard addressing profile; mode-dependent when unset.
    #[serde(default)]
    pub feed_address: Option<FeedAddress>,
    /// Dashboard script settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            mode: TenancyMode::default(),
            feed_address: None,
            dashboard: DashboardConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read, contains
    /// invalid TOML, or fails validation.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolved dashboard addressing profile.
    #[must_use]
    pub fn feed_address(&self) -> FeedAddress {
        self.feed_address
            .unwrap_or_else(|| self.mode.default_feed_address())
    }

    /// Address string handed to the listener, in `host:port` form.
    ///
    /// The host may be a name (`localhost:8080`), an IP literal, a bracketed
    /// IPv6 literal (`[::1]:8080`), or empty (`:8080`), which means every
    /// IPv4 interface. Names are resolved at bind time, not here.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `listen_addr` has no port, the port is
    /// not a `u16`, or an IPv6 host is not bracketed.
    pub fn bind_addr(&self) -> Result<String> {
        let invalid = |why: &str| {
            AppError::Config(format!("listen_addr '{}' invalid: {why}", self.listen_addr))
        };

        let (host, port) = self
            .listen_addr
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected host:port"))?;
        let port: u16 = port
            .parse()
            .map_err(|err| invalid(&format!("bad port '{port}': {err}")))?;
        if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
            return Err(invalid("ipv6 host must be bracketed"));
        }

        let host = if host.is_empty() { "0.0.0.0" } else { host };
        Ok(format!("{host}:{port}"))
    }

    /// Check cross-field constraints after parsing or CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.dashboard.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "dashboard.poll_interval_ms must be greater than zero".into(),
            ));
        }

        if self.dashboard.max_lines == 0 {
            return Err(AppError::Config(
                "dashboard.max_lines must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
