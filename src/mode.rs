//! Tenancy mode and dashboard addressing profile.
//!
//! Both enums double as `clap` value enums (`--mode`, `--feed-address`)
//! and as TOML values in the configuration file.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Identifier used for every entry when running single-tenant.
pub const FIXED_IDENTIFIER: &str = "oasis";

/// How the relay maps frames and polls onto identifiers.
///
/// Defaults to [`TenancyMode::Multi`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenancyMode {
    /// One implicit identifier; frames are raw text.
    Single,
    /// Caller-supplied identifier per frame and per poll.
    #[default]
    Multi,
}

impl TenancyMode {
    /// Dashboard addressing profile used when none is configured.
    #[must_use]
    pub fn default_feed_address(self) -> FeedAddress {
        match self {
            Self::Single => FeedAddress::Fixed,
            Self::Multi => FeedAddress::PerRequest,
        }
    }
}

/// Where the dashboard script sends its feed polls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedAddress {
    /// Baked in from the configured listen address at startup.
    Fixed,
    /// Taken from the `Host` header of each dashboard request.
    PerRequest,
}
