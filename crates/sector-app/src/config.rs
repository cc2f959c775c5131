//! Application configuration.
//!
//! Loaded from a TOML file. Every key is optional; an empty file yields the
//! restricted profile with the built-in allow-list.
//!
//! ```toml
//! profile = "restricted"
//! clock = "utc"
//! relays = ["relay.lan:8765"]
//!
//! [allow_list]
//! room = "5678"
//!
//! [[allow_list.users]]
//! username = "rasya"
//! key = "123"
//! accent = "cyan"
//! ```

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};
use sector_core::{AccentMap, AllowList, ChatProfile, Gate};
use sector_sync::RelayAddr;
use thiserror::Error;

use crate::{App, ClockZone};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML of the expected shape.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but cannot be used.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Room flavour.
    #[serde(default)]
    pub profile: ChatProfile,

    /// Zone for transcript clocks.
    #[serde(default)]
    pub clock: ClockZone,

    /// Restricted room and its identities. Built-in list if absent.
    #[serde(default)]
    pub allow_list: Option<AllowList>,

    /// Relays to replicate through. Empty keeps namespaces in this process.
    #[serde(default)]
    pub relays: Vec<String>,
}

impl AppConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_toml(&text)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for relay in &self.relays {
            RelayAddr::parse(relay)
                .map_err(|e| ConfigError::Invalid { reason: e.to_string() })?;
        }

        let Some(allow_list) = &self.allow_list else {
            return Ok(());
        };

        if allow_list.room.trim().is_empty() {
            return Err(ConfigError::Invalid { reason: "allow_list.room is empty".into() });
        }

        let mut seen = HashSet::new();
        for user in &allow_list.users {
            if user.username.trim().is_empty() || user.key.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    reason: "allow_list.users entries need a username and a key".into(),
                });
            }
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::Invalid {
                    reason: format!("duplicate allow-list user '{}'", user.username),
                });
            }
        }
        Ok(())
    }

    /// Configured allow-list, or the built-in one.
    pub fn allow_list(&self) -> AllowList {
        self.allow_list.clone().unwrap_or_else(AllowList::builtin)
    }

    /// Gate for the configured profile.
    pub fn gate(&self) -> Gate {
        match self.profile {
            ChatProfile::Restricted => Gate::restricted(self.allow_list()),
            ChatProfile::Sector => Gate::sector(),
        }
    }

    /// Accents shown for the configured profile. Empty for sectors.
    pub fn accents(&self) -> AccentMap {
        match self.profile {
            ChatProfile::Restricted => self.allow_list().accents(),
            ChatProfile::Sector => AccentMap::new(),
        }
    }

    /// App on the login screen, wired from this configuration.
    pub fn build_app(&self) -> App {
        App::new(self.gate(), self.accents(), self.clock)
    }
}
