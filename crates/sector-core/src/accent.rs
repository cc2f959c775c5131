//! Per-user accent colours.
//!
//! Accents are display-only: they colour a known user's status dot and name.
//! They come from configuration next to the allow-list entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Accent colour for a known user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Blue.
    Blue,
    /// Magenta.
    Magenta,
    /// Cyan.
    Cyan,
}

impl Accent {
    /// Lowercase colour name, used in CSS class names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
        }
    }
}

/// Username to accent lookup. Exact, case-sensitive match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccentMap(HashMap<String, Accent>);

impl AccentMap {
    /// Empty map: nobody gets an accent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an accent to a username.
    pub fn insert(&mut self, username: impl Into<String>, accent: Accent) {
        self.0.insert(username.into(), accent);
    }

    /// Accent for a username, if one is configured.
    pub fn get(&self, username: &str) -> Option<Accent> {
        self.0.get(username).copied()
    }

    /// Number of users with an accent.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no accents are configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Accent)> for AccentMap {
    fn from_iter<T: IntoIterator<Item = (String, Accent)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
