use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A thumbs-up or thumbs-down left on an assistant reply.
///
/// The third state, "no reaction", is `None` wherever a reaction is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    /// Thumbs up.
    Up,
    /// Thumbs down.
    Down,
}

impl Reaction {
    /// Apply this reaction on top of `current`.
    ///
    /// Choosing the reaction that is already set clears it; anything else replaces it.
    pub fn toggle(self, current: Option<Reaction>) -> Option<Reaction> {
        if current == Some(self) {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reaction::Up => write!(f, "up"),
            Reaction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "+" | "+1" => Ok(Reaction::Up),
            "down" | "-" | "-1" => Ok(Reaction::Down),
            other => Err(format!("unknown reaction '{other}' (expected 'up' or 'down')")),
        }
    }
}
