//! Input model: modifier keys and the designated shoot modifier.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Only `key` held.
    #[must_use]
    pub fn only(key: ModifierKey) -> Self {
        let mut m = Self::default();
        match key {
            ModifierKey::Shift => m.shift = true,
            ModifierKey::Ctrl => m.ctrl = true,
            ModifierKey::Alt => m.alt = true,
            ModifierKey::Meta => m.meta = true,
        }
        m
    }
}

/// The key that turns a point or selection into a shoot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    Shift,
    Ctrl,
    #[default]
    Alt,
    Meta,
}

impl ModifierKey {
    /// Whether this key is among `modifiers`. Other held keys don't matter.
    #[must_use]
    pub fn is_down(self, modifiers: Modifiers) -> bool {
        match self {
            Self::Shift => modifiers.shift,
            Self::Ctrl => modifiers.ctrl,
            Self::Alt => modifiers.alt,
            Self::Meta => modifiers.meta,
        }
    }
}

impl FromStr for ModifierKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "shift" => Ok(Self::Shift),
            "ctrl" | "control" => Ok(Self::Ctrl),
            "alt" | "option" => Ok(Self::Alt),
            "meta" | "cmd" | "command" => Ok(Self::Meta),
            other => Err(format!("unknown modifier key: {other}")),
        }
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Shift => "shift",
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Meta => "meta",
        };
        f.write_str(name)
    }
}
