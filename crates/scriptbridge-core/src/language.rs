//! Supported script languages.

use crate::error::FactoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All languages a scriptbridge build can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptLanguage {
    /// Ruby, evaluated by an external `ruby` runtime.
    Ruby,

    /// No script language; backed by the inert interpreter.
    None,
}

impl ScriptLanguage {
    /// Every known language, in declaration order.
    pub const ALL: [ScriptLanguage; 2] = [ScriptLanguage::Ruby, ScriptLanguage::None];

    /// Parse a language identifier, case-insensitively.
    pub fn parse(s: &str) -> Result<Self, FactoryError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ruby" => Ok(ScriptLanguage::Ruby),
            "none" => Ok(ScriptLanguage::None),
            _ => Err(FactoryError::UnhandledConfiguration(s.to_string())),
        }
    }

    /// Convert to the lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptLanguage::Ruby => "ruby",
            ScriptLanguage::None => "none",
        }
    }
}

impl FromStr for ScriptLanguage {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScriptLanguage::parse(s)
    }
}

impl fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
