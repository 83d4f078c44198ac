//! Profession and role vocabularies
//!
//! Professions are a controlled vocabulary, but the vocabulary itself lives in
//! configuration (see [`crate::config::CatalogConfig`]), so a profession is a
//! string newtype rather than a closed enum. Roles are fixed by the schema.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Profession tag shared by profiles, evolutions and templates (e.g. `medicina`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Profession(String);

impl Profession {
    /// Creates a profession tag, rejecting blank values
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("Profession cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable fallback used when the catalog has no label for this value
    pub fn fallback_label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Profession {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Profession {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Profession> for String {
    fn from(profession: Profession) -> Self {
        profession.0
    }
}

impl AsRef<str> for Profession {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Application role of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator
    Admin,
    /// Practising professional
    #[default]
    Professional,
    /// Student under supervision
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Professional => "professional",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "professional" => Ok(Role::Professional),
            "student" => Ok(Role::Student),
            other => Err(format!(
                "Invalid role '{other}'. Must be one of: admin, professional, student"
            )),
        }
    }
}
