//! Profile rows: the application identity extending an auth user

use super::ids::UserId;
use super::profession::{Profession, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extended identity of an authenticated user (`profiles` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub profession: Profession,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// First letter of the full name, used as an avatar fallback
    pub fn initial(&self) -> char {
        self.full_name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

/// Upsert payload for `profiles`, keyed by user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpsert {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub profession: Profession,
    pub role: Role,
}
