//! Evolutions: dated clinical progress notes

use super::ids::{EvolutionId, PatientId, UserId};
use super::profession::Profession;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Joined author columns (`profiles(full_name)`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub full_name: String,
}

/// An evolution row (`evolutions` table) with its author's display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    pub id: EvolutionId,
    pub patient_id: PatientId,
    pub professional_id: UserId,
    pub profession: Profession,
    /// Clinical date of the note (not the insertion time)
    pub date: NaiveDate,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(
        default,
        rename = "profiles",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<AuthorRef>,
}

impl Evolution {
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.full_name.as_str())
    }
}

/// Insert payload for `evolutions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvolution {
    pub patient_id: PatientId,
    pub professional_id: UserId,
    pub profession: Profession,
    pub date: NaiveDate,
    pub content: String,
}
