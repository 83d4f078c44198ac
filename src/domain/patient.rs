//! Patient demographic records

use super::ids::{PatientId, UserId};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A patient row (`patients` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub birth_date: NaiveDate,
    /// National taxpayer id (CPF), stored as typed by the user
    pub cpf: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Age in completed years on `today`
    ///
    /// Birth dates in the future yield 0.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        age_in_years(self.birth_date, today)
    }

    /// Whether this patient matches a roster search term
    ///
    /// Name matches case-insensitively, CPF matches verbatim. An empty term
    /// matches everything.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term.to_lowercase()) || self.cpf.contains(term)
    }
}

/// Completed years between `birth` and `today`
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> u32 {
    if today < birth {
        return 0;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Insert payload for `patients`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub birth_date: NaiveDate,
    pub cpf: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    pub created_by: UserId,
}
