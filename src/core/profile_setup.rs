//! Profile setup form
//!
//! First-time users have an auth identity but no `profiles` row. This form
//! collects the missing fields; [`SessionManager::setup_profile`] submits it.
//!
//! [`SessionManager::setup_profile`]: crate::core::session::SessionManager::setup_profile

use crate::adapters::backend::AuthUser;
use crate::core::catalog::Catalog;
use crate::domain::{Profession, ProfileUpsert, ProntuarioError, Result, Role};

/// Fields collected for a new profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSetupForm {
    pub full_name: String,
    pub profession: String,
    pub role: Role,
}

impl ProfileSetupForm {
    /// Form with the default `professional` role
    pub fn new(full_name: impl Into<String>, profession: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            profession: profession.into(),
            role: Role::default(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Builds the upsert payload for `user`
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the name is blank or the profession is not in
    /// the catalog.
    pub fn to_upsert(&self, user: &AuthUser, catalog: &Catalog) -> Result<ProfileUpsert> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(ProntuarioError::Validation(
                "Full name is required".to_string(),
            ));
        }

        let profession = Profession::new(self.profession.as_str())
            .map_err(ProntuarioError::Validation)?;
        if !catalog.contains_profession(profession.as_str()) {
            return Err(ProntuarioError::Validation(format!(
                "Unknown profession '{}'",
                profession
            )));
        }

        Ok(ProfileUpsert {
            id: user.id,
            email: user.email.clone(),
            full_name: full_name.to_string(),
            profession,
            role: self.role,
        })
    }
}
