//! Backend abstraction traits
//!
//! The hosted service offers two things: session authentication and table
//! CRUD under row-level policies. Each is a trait so views can run against
//! the HTTP client or the in-memory store interchangeably.

use crate::config::SecretString;
use crate::domain::{
    Document, DocumentTemplate, Evolution, NewDocument, NewEvolution, NewPatient, Patient,
    PatientId, Profile, ProfileUpsert, Result, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds before expiry at which an access token is treated as expired
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// Identity attached to an auth session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
}

/// A signed-in session: bearer tokens plus the user they belong to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Whether the access token is expired (or about to be) at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_LEEWAY_SECS) >= self.expires_at
    }
}

/// Result of a sign-up request
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// The account is active and a session was issued
    SignedIn(AuthSession),
    /// The service requires e-mail confirmation before sign-in
    ConfirmationRequired { email: String },
}

/// Session authentication
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Password grant
    ///
    /// # Errors
    ///
    /// Returns `Authentication` for rejected credentials, `Backend` for
    /// transport or server failures.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession>;

    /// Creates an account
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<SignUpOutcome>;

    /// Exchanges a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &SecretString) -> Result<AuthSession>;

    /// Resolves the user behind an access token, validating it
    async fn get_user(&self, session: &AuthSession) -> Result<AuthUser>;

    /// Revokes the session on the service
    async fn sign_out(&self, session: &AuthSession) -> Result<()>;
}

/// Table access under the caller's session
///
/// Listing methods return rows in display order: patients by name ascending,
/// evolutions by clinical date descending (with the author's name joined),
/// documents by creation time descending.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Profile row of `user_id`, `None` if it has not been set up yet
    async fn get_profile(&self, session: &AuthSession, user_id: &UserId)
        -> Result<Option<Profile>>;

    /// Inserts or updates the profile keyed by its id
    async fn upsert_profile(&self, session: &AuthSession, profile: ProfileUpsert)
        -> Result<Profile>;

    async fn list_patients(&self, session: &AuthSession) -> Result<Vec<Patient>>;

    async fn insert_patient(&self, session: &AuthSession, patient: NewPatient) -> Result<Patient>;

    async fn list_evolutions(
        &self,
        session: &AuthSession,
        patient_id: &PatientId,
    ) -> Result<Vec<Evolution>>;

    /// Inserts an evolution and returns it with the author's name joined
    async fn insert_evolution(
        &self,
        session: &AuthSession,
        evolution: NewEvolution,
    ) -> Result<Evolution>;

    async fn list_documents(
        &self,
        session: &AuthSession,
        patient_id: &PatientId,
    ) -> Result<Vec<Document>>;

    async fn insert_document(
        &self,
        session: &AuthSession,
        document: NewDocument,
    ) -> Result<Document>;

    /// Persisted template rows, ordered by name
    async fn list_document_templates(&self, session: &AuthSession)
        -> Result<Vec<DocumentTemplate>>;
}
