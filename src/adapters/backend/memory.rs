//! In-process backend
//!
//! Emulates the hosted service closely enough for local runs and tests:
//! password accounts with bearer tokens, row ownership checks on writes,
//! foreign-key checks on patient references, and listings returned in the
//! same order the remote queries use. State can be mirrored to a JSON
//! snapshot file so separate command invocations share it.

use super::traits::{AuthProvider, AuthSession, AuthUser, RecordStore, SignUpOutcome};
use crate::config::{secret_string, SecretString};
use crate::domain::{
    AuthorRef, BackendError, Document, DocumentId, DocumentTemplate, Evolution, EvolutionId,
    NewDocument, NewEvolution, NewPatient, Patient, PatientId, Profile, ProfileUpsert,
    ProntuarioError, Result, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Lifetime of issued access tokens
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Lifetime of refresh tokens; sessions idle longer are dropped
const REFRESH_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    id: UserId,
    email: String,
    password: SecretString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IssuedToken {
    session: AuthSession,
    #[serde(default = "refresh_deadline")]
    refresh_expires_at: DateTime<Utc>,
}

fn refresh_deadline() -> DateTime<Utc> {
    Utc::now() + Duration::days(REFRESH_TTL_DAYS)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MemoryState {
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    tokens: Vec<IssuedToken>,
    #[serde(default)]
    profiles: Vec<Profile>,
    #[serde(default)]
    patients: Vec<Patient>,
    #[serde(default)]
    evolutions: Vec<Evolution>,
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    templates: Vec<DocumentTemplate>,
}

impl MemoryState {
    /// Resolves the caller behind an access token
    fn authorize(&self, session: &AuthSession) -> Result<UserId> {
        let presented = session.access_token.expose_secret().as_str();
        let now = Utc::now();
        self.tokens
            .iter()
            .find(|t| t.session.access_token.expose_secret().as_str() == presented)
            .filter(|t| now < t.session.expires_at)
            .map(|t| t.session.user.id)
            .ok_or_else(|| {
                BackendError::Unauthorized("invalid or expired access token".to_string()).into()
            })
    }

    /// Issues a session for `account`, dropping sessions whose refresh
    /// token has lapsed
    fn issue(&mut self, account: &Account, ttl: Duration) -> AuthSession {
        let now = Utc::now();
        self.tokens.retain(|t| now < t.refresh_expires_at);

        let session = AuthSession {
            access_token: secret_string(Uuid::new_v4().to_string()),
            refresh_token: secret_string(Uuid::new_v4().to_string()),
            expires_at: now + ttl,
            user: AuthUser {
                id: account.id,
                email: account.email.clone(),
            },
        };
        self.tokens.push(IssuedToken {
            session: session.clone(),
            refresh_expires_at: refresh_deadline(),
        });
        session
    }

    fn require_patient(&self, patient_id: &PatientId) -> Result<()> {
        if self.patients.iter().any(|p| p.id == *patient_id) {
            Ok(())
        } else {
            Err(BackendError::Conflict(format!(
                "patient {patient_id} does not exist (foreign key violation)"
            ))
            .into())
        }
    }

    fn author_of(&self, user_id: &UserId) -> Option<AuthorRef> {
        self.profiles
            .iter()
            .find(|p| p.id == *user_id)
            .map(|p| AuthorRef {
                full_name: p.full_name.clone(),
            })
    }
}

/// In-process implementation of [`AuthProvider`] and [`RecordStore`]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    snapshot: Option<PathBuf>,
    offline: AtomicBool,
    patient_list_calls: AtomicUsize,
    require_confirmation: bool,
    token_ttl: Duration,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty backend kept in process only
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            snapshot: None,
            offline: AtomicBool::new(false),
            patient_list_calls: AtomicUsize::new(0),
            require_confirmation: false,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Backend mirrored to a JSON snapshot at `path`
    ///
    /// An existing snapshot is loaded; otherwise the file is created on the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or parsed.
    pub fn with_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| {
                ProntuarioError::Serialization(format!(
                    "Invalid memory snapshot {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            MemoryState::default()
        };

        tracing::debug!(path = %path.display(), "Memory backend snapshot opened");

        Ok(Self {
            state: Mutex::new(state),
            snapshot: Some(path),
            ..Self::new()
        })
    }

    /// Sign-ups answer with a confirmation request instead of a session
    pub fn with_email_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Lifetime of access tokens issued from now on
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Makes every call fail as if the service were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of patient list requests received, including rejected ones
    pub fn patient_list_calls(&self) -> usize {
        self.patient_list_calls.load(Ordering::SeqCst)
    }

    /// Adds a persisted document template row
    pub async fn add_template(&self, template: DocumentTemplate) -> Result<()> {
        let mut state = self.state.lock().await;
        self.commit(&mut state, |state| state.templates.push(template))
            .await
    }

    /// Applies `change` and writes the snapshot
    ///
    /// If the snapshot cannot be written the change is undone, so the
    /// in-process state never holds a write the caller saw fail.
    async fn commit<T>(
        &self,
        state: &mut MemoryState,
        change: impl FnOnce(&mut MemoryState) -> T,
    ) -> Result<T> {
        let before = self.snapshot.as_ref().map(|_| state.clone());
        let output = change(state);
        if let Err(e) = self.persist(state).await {
            if let Some(before) = before {
                *state = before;
            }
            return Err(e);
        }
        Ok(output)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::ConnectionFailed("backend is offline".to_string()).into());
        }
        Ok(())
    }

    async fn persist(&self, state: &MemoryState) -> Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .iter()
            .find(|a| {
                a.email.eq_ignore_ascii_case(email)
                    && a.password.expose_secret().as_str() == password.expose_secret().as_str()
            })
            .cloned()
            .ok_or_else(|| ProntuarioError::Authentication("Invalid login credentials".to_string()))?;

        let ttl = self.token_ttl;
        self.commit(&mut state, |state| state.issue(&account, ttl))
            .await
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<SignUpOutcome> {
        self.check_online()?;
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ProntuarioError::Authentication(format!(
                "Invalid e-mail address '{email}'"
            )));
        }
        if password.expose_secret().is_empty() {
            return Err(ProntuarioError::Authentication(
                "Password must not be empty".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        if state.accounts.iter().any(|a| a.email.eq_ignore_ascii_case(email)) {
            return Err(ProntuarioError::Authentication(
                "User already registered".to_string(),
            ));
        }

        let account = Account {
            id: UserId::generate(),
            email: email.to_string(),
            password: password.clone(),
        };
        let require_confirmation = self.require_confirmation;
        let ttl = self.token_ttl;

        self.commit(&mut state, |state| {
            state.accounts.push(account.clone());
            if require_confirmation {
                SignUpOutcome::ConfirmationRequired {
                    email: account.email,
                }
            } else {
                SignUpOutcome::SignedIn(state.issue(&account, ttl))
            }
        })
        .await
    }

    async fn refresh_session(&self, refresh_token: &SecretString) -> Result<AuthSession> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let presented = refresh_token.expose_secret().as_str();

        let now = Utc::now();

        let position = state
            .tokens
            .iter()
            .position(|t| {
                now < t.refresh_expires_at
                    && t.session.refresh_token.expose_secret().as_str() == presented
            })
            .ok_or_else(|| {
                ProntuarioError::Authentication("Invalid refresh token".to_string())
            })?;

        let user_id = state.tokens[position].session.user.id;
        let account = state
            .accounts
            .iter()
            .find(|a| a.id == user_id)
            .cloned()
            .ok_or_else(|| ProntuarioError::Authentication("User not found".to_string()))?;

        // Rotation: the presented refresh token is spent
        let ttl = self.token_ttl;
        self.commit(&mut state, |state| {
            state.tokens.remove(position);
            state.issue(&account, ttl)
        })
        .await
    }

    async fn get_user(&self, session: &AuthSession) -> Result<AuthUser> {
        self.check_online()?;
        let state = self.state.lock().await;
        let user_id = state.authorize(session)?;
        state
            .accounts
            .iter()
            .find(|a| a.id == user_id)
            .map(|a| AuthUser {
                id: a.id,
                email: a.email.clone(),
            })
            .ok_or_else(|| BackendError::NotFound(format!("user {user_id}")).into())
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<()> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let presented = session.access_token.expose_secret().as_str();
        self.commit(&mut state, |state| {
            state
                .tokens
                .retain(|t| t.session.access_token.expose_secret().as_str() != presented)
        })
        .await
    }
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn get_profile(
        &self,
        session: &AuthSession,
        user_id: &UserId,
    ) -> Result<Option<Profile>> {
        self.check_online()?;
        let state = self.state.lock().await;
        state.authorize(session)?;
        Ok(state.profiles.iter().find(|p| p.id == *user_id).cloned())
    }

    async fn upsert_profile(
        &self,
        session: &AuthSession,
        profile: ProfileUpsert,
    ) -> Result<Profile> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let caller = state.authorize(session)?;
        if caller != profile.id {
            return Err(BackendError::Forbidden(
                "profiles may only be written by their owner".to_string(),
            )
            .into());
        }

        let now = Utc::now();
        self.commit(&mut state, |state| {
            match state.profiles.iter_mut().find(|p| p.id == profile.id) {
                Some(existing) => {
                    existing.email = profile.email;
                    existing.full_name = profile.full_name;
                    existing.profession = profile.profession;
                    existing.role = profile.role;
                    existing.updated_at = now;
                    existing.clone()
                }
                None => {
                    let created = Profile {
                        id: profile.id,
                        email: profile.email,
                        full_name: profile.full_name,
                        profession: profile.profession,
                        role: profile.role,
                        created_at: now,
                        updated_at: now,
                    };
                    state.profiles.push(created.clone());
                    created
                }
            }
        })
        .await
    }

    async fn list_patients(&self, session: &AuthSession) -> Result<Vec<Patient>> {
        self.patient_list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let state = self.state.lock().await;
        state.authorize(session)?;
        let mut patients = state.patients.clone();
        patients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(patients)
    }

    async fn insert_patient(&self, session: &AuthSession, patient: NewPatient) -> Result<Patient> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let caller = state.authorize(session)?;
        if caller != patient.created_by {
            return Err(BackendError::Forbidden(
                "created_by must match the signed-in user".to_string(),
            )
            .into());
        }

        let now = Utc::now();
        let stored = Patient {
            id: PatientId::generate(),
            name: patient.name,
            birth_date: patient.birth_date,
            cpf: patient.cpf,
            phone: patient.phone,
            email: patient.email,
            address: patient.address,
            emergency_contact: patient.emergency_contact,
            medical_history: patient.medical_history,
            created_by: patient.created_by,
            created_at: now,
            updated_at: now,
        };
        self.commit(&mut state, |state| state.patients.push(stored.clone()))
            .await?;
        Ok(stored)
    }

    async fn list_evolutions(
        &self,
        session: &AuthSession,
        patient_id: &PatientId,
    ) -> Result<Vec<Evolution>> {
        self.check_online()?;
        let state = self.state.lock().await;
        state.authorize(session)?;
        let mut evolutions: Vec<Evolution> = state
            .evolutions
            .iter()
            .filter(|e| e.patient_id == *patient_id)
            .map(|e| Evolution {
                author: state.author_of(&e.professional_id),
                ..e.clone()
            })
            .collect();
        evolutions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(evolutions)
    }

    async fn insert_evolution(
        &self,
        session: &AuthSession,
        evolution: NewEvolution,
    ) -> Result<Evolution> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let caller = state.authorize(session)?;
        if caller != evolution.professional_id {
            return Err(BackendError::Forbidden(
                "professional_id must match the signed-in user".to_string(),
            )
            .into());
        }
        state.require_patient(&evolution.patient_id)?;

        let now = Utc::now();
        let stored = Evolution {
            id: EvolutionId::generate(),
            patient_id: evolution.patient_id,
            professional_id: evolution.professional_id,
            profession: evolution.profession,
            date: evolution.date,
            content: evolution.content,
            created_at: now,
            updated_at: now,
            author: None,
        };
        self.commit(&mut state, |state| state.evolutions.push(stored.clone()))
            .await?;
        let author = state.author_of(&stored.professional_id);
        Ok(Evolution { author, ..stored })
    }

    async fn list_documents(
        &self,
        session: &AuthSession,
        patient_id: &PatientId,
    ) -> Result<Vec<Document>> {
        self.check_online()?;
        let state = self.state.lock().await;
        state.authorize(session)?;
        let mut documents: Vec<Document> = state
            .documents
            .iter()
            .filter(|d| d.patient_id == *patient_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn insert_document(
        &self,
        session: &AuthSession,
        document: NewDocument,
    ) -> Result<Document> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let caller = state.authorize(session)?;
        if caller != document.uploaded_by {
            return Err(BackendError::Forbidden(
                "uploaded_by must match the signed-in user".to_string(),
            )
            .into());
        }
        state.require_patient(&document.patient_id)?;

        let stored = Document {
            id: DocumentId::generate(),
            patient_id: document.patient_id,
            name: document.name,
            doc_type: document.doc_type,
            category: document.category,
            file_url: document.file_url,
            uploaded_by: document.uploaded_by,
            created_at: Utc::now(),
        };
        self.commit(&mut state, |state| state.documents.push(stored.clone()))
            .await?;
        Ok(stored)
    }

    async fn list_document_templates(
        &self,
        session: &AuthSession,
    ) -> Result<Vec<DocumentTemplate>> {
        self.check_online()?;
        let state = self.state.lock().await;
        state.authorize(session)?;
        let mut templates = state.templates.clone();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Profession, Role};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn signed_in(backend: &MemoryBackend, email: &str) -> AuthSession {
        match backend
            .sign_up(email, &secret_string("s3cret".to_string()))
            .await
            .unwrap()
        {
            SignUpOutcome::SignedIn(session) => session,
            other => panic!("unexpected sign-up outcome: {other:?}"),
        }
    }

    fn new_patient(name: &str, created_by: UserId) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(),
            cpf: "111.222.333-44".to_string(),
            phone: "1199".to_string(),
            email: None,
            address: None,
            emergency_contact: None,
            medical_history: None,
            created_by,
        }
    }

    #[tokio::test]
    async fn test_sign_in_rejects_wrong_password() {
        let backend = MemoryBackend::new();
        signed_in(&backend, "ana@example.com").await;

        let result = backend
            .sign_in_with_password("ana@example.com", &secret_string("wrong".to_string()))
            .await;
        assert!(matches!(result, Err(ProntuarioError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_revoked_token_is_unauthorized() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend, "ana@example.com").await;
        backend.sign_out(&session).await.unwrap();

        let result = backend.list_patients(&session).await;
        assert!(matches!(
            result,
            Err(ProntuarioError::Backend(BackendError::Unauthorized(_)))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend, "ana@example.com").await;
        let refreshed = backend.refresh_session(&session.refresh_token).await.unwrap();

        assert_eq!(refreshed.user.id, session.user.id);
        assert!(backend.refresh_session(&session.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_patients_sorted_by_name() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend, "ana@example.com").await;
        for name in ["Carla", "Bruno", "Ana"] {
            backend
                .insert_patient(&session, new_patient(name, session.user.id))
                .await
                .unwrap();
        }

        let names: Vec<String> = backend
            .list_patients(&session)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);
    }

    #[tokio::test]
    async fn test_insert_patient_for_someone_else_is_forbidden() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend, "ana@example.com").await;
        let result = backend
            .insert_patient(&session, new_patient("Ana", UserId::generate()))
            .await;
        assert!(matches!(
            result,
            Err(ProntuarioError::Backend(BackendError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_evolution_joins_author_name() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend, "ana@example.com").await;
        backend
            .upsert_profile(
                &session,
                ProfileUpsert {
                    id: session.user.id,
                    email: "ana@example.com".to_string(),
                    full_name: "Dra. Ana".to_string(),
                    profession: Profession::new("medicina").unwrap(),
                    role: Role::Professional,
                },
            )
            .await
            .unwrap();
        let patient = backend
            .insert_patient(&session, new_patient("Bruno", session.user.id))
            .await
            .unwrap();

        let evolution = backend
            .insert_evolution(
                &session,
                NewEvolution {
                    patient_id: patient.id,
                    professional_id: session.user.id,
                    profession: Profession::new("medicina").unwrap(),
                    date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                    content: "Stable".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(evolution.author_name(), Some("Dra. Ana"));
    }

    #[tokio::test]
    async fn test_evolution_for_unknown_patient_conflicts() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend, "ana@example.com").await;
        let result = backend
            .insert_evolution(
                &session,
                NewEvolution {
                    patient_id: PatientId::generate(),
                    professional_id: session.user.id,
                    profession: Profession::new("medicina").unwrap(),
                    date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                    content: "x".to_string(),
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(ProntuarioError::Backend(BackendError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn test_offline_fails_with_connection_error() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend, "ana@example.com").await;
        backend.set_offline(true);
        let result = backend.list_patients(&session).await;
        assert!(matches!(
            result,
            Err(ProntuarioError::Backend(BackendError::ConnectionFailed(_)))
        ));
    }

    #[tokio::test]
    async fn test_email_confirmation_outcome() {
        let backend = MemoryBackend::new().with_email_confirmation();
        let outcome = backend
            .sign_up("ana@example.com", &secret_string("pw".to_string()))
            .await
            .unwrap();
        assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("store.json");

        let session = {
            let backend = MemoryBackend::with_snapshot(&path).unwrap();
            let session = signed_in(&backend, "ana@example.com").await;
            backend
                .insert_patient(&session, new_patient("Ana", session.user.id))
                .await
                .unwrap();
            session
        };

        let reopened = MemoryBackend::with_snapshot(&path).unwrap();
        let patients = reopened.list_patients(&session).await.unwrap();
        assert_eq!(patients.len(), 1);
    }

    #[tokio::test]
    async fn test_token_table_stays_bounded_across_refreshes() {
        let backend = MemoryBackend::new();
        let mut session = signed_in(&backend, "ana@example.com").await;
        for _ in 0..50 {
            session = backend.refresh_session(&session.refresh_token).await.unwrap();
        }
        assert_eq!(backend.state.lock().await.tokens.len(), 1);

        backend.sign_out(&session).await.unwrap();
        assert!(backend.state.lock().await.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_lapsed_refresh_tokens_are_pruned_on_issue() {
        let backend = MemoryBackend::new();
        let stale = signed_in(&backend, "ana@example.com").await;
        backend.state.lock().await.tokens[0].refresh_expires_at =
            Utc::now() - Duration::seconds(1);

        signed_in(&backend, "bia@example.com").await;

        assert_eq!(backend.state.lock().await.tokens.len(), 1);
        assert!(backend.refresh_session(&stale.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_access_token_can_still_refresh() {
        let backend = MemoryBackend::new().with_token_ttl(Duration::seconds(-1));
        let session = signed_in(&backend, "ana@example.com").await;

        assert!(backend.list_patients(&session).await.is_err());
        assert!(backend.refresh_session(&session.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_for_missing_account_keeps_token() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend, "ana@example.com").await;
        let account = backend.state.lock().await.accounts.remove(0);

        let result = backend.refresh_session(&session.refresh_token).await;
        assert!(matches!(result, Err(ProntuarioError::Authentication(_))));

        backend.state.lock().await.accounts.push(account);
        assert!(backend.refresh_session(&session.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_leaves_state_unchanged() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let backend = MemoryBackend::with_snapshot(data.join("store.json")).unwrap();
        let session = signed_in(&backend, "ana@example.com").await;

        // A plain file where the snapshot directory should be
        std::fs::remove_dir_all(&data).unwrap();
        std::fs::write(&data, b"").unwrap();

        let inserted = backend
            .insert_patient(&session, new_patient("Ana", session.user.id))
            .await;
        assert!(matches!(inserted, Err(ProntuarioError::Io(_))));
        assert!(backend.list_patients(&session).await.unwrap().is_empty());

        assert!(backend.refresh_session(&session.refresh_token).await.is_err());
        assert!(backend.list_patients(&session).await.is_ok());
    }
}
