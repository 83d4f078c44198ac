//! Session manager
//!
//! Owns the auth session and the profile lookup, and exposes the result as a
//! [`SessionState`] for the shell to route on.

use super::state::{AppContext, SessionState};
use super::store::SessionStore;
use crate::adapters::backend::{AuthProvider, AuthSession, Backend, RecordStore, SignUpOutcome};
use crate::config::SecretString;
use crate::core::catalog::Catalog;
use crate::core::profile_setup::ProfileSetupForm;
use crate::domain::{BackendError, ProntuarioError, Result};
use chrono::Utc;
use std::sync::Arc;

/// What a sign-up produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpStatus {
    /// The account is active and signed in
    Active,
    /// The service sent a confirmation e-mail; sign in after confirming
    AwaitingConfirmation { email: String },
}

/// Session/profile accessor
///
/// # Example
///
/// ```rust,no_run
/// use prontuario::adapters::backend::{Backend, MemoryBackend};
/// use prontuario::core::session::{SessionManager, SessionState, SessionStore};
/// use std::sync::Arc;
///
/// # async fn example() -> prontuario::domain::Result<()> {
/// let backend = Backend::from_shared(Arc::new(MemoryBackend::new()));
/// let mut manager = SessionManager::new(&backend, SessionStore::new(".prontuario/session.json"));
///
/// match manager.establish().await? {
///     SessionState::Ready(ctx) => println!("Signed in as {}", ctx.profile.full_name),
///     other => println!("{other:?}"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionManager {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn RecordStore>,
    sessions: SessionStore,
    session: Option<AuthSession>,
    state: SessionState,
}

impl SessionManager {
    pub fn new(backend: &Backend, sessions: SessionStore) -> Self {
        Self {
            auth: backend.auth.clone(),
            store: backend.store.clone(),
            sessions,
            session: None,
            state: SessionState::Loading,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Context for the views
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` unless a session with a profile exists.
    pub fn context(&self) -> Result<&AppContext> {
        self.state.context().ok_or(ProntuarioError::NotSignedIn)
    }

    /// Consumes the manager, keeping only the view context
    pub fn into_context(self) -> Result<AppContext> {
        match self.state {
            SessionState::Ready(ctx) => Ok(ctx),
            _ => Err(ProntuarioError::NotSignedIn),
        }
    }

    /// Restores the persisted session and loads the profile
    ///
    /// An expired access token is refreshed first. A session the service no
    /// longer accepts is discarded and the state becomes `SignedOut`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file is unreadable or the auth service
    /// cannot be reached; the state is `SignedOut` in that case and the file is
    /// kept for the next attempt.
    pub async fn establish(&mut self) -> Result<&SessionState> {
        self.state = SessionState::Loading;

        let stored = match self.sessions.load().await {
            Ok(stored) => stored,
            Err(e) => {
                self.state = SessionState::SignedOut;
                return Err(e);
            }
        };
        let Some(mut session) = stored else {
            tracing::debug!("No stored session");
            self.state = SessionState::SignedOut;
            return Ok(&self.state);
        };

        if session.is_expired_at(Utc::now()) {
            match self.refresh(&session).await {
                Ok(refreshed) => session = refreshed,
                Err(e) => return self.abandon_restore(e).await,
            }
        }

        let user = match self.auth.get_user(&session).await {
            Ok(user) => user,
            Err(ProntuarioError::Backend(BackendError::Unauthorized(_))) => {
                match self.refresh(&session).await {
                    Ok(refreshed) => {
                        session = refreshed;
                        session.user.clone()
                    }
                    Err(e) => return self.abandon_restore(e).await,
                }
            }
            Err(e) => return self.abandon_restore(e).await,
        };
        session.user = user;

        tracing::info!(user_id = %session.user.id, "Session restored");
        self.session = Some(session.clone());
        self.load_profile(session).await;
        Ok(&self.state)
    }

    /// Password sign-in
    ///
    /// # Errors
    ///
    /// Returns `Authentication` for rejected credentials; the state stays
    /// `SignedOut`.
    pub async fn sign_in(&mut self, email: &str, password: &SecretString) -> Result<&SessionState> {
        let session = match self.auth.sign_in_with_password(email.trim(), password).await {
            Ok(session) => session,
            Err(e) => {
                crate::log_remote_failure!("sign_in", &e);
                self.state = SessionState::SignedOut;
                return Err(e);
            }
        };

        tracing::info!(user_id = %session.user.id, "Signed in");
        self.start(session).await?;
        Ok(&self.state)
    }

    /// Creates an account and signs in when the service allows it
    pub async fn sign_up(&mut self, email: &str, password: &SecretString) -> Result<SignUpStatus> {
        let outcome = match self.auth.sign_up(email.trim(), password).await {
            Ok(outcome) => outcome,
            Err(e) => {
                crate::log_remote_failure!("sign_up", &e);
                return Err(e);
            }
        };

        match outcome {
            SignUpOutcome::SignedIn(session) => {
                tracing::info!(user_id = %session.user.id, "Account created");
                self.start(session).await?;
                Ok(SignUpStatus::Active)
            }
            SignUpOutcome::ConfirmationRequired { email } => {
                tracing::info!(email = %email, "Account created, awaiting confirmation");
                self.state = SessionState::SignedOut;
                Ok(SignUpStatus::AwaitingConfirmation { email })
            }
        }
    }

    /// Ends the session
    ///
    /// The remote sign-out is best effort; the local session is removed even
    /// if the service cannot be reached.
    pub async fn sign_out(&mut self) -> Result<()> {
        let session = match self.session.take() {
            Some(session) => Some(session),
            None => self.sessions.load().await.unwrap_or_default(),
        };
        if let Some(session) = session {
            if let Err(e) = self.auth.sign_out(&session).await {
                tracing::warn!(error = %e, "Remote sign-out failed, clearing local session");
            }
        }
        self.sessions.clear().await?;
        self.state = SessionState::SignedOut;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Writes the profile of the signed-in user, then loads it again
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without a session, `Validation` for an invalid
    /// form, or the backend error of the upsert (state unchanged).
    pub async fn setup_profile(
        &mut self,
        form: &ProfileSetupForm,
        catalog: &Catalog,
    ) -> Result<&SessionState> {
        let session = self.session.clone().ok_or(ProntuarioError::NotSignedIn)?;
        let upsert = form.to_upsert(&session.user, catalog)?;

        if let Err(e) = self.store.upsert_profile(&session, upsert).await {
            crate::log_remote_failure!("upsert_profile", &e);
            return Err(e);
        }

        tracing::info!(user_id = %session.user.id, "Profile saved");
        self.load_profile(session).await;
        Ok(&self.state)
    }

    async fn start(&mut self, session: AuthSession) -> Result<()> {
        self.sessions.save(&session).await?;
        self.session = Some(session.clone());
        self.load_profile(session).await;
        Ok(())
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession> {
        tracing::debug!(user_id = %session.user.id, "Access token expired, refreshing");
        let refreshed = self.auth.refresh_session(&session.refresh_token).await?;
        self.sessions.save(&refreshed).await?;
        Ok(refreshed)
    }

    /// Handles a session that could not be restored
    ///
    /// Rejected credentials drop the stored session; other failures keep it.
    async fn abandon_restore(&mut self, error: ProntuarioError) -> Result<&SessionState> {
        self.session = None;
        self.state = SessionState::SignedOut;

        let rejected = matches!(
            error,
            ProntuarioError::Authentication(_)
                | ProntuarioError::Backend(BackendError::Unauthorized(_))
        );
        if rejected {
            tracing::info!(error = %error, "Stored session is no longer valid");
            self.sessions.clear().await?;
            return Ok(&self.state);
        }

        crate::log_remote_failure!("restore_session", &error);
        Err(error)
    }

    /// Fetches the profile and settles the state
    ///
    /// A missing row and a failed fetch lead to different states.
    async fn load_profile(&mut self, session: AuthSession) {
        self.state = SessionState::Loading;
        let user = session.user.clone();

        self.state = match self.store.get_profile(&session, &user.id).await {
            Ok(Some(profile)) => SessionState::Ready(AppContext {
                session,
                user,
                profile,
            }),
            Ok(None) => {
                tracing::info!(user_id = %user.id, "No profile yet");
                SessionState::NeedsProfile { user }
            }
            Err(e) => {
                crate::log_remote_failure!("get_profile", &e);
                SessionState::ProfileUnavailable {
                    user,
                    reason: e.to_string(),
                }
            }
        };
    }
}
