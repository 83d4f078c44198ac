//! Session states observed by the shell

use crate::adapters::backend::{AuthSession, AuthUser};
use crate::domain::Profile;

/// Identity handed to the views once a profile exists
#[derive(Debug, Clone)]
pub struct AppContext {
    pub session: AuthSession,
    pub user: AuthUser,
    pub profile: Profile,
}

/// Where the signed-in identity currently stands
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Session restoration or profile fetch in progress
    Loading,
    /// No session
    SignedOut,
    /// Signed in, but no profile row exists yet
    NeedsProfile { user: AuthUser },
    /// Signed in, but the profile could not be fetched
    ProfileUnavailable { user: AuthUser, reason: String },
    /// Signed in with a profile
    Ready(AppContext),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Loading | SessionState::SignedOut => None,
            SessionState::NeedsProfile { user }
            | SessionState::ProfileUnavailable { user, .. } => Some(user),
            SessionState::Ready(ctx) => Some(&ctx.user),
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionState::Ready(ctx) => Some(&ctx.profile),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&AppContext> {
        match self {
            SessionState::Ready(ctx) => Some(ctx),
            _ => None,
        }
    }
}
