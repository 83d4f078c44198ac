//! Presentation shell
//!
//! Chooses the top-level view from the session state. Views below the shell
//! only fetch data once it routes to [`ShellView::Workspace`].

use crate::core::catalog::Catalog;
use crate::core::session::{AppContext, SessionState};
use std::fmt;

/// Top-level view to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellView {
    Loading,
    SignIn,
    ProfileSetup,
    ProfileUnavailable,
    Workspace,
}

impl ShellView {
    pub fn route(state: &SessionState) -> Self {
        match state {
            SessionState::Loading => ShellView::Loading,
            SessionState::SignedOut => ShellView::SignIn,
            SessionState::NeedsProfile { .. } => ShellView::ProfileSetup,
            SessionState::ProfileUnavailable { .. } => ShellView::ProfileUnavailable,
            SessionState::Ready(_) => ShellView::Workspace,
        }
    }

    /// Whether patient data may be fetched under this view
    pub fn allows_patient_fetch(&self) -> bool {
        matches!(self, ShellView::Workspace)
    }
}

impl fmt::Display for ShellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShellView::Loading => "loading",
            ShellView::SignIn => "sign-in",
            ShellView::ProfileSetup => "profile-setup",
            ShellView::ProfileUnavailable => "profile-unavailable",
            ShellView::Workspace => "workspace",
        };
        write!(f, "{}", name)
    }
}

/// Identity line shown above the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellHeader {
    pub full_name: String,
    pub profession_label: String,
    pub initial: char,
}

impl ShellHeader {
    pub fn new(ctx: &AppContext, catalog: &Catalog) -> Self {
        Self {
            full_name: ctx.profile.full_name.clone(),
            profession_label: catalog.profession_label(&ctx.profile.profession),
            initial: ctx.profile.initial(),
        }
    }
}
