//! Session and profile of the signed-in clinician
//!
//! - [`SessionManager`] - sign-in, sign-up, sign-out, session restore and
//!   profile setup
//! - [`SessionState`] / [`AppContext`] - what the shell and views observe
//! - [`SessionStore`] - the session file kept between invocations

pub mod manager;
pub mod state;
pub mod store;

pub use manager::{SessionManager, SignUpStatus};
pub use state::{AppContext, SessionState};
pub use store::SessionStore;
