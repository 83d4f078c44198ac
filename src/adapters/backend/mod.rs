//! Hosted backend access
//!
//! [`AuthProvider`] and [`RecordStore`] describe what the views need from
//! the service. [`SupabaseBackend`] speaks the real HTTP protocol;
//! [`MemoryBackend`] keeps everything in process for local runs and tests.

pub mod factory;
pub mod memory;
pub mod supabase;
pub mod traits;

pub use factory::{create_backend, Backend};
pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;
pub use traits::{AuthProvider, AuthSession, AuthUser, RecordStore, SignUpOutcome};
