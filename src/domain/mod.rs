//! Domain models and types for Prontuario.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`UserId`], [`PatientId`], [`EvolutionId`], ...)
//! - **Row models** mirroring the backend tables ([`Profile`], [`Patient`],
//!   [`Evolution`], [`Document`], [`DocumentTemplate`])
//! - **Insert payloads** ([`NewPatient`], [`NewEvolution`], [`NewDocument`],
//!   [`ProfileUpsert`])
//! - **Error types** ([`ProntuarioError`], [`BackendError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are UUID newtypes, so ids of different tables cannot be mixed:
//!
//! ```rust
//! use prontuario::domain::{PatientId, UserId};
//! use std::str::FromStr;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let patient = PatientId::from_str("7d44b88c-4199-4bad-97dc-d78268e01398")?;
//! let user = UserId::generate();
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: UserId = patient;
//! # let _ = (patient, user);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod errors;
pub mod evolution;
pub mod ids;
pub mod patient;
pub mod profession;
pub mod profile;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{Document, DocumentTemplate, NewDocument};
pub use errors::{BackendError, ProntuarioError};
pub use evolution::{AuthorRef, Evolution, NewEvolution};
pub use ids::{DocumentId, EvolutionId, PatientId, TemplateId, UserId};
pub use patient::{age_in_years, NewPatient, Patient};
pub use profession::{Profession, Role};
pub use profile::{Profile, ProfileUpsert};
pub use result::Result;
