//! Domain identifier types
//!
//! Newtype wrappers over UUIDs for each table's primary key, so a patient id
//! can never be passed where a profile id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps an existing UUID
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random id
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| format!("Invalid {} '{}': {}", $label, s, e))
            }
        }
    };
}

uuid_id!(
    /// Authenticated user id; also the primary key of the `profiles` table
    UserId,
    "user id"
);

uuid_id!(
    /// Primary key of the `patients` table
    PatientId,
    "patient id"
);

uuid_id!(
    /// Primary key of the `evolutions` table
    EvolutionId,
    "evolution id"
);

uuid_id!(
    /// Primary key of the `documents` table
    DocumentId,
    "document id"
);

uuid_id!(
    /// Primary key of the `document_templates` table
    TemplateId,
    "template id"
);
