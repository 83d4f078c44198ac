//! Patient documents and persisted document templates

use super::ids::{DocumentId, PatientId, TemplateId, UserId};
use super::profession::Profession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document row (`documents` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub patient_id: PatientId,
    pub name: String,
    /// MIME type or free-form kind (`type` column)
    #[serde(rename = "type")]
    pub doc_type: String,
    pub category: String,
    pub file_url: String,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `documents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub patient_id: PatientId,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub category: String,
    pub file_url: String,
    pub uploaded_by: UserId,
}

/// A persisted template row (`document_templates` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: TemplateId,
    pub name: String,
    pub profession: Profession,
    #[serde(default)]
    pub template_content: String,
    pub created_at: DateTime<Utc>,
}
