//! Document browser view
//!
//! Documents of the active patient grouped into one panel per category of
//! the vocabulary, plus the template names per profession.

use crate::adapters::backend::RecordStore;
use crate::core::catalog::Catalog;
use crate::core::refresh::{Generation, LoadTicket};
use crate::core::session::AppContext;
use crate::domain::{Document, NewDocument, PatientId, ProntuarioError, Result};
use std::collections::BTreeMap;

/// Documents of one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPanel<'a> {
    pub category: &'a str,
    pub documents: Vec<&'a Document>,
}

impl CategoryPanel<'_> {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Metadata of a document already stored elsewhere
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDocumentForm {
    pub name: String,
    /// Free-form type tag, e.g. `pdf` or `laudo`
    pub doc_type: String,
    pub category: String,
    pub file_url: String,
}

/// Documents of the active patient
#[derive(Debug)]
pub struct DocumentBrowser {
    catalog: Catalog,
    patient_id: Option<PatientId>,
    documents: Vec<Document>,
    generation: Generation,
}

impl DocumentBrowser {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            patient_id: None,
            documents: Vec::new(),
            generation: Generation::default(),
        }
    }

    pub fn patient_id(&self) -> Option<PatientId> {
        self.patient_id
    }

    /// All loaded documents, newest first
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn begin_load(&mut self, patient_id: PatientId) -> LoadTicket {
        if self.patient_id != Some(patient_id) {
            self.documents.clear();
        }
        self.patient_id = Some(patient_id);
        self.generation.issue()
    }

    /// Applies a fetch result if it is the latest load of the active patient
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        patient_id: PatientId,
        result: Result<Vec<Document>>,
    ) -> Result<()> {
        if !self.generation.is_current(ticket) || self.patient_id != Some(patient_id) {
            crate::log_stale_response!("documents", ticket.value(), self.generation.current());
            return Ok(());
        }

        match result {
            Ok(documents) => {
                crate::log_rows_loaded!("documents", documents.len());
                self.documents = documents;
                let hidden = self.hidden_count();
                if hidden > 0 {
                    tracing::warn!(
                        patient_id = %patient_id,
                        hidden,
                        "Documents with unknown categories are not shown in any panel"
                    );
                }
                Ok(())
            }
            Err(e) => {
                crate::log_remote_failure!("list_documents", &e);
                Err(e)
            }
        }
    }

    pub async fn refresh(
        &mut self,
        store: &dyn RecordStore,
        ctx: &AppContext,
        patient_id: PatientId,
    ) -> Result<()> {
        let ticket = self.begin_load(patient_id);
        let result = store.list_documents(&ctx.session, &patient_id).await;
        self.apply_load(ticket, patient_id, result)
    }

    /// One panel per category, in vocabulary order, empty panels included
    pub fn panels(&self) -> Vec<CategoryPanel<'_>> {
        self.catalog
            .document_categories()
            .iter()
            .map(|category| CategoryPanel {
                category: category.as_str(),
                documents: self
                    .documents
                    .iter()
                    .filter(|d| d.category == *category)
                    .collect(),
            })
            .collect()
    }

    /// Number of loaded documents that fall in no panel
    pub fn hidden_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| !self.catalog.contains_category(&d.category))
            .count()
    }

    /// Template names keyed by profession value
    pub fn templates(&self) -> &BTreeMap<String, Vec<String>> {
        self.catalog.templates()
    }

    pub fn templates_for(&self, profession: &str) -> &[String] {
        self.catalog.templates_for(profession)
    }

    /// Records document metadata for the active patient
    ///
    /// The new row is shown first. Binary content is not uploaded; `file_url`
    /// must already point at the stored file.
    ///
    /// # Errors
    ///
    /// Returns `NoActivePatient` if no patient is loaded, `Validation` for a
    /// blank field or a category outside the vocabulary, or the backend error.
    pub async fn register(
        &mut self,
        store: &dyn RecordStore,
        ctx: &AppContext,
        form: NewDocumentForm,
    ) -> Result<&Document> {
        let patient_id = self.patient_id.ok_or(ProntuarioError::NoActivePatient)?;
        let insert = self.validate(&form, patient_id, ctx)?;

        match store.insert_document(&ctx.session, insert).await {
            Ok(document) => {
                tracing::info!(
                    document_id = %document.id,
                    category = %document.category,
                    "Document registered"
                );
                self.documents.insert(0, document);
                self.documents
                    .first()
                    .ok_or_else(|| ProntuarioError::Other("document list is empty".to_string()))
            }
            Err(e) => {
                crate::log_remote_failure!("insert_document", &e);
                Err(e)
            }
        }
    }

    fn validate(
        &self,
        form: &NewDocumentForm,
        patient_id: PatientId,
        ctx: &AppContext,
    ) -> Result<NewDocument> {
        for (field, value) in [
            ("name", &form.name),
            ("type", &form.doc_type),
            ("category", &form.category),
            ("file_url", &form.file_url),
        ] {
            if value.trim().is_empty() {
                return Err(ProntuarioError::Validation(format!("{field} is required")));
            }
        }

        let category = form.category.trim();
        if !self.catalog.contains_category(category) {
            return Err(ProntuarioError::Validation(format!(
                "Unknown category '{}'. Must be one of: {}",
                category,
                self.catalog.document_categories().join(", ")
            )));
        }

        Ok(NewDocument {
            patient_id,
            name: form.name.trim().to_string(),
            doc_type: form.doc_type.trim().to_string(),
            category: category.to_string(),
            file_url: form.file_url.trim().to_string(),
            uploaded_by: ctx.user.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roster::PatientRoster;
    use crate::core::testing::{patient_form, ready_context};
    use crate::domain::{DocumentId, UserId};
    use chrono::Utc;

    fn form(name: &str, category: &str) -> NewDocumentForm {
        NewDocumentForm {
            name: name.to_string(),
            doc_type: "pdf".to_string(),
            category: category.to_string(),
            file_url: format!("https://files.example.com/{name}.pdf"),
        }
    }

    fn document(patient_id: PatientId, category: &str) -> Document {
        Document {
            id: DocumentId::generate(),
            patient_id,
            name: "exame".to_string(),
            doc_type: "pdf".to_string(),
            category: category.to_string(),
            file_url: "https://files.example.com/exame.pdf".to_string(),
            uploaded_by: UserId::generate(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_panels_follow_vocabulary_order() {
        let browser = DocumentBrowser::new(Catalog::default());
        let categories: Vec<&str> = browser.panels().iter().map(|p| p.category).collect();
        assert_eq!(
            categories,
            vec![
                "Médico",
                "Fisioterapia",
                "Psicologia",
                "Enfermagem",
                "Nutrição",
                "Terapia Ocupacional",
                "Geral"
            ]
        );
        assert!(browser.panels().iter().all(CategoryPanel::is_empty));
    }

    #[test]
    fn test_unknown_category_appears_in_no_panel() {
        let patient_id = PatientId::generate();
        let mut browser = DocumentBrowser::new(Catalog::default());
        let ticket = browser.begin_load(patient_id);
        browser
            .apply_load(
                ticket,
                patient_id,
                Ok(vec![
                    document(patient_id, "Médico"),
                    document(patient_id, "Radiologia"),
                    document(patient_id, "Geral"),
                ]),
            )
            .unwrap();

        let shown: usize = browser.panels().iter().map(|p| p.documents.len()).sum();
        assert_eq!(shown, 2);
        assert_eq!(browser.hidden_count(), 1);
        assert!(browser
            .panels()
            .iter()
            .flat_map(|p| p.documents.iter())
            .all(|d| d.category != "Radiologia"));
    }

    #[tokio::test]
    async fn test_register_shows_new_document_first() {
        let (backend, ctx) = ready_context().await;
        let store = backend.store.as_ref();
        let mut roster = PatientRoster::new();
        let patient_id = roster.create(store, &ctx, patient_form("Ana")).await.unwrap().id;

        let mut browser = DocumentBrowser::new(Catalog::default());
        browser.refresh(store, &ctx, patient_id).await.unwrap();
        browser.register(store, &ctx, form("anamnese", "Médico")).await.unwrap();
        let second = browser
            .register(store, &ctx, form("plano", "Fisioterapia"))
            .await
            .unwrap()
            .clone();

        assert_eq!(browser.documents()[0].id, second.id);
        assert_eq!(second.uploaded_by, ctx.user.id);
        assert_eq!(browser.panels()[1].documents.len(), 1);

        browser.refresh(store, &ctx, patient_id).await.unwrap();
        assert_eq!(browser.documents().len(), 2);
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_category() {
        let (backend, ctx) = ready_context().await;
        let store = backend.store.as_ref();
        let mut roster = PatientRoster::new();
        let patient_id = roster.create(store, &ctx, patient_form("Ana")).await.unwrap().id;

        let mut browser = DocumentBrowser::new(Catalog::default());
        browser.refresh(store, &ctx, patient_id).await.unwrap();
        let result = browser.register(store, &ctx, form("raio-x", "Radiologia")).await;

        assert!(matches!(result, Err(ProntuarioError::Validation(_))));
        assert!(browser.documents().is_empty());
    }

    #[tokio::test]
    async fn test_register_without_patient() {
        let (backend, ctx) = ready_context().await;
        let mut browser = DocumentBrowser::new(Catalog::default());
        let result = browser
            .register(backend.store.as_ref(), &ctx, form("x", "Geral"))
            .await;
        assert!(matches!(result, Err(ProntuarioError::NoActivePatient)));
    }

    #[test]
    fn test_templates_display() {
        let browser = DocumentBrowser::new(Catalog::default());
        assert_eq!(browser.templates().len(), 4);
        assert_eq!(browser.templates_for("psicologia").len(), 5);
    }
}
