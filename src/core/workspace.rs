//! Workspace of a signed-in clinician
//!
//! Ties the roster, the evolution log and the document browser to one
//! [`AppContext`] and the selected patient.

use crate::adapters::backend::RecordStore;
use crate::core::catalog::Catalog;
use crate::core::documents::{DocumentBrowser, NewDocumentForm};
use crate::core::evolutions::{EvolutionLog, NewEvolutionForm};
use crate::core::refresh::LoadTicket;
use crate::core::roster::{NewPatientForm, PatientRoster};
use crate::core::session::AppContext;
use crate::domain::{Document, Evolution, Patient, PatientId, Result};
use std::sync::Arc;

/// Loads started for a patient selection
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub patient_id: PatientId,
    evolutions: LoadTicket,
    documents: LoadTicket,
}

/// Views and context of one signed-in session
pub struct Workspace {
    ctx: AppContext,
    store: Arc<dyn RecordStore>,
    catalog: Catalog,
    roster: PatientRoster,
    evolutions: EvolutionLog,
    documents: DocumentBrowser,
    selected: Option<PatientId>,
}

impl Workspace {
    pub fn new(ctx: AppContext, store: Arc<dyn RecordStore>, catalog: Catalog) -> Self {
        Self {
            ctx,
            store,
            documents: DocumentBrowser::new(catalog.clone()),
            catalog,
            roster: PatientRoster::new(),
            evolutions: EvolutionLog::new(),
            selected: None,
        }
    }

    /// Loads the persisted templates and the roster
    ///
    /// Templates are optional: a failed template fetch is logged and the
    /// configured catalog is kept.
    pub async fn open(&mut self) -> Result<()> {
        self.load_templates().await;
        self.refresh_roster().await
    }

    pub async fn refresh_roster(&mut self) -> Result<()> {
        self.roster.refresh(self.store.as_ref(), &self.ctx).await
    }

    async fn load_templates(&mut self) {
        match self.store.list_document_templates(&self.ctx.session).await {
            Ok(rows) if rows.is_empty() => {}
            Ok(rows) => {
                tracing::debug!(count = rows.len(), "Merging persisted document templates");
                self.catalog = self.catalog.clone().with_persisted_templates(&rows);
                self.documents.set_catalog(self.catalog.clone());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisted document templates unavailable");
            }
        }
    }

    /// Makes `patient_id` the active patient and loads its evolutions and
    /// documents concurrently
    ///
    /// Both loads are attempted; the first error is returned after both have
    /// been applied.
    pub async fn select_patient(&mut self, patient_id: PatientId) -> Result<()> {
        let selection = self.begin_selection(patient_id);
        let (evolutions, documents) = tokio::join!(
            self.store.list_evolutions(&self.ctx.session, &patient_id),
            self.store.list_documents(&self.ctx.session, &patient_id),
        );
        self.finish_selection(selection, evolutions, documents)
    }

    /// Switches the active patient and issues load tickets on both views
    pub fn begin_selection(&mut self, patient_id: PatientId) -> Selection {
        tracing::debug!(patient_id = %patient_id, "Patient selected");
        self.selected = Some(patient_id);
        Selection {
            patient_id,
            evolutions: self.evolutions.begin_load(patient_id),
            documents: self.documents.begin_load(patient_id),
        }
    }

    /// Applies the fetch results of `selection`; superseded results are dropped
    pub fn finish_selection(
        &mut self,
        selection: Selection,
        evolutions: Result<Vec<Evolution>>,
        documents: Result<Vec<Document>>,
    ) -> Result<()> {
        let evolutions =
            self.evolutions
                .apply_load(selection.evolutions, selection.patient_id, evolutions);
        let documents = self
            .documents
            .apply_load(selection.documents, selection.patient_id, documents);
        evolutions.and(documents)
    }

    pub async fn add_patient(&mut self, form: NewPatientForm) -> Result<&Patient> {
        self.roster.create(self.store.as_ref(), &self.ctx, form).await
    }

    pub async fn add_evolution(&mut self, form: NewEvolutionForm) -> Result<&Evolution> {
        self.evolutions
            .create(self.store.as_ref(), &self.ctx, &self.catalog, form)
            .await
    }

    pub async fn register_document(&mut self, form: NewDocumentForm) -> Result<&Document> {
        self.documents
            .register(self.store.as_ref(), &self.ctx, form)
            .await
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn roster(&self) -> &PatientRoster {
        &self.roster
    }

    pub fn evolutions(&self) -> &EvolutionLog {
        &self.evolutions
    }

    pub fn evolutions_mut(&mut self) -> &mut EvolutionLog {
        &mut self.evolutions
    }

    pub fn documents(&self) -> &DocumentBrowser {
        &self.documents
    }

    pub fn selected_patient_id(&self) -> Option<PatientId> {
        self.selected
    }

    /// Selected patient, if it is in the loaded roster
    pub fn selected_patient(&self) -> Option<&Patient> {
        self.selected.and_then(|id| self.roster.select(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{patient_form, ready_context};
    use crate::domain::{Profession, TemplateId};
    use chrono::Utc;

    #[tokio::test]
    async fn test_open_loads_roster() {
        let (backend, ctx) = ready_context().await;
        let mut seed = PatientRoster::new();
        seed.create(backend.store.as_ref(), &ctx, patient_form("Bruno"))
            .await
            .unwrap();
        seed.create(backend.store.as_ref(), &ctx, patient_form("Ana"))
            .await
            .unwrap();

        let mut workspace = Workspace::new(ctx, backend.store.clone(), Catalog::default());
        workspace.open().await.unwrap();

        let names: Vec<&str> = workspace
            .roster()
            .patients()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);
    }

    #[tokio::test]
    async fn test_open_merges_persisted_templates() {
        let (backend, ctx) = ready_context().await;
        backend
            .memory
            .add_template(crate::domain::DocumentTemplate {
                id: TemplateId::generate(),
                name: "Plano Alimentar".to_string(),
                profession: Profession::new("nutricao").unwrap(),
                template_content: String::new(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let mut workspace = Workspace::new(ctx, backend.store.clone(), Catalog::default());
        workspace.open().await.unwrap();
        assert_eq!(
            workspace.documents().templates_for("nutricao"),
            ["Plano Alimentar".to_string()]
        );
    }

    #[tokio::test]
    async fn test_select_patient_loads_both_views() {
        let (backend, ctx) = ready_context().await;
        let mut workspace = Workspace::new(ctx, backend.store.clone(), Catalog::default());
        workspace.open().await.unwrap();
        let patient_id = workspace.add_patient(patient_form("Ana")).await.unwrap().id;

        workspace.select_patient(patient_id).await.unwrap();
        workspace
            .add_evolution(NewEvolutionForm::new("medicina", "Stable"))
            .await
            .unwrap();
        workspace
            .register_document(NewDocumentForm {
                name: "Exame".to_string(),
                doc_type: "pdf".to_string(),
                category: "Médico".to_string(),
                file_url: "https://files.example.com/exame.pdf".to_string(),
            })
            .await
            .unwrap();

        workspace.select_patient(patient_id).await.unwrap();
        assert_eq!(workspace.selected_patient().map(|p| p.name.as_str()), Some("Ana"));
        assert_eq!(workspace.evolutions().evolutions().len(), 1);
        assert_eq!(workspace.documents().documents().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_selection_reports_error() {
        let (backend, ctx) = ready_context().await;
        let mut workspace = Workspace::new(ctx, backend.store.clone(), Catalog::default());
        backend.memory.set_offline(true);

        let result = workspace.select_patient(PatientId::generate()).await;
        assert!(result.is_err());
        assert!(workspace.evolutions().evolutions().is_empty());
    }
}
