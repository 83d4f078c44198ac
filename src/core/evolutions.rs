//! Evolution log view
//!
//! Progress notes of the active patient, newest clinical date first, with a
//! profession filter.

use crate::adapters::backend::RecordStore;
use crate::core::catalog::Catalog;
use crate::core::refresh::{Generation, LoadTicket};
use crate::core::session::AppContext;
use crate::domain::{Evolution, NewEvolution, PatientId, Profession, ProntuarioError, Result};
use chrono::{Local, NaiveDate};

/// Input fields of the new-evolution form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvolutionForm {
    pub profession: String,
    /// Clinical date of the note
    pub date: NaiveDate,
    pub content: String,
}

impl Default for NewEvolutionForm {
    /// Empty form dated today
    fn default() -> Self {
        Self {
            profession: String::new(),
            date: Local::now().date_naive(),
            content: String::new(),
        }
    }
}

impl NewEvolutionForm {
    pub fn new(profession: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            profession: profession.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    fn to_insert(
        &self,
        patient_id: PatientId,
        ctx: &AppContext,
        catalog: &Catalog,
    ) -> Result<NewEvolution> {
        let profession = Profession::new(self.profession.as_str())
            .map_err(|_| ProntuarioError::Validation("profession is required".to_string()))?;
        if !catalog.contains_profession(profession.as_str()) {
            return Err(ProntuarioError::Validation(format!(
                "Unknown profession '{profession}'"
            )));
        }

        let content = self.content.trim();
        if content.is_empty() {
            return Err(ProntuarioError::Validation("content is required".to_string()));
        }

        Ok(NewEvolution {
            patient_id,
            professional_id: ctx.user.id,
            profession,
            date: self.date,
            content: content.to_string(),
        })
    }
}

/// Evolutions of the active patient
#[derive(Debug, Default)]
pub struct EvolutionLog {
    patient_id: Option<PatientId>,
    evolutions: Vec<Evolution>,
    form: NewEvolutionForm,
    profession_filter: String,
    generation: Generation,
}

impl EvolutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patient_id(&self) -> Option<PatientId> {
        self.patient_id
    }

    /// All loaded evolutions, newest clinical date first
    pub fn evolutions(&self) -> &[Evolution] {
        &self.evolutions
    }

    pub fn form(&self) -> &NewEvolutionForm {
        &self.form
    }

    /// Starts loading `patient_id`, superseding any load in flight
    ///
    /// The list is emptied right away so rows of the previous patient are
    /// never shown under the new one.
    pub fn begin_load(&mut self, patient_id: PatientId) -> LoadTicket {
        if self.patient_id != Some(patient_id) {
            self.evolutions.clear();
        }
        self.patient_id = Some(patient_id);
        self.generation.issue()
    }

    /// Applies a fetch result if it is the latest load of the active patient
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        patient_id: PatientId,
        result: Result<Vec<Evolution>>,
    ) -> Result<()> {
        if !self.generation.is_current(ticket) || self.patient_id != Some(patient_id) {
            crate::log_stale_response!("evolutions", ticket.value(), self.generation.current());
            return Ok(());
        }

        match result {
            Ok(evolutions) => {
                crate::log_rows_loaded!("evolutions", evolutions.len());
                self.evolutions = evolutions;
                Ok(())
            }
            Err(e) => {
                crate::log_remote_failure!("list_evolutions", &e);
                Err(e)
            }
        }
    }

    /// Loads the evolutions of `patient_id`, making it the active patient
    pub async fn refresh(
        &mut self,
        store: &dyn RecordStore,
        ctx: &AppContext,
        patient_id: PatientId,
    ) -> Result<()> {
        let ticket = self.begin_load(patient_id);
        let result = store.list_evolutions(&ctx.session, &patient_id).await;
        self.apply_load(ticket, patient_id, result)
    }

    /// Records a note for the active patient
    ///
    /// The stored row, with the author's name, becomes the first entry and
    /// the form is reset. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `NoActivePatient` if no patient is loaded, `Validation` for an
    /// incomplete form, or the backend error.
    pub async fn create(
        &mut self,
        store: &dyn RecordStore,
        ctx: &AppContext,
        catalog: &Catalog,
        form: NewEvolutionForm,
    ) -> Result<&Evolution> {
        let patient_id = self.patient_id.ok_or(ProntuarioError::NoActivePatient)?;
        self.form = form;
        let insert = self.form.to_insert(patient_id, ctx, catalog)?;

        match store.insert_evolution(&ctx.session, insert).await {
            Ok(evolution) => {
                tracing::info!(
                    evolution_id = %evolution.id,
                    patient_id = %patient_id,
                    "Evolution recorded"
                );
                self.evolutions.insert(0, evolution);
                self.form = NewEvolutionForm::default();
                self.evolutions
                    .first()
                    .ok_or_else(|| ProntuarioError::Other("evolution list is empty".to_string()))
            }
            Err(e) => {
                crate::log_remote_failure!("insert_evolution", &e);
                Err(e)
            }
        }
    }

    /// Evolutions of exactly `profession`; all of them for `""`
    pub fn filter_by_profession(&self, profession: &str) -> Vec<&Evolution> {
        self.evolutions
            .iter()
            .filter(|e| profession.is_empty() || e.profession.as_str() == profession)
            .collect()
    }

    pub fn set_profession_filter(&mut self, profession: impl Into<String>) {
        self.profession_filter = profession.into();
    }

    /// Evolutions passing the current profession filter
    pub fn visible(&self) -> Vec<&Evolution> {
        self.filter_by_profession(&self.profession_filter)
    }
}
