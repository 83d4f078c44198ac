//! Patient roster view
//!
//! Holds the patient list, the new-patient form and the client-side search.

use crate::adapters::backend::RecordStore;
use crate::core::refresh::{Generation, LoadTicket};
use crate::core::session::AppContext;
use crate::domain::{NewPatient, Patient, PatientId, ProntuarioError, Result, UserId};
use chrono::NaiveDate;

/// Input fields of the new-patient form
///
/// All fields are raw text as typed; [`NewPatientForm::validate`] turns them
/// into an insert payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPatientForm {
    pub name: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub cpf: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub emergency_contact: String,
    pub medical_history: String,
}

impl NewPatientForm {
    /// Checks the required fields and builds the insert payload
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first missing or malformed field.
    pub fn validate(&self, created_by: UserId) -> Result<NewPatient> {
        let name = required("name", &self.name)?;
        let birth_date = required("birth_date", &self.birth_date)?;
        let cpf = required("cpf", &self.cpf)?;
        let phone = required("phone", &self.phone)?;

        let birth_date = NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d").map_err(|e| {
            ProntuarioError::Validation(format!(
                "birth_date '{birth_date}' is not a YYYY-MM-DD date: {e}"
            ))
        })?;

        Ok(NewPatient {
            name,
            birth_date,
            cpf,
            phone,
            email: optional(&self.email),
            address: optional(&self.address),
            emergency_contact: optional(&self.emergency_contact),
            medical_history: optional(&self.medical_history),
            created_by,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ProntuarioError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Patient list of the workspace
#[derive(Debug, Default)]
pub struct PatientRoster {
    patients: Vec<Patient>,
    form: NewPatientForm,
    generation: Generation,
}

impl PatientRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patients in the order the service returned them (name ascending),
    /// followed by patients created since the last refresh
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn form(&self) -> &NewPatientForm {
        &self.form
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation.issue()
    }

    /// Applies a fetch result if `ticket` is still the latest load
    ///
    /// A failed fetch is logged and leaves the list unchanged.
    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<Vec<Patient>>) -> Result<()> {
        if !self.generation.is_current(ticket) {
            crate::log_stale_response!("patients", ticket.value(), self.generation.current());
            return Ok(());
        }

        match result {
            Ok(patients) => {
                crate::log_rows_loaded!("patients", patients.len());
                self.patients = patients;
                Ok(())
            }
            Err(e) => {
                crate::log_remote_failure!("list_patients", &e);
                Err(e)
            }
        }
    }

    /// Reloads the whole list
    pub async fn refresh(&mut self, store: &dyn RecordStore, ctx: &AppContext) -> Result<()> {
        let ticket = self.begin_load();
        let result = store.list_patients(&ctx.session).await;
        self.apply_load(ticket, result)
    }

    /// Submits `form` as a new patient created by the signed-in user
    ///
    /// On success the stored row is appended and the form cleared. On failure
    /// the list is unchanged and the form keeps the submitted values.
    pub async fn create(
        &mut self,
        store: &dyn RecordStore,
        ctx: &AppContext,
        form: NewPatientForm,
    ) -> Result<&Patient> {
        self.form = form;
        let insert = self.form.validate(ctx.user.id)?;

        match store.insert_patient(&ctx.session, insert).await {
            Ok(patient) => {
                tracing::info!(patient_id = %patient.id, "Patient created");
                self.patients.push(patient);
                self.form = NewPatientForm::default();
                self.patients
                    .last()
                    .ok_or_else(|| ProntuarioError::Other("patient list is empty".to_string()))
            }
            Err(e) => {
                crate::log_remote_failure!("insert_patient", &e);
                Err(e)
            }
        }
    }

    /// Patients whose name contains `term` (any case) or whose CPF contains
    /// it verbatim; all patients for an empty term
    pub fn filter(&self, term: &str) -> Vec<&Patient> {
        self.patients.iter().filter(|p| p.matches(term)).collect()
    }

    pub fn select(&self, patient_id: &PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == *patient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{patient_form, ready_context};
    use crate::domain::BackendError;
    use test_case::test_case;

    #[test_case("", 3 ; "empty term keeps everything")]
    #[test_case("ANA", 2 ; "name match ignores case")]
    #[test_case("222.333", 1 ; "cpf matches verbatim")]
    #[test_case("222333", 0 ; "cpf without punctuation does not match")]
    #[test_case("zzz", 0 ; "no match")]
    #[tokio::test]
    async fn test_filter(term: &str, expected: usize) {
        let (backend, ctx) = ready_context().await;
        let mut roster = PatientRoster::new();
        for (name, cpf) in [
            ("Ana Souza", "111.111.111-11"),
            ("Mariana Reis", "999.888.777-66"),
            ("Carlos Dias", "111.222.333-44"),
        ] {
            let mut form = patient_form(name);
            form.cpf = cpf.to_string();
            roster.create(backend.store.as_ref(), &ctx, form).await.unwrap();
        }

        let filtered = roster.filter(term);
        assert_eq!(filtered.len(), expected);
        assert!(filtered.iter().all(|p| roster.patients().contains(*p)));
    }

    #[tokio::test]
    async fn test_create_appends_exactly_one() {
        let (backend, ctx) = ready_context().await;
        let mut roster = PatientRoster::new();
        roster.refresh(backend.store.as_ref(), &ctx).await.unwrap();
        assert!(roster.patients().is_empty());

        let created = roster
            .create(backend.store.as_ref(), &ctx, patient_form("Ana"))
            .await
            .unwrap()
            .clone();

        assert_eq!(roster.patients().len(), 1);
        assert_eq!(created.created_by, ctx.user.id);
        assert_eq!(roster.form(), &NewPatientForm::default());
        assert_eq!(roster.select(&created.id), Some(&created));
    }

    #[tokio::test]
    async fn test_create_failure_keeps_list_and_form() {
        let (backend, ctx) = ready_context().await;
        let mut roster = PatientRoster::new();
        roster
            .create(backend.store.as_ref(), &ctx, patient_form("Ana"))
            .await
            .unwrap();

        backend.memory.set_offline(true);
        let form = patient_form("Bruno");
        let result = roster.create(backend.store.as_ref(), &ctx, form.clone()).await;

        assert!(matches!(
            result,
            Err(ProntuarioError::Backend(BackendError::ConnectionFailed(_)))
        ));
        assert_eq!(roster.patients().len(), 1);
        assert_eq!(roster.form(), &form);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_list() {
        let (backend, ctx) = ready_context().await;
        let mut roster = PatientRoster::new();
        roster
            .create(backend.store.as_ref(), &ctx, patient_form("Ana"))
            .await
            .unwrap();

        backend.memory.set_offline(true);
        assert!(roster.refresh(backend.store.as_ref(), &ctx).await.is_err());
        assert_eq!(roster.patients().len(), 1);
    }

    #[test]
    fn test_validation() {
        let user = UserId::generate();
        let mut form = patient_form("Ana");
        form.phone = "  ".to_string();
        assert!(matches!(
            form.validate(user),
            Err(ProntuarioError::Validation(m)) if m.contains("phone")
        ));

        let mut form = patient_form("Ana");
        form.birth_date = "31/01/1990".to_string();
        assert!(form.validate(user).is_err());

        let mut form = patient_form("Ana");
        form.email = " ana@example.com ".to_string();
        let insert = form.validate(user).unwrap();
        assert_eq!(insert.email.as_deref(), Some("ana@example.com"));
        assert_eq!(insert.address, None);
    }

    #[test]
    fn test_stale_load_discarded() {
        let mut roster = PatientRoster::new();
        let stale = roster.begin_load();
        let current = roster.begin_load();
        roster.apply_load(current, Ok(Vec::new())).unwrap();
        roster
            .apply_load(stale, Err(BackendError::Timeout("slow".to_string()).into()))
            .unwrap();
        assert!(roster.patients().is_empty());
    }
}
