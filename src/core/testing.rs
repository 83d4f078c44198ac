//! Fixtures shared by the view tests

use crate::adapters::backend::{AuthProvider, MemoryBackend, RecordStore, SignUpOutcome};
use crate::config::secret_string;
use crate::core::roster::NewPatientForm;
use crate::core::session::AppContext;
use crate::domain::{Profession, ProfileUpsert, Role};
use std::sync::Arc;

pub(crate) struct TestBackend {
    pub memory: Arc<MemoryBackend>,
    pub store: Arc<dyn RecordStore>,
}

/// Signed-in clinician with a `medicina` profile
pub(crate) async fn ready_context() -> (TestBackend, AppContext) {
    let memory = Arc::new(MemoryBackend::new());
    let ctx = clinician(&memory, "ana@example.com", "Dra. Ana", "medicina").await;
    let store = memory.clone() as Arc<dyn RecordStore>;
    (TestBackend { memory, store }, ctx)
}

pub(crate) async fn clinician(
    memory: &MemoryBackend,
    email: &str,
    full_name: &str,
    profession: &str,
) -> AppContext {
    let session = match memory
        .sign_up(email, &secret_string("s3cret".to_string()))
        .await
        .unwrap()
    {
        SignUpOutcome::SignedIn(session) => session,
        other => panic!("unexpected sign-up outcome: {other:?}"),
    };
    let profile = memory
        .upsert_profile(
            &session,
            ProfileUpsert {
                id: session.user.id,
                email: email.to_string(),
                full_name: full_name.to_string(),
                profession: Profession::new(profession).unwrap(),
                role: Role::Professional,
            },
        )
        .await
        .unwrap();

    AppContext {
        user: session.user.clone(),
        session,
        profile,
    }
}

pub(crate) fn patient_form(name: &str) -> NewPatientForm {
    NewPatientForm {
        name: name.to_string(),
        birth_date: "1980-06-15".to_string(),
        cpf: "123.456.789-00".to_string(),
        phone: "(11) 98888-7777".to_string(),
        ..Default::default()
    }
}
