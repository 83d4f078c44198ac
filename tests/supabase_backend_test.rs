//! Integration tests for the Supabase HTTP backend against a mock server

use chrono::{Duration, Utc};
use mockito::{Matcher, Server};
use prontuario::adapters::backend::{
    AuthProvider, AuthSession, AuthUser, RecordStore, SignUpOutcome, SupabaseBackend,
};
use prontuario::config::{secret_string, BackendConfig, RetryConfig};
use prontuario::domain::{BackendError, NewPatient, PatientId, ProntuarioError, UserId};
use secrecy::ExposeSecret;

const USER_ID: &str = "3d44b88c-4199-4bad-97dc-d78268e01398";
const PATIENT_ID: &str = "7d44b88c-4199-4bad-97dc-d78268e01398";

fn backend(url: &str) -> SupabaseBackend {
    let config = BackendConfig {
        url: url.to_string(),
        anon_key: Some(secret_string("anon-key".to_string())),
        timeout_seconds: 5,
        retry: RetryConfig {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        ..Default::default()
    };
    SupabaseBackend::new(&config).unwrap()
}

fn session() -> AuthSession {
    AuthSession {
        access_token: secret_string("access-token".to_string()),
        refresh_token: secret_string("refresh-token".to_string()),
        expires_at: Utc::now() + Duration::hours(1),
        user: AuthUser {
            id: USER_ID.parse().unwrap(),
            email: "ana@example.com".to_string(),
        },
    }
}

fn patient_json() -> serde_json::Value {
    serde_json::json!({
        "id": PATIENT_ID,
        "name": "Ana Souza",
        "birth_date": "1980-06-15",
        "cpf": "123.456.789-00",
        "phone": "+55 11 99999-0000",
        "email": null,
        "address": null,
        "emergency_contact": null,
        "medical_history": null,
        "created_by": USER_ID,
        "created_at": "2024-01-01T10:00:00Z",
        "updated_at": "2024-01-01T10:00:00Z"
    })
}

fn token_json() -> serde_json::Value {
    serde_json::json!({
        "access_token": "new-access",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "new-refresh",
        "user": { "id": USER_ID, "email": "ana@example.com" }
    })
}

#[tokio::test]
async fn test_sign_in_posts_password_grant() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .match_header("apikey", "anon-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "ana@example.com",
            "password": "s3cret"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_json().to_string())
        .create_async()
        .await;

    let session = backend(&server.url())
        .sign_in_with_password("ana@example.com", &secret_string("s3cret".to_string()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(session.access_token.expose_secret().as_str(), "new-access");
    assert_eq!(session.user.email, "ana@example.com");
    assert!(session.expires_at > Utc::now() + Duration::minutes(59));
}

#[tokio::test]
async fn test_sign_in_rejected_credentials() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
        .expect(1)
        .create_async()
        .await;

    let result = backend(&server.url())
        .sign_in_with_password("ana@example.com", &secret_string("wrong".to_string()))
        .await;

    mock.assert_async().await;
    match result {
        Err(ProntuarioError::Authentication(message)) => {
            assert_eq!(message, "Invalid login credentials")
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sign_up_without_session_requires_confirmation() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/v1/signup")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "id": USER_ID, "email": "ana@example.com" }).to_string())
        .create_async()
        .await;

    let outcome = backend(&server.url())
        .sign_up("ana@example.com", &secret_string("s3cret".to_string()))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        SignUpOutcome::ConfirmationRequired { email } if email == "ana@example.com"
    ));
}

#[tokio::test]
async fn test_list_patients_sends_key_and_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/patients")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("order".into(), "name.asc".into()),
        ]))
        .match_header("apikey", "anon-key")
        .match_header("authorization", "Bearer access-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!([patient_json()]).to_string())
        .create_async()
        .await;

    let patients = backend(&server.url())
        .list_patients(&session())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].name, "Ana Souza");
    assert_eq!(patients[0].email, None);
}

#[tokio::test]
async fn test_list_evolutions_joins_author_and_filters_patient() {
    let mut server = Server::new_async().await;
    let row = serde_json::json!({
        "id": "1d44b88c-4199-4bad-97dc-d78268e01398",
        "patient_id": PATIENT_ID,
        "professional_id": USER_ID,
        "profession": "fisioterapia",
        "date": "2024-03-01",
        "content": "Gait training",
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-01T10:00:00Z",
        "profiles": { "full_name": "Bia Lima" }
    });
    let mock = server
        .mock("GET", "/rest/v1/evolutions")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*,profiles(full_name)".into()),
            Matcher::UrlEncoded("patient_id".into(), format!("eq.{PATIENT_ID}")),
            Matcher::UrlEncoded("order".into(), "date.desc".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!([row]).to_string())
        .create_async()
        .await;

    let patient_id: PatientId = PATIENT_ID.parse().unwrap();
    let evolutions = backend(&server.url())
        .list_evolutions(&session(), &patient_id)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(evolutions[0].author_name(), Some("Bia Lima"));
}

#[tokio::test]
async fn test_missing_profile_is_none() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/profiles")
        .match_query(Matcher::UrlEncoded("id".into(), format!("eq.{USER_ID}")))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let user_id: UserId = USER_ID.parse().unwrap();
    let profile = backend(&server.url())
        .get_profile(&session(), &user_id)
        .await
        .unwrap();
    assert!(profile.is_none());
}

#[tokio::test]
async fn test_reads_retry_transient_failures() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/patients")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(3)
        .create_async()
        .await;

    let result = backend(&server.url()).list_patients(&session()).await;

    mock.assert_async().await;
    assert!(matches!(
        result,
        Err(ProntuarioError::Backend(BackendError::ServerError { status: 503, .. }))
    ));
}

#[tokio::test]
async fn test_writes_are_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/patients")
        .match_header("prefer", "return=representation")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let insert = NewPatient {
        name: "Ana Souza".to_string(),
        birth_date: chrono::NaiveDate::from_ymd_opt(1980, 6, 15).unwrap(),
        cpf: "123.456.789-00".to_string(),
        phone: "+55 11 99999-0000".to_string(),
        email: None,
        address: None,
        emergency_contact: None,
        medical_history: None,
        created_by: USER_ID.parse().unwrap(),
    };
    let result = backend(&server.url())
        .insert_patient(&session(), insert)
        .await;

    mock.assert_async().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_row_policy_denial_is_forbidden_and_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/documents")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code":"42501","message":"permission denied for table documents"}"#)
        .expect(1)
        .create_async()
        .await;

    let patient_id: PatientId = PATIENT_ID.parse().unwrap();
    let result = backend(&server.url())
        .list_documents(&session(), &patient_id)
        .await;

    mock.assert_async().await;
    match result {
        Err(ProntuarioError::Backend(BackendError::Forbidden(message))) => {
            assert!(message.contains("permission denied"))
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upsert_profile_merges_on_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/profiles")
        .match_query(Matcher::UrlEncoded("on_conflict".into(), "id".into()))
        .match_header(
            "prefer",
            "resolution=merge-duplicates,return=representation",
        )
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!([{
                "id": USER_ID,
                "email": "ana@example.com",
                "full_name": "Dra. Ana",
                "profession": "medicina",
                "role": "professional",
                "created_at": "2024-01-01T10:00:00Z",
                "updated_at": "2024-01-01T10:00:00Z"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let upsert = prontuario::domain::ProfileUpsert {
        id: USER_ID.parse().unwrap(),
        email: "ana@example.com".to_string(),
        full_name: "Dra. Ana".to_string(),
        profession: prontuario::domain::Profession::new("medicina").unwrap(),
        role: prontuario::domain::Role::Professional,
    };
    let profile = backend(&server.url())
        .upsert_profile(&session(), upsert)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(profile.full_name, "Dra. Ana");
}
