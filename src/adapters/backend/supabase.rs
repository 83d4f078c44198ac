//! Supabase-compatible HTTP backend
//!
//! Talks to GoTrue (`/auth/v1`) for sessions and PostgREST (`/rest/v1`) for
//! tables. Every request carries the public `apikey`; table requests also
//! carry the session's bearer token so row-level policies apply.

use super::traits::{AuthProvider, AuthSession, AuthUser, RecordStore, SignUpOutcome};
use crate::config::{BackendConfig, RetryConfig, SecretString};
use crate::domain::{
    BackendError, Document, DocumentTemplate, Evolution, NewDocument, NewEvolution, NewPatient,
    Patient, PatientId, Profile, ProfileUpsert, ProntuarioError, Result, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Columns selected for evolutions: every column plus the author's name
const EVOLUTION_SELECT: &str = "*,profiles(full_name)";

/// `Prefer` header for inserts that should echo the stored row
const RETURN_REPRESENTATION: &str = "return=representation";

/// `Prefer` header for the profile upsert
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// Supabase-compatible backend over HTTP
///
/// # Example
///
/// ```no_run
/// use prontuario::adapters::backend::SupabaseBackend;
/// use prontuario::config::{secret_string, BackendConfig};
///
/// # fn example() -> prontuario::domain::Result<()> {
/// let config = BackendConfig {
///     url: "https://xyzcompany.supabase.co".to_string(),
///     anon_key: Some(secret_string("public-anon-key".to_string())),
///     ..Default::default()
/// };
/// let backend = SupabaseBackend::new(&config)?;
/// # let _ = backend;
/// # Ok(())
/// # }
/// ```
pub struct SupabaseBackend {
    /// Project URL, always ending with `/`
    base_url: Url,

    /// Public API key sent as `apikey`
    anon_key: SecretString,

    /// HTTP client for making requests
    client: Client,

    /// Retry policy for reads
    retry: RetryConfig,
}

impl SupabaseBackend {
    /// Create a backend from configuration
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the URL or key is missing or the
    /// HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.url).map_err(|e| {
            ProntuarioError::Configuration(format!("Invalid backend.url '{}': {}", config.url, e))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let anon_key = config.anon_key.clone().ok_or_else(|| {
            ProntuarioError::Configuration("backend.anon_key is required".to_string())
        })?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            ProntuarioError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url,
            anon_key,
            client,
            retry: config.retry.clone(),
        })
    }

    /// Project URL this backend talks to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            ProntuarioError::Configuration(format!("Invalid endpoint path '{path}': {e}"))
        })
    }

    /// Request to an auth endpoint, carrying only the public key
    fn auth_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(&format!("auth/v1/{path}"))?;
        Ok(self
            .client
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret().as_str()))
    }

    /// Request to a table, carrying the public key and the session token
    fn table_request(
        &self,
        method: Method,
        table: &str,
        session: &AuthSession,
    ) -> Result<RequestBuilder> {
        let url = self.endpoint(&format!("rest/v1/{table}"))?;
        Ok(self
            .client
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret().as_str())
            .bearer_auth(session.access_token.expose_secret().as_str()))
    }

    /// Retry an idempotent read with exponential backoff
    ///
    /// Only transient failures (connection, timeout, 5xx) are retried.
    async fn retry_read<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    let transient = matches!(&e, ProntuarioError::Backend(b) if b.is_transient());
                    if !transient || attempt >= max_retries {
                        return Err(e);
                    }

                    let delay_ms = self.retry.delay_for_attempt(attempt);
                    crate::log_retry_attempt!(attempt, max_retries, delay_ms, &e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        session: &AuthSession,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        self.retry_read(|| async move {
            let request = self
                .table_request(Method::GET, table, session)?
                .query(query);
            let resp = send(request).await?;
            decode::<Vec<T>>(resp).await
        })
        .await
    }

    async fn insert_row<B, T>(
        &self,
        table: &str,
        session: &AuthSession,
        body: &B,
        select: Option<&str>,
    ) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .table_request(Method::POST, table, session)?
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body);
        if let Some(select) = select {
            request = request.query(&[("select", select)]);
        }
        let resp = send(request).await?;
        first_row(decode::<Vec<T>>(resp).await?, table)
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<AuthSession> {
        let request = self
            .auth_request(Method::POST, "token")?
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let resp = send(request).await.map_err(credentials_error)?;
        let token: TokenResponse = decode(resp).await?;
        token.into_session(Utc::now())
    }
}

#[async_trait]
impl AuthProvider for SupabaseBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession> {
        tracing::debug!(email = %email, "Signing in with password");
        self.token_grant(
            "password",
            serde_json::json!({
                "email": email,
                "password": password.expose_secret().as_str(),
            }),
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<SignUpOutcome> {
        let request = self
            .auth_request(Method::POST, "signup")?
            .json(&serde_json::json!({
                "email": email,
                "password": password.expose_secret().as_str(),
            }));
        let resp = send(request).await.map_err(credentials_error)?;
        let body: serde_json::Value = decode(resp).await?;

        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)
                .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
            Ok(SignUpOutcome::SignedIn(token.into_session(Utc::now())?))
        } else {
            Ok(SignUpOutcome::ConfirmationRequired {
                email: email.to_string(),
            })
        }
    }

    async fn refresh_session(&self, refresh_token: &SecretString) -> Result<AuthSession> {
        tracing::debug!("Refreshing access token");
        self.token_grant(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token.expose_secret().as_str() }),
        )
        .await
    }

    async fn get_user(&self, session: &AuthSession) -> Result<AuthUser> {
        self.retry_read(|| async move {
            let request = self
                .auth_request(Method::GET, "user")?
                .bearer_auth(session.access_token.expose_secret().as_str());
            let resp = send(request).await?;
            let user: UserPayload = decode(resp).await?;
            Ok(user.into())
        })
        .await
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<()> {
        let request = self
            .auth_request(Method::POST, "logout")?
            .bearer_auth(session.access_token.expose_secret().as_str());
        send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SupabaseBackend {
    async fn get_profile(
        &self,
        session: &AuthSession,
        user_id: &UserId,
    ) -> Result<Option<Profile>> {
        let rows: Vec<Profile> = self
            .select_rows(
                "profiles",
                session,
                &[("select", "*".to_string()), ("id", format!("eq.{user_id}"))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(
        &self,
        session: &AuthSession,
        profile: ProfileUpsert,
    ) -> Result<Profile> {
        let request = self
            .table_request(Method::POST, "profiles", session)?
            .query(&[("on_conflict", "id")])
            .header("Prefer", MERGE_DUPLICATES)
            .json(&profile);
        let resp = send(request).await?;
        first_row(decode::<Vec<Profile>>(resp).await?, "profiles")
    }

    async fn list_patients(&self, session: &AuthSession) -> Result<Vec<Patient>> {
        self.select_rows(
            "patients",
            session,
            &[("select", "*".to_string()), ("order", "name.asc".to_string())],
        )
        .await
    }

    async fn insert_patient(&self, session: &AuthSession, patient: NewPatient) -> Result<Patient> {
        self.insert_row("patients", session, &patient, None).await
    }

    async fn list_evolutions(
        &self,
        session: &AuthSession,
        patient_id: &PatientId,
    ) -> Result<Vec<Evolution>> {
        self.select_rows(
            "evolutions",
            session,
            &[
                ("select", EVOLUTION_SELECT.to_string()),
                ("patient_id", format!("eq.{patient_id}")),
                ("order", "date.desc".to_string()),
            ],
        )
        .await
    }

    async fn insert_evolution(
        &self,
        session: &AuthSession,
        evolution: NewEvolution,
    ) -> Result<Evolution> {
        self.insert_row("evolutions", session, &evolution, Some(EVOLUTION_SELECT))
            .await
    }

    async fn list_documents(
        &self,
        session: &AuthSession,
        patient_id: &PatientId,
    ) -> Result<Vec<Document>> {
        self.select_rows(
            "documents",
            session,
            &[
                ("select", "*".to_string()),
                ("patient_id", format!("eq.{patient_id}")),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn insert_document(
        &self,
        session: &AuthSession,
        document: NewDocument,
    ) -> Result<Document> {
        self.insert_row("documents", session, &document, None).await
    }

    async fn list_document_templates(
        &self,
        session: &AuthSession,
    ) -> Result<Vec<DocumentTemplate>> {
        self.select_rows(
            "document_templates",
            session,
            &[("select", "*".to_string()), ("order", "name.asc".to_string())],
        )
        .await
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserPayload,
}

impl TokenResponse {
    /// Builds the session, taking the expiry from `expires_at` when present
    /// and from `now + expires_in` otherwise
    fn into_session(self, now: DateTime<Utc>) -> Result<AuthSession> {
        let expires_at = match self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        {
            Some(at) => at,
            None => ChronoDuration::try_seconds(self.expires_in)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .ok_or_else(|| {
                    BackendError::InvalidResponse(format!(
                        "expires_in {} is out of range",
                        self.expires_in
                    ))
                })?,
        };

        Ok(AuthSession {
            access_token: crate::config::secret_string(self.access_token),
            refresh_token: crate::config::secret_string(self.refresh_token),
            expires_at,
            user: self.user.into(),
        })
    }
}

/// User object returned by the auth service
#[derive(Debug, Deserialize)]
struct UserPayload {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserPayload> for AuthUser {
    fn from(user: UserPayload) -> Self {
        AuthUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }
    }
}

async fn send(request: RequestBuilder) -> std::result::Result<Response, BackendError> {
    let resp = request.send().await.map_err(transport_error)?;
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    resp.json::<T>()
        .await
        .map_err(|e| BackendError::InvalidResponse(e.to_string()).into())
}

fn first_row<T>(rows: Vec<T>, table: &str) -> Result<T> {
    rows.into_iter().next().ok_or_else(|| {
        BackendError::InvalidResponse(format!("write to '{table}' returned no rows")).into()
    })
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else {
        BackendError::ConnectionFailed(err.to_string())
    }
}

/// Maps an HTTP error status to a backend error
fn status_error(status: StatusCode, body: &str) -> BackendError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized(message),
        StatusCode::FORBIDDEN => BackendError::Forbidden(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::CONFLICT => BackendError::Conflict(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => BackendError::Timeout(message),
        s if s.is_server_error() => BackendError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => BackendError::ClientError {
            status: s.as_u16(),
            message,
        },
    }
}

/// Rejected credentials on auth endpoints become `Authentication` errors
fn credentials_error(err: BackendError) -> ProntuarioError {
    match err {
        BackendError::Unauthorized(message) => ProntuarioError::Authentication(message),
        BackendError::ClientError { status, message } if status == 400 || status == 422 => {
            ProntuarioError::Authentication(message)
        }
        other => ProntuarioError::Backend(other),
    }
}

/// Best-effort human message from a PostgREST or GoTrue error body
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    if body.is_empty() {
        "empty response body".to_string()
    } else {
        body.chars().take(200).collect()
    }
}
