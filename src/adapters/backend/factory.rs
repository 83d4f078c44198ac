//! Backend factory
//!
//! Builds the auth and record-store handles for the configured target. Both
//! handles share one underlying client.

use super::memory::MemoryBackend;
use super::supabase::SupabaseBackend;
use super::traits::{AuthProvider, RecordStore};
use crate::config::{BackendConfig, BackendTarget};
use crate::domain::Result;
use std::sync::Arc;

/// Auth and table access for one backend
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn RecordStore>,
}

impl Backend {
    /// Wraps a single client that implements both traits
    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: AuthProvider + RecordStore + 'static,
    {
        Self {
            auth: backend.clone() as Arc<dyn AuthProvider>,
            store: backend as Arc<dyn RecordStore>,
        }
    }
}

/// Create the backend selected by `config.target`
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or a memory snapshot
/// cannot be read.
pub fn create_backend(config: &BackendConfig) -> Result<Backend> {
    match config.target {
        BackendTarget::Supabase => {
            tracing::info!(url = %config.url, "Creating Supabase backend");
            let client = SupabaseBackend::new(config)?;
            Ok(Backend::from_shared(Arc::new(client)))
        }
        BackendTarget::Memory => {
            let client = match &config.data_path {
                Some(path) => {
                    tracing::info!(path = %path, "Creating memory backend with snapshot");
                    MemoryBackend::with_snapshot(path)?
                }
                None => {
                    tracing::info!("Creating memory backend");
                    MemoryBackend::new()
                }
            };
            Ok(Backend::from_shared(Arc::new(client)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_create_memory_backend() {
        let config = BackendConfig {
            target: BackendTarget::Memory,
            ..Default::default()
        };
        assert!(create_backend(&config).is_ok());
    }

    #[test]
    fn test_create_supabase_backend() {
        let config = BackendConfig {
            url: "https://demo.supabase.co".to_string(),
            anon_key: Some(secret_string("anon".to_string())),
            ..Default::default()
        };
        assert!(create_backend(&config).is_ok());
    }

    #[test]
    fn test_create_supabase_backend_without_url_fails() {
        let config = BackendConfig::default();
        assert!(create_backend(&config).is_err());
    }
}
