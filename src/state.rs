use crate::auth::repo::CredentialStore;
use crate::config::AppConfig;
use crate::contacts::repo::ContactStore;
use crate::session::SessionReconciler;
use crate::storage::DataDir;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: Arc<CredentialStore>,
    pub sessions: Arc<SessionReconciler>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        tokio::fs::create_dir_all(config.data_dir.join("contacts")).await?;
        tracing::info!(data_dir = %config.data_dir.display(), "using data directory");

        Ok(Self::from_parts(config))
    }

    pub fn from_parts(config: Arc<AppConfig>) -> Self {
        let data = DataDir::new(config.data_dir.clone());
        let ttl = config.jwt.session_ttl();
        Self {
            credentials: Arc::new(CredentialStore::new(data.clone())),
            sessions: Arc::new(SessionReconciler::new(ContactStore::new(data), ttl)),
            config,
        }
    }

    #[cfg(test)]
    pub fn fake(data_dir: &std::path::Path) -> Self {
        let config = Arc::new(AppConfig {
            data_dir: data_dir.to_path_buf(),
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
        });
        Self::from_parts(config)
    }
}
