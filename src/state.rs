use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    auth::repo::{MemoryUserStore, PgUserStore, UserStore},
    config::AppConfig,
    crops::repo::{CropStore, MemoryCropStore, PgCropStore},
    db,
    storage::{LocalStorage, StorageClient},
};

/// Handles shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub crops: Arc<dyn CropStore>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let (users, crops): (Arc<dyn UserStore>, Arc<dyn CropStore>) = match &config.database_url {
            Some(url) => {
                let pool = db::connect(url).await?;
                (
                    Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>,
                    Arc::new(PgCropStore::new(pool)) as Arc<dyn CropStore>,
                )
            }
            None => {
                warn!("DATABASE_URL not set; using the in-memory store, data is lost on restart");
                (
                    Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>,
                    Arc::new(MemoryCropStore::new()) as Arc<dyn CropStore>,
                )
            }
        };

        let local = LocalStorage::new(&config.upload_dir).await?;
        info!(dir = %local.root().display(), "upload directory ready");
        let storage = Arc::new(local) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(config, users, crops, storage))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        crops: Arc<dyn CropStore>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            config,
            users,
            crops,
            storage,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::{config::JwtConfig, storage::memory::MemoryStorage};

        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 7 * 24 * 60,
            },
            upload_dir: std::env::temp_dir().join("farmlink-test-uploads"),
            max_upload_bytes: 1024 * 1024,
            host: "127.0.0.1".into(),
            port: 0,
        });

        Self::from_parts(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryCropStore::new()),
            Arc::new(MemoryStorage::default()),
        )
    }
}
