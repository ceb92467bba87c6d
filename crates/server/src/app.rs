use std::{sync::Arc, time::Duration};

use db::DBService;
use db::models::remote_config::RemoteConfig;
use services::services::remote_source::AzureBoardsClient;
use utils_jwt::JwtService;

const DEFAULT_JWT_SECRET: &str = "dev-secret-change-in-production";
const REMOTE_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    db: DBService,
    jwt: Arc<JwtService>,
    http_client: reqwest::Client,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using an insecure default");
            DEFAULT_JWT_SECRET.to_string()
        });
        let db = DBService::new().await?;
        Self::with_db(db, &secret)
    }

    pub fn with_db(db: DBService, jwt_secret: &str) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REMOTE_SOURCE_TIMEOUT)
            .build()?;

        Ok(Self {
            db,
            jwt: Arc::new(JwtService::new(jwt_secret)),
            http_client,
        })
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Client for the configured external tracker. The shared HTTP client
    /// carries a hard request timeout so a stuck remote cannot block a sync
    /// indefinitely.
    pub fn boards_client(&self, config: &RemoteConfig) -> AzureBoardsClient {
        AzureBoardsClient::new(
            self.http_client.clone(),
            &config.organization_url,
            &config.access_token,
        )
    }
}
