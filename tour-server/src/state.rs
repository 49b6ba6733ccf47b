//! Shared application state

use sqlx::PgPool;

use crate::config::Config;
use crate::sms::SmsClient;
use crate::storage::Storage;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Uploaded-file store rooted at the configured upload directory
    pub storage: Storage,
    /// Outbound SMS gateway client
    pub sms: SmsClient,
}

impl AppState {
    /// Connect to the database, run migrations and build the state.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let storage = Storage::new(&config.upload_dir)?;

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            storage,
            sms: SmsClient::from_config(config),
        })
    }
}
