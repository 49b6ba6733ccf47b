//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT signing secret for bearer tokens
    pub jwt_secret: String,
    /// Root directory for uploaded files
    pub upload_dir: String,
    /// SMS gateway base URL
    pub sms_api_url: String,
    /// SMS gateway account key
    pub sms_account_key: String,
    /// SMS gateway route
    pub sms_route: String,
    /// SMS sender id
    pub sms_sender: String,
    /// DLT template id for payment reminders
    pub sms_template_id: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            sms_api_url: std::env::var("SMS_API_URL")
                .unwrap_or_else(|_| "http://site.ping4sms.com/api/smsapi".into()),
            sms_account_key: Self::require_secret("SMS_ACCOUNT_KEY", &environment)?,
            sms_route: std::env::var("SMS_ROUTE").unwrap_or_else(|_| "default".into()),
            sms_sender: std::env::var("SMS_SENDER").unwrap_or_else(|_| "TOURAD".into()),
            sms_template_id: std::env::var("SMS_TEMPLATE_ID").unwrap_or_default(),
            environment,
        })
    }
}
