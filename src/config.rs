use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_hours: i64,
    pub cookie_expire_days: i64,
    pub cookie_secure: bool,
    pub upload_dir: PathBuf,
    /// Public origin used when rewriting stored filenames into asset URLs.
    /// Falls back to the request's Host header when unset.
    pub base_url: Option<String>,
    pub frontend_origin: Option<String>,
    pub max_body_bytes: usize,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_expires_hours = parse_or("JWT_EXPIRES_HOURS", 24);
        let cookie_expire_days = parse_or("COOKIE_EXPIRE_DAYS", 1);
        let cookie_secure = parse_or("COOKIE_SECURE", false);
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets"));
        let max_body_bytes = parse_or("MAX_BODY_BYTES", 10 * 1024 * 1024);

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_expires_hours,
            cookie_expire_days,
            cookie_secure,
            upload_dir,
            base_url: non_empty("BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            frontend_origin: non_empty("FRONTEND_ORIGIN"),
            max_body_bytes,
            mail_api_url: non_empty("MAIL_API_URL"),
            mail_api_key: non_empty("MAIL_API_KEY"),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@marketplace.local".to_string()),
        })
    }

    /// Configuration for tests and tooling that never touch the environment.
    pub fn for_tests(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_expires_hours: 1,
            cookie_expire_days: 1,
            cookie_secure: false,
            upload_dir: env::temp_dir().join("marketplace-test-assets"),
            base_url: Some("http://assets.test".to_string()),
            frontend_origin: None,
            max_body_bytes: 10 * 1024 * 1024,
            mail_api_url: None,
            mail_api_key: None,
            mail_from: "no-reply@marketplace.local".to_string(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
