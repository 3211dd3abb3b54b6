use parkspot_core::reservation::DEFAULT_HOLD_SECS;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks during shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Reservation hold before auto-release (default: `900`).
    pub reservation_hold_secs: u64,
    /// Postgres URL. Without it the in-process store is used.
    pub database_url: Option<String>,
    /// Base URL of the prediction service. Without it the admin
    /// prediction endpoints report the feature as unavailable.
    pub advisor_url: Option<String>,
    /// Advisor request timeout in seconds (default: `20`).
    pub advisor_timeout_secs: u64,
    /// Populate an empty store with sample locations (default: `true`).
    pub seed_sample_locations: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:9002`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                       |
    /// | `RESERVATION_HOLD_SECS`  | `900`                      |
    /// | `DATABASE_URL`           | unset (in-process store)   |
    /// | `ADVISOR_URL`            | unset (feature disabled)   |
    /// | `ADVISOR_TIMEOUT_SECS`   | `20`                       |
    /// | `SEED_SAMPLE_LOCATIONS`  | `true`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:9002".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_u64("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs = env_u64("SHUTDOWN_TIMEOUT_SECS", 30);
        let reservation_hold_secs = env_u64("RESERVATION_HOLD_SECS", DEFAULT_HOLD_SECS);
        let advisor_timeout_secs = env_u64(
            "ADVISOR_TIMEOUT_SECS",
            parkspot_advisor::client::DEFAULT_TIMEOUT_SECS,
        );

        let seed_sample_locations = std::env::var("SEED_SAMPLE_LOCATIONS")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            reservation_hold_secs,
            database_url: env_non_empty("DATABASE_URL"),
            advisor_url: env_non_empty("ADVISOR_URL"),
            advisor_timeout_secs,
            seed_sample_locations,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(v) => v
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid u64")),
        Err(_) => default,
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
