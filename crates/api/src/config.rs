//! HTTP server configuration.
//!
//! Engine tunables (window sizes, epsilon bounds, deadlines) live in
//! `modelpick_engine::EngineConfig`; this covers only the serving layer.

/// Listener, CORS and timeout settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Base URL of the external feature store; `None` disables lookups
    /// and every request scores from registry data alone.
    pub feature_store_url: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `CORS_ORIGINS`, `REQUEST_TIMEOUT_SECS` and
    /// `FEATURE_STORE_URL` from the environment, defaulting to a local
    /// dev setup (0.0.0.0:3000, Vite origin, 30s timeout, no store).
    ///
    /// Malformed numeric values abort startup rather than limping along
    /// on a half-read config.
    pub fn from_env() -> Self {
        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let feature_store_url = std::env::var("FEATURE_STORE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port,
            cors_origins,
            request_timeout_secs,
            feature_store_url,
        }
    }
}
