use std::net::IpAddr;
use std::path::PathBuf;

/// Paths reachable without a token. A trailing `/**` matches the prefix.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/error",
    "/api/auth/login",
    "/api/auth/register",
    "/uploads/**",
    "/assets/**",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub token_ttl_hours: i64,
    pub max_upload_size: usize,
    pub public_paths: Vec<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("CLIENTBOOK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CLIENTBOOK_HOST: {e}"))?;

        let port: u16 = env_or("CLIENTBOOK_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid CLIENTBOOK_PORT: {e}"))?;

        let upload_dir = PathBuf::from(env_or("CLIENTBOOK_UPLOAD_DIR", "./uploads"));

        let token_ttl_hours: i64 = env_or("CLIENTBOOK_TOKEN_TTL_HOURS", "24")
            .parse()
            .map_err(|e| format!("Invalid CLIENTBOOK_TOKEN_TTL_HOURS: {e}"))?;
        if token_ttl_hours <= 0 {
            return Err("CLIENTBOOK_TOKEN_TTL_HOURS must be positive".to_string());
        }

        let max_upload_size: usize = env_or("CLIENTBOOK_MAX_UPLOAD_SIZE", "5242880")
            .parse()
            .map_err(|e| format!("Invalid CLIENTBOOK_MAX_UPLOAD_SIZE: {e}"))?;

        let public_paths = match std::env::var("CLIENTBOOK_PUBLIC_PATHS") {
            Ok(raw) => parse_public_paths(&raw),
            Err(_) => default_public_paths(),
        };

        let log_level = env_or("CLIENTBOOK_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            upload_dir,
            token_ttl_hours,
            max_upload_size,
            public_paths,
            log_level,
        })
    }
}

pub fn default_public_paths() -> Vec<String> {
    DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect()
}

fn parse_public_paths(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
