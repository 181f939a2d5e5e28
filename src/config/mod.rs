use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub maintenance_interval_secs: u64,
    pub seed_admin_password: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            db_path: get_env("DB_PATH", "/data/condodesk.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            jwt_secret: get_env("JWT_SECRET", ""),
            access_token_ttl_secs: get_env("ACCESS_TOKEN_TTL_SECS", "3600")
                .parse()
                .unwrap_or(3600),
            refresh_token_ttl_secs: get_env("REFRESH_TOKEN_TTL_SECS", "2592000")
                .parse()
                .unwrap_or(2_592_000),
            maintenance_interval_secs: get_env("MAINTENANCE_INTERVAL_SECS", "60")
                .parse()
                .unwrap_or(60),
            seed_admin_password: get_env("SEED_ADMIN_PASSWORD", "admin"),
        }
    }

    /// Configuration for in-process tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            db_max_connections: 1,
            listen_addr: "127.0.0.1:0".to_string(),
            jwt_secret: "test-secret".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 86400,
            maintenance_interval_secs: 60,
            seed_admin_password: "admin".to_string(),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
