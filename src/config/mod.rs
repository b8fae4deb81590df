use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL. When absent the process keeps documents in memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Header carrying the raw signed token
    pub auth_header: String,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub api_base: String,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub user_agent: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("API_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_AUTH_HEADER") {
            self.security.auth_header = v.to_ascii_lowercase();
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_MEMORY_KIB") {
            self.security.password_memory_kib = v.parse().unwrap_or(self.security.password_memory_kib);
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_ITERATIONS") {
            self.security.password_iterations = v.parse().unwrap_or(self.security.password_iterations);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // GitHub overrides
        if let Ok(v) = env::var("GITHUB_API_BASE") {
            self.github.api_base = v;
        }
        if let Ok(v) = env::var("GITHUB_CLIENT_ID") {
            self.github.client_id = Some(v);
        }
        if let Ok(v) = env::var("GITHUB_CLIENT_SECRET") {
            self.github.client_secret = Some(v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "devconnector-development-secret".to_string(),
                jwt_expiry_hours: 1000, // 3_600_000 seconds
                auth_header: "x-auth-token".to_string(),
                password_memory_kib: 19 * 1024,
                password_iterations: 2,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            github: GithubConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                auth_header: "x-auth-token".to_string(),
                password_memory_kib: 19 * 1024,
                password_iterations: 2,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            github: GithubConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                auth_header: "x-auth-token".to_string(),
                password_memory_kib: 64 * 1024,
                password_iterations: 3,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            github: GithubConfig::default(),
        }
    }

    /// Fast, in-memory configuration for tests. Password hashing is tuned
    /// down to the smallest Argon2 parameters.
    pub fn testing() -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = "test-secret".to_string();
        config.security.password_memory_kib = 8;
        config.security.password_iterations = 1;
        config.github.api_base = "http://127.0.0.1:9".to_string();
        config
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            client_id: None,
            client_secret: None,
            user_agent: "devconnector-api".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.security.auth_header, "x-auth-token");
        assert_eq!(config.security.jwt_expiry_hours * 3600, 3_600_000);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.environment, Environment::Production);
        assert!(config.database.max_connections > AppConfig::development().database.max_connections);
    }

    #[test]
    fn testing_config_uses_minimal_hash_cost() {
        let config = AppConfig::testing();
        assert_eq!(config.security.password_memory_kib, 8);
        assert_eq!(config.security.password_iterations, 1);
    }
}
