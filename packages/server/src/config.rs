use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// `development` attaches internal error detail to 5xx bodies.
    pub environment: String,
}

impl ServerConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Admin account created on first start when no admin exists yet.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory of the filesystem media host.
    pub media_dir: PathBuf,
    /// Prefix for renderable media URLs.
    pub public_base_url: String,
    pub max_photo_size: u64,
    pub max_media_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("server.environment", "production")?
            .set_default("auth.token_ttl_hours", 8)?
            .set_default("storage.media_dir", "./media")?
            .set_default("storage.public_base_url", "/media")?
            .set_default("storage.max_photo_size", 2 * 1024 * 1024)?
            .set_default("storage.max_media_size", 5 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SCHOOLSITE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("SCHOOLSITE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
