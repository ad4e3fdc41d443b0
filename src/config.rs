use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api/v1";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub links: LinksConfig,
    pub submission: SubmissionConfig,
    pub attachments: AttachmentConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    #[serde(default)]
    pub additional_base_paths: Vec<String>,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Redis,
    Postgres,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub redis_url: String,
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: u64,
}

/// Where the driver link and the QR image point to.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LinksConfig {
    pub public_base_url: String,
    pub qr_service_url: String,
    pub qr_size: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubmissionConfig {
    /// Artificial pause before a driver submission completes.
    pub simulated_delay_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AttachmentConfig {
    pub max_bytes: usize,
    pub allowed_types: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportConfig {
    pub escape_fields: bool,
    pub timezone: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            additional_base_paths: Vec::new(),
            enable_swagger: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            database_url: "postgres://localhost/truck_check".to_string(),
            max_connections: 8,
            acquire_timeout: 5,
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:3000".to_string(),
            qr_service_url: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
            qr_size: 200,
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { simulated_delay_ms: 2000 }
    }
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            allowed_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/webp".to_string(),
                "image/gif".to_string(),
            ],
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            escape_fields: false,
            timezone: "Europe/Bucharest".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. TruckCheck.toml (base configuration file)
    /// 3. Environment variables prefixed with TRUCKCHECK_ (`__` separates sections)
    /// 4. REDIS_URL / DATABASE_URL shortcuts
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("TruckCheck.toml").nested())
            .merge(Env::prefixed("TRUCKCHECK_").split("__"))
            .merge(Env::raw().only(&["REDIS_URL"]).map(|_| "storage.redis_url".into()))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "storage.database_url".into()))
    }

    /// Configuration used by route tests: in-memory storage and no artificial latency.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let mut config = Config::default();
        config.submission.simulated_delay_ms = 0;
        config.api.enable_swagger = false;
        config
    }
}
