use serde::Deserialize;
use std::path::Path;

/// Environment-sourced settings. Secrets and per-deployment values live
/// here; loaded once at startup via `dotenvy` + `std::env`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: std::net::SocketAddr,
    pub log_filter: String,

    pub global_db_host: String,
    pub global_db_port: u16,
    pub global_db_name: String,
    pub global_db_user: String,
    pub global_db_password: String,

    pub tenant_db_host: String,
    pub tenant_db_port: u16,
    pub tenant_db_user: String,
    pub tenant_db_password: String,
}

impl Settings {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            bind_addr: std::env::var("BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| ([0, 0, 0, 0], 8080).into()),
            log_filter: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "camet_analytics_api=info,tower_http=info".to_string()),

            global_db_host: env_or("GLOBAL_DB_HOST", "localhost"),
            global_db_port: env_or("GLOBAL_DB_PORT", "3306").parse().unwrap_or(3306),
            global_db_name: env_or("GLOBAL_DB_NAME", "camet_global"),
            global_db_user: env_or("GLOBAL_DB_USER", "root"),
            global_db_password: env_or("GLOBAL_DB_PASSWORD", ""),

            tenant_db_host: env_or("TENANT_DB_HOST", "localhost"),
            tenant_db_port: env_or("TENANT_DB_PORT", "3306").parse().unwrap_or(3306),
            tenant_db_user: env_or("TENANT_DB_USER", "root"),
            tenant_db_password: env_or("TENANT_DB_PASSWORD", ""),
        }
    }

    pub fn global_db_url(&self) -> String {
        build_url(
            &self.global_db_user,
            &self.global_db_password,
            &self.global_db_host,
            self.global_db_port,
            &self.global_db_name,
        )
    }

    pub fn tenant_db_url(&self, db_name: &str) -> String {
        build_url(
            &self.tenant_db_user,
            &self.tenant_db_password,
            &self.tenant_db_host,
            self.tenant_db_port,
            db_name,
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn build_url(user: &str, password: &str, host: &str, port: u16, db_name: &str) -> String {
    let cred = if password.is_empty() {
        user.to_string()
    } else {
        format!("{user}:{password}")
    };
    format!("mysql://{cred}@{host}:{port}/{db_name}")
}

/// Operational tuning loaded from an optional `dashboard.toml`. Missing
/// file or missing sections fall back to the documented defaults; a
/// malformed file is a startup warning, not a fatal error.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub partitions: PartitionConfig,
    #[serde(default)]
    pub widgets: WidgetsConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig::default(),
            partitions: PartitionConfig::default(),
            widgets: WidgetsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_detection_batch")]
    pub detection_batch_size: u32,
    #[serde(default = "default_detection_cap")]
    pub detection_cap: u32,
    #[serde(default = "default_downtime_batch")]
    pub downtime_batch_size: u32,
    #[serde(default = "default_downtime_cap")]
    pub downtime_cap: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            detection_batch_size: default_detection_batch(),
            detection_cap: default_detection_cap(),
            downtime_batch_size: default_downtime_batch(),
            downtime_cap: default_downtime_cap(),
        }
    }
}

fn default_detection_batch() -> u32 {
    500_000
}
fn default_detection_cap() -> u32 {
    2_000_000
}
fn default_downtime_batch() -> u32 {
    10_000
}
fn default_downtime_cap() -> u32 {
    100_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartitionConfig {
    #[serde(default = "default_months_ahead")]
    pub months_ahead: u32,
    #[serde(default = "default_retention_months")]
    pub retention_months: u32,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            months_ahead: default_months_ahead(),
            retention_months: default_retention_months(),
        }
    }
}

fn default_months_ahead() -> u32 {
    3
}
fn default_retention_months() -> u32 {
    24
}

#[derive(Debug, Clone, Deserialize)]
pub struct WidgetsConfig {
    /// Minutes since last detection below which a line counts as "active"
    /// for `LineStatusIndicator`.
    #[serde(default = "default_active_minutes")]
    pub active_threshold_minutes: f64,
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            active_threshold_minutes: default_active_minutes(),
        }
    }
}

fn default_active_minutes() -> f64 {
    10.0
}

impl DashboardConfig {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("dashboard config not found at {}, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path).and_then(|s| {
            toml::from_str(&s).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        }) {
            Ok(config) => {
                tracing::info!("loaded dashboard config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("failed to parse {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }
}
