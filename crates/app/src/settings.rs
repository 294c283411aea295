//! Settings for the `kasir` binary, read from `settings.toml` in the working
//! directory and overridden by `KASIR__<SECTION>__<KEY>` environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    /// IANA time zone name.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
            timezone: default_timezone(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// `database = "memory"` or `database = { sqlite = "kasir.db" }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

/// Account created on first start when the username is not taken yet.
#[derive(Debug, Deserialize)]
pub struct Bootstrap {
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_full_name: Option<String>,
}

impl Bootstrap {
    pub fn default_admin(self) -> engine::DefaultAdmin {
        let fallback = engine::DefaultAdmin::default();
        engine::DefaultAdmin {
            username: self.admin_username.unwrap_or(fallback.username),
            password: self.admin_password.unwrap_or(fallback.password),
            full_name: self.admin_full_name.unwrap_or(fallback.full_name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub bootstrap: Option<Bootstrap>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("KASIR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
