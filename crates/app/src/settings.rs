//! Settings for the shop binary.
//!
//! Values come from an optional `settings` file (any format the `config`
//! crate recognizes, e.g. `settings.toml`) overridden by `POTION_SHOP__*`
//! environment variables, `__` separating nested keys:
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! port = 3000
//! database = { sqlite = "potion_shop.db" }
//! api_key = "change-me"
//!
//! [shop]
//! starting_gold = 100
//! ```
use config::{Config, ConfigError, Environment, File};
use engine::ShopConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Value expected in the `access_token` header.
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub shop: ShopConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("POTION_SHOP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
