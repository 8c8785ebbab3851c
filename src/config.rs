use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub catalog_path: Option<String>,
    pub export_dir: String,
    pub default_session: String,
    pub default_quantity: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            export_dir: "exports".to_string(),
            default_session: "Dossier 1".to_string(),
            default_quantity: 1,
        }
    }
}

/// Read `Config.toml` (optional) then `INVENTORY_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("export_dir", defaults.export_dir)?
        .set_default("default_session", defaults.default_session)?
        .set_default("default_quantity", defaults.default_quantity)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("INVENTORY"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
