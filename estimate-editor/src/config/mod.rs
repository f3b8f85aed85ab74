use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub document_store: DocumentStoreSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DocumentStoreSettings {
    /// Root of the estimate endpoints (e.g., http://localhost:5000/estimates).
    pub base_url: String,
    /// Estimate being edited in this session.
    pub estimate_id: i64,
    /// Only connecting is bounded; item mutations wait for their reply.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl DocumentStoreSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_connect_timeout_secs() -> u64 {
    5
}

#[derive(Deserialize, Clone, Debug)]
pub struct SearchSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Server-side page size; a full page means more results may exist.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_page_size() -> usize {
    25
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct EditorSettings {
    /// Send the new `order` of moved rows to the document store after a drop.
    #[serde(default)]
    pub persist_order: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

    // Check if we're already in estimate-editor directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("estimate-editor") {
        base_path.join("config")
    } else {
        base_path.join("estimate-editor").join("config")
    };

    get_configuration_from(&configuration_directory)
}

/// Load `base.yaml` from `configuration_directory`, then apply `APP_*`
/// environment overrides (`APP_DOCUMENT_STORE__ESTIMATE_ID=7`).
pub fn get_configuration_from(configuration_directory: &Path) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
