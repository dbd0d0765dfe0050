use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    // Push delivery is only enabled when a VAPID signing key is configured
    pub vapid_key_path: Option<String>,
    // Extra minutes the store keeps free around existing meetings when it
    // performs the authoritative conflict check
    pub conflict_buffer_minutes: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("HUDDLE_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let vapid_key_path = env::var("HUDDLE_VAPID_KEY_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty());
        let conflict_buffer_minutes = env::var("HUDDLE_CONFLICT_BUFFER_MINUTES")
            .ok()
            .and_then(|value| match value.trim().parse::<u16>() {
                Ok(minutes) => Some(minutes),
                Err(err) => {
                    tracing::warn!(
                        "Ignoring invalid HUDDLE_CONFLICT_BUFFER_MINUTES {:?}: {}",
                        value,
                        err
                    );
                    None
                }
            })
            .unwrap_or(0);

        Self {
            storage_path,
            db_path,
            vapid_key_path,
            conflict_buffer_minutes,
        }
    }
}

impl AppConfig {
    /// Build a config rooted at `storage_path` without reading the
    /// environment. Used by tests and the CLI when a path is given
    /// explicitly.
    pub fn with_storage_path(storage_path: &str) -> Self {
        Self {
            storage_path: storage_path.to_string(),
            db_path: format!("{}/db", storage_path),
            vapid_key_path: None,
            conflict_buffer_minutes: 0,
        }
    }
}
