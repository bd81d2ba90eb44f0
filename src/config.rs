use crate::calendar::DateWindow;
use crate::prizes::{PrizeCatalogue, PrizeEntry};
use std::{env, io, path::PathBuf};
use tokio::fs;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/workouts.json";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub window: DateWindow,
    pub prizes_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            window: DateWindow::Week,
            prizes_path: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = env::var("PORT").ok().and_then(|value| value.parse::<u16>().ok()) {
            config.port = port;
        }
        if let Ok(path) = env::var("APP_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        if let Ok(value) = env::var("APP_DATE_WINDOW") {
            match DateWindow::parse(&value) {
                Some(window) => config.window = window,
                None => warn!("ignoring unknown APP_DATE_WINDOW value {value:?}"),
            }
        }
        config.prizes_path = env::var("APP_PRIZES_PATH").ok().map(PathBuf::from);

        config
    }

    /// Reads the prize catalogue file when one is configured, otherwise the
    /// built-in catalogue.
    pub async fn load_prizes(&self) -> io::Result<PrizeCatalogue> {
        let Some(path) = &self.prizes_path else {
            return Ok(PrizeCatalogue::with_defaults());
        };

        let bytes = fs::read(path).await?;
        let entries: Vec<PrizeEntry> = serde_json::from_slice(&bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        PrizeCatalogue::from_entries(entries)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prize_file_replaces_defaults() {
        let mut path = env::temp_dir();
        path.push(format!("workout_prizes_{}.json", std::process::id()));
        let body = r#"[{"year": 2026, "week": 43, "name": "Cake", "description": "A slice"}]"#;
        fs::write(&path, body).await.unwrap();

        let config = ServerConfig {
            prizes_path: Some(path.clone()),
            ..ServerConfig::default()
        };
        let catalogue = config.load_prizes().await.unwrap();
        let _ = fs::remove_file(&path).await;

        assert_eq!(catalogue.len(), 1);
        let (week, prize) = catalogue.iter().next().unwrap();
        assert_eq!(week, "2026-43");
        assert_eq!(prize.details().image, "blank");
    }

    #[tokio::test]
    async fn default_config_uses_builtin_prizes() {
        let catalogue = ServerConfig::default().load_prizes().await.unwrap();
        assert!(!catalogue.is_empty());
    }
}
