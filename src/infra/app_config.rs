use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MAX_RECENT_REPOSITORIES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Most recently opened repositories, newest first.
    #[serde(default)]
    pub recent_repositories: Vec<PathBuf>,
    /// Parent folder used when a clone has no explicit destination.
    #[serde(default)]
    pub default_clone_dir: Option<PathBuf>,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl AppConfig {
    pub fn remember_repository(&mut self, path: &Path) {
        self.recent_repositories.retain(|p| p != path);
        self.recent_repositories.insert(0, path.to_path_buf());
        self.recent_repositories.truncate(MAX_RECENT_REPOSITORIES);
    }

    pub fn clone_destination(&self, repo_name: &str) -> Option<PathBuf> {
        self.default_clone_dir
            .as_ref()
            .map(|dir| dir.join(repo_name))
    }
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn save_config(config: &AppConfig) -> std::io::Result<()> {
    save_config_to(&config_path(), config)
}

fn load_config_from(path: &Path) -> AppConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return AppConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Ignoring invalid config at {}: {}", path.display(), err);
            AppConfig::default()
        }
    }
}

fn save_config_to(path: &Path, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, contents)
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("FLUX_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

fn app_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("FLUX_DATA_HOME") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("Flux");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("Flux");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("flux");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".local").join("share").join("flux");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".flux-desktop")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.toml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig {
            default_clone_dir: Some(PathBuf::from("/tmp/clones")),
            log_filter: Some("debug".into()),
            ..Default::default()
        };
        config.remember_repository(Path::new("/work/a"));

        save_config_to(&path, &config).unwrap();
        assert_eq!(load_config_from(&path), config);
    }

    #[test]
    fn test_invalid_config_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "recent_repositories = 42").unwrap();
        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn test_remember_repository_moves_to_front_and_caps() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            config.remember_repository(&PathBuf::from(format!("/work/{i}")));
        }
        config.remember_repository(Path::new("/work/5"));

        assert_eq!(config.recent_repositories.len(), MAX_RECENT_REPOSITORIES);
        assert_eq!(config.recent_repositories[0], PathBuf::from("/work/5"));
        assert_eq!(
            config
                .recent_repositories
                .iter()
                .filter(|p| p.as_path() == Path::new("/work/5"))
                .count(),
            1
        );
    }

    #[test]
    fn test_clone_destination_joins_default_dir() {
        let config = AppConfig {
            default_clone_dir: Some(PathBuf::from("/tmp/clones")),
            ..Default::default()
        };
        assert_eq!(
            config.clone_destination("flux"),
            Some(PathBuf::from("/tmp/clones/flux"))
        );
        assert_eq!(AppConfig::default().clone_destination("flux"), None);
    }
}
