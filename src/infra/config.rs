use anyhow::{Context, Result, bail};
use matchday_stats::loader::SeasonSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Season files and CLI defaults.
///
/// Stored as JSON on disk:
/// ```json
/// {
///   "default_season": "2024-2025",
///   "default_team": "Manchester United",
///   "rolling_window": 5,
///   "seasons": [
///     { "label": "2023-2024", "path": "datasets/fotmob_season_2023-2024_stats.csv" }
///   ]
/// }
/// ```
/// Relative season paths are resolved against the config file's directory.
#[derive(Debug, Deserialize)]
pub struct SeasonConfig {
    pub default_season: Option<String>,
    pub default_team: Option<String>,
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    pub seasons: Vec<SeasonSource>,
}

fn default_rolling_window() -> usize {
    5
}

impl SeasonConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: SeasonConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;

        if config.seasons.is_empty() {
            bail!("config {} lists no seasons", path.display());
        }

        let base = path.parent().unwrap_or(Path::new(""));
        for season in &mut config.seasons {
            season.path = resolve(base, &season.path);
        }
        Ok(config)
    }

    /// Resolves the config path: explicit flag, then `MATCHDAY_CONFIG`, then `seasons.json`.
    pub fn locate(flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| std::env::var_os("MATCHDAY_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("seasons.json"))
    }

    /// `requested`, else the configured default season, else the last season listed.
    pub fn season(&self, requested: Option<String>) -> String {
        requested
            .or_else(|| self.default_season.clone())
            .or_else(|| self.seasons.last().map(|s| s.label.clone()))
            .unwrap_or_default()
    }

    pub fn team(&self, requested: Option<String>) -> Result<String> {
        requested
            .or_else(|| self.default_team.clone())
            .context("no team given and no default_team configured")
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = temp_dir("matchday_stats_config_relative");
        let path = dir.join("seasons.json");
        fs::write(
            &path,
            r#"{
                "default_season": "2023-2024",
                "seasons": [
                    { "label": "2023-2024", "path": "data/a.csv" },
                    { "label": "2024-2025", "path": "/abs/b.csv" }
                ]
            }"#,
        )
        .unwrap();

        let config = SeasonConfig::load(&path).unwrap();
        assert_eq!(config.seasons[0].path, dir.join("data/a.csv"));
        assert_eq!(config.seasons[1].path, PathBuf::from("/abs/b.csv"));
        assert_eq!(config.rolling_window, 5);
        assert_eq!(config.season(None), "2023-2024");
        assert_eq!(config.season(Some("2024-2025".into())), "2024-2025");
        assert!(config.team(None).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_empty_and_malformed() {
        let dir = temp_dir("matchday_stats_config_bad");
        let empty = dir.join("empty.json");
        fs::write(&empty, r#"{ "seasons": [] }"#).unwrap();
        assert!(SeasonConfig::load(&empty).is_err());

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let err = SeasonConfig::load(&broken).unwrap_err();
        assert!(err.to_string().contains("parsing config"));

        assert!(SeasonConfig::load(dir.join("missing.json")).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_default_season_falls_back_to_last_listed() {
        let config = SeasonConfig {
            default_season: None,
            default_team: Some("Arsenal".to_string()),
            rolling_window: 3,
            seasons: vec![
                SeasonSource::new("2022-2023", "a.csv"),
                SeasonSource::new("2023-2024", "b.csv"),
            ],
        };
        assert_eq!(config.season(None), "2023-2024");
        assert_eq!(config.team(None).unwrap(), "Arsenal");
    }

    #[test]
    fn test_locate_prefers_flag() {
        assert_eq!(
            SeasonConfig::locate(Some(PathBuf::from("custom.json"))),
            PathBuf::from("custom.json")
        );
    }
}
