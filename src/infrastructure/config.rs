use crate::domain::sensor::{Sensor, SensorCatalog};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config/dashboard";
pub const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8050,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// Path of the telemetry CSV; a leading `~` is expanded against `$HOME`.
    pub csv_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: "~/telemetria.csv".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    pub max_display_points: usize,
    pub resample_interval_secs: u64,
    pub resample_by_default: bool,
    /// Upper bound on the resampled grid of one sensor; wider gaps are
    /// charted unresampled.
    pub max_resample_buckets: usize,
    pub refresh_interval_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_display_points: 300,
            resample_interval_secs: 60,
            resample_by_default: false,
            max_resample_buckets: 527_040,
            refresh_interval_secs: 60,
        }
    }
}

impl ProcessingConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    pub id: String,
    pub name: String,
    pub unit: Option<String>,
}

impl AppConfig {
    pub fn csv_path(&self) -> PathBuf {
        expand_home(&self.data.csv_path, std::env::var_os("HOME").map(PathBuf::from))
    }

    /// Configured sensors, or the built-in catalog when none are listed.
    pub fn sensor_catalog(&self) -> SensorCatalog {
        if self.sensors.is_empty() {
            return SensorCatalog::default();
        }
        SensorCatalog::new(
            self.sensors
                .iter()
                .map(|s| Sensor::new(s.id.clone(), s.name.clone(), s.unit.as_deref()))
                .collect(),
        )
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.processing.max_display_points < 2 {
            anyhow::bail!(
                "processing.max_display_points must be at least 2, got {}",
                self.processing.max_display_points
            );
        }
        if self.processing.resample_interval_secs == 0 {
            anyhow::bail!("processing.resample_interval_secs must be greater than zero");
        }
        if self.processing.max_resample_buckets == 0 {
            anyhow::bail!("processing.max_resample_buckets must be greater than zero");
        }
        if self.processing.refresh_interval_secs == 0 {
            anyhow::bail!("processing.refresh_interval_secs must be greater than zero");
        }
        if let Some(sensor) = self.sensors.iter().find(|s| s.id.trim().is_empty()) {
            anyhow::bail!("sensor {:?} has an empty id", sensor.name);
        }
        Ok(())
    }
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from(DEFAULT_CONFIG_FILE)
}

/// Optional config file, overridden by `DASHBOARD_*` environment variables
/// (`__` separates nested keys, e.g. `DASHBOARD_DATA__CSV_PATH`).
pub fn load_app_config_from(name: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

fn expand_home(path: &str, home: Option<PathBuf>) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };
    match (rest, home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_expand_home() {
        let home = Some(PathBuf::from("/home/reef"));
        assert_eq!(
            expand_home("~/telemetria.csv", home.clone()),
            PathBuf::from("/home/reef/telemetria.csv")
        );
        assert_eq!(expand_home("~", home.clone()), PathBuf::from("/home/reef"));
        assert_eq!(expand_home("/data/t.csv", home), PathBuf::from("/data/t.csv"));
        assert_eq!(expand_home("~/t.csv", None), PathBuf::from("~/t.csv"));
    }

    #[test]
    fn test_defaults_without_file() -> anyhow::Result<()> {
        let config = load_app_config_from("config/does-not-exist")?;
        assert_eq!(config.server.port, 8050);
        assert_eq!(config.processing, ProcessingConfig::default());
        assert_eq!(config.sensor_catalog(), SensorCatalog::default());
        Ok(())
    }

    #[test]
    fn test_load_from_toml() -> anyhow::Result<()> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("dashboard-config-{unique}.toml"));
        let contents = r#"
[data]
csv_path = "/srv/telemetry.csv"

[processing]
max_display_points = 120
resample_by_default = true
max_resample_buckets = 1440

[[sensors]]
id = "pressure"
name = "Line pressure"
unit = "bar"

[[sensors]]
id = "humidity"
name = "Humidity"
"#;
        fs::write(&path, contents)?;

        let name = path.to_string_lossy().to_string();
        let result = load_app_config_from(&name);
        let _ = fs::remove_file(&path);
        let config = result?;

        assert_eq!(config.csv_path(), PathBuf::from("/srv/telemetry.csv"));
        assert_eq!(config.processing.max_display_points, 120);
        assert!(config.processing.resample_by_default);
        assert_eq!(config.processing.resample_interval_secs, 60);
        assert_eq!(config.processing.max_resample_buckets, 1440);
        assert_eq!(config.sensor_catalog().ids(), vec!["pressure", "humidity"]);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_tiny_cap() {
        let config = AppConfig {
            processing: ProcessingConfig {
                max_display_points: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_bucket_limit() {
        let config = AppConfig {
            processing: ProcessingConfig {
                max_resample_buckets: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(ProcessingConfig::default().max_resample_buckets, 527_040);
    }
}
