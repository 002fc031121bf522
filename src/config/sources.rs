use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "SMSWATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/smswatch.toml";
const ENV_PREFIX: &str = "SMSWATCH";
const ENV_SEPARATOR: &str = "__";

/// Resolve the config file path: explicit argument, then `SMSWATCH_CONFIG`,
/// then the default location
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(explicit: Option<PathBuf>) -> Result<Config, ConfigError> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    load_from_sources(config_path(explicit))
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    load_with_environment(config_path, environment())
}

/// `SMSWATCH__LOG__MAX_LINES` -> `log.max_lines`.
///
/// Values stay strings: a phone number like `+8613800000000` or
/// `07551234567` must not be read as an integer. Numeric fields still
/// deserialize from the string form.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(false)
}

fn load_with_environment(config_path: PathBuf, env: Environment) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    builder = builder.add_source(env);

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.log.max_lines, 2000);
        assert_eq!(config.log.path, PathBuf::from("data/app_log.txt"));
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[log]
path = "/var/lib/smswatch/app_log.txt"
max_lines = 500

[capture]
target = "13800000000"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.log.max_lines, 500);
        assert_eq!(
            config.log.path,
            PathBuf::from("/var/lib/smswatch/app_log.txt")
        );
        assert_eq!(config.capture.target.as_deref(), Some("13800000000"));
    }

    fn fake_env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_env_target_keeps_phone_number_text() {
        let temp_dir = TempDir::new().unwrap();

        for target in ["+8613800000000", "07551234567"] {
            let env = fake_env(&[("SMSWATCH__CAPTURE__TARGET", target)]);
            let config =
                load_with_environment(temp_dir.path().join("none.toml"), env).unwrap();
            assert_eq!(config.capture.target.as_deref(), Some(target));
        }
    }

    #[test]
    fn test_env_overrides_numeric_field() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(&config_path, "[log]\nmax_lines = 500\n").unwrap();

        let env = fake_env(&[("SMSWATCH__LOG__MAX_LINES", "5000")]);
        let config = load_with_environment(config_path, env).unwrap();
        assert_eq!(config.log.max_lines, 5000);
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = config_path(Some(PathBuf::from("custom.toml")));
        assert_eq!(path, PathBuf::from("custom.toml"));
    }
}
