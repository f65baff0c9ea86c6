mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./plateflow.toml",
        "~/.config/plateflow/config.toml",
        "/etc/plateflow/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.pipeline.frame_rate <= 0.0 {
        anyhow::bail!("pipeline.frame_rate must be positive");
    }

    if config.pipeline.start_index < 0 {
        anyhow::bail!("pipeline.start_index cannot be negative");
    }

    if config.paths.project_marker.is_empty() {
        anyhow::bail!("paths.project_marker cannot be empty");
    }

    if config.tracking.enabled {
        if config.tracking.base_url.is_empty() {
            anyhow::bail!("Tracking is enabled but tracking.base_url is empty");
        }
        if config.tracking.api_key.is_empty() {
            anyhow::bail!("Tracking is enabled but tracking.api_key is empty");
        }
        if config.tracking.project_id <= 0 {
            anyhow::bail!("Tracking is enabled but tracking.project_id is not set");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plateflow.toml");
        std::fs::write(
            &path,
            r#"
[pipeline]
frame_rate = 25.0

[editorial]
shots = ["SH010", "SH012"]

[tools]
env_launcher = "/opt/rez/bin/rez-env"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.pipeline.frame_rate, 25.0);
        assert_eq!(config.editorial.shots.len(), 2);
        assert_eq!(
            config.tools.env_launcher,
            std::path::PathBuf::from("/opt/rez/bin/rez-env")
        );
        // Unspecified sections keep their defaults.
        assert_eq!(config.pipeline.start_index, 1001);
    }

    #[test]
    fn test_invalid_tracking_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plateflow.toml");
        std::fs::write(
            &path,
            r#"
[tracking]
enabled = true
"#,
        )
        .unwrap();

        assert!(load_config(&path).is_err());
    }
}
