use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub message: String,
    pub show_content: bool,
    pub cycle_interval_ms: u64,
    pub show_timer: bool,
    pub joke_source_url: String,
    pub api_enabled: bool,
    pub api_bind: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            message: "Generating interview questions...".to_owned(),
            show_content: true,
            cycle_interval_ms: 5_000,
            show_timer: true,
            joke_source_url: "https://icanhazdadjoke.com/".to_owned(),
            api_enabled: true,
            api_bind: "127.0.0.1:39117".to_owned(),
        }
    }
}

impl OverlayConfig {
    pub fn load_or_create() -> Result<(Self, PathBuf)> {
        let config_dir = dirs::config_dir()
            .context("unable to locate OS config directory")?
            .join("prep-overlay");
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("failed creating config dir at {}", config_dir.display()))?;

        let config_path = config_dir.join("config.json");
        if !config_path.exists() {
            let default = Self::default();
            default.save(&config_path)?;
            return Ok((default, config_path));
        }

        let text = fs::read_to_string(&config_path)
            .with_context(|| format!("failed reading {}", config_path.display()))?;
        let config = serde_json::from_str::<Self>(&text)
            .with_context(|| format!("invalid json in {}", config_path.display()))?;
        Ok((config, config_path))
    }

    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let payload = serde_json::to_string_pretty(self).context("failed serializing config")?;
        fs::write(path, payload).with_context(|| format!("failed writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::OverlayConfig;

    #[test]
    fn partial_config_keeps_defaults() {
        let raw = r#"{
            "show_timer": false
        }"#;
        let parsed: OverlayConfig = serde_json::from_str(raw).expect("config should parse");
        assert!(!parsed.show_timer);
        assert!(parsed.show_content);
        assert_eq!(parsed.message, "Generating interview questions...");
        assert_eq!(parsed.cycle_interval_ms, 5_000);
        assert_eq!(parsed.joke_source_url, "https://icanhazdadjoke.com/");
        assert!(parsed.api_enabled);
        assert_eq!(parsed.api_bind, "127.0.0.1:39117");
    }

    #[test]
    fn overlay_fields_roundtrip() {
        let mut config = OverlayConfig::default();
        config.message = "Summoning follow-up questions...".to_owned();
        config.cycle_interval_ms = 2_500;
        config.show_content = false;

        let raw = serde_json::to_string(&config).expect("serialize");
        let parsed: OverlayConfig = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(parsed.message, "Summoning follow-up questions...");
        assert_eq!(parsed.cycle_interval_ms, 2_500);
        assert!(!parsed.show_content);
    }
}
