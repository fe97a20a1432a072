use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::CoreError;

pub const HOME_ENV: &str = "LIVEBRAIN_HOME";
pub const PROVIDER_ENV: &str = "LIVEBRAIN_PROVIDER";
pub const MODEL_ENV: &str = "LIVEBRAIN_MODEL";
pub const API_KEY_ENV: &str = "LIVEBRAIN_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
}

impl ProviderSettings {
    pub fn configured(&self) -> bool {
        !self.provider.is_empty()
            && !self.model.is_empty()
            && (self.provider == "ollama" || !self.api_key.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    /// Tried in order when the primary provider fails
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<ProviderSettings>,
}

impl AiSettings {
    pub fn primary(&self) -> ProviderSettings {
        ProviderSettings {
            provider: self.provider.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
        }
    }

    /// Primary provider first, then fallbacks, skipping unconfigured entries.
    pub fn provider_chain(&self) -> Vec<ProviderSettings> {
        let mut chain = Vec::with_capacity(1 + self.fallbacks.len());
        for (i, entry) in std::iter::once(self.primary())
            .chain(self.fallbacks.iter().cloned())
            .enumerate()
        {
            if entry.configured() {
                chain.push(entry);
            } else if i > 0 || !entry.provider.is_empty() {
                tracing::warn!(
                    provider = %entry.provider,
                    model = %entry.model,
                    "skipping provider without model or API key"
                );
            }
        }
        chain
    }

    /// Overlay provider/model/key from the environment. `lookup` is
    /// `std::env::var` in production.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = lookup(PROVIDER_ENV).filter(|v| !v.is_empty()) {
            self.provider = provider;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.is_empty()) {
            self.model = model;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = key;
        }
    }

    /// Key for display: only whether it is set and its last four characters.
    pub fn masked_key(&self) -> String {
        if self.api_key.is_empty() {
            return "(not set)".to_string();
        }
        let tail: String = self
            .api_key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{tail}")
    }
}

/// Resolve the global settings directory (~/.livebrain/, or `$LIVEBRAIN_HOME`).
pub fn settings_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".livebrain")
}

pub fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

pub fn read_settings() -> AiSettings {
    read_settings_from(&settings_path())
}

/// Missing or unreadable settings fall back to defaults.
pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    match fs::read_to_string(path).map(|s| serde_json::from_str(&s)) {
        Ok(Ok(settings)) => settings,
        Ok(Err(e)) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt settings file");
            AiSettings::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read settings file");
            AiSettings::default()
        }
    }
}

pub fn write_settings(settings: &AiSettings) -> Result<(), CoreError> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &Path, settings: &AiSettings) -> Result<(), CoreError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(|e| CoreError::json(path, e))?;
    fs::write(path, json).map_err(|e| CoreError::io(path, e))
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    settings.primary().configured()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anthropic() -> AiSettings {
        AiSettings {
            provider: "anthropic".into(),
            api_key: "sk-test-1234".into(),
            model: "claude-sonnet".into(),
            fallbacks: vec![],
        }
    }

    #[test]
    fn ollama_needs_no_key() {
        let settings = AiSettings {
            provider: "ollama".into(),
            model: "llama3".into(),
            ..Default::default()
        };
        assert!(ai_configured(&settings));
        assert!(!ai_configured(&AiSettings::default()));
    }

    #[test]
    fn chain_skips_unconfigured_fallbacks() {
        let mut settings = anthropic();
        settings.fallbacks = vec![
            ProviderSettings {
                provider: "openai".into(),
                api_key: String::new(),
                model: "gpt-4o".into(),
            },
            ProviderSettings {
                provider: "ollama".into(),
                api_key: String::new(),
                model: "llama3".into(),
            },
        ];
        let chain: Vec<String> = settings
            .provider_chain()
            .into_iter()
            .map(|p| p.provider)
            .collect();
        assert_eq!(chain, vec!["anthropic", "ollama"]);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut settings = anthropic();
        settings.apply_env(|key| match key {
            MODEL_ENV => Some("claude-opus".to_string()),
            API_KEY_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(settings.model, "claude-opus");
        assert_eq!(settings.api_key, "sk-test-1234");
        assert_eq!(settings.provider, "anthropic");
    }

    #[test]
    fn masked_key_shows_tail_only() {
        assert_eq!(anthropic().masked_key(), "****1234");
        assert_eq!(AiSettings::default().masked_key(), "(not set)");
    }

    #[test]
    fn corrupt_settings_read_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(read_settings_from(&path), AiSettings::default());

        write_settings_to(&path, &anthropic()).unwrap();
        assert_eq!(read_settings_from(&path), anthropic());
    }
}
