//! Service configuration (astraflow.toml + environment overrides)
//!
//! Every external endpoint the pipeline talks to lives here (generation
//! service, hosting provider, webhook base); nothing is baked into pipeline
//! logic. Missing file means defaults; credentials come from the
//! environment.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Config file name, looked up in the working directory unless
/// ASTRAFLOW_CONFIG points elsewhere.
pub const CONFIG_FILE: &str = "astraflow.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub hosting: HostingConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Text-generation service settings (OpenAI-style chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_api_base")]
    pub api_base: String,
    /// Bearer credential; usually supplied via OPENAI_API_KEY.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base: default_generation_api_base(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_generation_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

/// Hosting provider settings (Vercel-style deployments API) plus the fixed
/// build configuration submitted with every deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostingConfig {
    #[serde(default = "default_hosting_api_base")]
    pub api_base: String,
    /// Bearer credential; usually supplied via VERCEL_TOKEN.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_framework")]
    pub framework: String,
    #[serde(default = "default_build_command")]
    pub build_command: String,
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    #[serde(default = "default_install_command")]
    pub install_command: String,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            api_base: default_hosting_api_base(),
            token: String::new(),
            framework: default_framework(),
            build_command: default_build_command(),
            output_directory: default_output_directory(),
            install_command: default_install_command(),
        }
    }
}

fn default_hosting_api_base() -> String {
    "https://api.vercel.com".to_string()
}

fn default_framework() -> String {
    "create-react-app".to_string()
}

fn default_build_command() -> String {
    "npm run build".to_string()
}

fn default_output_directory() -> String {
    "build".to_string()
}

fn default_install_command() -> String {
    "npm install".to_string()
}

/// Base URL of the n8n instance the generated UIs post their forms to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_base")]
    pub base_url: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            base_url: default_webhook_base(),
        }
    }
}

fn default_webhook_base() -> String {
    "https://your-instance.app.n8n.cloud".to_string()
}

impl AppConfig {
    /// Load configuration: file (if present) then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ASTRAFLOW_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
        let mut config = Self::load_file(Path::new(&path))?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Environment wins over file, file wins over defaults.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.generation.api_key = key;
        }
        if let Ok(base) = std::env::var("ASTRAFLOW_GENERATION_API_BASE") {
            self.generation.api_base = base;
        }
        if let Ok(model) = std::env::var("ASTRAFLOW_MODEL") {
            self.generation.model = model;
        }
        if let Ok(token) = std::env::var("VERCEL_TOKEN") {
            self.hosting.token = token;
        }
        if let Ok(base) = std::env::var("ASTRAFLOW_WEBHOOK_BASE") {
            self.webhook.base_url = base;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.generation.temperature, 0.3);
        assert_eq!(config.hosting.framework, "create-react-app");
        assert_eq!(config.hosting.build_command, "npm run build");
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[generation]
model = "gpt-4"
temperature = 0.5

[hosting]
token = "tok"

[webhook]
base_url = "https://acme.app.n8n.cloud"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.model, "gpt-4");
        assert_eq!(config.generation.temperature, 0.5);
        assert_eq!(config.hosting.token, "tok");
        // Unset fields keep their defaults.
        assert_eq!(config.hosting.api_base, "https://api.vercel.com");
        assert_eq!(config.webhook.base_url, "https://acme.app.n8n.cloud");
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[generation]\nmodel = \"gpt-4\"\n").unwrap();

        let config = AppConfig::load_file(&path).unwrap();
        assert_eq!(config.generation.model, "gpt-4");

        // Missing file is not an error.
        let absent = AppConfig::load_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(absent.generation.model, "gpt-4o-mini");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: AppConfig = toml::from_str(
            "[generation]\nmodel = \"gpt-4\"\n\n[hosting]\ntoken = \"file-tok\"\n",
        )
        .unwrap();

        std::env::set_var("ASTRAFLOW_MODEL", "gpt-4.1");
        std::env::set_var("VERCEL_TOKEN", "env-tok");
        config.apply_env_overrides();
        std::env::remove_var("ASTRAFLOW_MODEL");
        std::env::remove_var("VERCEL_TOKEN");

        // Environment wins over the file.
        assert_eq!(config.generation.model, "gpt-4.1");
        assert_eq!(config.hosting.token, "env-tok");
        // Untouched values keep what the file (or default) said.
        assert_eq!(config.generation.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_load_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            AppConfig::load_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
