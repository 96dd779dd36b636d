// Runtime settings, read once at startup from flags, the environment or a .env file.

use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API key for the hosted completion API. Without it the assistant uses canned replies.
    #[arg(long, env = "SHOWREEL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion API.
    #[arg(long, env = "SHOWREEL_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Model requested from the completion API.
    #[arg(long, env = "SHOWREEL_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Directory with page templates; enables auto-reload when set.
    #[arg(long, env = "SHOWREEL_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Directory served under /static (video assets live in media/).
    #[arg(long, env = "SHOWREEL_STATIC_DIR", default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            templates: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Settings {
    /// The capability flag: whether the remote strategy is usable this run.
    pub fn remote_enabled(&self) -> bool {
        self.api_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_enabled_requires_non_blank_key() {
        let mut settings = Settings::default();
        assert!(!settings.remote_enabled());

        settings.api_key = Some("   ".to_string());
        assert!(!settings.remote_enabled());

        settings.api_key = Some("sk-test".to_string());
        assert!(settings.remote_enabled());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base, "https://api.openai.com");
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.static_dir, PathBuf::from("static"));
        assert!(settings.templates.is_none());
    }
}
