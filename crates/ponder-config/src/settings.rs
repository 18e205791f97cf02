//! Process-level runtime settings.
//!
//! Everything here is orthogonal to the template: which provider to talk to,
//! where the API key lives, and where transcripts are written. Precedence is
//! CLI flags > environment > defaults; the CLI applies its overrides on top
//! of `Settings::from_env()`.

use std::time::Duration;

use camino::Utf8PathBuf;

/// Environment variable overriding the transcript output directory.
pub const OUTPUT_DIR_ENV: &str = "PONDER_OUTPUT_DIR";

const DEFAULT_PROVIDER: &str = "groq";
const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Runtime settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// LLM provider name (only "groq" is built in)
    pub provider: String,
    /// Override for the provider's chat-completions endpoint
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout for model calls
    pub request_timeout: Duration,
    /// Directory transcripts are written to
    pub output_dir: Utf8PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            base_url: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            output_dir: Utf8PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Build settings from defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            if !dir.is_empty() {
                settings.output_dir = Utf8PathBuf::from(dir);
            }
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_groq_and_cwd() {
        let settings = Settings::default();
        assert_eq!(settings.provider, "groq");
        assert_eq!(settings.api_key_env, "GROQ_API_KEY");
        assert_eq!(settings.output_dir, Utf8PathBuf::from("."));
        assert_eq!(settings.request_timeout, Duration::from_secs(300));
    }
}
