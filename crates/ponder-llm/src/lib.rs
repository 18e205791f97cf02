//! LLM backend abstraction for ponder.
//!
//! All providers implement the [`LlmBackend`] trait, so the engine can drive
//! any of them without knowing implementation details. One HTTP provider is
//! built in (Groq's OpenAI-compatible endpoint); test suites substitute
//! scripted implementations of the same trait.

mod groq_backend;
pub(crate) mod http_client;
mod types;

pub use types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};

pub use ponder_utils::error::LlmError;

pub(crate) use groq_backend::GroqBackend;

use ponder_config::Settings;

/// Construct the backend named by the settings.
///
/// # Errors
///
/// Returns `LlmError::Unsupported` for an unknown provider and
/// `LlmError::Misconfiguration` when provider construction fails (e.g. the
/// API key environment variable is unset).
pub fn from_settings(settings: &Settings) -> Result<Box<dyn LlmBackend>, LlmError> {
    match settings.provider.as_str() {
        "groq" => {
            let backend = GroqBackend::new_from_settings(settings)?;
            Ok(Box::new(backend))
        }
        unknown => Err(LlmError::Unsupported(format!(
            "Unknown LLM provider '{unknown}'. Supported providers: groq."
        ))),
    }
}

#[cfg(test)]
mod factory_tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    // Env-mutating tests share one lock so they never race each other.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    #[test]
    fn unknown_provider_fails_cleanly() {
        let settings = Settings {
            provider: "invalid-provider".to_string(),
            ..Settings::default()
        };

        match from_settings(&settings) {
            Err(LlmError::Unsupported(msg)) => {
                assert!(msg.contains("invalid-provider"));
                assert!(msg.contains("groq"));
            }
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn missing_api_key_reports_misconfiguration() {
        let _guard = env_guard();

        let env_var = "PONDER_TEST_MISSING_GROQ_KEY";
        // SAFETY: guarded by ENV_LOCK; the variable is test-local.
        unsafe {
            std::env::remove_var(env_var);
        }

        let settings = Settings {
            api_key_env: env_var.to_string(),
            ..Settings::default()
        };

        match from_settings(&settings) {
            Err(LlmError::Misconfiguration(msg)) => {
                assert!(msg.contains(env_var));
                assert!(msg.contains("not found"));
            }
            other => panic!("expected Misconfiguration, got {other:?}"),
        }
    }

    #[test]
    fn present_api_key_constructs_backend() {
        let _guard = env_guard();

        let env_var = "PONDER_TEST_PRESENT_GROQ_KEY";
        // SAFETY: guarded by ENV_LOCK; cleaned up below.
        unsafe {
            std::env::set_var(env_var, "test-key");
        }

        let settings = Settings {
            api_key_env: env_var.to_string(),
            ..Settings::default()
        };

        let result = from_settings(&settings);

        // SAFETY: cleaning up the variable set above.
        unsafe {
            std::env::remove_var(env_var);
        }

        assert!(result.is_ok());
    }
}
