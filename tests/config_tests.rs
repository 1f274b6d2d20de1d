//! Tests for layered configuration.

use std::io::Write;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use askweb::config::{AskwebConfig, ConfigOverrides, ENV_VARS};
use askweb::error::AskwebError;
use pretty_assertions::assert_eq;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    /// Snapshot and clear every variable the loader reads.
    fn clean() -> Self {
        let saved = ENV_VARS
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in ENV_VARS {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn file_values_apply_over_defaults() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    let file = config_file(
        r#"
api_key = "file-key"
model = "gemini-2.5-pro"
timeout_secs = 20
system_prompt = "Answer in French."

[search]
region = "fr-fr"
"#,
    );

    let config = AskwebConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap();

    assert_eq!(config.api_key.as_deref(), Some("file-key"));
    assert_eq!(config.model, "gemini-2.5-pro");
    assert_eq!(config.timeout, Duration::from_secs(20));
    assert_eq!(config.search.region, "fr-fr");
    assert_eq!(config.search.max_results, 5);
    assert_eq!(config.max_iterations, 15);
}

#[test]
fn env_beats_file_and_cli_beats_env() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    std::env::set_var("GOOGLE_API_KEY", "env-key");
    std::env::set_var("ASKWEB_MODEL", "gemini-2.0-flash");
    std::env::set_var("ASKWEB_SESSION", "env-session");
    let file = config_file("api_key = \"file-key\"\nmodel = \"gemini-2.5-pro\"\n");

    let config = AskwebConfig::load(
        Some(file.path()),
        ConfigOverrides {
            model: Some("gemini-2.5-flash-lite".into()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.api_key.as_deref(), Some("env-key"));
    assert_eq!(config.model, "gemini-2.5-flash-lite");
    assert_eq!(config.session.as_deref(), Some("env-session"));
}

#[test]
fn gemini_key_is_accepted_as_fallback() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    std::env::set_var("GEMINI_API_KEY", "gemini-key");
    let file = config_file("");

    let config = AskwebConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap();
    assert_eq!(config.agent_config().credential, "gemini-key");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    let dir = tempfile::tempdir().unwrap();

    let err = AskwebConfig::load(Some(&dir.path().join("absent.toml")), ConfigOverrides::default())
        .unwrap_err();
    assert!(matches!(err, AskwebError::Configuration(_)), "{err}");
}

#[test]
fn malformed_file_is_reported() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    let file = config_file("timeout_secs = \"soon\"\n");

    let err = AskwebConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, AskwebError::ConfigFile(_)), "{err}");
}

#[test]
fn missing_key_yields_config_that_fails_validation() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    let file = config_file("model = \"gemini-2.5-flash\"\n");

    let config = AskwebConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap();
    let err = config.agent_config().validate().unwrap_err();
    assert!(matches!(err, AskwebError::Configuration(_)));
}
