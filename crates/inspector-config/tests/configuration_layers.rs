//! Layering tests for configuration loading.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use inspector_config::{Config, DEFAULT_LOG_FILTER, LogFormat};
use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::rstest;
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock_env() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner)
}

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = lock_env();
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` on edition 2024; the guard
        // serialises access and restores the prior value on drop.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

fn write_config(dir: &Path, body: &str) -> OsString {
    let path = dir.join("inspector.toml");
    fs::write(&path, body).expect("write config file");
    path.into_os_string()
}

fn args(extra: &[&OsStr]) -> Vec<OsString> {
    let mut all = vec![OsString::from("inspector")];
    all.extend(extra.iter().map(|value| value.to_os_string()));
    all
}

#[test]
fn loads_defaults_without_layers() {
    let _lock = lock_env();
    let config = Config::load_from_iter(args(&[])).expect("load defaults");
    assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format(), LogFormat::Compact);
    assert!(config.catalog_path().is_none());
}

#[test]
fn file_layer_sets_catalog_and_dumping() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = write_config(
        temp_dir.path(),
        "catalog_path = \"/etc/inspector/catalog.json\"\ndump_protocol_messages = true\n",
    );

    let _lock = lock_env();
    let config = Config::load_from_iter(args(&[OsStr::new("--config-path"), path.as_os_str()]))
        .expect("load file layer");

    assert_eq!(
        config.catalog_path().map(|path| path.as_str()),
        Some("/etc/inspector/catalog.json")
    );
    assert!(config.dump_protocol_messages());
}

#[rstest]
#[case::json("json", LogFormat::Json)]
#[case::compact("compact", LogFormat::Compact)]
fn environment_overrides_file(#[case] env_value: &str, #[case] expected: LogFormat) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let other = if expected == LogFormat::Json {
        "compact"
    } else {
        "json"
    };
    let path = write_config(temp_dir.path(), &format!("log_format = \"{other}\"\n"));

    let _env = EnvOverride::set_var("INSPECTOR_LOG_FORMAT", OsStr::new(env_value));
    let config = Config::load_from_iter(args(&[OsStr::new("--config-path"), path.as_os_str()]))
        .expect("load env layer");

    assert_eq!(config.log_format(), expected);
}

#[test]
fn command_line_overrides_environment() {
    let _env = EnvOverride::set_var("INSPECTOR_LOG_FILTER", OsStr::new("info"));
    let config = Config::load_from_iter(args(&[
        OsStr::new("--log-filter"),
        OsStr::new("inspector_protocol=trace"),
    ]))
    .expect("load cli layer");

    assert_eq!(config.log_filter(), "inspector_protocol=trace");
}

#[rstest]
#[case::enabled("true", true)]
#[case::disabled("false", false)]
fn environment_sets_message_dumping(#[case] env_value: &str, #[case] expected: bool) {
    let _env = EnvOverride::set_var("INSPECTOR_DUMP_PROTOCOL_MESSAGES", OsStr::new(env_value));
    let config = Config::load_from_iter(args(&[])).expect("load env layer");

    assert_eq!(config.dump_protocol_messages(), expected);
}
