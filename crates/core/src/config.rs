use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::actor::Actor;

pub const CONFIG_FILE_NAME: &str = "adops.toml";
pub const NESTED_CONFIG_FILE: &str = "config/adops.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub actor: ActorConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Identity stamped on workflow actions taken from this console.
#[derive(Clone, Debug)]
pub struct ActorConfig {
    pub name: String,
    pub role: String,
    pub email: String,
}

impl ActorConfig {
    pub fn to_actor(&self) -> Actor {
        Actor::new(self.name.clone(), self.role.clone(), self.email.clone())
    }
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub currency: String,
    pub show_time: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub actor_name: Option<String>,
    pub actor_role: Option<String>,
    pub actor_email: Option<String>,
    pub show_time: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            actor: ActorConfig {
                name: "Operations Admin".to_string(),
                role: "Admin".to_string(),
                email: "ops-admin@adops.local".to_string(),
            },
            display: DisplayConfig { currency: "USD".to_string(), show_time: false },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(actor) = patch.actor {
            if let Some(name) = actor.name {
                self.actor.name = name;
            }
            if let Some(role) = actor.role {
                self.actor.role = role;
            }
            if let Some(email) = actor.email {
                self.actor.email = email;
            }
        }

        if let Some(display) = patch.display {
            if let Some(currency) = display.currency {
                self.display.currency = currency;
            }
            if let Some(show_time) = display.show_time {
                self.display.show_time = show_time;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ADOPS_ACTOR_NAME") {
            self.actor.name = value;
        }
        if let Some(value) = read_env("ADOPS_ACTOR_ROLE") {
            self.actor.role = value;
        }
        if let Some(value) = read_env("ADOPS_ACTOR_EMAIL") {
            self.actor.email = value;
        }

        if let Some(value) = read_env("ADOPS_DISPLAY_CURRENCY") {
            self.display.currency = value;
        }
        if let Some(value) = read_env("ADOPS_DISPLAY_SHOW_TIME") {
            self.display.show_time = parse_bool("ADOPS_DISPLAY_SHOW_TIME", &value)?;
        }

        let log_level = read_env("ADOPS_LOGGING_LEVEL").or_else(|| read_env("ADOPS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ADOPS_LOGGING_FORMAT").or_else(|| read_env("ADOPS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(actor_name) = overrides.actor_name {
            self.actor.name = actor_name;
        }
        if let Some(actor_role) = overrides.actor_role {
            self.actor.role = actor_role;
        }
        if let Some(actor_email) = overrides.actor_email {
            self.actor.email = actor_email;
        }
        if let Some(show_time) = overrides.show_time {
            self.display.show_time = show_time;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_actor(&self.actor)?;
        validate_display(&self.display)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_actor(actor: &ActorConfig) -> Result<(), ConfigError> {
    if actor.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "actor.name is required; it is stamped on every HUR approval".to_string(),
        ));
    }

    if actor.role.trim().is_empty() {
        return Err(ConfigError::Validation("actor.role is required".to_string()));
    }

    let email = actor.email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(ConfigError::Validation(format!(
            "actor.email must look like `name@domain` (got `{email}`)"
        )));
    }

    Ok(())
}

fn validate_display(display: &DisplayConfig) -> Result<(), ConfigError> {
    if !display.currency.trim().eq_ignore_ascii_case("USD") {
        return Err(ConfigError::Validation(format!(
            "display.currency `{}` is not supported (expected USD)",
            display.currency
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    actor: Option<ActorPatch>,
    display: Option<DisplayPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ActorPatch {
    name: Option<String>,
    role: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DisplayPatch {
    currency: Option<String>,
    show_time: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid() -> Result<(), String> {
        let config = AppConfig::default();
        config.validate().map_err(|err| err.to_string())?;
        ensure(config.display.currency == "USD", "default currency should be USD")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "default format is compact")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_ADOPS_APPROVER_EMAIL", "maria.lopez@agency.example");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("adops.toml");
            fs::write(
                &path,
                r#"
[actor]
name = "Maria Lopez"
role = "Finance Director"
email = "${TEST_ADOPS_APPROVER_EMAIL}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.actor.email == "maria.lopez@agency.example",
                "actor email should be interpolated from environment",
            )?;
            ensure(config.actor.to_actor().name == "Maria Lopez", "actor name comes from file")
        })();

        clear_vars(&["TEST_ADOPS_APPROVER_EMAIL"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["TEST_ADOPS_UNSET_VALUE"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("adops.toml");
        fs::write(&path, "[actor]\nname = \"${TEST_ADOPS_UNSET_VALUE}\"\n")
            .map_err(|err| err.to_string())?;

        match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() }) {
            Err(ConfigError::MissingEnvInterpolation { var }) => {
                ensure(var == "TEST_ADOPS_UNSET_VALUE", "error should name the missing variable")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
            Ok(_) => Err("expected interpolation failure".to_string()),
        }
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ADOPS_LOG_LEVEL", "warn");
        env::set_var("ADOPS_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["ADOPS_LOG_LEVEL", "ADOPS_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ADOPS_ACTOR_ROLE", "Traffic Lead");
        env::set_var("ADOPS_ACTOR_EMAIL", "env@adops.example");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("adops.toml");
            fs::write(
                &path,
                r#"
[actor]
name = "From File"
role = "File Role"
email = "file@adops.example"

[display]
show_time = true

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    actor_email: Some("override@adops.example".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.actor.name == "From File", "file value should beat the default")?;
            ensure(config.actor.role == "Traffic Lead", "env role should win over file")?;
            ensure(
                config.actor.email == "override@adops.example",
                "override email should win over env and file",
            )?;
            ensure(config.display.show_time, "file should enable show_time")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            Ok(())
        })();

        clear_vars(&["ADOPS_ACTOR_ROLE", "ADOPS_ACTOR_EMAIL"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ADOPS_ACTOR_EMAIL", "not-an-email");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("actor.email")
            );
            ensure(has_message, "validation failure should mention actor.email")
        })();

        clear_vars(&["ADOPS_ACTOR_EMAIL"]);
        result
    }

    #[test]
    fn invalid_boolean_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ADOPS_DISPLAY_SHOW_TIME", "sometimes");
        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "ADOPS_DISPLAY_SHOW_TIME", "error should name the env key")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
            Ok(_) => Err("expected invalid override failure".to_string()),
        };

        clear_vars(&["ADOPS_DISPLAY_SHOW_TIME"]);
        result
    }

    #[test]
    fn non_usd_currency_is_rejected() {
        let mut config = AppConfig::default();
        config.display.currency = "EUR".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(ref message)) if message.contains("display.currency")
        ));
    }
}
