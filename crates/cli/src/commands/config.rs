use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use adops_core::config::{resolve_config_path, LoadOptions};
use serde_json::{Map, Value};
use toml::Value as TomlValue;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "config";

struct FieldLine {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        FieldLine {
            key: "actor.name",
            value: config.actor.name.clone(),
            env_keys: &["ADOPS_ACTOR_NAME"],
        },
        FieldLine {
            key: "actor.role",
            value: config.actor.role.clone(),
            env_keys: &["ADOPS_ACTOR_ROLE"],
        },
        FieldLine {
            key: "actor.email",
            value: config.actor.email.clone(),
            env_keys: &["ADOPS_ACTOR_EMAIL"],
        },
        FieldLine {
            key: "display.currency",
            value: config.display.currency.clone(),
            env_keys: &["ADOPS_DISPLAY_CURRENCY"],
        },
        FieldLine {
            key: "display.show_time",
            value: config.display.show_time.to_string(),
            env_keys: &["ADOPS_DISPLAY_SHOW_TIME"],
        },
        FieldLine {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["ADOPS_LOGGING_LEVEL", "ADOPS_LOG_LEVEL"],
        },
        FieldLine {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["ADOPS_LOGGING_FORMAT", "ADOPS_LOG_FORMAT"],
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    let mut data = Map::new();
    for field in &fields {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, &source));

        let mut entry = Map::new();
        entry.insert("value".to_string(), Value::String(field.value.clone()));
        entry.insert("source".to_string(), Value::String(source));
        data.insert(field.key.to_string(), Value::Object(entry));
    }

    CommandResult::success_with_data(COMMAND, lines.join("\n"), Some(Value::Object(data)))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<TomlValue> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<TomlValue>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&TomlValue>,
    config_file_path: Option<&Path>,
) -> String {
    let from_env = env_keys
        .iter()
        .find(|env_key| env::var(env_key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = from_env {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &TomlValue, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}
