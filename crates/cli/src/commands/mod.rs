pub mod config;
pub mod hur;
pub mod list;

use adops_core::config::{AppConfig, LoadOptions};
use adops_core::errors::{ApplicationError, DomainError};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use uuid::Uuid;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_NOT_FOUND: u8 = 4;
pub const EXIT_REJECTED: u8 = 5;
pub const EXIT_PERSISTENCE: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_with_data(command, error_class, message, exit_code, None)
    }

    fn failure_with_data(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Reports an application failure through its interface mapping, keeping the
    /// correlation id and the user-safe message next to the detailed one.
    pub fn from_application_error(
        command: &str,
        error: ApplicationError,
        correlation_id: &str,
    ) -> Self {
        let (error_class, exit_code) = classify(&error);
        let interface = error.into_interface(correlation_id);
        let data = json!({
            "correlation_id": correlation_id,
            "user_message": interface.user_message(),
        });
        Self::failure_with_data(command, error_class, interface.to_string(), exit_code, Some(data))
    }
}

fn classify(error: &ApplicationError) -> (&'static str, u8) {
    match error {
        ApplicationError::Domain(DomainError::InvalidTransition(_)) => {
            ("invalid_transition", EXIT_REJECTED)
        }
        ApplicationError::Domain(DomainError::MalformedFilterState(_)) => {
            ("malformed_filter", EXIT_REJECTED)
        }
        ApplicationError::NotFound(_) => ("not_found", EXIT_NOT_FOUND),
        ApplicationError::Persistence(_) => ("persistence", EXIT_PERSISTENCE),
        ApplicationError::Configuration(_) => ("config_validation", EXIT_CONFIG),
    }
}

pub(crate) fn load_config(command: &str, options: LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options).map_err(|error| {
        CommandResult::from_application_error(
            command,
            ApplicationError::Configuration(error.to_string()),
            &correlation_id(),
        )
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            EXIT_RUNTIME,
        )
    })
}

pub(crate) fn correlation_id() -> String {
    format!("cli-{}", Uuid::new_v4())
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\",\"data\":null}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use adops_core::domain::hur::HurStatus;
    use adops_core::errors::{ApplicationError, DomainError};
    use adops_core::workflow::{HurActionKind, HurTransitionError};
    use serde_json::Value;

    use super::{CommandResult, EXIT_NOT_FOUND, EXIT_REJECTED};

    fn payload(result: &CommandResult) -> Value {
        serde_json::from_str(&result.output).expect("command output should be valid JSON")
    }

    #[test]
    fn success_payload_carries_data() {
        let result = CommandResult::success_with_data(
            "list",
            "2 records",
            Some(serde_json::json!({ "total": 2 })),
        );

        let payload = payload(&result);
        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["error_class"], Value::Null);
        assert_eq!(payload["data"]["total"], 2);
    }

    #[test]
    fn invalid_transition_is_reported_with_correlation_id() {
        let error = ApplicationError::from(DomainError::from(
            HurTransitionError::InvalidTransition {
                status: HurStatus::Completed,
                action: HurActionKind::Advance,
            },
        ));
        let result = CommandResult::from_application_error("hur advance", error, "cli-1");

        let payload = payload(&result);
        assert_eq!(result.exit_code, EXIT_REJECTED);
        assert_eq!(payload["error_class"], "invalid_transition");
        assert_eq!(payload["data"]["correlation_id"], "cli-1");
        assert!(payload["message"].as_str().unwrap_or_default().contains("Completed"));
    }

    #[test]
    fn missing_record_exits_with_not_found_code() {
        let result = CommandResult::from_application_error(
            "hur show",
            ApplicationError::NotFound("HUR-404".to_string()),
            "cli-2",
        );

        assert_eq!(result.exit_code, EXIT_NOT_FOUND);
        assert_eq!(
            payload(&result)["data"]["user_message"],
            "The requested record does not exist."
        );
    }
}
