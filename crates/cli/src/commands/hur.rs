use adops_core::audit::{AuditContext, AuditSink, InMemoryAuditSink, TracingAuditSink};
use adops_core::config::{DisplayConfig, LoadOptions};
use adops_core::domain::actor::Actor;
use adops_core::domain::hur::HurRequest;
use adops_core::errors::{ApplicationError, DomainError};
use adops_core::format::{format_currency, format_date, format_date_time};
use adops_core::workflow::{HurAction, HurWorkflow};
use adops_db::{MockStore, RecordRepository};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::info;

use crate::commands::{build_runtime, correlation_id, load_config, CommandResult};

pub fn show(id: &str, options: LoadOptions) -> CommandResult {
    execute("hur show", id, None, options)
}

pub fn advance(id: &str, options: LoadOptions) -> CommandResult {
    execute("hur advance", id, Some(HurAction::Advance), options)
}

pub fn reject(id: &str, options: LoadOptions) -> CommandResult {
    execute("hur reject", id, Some(HurAction::Reject), options)
}

pub fn more_info(id: &str, comments: &str, options: LoadOptions) -> CommandResult {
    let action = HurAction::RequestMoreInfo { comments: comments.to_string() };
    execute("hur more-info", id, Some(action), options)
}

fn execute(
    command: &str,
    id: &str,
    action: Option<HurAction>,
    options: LoadOptions,
) -> CommandResult {
    let config = match load_config(command, options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime(command) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let correlation_id = correlation_id();
    let store = MockStore::seeded();
    let sink = InMemoryAuditSink::default();
    let context = ActionContext {
        actor: config.actor.to_actor(),
        display: &config.display,
        sink: &sink,
        correlation_id: &correlation_id,
    };
    let result = runtime.block_on(perform(&store, id, action, &context));

    let events = sink.events();
    for event in &events {
        TracingAuditSink.emit(event.clone());
    }

    match result {
        Ok(mut data) => {
            if !events.is_empty() {
                data["audit"] = serde_json::to_value(&events).unwrap_or(Value::Null);
            }
            let message = summary(&data);
            CommandResult::success_with_data(command, message, Some(data))
        }
        Err(error) => CommandResult::from_application_error(command, error, &correlation_id),
    }
}

struct ActionContext<'a> {
    actor: Actor,
    display: &'a DisplayConfig,
    sink: &'a InMemoryAuditSink,
    correlation_id: &'a str,
}

async fn perform(
    store: &MockStore,
    id: &str,
    action: Option<HurAction>,
    context: &ActionContext<'_>,
) -> Result<Value, ApplicationError> {
    let request = store
        .hurs
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::NotFound(format!("HUR request `{id}`")))?;

    let Some(action) = action else {
        return Ok(json!({ "request": hur_view(&request, context.display) }));
    };

    let audit = AuditContext::new(
        Some(request.id.clone()),
        context.correlation_id,
        context.actor.name.clone(),
    );
    let outcome = HurWorkflow::new()
        .apply_with_audit(&request, &action, &context.actor, Utc::now(), context.sink, &audit)
        .map_err(DomainError::from)?;
    let saved = store.hurs.save(outcome.request).await?;

    info!(
        event_name = "cli.hur.transition_saved",
        correlation_id = %context.correlation_id,
        request_id = %saved.id.0,
        from = outcome.from.label(),
        to = outcome.to.label(),
        "HUR request updated"
    );

    Ok(json!({
        "from": outcome.from,
        "to": outcome.to,
        "action": outcome.action,
        "request": hur_view(&saved, context.display),
    }))
}

fn summary(data: &Value) -> String {
    let request = &data["request"];
    let id = request["id"].as_str().unwrap_or_default();
    let status = request["status"].as_str().unwrap_or_default();
    match data["from"].as_str() {
        Some(from) if from != status => format!("{id} moved from {from} to {status}"),
        Some(_) => format!("{id} updated; status remains {status}"),
        None => format!("{id} is in {status}"),
    }
}

/// Request as shown to an operator: amounts and dates pre-formatted, plus the
/// next step of the pipeline when one exists.
fn hur_view(request: &HurRequest, display: &DisplayConfig) -> Value {
    let workflow = HurWorkflow::new();
    let next = workflow.next_status(request.status);
    let (current_amount, new_amount) = match &request.amount_change {
        Some(change) => (Some(change.current), Some(change.new)),
        None => (None, None),
    };

    json!({
        "id": request.id.0,
        "status": request.status.label(),
        "next_status": next.map(|status| status.label()),
        "next_action_color": next.and_then(|status| status.action_color()),
        "campaign": {
            "id": request.campaign.id.0,
            "name": request.campaign.name,
        },
        "requester": request.requester,
        "requested_at": render_timestamp(Some(&request.requested_at), display),
        "approver": request.approver,
        "approved_at": render_timestamp(request.approved_at.as_ref(), display),
        "category": request.category,
        "justification": request.justification,
        "line_numbers": request.line_numbers,
        "publisher_io_numbers": request.publisher_io_numbers,
        "current_amount": format_currency(current_amount),
        "new_amount": format_currency(new_amount),
        "comments": request.comments,
        "more_info": request.more_info.as_ref().map(|more_info| json!({
            "requested_by": more_info.requested_by,
            "requested_at": render_timestamp(Some(&more_info.requested_at), display),
        })),
    })
}

fn render_timestamp(value: Option<&DateTime<Utc>>, display: &DisplayConfig) -> String {
    let raw = value.map(DateTime::to_rfc3339);
    if display.show_time {
        format_date_time(raw.as_deref())
    } else {
        format_date(raw.as_deref())
    }
}
