use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::hur::HurId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditCategory {
    Workflow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    Success,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditContext {
    pub request_id: Option<HurId>,
    pub correlation_id: String,
    pub actor: String,
}

impl AuditContext {
    pub fn new(
        request_id: Option<HurId>,
        correlation_id: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self { request_id, correlation_id: correlation_id.into(), actor: actor.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub request_id: Option<HurId>,
    pub correlation_id: String,
    pub event_type: String,
    pub category: AuditCategory,
    pub actor: String,
    pub outcome: AuditOutcome,
    pub metadata: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        request_id: Option<HurId>,
        correlation_id: impl Into<String>,
        event_type: impl Into<String>,
        category: AuditCategory,
        actor: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            request_id,
            correlation_id: correlation_id.into(),
            event_type: event_type.into(),
            category,
            actor: actor.into(),
            outcome,
            metadata: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for InMemoryAuditSink {
    fn emit(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Forwards audit events to the `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        let request_id = event.request_id.as_ref().map_or("unknown", |id| id.0.as_str());
        let metadata = format!("{:?}", event.metadata);
        match event.outcome {
            AuditOutcome::Success => info!(
                event_name = %event.event_type,
                correlation_id = %event.correlation_id,
                request_id,
                actor = %event.actor,
                metadata = %metadata,
                "audit event recorded"
            ),
            AuditOutcome::Rejected => warn!(
                event_name = %event.event_type,
                correlation_id = %event.correlation_id,
                request_id,
                actor = %event.actor,
                outcome = ?event.outcome,
                metadata = %metadata,
                "audit event recorded"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        audit::{
            AuditCategory, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink, TracingAuditSink,
        },
        domain::hur::HurId,
    };

    #[test]
    fn in_memory_sink_records_events_with_correlation_fields() {
        let sink = InMemoryAuditSink::default();
        sink.emit(
            AuditEvent::new(
                Some(HurId("HUR-2025-001".to_owned())),
                "req-123",
                "hur.transition_applied",
                AuditCategory::Workflow,
                "Dana Ortiz",
                AuditOutcome::Success,
            )
            .with_metadata("from", "Review")
            .with_metadata("to", "Approved"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id, "req-123");
        assert_eq!(events[0].request_id.as_ref().map(|id| id.0.as_str()), Some("HUR-2025-001"));
        assert!(events[0].metadata.contains_key("from"));
    }

    #[test]
    fn tracing_sink_accepts_events_without_subscriber() {
        TracingAuditSink.emit(AuditEvent::new(
            None,
            "req-9",
            "hur.transition_rejected",
            AuditCategory::Workflow,
            "system",
            AuditOutcome::Rejected,
        ));
    }
}
