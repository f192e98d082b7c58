pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod format;
pub mod workflow;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use domain::actor::Actor;
pub use domain::campaign::{Campaign, CampaignId, CampaignStatus, TrafficCampaign};
pub use domain::finance::{Rate, RevenueRow, TradeIncentive};
pub use domain::hur::{HurId, HurRequest, HurStatus};
pub use domain::organization::{Organization, OrganizationContact, OrganizationId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use filter::{
    FilterState, FilterStateError, FilteredView, RecordSchema, SortDirection, SortState,
    TableRecord,
};
pub use workflow::{HurAction, HurTransitionError, HurWorkflow};
