use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::hur::{HurRequest, HurStatus};

/// Happy path of a request, from intake to completion.
pub const FORWARD_SEQUENCE: [HurStatus; 8] = [
    HurStatus::Review,
    HurStatus::Approved,
    HurStatus::RemoveInvoice,
    HurStatus::ReopenCampaign,
    HurStatus::Editing,
    HurStatus::CloseCampaign,
    HurStatus::CloseInvoicePeriod,
    HurStatus::Completed,
];

pub const REJECTION_COMMENT: &str = "Request not approved";

pub fn next_status(current: HurStatus) -> Option<HurStatus> {
    use HurStatus::{
        Approved, CloseCampaign, CloseInvoicePeriod, Completed, Editing, MoreInfo, NotApproved,
        RemoveInvoice, ReopenCampaign, Review,
    };

    match current {
        Review => Some(Approved),
        MoreInfo => Some(Approved),
        Approved => Some(RemoveInvoice),
        RemoveInvoice => Some(ReopenCampaign),
        ReopenCampaign => Some(Editing),
        Editing => Some(CloseCampaign),
        CloseCampaign => Some(CloseInvoicePeriod),
        CloseInvoicePeriod => Some(Completed),
        Completed | NotApproved => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HurAction {
    Advance,
    Reject,
    RequestMoreInfo { comments: String },
}

impl HurAction {
    pub fn kind(&self) -> HurActionKind {
        match self {
            Self::Advance => HurActionKind::Advance,
            Self::Reject => HurActionKind::Reject,
            Self::RequestMoreInfo { .. } => HurActionKind::RequestMoreInfo,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HurActionKind {
    Advance,
    Reject,
    RequestMoreInfo,
}

impl fmt::Display for HurActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Advance => "advance",
            Self::Reject => "reject",
            Self::RequestMoreInfo => "request_more_info",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: HurStatus,
    pub to: HurStatus,
    pub action: HurActionKind,
    pub request: HurRequest,
}
