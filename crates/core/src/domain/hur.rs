use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::actor::Actor;
use crate::domain::campaign::CampaignId;
use crate::filter::{FieldSpec, FieldValue, RecordSchema, TableRecord};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HurId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HurStatus {
    Review,
    Approved,
    #[serde(rename = "Remove Invoice")]
    RemoveInvoice,
    #[serde(rename = "Re-open Campaign")]
    ReopenCampaign,
    Editing,
    #[serde(rename = "Close Campaign")]
    CloseCampaign,
    #[serde(rename = "Close Invoice Period")]
    CloseInvoicePeriod,
    Completed,
    #[serde(rename = "Not Approved")]
    NotApproved,
    #[serde(rename = "More Info")]
    MoreInfo,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown HUR status `{0}`")]
pub struct UnknownHurStatus(pub String);

impl HurStatus {
    pub const ALL: [Self; 10] = [
        Self::Review,
        Self::Approved,
        Self::RemoveInvoice,
        Self::ReopenCampaign,
        Self::Editing,
        Self::CloseCampaign,
        Self::CloseInvoicePeriod,
        Self::Completed,
        Self::NotApproved,
        Self::MoreInfo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Review => "Review",
            Self::Approved => "Approved",
            Self::RemoveInvoice => "Remove Invoice",
            Self::ReopenCampaign => "Re-open Campaign",
            Self::Editing => "Editing",
            Self::CloseCampaign => "Close Campaign",
            Self::CloseInvoicePeriod => "Close Invoice Period",
            Self::Completed => "Completed",
            Self::NotApproved => "Not Approved",
            Self::MoreInfo => "More Info",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::NotApproved)
    }

    /// Button color shown for the action that moves a request into this status.
    pub fn action_color(self) -> Option<&'static str> {
        match self {
            Self::Review => None,
            Self::Approved => Some("green"),
            Self::RemoveInvoice => Some("amber"),
            Self::ReopenCampaign => Some("blue"),
            Self::Editing => Some("indigo"),
            Self::CloseCampaign => Some("orange"),
            Self::CloseInvoicePeriod => Some("purple"),
            Self::Completed => Some("emerald"),
            Self::NotApproved => Some("red"),
            Self::MoreInfo => Some("yellow"),
        }
    }
}

impl fmt::Display for HurStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HurStatus {
    type Err = UnknownHurStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownHurStatus(value.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRef {
    pub id: CampaignId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountChange {
    pub current: Decimal,
    pub new: Decimal,
}

impl AmountChange {
    pub fn delta(&self) -> Decimal {
        self.new - self.current
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoreInfoRequest {
    pub requested_by: Actor,
    pub requested_at: DateTime<Utc>,
}

/// A change request against a closed campaign, moved through its approval
/// pipeline by the workflow engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurRequest {
    pub id: HurId,
    pub status: HurStatus,
    pub campaign: CampaignRef,
    pub requester: String,
    pub requested_at: DateTime<Utc>,
    pub approver: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub justification: String,
    pub category: String,
    pub line_numbers: BTreeSet<String>,
    pub publisher_io_numbers: BTreeSet<String>,
    pub amount_change: Option<AmountChange>,
    pub comments: Option<String>,
    pub more_info: Option<MoreInfoRequest>,
}

static HUR_SCHEMA: RecordSchema = RecordSchema {
    table: "hurs",
    fields: &[
        FieldSpec::text("id"),
        FieldSpec::text("status"),
        FieldSpec::text("campaign_id"),
        FieldSpec::text("campaign_name"),
        FieldSpec::text("requester"),
        FieldSpec::text("approver"),
        FieldSpec::text("category"),
        FieldSpec::date("requested_at"),
        FieldSpec::number("amount_delta"),
        FieldSpec::flag("awaiting_info"),
    ],
    search_fields: &["id", "campaign_id", "campaign_name", "requester", "category"],
    date_field: Some("requested_at"),
};

impl TableRecord for HurRequest {
    fn schema() -> &'static RecordSchema {
        &HUR_SCHEMA
    }

    fn record_id(&self) -> &str {
        &self.id.0
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::text(&self.id.0)),
            "status" => Some(FieldValue::text(self.status.label())),
            "campaign_id" => Some(FieldValue::text(&self.campaign.id.0)),
            "campaign_name" => Some(FieldValue::text(&self.campaign.name)),
            "requester" => Some(FieldValue::text(&self.requester)),
            "approver" => self.approver.as_deref().map(FieldValue::text),
            "category" => Some(FieldValue::text(&self.category)),
            "requested_at" => Some(FieldValue::date(self.requested_at.to_rfc3339())),
            "amount_delta" => {
                self.amount_change.as_ref().map(|change| FieldValue::Number(change.delta()))
            }
            "awaiting_info" => Some(FieldValue::Flag(self.more_info.is_some())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HurStatus;

    #[test]
    fn status_labels_round_trip_through_from_str() {
        for status in HurStatus::ALL {
            assert_eq!(status.label().parse::<HurStatus>(), Ok(status));
        }
        assert_eq!("re-open campaign".parse::<HurStatus>(), Ok(HurStatus::ReopenCampaign));
        assert!("Archived".parse::<HurStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_display_labels() {
        let json = serde_json::to_string(&HurStatus::CloseInvoicePeriod).expect("serialize");
        assert_eq!(json, "\"Close Invoice Period\"");
        let parsed: HurStatus = serde_json::from_str("\"Not Approved\"").expect("deserialize");
        assert_eq!(parsed, HurStatus::NotApproved);
    }

    #[test]
    fn only_completed_and_not_approved_are_terminal() {
        let terminal: Vec<_> = HurStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![HurStatus::Completed, HurStatus::NotApproved]);
        assert_eq!(HurStatus::Review.action_color(), None);
        assert!(HurStatus::ALL
            .into_iter()
            .filter(|status| *status != HurStatus::Review)
            .all(|status| status.action_color().is_some()));
    }
}
