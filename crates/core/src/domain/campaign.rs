use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::organization::OrganizationId;
use crate::filter::{FieldSpec, FieldValue, RecordSchema, TableRecord};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Pending,
    Live,
    Paused,
    Closed,
}

impl CampaignStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Live => "Live",
            Self::Paused => "Paused",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single line item of a campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdUnit {
    pub line_number: String,
    pub publisher: String,
    pub format: String,
    pub size: String,
    pub investment: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub advertiser_id: OrganizationId,
    pub advertiser: String,
    pub agency_id: Option<OrganizationId>,
    pub agency: Option<String>,
    pub publisher_id: OrganizationId,
    pub publisher: String,
    pub account: String,
    pub status: CampaignStatus,
    pub division: String,
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub investment: Decimal,
    pub modified_ad_units: bool,
    pub ad_units: Vec<AdUnit>,
}

impl Campaign {
    pub fn involves(&self, organization: &OrganizationId) -> bool {
        &self.advertiser_id == organization
            || &self.publisher_id == organization
            || self.agency_id.as_ref() == Some(organization)
    }

    pub fn ad_unit(&self, line_number: &str) -> Option<&AdUnit> {
        self.ad_units.iter().find(|unit| unit.line_number == line_number)
    }
}

static CAMPAIGN_SCHEMA: RecordSchema = RecordSchema {
    table: "campaigns",
    fields: &[
        FieldSpec::text("id"),
        FieldSpec::text("name"),
        FieldSpec::text("advertiser"),
        FieldSpec::text("agency"),
        FieldSpec::text("publisher"),
        FieldSpec::text("account"),
        FieldSpec::text("status"),
        FieldSpec::text("division"),
        FieldSpec::text("country"),
        FieldSpec::date("start_date"),
        FieldSpec::date("end_date"),
        FieldSpec::number("investment"),
        FieldSpec::flag("modified_ad_units"),
    ],
    search_fields: &["name", "id", "publisher", "advertiser"],
    date_field: Some("start_date"),
};

impl TableRecord for Campaign {
    fn schema() -> &'static RecordSchema {
        &CAMPAIGN_SCHEMA
    }

    fn record_id(&self) -> &str {
        &self.id.0
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::text(&self.id.0)),
            "name" => Some(FieldValue::text(&self.name)),
            "advertiser" => Some(FieldValue::text(&self.advertiser)),
            "agency" => self.agency.as_deref().map(FieldValue::text),
            "publisher" => Some(FieldValue::text(&self.publisher)),
            "account" => Some(FieldValue::text(&self.account)),
            "status" => Some(FieldValue::text(self.status.label())),
            "division" => Some(FieldValue::text(&self.division)),
            "country" => Some(FieldValue::text(&self.country)),
            "start_date" => Some(FieldValue::date(self.start_date.to_string())),
            "end_date" => Some(FieldValue::date(self.end_date.to_string())),
            "investment" => Some(FieldValue::Number(self.investment)),
            "modified_ad_units" => Some(FieldValue::Flag(self.modified_ad_units)),
            _ => None,
        }
    }
}

/// Campaign as seen by traffic management.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficCampaign {
    pub id: String,
    pub campaign_id: CampaignId,
    pub name: String,
    pub advertiser: String,
    pub publisher: String,
    pub status: CampaignStatus,
    pub priority: String,
    pub service_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub modified_ad_units: bool,
}

static TRAFFIC_SCHEMA: RecordSchema = RecordSchema {
    table: "traffic",
    fields: &[
        FieldSpec::text("id"),
        FieldSpec::text("campaign_id"),
        FieldSpec::text("name"),
        FieldSpec::text("advertiser"),
        FieldSpec::text("publisher"),
        FieldSpec::text("status"),
        FieldSpec::text("priority"),
        FieldSpec::text("service_type"),
        FieldSpec::date("start_date"),
        FieldSpec::date("end_date"),
        FieldSpec::flag("modified_ad_units"),
    ],
    search_fields: &["name", "campaign_id", "publisher", "advertiser"],
    date_field: Some("start_date"),
};

impl TableRecord for TrafficCampaign {
    fn schema() -> &'static RecordSchema {
        &TRAFFIC_SCHEMA
    }

    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::text(&self.id)),
            "campaign_id" => Some(FieldValue::text(&self.campaign_id.0)),
            "name" => Some(FieldValue::text(&self.name)),
            "advertiser" => Some(FieldValue::text(&self.advertiser)),
            "publisher" => Some(FieldValue::text(&self.publisher)),
            "status" => Some(FieldValue::text(self.status.label())),
            "priority" => Some(FieldValue::text(&self.priority)),
            "service_type" => Some(FieldValue::text(&self.service_type)),
            "start_date" => Some(FieldValue::date(self.start_date.to_string())),
            "end_date" => Some(FieldValue::date(self.end_date.to_string())),
            "modified_ad_units" => Some(FieldValue::Flag(self.modified_ad_units)),
            _ => None,
        }
    }
}
