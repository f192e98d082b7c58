use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::campaign::CampaignId;
use crate::domain::organization::OrganizationId;
use crate::filter::{FieldSpec, FieldValue, RecordSchema, TableRecord};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueRow {
    pub id: String,
    pub campaign_id: CampaignId,
    pub campaign_name: String,
    pub advertiser: String,
    pub publisher: String,
    pub country: String,
    pub product_type: String,
    pub month: NaiveDate,
    pub gross_revenue: Decimal,
    pub net_revenue: Decimal,
}

impl RevenueRow {
    pub fn margin(&self) -> Decimal {
        self.gross_revenue - self.net_revenue
    }
}

static REVENUE_SCHEMA: RecordSchema = RecordSchema {
    table: "revenue",
    fields: &[
        FieldSpec::text("id"),
        FieldSpec::text("campaign_id"),
        FieldSpec::text("campaign_name"),
        FieldSpec::text("advertiser"),
        FieldSpec::text("publisher"),
        FieldSpec::text("country"),
        FieldSpec::text("product_type"),
        FieldSpec::date("month"),
        FieldSpec::number("gross_revenue"),
        FieldSpec::number("net_revenue"),
    ],
    search_fields: &["campaign_name", "campaign_id", "advertiser", "publisher"],
    date_field: Some("month"),
};

impl TableRecord for RevenueRow {
    fn schema() -> &'static RecordSchema {
        &REVENUE_SCHEMA
    }

    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::text(&self.id)),
            "campaign_id" => Some(FieldValue::text(&self.campaign_id.0)),
            "campaign_name" => Some(FieldValue::text(&self.campaign_name)),
            "advertiser" => Some(FieldValue::text(&self.advertiser)),
            "publisher" => Some(FieldValue::text(&self.publisher)),
            "country" => Some(FieldValue::text(&self.country)),
            "product_type" => Some(FieldValue::text(&self.product_type)),
            "month" => Some(FieldValue::date(self.month.to_string())),
            "gross_revenue" => Some(FieldValue::Number(self.gross_revenue)),
            "net_revenue" => Some(FieldValue::Number(self.net_revenue)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncentiveType {
    Fixed,
    Volume,
    /// Tiered rebate.
    Scale,
    OnTop,
}

impl fmt::Display for IncentiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fixed => "Fixed",
            Self::Volume => "Volume",
            Self::Scale => "Scale",
            Self::OnTop => "On Top",
        };
        f.write_str(label)
    }
}

/// Negotiated rebate rule for an organization in one country/product combination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIncentive {
    pub id: String,
    pub organization_id: OrganizationId,
    pub organization_name: String,
    pub country: String,
    pub product_type: String,
    pub incentive_type: IncentiveType,
    pub percentage: Decimal,
    pub valid_from: NaiveDate,
    pub active: bool,
}

static INCENTIVE_SCHEMA: RecordSchema = RecordSchema {
    table: "incentives",
    fields: &[
        FieldSpec::text("id"),
        FieldSpec::text("organization_id"),
        FieldSpec::text("organization_name"),
        FieldSpec::text("country"),
        FieldSpec::text("product_type"),
        FieldSpec::text("incentive_type"),
        FieldSpec::number("percentage"),
        FieldSpec::date("valid_from"),
        FieldSpec::flag("active"),
    ],
    search_fields: &["organization_name", "id", "product_type"],
    date_field: Some("valid_from"),
};

impl TableRecord for TradeIncentive {
    fn schema() -> &'static RecordSchema {
        &INCENTIVE_SCHEMA
    }

    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::text(&self.id)),
            "organization_id" => Some(FieldValue::text(&self.organization_id.0)),
            "organization_name" => Some(FieldValue::text(&self.organization_name)),
            "country" => Some(FieldValue::text(&self.country)),
            "product_type" => Some(FieldValue::text(&self.product_type)),
            "incentive_type" => Some(FieldValue::text(self.incentive_type.to_string())),
            "percentage" => Some(FieldValue::Number(self.percentage)),
            "valid_from" => Some(FieldValue::date(self.valid_from.to_string())),
            "active" => Some(FieldValue::Flag(self.active)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub id: String,
    pub publisher: String,
    pub format: String,
    pub size: String,
    pub purchase_type: String,
    pub rate: Decimal,
    pub currency: String,
    pub effective_date: NaiveDate,
}

static RATE_SCHEMA: RecordSchema = RecordSchema {
    table: "rates",
    fields: &[
        FieldSpec::text("id"),
        FieldSpec::text("publisher"),
        FieldSpec::text("format"),
        FieldSpec::text("size"),
        FieldSpec::text("purchase_type"),
        FieldSpec::number("rate"),
        FieldSpec::text("currency"),
        FieldSpec::date("effective_date"),
    ],
    search_fields: &["publisher", "format", "size"],
    date_field: Some("effective_date"),
};

impl TableRecord for Rate {
    fn schema() -> &'static RecordSchema {
        &RATE_SCHEMA
    }

    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::text(&self.id)),
            "publisher" => Some(FieldValue::text(&self.publisher)),
            "format" => Some(FieldValue::text(&self.format)),
            "size" => Some(FieldValue::text(&self.size)),
            "purchase_type" => Some(FieldValue::text(&self.purchase_type)),
            "rate" => Some(FieldValue::Number(self.rate)),
            "currency" => Some(FieldValue::text(&self.currency)),
            "effective_date" => Some(FieldValue::date(self.effective_date.to_string())),
            _ => None,
        }
    }
}
