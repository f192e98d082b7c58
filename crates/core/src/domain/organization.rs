use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::campaign::Campaign;
use crate::filter::{FieldSpec, FieldValue, RecordSchema, TableRecord};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganizationKind {
    Agency,
    Advertiser,
    Publisher,
    Holding,
}

impl fmt::Display for OrganizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Agency => "Agency",
            Self::Advertiser => "Advertiser",
            Self::Publisher => "Publisher",
            Self::Holding => "Holding",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub kind: OrganizationKind,
    pub parent_id: Option<OrganizationId>,
    pub country: String,
    pub active: bool,
}

impl Organization {
    /// Sub-organizations aggregated under this holding. Empty for anything
    /// that is not a holding.
    pub fn members<'a>(&self, organizations: &'a [Organization]) -> Vec<&'a Organization> {
        if self.kind != OrganizationKind::Holding {
            return Vec::new();
        }
        organizations
            .iter()
            .filter(|candidate| candidate.parent_id.as_ref() == Some(&self.id))
            .collect()
    }

    /// Campaigns this organization takes part in; holdings include their members'.
    pub fn campaigns(
        &self,
        organizations: &[Organization],
        campaigns: &[Campaign],
    ) -> Vec<Campaign> {
        let mut ids = vec![&self.id];
        ids.extend(self.members(organizations).into_iter().map(|member| &member.id));

        campaigns
            .iter()
            .filter(|campaign| ids.iter().any(|id| campaign.involves(id)))
            .cloned()
            .collect()
    }
}

static ORGANIZATION_SCHEMA: RecordSchema = RecordSchema {
    table: "organizations",
    fields: &[
        FieldSpec::text("id"),
        FieldSpec::text("name"),
        FieldSpec::text("kind"),
        FieldSpec::text("parent_id"),
        FieldSpec::text("country"),
        FieldSpec::flag("active"),
    ],
    search_fields: &["name", "id"],
    date_field: None,
};

impl TableRecord for Organization {
    fn schema() -> &'static RecordSchema {
        &ORGANIZATION_SCHEMA
    }

    fn record_id(&self) -> &str {
        &self.id.0
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::text(&self.id.0)),
            "name" => Some(FieldValue::text(&self.name)),
            "kind" => Some(FieldValue::text(self.kind.to_string())),
            "parent_id" => self.parent_id.as_ref().map(|parent| FieldValue::text(&parent.0)),
            "country" => Some(FieldValue::text(&self.country)),
            "active" => Some(FieldValue::Flag(self.active)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationContact {
    pub id: String,
    pub organization_id: OrganizationId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub primary: bool,
}

static CONTACT_SCHEMA: RecordSchema = RecordSchema {
    table: "contacts",
    fields: &[
        FieldSpec::text("id"),
        FieldSpec::text("organization_id"),
        FieldSpec::text("name"),
        FieldSpec::text("email"),
        FieldSpec::text("role"),
        FieldSpec::text("phone"),
        FieldSpec::flag("primary"),
    ],
    search_fields: &["name", "email", "role"],
    date_field: None,
};

impl TableRecord for OrganizationContact {
    fn schema() -> &'static RecordSchema {
        &CONTACT_SCHEMA
    }

    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::text(&self.id)),
            "organization_id" => Some(FieldValue::text(&self.organization_id.0)),
            "name" => Some(FieldValue::text(&self.name)),
            "email" => Some(FieldValue::text(&self.email)),
            "role" => Some(FieldValue::text(&self.role)),
            "phone" => self.phone.as_deref().map(FieldValue::text),
            "primary" => Some(FieldValue::Flag(self.primary)),
            _ => None,
        }
    }
}
