use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::info;

use adops_core::domain::actor::Actor;
use adops_core::domain::campaign::{AdUnit, Campaign, CampaignId, CampaignStatus, TrafficCampaign};
use adops_core::domain::finance::{IncentiveType, Rate, RevenueRow, TradeIncentive};
use adops_core::domain::hur::{
    AmountChange, CampaignRef, HurId, HurRequest, HurStatus, MoreInfoRequest,
};
use adops_core::domain::organization::{
    Organization, OrganizationContact, OrganizationId, OrganizationKind,
};
use adops_core::filter::TableRecord;

use crate::repositories::InMemoryRepository;

/// The mock records every console table starts from.
#[derive(Clone, Debug, Default)]
pub struct MockDataset {
    pub organizations: Vec<Organization>,
    pub contacts: Vec<OrganizationContact>,
    pub campaigns: Vec<Campaign>,
    pub traffic: Vec<TrafficCampaign>,
    pub revenue: Vec<RevenueRow>,
    pub incentives: Vec<TradeIncentive>,
    pub rates: Vec<Rate>,
    pub hurs: Vec<HurRequest>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableCount {
    pub table: &'static str,
    pub records: usize,
}

/// One repository per table, seeded from a [`MockDataset`].
pub struct MockStore {
    pub organizations: InMemoryRepository<Organization>,
    pub contacts: InMemoryRepository<OrganizationContact>,
    pub campaigns: InMemoryRepository<Campaign>,
    pub traffic: InMemoryRepository<TrafficCampaign>,
    pub revenue: InMemoryRepository<RevenueRow>,
    pub incentives: InMemoryRepository<TradeIncentive>,
    pub rates: InMemoryRepository<Rate>,
    pub hurs: InMemoryRepository<HurRequest>,
}

impl MockStore {
    pub fn seeded() -> Self {
        Self::from_dataset(MockDataset::seeded())
    }

    pub fn from_dataset(dataset: MockDataset) -> Self {
        let counts = dataset.counts();
        info!(
            event_name = "fixtures.seeded",
            tables = counts.len(),
            records = counts.iter().map(|count| count.records).sum::<usize>(),
            "mock dataset seeded"
        );

        Self {
            organizations: InMemoryRepository::new(dataset.organizations),
            contacts: InMemoryRepository::new(dataset.contacts),
            campaigns: InMemoryRepository::new(dataset.campaigns),
            traffic: InMemoryRepository::new(dataset.traffic),
            revenue: InMemoryRepository::new(dataset.revenue),
            incentives: InMemoryRepository::new(dataset.incentives),
            rates: InMemoryRepository::new(dataset.rates),
            hurs: InMemoryRepository::new(dataset.hurs),
        }
    }
}

impl MockDataset {
    pub fn seeded() -> Self {
        Self {
            organizations: organizations(),
            contacts: contacts(),
            campaigns: campaigns(),
            traffic: traffic(),
            revenue: revenue(),
            incentives: incentives(),
            rates: rates(),
            hurs: hurs(),
        }
    }

    pub fn counts(&self) -> Vec<TableCount> {
        vec![
            count(&self.organizations),
            count(&self.contacts),
            count(&self.campaigns),
            count(&self.traffic),
            count(&self.revenue),
            count(&self.incentives),
            count(&self.rates),
            count(&self.hurs),
        ]
    }
}

fn count<T: TableRecord>(records: &[T]) -> TableCount {
    TableCount { table: T::schema().table, records: records.len() }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single().unwrap_or_default()
}

fn org_id(id: &str) -> OrganizationId {
    OrganizationId(id.to_string())
}

fn organization(
    id: &str,
    name: &str,
    kind: OrganizationKind,
    parent: Option<&str>,
    country: &str,
) -> Organization {
    Organization {
        id: org_id(id),
        name: name.to_string(),
        kind,
        parent_id: parent.map(org_id),
        country: country.to_string(),
        active: true,
    }
}

fn organizations() -> Vec<Organization> {
    let mut inactive = organization(
        "ORG-A3",
        "Blue Harbor Media",
        OrganizationKind::Agency,
        None,
        "Chile",
    );
    inactive.active = false;

    vec![
        organization("ORG-H1", "Publicis Groupe", OrganizationKind::Holding, None, "France"),
        organization("ORG-A1", "Starcom", OrganizationKind::Agency, Some("ORG-H1"), "Mexico"),
        organization("ORG-A2", "Zenith", OrganizationKind::Agency, Some("ORG-H1"), "Argentina"),
        inactive,
        organization("ORG-V1", "Mercado Libre", OrganizationKind::Advertiser, None, "Argentina"),
        organization("ORG-V2", "Coca-Cola", OrganizationKind::Advertiser, None, "Mexico"),
        organization("ORG-P1", "Fandom", OrganizationKind::Publisher, None, "United States"),
        organization("ORG-P2", "Taboola", OrganizationKind::Publisher, None, "Israel"),
    ]
}

fn contact(
    id: &str,
    organization: &str,
    name: &str,
    email: &str,
    role: &str,
    primary: bool,
) -> OrganizationContact {
    OrganizationContact {
        id: id.to_string(),
        organization_id: org_id(organization),
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        phone: None,
        primary,
    }
}

fn contacts() -> Vec<OrganizationContact> {
    let mut billing =
        contact("CT-3", "ORG-V1", "Martin Gomez", "mgomez@mercadolibre.example", "Billing", false);
    billing.phone = Some("+54 11 4640-8000".to_string());

    vec![
        contact("CT-1", "ORG-A1", "Sofia Herrera", "sherrera@starcom.example", "Planner", true),
        contact("CT-2", "ORG-A2", "Diego Paz", "diego.paz@zenith.example", "Buyer", true),
        billing,
        contact("CT-4", "ORG-P1", "Amy Chen", "amy.chen@fandom.example", "Account Manager", true),
    ]
}

fn ad_unit(line: &str, publisher: &str, format: &str, size: &str, investment: i64) -> AdUnit {
    AdUnit {
        line_number: line.to_string(),
        publisher: publisher.to_string(),
        format: format.to_string(),
        size: size.to_string(),
        investment: Decimal::new(investment, 0),
    }
}

fn campaigns() -> Vec<Campaign> {
    vec![
        Campaign {
            id: CampaignId("CMP-1001".to_string()),
            name: "Fandom - Mercado Libre Hot Sale".to_string(),
            advertiser_id: org_id("ORG-V1"),
            advertiser: "Mercado Libre".to_string(),
            agency_id: Some(org_id("ORG-A1")),
            agency: Some("Starcom".to_string()),
            publisher_id: org_id("ORG-P1"),
            publisher: "Fandom".to_string(),
            account: "LATAM Retail".to_string(),
            status: CampaignStatus::Closed,
            division: "Direct".to_string(),
            country: "Argentina".to_string(),
            start_date: date(2025, 3, 1),
            end_date: date(2025, 4, 30),
            investment: Decimal::new(37_500, 0),
            modified_ad_units: true,
            ad_units: vec![
                ad_unit("L-1", "Fandom", "Display", "300x250", 22_500),
                ad_unit("L-2", "Fandom", "Video", "16:9", 15_000),
            ],
        },
        Campaign {
            id: CampaignId("CMP-1002".to_string()),
            name: "Taboola - Coca-Cola Summer".to_string(),
            advertiser_id: org_id("ORG-V2"),
            advertiser: "Coca-Cola".to_string(),
            agency_id: Some(org_id("ORG-A2")),
            agency: Some("Zenith".to_string()),
            publisher_id: org_id("ORG-P2"),
            publisher: "Taboola".to_string(),
            account: "Beverages".to_string(),
            status: CampaignStatus::Live,
            division: "Programmatic".to_string(),
            country: "Mexico".to_string(),
            start_date: date(2025, 4, 15),
            end_date: date(2025, 8, 31),
            investment: Decimal::new(120_000, 0),
            modified_ad_units: false,
            ad_units: vec![ad_unit("L-1", "Taboola", "Native", "1200x628", 120_000)],
        },
        Campaign {
            id: CampaignId("CMP-1003".to_string()),
            name: "Fandom - Coca-Cola Gaming".to_string(),
            advertiser_id: org_id("ORG-V2"),
            advertiser: "Coca-Cola".to_string(),
            agency_id: None,
            agency: None,
            publisher_id: org_id("ORG-P1"),
            publisher: "Fandom".to_string(),
            account: "Beverages".to_string(),
            status: CampaignStatus::Pending,
            division: "Direct".to_string(),
            country: "Mexico".to_string(),
            start_date: date(2025, 6, 1),
            end_date: date(2025, 7, 15),
            investment: Decimal::new(8_250_050, 2),
            modified_ad_units: false,
            ad_units: vec![ad_unit("L-1", "Fandom", "Display", "728x90", 82_500)],
        },
    ]
}

fn traffic() -> Vec<TrafficCampaign> {
    let row = |id: &str, campaign: &str, name: &str, advertiser: &str, publisher: &str| {
        TrafficCampaign {
            id: id.to_string(),
            campaign_id: CampaignId(campaign.to_string()),
            name: name.to_string(),
            advertiser: advertiser.to_string(),
            publisher: publisher.to_string(),
            status: CampaignStatus::Live,
            priority: "Standard".to_string(),
            service_type: "Managed".to_string(),
            start_date: date(2025, 3, 1),
            end_date: date(2025, 4, 30),
            modified_ad_units: false,
        }
    };

    let mut hot_sale = row("TR-1", "CMP-1001", "Hot Sale Display", "Mercado Libre", "Fandom");
    hot_sale.status = CampaignStatus::Closed;
    hot_sale.modified_ad_units = true;
    hot_sale.priority = "High".to_string();

    let mut summer = row("TR-2", "CMP-1002", "Summer Native", "Coca-Cola", "Taboola");
    summer.start_date = date(2025, 4, 15);
    summer.end_date = date(2025, 8, 31);
    summer.service_type = "Self Service".to_string();

    let mut gaming = row("TR-3", "CMP-1003", "Gaming Leaderboard", "Coca-Cola", "Fandom");
    gaming.status = CampaignStatus::Pending;
    gaming.start_date = date(2025, 6, 1);
    gaming.end_date = date(2025, 7, 15);

    vec![hot_sale, summer, gaming]
}

struct RevenueSeed {
    id: &'static str,
    campaign: &'static str,
    campaign_name: &'static str,
    advertiser: &'static str,
    publisher: &'static str,
    country: &'static str,
    product_type: &'static str,
    month: (i32, u32),
    gross: i64,
    net: i64,
}

const REVENUE_SEEDS: &[RevenueSeed] = &[
    RevenueSeed {
        id: "RV-1",
        campaign: "CMP-1001",
        campaign_name: "Fandom - Mercado Libre Hot Sale",
        advertiser: "Mercado Libre",
        publisher: "Fandom",
        country: "Argentina",
        product_type: "Display",
        month: (2025, 3),
        gross: 18_000,
        net: 14_400,
    },
    RevenueSeed {
        id: "RV-2",
        campaign: "CMP-1001",
        campaign_name: "Fandom - Mercado Libre Hot Sale",
        advertiser: "Mercado Libre",
        publisher: "Fandom",
        country: "Argentina",
        product_type: "Video",
        month: (2025, 4),
        gross: 19_500,
        net: 15_600,
    },
    RevenueSeed {
        id: "RV-3",
        campaign: "CMP-1002",
        campaign_name: "Taboola - Coca-Cola Summer",
        advertiser: "Coca-Cola",
        publisher: "Taboola",
        country: "Mexico",
        product_type: "Native",
        month: (2025, 5),
        gross: 41_000,
        net: 32_800,
    },
];

fn revenue() -> Vec<RevenueRow> {
    REVENUE_SEEDS
        .iter()
        .map(|seed| RevenueRow {
            id: seed.id.to_string(),
            campaign_id: CampaignId(seed.campaign.to_string()),
            campaign_name: seed.campaign_name.to_string(),
            advertiser: seed.advertiser.to_string(),
            publisher: seed.publisher.to_string(),
            country: seed.country.to_string(),
            product_type: seed.product_type.to_string(),
            month: date(seed.month.0, seed.month.1, 1),
            gross_revenue: Decimal::new(seed.gross, 0),
            net_revenue: Decimal::new(seed.net, 0),
        })
        .collect()
}

fn incentives() -> Vec<TradeIncentive> {
    vec![
        TradeIncentive {
            id: "TI-1".to_string(),
            organization_id: org_id("ORG-A1"),
            organization_name: "Starcom".to_string(),
            country: "Mexico".to_string(),
            product_type: "Display".to_string(),
            incentive_type: IncentiveType::Volume,
            percentage: Decimal::new(125, 1),
            valid_from: date(2025, 1, 1),
            active: true,
        },
        TradeIncentive {
            id: "TI-2".to_string(),
            organization_id: org_id("ORG-A2"),
            organization_name: "Zenith".to_string(),
            country: "Argentina".to_string(),
            product_type: "Video".to_string(),
            incentive_type: IncentiveType::OnTop,
            percentage: Decimal::new(3, 0),
            valid_from: date(2025, 2, 1),
            active: true,
        },
        TradeIncentive {
            id: "TI-3".to_string(),
            organization_id: org_id("ORG-H1"),
            organization_name: "Publicis Groupe".to_string(),
            country: "Mexico".to_string(),
            product_type: "Native".to_string(),
            incentive_type: IncentiveType::Scale,
            percentage: Decimal::new(75, 1),
            valid_from: date(2024, 7, 1),
            active: false,
        },
    ]
}

fn rate(id: &str, publisher: &str, format: &str, size: &str, cents: i64, from: NaiveDate) -> Rate {
    Rate {
        id: id.to_string(),
        publisher: publisher.to_string(),
        format: format.to_string(),
        size: size.to_string(),
        purchase_type: "CPM".to_string(),
        rate: Decimal::new(cents, 2),
        currency: "USD".to_string(),
        effective_date: from,
    }
}

fn rates() -> Vec<Rate> {
    let mut video = rate("RT-3", "Fandom", "Video", "16:9", 1_800, date(2025, 1, 1));
    video.purchase_type = "CPCV".to_string();

    vec![
        rate("RT-1", "Fandom", "Display", "300x250", 450, date(2025, 1, 1)),
        rate("RT-2", "Taboola", "Native", "1200x628", 325, date(2025, 3, 1)),
        video,
    ]
}

fn hur(id: &str, status: HurStatus, requested_at: DateTime<Utc>) -> HurRequest {
    HurRequest {
        id: HurId(id.to_string()),
        status,
        campaign: CampaignRef {
            id: CampaignId("CMP-1001".to_string()),
            name: "Fandom - Mercado Libre Hot Sale".to_string(),
        },
        requester: "Luis Romero".to_string(),
        requested_at,
        approver: None,
        approved_at: None,
        justification: "Publisher under-delivered on the April flight".to_string(),
        category: "Amount Adjustment".to_string(),
        line_numbers: BTreeSet::from(["L-1".to_string()]),
        publisher_io_numbers: BTreeSet::from(["IO-88231".to_string()]),
        amount_change: Some(AmountChange {
            current: Decimal::new(22_500, 0),
            new: Decimal::new(19_000, 0),
        }),
        comments: None,
        more_info: None,
    }
}

fn hurs() -> Vec<HurRequest> {
    let finance = Actor::new("Dana Ortiz", "Finance Manager", "dana.ortiz@adops.example");

    let review = hur("HUR-2025-001", HurStatus::Review, timestamp(2025, 5, 2, 9, 15));

    let mut more_info = hur("HUR-2025-002", HurStatus::MoreInfo, timestamp(2025, 5, 6, 11, 0));
    more_info.category = "Line Item Change".to_string();
    more_info.line_numbers = BTreeSet::from(["L-1".to_string(), "L-2".to_string()]);
    more_info.amount_change = None;
    more_info.comments = Some("Attach the publisher delivery report".to_string());
    more_info.more_info = Some(MoreInfoRequest {
        requested_by: finance.clone(),
        requested_at: timestamp(2025, 5, 7, 8, 30),
    });

    let mut editing = hur("HUR-2025-003", HurStatus::Editing, timestamp(2025, 4, 20, 16, 45));
    editing.campaign = CampaignRef {
        id: CampaignId("CMP-1002".to_string()),
        name: "Taboola - Coca-Cola Summer".to_string(),
    };
    editing.requester = "Carla Mendez".to_string();
    editing.approver = Some(finance.name.clone());
    editing.approved_at = Some(timestamp(2025, 4, 22, 10, 0));
    editing.publisher_io_numbers = BTreeSet::from(["IO-90112".to_string()]);

    let mut completed = hur("HUR-2025-004", HurStatus::Completed, timestamp(2025, 3, 3, 13, 5));
    completed.approver = Some(finance.name.clone());
    completed.approved_at = Some(timestamp(2025, 3, 28, 17, 20));

    let mut rejected = hur("HUR-2025-005", HurStatus::NotApproved, timestamp(2025, 4, 1, 9, 0));
    rejected.approver = Some(finance.name);
    rejected.approved_at = Some(timestamp(2025, 4, 2, 9, 30));
    rejected.comments = Some("Request not approved".to_string());

    vec![review, more_info, editing, completed, rejected]
}
