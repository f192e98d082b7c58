use adops_core::config::LoadOptions;
use adops_core::errors::ApplicationError;
use adops_core::filter::{FilterState, SortState, TableRecord};
use adops_core::format::{format_currency, format_date, format_percentage};
use adops_core::{
    Campaign, HurRequest, Organization, OrganizationContact, Rate, RevenueRow, TradeIncentive,
    TrafficCampaign,
};
use chrono::NaiveDate;
use adops_db::{MockStore, RecordRepository};
use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::commands::{build_runtime, correlation_id, load_config, CommandResult, EXIT_REJECTED};

const COMMAND: &str = "list";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Table {
    Campaigns,
    Revenue,
    Traffic,
    Incentives,
    Contacts,
    Rates,
    Organizations,
    Hurs,
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    #[arg(value_enum, help = "Table to list")]
    pub table: Table,
    #[arg(long, help = "Case-insensitive text matched against the table's search fields")]
    pub search: Option<String>,
    #[arg(long = "select", value_name = "DIM=VALUE", help = "Multi-select value; repeatable")]
    pub select: Vec<String>,
    #[arg(long = "only", value_name = "DIM=VALUE", help = "Single-select value (`All` clears)")]
    pub only: Vec<String>,
    #[arg(long, value_name = "YYYY-MM-DD", help = "Inclusive lower date bound")]
    pub from: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD", help = "Inclusive upper date bound")]
    pub to: Option<String>,
    #[arg(long = "flag", value_name = "NAME", help = "Require a boolean field to be true")]
    pub flags: Vec<String>,
    #[arg(long, help = "Field to sort by")]
    pub sort: Option<String>,
    #[arg(long, requires = "sort", help = "Sort descending")]
    pub desc: bool,
}

impl ListArgs {
    pub fn for_table(table: Table) -> Self {
        Self {
            table,
            search: None,
            select: Vec::new(),
            only: Vec::new(),
            from: None,
            to: None,
            flags: Vec::new(),
            sort: None,
            desc: false,
        }
    }

    pub fn filter_state(&self) -> Result<FilterState> {
        let mut state = FilterState::default();
        if let Some(term) = &self.search {
            state = state.with_search(term.clone());
        }
        for raw in &self.select {
            let (dimension, value) = split_pair("--select", raw)?;
            state = state.with_selected(dimension, [value]);
        }
        for raw in &self.only {
            let (dimension, value) = split_pair("--only", raw)?;
            state = state.with_single(dimension, value);
        }
        if self.from.is_some() || self.to.is_some() {
            state = state.with_date_range(self.from.as_deref(), self.to.as_deref());
        }
        for flag in &self.flags {
            state = state.with_flag(flag.clone(), true);
        }
        Ok(state)
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort.as_ref().map(|field| {
            if self.desc {
                SortState::descending(field.clone())
            } else {
                SortState::ascending(field.clone())
            }
        })
    }
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns",
            Self::Revenue => "revenue",
            Self::Traffic => "traffic",
            Self::Incentives => "incentives",
            Self::Contacts => "contacts",
            Self::Rates => "rates",
            Self::Organizations => "organizations",
            Self::Hurs => "hurs",
        }
    }
}

pub fn run(args: &ListArgs, options: LoadOptions) -> CommandResult {
    let state = match args.filter_state() {
        Ok(state) => state,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "malformed_filter",
                error.to_string(),
                EXIT_REJECTED,
            );
        }
    };
    let sort = args.sort_state();

    if let Err(failure) = load_config(COMMAND, options) {
        return failure;
    }
    let runtime = match build_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let correlation_id = correlation_id();
    let store = MockStore::seeded();
    let result = runtime.block_on(async {
        let sort = sort.as_ref();
        match args.table {
            Table::Campaigns => list_table(&store.campaigns, &state, sort).await,
            Table::Revenue => list_table(&store.revenue, &state, sort).await,
            Table::Traffic => list_table(&store.traffic, &state, sort).await,
            Table::Incentives => list_table(&store.incentives, &state, sort).await,
            Table::Contacts => list_table(&store.contacts, &state, sort).await,
            Table::Rates => list_table(&store.rates, &state, sort).await,
            Table::Organizations => list_table(&store.organizations, &state, sort).await,
            Table::Hurs => list_table(&store.hurs, &state, sort).await,
        }
    });

    match result {
        Ok(records) => {
            info!(
                event_name = "cli.list.completed",
                correlation_id = %correlation_id,
                table = args.table.name(),
                matched = records.len(),
                active_filters = state.active_filter_count(),
                "listed table"
            );
            let message = format!("{} {} record(s) matched", records.len(), args.table.name());
            let data = json!({
                "table": args.table.name(),
                "active_filters": state.active_filter_count(),
                "total": records.len(),
                "records": records,
            });
            CommandResult::success_with_data(COMMAND, message, Some(data))
        }
        Err(error) => CommandResult::from_application_error(COMMAND, error, &correlation_id),
    }
}

async fn list_table<T, R>(
    repository: &R,
    state: &FilterState,
    sort: Option<&SortState>,
) -> Result<Vec<Value>, ApplicationError>
where
    T: TableRecord + Serialize + Presented,
    R: RecordRepository<T>,
{
    let records = repository.list(state, sort).await?;
    records
        .iter()
        .map(|record| {
            let mut value = serde_json::to_value(record)
                .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
            if let Some(display) = record.display() {
                value["display"] = display;
            }
            Ok(value)
        })
        .collect()
}

/// Operator-facing renderings of a record's money, percentage and date columns.
/// The raw values stay in the record so filters and scripts keep exact numbers.
trait Presented {
    fn display(&self) -> Option<Value> {
        None
    }
}

impl Presented for Campaign {
    fn display(&self) -> Option<Value> {
        Some(json!({
            "investment": format_currency(Some(self.investment)),
            "start_date": date(self.start_date),
            "end_date": date(self.end_date),
        }))
    }
}

impl Presented for TrafficCampaign {
    fn display(&self) -> Option<Value> {
        Some(json!({
            "start_date": date(self.start_date),
            "end_date": date(self.end_date),
        }))
    }
}

impl Presented for RevenueRow {
    fn display(&self) -> Option<Value> {
        Some(json!({
            "month": date(self.month),
            "gross_revenue": format_currency(Some(self.gross_revenue)),
            "net_revenue": format_currency(Some(self.net_revenue)),
            "margin": format_currency(Some(self.margin())),
        }))
    }
}

impl Presented for TradeIncentive {
    fn display(&self) -> Option<Value> {
        Some(json!({
            "percentage": format_percentage(self.percentage),
            "valid_from": date(self.valid_from),
        }))
    }
}

impl Presented for Rate {
    fn display(&self) -> Option<Value> {
        // Only USD amounts go through the dollar formatter.
        let rate = if self.currency.eq_ignore_ascii_case("USD") {
            format_currency(Some(self.rate))
        } else {
            format!("{} {}", self.rate.normalize(), self.currency)
        };
        Some(json!({
            "rate": rate,
            "effective_date": date(self.effective_date),
        }))
    }
}

impl Presented for HurRequest {
    fn display(&self) -> Option<Value> {
        let change = self.amount_change.as_ref();
        Some(json!({
            "requested_at": format_date(Some(&self.requested_at.to_rfc3339())),
            "current_amount": format_currency(change.map(|change| change.current)),
            "new_amount": format_currency(change.map(|change| change.new)),
        }))
    }
}

impl Presented for Organization {}

impl Presented for OrganizationContact {}

fn date(value: NaiveDate) -> String {
    format_date(Some(&value.to_string()))
}

fn split_pair<'a>(option: &str, raw: &'a str) -> Result<(&'a str, &'a str)> {
    let Some((dimension, value)) = raw.split_once('=') else {
        bail!("{option} expects DIM=VALUE (got `{raw}`)");
    };
    let dimension = dimension.trim();
    if dimension.is_empty() {
        bail!("{option} is missing a dimension name (got `{raw}`)");
    }
    Ok((dimension, value.trim()))
}

#[cfg(test)]
mod tests {
    use adops_core::Rate;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{ListArgs, Presented, Table};

    #[test]
    fn repeated_select_values_share_a_dimension() {
        let mut args = ListArgs::for_table(Table::Campaigns);
        args.select = vec!["country=Mexico".to_string(), "country = Argentina".to_string()];
        args.only = vec!["status=All".to_string()];
        args.flags = vec!["modified_ad_units".to_string()];

        let state = args.filter_state().expect("valid filter args");
        let countries = state.selected_categories.get("country").expect("country dimension");
        assert_eq!(countries.len(), 2);
        assert!(countries.contains("Argentina"));
        assert_eq!(state.active_filter_count(), 2);
    }

    #[test]
    fn pairs_without_equals_sign_are_rejected() {
        let mut args = ListArgs::for_table(Table::Rates);
        args.select = vec!["publisher".to_string()];

        let error = args.filter_state().expect_err("malformed pair");
        assert!(error.to_string().contains("--select expects DIM=VALUE"));
    }

    #[test]
    fn sort_direction_follows_desc_switch() {
        let mut args = ListArgs::for_table(Table::Revenue);
        assert!(args.sort_state().is_none());

        args.sort = Some("gross_revenue".to_string());
        args.desc = true;
        let sort = args.sort_state().expect("sort state");
        assert_eq!(sort.field, "gross_revenue");
        assert_eq!(sort.direction, adops_core::filter::SortDirection::Desc);
    }

    #[test]
    fn non_usd_rates_keep_their_currency_code() {
        let rate = Rate {
            id: "RT-9".to_string(),
            publisher: "Fandom".to_string(),
            format: "Display".to_string(),
            size: "728x90".to_string(),
            purchase_type: "CPM".to_string(),
            rate: Decimal::new(1_250, 2),
            currency: "MXN".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
        };

        let display = rate.display().expect("rates are presented");
        assert_eq!(display["rate"], "12.5 MXN");
        assert_eq!(display["effective_date"], "6/1/2025");
    }
}
