//! Presentation helpers shared by every table: en-US currency and dates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

pub const EMPTY_PLACEHOLDER: &str = "-";

const DATE_FORMAT: &str = "%-m/%-d/%Y";
const DATE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M %p";

/// USD with thousands separators and at most two fraction digits; trailing
/// zeros are dropped (`37500` renders as `$37,500`).
pub fn format_currency(amount: Option<Decimal>) -> String {
    let Some(amount) = amount else {
        return EMPTY_PLACEHOLDER.to_owned();
    };

    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = rounded.abs().normalize().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut rendered = format!("{sign}${}", group_thousands(whole));
    if let Some(fraction) = fraction {
        rendered.push('.');
        rendered.push_str(fraction);
    }
    rendered
}

pub fn format_percentage(value: Decimal) -> String {
    format!("{}%", value.round_dp(2).normalize())
}

/// `M/D/YYYY` for ISO dates or RFC 3339 timestamps. Anything else is shown as given.
pub fn format_date(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return EMPTY_PLACEHOLDER.to_owned();
    };

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format(DATE_FORMAT).to_string();
    }
    match parse_timestamp(value) {
        Some(timestamp) => timestamp.format(DATE_FORMAT).to_string(),
        None => value.to_owned(),
    }
}

pub fn format_date_time(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return EMPTY_PLACEHOLDER.to_owned();
    };

    match parse_timestamp(value) {
        Some(timestamp) => timestamp.format(DATE_TIME_FORMAT).to_string(),
        None => format_date(Some(value)),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|timestamp| timestamp.with_timezone(&Utc))
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
