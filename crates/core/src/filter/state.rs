use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::record::{FieldKind, RecordSchema};

const ALL_SENTINEL: &str = "all";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FilterStateError {
    #[error("date bound `{value}` is not a valid YYYY-MM-DD date")]
    MalformedDateBound { value: String },
    #[error("`{field}` is not a sortable field of `{table}`")]
    UnknownSortField { table: &'static str, field: String },
    #[error("`{dimension}` is not a filterable field of `{table}`")]
    UnknownDimension { table: &'static str, dimension: String },
    #[error("`{flag}` is not a boolean field of `{table}`")]
    NotAFlag { table: &'static str, flag: String },
    #[error("`{table}` records carry no date field for range filtering")]
    DateRangeUnsupported { table: &'static str },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, date_key: &str) -> bool {
        let after_start = self.start.as_deref().map_or(true, |start| date_key >= start);
        let before_end = self.end.as_deref().map_or(true, |end| date_key <= end);
        after_start && before_end
    }

    fn validate(&self) -> Result<(), FilterStateError> {
        for bound in [&self.start, &self.end].into_iter().flatten() {
            if !is_iso_date(bound) {
                return Err(FilterStateError::MalformedDateBound { value: bound.clone() });
            }
        }
        Ok(())
    }
}

/// Every filter dimension a table view can carry. The default value is the
/// identity filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_term: String,
    pub selected_categories: BTreeMap<String, BTreeSet<String>>,
    pub single_select: BTreeMap<String, String>,
    pub date_range: DateRange,
    pub boolean_flags: BTreeMap<String, bool>,
}

impl FilterState {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_selected<I, S>(mut self, dimension: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_categories
            .entry(dimension.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_single(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        self.single_select.insert(dimension.into(), value.into());
        self
    }

    pub fn with_date_range(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.date_range =
            DateRange { start: start.map(str::to_owned), end: end.map(str::to_owned) };
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>, enabled: bool) -> Self {
        self.boolean_flags.insert(flag.into(), enabled);
        self
    }

    /// Adds the value to the dimension's selection, or removes it when already selected.
    pub fn toggle_category(&mut self, dimension: &str, value: &str) {
        let selected = self.selected_categories.entry(dimension.to_owned()).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_owned());
        }
        if selected.is_empty() {
            self.selected_categories.remove(dimension);
        }
    }

    pub fn search_needle(&self) -> Option<String> {
        let term = self.search_term.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    pub fn active_single_selects(&self) -> impl Iterator<Item = (&str, &str)> {
        self.single_select
            .iter()
            .filter(|(_, value)| is_single_select_active(value))
            .map(|(dimension, value)| (dimension.as_str(), value.as_str()))
    }

    pub fn active_filter_count(&self) -> usize {
        let search = usize::from(self.search_needle().is_some());
        let categories =
            self.selected_categories.values().filter(|values| !values.is_empty()).count();
        let singles = self.active_single_selects().count();
        let dates = usize::from(self.date_range.is_bounded());
        let flags = self.boolean_flags.values().filter(|enabled| **enabled).count();
        search + categories + singles + dates + flags
    }

    pub fn is_default(&self) -> bool {
        self.active_filter_count() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn validate(&self, schema: &RecordSchema) -> Result<(), FilterStateError> {
        let dimensions = self.selected_categories.keys().chain(self.single_select.keys());
        for dimension in dimensions {
            if schema.field(dimension).is_none() {
                return Err(FilterStateError::UnknownDimension {
                    table: schema.table,
                    dimension: dimension.clone(),
                });
            }
        }

        for flag in self.boolean_flags.keys() {
            match schema.kind_of(flag) {
                Some(FieldKind::Flag) => {}
                Some(_) => {
                    return Err(FilterStateError::NotAFlag {
                        table: schema.table,
                        flag: flag.clone(),
                    })
                }
                None => {
                    return Err(FilterStateError::UnknownDimension {
                        table: schema.table,
                        dimension: flag.clone(),
                    })
                }
            }
        }

        self.date_range.validate()?;
        if self.date_range.is_bounded() && schema.date_field.is_none() {
            return Err(FilterStateError::DateRangeUnsupported { table: schema.table });
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Desc }
    }

    /// Same field flips direction; a new field starts ascending.
    pub fn toggled(&self, field: &str) -> Self {
        if self.field == field {
            Self { field: self.field.clone(), direction: self.direction.flipped() }
        } else {
            Self::ascending(field)
        }
    }

    pub fn validate(&self, schema: &RecordSchema) -> Result<(), FilterStateError> {
        if schema.field(&self.field).is_none() {
            return Err(FilterStateError::UnknownSortField {
                table: schema.table,
                field: self.field.clone(),
            });
        }
        Ok(())
    }
}

fn is_single_select_active(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case(ALL_SENTINEL)
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
