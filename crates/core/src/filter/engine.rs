use std::cmp::Ordering;

use tracing::debug;

use crate::filter::record::{FieldValue, TableRecord};
use crate::filter::state::{FilterState, FilterStateError, SortDirection, SortState};

/// Returns the records passing every active dimension of `state`, in source
/// order unless `sort` is given. The source slice is left untouched.
pub fn apply<T>(
    records: &[T],
    state: &FilterState,
    sort: Option<&SortState>,
) -> Result<Vec<T>, FilterStateError>
where
    T: TableRecord,
{
    let schema = T::schema();
    state.validate(schema)?;
    if let Some(sort) = sort {
        sort.validate(schema)?;
    }

    Ok(apply_validated(records, state, sort))
}

pub fn matches<T>(record: &T, state: &FilterState) -> bool
where
    T: TableRecord,
{
    matches_search(record, state)
        && matches_categories(record, state)
        && matches_single_selects(record, state)
        && matches_date_range(record, state)
        && matches_flags(record, state)
}

pub fn sort_records<T>(records: &mut [T], sort: &SortState)
where
    T: TableRecord,
{
    records.sort_by(|left, right| {
        let ordering = compare_values(
            left.field(&sort.field).as_ref(),
            right.field(&sort.field).as_ref(),
        );
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn apply_validated<T>(records: &[T], state: &FilterState, sort: Option<&SortState>) -> Vec<T>
where
    T: TableRecord,
{
    let mut view: Vec<T> =
        records.iter().filter(|record| matches(*record, state)).cloned().collect();
    if let Some(sort) = sort {
        sort_records(&mut view, sort);
    }
    view
}

fn matches_search<T: TableRecord>(record: &T, state: &FilterState) -> bool {
    let Some(needle) = state.search_needle() else {
        return true;
    };

    T::schema()
        .search_fields
        .iter()
        .filter_map(|name| record.field(name))
        .any(|value| value.to_string().to_lowercase().contains(&needle))
}

fn matches_categories<T: TableRecord>(record: &T, state: &FilterState) -> bool {
    state.selected_categories.iter().filter(|(_, selected)| !selected.is_empty()).all(
        |(dimension, selected)| {
            record.field(dimension).is_some_and(|value| selected.contains(&value.to_string()))
        },
    )
}

fn matches_single_selects<T: TableRecord>(record: &T, state: &FilterState) -> bool {
    state.active_single_selects().all(|(dimension, expected)| {
        record.field(dimension).is_some_and(|value| value.to_string() == expected)
    })
}

fn matches_date_range<T: TableRecord>(record: &T, state: &FilterState) -> bool {
    if !state.date_range.is_bounded() {
        return true;
    }

    let Some(date_field) = T::schema().date_field else {
        return false;
    };

    record
        .field(date_field)
        .as_ref()
        .and_then(FieldValue::date_key)
        .is_some_and(|date_key| state.date_range.contains(date_key))
}

fn matches_flags<T: TableRecord>(record: &T, state: &FilterState) -> bool {
    state
        .boolean_flags
        .iter()
        .filter(|(_, enabled)| **enabled)
        .all(|(flag, _)| record.field(flag).and_then(|value| value.as_flag()).unwrap_or(false))
}

fn compare_values(left: Option<&FieldValue>, right: Option<&FieldValue>) -> Ordering {
    match (left, right) {
        (Some(FieldValue::Text(left)), Some(FieldValue::Text(right))) => {
            locale_compare(left, right)
        }
        (Some(FieldValue::Number(left)), Some(FieldValue::Number(right))) => left.cmp(right),
        _ => display_or_empty(left).cmp(&display_or_empty(right)),
    }
}

/// Case-insensitive ordering first; among case variants lowercase sorts first.
fn locale_compare(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase()).then_with(|| right.cmp(left))
}

fn display_or_empty(value: Option<&FieldValue>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// A table view that recomputes its visible rows whenever the source list,
/// the filter state, or the sort changes.
#[derive(Clone, Debug)]
pub struct FilteredView<T> {
    source: Vec<T>,
    state: FilterState,
    sort: Option<SortState>,
    visible: Vec<T>,
}

impl<T> FilteredView<T>
where
    T: TableRecord,
{
    pub fn new(source: Vec<T>) -> Self {
        let visible = source.clone();
        Self { source, state: FilterState::default(), sort: None, visible }
    }

    pub fn records(&self) -> &[T] {
        &self.visible
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn active_filter_count(&self) -> usize {
        self.state.active_filter_count()
    }

    pub fn set_source(&mut self, source: Vec<T>) {
        self.source = source;
        self.recompute();
    }

    /// Invalid states are refused and the previous state is kept.
    pub fn set_state(&mut self, state: FilterState) -> Result<(), FilterStateError> {
        state.validate(T::schema())?;
        self.state = state;
        self.recompute();
        Ok(())
    }

    pub fn update_state<F>(&mut self, update: F) -> Result<(), FilterStateError>
    where
        F: FnOnce(&mut FilterState),
    {
        let mut next = self.state.clone();
        update(&mut next);
        self.set_state(next)
    }

    pub fn set_sort(&mut self, sort: Option<SortState>) -> Result<(), FilterStateError> {
        if let Some(sort) = &sort {
            sort.validate(T::schema())?;
        }
        self.sort = sort;
        self.recompute();
        Ok(())
    }

    pub fn toggle_sort(&mut self, field: &str) -> Result<(), FilterStateError> {
        let next = match &self.sort {
            Some(current) => current.toggled(field),
            None => SortState::ascending(field),
        };
        self.set_sort(Some(next))
    }

    pub fn clear_filters(&mut self) {
        self.state.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.visible = apply_validated(&self.source, &self.state, self.sort.as_ref());
        debug!(
            event_name = "filter.view_recomputed",
            table = T::schema().table,
            total = self.source.len(),
            visible = self.visible.len(),
            active_filters = self.state.active_filter_count(),
            "table view recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::filter::record::{FieldSpec, FieldValue, RecordSchema, TableRecord};
    use crate::filter::state::{FilterState, FilterStateError, SortState};

    use super::{apply, FilteredView};

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: &'static str,
        name: &'static str,
        publisher: &'static str,
        status: &'static str,
        date: &'static str,
        budget: i64,
        modified: bool,
    }

    static ROW_SCHEMA: RecordSchema = RecordSchema {
        table: "rows",
        fields: &[
            FieldSpec::text("id"),
            FieldSpec::text("name"),
            FieldSpec::text("publisher"),
            FieldSpec::text("status"),
            FieldSpec::date("date"),
            FieldSpec::number("budget"),
            FieldSpec::flag("modified"),
        ],
        search_fields: &["id", "name", "publisher"],
        date_field: Some("date"),
    };

    impl TableRecord for Row {
        fn schema() -> &'static RecordSchema {
            &ROW_SCHEMA
        }

        fn record_id(&self) -> &str {
            self.id
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "id" => Some(FieldValue::text(self.id)),
                "name" => Some(FieldValue::text(self.name)),
                "publisher" => Some(FieldValue::text(self.publisher)),
                "status" => Some(FieldValue::text(self.status)),
                "date" => Some(FieldValue::date(self.date)),
                "budget" => Some(FieldValue::Number(Decimal::from(self.budget))),
                "modified" => Some(FieldValue::Flag(self.modified)),
                _ => None,
            }
        }
    }

    fn row(id: &'static str, name: &'static str, status: &'static str, date: &'static str) -> Row {
        Row { id, name, publisher: "Fandom", status, date, budget: 0, modified: false }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                budget: 500,
                modified: true,
                ..row("c-1", "Fandom - Mercado Libre", "Live", "2025-04-01")
            },
            Row {
                budget: 1200,
                publisher: "Univision",
                ..row("c-2", "Coca-Cola Summer", "Closed", "2025-05-01")
            },
            Row {
                budget: 80,
                publisher: "Univision",
                ..row("c-3", "alpha launch", "Live", "2025-06-01")
            },
        ]
    }

    fn ids(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|row| row.id).collect()
    }

    #[test]
    fn default_state_is_identity() {
        let source = rows();
        let view = apply(&source, &FilterState::default(), None).expect("identity filter");
        assert_eq!(view, source);
    }

    #[test]
    fn filtering_is_deterministic_and_leaves_source_untouched() {
        let source = rows();
        let before = source.clone();
        let state = FilterState::default().with_selected("status", ["Live"]);

        let first = apply(&source, &state, None).expect("first run");
        let second = apply(&source, &state, None).expect("second run");

        assert_eq!(first, second);
        assert_eq!(source, before);
    }

    #[test]
    fn search_is_case_insensitive_substring_over_any_search_field() {
        let source = vec![
            row("c-1", "Fandom - Mercado Libre", "Live", "2025-04-01"),
            Row { publisher: "Univision", ..row("c-2", "Coca-Cola Summer", "Live", "2025-04-01") },
        ];

        let view = apply(&source, &FilterState::default().with_search("fandom"), None)
            .expect("search filter");
        assert_eq!(ids(&view), vec!["c-1"]);

        let by_publisher = apply(&source, &FilterState::default().with_search("UNIVI"), None)
            .expect("publisher search");
        assert_eq!(ids(&by_publisher), vec!["c-2"]);

        let by_id =
            apply(&source, &FilterState::default().with_search("c-"), None).expect("id search");
        assert_eq!(by_id.len(), 2);
    }

    #[test]
    fn multi_select_keeps_members_of_the_selected_set() {
        let source = vec![
            row("t-1", "one", "Live", "2025-04-01"),
            row("t-2", "two", "Closed", "2025-04-01"),
            row("t-3", "three", "Live", "2025-04-01"),
        ];
        let state = FilterState::default().with_selected("status", ["Live"]);
        assert_eq!(apply(&source, &state, None).expect("status filter").len(), 2);

        let either = FilterState::default().with_selected("status", ["Live", "Closed"]);
        assert_eq!(apply(&source, &either, None).expect("or within dimension").len(), 3);
    }

    #[test]
    fn single_select_all_sentinel_disables_dimension() {
        let source = rows();
        let all = FilterState::default().with_single("publisher", "All");
        assert_eq!(apply(&source, &all, None).expect("all").len(), 3);

        let exact = FilterState::default().with_single("publisher", "Univision");
        assert_eq!(ids(&apply(&source, &exact, None).expect("exact")), vec!["c-2", "c-3"]);
    }

    #[test]
    fn date_range_is_inclusive_with_optional_bounds() {
        let source = rows();
        let state =
            FilterState::default().with_date_range(Some("2025-04-15"), Some("2025-05-15"));
        assert_eq!(ids(&apply(&source, &state, None).expect("range")), vec!["c-2"]);

        let open_end = FilterState::default().with_date_range(Some("2025-05-01"), None);
        assert_eq!(ids(&apply(&source, &open_end, None).expect("open end")), vec!["c-2", "c-3"]);
    }

    #[test]
    fn flag_filter_only_applies_when_enabled() {
        let source = rows();
        let enabled = FilterState::default().with_flag("modified", true);
        assert_eq!(ids(&apply(&source, &enabled, None).expect("flag on")), vec!["c-1"]);

        let disabled = FilterState::default().with_flag("modified", false);
        assert_eq!(apply(&source, &disabled, None).expect("flag off").len(), 3);
    }

    #[test]
    fn dimensions_compose_as_intersection() {
        let source = rows();
        let status = FilterState::default().with_selected("status", ["Live"]);
        let publisher = FilterState::default().with_single("publisher", "Univision");
        let combined = FilterState::default()
            .with_selected("status", ["Live"])
            .with_single("publisher", "Univision");

        let nested = apply(&apply(&source, &status, None).expect("status"), &publisher, None)
            .expect("publisher");
        let together = apply(&source, &combined, None).expect("combined");

        assert_eq!(together, nested);
        assert_eq!(ids(&together), vec!["c-3"]);
    }

    #[test]
    fn sorts_strings_with_locale_style_and_numbers_numerically() {
        let source = rows();

        let by_name = apply(&source, &FilterState::default(), Some(&SortState::ascending("name")))
            .expect("sort by name");
        assert_eq!(ids(&by_name), vec!["c-3", "c-2", "c-1"]);

        let by_budget =
            apply(&source, &FilterState::default(), Some(&SortState::descending("budget")))
                .expect("sort by budget");
        assert_eq!(ids(&by_budget), vec!["c-2", "c-1", "c-3"]);
    }

    #[test]
    fn malformed_state_is_reported_instead_of_ignored() {
        let source = rows();
        let bad_date = FilterState::default().with_date_range(Some("04/15/2025"), None);
        assert!(matches!(
            apply(&source, &bad_date, None),
            Err(FilterStateError::MalformedDateBound { .. })
        ));

        let bad_sort = SortState::ascending("nope");
        assert!(matches!(
            apply(&source, &FilterState::default(), Some(&bad_sort)),
            Err(FilterStateError::UnknownSortField { .. })
        ));
    }

    #[test]
    fn filtered_view_recomputes_on_every_change() {
        let mut view = FilteredView::new(rows());
        assert_eq!(view.records().len(), 3);

        view.update_state(|state| state.toggle_category("status", "Live")).expect("status");
        assert_eq!(ids(view.records()), vec!["c-1", "c-3"]);
        assert_eq!(view.active_filter_count(), 1);

        view.toggle_sort("budget").expect("sort asc");
        assert_eq!(ids(view.records()), vec!["c-3", "c-1"]);
        view.toggle_sort("budget").expect("sort desc");
        assert_eq!(ids(view.records()), vec!["c-1", "c-3"]);

        let mut source = rows();
        source.push(row("c-4", "late addition", "Live", "2025-07-01"));
        view.set_source(source);
        assert_eq!(ids(view.records()), vec!["c-1", "c-3", "c-4"]);

        view.clear_filters();
        assert_eq!(view.records().len(), 4);
        assert_eq!(view.active_filter_count(), 0);
    }

    #[test]
    fn filtered_view_keeps_previous_state_when_update_is_invalid() {
        let mut view = FilteredView::new(rows());
        view.set_state(FilterState::default().with_search("coca")).expect("valid search");

        let error = view
            .set_state(FilterState::default().with_date_range(Some("bad"), None))
            .expect_err("invalid date bound");

        assert!(matches!(error, FilterStateError::MalformedDateBound { .. }));
        assert_eq!(view.state().search_term, "coca");
        assert_eq!(ids(view.records()), vec!["c-2"]);
    }
}
