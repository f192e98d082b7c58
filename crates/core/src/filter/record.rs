use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    Date,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Flag(bool),
    /// ISO `YYYY-MM-DD`, optionally followed by a time component.
    Date(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn date(value: impl Into<String>) -> Self {
        Self::Date(value.into())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
            Self::Flag(_) => FieldKind::Flag,
            Self::Date(_) => FieldKind::Date,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// Date portion used for range comparisons.
    pub fn date_key(&self) -> Option<&str> {
        match self {
            Self::Date(value) | Self::Text(value) => {
                Some(value.get(..10).unwrap_or(value.as_str()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) | Self::Date(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{}", value.normalize()),
            Self::Flag(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text }
    }

    pub const fn number(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Number }
    }

    pub const fn flag(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Flag }
    }

    pub const fn date(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Date }
    }
}

/// Static description of a table: which fields exist, which ones the
/// free-text search looks at, and which one the date range applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordSchema {
    pub table: &'static str,
    pub fields: &'static [FieldSpec],
    pub search_fields: &'static [&'static str],
    pub date_field: Option<&'static str>,
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.field(name).map(|spec| spec.kind)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.name)
    }
}

/// A row of one of the dashboard tables.
pub trait TableRecord: Clone + Send + Sync + 'static {
    fn schema() -> &'static RecordSchema;

    fn record_id(&self) -> &str;

    fn field(&self, name: &str) -> Option<FieldValue>;
}
