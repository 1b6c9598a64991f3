//! Shared row mapping helpers for the SQLite repositories.
//!
//! SQLite has no native timestamp or uuid column, so both are stored as text.
//! Timestamps are always written with microsecond precision and a `Z` suffix,
//! which keeps lexical order equal to chronological order for `ORDER BY` and
//! range comparisons.

use chrono::{DateTime, SecondsFormat, Utc};
use leadflow_errors::{LeadflowError, LeadflowResult};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

pub struct MappingHelpers;

impl MappingHelpers {
    pub fn encode_timestamp(value: DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn encode_optional_timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
        value.map(Self::encode_timestamp)
    }

    pub fn parse_timestamp(row: &SqliteRow, field_name: &str) -> LeadflowResult<DateTime<Utc>> {
        let raw: String = row.try_get(field_name)?;
        Self::parse_timestamp_str(&raw, field_name)
    }

    pub fn parse_optional_timestamp(
        row: &SqliteRow,
        field_name: &str,
    ) -> LeadflowResult<Option<DateTime<Utc>>> {
        match row.try_get::<Option<String>, _>(field_name)? {
            Some(raw) => Self::parse_timestamp_str(&raw, field_name).map(Some),
            None => Ok(None),
        }
    }

    fn parse_timestamp_str(raw: &str, field_name: &str) -> LeadflowResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| {
                LeadflowError::Serialization(format!("invalid timestamp in {field_name}: {e}"))
            })
    }

    pub fn parse_uuid(row: &SqliteRow, field_name: &str) -> LeadflowResult<Uuid> {
        let raw: String = row.try_get(field_name)?;
        Ok(Uuid::parse_str(&raw)?)
    }

    pub fn parse_optional_uuid(row: &SqliteRow, field_name: &str) -> LeadflowResult<Option<Uuid>> {
        match row.try_get::<Option<String>, _>(field_name)? {
            Some(raw) => Ok(Some(Uuid::parse_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Parses a JSON array column; a NULL or empty column reads as an empty list.
    pub fn parse_string_list(row: &SqliteRow, field_name: &str) -> LeadflowResult<Vec<String>> {
        match row.try_get::<Option<String>, _>(field_name)? {
            Some(json_str) if !json_str.trim().is_empty() => serde_json::from_str(&json_str)
                .map_err(|e| {
                    LeadflowError::Serialization(format!("invalid list in {field_name}: {e}"))
                }),
            _ => Ok(Vec::new()),
        }
    }

    pub fn encode_string_list(values: &[String]) -> LeadflowResult<String> {
        Ok(serde_json::to_string(values)?)
    }
}
