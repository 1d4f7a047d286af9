//! SeaORM entities, one module per table.
//!
//! Enums are stored as their lowercase string form; poll options and MP4
//! renditions as JSON.

use std::str::FromStr;

use nearly_core::DomainError;
use nearly_core::error::RepoError;

pub mod activity;
pub mod comment;
pub mod engagement;
pub mod event;
pub mod event_guest;
pub mod group;
pub mod group_member;
pub mod media;
pub mod message;
pub mod news;
pub mod notification;
pub mod poll;
pub mod reel;
pub mod user;

/// Parse a stored enum column.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, RepoError>
where
    T: FromStr<Err = DomainError>,
{
    value
        .parse()
        .map_err(|e: DomainError| RepoError::Corrupt(format!("{column}: {e}")))
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(
    column: &str,
    value: serde_json::Value,
) -> Result<T, RepoError> {
    serde_json::from_value(value).map_err(|e| RepoError::Corrupt(format!("{column}: {e}")))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
