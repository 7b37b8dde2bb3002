//! Shared row-mapping helpers.

use chrono::{DateTime, Utc};

use questwright_engine_ports::outbound::RepositoryError;

pub fn map_sqlx(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

pub fn json_encode<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|err| RepositoryError::serialization(err.to_string()))
}

pub fn json_decode<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(raw).map_err(|err| RepositoryError::serialization(err.to_string()))
}

pub fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

pub fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|err| RepositoryError::serialization(format!("Invalid timestamp: {err}")))
}

/// Unit enums (character type, heat level) are stored as their bare serde
/// string, without JSON quoting.
pub fn encode_enum<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|err| RepositoryError::serialization(err.to_string()))?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RepositoryError::serialization("enum did not serialize to a string"))
}

pub fn decode_enum<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, RepositoryError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|err| RepositoryError::serialization(err.to_string()))
}

/// Ids are stored as their canonical hyphenated uuid strings.
pub fn decode_id<T: From<uuid::Uuid>>(raw: &str) -> Result<T, RepositoryError> {
    uuid::Uuid::parse_str(raw)
        .map(T::from)
        .map_err(|err| RepositoryError::serialization(format!("Invalid id: {err}")))
}
