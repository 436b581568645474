//! Datasource and datasource-history types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Datasource as returned by `GET /api/datasources/uid/{uid}`.
///
/// Only the identifying fields are typed; the full body is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: i64,
    pub uid: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One immutable snapshot from the datasource history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceVersion {
    /// Datasource UID the snapshot belongs to.
    pub id: String,
    pub version: String,
    /// Serialized datasource JSON at that version.
    #[serde(default)]
    pub data: String,
    /// Unix seconds.
    #[serde(deserialize_with = "timestamp_from_number_or_string")]
    pub timestamp: i64,
}

impl DataSourceVersion {
    /// Parses the snapshot body.
    ///
    /// # Errors
    /// Returns an error if `data` is not valid JSON.
    pub fn parsed_data(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.data)
    }
}

/// Some servers send the timestamp as a decimal string.
fn timestamp_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
