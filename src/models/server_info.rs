use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::models::custom_data::CustomData;
use crate::models::date::deserialize_date;
use crate::models::serde_helpers::{deserialize_custom_data, deserialize_id};

pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerInfo {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub version: String,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub time: Option<NaiveDateTime>,

    // Sent either as an object or as a JSON-encoded string
    #[serde(default, deserialize_with = "deserialize_custom_data")]
    pub settings: CustomData,
}

impl ServerInfo {
    pub fn settings(&self) -> &CustomData {
        &self.settings
    }

    pub fn version_compare(&self) -> std::cmp::Ordering {
        self.version.as_str().cmp(SDK_VERSION)
    }
}

impl std::fmt::Display for ServerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let compare = match self.version_compare() {
            std::cmp::Ordering::Less => format!("lower: {}", SDK_VERSION),
            std::cmp::Ordering::Greater => format!("greater: {}", SDK_VERSION),
            std::cmp::Ordering::Equal => "match".to_string(),
        };
        let time = self
            .time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        write!(
            f,
            "[Gamification Server Info] Version: {} ({}) | Time: {}",
            self.version, compare, time
        )
    }
}
