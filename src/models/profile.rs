use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::models::custom_data::CustomData;
use crate::models::date::{deserialize_date, serialize_date};
use crate::models::serde_helpers::{deserialize_custom_data, deserialize_id};

// Player profile as returned inside actor and session payloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "username", default)]
    pub user_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(
        rename = "lastSeen",
        default,
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub last_seen: Option<NaiveDateTime>,

    #[serde(rename = "customData", default, deserialize_with = "deserialize_custom_data")]
    pub custom_data: CustomData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    Online,
    Playing,
    Offline,
}

impl Profile {
    pub fn new(id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Profile {
            id: id.into(),
            user_name: user_name.into(),
            ..Default::default()
        }
    }

    pub fn state(&self, config: &ClientConfig) -> UserState {
        self.state_at(config, Local::now().naive_local())
    }

    pub fn state_at(&self, config: &ClientConfig, now: NaiveDateTime) -> UserState {
        let Some(last_seen) = self.last_seen else {
            return UserState::Offline;
        };
        let seconds = (now - last_seen).num_seconds();
        if seconds <= config.online_seconds {
            if config.playing_seconds > 0 && seconds <= config.playing_seconds {
                return UserState::Playing;
            }
            return UserState::Online;
        }
        UserState::Offline
    }
}
