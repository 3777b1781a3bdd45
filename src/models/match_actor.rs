use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::custom_data::CustomData;
use crate::models::date::{deserialize_date, serialize_date};
use crate::models::serde_helpers::{deserialize_custom_data, deserialize_f32, deserialize_id, deserialize_vec};
use crate::models::match_round::MatchRound;
use crate::models::profile::Profile;

/// A participant of a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchActor {
    /// Server-assigned; empty until the match is saved.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "matchId", default, deserialize_with = "deserialize_id")]
    pub id_match: String,

    #[serde(rename = "accountId", default, deserialize_with = "deserialize_id")]
    pub id_account: String,

    #[serde(rename = "customData", default, deserialize_with = "deserialize_custom_data")]
    pub custom_data: CustomData,

    #[serde(default, deserialize_with = "deserialize_f32")]
    pub score: f32,

    #[serde(
        rename = "dateScore",
        default,
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub date_score: Option<NaiveDateTime>,

    // Shared with the rest of the SDK, e.g. the local user's profile
    #[serde(rename = "actor", default)]
    pub user: Option<Arc<Profile>>,

    #[serde(default, deserialize_with = "deserialize_vec")]
    pub rounds: Vec<MatchRound>,
}

impl MatchActor {
    pub fn for_profile(id_match: impl Into<String>, profile: Arc<Profile>) -> Self {
        MatchActor {
            id_match: id_match.into(),
            id_account: profile.id.clone(),
            user: Some(profile),
            ..Default::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user.as_deref().map(|p| p.user_name.as_str())
    }

    pub fn round(&self, round_number: i32) -> Option<&MatchRound> {
        self.rounds.iter().find(|r| r.round_number == round_number)
    }
}
