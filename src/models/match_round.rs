use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::date::{deserialize_date, serialize_date};
use crate::models::serde_helpers::{deserialize_f32, deserialize_i32, deserialize_id};

/// One actor's score for one round, keyed by `(id_match_actor, round_number)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRound {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "matchActorId", default, deserialize_with = "deserialize_id")]
    pub id_match_actor: String,

    #[serde(default, deserialize_with = "deserialize_f32")]
    pub score: f32,

    #[serde(rename = "roundNumber", default, deserialize_with = "deserialize_i32")]
    pub round_number: i32,

    #[serde(
        rename = "dateScore",
        default,
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub date_score: Option<NaiveDateTime>,
}

impl MatchRound {
    pub fn pending(id_match_actor: impl Into<String>, round_number: i32) -> Self {
        MatchRound {
            id_match_actor: id_match_actor.into(),
            round_number,
            ..Default::default()
        }
    }

    /// A round counts as scored once the backend stamped a score date.
    pub fn has_score(&self) -> bool {
        self.date_score.is_some()
    }
}
