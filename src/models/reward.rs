use serde::{Deserialize, Serialize};

use crate::models::custom_data::CustomData;
use crate::models::serde_helpers::deserialize_id;

// Reward granted by the backend in response to a pushed action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "goalId", default, deserialize_with = "deserialize_id")]
    pub goal_id: String,

    #[serde(flatten)]
    pub details: CustomData,
}
