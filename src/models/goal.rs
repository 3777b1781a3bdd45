use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::activity::Activity;
use crate::models::date::{deserialize_date, serialize_date};
use crate::models::serde_helpers::{deserialize_id, deserialize_vec};
use crate::models::role::Role;

pub const TARGET_COMPLETED: &str = "Completed";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub value: Value,

    #[serde(default)]
    pub operation: Value,

    #[serde(default)]
    pub status: String,

    #[serde(rename = "attributeTypeId", default)]
    pub attribute_type_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "concernId", default)]
    pub concern_id: Option<String>,

    #[serde(rename = "rewardResourceId", default)]
    pub reward_resource_id: Option<String>,

    #[serde(rename = "feedbackId", default)]
    pub feedback_id: Option<String>,

    // Nested matrices are carried opaquely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concern: Option<Value>,

    #[serde(rename = "rewardResource", default, skip_serializing_if = "Option::is_none")]
    pub reward_resource: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Value>,

    #[serde(default, deserialize_with = "deserialize_vec")]
    pub rewards: Vec<Value>,

    #[serde(default, deserialize_with = "deserialize_vec")]
    pub targets: Vec<Target>,

    #[serde(default, deserialize_with = "deserialize_vec")]
    pub activities: Vec<Activity>,

    #[serde(default, deserialize_with = "deserialize_vec")]
    pub actions: Vec<Value>,

    #[serde(default, deserialize_with = "deserialize_vec")]
    pub roles: Vec<Role>,

    #[serde(
        rename = "createdDate",
        default,
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub created_time: Option<NaiveDateTime>,

    #[serde(
        rename = "updatedDate",
        default,
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub updated_time: Option<NaiveDateTime>,
}

impl Goal {
    /// True when every target of the goal reports `Completed`.
    pub fn targets_completed(&self) -> bool {
        self.targets.iter().all(|t| t.status == TARGET_COMPLETED)
    }
}

// Fields for POST api/goals
#[derive(Debug, Clone, Default)]
pub struct CreateGoal {
    pub description: String,
    pub concern_id: String,
    pub reward_resource_id: String,
    pub feedback_id: String,
}
