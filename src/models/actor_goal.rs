use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::activity::Activity;
use crate::models::date::{deserialize_date, serialize_date};
use crate::models::serde_helpers::deserialize_id;
use crate::models::goal::Goal;
use crate::models::profile::Profile;
use crate::models::role::Role;

// A goal assigned to one actor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorGoal {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "actorId", default)]
    pub actor_id: Option<String>,

    #[serde(default)]
    pub actor: Option<Profile>,

    #[serde(rename = "goalId", default)]
    pub goal_id: Option<String>,

    #[serde(default)]
    pub goal: Option<Goal>,

    #[serde(default, deserialize_with = "deserialize_id")]
    pub status: String,

    #[serde(rename = "concernId", default)]
    pub concern_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concern: Option<Value>,

    #[serde(rename = "rewardResourceId", default)]
    pub reward_resource_id: Option<String>,

    #[serde(rename = "rewardResource", default, skip_serializing_if = "Option::is_none")]
    pub reward_resource: Option<Value>,

    #[serde(rename = "activityId", default)]
    pub activity_id: Option<String>,

    #[serde(default)]
    pub activity: Option<Activity>,

    #[serde(rename = "roleId", default)]
    pub role_id: Option<String>,

    #[serde(default)]
    pub role: Option<Role>,

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

// Fields for POST api/goals/actors; the actor is the local user
#[derive(Debug, Clone, Default)]
pub struct CreateActorGoal {
    pub goal_id: String,
    pub concern_id: String,
    pub reward_resource_id: String,
    pub activity_id: String,
    pub role_id: String,
}
