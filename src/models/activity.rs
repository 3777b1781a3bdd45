use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::date::{deserialize_date, serialize_date};
use crate::models::serde_helpers::deserialize_id;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image: String,

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
