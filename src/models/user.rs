use serde::Deserialize;

use crate::models::profile::Profile;
use crate::models::search::SearchCustomData;
use crate::models::serde_helpers::{deserialize_i32, deserialize_vec};

/// Relationship stored with a contact. The wire value is the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactType {
    #[default]
    Friend = 0,
    Request = 1,
    Ignore = 2,
}

impl ContactType {
    pub fn as_wire(&self) -> String {
        (*self as i32).to_string()
    }
}

/// Another account, addressed either by id or by username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Id(String),
    Username(String),
}

impl UserRef {
    pub fn is_empty(&self) -> bool {
        match self {
            UserRef::Id(id) => id.is_empty(),
            UserRef::Username(name) => name.is_empty(),
        }
    }
}

impl From<&Profile> for UserRef {
    fn from(profile: &Profile) -> Self {
        UserRef::Id(profile.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserSearch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub filters: Vec<SearchCustomData>,
    pub online_only: bool,
    pub page: i32,
    pub limit: i32,
}

impl Default for UserSearch {
    fn default() -> Self {
        UserSearch {
            username: None,
            email: None,
            filters: Vec::new(),
            online_only: false,
            page: 1,
            limit: 20,
        }
    }
}

/// One page of a user search. `total` counts every match, `pages` the
/// number of pages at the requested limit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserPage {
    #[serde(default, deserialize_with = "deserialize_vec")]
    pub results: Vec<Profile>,

    #[serde(default, deserialize_with = "deserialize_i32")]
    pub total: i32,

    #[serde(default, deserialize_with = "deserialize_i32")]
    pub pages: i32,
}
