//! Contacts, user lookups and action pushes.
//!
//! The contact and user endpoints answer with the legacy `{success, message}`
//! envelope or with a `{total, pages, results}` page; both are normalized to
//! profiles here.

use serde_json::Value;
use tracing::info;

use crate::errors::{Result, SgaError};
use crate::guard::keys;
use crate::models::profile::Profile;
use crate::models::reward::Reward;
use crate::models::search::{encode_filters, SearchCustomData};
use crate::models::user::{ContactType, UserPage, UserRef, UserSearch};
use crate::services::transport::{missing_key, parse_entity, parse_envelope, parse_object, Form, Method};
use crate::state::SgaClient;

/// Contacts of the local user.
pub async fn load_contacts(client: &SgaClient) -> Result<Vec<Profile>> {
    client.require_local_user()?;
    let _permit = client.guard().acquire(keys::CONTACT_LOAD)?;

    let body = client.call(Method::Get, "api/friends", None).await?;
    Ok(parse_page(&body, "results")?.results)
}

pub async fn add_contact(client: &SgaClient, other: &UserRef, contact_type: ContactType) -> Result<()> {
    let local = client.require_local_user()?;
    if other.is_empty() {
        return Err(SgaError::invalid_state("No user"));
    }
    let _permit = client.guard().acquire(keys::CONTACT_ADD)?;

    let mut form = contact_form("save", other);
    form.insert("State".to_string(), contact_type.as_wire());

    let body = client.call(Method::Post, "contacts.php", Some(form)).await?;
    parse_envelope(&body)?;
    info!("{} added contact {:?} as {:?}", local.profile.user_name, other, contact_type);
    Ok(())
}

pub async fn remove_contact(client: &SgaClient, other: &UserRef) -> Result<()> {
    let local = client.require_local_user()?;
    if other.is_empty() {
        return Err(SgaError::invalid_state("No user"));
    }
    let _permit = client.guard().acquire(keys::CONTACT_REMOVE)?;

    let form = contact_form("delete", other);
    let body = client.call(Method::Post, "contacts.php", Some(form)).await?;
    parse_envelope(&body)?;
    info!("{} removed contact {:?}", local.profile.user_name, other);
    Ok(())
}

pub async fn load_users(client: &SgaClient, ids: &[String]) -> Result<Vec<Profile>> {
    load_by(client, "Ids", ids).await
}

pub async fn load_users_by_name(client: &SgaClient, user_names: &[String]) -> Result<Vec<Profile>> {
    load_by(client, "Usernames", user_names).await
}

/// `None` when the backend knows no such account.
pub async fn load_user(client: &SgaClient, id: &str) -> Result<Option<Profile>> {
    let users = load_users(client, &[id.to_string()]).await?;
    Ok(users.into_iter().next())
}

pub async fn load_user_by_name(client: &SgaClient, user_name: &str) -> Result<Option<Profile>> {
    let users = load_users_by_name(client, &[user_name.to_string()]).await?;
    Ok(users.into_iter().next())
}

pub async fn search_users(client: &SgaClient, search: &UserSearch) -> Result<UserPage> {
    let _permit = client.guard().acquire(keys::USER_SEARCH)?;

    let mut form = Form::new();
    form.insert("action".to_string(), "search".to_string());
    form.insert("Limit".to_string(), search.limit.to_string());
    form.insert("Page".to_string(), search.page.to_string());
    if search.online_only {
        form.insert("Online".to_string(), "1".to_string());
    }
    if let Some(username) = search.username.as_deref().filter(|u| !u.is_empty()) {
        form.insert("Username".to_string(), username.to_string());
    }
    if let Some(email) = search.email.as_deref().filter(|e| !e.is_empty()) {
        form.insert("Email".to_string(), email.to_string());
    }
    insert_filters(&mut form, &search.filters);

    let body = client.call(Method::Post, "users.php", Some(form)).await?;
    parse_page(&body, "total")
}

pub async fn random_users(client: &SgaClient, filters: &[SearchCustomData], count: i32) -> Result<Vec<Profile>> {
    let _permit = client.guard().acquire(keys::USER_RANDOM)?;

    let mut form = Form::new();
    form.insert("action".to_string(), "random".to_string());
    insert_filters(&mut form, filters);
    form.insert("Count".to_string(), count.max(1).to_string());

    let body = client.call(Method::Post, "users.php", Some(form)).await?;
    Ok(parse_page(&body, "total")?.results)
}

/// Whether an account already uses `username` or `email`.
pub async fn user_exists(client: &SgaClient, username: Option<&str>, email: Option<&str>) -> Result<bool> {
    let _permit = client.guard().acquire(keys::USER_EXISTS)?;

    let mut form = Form::new();
    form.insert("action".to_string(), "exists".to_string());
    if let Some(username) = username.filter(|u| !u.is_empty()) {
        form.insert("Username".to_string(), username.to_string());
    }
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        form.insert("Email".to_string(), email.to_string());
    }

    let body = client.call(Method::Post, "users.php", Some(form)).await?;
    match parse_envelope(&body)? {
        Some(Value::Bool(exists)) => Ok(exists),
        Some(Value::String(s)) => s
            .trim()
            .parse::<bool>()
            .map_err(|_| SgaError::parse(format!("expected a boolean, got '{}'", s))),
        _ => Err(SgaError::parse("exists answer is not a boolean")),
    }
}

/// Records `verb` for the session's user and returns the reward it earned.
pub async fn push_action(client: &SgaClient, verb: &str) -> Result<Reward> {
    let _permit = client.guard().acquire(keys::ACTION_PUSH)?;

    let mut form = Form::new();
    form.insert("Verb".to_string(), verb.to_string());

    let body = client.call(Method::Post, "api/actions", Some(form)).await?;
    let reward: Reward = parse_entity(&body)?;
    info!("Action '{}' earned reward {}", verb, reward.id);
    Ok(reward)
}

async fn load_by(client: &SgaClient, field: &str, values: &[String]) -> Result<Vec<Profile>> {
    let _permit = client.guard().acquire(keys::USER_LOAD)?;

    let mut form = Form::new();
    form.insert("action".to_string(), "load".to_string());
    form.insert(field.to_string(), values.join(","));

    let body = client.call(Method::Post, "users.php", Some(form)).await?;
    let list = match parse_envelope(&body)? {
        Some(Value::Array(list)) => list,
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw)? {
            Value::Array(list) => list,
            _ => return Err(SgaError::parse("user list is not an array")),
        },
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(SgaError::parse("user list is not an array")),
    };
    list.into_iter()
        .filter(Value::is_object)
        .map(|item| serde_json::from_value(item).map_err(SgaError::from))
        .collect()
}

fn contact_form(action: &str, other: &UserRef) -> Form {
    let mut form = Form::new();
    form.insert("action".to_string(), action.to_string());
    match other {
        UserRef::Id(id) => form.insert("Id".to_string(), id.clone()),
        UserRef::Username(name) => form.insert("Username".to_string(), name.clone()),
    };
    form
}

fn insert_filters(form: &mut Form, filters: &[SearchCustomData]) {
    let encoded = encode_filters(filters);
    if !encoded.is_empty() {
        form.insert("CustomData".to_string(), encoded);
    }
}

/// Decodes a results page; `key` must be present or the body's message
/// becomes the rejection.
fn parse_page(body: &str, key: &str) -> Result<UserPage> {
    let map = parse_object(body)?;
    if !map.contains_key(key) {
        return Err(missing_key(&map, key));
    }
    Ok(serde_json::from_value(Value::Object(map))?)
}
