use tracing::info;

use crate::errors::Result;
use crate::guard::keys;
use crate::models::activity::Activity;
use crate::models::role::Role;
use crate::services::transport::{parse_entity, Method};
use crate::state::SgaClient;

pub async fn get_activity(client: &SgaClient, id: &str) -> Result<Activity> {
    let _permit = client.guard().acquire(keys::ACTIVITY_LOAD)?;

    let body = client.call(Method::Get, &format!("api/activities/{}", id), None).await?;
    let activity: Activity = parse_entity(&body)?;
    info!("Loaded activity {} ({})", activity.name, activity.id);
    Ok(activity)
}

pub async fn get_role(client: &SgaClient, id: &str) -> Result<Role> {
    let _permit = client.guard().acquire(keys::ROLE_LOAD)?;

    let body = client.call(Method::Get, &format!("api/roles/{}", id), None).await?;
    let role: Role = parse_entity(&body)?;
    info!("Loaded role {} ({})", role.name, role.id);
    Ok(role)
}
