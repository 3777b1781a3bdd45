use tracing::info;

use crate::errors::Result;
use crate::guard::keys;
use crate::models::actor_goal::{ActorGoal, CreateActorGoal};
use crate::models::goal::{CreateGoal, Goal};
use crate::services::transport::{parse_entity, parse_list, Form, Method};
use crate::state::SgaClient;

pub async fn create_goal(client: &SgaClient, goal: &CreateGoal) -> Result<Goal> {
    let _permit = client.guard().acquire(keys::GOAL_CREATE)?;

    let mut form = Form::new();
    form.insert("Description".to_string(), goal.description.clone());
    form.insert("ConcernId".to_string(), goal.concern_id.clone());
    form.insert("RewardResourceId".to_string(), goal.reward_resource_id.clone());
    form.insert("FeedbackId".to_string(), goal.feedback_id.clone());

    let body = client.call(Method::Post, "api/goals", Some(form)).await?;
    let created: Goal = parse_entity(&body)?;
    info!("Created goal {}", created.id);
    Ok(created)
}

pub async fn get_activity_goals(client: &SgaClient, activity_id: &str) -> Result<Vec<Goal>> {
    let _permit = client.guard().acquire(keys::GOAL_LOAD)?;

    let url = format!("api/goals/{}/activity", activity_id);
    let body = client.call(Method::Get, &url, None).await?;
    parse_list(&body)
}

pub async fn get_goal(client: &SgaClient, id: &str) -> Result<Goal> {
    let _permit = client.guard().acquire(keys::GOAL_LOAD)?;

    let url = format!("api/goals/{}/detailed", id);
    let body = client.call(Method::Get, &url, None).await?;
    parse_entity(&body)
}

pub async fn get_actor_goal(client: &SgaClient, goal_id: &str) -> Result<ActorGoal> {
    let _permit = client.guard().acquire(keys::ACTOR_GOAL_LOAD)?;

    let url = format!("api/goals/{}/actor", goal_id);
    let body = client.call(Method::Get, &url, None).await?;
    parse_entity(&body)
}

/// Assigns a goal to the local user.
pub async fn create_actor_goal(client: &SgaClient, request: &CreateActorGoal) -> Result<ActorGoal> {
    let local = client.require_local_user()?;
    let _permit = client.guard().acquire(keys::ACTOR_GOAL_CREATE)?;

    let mut form = Form::new();
    form.insert("ActorId".to_string(), local.profile.id.clone());
    form.insert("GoalId".to_string(), request.goal_id.clone());
    form.insert("Status".to_string(), "0".to_string());
    form.insert("ConcernOutcomeId".to_string(), request.concern_id.clone());
    form.insert("RewardResourceOutcomeId".to_string(), request.reward_resource_id.clone());
    form.insert("ActivityId".to_string(), request.activity_id.clone());
    form.insert("RoleId".to_string(), request.role_id.clone());

    let body = client.call(Method::Post, "api/goals/actors", Some(form)).await?;
    let created: ActorGoal = parse_entity(&body)?;
    info!("Assigned goal {} to {}", request.goal_id, local.profile.user_name);
    Ok(created)
}
