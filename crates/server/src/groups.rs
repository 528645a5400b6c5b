//! Group API endpoints

use api_types::group::{GroupNew, GroupView, MemberAdd, MembersResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user, views};

/// Handle requests for creating a new group owned by the caller
pub async fn group_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state.engine.new_group(&payload.name, &user.username).await?;

    Ok((StatusCode::CREATED, Json(views::group(group))))
}

pub async fn list_members(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .list_group_members(group_id, &user.username)
        .await?;

    Ok(Json(MembersResponse { members }))
}

pub async fn add_member(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MemberAdd>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .add_group_member(group_id, &payload.username, &user.username)
        .await?;

    Ok(StatusCode::CREATED)
}
