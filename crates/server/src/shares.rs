//! Share API endpoints.
//!
//! `/shares/{share_id}` routes are kept for older clients; they resolve the
//! share's item and expense and then behave as the scoped routes.

use api_types::share::{ShareNew, ShareUpdate, ShareView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::SharePatch;
use uuid::Uuid;

use crate::{ServerError, parse_money, parse_percent, server::ServerState, user, views};

fn share_patch(payload: &ShareUpdate) -> Result<SharePatch, ServerError> {
    Ok(SharePatch {
        value: payload.value.as_deref().map(parse_money).transpose()?,
        percent: parse_percent(payload.percent.as_deref())?,
    })
}

pub async fn share_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ShareNew>,
) -> Result<(StatusCode, Json<ShareView>), ServerError> {
    let value = payload.value.as_deref().map(parse_money).transpose()?;
    let percent = parse_percent(payload.percent.as_deref())?;
    let share = state
        .engine
        .allocate_share(
            expense_id,
            item_id,
            &payload.participant,
            value,
            percent,
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(views::share(share))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, item_id, share_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<ShareUpdate>,
) -> Result<Json<ShareView>, ServerError> {
    let share = state
        .engine
        .update_share(
            expense_id,
            item_id,
            share_id,
            share_patch(&payload)?,
            &user.username,
        )
        .await?;

    Ok(Json(views::share(share)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, item_id, share_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_share(expense_id, item_id, share_id, &user.username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_by_id(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(share_id): Path<Uuid>,
    Json(payload): Json<ShareUpdate>,
) -> Result<Json<ShareView>, ServerError> {
    let share = state
        .engine
        .update_share_by_id(share_id, share_patch(&payload)?, &user.username)
        .await?;

    Ok(Json(views::share(share)))
}

pub async fn delete_by_id(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(share_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_share_by_id(share_id, &user.username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
