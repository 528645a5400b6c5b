use api_types::settlement::{SettlementView, SettlementsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user, views};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<SettlementsResponse>, ServerError> {
    let lines = state
        .engine
        .all_settlements(expense_id, &user.username)
        .await?;

    Ok(Json(SettlementsResponse {
        settlements: lines.into_iter().map(views::settlement).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, username)): Path<(Uuid, String)>,
) -> Result<Json<SettlementView>, ServerError> {
    let line = state
        .engine
        .settlement(expense_id, &username, &user.username)
        .await?;

    Ok(Json(views::settlement(line)))
}
