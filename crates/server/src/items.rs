//! Item API endpoints

use api_types::item::{ItemNew, ItemUpdate, ItemView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{EngineError, ItemPatch, NewItem, currency_or_base};
use uuid::Uuid;

use crate::{ServerError, parse_currency, parse_money, server::ServerState, user, views};

/// Handle requests for adding an item; answers with the item as the detail
/// view shows it.
pub async fn item_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let new = NewItem {
        name: payload.name,
        amount: parse_money(&payload.amount)?,
        currency: Some(currency_or_base(payload.currency.as_deref())?),
    };
    let item = state
        .engine
        .add_item(expense_id, new, &user.username)
        .await?;

    let view = state
        .engine
        .expense(expense_id, &user.username)
        .await?
        .items
        .into_iter()
        .find(|view| view.item.id == item.id)
        .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;

    Ok((StatusCode::CREATED, Json(views::item(view))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    let patch = ItemPatch {
        name: payload.name,
        amount: payload.amount.as_deref().map(parse_money).transpose()?,
        currency: parse_currency(payload.currency.as_deref())?,
    };
    let view = state
        .engine
        .update_item(expense_id, item_id, patch, &user.username)
        .await?;

    Ok(Json(views::item(view)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_item(expense_id, item_id, &user.username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
