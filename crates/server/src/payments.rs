//! Payment and receipt API endpoints

use api_types::payment::{PaymentNew, PaymentView, PaymentsResponse, ReceiptNew, ReceiptView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::NewReceipt;
use uuid::Uuid;

use crate::{ServerError, parse_money, server::ServerState, user, views};

/// Handle requests for recording a reimbursement sent by the caller.
/// The payment starts as `PENDING` until the payer reviews it.
pub async fn payment_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<PaymentNew>,
) -> Result<(StatusCode, Json<PaymentView>), ServerError> {
    let amount = parse_money(&payload.amount)?;
    let payment = state
        .engine
        .record_payment(expense_id, amount, payload.note.as_deref(), &user.username)
        .await?;

    Ok((StatusCode::CREATED, Json(views::payment(payment))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<PaymentsResponse>, ServerError> {
    let payments = state
        .engine
        .list_payments(expense_id, &user.username)
        .await?;

    Ok(Json(PaymentsResponse {
        payments: payments.into_iter().map(views::payment).collect(),
    }))
}

pub async fn verify(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PaymentView>, ServerError> {
    let payment = state
        .engine
        .verify_payment(expense_id, payment_id, &user.username)
        .await?;

    Ok(Json(views::payment(payment)))
}

pub async fn reject(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PaymentView>, ServerError> {
    let payment = state
        .engine
        .reject_payment(expense_id, payment_id, &user.username)
        .await?;

    Ok(Json(views::payment(payment)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_payment(expense_id, payment_id, &user.username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Attach the metadata of an uploaded receipt; a payment has at most one.
pub async fn receipt_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, payment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReceiptNew>,
) -> Result<(StatusCode, Json<ReceiptView>), ServerError> {
    let new = NewReceipt {
        file_name: payload.file_name,
        content_type: payload.content_type,
        storage_key: payload.storage_key,
    };
    let receipt = state
        .engine
        .attach_receipt(expense_id, payment_id, new, &user.username)
        .await?;

    Ok((StatusCode::CREATED, Json(views::receipt(receipt))))
}

pub async fn receipt(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((expense_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ReceiptView>, ServerError> {
    let receipt = state
        .engine
        .receipt(expense_id, payment_id, &user.username)
        .await?;

    Ok(Json(views::receipt(receipt)))
}
