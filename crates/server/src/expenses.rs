//! Expense API endpoints

use api_types::expense::{ExpenseCreated, ExpenseDetail, ExpenseNew, ExpenseTotal, ExpensesResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewExpense, currency_or_base};
use uuid::Uuid;

use crate::{ServerError, parse_money, server::ServerState, user, views};

/// Handle requests for creating an expense in a group.
///
/// The rates are frozen at creation; `rates_origin` tells the client when
/// the live source was unavailable.
pub async fn expense_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let new = NewExpense {
        name: payload.name,
        payer: payload.payer,
        amount: parse_money(&payload.amount)?,
        currency: Some(currency_or_base(payload.currency.as_deref())?),
    };
    let (expense, origin) = state
        .engine
        .new_expense(group_id, new, &user.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ExpenseCreated {
            id: expense.id,
            rates_origin: views::rate_origin(origin),
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .list_group_expenses(group_id, &user.username)
        .await?;

    Ok(Json(ExpensesResponse {
        expenses: expenses.into_iter().map(views::expense).collect(),
    }))
}

/// Handle requests for an expense with its items and shares
pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseDetail>, ServerError> {
    let detail = state.engine.expense(expense_id, &user.username).await?;

    Ok(Json(ExpenseDetail {
        expense: views::expense(detail.expense),
        items: detail.items.into_iter().map(views::item).collect(),
        items_total: detail.items_total.into(),
        rates_origin: views::rate_origin(detail.rates_origin),
    }))
}

pub async fn total(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseTotal>, ServerError> {
    let total = state
        .engine
        .expense_total(expense_id, &user.username)
        .await?;

    Ok(Json(ExpenseTotal {
        total: total.into(),
        currency: engine::CurrencyCode::BASE.to_string(),
    }))
}
