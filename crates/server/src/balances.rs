//! Dashboard endpoints: what the caller owes and is owed across groups.

use api_types::balance::{BalancesResponse, SummaryView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user, views};

/// Outstanding lines plus their roll-up per counterparty.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let lines = state.engine.balances(&user.username).await?;
    let counterparties = engine::balances::by_counterparty(&lines);

    Ok(Json(BalancesResponse {
        lines: lines.into_iter().map(views::balance_line).collect(),
        counterparties: counterparties
            .into_iter()
            .map(views::counterparty)
            .collect(),
    }))
}

pub async fn summary(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryView>, ServerError> {
    let summary = state.engine.summary(&user.username).await?;

    Ok(Json(views::summary(summary)))
}
