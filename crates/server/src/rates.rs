use api_types::rates::RatesView;
use axum::{Extension, Json, extract::State};
use engine::CurrencyCode;

use crate::{server::ServerState, user, views};

/// Current rates from the live source, `{THB: 1}` with a `fallback` origin
/// when it is unavailable.
pub async fn get(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Json<RatesView> {
    let resolved = state.engine.live_rates().await;

    Json(RatesView {
        base: CurrencyCode::BASE.to_string(),
        origin: views::rate_origin(resolved.origin),
        rates: views::rates(&resolved.rates),
    })
}
