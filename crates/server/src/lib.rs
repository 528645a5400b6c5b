use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{CurrencyCode, EngineError, Money};
use rust_decimal::Decimal;

use api_types::ErrorBody;
pub use server::{ServerState, router, run_with_listener};

mod balances;
mod expenses;
mod groups;
mod items;
mod payments;
mod rates;
mod server;
mod settlement;
mod shares;
mod user;
mod views;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidShare(_)
        | EngineError::InvalidCurrency(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Parses a client amount (`"10.50"`, `"10,50"`).
fn parse_money(raw: &str) -> Result<Money, ServerError> {
    raw.parse::<Money>().map_err(ServerError::from)
}

fn parse_currency(raw: Option<&str>) -> Result<Option<CurrencyCode>, ServerError> {
    raw.map(|code| CurrencyCode::try_from(code).map_err(ServerError::from))
        .transpose()
}

fn parse_percent(raw: Option<&str>) -> Result<Option<Decimal>, ServerError> {
    raw.map(|percent| engine::shares::parse_percent(percent).map_err(ServerError::from))
        .transpose()
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidShare("x".to_string()),
            EngineError::InvalidCurrency("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn database_maps_to_500() {
        let err = EngineError::Database(DbErr::Custom("disk".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn client_amounts_are_validated() {
        assert_eq!(parse_money("10,5").unwrap().to_string(), "10.50");
        assert!(parse_money("1.234").is_err());
        assert!(parse_currency(Some("US")).is_err());
        assert_eq!(parse_currency(None).unwrap(), None);
        assert!(parse_percent(Some("12,5")).unwrap().is_some());
    }
}
