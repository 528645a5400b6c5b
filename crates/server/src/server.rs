use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{balances, expenses, groups, items, payments, rates, settlement, shares, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to load user: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/groups", post(groups::group_new))
        .route(
            "/groups/{group_id}/members",
            get(groups::list_members).post(groups::add_member),
        )
        .route(
            "/groups/{group_id}/expenses",
            get(expenses::list).post(expenses::expense_new),
        )
        .route("/expenses/{expense_id}", get(expenses::get))
        .route("/expenses/{expense_id}/total", get(expenses::total))
        .route("/expenses/{expense_id}/items", post(items::item_new))
        .route(
            "/expenses/{expense_id}/items/{item_id}",
            patch(items::update).delete(items::delete),
        )
        .route(
            "/expenses/{expense_id}/items/{item_id}/shares",
            post(shares::share_new),
        )
        .route(
            "/expenses/{expense_id}/items/{item_id}/shares/{share_id}",
            patch(shares::update).delete(shares::delete),
        )
        .route(
            "/shares/{share_id}",
            patch(shares::update_by_id).delete(shares::delete_by_id),
        )
        .route(
            "/expenses/{expense_id}/payments",
            get(payments::list).post(payments::payment_new),
        )
        .route(
            "/expenses/{expense_id}/payments/{payment_id}",
            axum::routing::delete(payments::delete),
        )
        .route(
            "/expenses/{expense_id}/payments/{payment_id}/verify",
            post(payments::verify),
        )
        .route(
            "/expenses/{expense_id}/payments/{payment_id}/reject",
            post(payments::reject),
        )
        .route(
            "/expenses/{expense_id}/payments/{payment_id}/receipt",
            get(payments::receipt).post(payments::receipt_new),
        )
        .route("/expenses/{expense_id}/settlements", get(settlement::list))
        .route(
            "/expenses/{expense_id}/settlements/{username}",
            get(settlement::get),
        )
        .route("/balances", get(balances::list))
        .route("/balances/summary", get(balances::summary))
        .route("/rates", get(rates::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}
