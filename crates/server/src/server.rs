use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{ServerError, categories, menu_items, reports, transactions, users};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the active user behind HTTP Basic credentials and stores it as a
/// request extension for the handlers.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(EngineError::InvalidCredentials.into());
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(EngineError::InvalidCredentials.into());
    }

    let user = state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
        .inspect_err(|_| {
            tracing::debug!(username = credentials.username(), "rejected credentials");
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Every route except `/login` runs behind the Basic-auth middleware. Each
/// handler checks the capability it needs.
pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/range", get(transactions::by_date_range))
        .route(
            "/transactions/cashier/{cashier_id}",
            get(transactions::by_cashier),
        )
        .route("/transactions/{id}", get(transactions::get_detail))
        .route("/reports/daily", get(reports::daily))
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::deactivate),
        )
        .route(
            "/menu-items",
            get(menu_items::list).post(menu_items::create),
        )
        .route(
            "/menu-items/{id}",
            get(menu_items::get)
                .patch(menu_items::update)
                .delete(menu_items::deactivate),
        )
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get)
                .patch(users::update)
                .delete(users::deactivate),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/login", post(users::login))
        .merge(protected)
        .with_state(state)
}

/// Bind `address` (e.g. `127.0.0.1:3000`) and serve until the process stops.
pub async fn run(engine: Engine, address: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
