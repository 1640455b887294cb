use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{admin, barrels, bottler, carts, catalog, inventory};
use engine::Engine;

static ACCESS_TOKEN_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("access_token");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Expected `access_token`; `None` disables the check.
    pub api_key: Option<Arc<str>>,
}

impl ServerState {
    pub fn new(engine: Engine, api_key: Option<String>) -> Self {
        Self {
            engine: Arc::new(engine),
            api_key: api_key.map(Arc::from),
        }
    }
}

/// `TypedHeader` for the shop API key
///
/// Every router except the catalog requires an "access_token" entry in the
/// header.
#[derive(Debug)]
struct AccessToken(String);

impl Header for AccessToken {
    fn name() -> &'static axum::http::HeaderName {
        &ACCESS_TOKEN_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };

        Ok(AccessToken(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode access_token header"),
        }
    }
}

async fn auth(
    token: Option<TypedHeader<AccessToken>>,
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };
    match token {
        Some(TypedHeader(AccessToken(token))) if token == expected => Ok(next.run(request).await),
        _ => {
            tracing::warn!(path = %request.uri().path(), "rejected request without a valid access_token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// The shop router; only `/catalog/` is reachable without the API key.
pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/barrels/deliver/{order_id}", post(barrels::deliver))
        .route("/barrels/plan", post(barrels::plan))
        .route("/bottler/deliver/{order_id}", post(bottler::deliver))
        .route("/bottler/plan", post(bottler::plan))
        .route("/inventory/deliver/{order_id}", post(inventory::deliver))
        .route("/inventory/plan", post(inventory::plan))
        .route("/inventory/audit", get(inventory::audit))
        .route("/carts/", post(carts::create_cart))
        .route("/carts/search/", get(carts::search_orders))
        .route("/carts/visits/{visit_id}", post(carts::post_visits))
        .route(
            "/carts/{cart_id}/items/{item_sku}",
            post(carts::set_item_quantity),
        )
        .route("/carts/{cart_id}/checkout", post(carts::checkout))
        .route("/admin/reset", post(admin::reset))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/catalog/", get(catalog::get))
        .merge(protected)
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);
    if state.api_key.is_none() {
        tracing::warn!("no api_key configured, access_token is not checked");
    }

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
