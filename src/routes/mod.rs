use axum::{routing::any, Router};
use tower_http::trace::TraceLayer;

use crate::resolver::Resolver;

pub(crate) mod redirect;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Every method reaches the handler so the resolver can reject it with a message
        .route("/redirect", any(redirect::redirect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
