use axum::{
    extract::{Query, State},
    http::{header, Method},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    resolver::{Destination, ResolveError},
    routes::AppState,
};

#[derive(Deserialize, Debug)]
pub(crate) struct RedirectQuery {
    id: Option<String>,
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!("Error resolving link: {}", self);
        } else {
            tracing::debug!("Rejected link request: {}", self);
        }

        (self.status_code(), self.message()).into_response()
    }
}

/// Handler the QR codes point to: `/redirect?id=<link id>`
pub(crate) async fn redirect(
    State(state): State<AppState>,
    method: Method,
    // A malformed query is treated like a missing id
    query: Option<Query<RedirectQuery>>,
) -> Result<Response, ResolveError> {
    let id = query.and_then(|Query(query)| query.id);

    let destination = state.resolver.handle(&method, id.as_deref()).await?;

    Ok((
        Destination::STATUS_CODE,
        [(header::LOCATION, destination.location)],
    )
        .into_response())
}
