//! Generic serverless handler. The platform passes the request as a JSON event and expects a JSON
//! response with status code, headers and body, like Netlify or AWS Lambda behind API Gateway do.

use std::collections::HashMap;

use axum::http::{header, Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::resolver::{Destination, ResolveError, Resolver};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub http_method: Option<String>,
    /// Platforms send `null` instead of an empty object if there is no query
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl Event {
    /// Missing methods are GET as that is the only thing a QR code scanner does
    fn method(&self) -> Result<Method, ResolveError> {
        match self.http_method.as_deref() {
            None => Ok(Method::GET),
            Some(method) => method.parse().map_err(|_| {
                tracing::debug!("Event contains invalid method: \"{method}\"");
                // Never GET so it is rejected the same way as every other method
                ResolveError::MethodNotAllowed(Method::OPTIONS)
            }),
        }
    }

    fn id(&self) -> Option<&str> {
        self.query_string_parameters
            .as_ref()?
            .get("id")
            .map(String::as_str)
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerlessResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ServerlessResponse {
    fn text(status: StatusCode, body: &str) -> Self {
        let headers = HashMap::from([(
            header::CONTENT_TYPE.to_string(),
            "text/plain; charset=utf-8".to_owned(),
        )]);

        Self {
            status_code: status.as_u16(),
            headers,
            body: body.to_owned(),
        }
    }

    /// The event could not be read at all
    pub fn malformed_event(error: &serde_json::Error) -> Self {
        tracing::warn!("Received malformed event: {error}");
        Self::text(StatusCode::BAD_REQUEST, "Malformed request")
    }
}

impl From<Result<Destination, ResolveError>> for ServerlessResponse {
    fn from(result: Result<Destination, ResolveError>) -> Self {
        match result {
            Ok(destination) => Self {
                status_code: Destination::STATUS_CODE.as_u16(),
                headers: HashMap::from([("Location".to_owned(), destination.url)]),
                body: String::new(),
            },
            Err(error) => {
                if error.is_internal() {
                    tracing::error!("Error resolving link: {}", error);
                } else {
                    tracing::debug!("Rejected link request: {}", error);
                }

                Self::text(error.status_code(), error.message())
            }
        }
    }
}

pub async fn handle_event(resolver: &Resolver, event: &Event) -> ServerlessResponse {
    let method = match event.method() {
        Ok(method) => method,
        Err(error) => return Err::<Destination, _>(error).into(),
    };

    resolver.handle(&method, event.id()).await.into()
}

/// Handles a raw JSON event as the `serverless` binary receives it
pub async fn handle_json(resolver: &Resolver, event: &str) -> ServerlessResponse {
    match serde_json::from_str::<Event>(event) {
        Ok(event) => handle_event(resolver, &event).await,
        Err(error) => ServerlessResponse::malformed_event(&error),
    }
}
