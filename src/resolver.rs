//! Turns a scanned link id into the destination the scanner is sent to.
//! Both transports go through [`Resolver::handle`] so they behave the same.

use std::sync::Arc;

use axum::http::{HeaderValue, Method, StatusCode};

use crate::store::{LinkStore, StoreError};

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("Method {0} is not allowed")]
    MethodNotAllowed(Method),
    #[error("Request is missing the link id")]
    MissingId,
    #[error("Link {0} not found")]
    NotFound(String),
    #[error("Link {0} is deactivated")]
    Deactivated(String),
    #[error("Error accessing the link store: {0}")]
    Store(#[from] StoreError),
    #[error("Destination of link {id} can't be used as location: {destination}")]
    InvalidDestination { id: String, destination: String },
}

impl ResolveError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResolveError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ResolveError::MissingId => StatusCode::BAD_REQUEST,
            ResolveError::NotFound(_) => StatusCode::NOT_FOUND,
            ResolveError::Deactivated(_) => StatusCode::FORBIDDEN,
            ResolveError::Store(_) | ResolveError::InvalidDestination { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text shown to the person who scanned the code. Doesn't leak internal details.
    pub fn message(&self) -> &'static str {
        match self {
            ResolveError::MethodNotAllowed(_) => "Method not allowed",
            ResolveError::MissingId => "Missing link id",
            ResolveError::NotFound(_) => "Link not found",
            ResolveError::Deactivated(_) => "This link has been deactivated by its owner",
            ResolveError::Store(_) | ResolveError::InvalidDestination { .. } => {
                "Internal server error"
            }
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// Where an active link points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id: String,
    pub url: String,
    /// `url` as it is sent in the `Location` header
    pub location: HeaderValue,
}

impl Destination {
    /// Links are redirected permanently
    pub const STATUS_CODE: StatusCode = StatusCode::MOVED_PERMANENTLY;
}

#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn LinkStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// Entry point for the transports. Only `GET` requests reach the store.
    pub async fn handle(
        &self,
        method: &Method,
        id: Option<&str>,
    ) -> Result<Destination, ResolveError> {
        if *method != Method::GET {
            return Err(ResolveError::MethodNotAllowed(method.clone()));
        }

        self.resolve(id).await
    }

    /// Looks up the link and counts the scan if the link is active
    pub async fn resolve(&self, id: Option<&str>) -> Result<Destination, ResolveError> {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ResolveError::MissingId),
        };

        let Some(link) = self.store.get(id).await? else {
            return Err(ResolveError::NotFound(id.to_owned()));
        };

        if !link.is_active {
            return Err(ResolveError::Deactivated(link.id));
        }

        // Checked before counting as the scanner would never arrive
        let Ok(location) = HeaderValue::try_from(link.original_link.as_str()) else {
            return Err(ResolveError::InvalidDestination {
                id: link.id,
                destination: link.original_link,
            });
        };

        // The link can be deleted between the lookup and the increment
        if !self.store.increment_scans(id).await? {
            return Err(ResolveError::NotFound(link.id));
        }

        tracing::debug!("Resolved link {} to {}", link.id, link.original_link);

        Ok(Destination {
            id: link.id,
            url: link.original_link,
            location,
        })
    }
}
