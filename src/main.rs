use std::sync::Arc;

use qr_redirect::{
    configuration::{self, Configuration},
    database::{Database, InitializationError},
    logging,
    resolver::Resolver,
    routes::{create_router, AppState},
};

#[derive(thiserror::Error, Debug)]
enum StartupError {
    #[error("Error loading configuration: {0}")]
    Configuration(#[from] configuration::Error),
    #[error("Error initializing database: {0}")]
    Database(#[from] InitializationError),
    #[error("Error running server: {0}")]
    Server(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    logging::init();

    let configuration = Configuration::from_env()?;
    let database = Database::initialize(configuration.database).await?;

    let app_state = AppState {
        resolver: Resolver::new(Arc::new(database)),
    };

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(configuration.listen_address).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
