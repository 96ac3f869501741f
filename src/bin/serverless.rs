//! Handles a single serverless invocation: reads the JSON event from stdin and writes the JSON
//! response to stdout.

use std::{io::Read, sync::Arc};

use qr_redirect::{
    configuration::{self, Configuration},
    database::{Database, InitializationError},
    logging,
    resolver::Resolver,
    serverless,
};

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("Error loading configuration: {0}")]
    Configuration(#[from] configuration::Error),
    #[error("Error initializing database: {0}")]
    Database(#[from] InitializationError),
    #[error("Error reading event: {0}")]
    Read(#[source] std::io::Error),
    #[error("Error writing response: {0}")]
    Write(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let configuration = Configuration::from_env()?;
    let database = Database::initialize(configuration.database).await?;
    let resolver = Resolver::new(Arc::new(database));

    let mut event = String::new();
    std::io::stdin()
        .read_to_string(&mut event)
        .map_err(Error::Read)?;

    let response = serverless::handle_json(&resolver, &event).await;
    serde_json::to_writer(std::io::stdout().lock(), &response)?;

    Ok(())
}
