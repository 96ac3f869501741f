//! Resolves the ids in scanned QR codes to the links they stand for and counts the scans.

pub mod configuration;
pub mod database;
pub mod logging;
pub mod resolver;
pub mod routes;
pub mod serverless;
pub mod store;
