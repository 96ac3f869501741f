use std::{env, net::SocketAddr};

const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:3000";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to load {variable} from environment variables: {source}")]
    Missing {
        variable: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("Invalid listen address \"{value}\": {source}")]
    InvalidListenAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Where the links live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Turso or any other libSQL server
    Remote { url: String, auth_token: String },
    /// SQLite file on disk or `:memory:`
    Local { path: String },
}

impl DatabaseLocation {
    pub fn from_url(url: String, auth_token: String) -> Self {
        const REMOTE_SCHEMES: [&str; 3] = ["libsql://", "http://", "https://"];

        if REMOTE_SCHEMES
            .iter()
            .any(|scheme| url.starts_with(scheme))
        {
            Self::Remote { url, auth_token }
        } else {
            Self::Local { path: url }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Configuration {
    pub database: DatabaseLocation,
    pub listen_address: SocketAddr,
}

impl Configuration {
    /// Reads the configuration from the process environment. A `.env` file is loaded first if there is one.
    pub fn from_env() -> Result<Self, Error> {
        if let Err(error) = dotenvy::dotenv() {
            if !error.not_found() {
                tracing::warn!("Failed to load .env file: {error}");
            }
        }

        let url = env::var("LIBSQL_DATABASE_URL").map_err(|source| Error::Missing {
            variable: "LIBSQL_DATABASE_URL",
            source,
        })?;
        let auth_token = env::var("LIBSQL_AUTH_TOKEN").unwrap_or_default();

        let listen_address = match env::var("LISTEN_ADDRESS") {
            Ok(value) => parse_listen_address(value)?,
            Err(env::VarError::NotPresent) => parse_listen_address(DEFAULT_LISTEN_ADDRESS.into())?,
            Err(source) => {
                return Err(Error::Missing {
                    variable: "LISTEN_ADDRESS",
                    source,
                })
            }
        };

        Ok(Self {
            database: DatabaseLocation::from_url(url, auth_token),
            listen_address,
        })
    }
}

fn parse_listen_address(value: String) -> Result<SocketAddr, Error> {
    value
        .parse()
        .map_err(|source| Error::InvalidListenAddress { value, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turso_urls_are_remote() {
        let location = DatabaseLocation::from_url("libsql://links.turso.io".into(), "token".into());

        assert_eq!(
            location,
            DatabaseLocation::Remote {
                url: "libsql://links.turso.io".into(),
                auth_token: "token".into(),
            }
        );
    }

    #[test]
    fn paths_are_local() {
        let location = DatabaseLocation::from_url("links.db".into(), String::new());
        assert_eq!(
            location,
            DatabaseLocation::Local {
                path: "links.db".into()
            }
        );

        let location = DatabaseLocation::from_url(":memory:".into(), String::new());
        assert!(matches!(location, DatabaseLocation::Local { .. }));
    }

    #[test]
    fn bad_listen_address_is_rejected() {
        let result = parse_listen_address("localhost".into());
        assert!(matches!(result, Err(Error::InvalidListenAddress { .. })));

        let address = parse_listen_address(DEFAULT_LISTEN_ADDRESS.into()).unwrap();
        assert_eq!(address.port(), 3000);
    }
}
