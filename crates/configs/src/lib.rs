//! # Runtime Configuration
//!
//! Environment-driven settings for the Hemsaye service. Every knob has a
//! default suitable for local development and can be overridden with a
//! `HEMSAYE_`-prefixed environment variable, optionally via a `.env` file:
//!
//! | Variable                   | Default                   |
//! |----------------------------|---------------------------|
//! | `HEMSAYE_PORT`             | `3001`                    |
//! | `HEMSAYE_DATABASE_URL`     | `sqlite:hemsaye.db`       |
//! | `HEMSAYE_UPLOADS_DIR`      | `uploads`                 |
//! | `HEMSAYE_PUBLIC_BASE_URL`  | `http://localhost:3001`   |
//! | `HEMSAYE_FOUNDER`          | `Excer`                   |
//! | `HEMSAYE_FOUNDER_PASSWORD` | `Kabus99qwer.`            |
//! | `HEMSAYE_XP_PER_MESSAGE`   | `10`                      |
//! | `HEMSAYE_BUS_CAPACITY`     | `256`                     |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use config::{Config, Environment};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

const ENV_PREFIX: &str = "HEMSAYE";

#[derive(Debug, Error)]
#[error("failed to load configuration: {0}")]
pub struct LoadError(#[from] config::ConfigError);

/// Fully resolved service configuration.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Directory uploaded images are written to; created on boot if absent.
    pub uploads_dir: String,
    /// Origin prepended to upload paths when building public image URLs.
    pub public_base_url: String,
    /// Nickname of the account with founder powers.
    pub founder: String,
    pub founder_password: SecretString,
    pub xp_per_message: i64,
    pub bus_capacity: usize,
}

impl AppConfig {
    /// Loads configuration from the process environment, reading a `.env`
    /// file first when one is present.
    pub fn load() -> Result<Self, LoadError> {
        dotenvy::dotenv().ok();
        let cfg = Self::from_source(Environment::with_prefix(ENV_PREFIX))?;
        info!(port = cfg.port, database_url = %cfg.database_url, "configuration loaded");
        Ok(cfg)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }

    fn from_source(env: Environment) -> Result<Self, LoadError> {
        let cfg = Config::builder()
            .set_default("port", 3001_i64)?
            .set_default("database_url", "sqlite:hemsaye.db")?
            .set_default("uploads_dir", "uploads")?
            .set_default("public_base_url", "http://localhost:3001")?
            .set_default("founder", "Excer")?
            .set_default("founder_password", "Kabus99qwer.")?
            .set_default("xp_per_message", 10_i64)?
            .set_default("bus_capacity", 256_i64)?
            .add_source(env)
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }
}
