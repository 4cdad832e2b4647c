use clap::Parser;
use snafu::prelude::*;
use std::net::IpAddr;

pub mod api;
pub mod capture;
pub mod db;
pub mod error;
pub mod server;
pub mod store;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to bind server"))]
    ServerBind { source: std::io::Error },

    #[snafu(display("Server failed to start"))]
    ServerStart { source: std::io::Error },

    #[snafu(display("Database initialization failed: {}", source))]
    DatabaseInit { source: error::ApiError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Parser, Debug)]
#[command(name = "apipulse-server")]
#[command(about = "API traffic metrics collector for the apipulse dashboard")]
pub struct ServerArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind to
    #[arg(short, long, default_value = "3002")]
    pub port: u16,

    /// Database URL for the embedded metrics mirror
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://metrics.db")]
    pub database_url: String,

    /// Maximum number of records held in the in-memory store before the
    /// oldest are evicted
    #[arg(long, env = "STORE_CAPACITY", default_value = "100000")]
    pub store_capacity: usize,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// CORS domain to allow (supports wildcards like "*.example.com")
    #[arg(long = "corsdomain", env = "CORS_DOMAIN")]
    pub cors_domain: Option<String>,
}
