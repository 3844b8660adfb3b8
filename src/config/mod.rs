// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::Config;

use crate::edge::{Behavior, OriginDescriptor, RouteTable, RouteTableError};

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the given file path (without extension)
    ///
    /// The file is optional; `EDGE_`-prefixed environment variables
    /// (`EDGE_SERVER__PORT=9000`) override it, defaults fill the rest.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("EDGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("store.root", "./origin")?
            .set_default("store.domain_name", "blog-origin.s3.us-east-1.amazonaws.com")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn origin(&self) -> OriginDescriptor {
        OriginDescriptor::new(self.store.domain_name.as_str())
    }

    /// Validated route table: configured behaviors or the standard table
    pub fn route_table(&self) -> Result<RouteTable, RouteTableError> {
        match &self.edge.behaviors {
            Some(behaviors) => RouteTable::new(Behavior::catch_all(), behaviors.clone()),
            None => Ok(RouteTable::standard()),
        }
    }
}
