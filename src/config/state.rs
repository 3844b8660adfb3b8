// Application state module
// Holds the configuration and the shared, read-only edge pipeline

use std::sync::Arc;

use super::types::Config;
use crate::edge::{AdmissionFilter, HeaderStamper, OriginDescriptor, Pipeline, RouteTableError};
use crate::store::ObjectStore;

/// Shared by every connection; nothing in it is mutated after startup
pub struct AppState {
    pub config: Config,
    pub pipeline: Pipeline,
    pub origin: OriginDescriptor,
}

impl AppState {
    /// Build the pipeline from configuration around an injected store
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Result<Self, RouteTableError> {
        let pipeline = Pipeline::new(
            config.route_table()?,
            store,
            AdmissionFilter::with_blocked_user_agents(&config.edge.blocked_user_agents),
            HeaderStamper::new(config.edge.cache_control.as_str()),
        );
        Ok(Self {
            origin: config.origin(),
            config,
            pipeline,
        })
    }
}
