//! Stage sequencing for one request
//!
//! viewer: admission → (redirect | origin fetch | store read) → header stamp
//! origin: origin fetch | store read
//!
//! Admission and stamping run for every viewer request; the route table
//! decides what happens in between. A redirect short-circuits before the
//! origin is touched, so a redirect and a fetch never both run. Requests
//! arriving at the origin have already passed the viewer stages and only
//! get the behavior's origin action.

use std::sync::Arc;

use super::dispatch::{Behavior, OriginAction, ViewerRequestStage};
use super::origin::StoreOrigin;
use super::{
    AdmissionFilter, CanonicalRedirector, EdgeRequest, EdgeResponse, HeaderStamper,
    OriginFetcher, RouteTable, StageOutcome,
};
use crate::logger;
use crate::store::ObjectStore;

/// Shared, immutable pipeline; one instance serves every request
pub struct Pipeline {
    admission: AdmissionFilter,
    stamper: HeaderStamper,
    routes: RouteTable,
    store: Arc<dyn ObjectStore>,
    store_origin: StoreOrigin,
}

impl Pipeline {
    pub fn new(
        routes: RouteTable,
        store: Arc<dyn ObjectStore>,
        admission: AdmissionFilter,
        stamper: HeaderStamper,
    ) -> Self {
        Self {
            admission,
            stamper,
            routes,
            store_origin: StoreOrigin::new(Arc::clone(&store)),
            store,
        }
    }

    /// Standard route table, pass-through admission, default cache-control
    pub fn standard(store: Arc<dyn ObjectStore>) -> Self {
        Self::new(
            RouteTable::standard(),
            store,
            AdmissionFilter::new(),
            HeaderStamper::default(),
        )
    }

    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Run one viewer request through every stage; always yields a response
    pub async fn handle(&self, request: EdgeRequest) -> EdgeResponse {
        self.dispatch(request).await.1
    }

    /// Like [`Pipeline::handle`], also naming the behavior that served it
    pub async fn dispatch(&self, request: EdgeRequest) -> (&Behavior, EdgeResponse) {
        logger::log_debug(&format!("[EDGE] Request: {request:?}"));
        let behavior = self.routes.resolve(&request.path);
        let response = self.respond(behavior, request).await;
        (behavior, self.stamper.stamp(response))
    }

    /// Run an origin-request event: the behavior's origin action only
    pub async fn handle_origin(&self, request: EdgeRequest) -> EdgeResponse {
        logger::log_debug(&format!("[EDGE] Origin request: {request:?}"));
        let behavior = self.routes.resolve(&request.path);
        self.origin_stage(behavior, request).await
    }

    async fn respond(&self, behavior: &Behavior, request: EdgeRequest) -> EdgeResponse {
        let request = match self.admission.evaluate(request) {
            StageOutcome::Continue(request) => request,
            StageOutcome::Respond(response) => return response,
        };
        if let Some(response) = viewer_request_stage(behavior, &request) {
            return response;
        }
        self.origin_stage(behavior, request).await
    }

    async fn origin_stage(&self, behavior: &Behavior, request: EdgeRequest) -> EdgeResponse {
        let origin_request = if behavior.forward_query_string {
            request
        } else {
            request.without_query()
        };
        match &behavior.origin {
            OriginAction::Fetch { category } => {
                OriginFetcher::new(Arc::clone(&self.store), category.as_str())
                    .with_route_prefix(behavior.literal_prefix())
                    .fetch(&origin_request)
                    .await
            }
            OriginAction::Store => self.store_origin.read(&origin_request).await,
        }
    }
}

fn viewer_request_stage(behavior: &Behavior, request: &EdgeRequest) -> Option<EdgeResponse> {
    match behavior.viewer_request.as_ref()? {
        ViewerRequestStage::Redirect { target_category } => Some(
            CanonicalRedirector::new(behavior.literal_prefix(), target_category.as_str())
                .redirect(request),
        ),
    }
}
