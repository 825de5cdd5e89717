use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handler::contact_handler::submit_contact_handler;
use crate::service::contact_service::ContactServiceImpl;

/// Mounted under `/api/contact`; `/contact` is kept for older clients.
pub fn contact_router(service: Arc<ContactServiceImpl>) -> Router {
    Router::new()
        .route("/", post(submit_contact_handler))
        .route("/contact", post(submit_contact_handler))
        .with_state(service)
}
