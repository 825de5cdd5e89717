use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::service::dashboard_service::{DashboardService, DashboardServiceImpl};
use crate::util::error::HandlerError;

pub async fn stats_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.stats().await?;
    Ok(Json(res))
}

pub async fn charts_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.charts().await?;
    Ok(Json(res))
}
