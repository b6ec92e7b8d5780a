use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn monitor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start_monitoring", post(controller::start_monitoring))
        .route("/stop_monitoring", post(controller::stop_monitoring))
        .route("/monitoring_status", get(controller::monitoring_status))
        .route("/get_logs", get(controller::get_logs))
        .route("/test_connection", post(controller::test_connection))
        .route("/events", get(controller::events))
}
