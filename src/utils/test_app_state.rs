use crate::{http_server::AppState, metrics::Metrics};
use std::sync::Arc;

pub fn create_test_app_state() -> AppState {
    AppState {
        metrics: Arc::new(Metrics::new()),
    }
}
