use axum::Router;

use crate::{http_server::AppState, routes::signature::signature_routes};

pub mod signature;

pub fn api_routes() -> Router<AppState> {
    Router::new().merge(signature_routes())
}
