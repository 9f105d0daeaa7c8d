use axum::{routing::post, Router};

use crate::{handlers::signature::verify_signature, http_server::AppState};

pub fn signature_routes() -> Router<AppState> {
    Router::new().route("/verify-signature", post(verify_signature))
}
