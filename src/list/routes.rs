use axum::{Router, routing::any};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    // every method lands on the dispatcher so unsupported verbs get the
    // uniform {status, message} rejection instead of a bare 405
    Router::new().route("/api", any(handler::dispatch))
}
