use crate::state::AppState;
use axum::{Router, response::Html, routing::get};

mod location;
mod statistics;
#[cfg(test)]
mod tests;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/statistics/", get(statistics::show_statistics))
        .merge(location::router())
}

async fn root() -> Html<String> {
    Html("geoloc API root here".to_string())
}
