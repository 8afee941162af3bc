use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/today", get(handlers::get_today).put(handlers::put_today))
        .route("/api/today/morning", put(handlers::put_morning))
        .route("/api/today/midday", put(handlers::put_midday))
        .route("/api/today/night", put(handlers::put_night))
        .route("/api/entries", get(handlers::list_entries))
        .route(
            "/api/entries/:date",
            get(handlers::get_entry)
                .put(handlers::put_entry)
                .delete(handlers::delete_entry),
        )
        .route("/api/history", get(handlers::get_history))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/calendar", get(handlers::get_calendar))
        .with_state(state)
}
