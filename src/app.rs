use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/toggle", post(handlers::toggle_form))
        .route("/workouts", get(handlers::get_workouts))
        .route("/toggle_workout", post(handlers::toggle_workout))
        .route("/save_message", post(handlers::save_message))
        .route("/prize", get(handlers::get_prize))
        .with_state(state)
}
