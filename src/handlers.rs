use crate::calendar::{parse_date_key, parse_week_id, today, week_dates};
use crate::errors::AppError;
use crate::models::{
    Ack, PrizeDetails, SaveMessageRequest, ToggleForm, ToggleRequest, WorkoutRecord,
    WorkoutsQuery, WorkoutsResponse,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::{render_index, IndexView};
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::NaiveDate;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = today();
    let dates = state.window.dates(today);
    let data = state.data.lock().await;
    let prize = state.prizes.prize_for(today).map(|prize| prize.details());
    let view = IndexView::build(&dates, &data.workouts, today, prize);
    Html(render_index(&view))
}

pub async fn get_workouts(
    State(state): State<AppState>,
    Query(query): Query<WorkoutsQuery>,
) -> Result<Json<WorkoutsResponse>, AppError> {
    let dates = match query.week.as_deref() {
        Some(week) => {
            let start = parse_week_id(week)
                .ok_or_else(|| AppError::bad_request("week must look like YYYY-WW"))?;
            week_dates(start)
        }
        None => state.window.dates(today()),
    };

    let data = state.data.lock().await;
    Ok(Json(WorkoutsResponse {
        workouts: data.workouts.snapshot(&dates),
        dates,
    }))
}

pub async fn toggle_workout(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<Ack>, AppError> {
    let date = parse_request_date(&payload.date)?;
    apply_toggle(&state, date, payload.message.trim()).await?;
    Ok(Json(Ack { success: true }))
}

pub async fn toggle_form(
    State(state): State<AppState>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    apply_toggle(&state, today(), form.message.trim()).await?;
    Ok(Redirect::to("/"))
}

pub async fn save_message(
    State(state): State<AppState>,
    Json(payload): Json<SaveMessageRequest>,
) -> Result<Json<Ack>, AppError> {
    let date = parse_request_date(&payload.date)?;
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let mut record = next.workouts.get(date).cloned().unwrap_or_default();
    record.message = payload.message.trim().to_string();
    next.workouts.set(date, record);

    persist_data(&state.data_path, &next).await?;
    *data = next;
    Ok(Json(Ack { success: true }))
}

pub async fn get_prize(State(state): State<AppState>) -> Result<Json<PrizeDetails>, AppError> {
    state
        .prizes
        .prize_for(today())
        .map(|prize| Json(prize.details()))
        .ok_or_else(|| AppError::not_found("no prize scheduled for this week"))
}

async fn apply_toggle(state: &AppState, date: NaiveDate, message: &str) -> Result<WorkoutRecord, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    next.workouts.toggle_completed(date, message);
    let updated = next.workouts.get(date).cloned().unwrap_or_default();

    persist_data(&state.data_path, &next).await?;
    *data = next;

    info!(%date, completed = updated.completed, "workout toggled");
    Ok(updated)
}

fn parse_request_date(value: &str) -> Result<NaiveDate, AppError> {
    parse_date_key(value).ok_or_else(|| AppError::bad_request("date must look like YYYY-MM-DD"))
}
