use crate::dates::parse_date_key;
use crate::errors::AppError;
use crate::models::{
    CalendarResponse, DailyEntry, EntryCollection, EntryResponse, HistoryPoint, Midday, Morning,
    Night, SaveResponse, Section, StatsResponse, WindowQuery,
};
use crate::state::AppState;
use crate::stats::{DEFAULT_WINDOW, build_stats, filled_dates, recent_history};
use axum::{
    Json,
    extract::{Path, Query, State},
};

pub async fn get_today(State(state): State<AppState>) -> Json<EntryResponse> {
    let date = state.clock.today_key();
    let entries = state.entries.lock().await;
    let entry = entries.get(&date).cloned().unwrap_or_default();

    Json(EntryResponse { date, entry })
}

pub async fn put_today(
    State(state): State<AppState>,
    Json(entry): Json<DailyEntry>,
) -> Json<SaveResponse> {
    let date = state.clock.today_key();
    Json(apply_save(&state, date, |_| entry).await)
}

pub async fn put_morning(
    State(state): State<AppState>,
    Json(morning): Json<Morning>,
) -> Json<SaveResponse> {
    save_today_section(&state, Section::Morning(morning)).await
}

pub async fn put_midday(
    State(state): State<AppState>,
    Json(midday): Json<Midday>,
) -> Json<SaveResponse> {
    save_today_section(&state, Section::Midday(midday)).await
}

pub async fn put_night(
    State(state): State<AppState>,
    Json(night): Json<Night>,
) -> Json<SaveResponse> {
    save_today_section(&state, Section::Night(night)).await
}

pub async fn list_entries(State(state): State<AppState>) -> Json<EntryCollection> {
    let entries = state.entries.lock().await;
    Json(entries.clone())
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<EntryResponse>, AppError> {
    let date = checked_date(date)?;
    let entries = state.entries.lock().await;
    let entry = entries
        .get(&date)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("no entry for {date}")))?;

    Ok(Json(EntryResponse { date, entry }))
}

pub async fn put_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(entry): Json<DailyEntry>,
) -> Result<Json<SaveResponse>, AppError> {
    let date = checked_date(date)?;
    Ok(Json(apply_save(&state, date, |_| entry).await))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<SaveResponse>, AppError> {
    let date = checked_date(date)?;
    let mut entries = state.entries.lock().await;
    let saved = state.store.remove(&entries, &date).await;

    let response = SaveResponse {
        date,
        entry: None,
        persisted: saved.is_persisted(),
        warning: saved.warning(),
    };
    *entries = saved.entries;
    Ok(Json(response))
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Json<Vec<HistoryPoint>> {
    let entries = state.entries.lock().await;
    Json(recent_history(&entries, query.limit.unwrap_or(DEFAULT_WINDOW)))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Json<StatsResponse> {
    let entries = state.entries.lock().await;
    Json(build_stats(&entries, query.limit.unwrap_or(DEFAULT_WINDOW)))
}

pub async fn get_calendar(State(state): State<AppState>) -> Json<CalendarResponse> {
    let entries = state.entries.lock().await;
    Json(CalendarResponse {
        filled_dates: filled_dates(&entries),
    })
}

async fn save_today_section(state: &AppState, section: Section) -> Json<SaveResponse> {
    let date = state.clock.today_key();
    Json(apply_save(state, date, |current| current.with_section(section)).await)
}

/// Builds the new entry from the current one (or a blank day) and writes it.
/// The snapshot is replaced even when persisting failed.
async fn apply_save(
    state: &AppState,
    date: String,
    update: impl FnOnce(DailyEntry) -> DailyEntry + Send,
) -> SaveResponse {
    let mut entries = state.entries.lock().await;
    let entry = update(entries.get(&date).cloned().unwrap_or_default());
    let saved = state.store.upsert(&entries, &date, entry.clone()).await;

    let response = SaveResponse {
        date,
        entry: Some(entry),
        persisted: saved.is_persisted(),
        warning: saved.warning(),
    };
    *entries = saved.entries;
    response
}

fn checked_date(date: String) -> Result<String, AppError> {
    match parse_date_key(&date) {
        Some(_) => Ok(date),
        None => Err(AppError::bad_request("date must be formatted YYYY-MM-DD")),
    }
}
