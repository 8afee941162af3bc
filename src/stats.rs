use crate::models::{
    CaughtFlag, ComplaintGratitudePoint, CompletionPoint, DailyEntry, EntryCollection, HistoryPoint,
    SLOTS, StatsResponse,
};

pub const DEFAULT_WINDOW: usize = 7;

/// Trackable free-text fields: three gratitude slots and three night prompts.
const TRACKED_FIELDS: usize = SLOTS * 2;

/// Up to `n` most recent entries, newest first.
pub fn recent_history(entries: &EntryCollection, n: usize) -> Vec<HistoryPoint> {
    entries
        .iter()
        .rev()
        .take(n)
        .map(|(date, entry)| HistoryPoint {
            date: date.clone(),
            gratitude_count: entry.morning.filled_count() as u8,
            caught_count: entry.midday.caught_count() as u8,
            night_count: entry.night.filled_count() as u8,
        })
        .collect()
}

pub fn daily_completion_series(entries: &EntryCollection, n: usize) -> Vec<CompletionPoint> {
    chart_window(entries, n)
        .map(|(date, entry)| {
            let filled = entry.morning.filled_count() + entry.night.filled_count();
            CompletionPoint {
                date: date.clone(),
                percent: percent(filled, TRACKED_FIELDS),
            }
        })
        .collect()
}

/// Complaint is a per-day yes/no signal scaled to 0 or 100 for charting.
pub fn complaint_and_gratitude_series(
    entries: &EntryCollection,
    n: usize,
) -> Vec<ComplaintGratitudePoint> {
    chart_window(entries, n)
        .map(|(date, entry)| ComplaintGratitudePoint {
            date: date.clone(),
            complaint_percent: if entry.midday.is_caught(CaughtFlag::Complaining) {
                100
            } else {
                0
            },
            gratitude_percent: percent(entry.morning.filled_count(), SLOTS),
        })
        .collect()
}

/// Dates with anything written or ticked, oldest first.
pub fn filled_dates(entries: &EntryCollection) -> Vec<String> {
    entries
        .iter()
        .filter(|(_, entry)| !entry.is_blank())
        .map(|(date, _)| date.clone())
        .collect()
}

pub fn build_stats(entries: &EntryCollection, n: usize) -> StatsResponse {
    StatsResponse {
        completion: daily_completion_series(entries, n),
        complaint_gratitude: complaint_and_gratitude_series(entries, n),
    }
}

/// The last `n` entries by date, oldest first.
fn chart_window(
    entries: &EntryCollection,
    n: usize,
) -> impl Iterator<Item = (&String, &DailyEntry)> {
    entries.iter().skip(entries.len().saturating_sub(n))
}

/// `round(100 * part / whole)` with halves rounded up.
fn percent(part: usize, whole: usize) -> u8 {
    let part = part.min(whole);
    ((200 * part + whole) / (2 * whole)) as u8
}
