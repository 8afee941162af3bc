use chrono::{Local, NaiveDate};

/// Source of "today" for everything that addresses the current entry.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn today_key(&self) -> String {
        date_key(self.today())
    }
}

/// Local wall-clock date, read again on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Accepts only canonical zero-padded keys, so `2025-1-5` is rejected.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
    (date_key(date) == key).then_some(date)
}
