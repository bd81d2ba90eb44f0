use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Which dates the widget shows around today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    /// Monday through Sunday of today's ISO week.
    #[default]
    Week,
    /// The seven days ending today.
    Rolling,
}

impl DateWindow {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Some(Self::Week),
            "rolling" => Some(Self::Rolling),
            _ => None,
        }
    }

    pub fn dates(self, today: NaiveDate) -> Vec<NaiveDate> {
        match self {
            Self::Week => week_dates(week_start(today)),
            Self::Rolling => rolling_window(today, 7),
        }
    }
}

/// Projection of one calendar date as shown in a day-box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDate {
    pub iso_date: NaiveDate,
    pub weekday_label: &'static str,
    pub day_of_month: u32,
    pub is_today: bool,
}

impl DisplayDate {
    pub fn new(date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            iso_date: date,
            weekday_label: weekday_label(date),
            day_of_month: date.day(),
            is_today: date == today,
        }
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_monday() as usize]
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn week_dates(start: NaiveDate) -> Vec<NaiveDate> {
    (0..7).map(|offset| start + Duration::days(offset)).collect()
}

pub fn rolling_window(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days as i64)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// ISO week identifier in the `YYYY-WW` form the prize catalogue and the
/// `week` query parameter use.
pub fn week_id(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-{:02}", iso.year(), iso.week())
}

/// Parses `YYYY-WW` (a `W` prefix on the week is tolerated) into the Monday
/// that starts that ISO week.
pub fn parse_week_id(value: &str) -> Option<NaiveDate> {
    let (year, week) = value.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let week = week.strip_prefix('W').unwrap_or(week);
    let week: u32 = week.parse().ok()?;
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}
