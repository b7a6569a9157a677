//! Reporting-week arithmetic. Pure functions over calendar dates in a target zone.
//!
//! Weeks start on Monday (ISO). Week-of-month ordinals are Monday-anchored: a week
//! belongs to the month of its Monday, even when most of its days fall in the next
//! month (e.g. Mon 2025-06-30 starts week 5 of June, not week 1 of July).

use crate::domain::{ReportingWeek, WeekLabel};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Korean short weekday names, Monday first.
const WEEKDAYS_KO: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

/// Compute the Monday-to-Sunday week containing `now` as seen in `tz`.
pub fn compute_reporting_week(now: DateTime<Utc>, tz: Tz) -> ReportingWeek {
    let today = now.with_timezone(&tz).date_naive();
    // Monday = 1 .. Sunday = 7
    let weekday = today.weekday().number_from_monday() as i64;
    let start = today - TimeDelta::days(weekday - 1);
    ReportingWeek {
        start,
        end: start + TimeDelta::days(6),
    }
}

/// Derive the month / week-of-month label for `week`.
pub fn compute_week_label(week: &ReportingWeek) -> WeekLabel {
    let month = week.start.month();
    let first_of_month = week.start - TimeDelta::days(week.start.day0() as i64);
    let first_weekday = first_of_month.weekday().number_from_monday() as i64;
    let offset = if first_weekday == 1 {
        0
    } else {
        8 - first_weekday
    };
    let mut monday = first_of_month + TimeDelta::days(offset);

    let mut week_of_month = 1;
    while monday < week.start {
        monday += TimeDelta::days(7);
        week_of_month += 1;
    }

    WeekLabel {
        month,
        week_of_month,
        range_text: format!(
            "{} ~ {}",
            week.start.format("%Y. %m. %d."),
            week.end.format("%Y. %m. %d.")
        ),
    }
}

/// `YYYY. MM. DD. (요일)` for a single content day.
pub fn format_day_label(date: NaiveDate) -> String {
    let weekday = WEEKDAYS_KO[date.weekday().num_days_from_monday() as usize];
    format!("{} ({})", date.format("%Y. %m. %d."), weekday)
}

impl ReportingWeek {
    /// Half-open UTC instant range `[start 00:00, end + 1 day 00:00)` in `tz`.
    ///
    /// Equivalent to an inclusive calendar-date range over local dates, and stays
    /// correct when the week crosses a DST change.
    pub fn utc_bounds(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            local_midnight_utc(tz, self.start),
            local_midnight_utc(tz, self.end + TimeDelta::days(1)),
        )
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn local_midnight_utc(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump: fall back to the zone's offset at that instant.
        None => {
            let offset = tz.offset_from_utc_datetime(&naive).fix();
            Utc.from_utc_datetime(&(naive - TimeDelta::seconds(offset.local_minus_utc() as i64)))
        }
    }
}
