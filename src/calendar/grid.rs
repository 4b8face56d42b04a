use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use super::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_focus_month: bool,
    pub is_today: bool,
}

/// Every day from the first grid cell to the last, inclusive. The length is
/// always a multiple of 7.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub week_start: Weekday,
    days: Vec<CalendarDay>,
}

impl MonthGrid {
    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalendarDay> + '_ {
        self.days.iter()
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay]> + '_ {
        self.days.chunks(7)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first(&self) -> NaiveDate {
        self.days[0].date
    }

    pub fn last(&self) -> NaiveDate {
        self.days[self.days.len() - 1].date
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Walks back from `date` to the nearest `week_start`, staying put if aligned.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = days_since(date.weekday(), week_start);
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn end_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let week_end = week_start.pred();
    let offset = days_since(week_end, date.weekday());
    date.checked_add_days(Days::new(offset)).unwrap_or(date)
}

fn days_since(day: Weekday, anchor: Weekday) -> u64 {
    let day = day.num_days_from_monday() as i64;
    let anchor = anchor.num_days_from_monday() as i64;
    (day - anchor).rem_euclid(7) as u64
}

pub fn build_month_grid(reference: NaiveDate, week_start: Weekday, today: NaiveDate) -> MonthGrid {
    let month_start = first_of_month(reference);
    let month_end = last_of_month(reference);
    let grid_start = start_of_week(month_start, week_start);
    let grid_end = end_of_week(month_end, week_start);

    let days = grid_start
        .iter_days()
        .take_while(|date| *date <= grid_end)
        .map(|date| CalendarDay {
            date,
            in_focus_month: date.month() == reference.month() && date.year() == reference.year(),
            is_today: date == today,
        })
        .collect();

    MonthGrid {
        year: reference.year(),
        month: reference.month(),
        week_start,
        days,
    }
}

pub fn weekday_headers(week_start: Weekday, locale: Locale) -> Vec<&'static str> {
    std::iter::successors(Some(week_start), |day| Some(day.succ()))
        .take(7)
        .map(|day| locale.weekday_short(day))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn february_2025_sunday_start_spans_five_weeks() {
        let grid = build_month_grid(date(2025, 2, 15), Weekday::Sun, date(2000, 1, 1));

        assert_eq!(grid.first(), date(2025, 1, 26));
        assert_eq!(grid.last(), date(2025, 3, 1));
        assert_eq!(grid.len(), 35);
        assert_eq!(grid.first().weekday(), Weekday::Sun);
        assert_eq!(grid.last().weekday(), Weekday::Sat);
    }

    #[test]
    fn monday_start_walks_back_from_sunday_first() {
        let grid = build_month_grid(date(2026, 2, 10), Weekday::Mon, date(2000, 1, 1));

        assert_eq!(grid.first(), date(2026, 1, 26));
        assert_eq!(grid.last(), date(2026, 3, 1));
        assert_eq!(grid.len(), 35);
    }

    #[test]
    fn february_2015_sunday_start_is_exactly_four_weeks() {
        let grid = build_month_grid(date(2015, 2, 1), Weekday::Sun, date(2000, 1, 1));

        assert_eq!(grid.first(), date(2015, 2, 1));
        assert_eq!(grid.last(), date(2015, 2, 28));
        assert_eq!(grid.len(), 28);
        assert!(grid.iter().all(|day| day.in_focus_month));
    }

    #[test]
    fn long_month_can_need_six_weeks() {
        let grid = build_month_grid(date(2025, 3, 1), Weekday::Sun, date(2000, 1, 1));

        assert_eq!(grid.first(), date(2025, 2, 23));
        assert_eq!(grid.last(), date(2025, 4, 5));
        assert_eq!(grid.len(), 42);
    }

    #[test]
    fn adjacent_month_days_are_out_of_focus() {
        let grid = build_month_grid(date(2025, 2, 15), Weekday::Sun, date(2000, 1, 1));

        assert!(!grid.days()[0].in_focus_month);
        assert!(grid.days()[6].in_focus_month);
        assert!(!grid.days()[34].in_focus_month);
    }

    #[test]
    fn today_is_flagged_once() {
        let today = date(2025, 2, 14);
        let grid = build_month_grid(date(2025, 2, 1), Weekday::Sun, today);

        let flagged: Vec<_> = grid.iter().filter(|day| day.is_today).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].date, today);
    }

    #[test]
    fn weeks_are_chunks_of_seven() {
        let grid = build_month_grid(date(2025, 2, 15), Weekday::Mon, date(2000, 1, 1));

        assert!(grid.weeks().all(|week| week.len() == 7));
        assert!(grid.weeks().all(|week| week[0].date.weekday() == Weekday::Mon));
    }

    #[test]
    fn saturday_week_start_aligned_month_has_no_padding() {
        let grid = build_month_grid(date(2025, 2, 15), Weekday::Sat, date(2000, 1, 1));

        assert_eq!(grid.first(), date(2025, 2, 1));
        assert_eq!(grid.last(), date(2025, 2, 28));
        assert_eq!(grid.len(), 28);
    }

    #[test]
    fn headers_rotate_with_week_start() {
        assert_eq!(
            weekday_headers(Weekday::Sun, Locale::EnUs),
            vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
        assert_eq!(weekday_headers(Weekday::Mon, Locale::Fr)[0], "lun.");
    }

    #[test]
    fn last_of_month_handles_december() {
        assert_eq!(last_of_month(date(2025, 12, 5)), date(2025, 12, 31));
        assert_eq!(last_of_month(date(2024, 2, 5)), date(2024, 2, 29));
    }
}
