use chrono::{Datelike, NaiveDate, Weekday};
use proptest::prelude::*;

use taqwim::calendar::build_month_grid;

fn weekday_strategy() -> impl Strategy<Value = Weekday> {
    prop_oneof![
        Just(Weekday::Sun),
        Just(Weekday::Mon),
        Just(Weekday::Tue),
        Just(Weekday::Wed),
        Just(Weekday::Thu),
        Just(Weekday::Fri),
        Just(Weekday::Sat),
    ]
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2200, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #[test]
    fn grid_is_whole_weeks_aligned_to_week_start(reference in date_strategy(), week_start in weekday_strategy()) {
        let grid = build_month_grid(reference, week_start, reference);

        prop_assert_eq!(grid.len() % 7, 0);
        prop_assert!(grid.len() >= 28 && grid.len() <= 42);
        prop_assert_eq!(grid.first().weekday(), week_start);
        prop_assert_eq!(grid.last().weekday(), week_start.pred());
    }

    #[test]
    fn grid_is_contiguous_and_covers_the_month(reference in date_strategy(), week_start in weekday_strategy()) {
        let grid = build_month_grid(reference, week_start, reference);
        let days = grid.days();

        for pair in days.windows(2) {
            prop_assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
        }

        let in_month: Vec<_> = days.iter().filter(|d| d.in_focus_month).collect();
        prop_assert_eq!(in_month.first().map(|d| d.date.day()), Some(1));
        prop_assert!(in_month.iter().all(|d| d.date.month() == reference.month()));
        prop_assert!(days.iter().filter(|d| !d.in_focus_month).all(|d| d.date.month() != reference.month()));
        prop_assert_eq!(days.iter().filter(|d| d.is_today).count(), 1);
    }

    #[test]
    fn any_day_of_a_month_gives_the_same_grid(reference in date_strategy(), other_day in 1u32..=28, week_start in weekday_strategy()) {
        let today = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let other = reference.with_day(other_day).unwrap();

        prop_assert_eq!(
            build_month_grid(reference, week_start, today),
            build_month_grid(other, week_start, today)
        );
    }
}
