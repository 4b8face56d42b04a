use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;

use taqwim::calendar::{EventCategory, NewEvent};
use taqwim::holidays::{
    HolidayKind, MaterializeOptions, TabularHijri, days_until, islamic_holidays, materialize,
};
use taqwim::seasons::{SEASON_SOURCE, SeasonTable, season_start_events};
use taqwim::storage::{Store, StoreError};
use taqwim::visibility::{Caller, Owner, UserId};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn user(id: &str) -> Caller {
    Caller::User(UserId::new(id))
}

fn meeting(title: &str, day: u32) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: None,
        start: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
        all_day: false,
        location: None,
        category: EventCategory::Family,
        reminders: vec![],
    }
}

#[test]
fn public_rows_are_shared_and_private_rows_are_not() {
    let mut store = Store::open_in_memory().unwrap();
    store
        .replace_public_events(SEASON_SOURCE, &season_start_events(&SeasonTable::approximate([2025])))
        .unwrap();
    store.create_event(&user("user-42"), &meeting("Standup", 10)).unwrap();
    store.create_event(&user("user-7"), &meeting("Dentist", 11)).unwrap();

    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();

    let anonymous = store.get_events(&Caller::Anonymous, start, end).unwrap();
    assert_eq!(anonymous.len(), 4);
    assert!(anonymous.iter().all(|e| e.owner == Owner::Public));

    let titles: Vec<String> = store
        .get_events(&user("user-42"), start, end)
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(
        titles,
        vec!["Winter Starts", "Autumn Starts", "Summer Starts", "Spring Starts", "Standup"]
    );
}

#[test]
fn anonymous_callers_cannot_write() {
    let store = Store::open_in_memory().unwrap();

    let result = store.create_event(&Caller::Anonymous, &meeting("Standup", 10));

    assert!(matches!(result, Err(StoreError::Unauthenticated)));
}

#[test]
fn seeding_islamic_holidays_twice_leaves_the_same_rows() {
    let mut store = Store::open_in_memory().unwrap();
    let holidays = materialize(
        &islamic_holidays(),
        2025,
        2035,
        &MaterializeOptions::default(),
        &TabularHijri,
    )
    .unwrap();

    store.replace_holidays(&HolidayKind::Religious, &holidays).unwrap();
    let first = store.get_holidays("MA", None).unwrap();
    store.replace_holidays(&HolidayKind::Religious, &holidays).unwrap();
    let second = store.get_holidays("MA", None).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), holidays.len());
    assert!(first.iter().all(|h| h.date >= date(2025, 1, 1) && h.date <= date(2035, 12, 31)));
}

#[test]
fn next_holiday_after_ramadan_starts() {
    let mut store = Store::open_in_memory().unwrap();
    let holidays = materialize(
        &islamic_holidays(),
        2025,
        2025,
        &MaterializeOptions::default(),
        &TabularHijri,
    )
    .unwrap();
    store.replace_holidays(&HolidayKind::Religious, &holidays).unwrap();

    let ramadan = store
        .get_holidays("MA", Some(2025))
        .unwrap()
        .into_iter()
        .find(|h| h.name == "Start of Ramadan")
        .unwrap();
    assert_eq!(ramadan.date, date(2025, 3, 1));

    let next = store.get_next_holiday("MA", date(2025, 2, 20)).unwrap().unwrap();
    assert_eq!(next.name, "Start of Ramadan");
    assert_eq!(days_until(date(2025, 2, 20), next.date), 9);

    assert!(store.get_next_holiday("FR", date(2025, 2, 20)).unwrap().is_none());
}
