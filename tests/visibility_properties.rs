use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use taqwim::calendar::{EventCategory, NewEvent};
use taqwim::storage::Store;
use taqwim::visibility::{Caller, Owner, UserId, visible_predicate};

const USERS: [&str; 3] = ["user-1", "user-2", "user-42"];

fn owner_strategy() -> impl Strategy<Value = Owner> {
    prop_oneof![
        Just(Owner::Public),
        (0..USERS.len()).prop_map(|i| Owner::User(UserId::new(USERS[i]))),
    ]
}

fn callers() -> Vec<Caller> {
    let mut callers = vec![Caller::Anonymous];
    callers.extend(USERS.iter().map(|id| Caller::User(UserId::new(*id))));
    callers
}

fn event(index: usize) -> NewEvent {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap() + Duration::hours(index as i64);
    NewEvent {
        title: format!("event {index}"),
        description: None,
        start,
        end: start + Duration::minutes(30),
        all_day: false,
        location: None,
        category: EventCategory::Personal,
        reminders: vec![],
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sql_filter_agrees_with_in_memory_predicate(owners in prop::collection::vec(owner_strategy(), 0..12)) {
        let mut store = Store::open_in_memory().unwrap();
        let public: Vec<NewEvent> = owners
            .iter()
            .enumerate()
            .filter(|(_, owner)| **owner == Owner::Public)
            .map(|(i, _)| event(i))
            .collect();
        store.replace_public_events("fixture", &public).unwrap();

        let mut all = Vec::new();
        for (i, owner) in owners.iter().enumerate() {
            if let Owner::User(id) = owner {
                all.push(store.create_event(&Caller::User(id.clone()), &event(i)).unwrap());
            }
        }
        let range = (
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap(),
        );
        all.extend(
            store
                .get_events(&Caller::Anonymous, range.0, range.1)
                .unwrap(),
        );

        for caller in callers() {
            let mut expected: Vec<String> = all
                .iter()
                .filter(|e| visible_predicate(&caller)(*e))
                .map(|e| e.title.clone())
                .collect();
            let mut actual: Vec<String> = store
                .get_events(&caller, range.0, range.1)
                .unwrap()
                .into_iter()
                .map(|e| e.title)
                .collect();
            expected.sort();
            actual.sort();
            prop_assert_eq!(actual, expected);
        }
    }
}
