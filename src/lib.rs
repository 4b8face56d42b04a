pub mod astro;
pub mod calendar;
pub mod holidays;
pub mod seasons;
pub mod storage;
pub mod visibility;

pub use calendar::{CalendarDay, Event, Locale, MonthGrid, Todo, build_month_grid};
pub use holidays::{HolidayDefinition, MaterializedHoliday, RecurrenceRule, TabularHijri, materialize};
pub use visibility::{Caller, Owner, OwnedRecord, UserId, visible_predicate};
