pub mod countdown;
pub mod definition;
pub mod hijri;
pub mod islamic;
pub mod materialize;
pub mod nager;

pub use countdown::{days_until, next_holiday};
pub use definition::{HolidayDefinition, HolidayKind, MaterializedHoliday, RecurrenceRule};
pub use hijri::{HijriDate, LunarCalendar, LunarError, TabularHijri, format_hijri};
pub use islamic::islamic_holidays;
pub use materialize::{MaterializeError, MaterializeOptions, materialize};
pub use nager::{NagerClient, NagerError, PublicHolidaySource};
