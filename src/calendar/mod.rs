pub mod event;
pub mod grid;
pub mod input;
pub mod locale;
pub mod todo;

pub use event::{Event, EventCategory, Reminder, ReminderMethod};
pub use grid::{CalendarDay, MonthGrid, build_month_grid, weekday_headers};
pub use input::{Draft, EventDraft, NewEvent, NewTodo, TodoDraft, ValidDraft, ValidationError};
pub use locale::{Locale, LocaleError};
pub use todo::Todo;
