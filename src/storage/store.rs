use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult, Row, params};
use std::path::Path;
use thiserror::Error;

use crate::astro::{AstroHouse, NewAstroHouse};
use crate::calendar::input::{NewEvent, NewTodo};
use crate::calendar::{Event, Todo};
use crate::holidays::{HolidayKind, MaterializedHoliday};
use crate::visibility::{Caller, Owner, UserId};

pub const DEFAULT_UPCOMING_LIMIT: u32 = 3;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Sign in required")]
    Unauthenticated,
    /// Deliberately covers both a missing row and a row owned by someone else.
    #[error("Record {0} not found or you don't have permission to modify it")]
    NotFoundOrForbidden(i64),
}

pub struct Store {
    conn: Connection,
}

const EVENT_COLUMNS: &str = "id, title, description, start_time, end_time, all_day, location, \
     category, reminders, user_id, source, created_at, updated_at";

const TODO_COLUMNS: &str = "id, title, description, is_done, date, user_id, created_at, updated_at";

const HOLIDAY_COLUMNS: &str = "name, local_name, date, country_code, kind, description, hijri_date";

const ASTRO_COLUMNS: &str = "id, season, common_name, english_name, start_date, star_name, star_days, \
     zodiac_signs, zodiac_days, notes";

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self::new(Connection::open_in_memory()?);
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                all_day INTEGER NOT NULL DEFAULT 0,
                location TEXT,
                category TEXT NOT NULL DEFAULT 'personal',
                reminders TEXT NOT NULL DEFAULT '[]',
                user_id TEXT,
                source TEXT NOT NULL DEFAULT 'local',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS events_start_time_idx ON events (start_time);
            CREATE INDEX IF NOT EXISTS events_user_id_idx ON events (user_id);

            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                is_done INTEGER NOT NULL DEFAULT 0,
                date TEXT,
                user_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS todos_date_idx ON todos (date);
            CREATE INDEX IF NOT EXISTS todos_user_id_idx ON todos (user_id);

            CREATE TABLE IF NOT EXISTS holidays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                local_name TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                country_code TEXT NOT NULL,
                kind TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                hijri_date TEXT,
                UNIQUE (name, date, country_code)
            );
            CREATE INDEX IF NOT EXISTS holidays_country_date_idx ON holidays (country_code, date);

            CREATE TABLE IF NOT EXISTS astro_houses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                season TEXT NOT NULL,
                common_name TEXT NOT NULL,
                english_name TEXT,
                start_date TEXT NOT NULL,
                star_name TEXT NOT NULL,
                star_days INTEGER NOT NULL,
                zodiac_signs TEXT NOT NULL DEFAULT '[]',
                zodiac_days TEXT NOT NULL DEFAULT '[]',
                notes TEXT
            );",
        )?;
        Ok(())
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }

    // Events

    /// Visible events starting within `[start, end]`, latest first.
    pub fn get_events(
        &self,
        caller: &Caller,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE start_time >= ?1 AND start_time <= ?2 AND {}
             ORDER BY start_time DESC, id DESC",
            Caller::sql_filter("user_id", 3)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let events = stmt
            .query_map(params![ts(start), ts(end), caller.sql_param()], event_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        tracing::debug!("get_events returned {} rows", events.len());
        Ok(events)
    }

    /// Visible events starting at or after `now`, soonest first.
    pub fn get_upcoming_events(
        &self,
        caller: &Caller,
        now: DateTime<Utc>,
        limit: Option<u32>,
    ) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE start_time >= ?1 AND {}
             ORDER BY start_time ASC, id ASC
             LIMIT ?3",
            Caller::sql_filter("user_id", 2)
        );
        let limit = limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);
        let mut stmt = self.conn.prepare(&sql)?;
        let events = stmt
            .query_map(params![ts(now), caller.sql_param(), limit], event_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(events)
    }

    pub fn create_event(&self, caller: &Caller, event: &NewEvent) -> Result<Event, StoreError> {
        let user = require_user(caller)?;
        let id = self.insert_event(event, Some(user.as_str()), "local")?;
        tracing::info!("Created event {} for {}", id, user);
        self.load_event(id)?.ok_or(StoreError::NotFoundOrForbidden(id))
    }

    pub fn update_event(&self, caller: &Caller, id: i64, event: &NewEvent) -> Result<Event, StoreError> {
        let user = require_user(caller)?;
        let changed = self.conn.execute(
            "UPDATE events SET title = ?1, description = ?2, start_time = ?3, end_time = ?4,
                all_day = ?5, location = ?6, category = ?7, reminders = ?8, updated_at = ?9
             WHERE id = ?10 AND user_id = ?11",
            params![
                event.title,
                event.description,
                ts(event.start),
                ts(event.end),
                event.all_day,
                event.location,
                event.category.as_str(),
                serde_json::to_string(&event.reminders)?,
                ts(Utc::now()),
                id,
                user.as_str(),
            ],
        )?;

        if changed == 0 {
            tracing::warn!("Update of event {} by {} rejected", id, user);
            return Err(StoreError::NotFoundOrForbidden(id));
        }
        self.load_event(id)?.ok_or(StoreError::NotFoundOrForbidden(id))
    }

    pub fn delete_event(&self, caller: &Caller, id: i64) -> Result<(), StoreError> {
        let user = require_user(caller)?;
        let changed = self.conn.execute(
            "DELETE FROM events WHERE id = ?1 AND user_id = ?2",
            params![id, user.as_str()],
        )?;

        if changed == 0 {
            tracing::warn!("Delete of event {} by {} rejected", id, user);
            return Err(StoreError::NotFoundOrForbidden(id));
        }
        tracing::info!("Deleted event {}", id);
        Ok(())
    }

    /// Seeding path: swaps every public event carrying `source` for `events`.
    pub fn replace_public_events(&mut self, source: &str, events: &[NewEvent]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM events WHERE source = ?1 AND user_id IS NULL",
            [source],
        )?;
        for event in events {
            insert_event_with(&tx, event, None, source)?;
        }
        tx.commit()?;

        tracing::info!("Replaced {} public '{}' events with {}", removed, source, events.len());
        Ok(events.len())
    }

    fn insert_event(&self, event: &NewEvent, user_id: Option<&str>, source: &str) -> Result<i64, StoreError> {
        insert_event_with(&self.conn, event, user_id, source)
    }

    fn load_event(&self, id: i64) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], event_from_row).optional()?)
    }

    // Todos

    /// Visible todos, newest first. With a range, only todos dated inside it.
    pub fn get_todos(
        &self,
        caller: &Caller,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Todo>, StoreError> {
        let todos = match range {
            Some((start, end)) => {
                let sql = format!(
                    "SELECT {TODO_COLUMNS} FROM todos
                     WHERE date >= ?1 AND date <= ?2 AND {}
                     ORDER BY created_at DESC, id DESC",
                    Caller::sql_filter("user_id", 3)
                );
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map(params![ts(start), ts(end), caller.sql_param()], todo_from_row)?
                    .collect::<SqliteResult<Vec<_>>>()?
            }
            None => {
                let sql = format!(
                    "SELECT {TODO_COLUMNS} FROM todos WHERE {} ORDER BY created_at DESC, id DESC",
                    Caller::sql_filter("user_id", 1)
                );
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map(params![caller.sql_param()], todo_from_row)?
                    .collect::<SqliteResult<Vec<_>>>()?
            }
        };
        Ok(todos)
    }

    pub fn create_todo(&self, caller: &Caller, todo: &NewTodo) -> Result<Todo, StoreError> {
        let user = require_user(caller)?;
        let now = ts(Utc::now());
        self.conn.execute(
            "INSERT INTO todos (title, description, is_done, date, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                todo.title,
                todo.description,
                todo.is_done,
                todo.date.map(ts),
                user.as_str(),
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!("Created todo {} for {}", id, user);
        self.load_todo(id)?.ok_or(StoreError::NotFoundOrForbidden(id))
    }

    pub fn update_todo(&self, caller: &Caller, id: i64, todo: &NewTodo) -> Result<Todo, StoreError> {
        let user = require_user(caller)?;
        let changed = self.conn.execute(
            "UPDATE todos SET title = ?1, description = ?2, is_done = ?3, date = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                todo.title,
                todo.description,
                todo.is_done,
                todo.date.map(ts),
                ts(Utc::now()),
                id,
                user.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFoundOrForbidden(id));
        }
        self.load_todo(id)?.ok_or(StoreError::NotFoundOrForbidden(id))
    }

    pub fn set_todo_done(&self, caller: &Caller, id: i64, done: bool) -> Result<Todo, StoreError> {
        let user = require_user(caller)?;
        let changed = self.conn.execute(
            "UPDATE todos SET is_done = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            params![done, ts(Utc::now()), id, user.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFoundOrForbidden(id));
        }
        self.load_todo(id)?.ok_or(StoreError::NotFoundOrForbidden(id))
    }

    pub fn delete_todo(&self, caller: &Caller, id: i64) -> Result<(), StoreError> {
        let user = require_user(caller)?;
        let changed = self.conn.execute(
            "DELETE FROM todos WHERE id = ?1 AND user_id = ?2",
            params![id, user.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFoundOrForbidden(id));
        }
        Ok(())
    }

    fn load_todo(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], todo_from_row).optional()?)
    }

    // Holidays

    /// Deletes every holiday tagged `kind`, then inserts `holidays`, in one
    /// transaction. Running it twice with the same input leaves the same rows.
    pub fn replace_holidays(
        &mut self,
        kind: &HolidayKind,
        holidays: &[MaterializedHoliday],
    ) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM holidays WHERE kind = ?1", [kind.as_str()])?;
        let inserted = insert_holidays_with(&tx, holidays)?;
        tx.commit()?;

        tracing::info!("Replaced {} '{}' holidays with {}", removed, kind, inserted);
        Ok(inserted)
    }

    /// Inserts `holidays`, skipping any already stored for the same name,
    /// date and country. Returns how many rows were new.
    pub fn insert_holidays(&mut self, holidays: &[MaterializedHoliday]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let inserted = insert_holidays_with(&tx, holidays)?;
        tx.commit()?;

        tracing::info!("Inserted {} of {} holidays", inserted, holidays.len());
        Ok(inserted)
    }

    pub fn get_holidays(&self, country_code: &str, year: Option<i32>) -> Result<Vec<MaterializedHoliday>, StoreError> {
        let holidays = match year {
            Some(year) => {
                let sql = format!(
                    "SELECT {HOLIDAY_COLUMNS} FROM holidays
                     WHERE country_code = ?1 AND date >= ?2 AND date <= ?3
                     ORDER BY date ASC, id ASC"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map(
                    params![country_code, format!("{year:04}-01-01"), format!("{year:04}-12-31")],
                    holiday_from_row,
                )?
                .collect::<SqliteResult<Vec<_>>>()?
            }
            None => {
                let sql = format!(
                    "SELECT {HOLIDAY_COLUMNS} FROM holidays WHERE country_code = ?1 ORDER BY date ASC, id ASC"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map([country_code], holiday_from_row)?
                    .collect::<SqliteResult<Vec<_>>>()?
            }
        };
        Ok(holidays)
    }

    pub fn get_next_holiday(
        &self,
        country_code: &str,
        today: NaiveDate,
    ) -> Result<Option<MaterializedHoliday>, StoreError> {
        let sql = format!(
            "SELECT {HOLIDAY_COLUMNS} FROM holidays
             WHERE country_code = ?1 AND date >= ?2
             ORDER BY date ASC, id ASC
             LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![country_code, day(today)], holiday_from_row)
            .optional()?)
    }

    // Astronomical houses

    /// Swaps the whole table for `houses`, keeping their order as id order.
    pub fn replace_astro_houses(&mut self, houses: &[NewAstroHouse]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM astro_houses", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO astro_houses (season, common_name, english_name, start_date, star_name,
                    star_days, zodiac_signs, zodiac_days, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for house in houses {
                stmt.execute(params![
                    house.season,
                    house.common_name,
                    house.english_name,
                    house.start_date,
                    house.star_name,
                    house.star_days,
                    serde_json::to_string(house.zodiac_signs.as_deref().unwrap_or_default())?,
                    serde_json::to_string(house.zodiac_days.as_deref().unwrap_or_default())?,
                    house.notes,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!("Replaced {} astronomical houses with {}", removed, houses.len());
        Ok(houses.len())
    }

    pub fn get_astro_houses(&self) -> Result<Vec<AstroHouse>, StoreError> {
        let sql = format!("SELECT {ASTRO_COLUMNS} FROM astro_houses ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let houses = stmt
            .query_map([], astro_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(houses)
    }
}

fn require_user(caller: &Caller) -> Result<&UserId, StoreError> {
    caller.user_id().ok_or(StoreError::Unauthenticated)
}

fn insert_event_with(
    conn: &Connection,
    event: &NewEvent,
    user_id: Option<&str>,
    source: &str,
) -> Result<i64, StoreError> {
    let now = ts(Utc::now());
    conn.execute(
        "INSERT INTO events (title, description, start_time, end_time, all_day, location,
            category, reminders, user_id, source, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            event.title,
            event.description,
            ts(event.start),
            ts(event.end),
            event.all_day,
            event.location,
            event.category.as_str(),
            serde_json::to_string(&event.reminders)?,
            user_id,
            source,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_holidays_with(conn: &Connection, holidays: &[MaterializedHoliday]) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO holidays (name, local_name, date, country_code, kind, description, hijri_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    let mut inserted = 0;
    for holiday in holidays {
        inserted += stmt.execute(params![
            holiday.name,
            holiday.local_name,
            day(holiday.date),
            holiday.country_code,
            holiday.kind.as_str(),
            holiday.description,
            holiday.hijri_date,
        ])?;
    }
    Ok(inserted)
}

/// Fixed-width UTC text with nanoseconds so that SQL string comparison
/// orders chronologically and stored instants round-trip exactly.
fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn day(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> SqliteResult<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn optional_timestamp_at(row: &Row<'_>, idx: usize) -> SqliteResult<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

fn event_from_row(row: &Row<'_>) -> SqliteResult<Event> {
    let category: String = row.get(7)?;
    let reminders: String = row.get(8)?;
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start: timestamp_at(row, 3)?,
        end: timestamp_at(row, 4)?,
        all_day: row.get(5)?,
        location: row.get(6)?,
        category: category.parse().map_err(|e: String| conversion_error(7, e))?,
        reminders: serde_json::from_str(&reminders).map_err(|e| conversion_error(8, e))?,
        owner: Owner::from_column(row.get(9)?),
        source: row.get(10)?,
        created_at: timestamp_at(row, 11)?,
        updated_at: timestamp_at(row, 12)?,
    })
}

fn todo_from_row(row: &Row<'_>) -> SqliteResult<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        is_done: row.get(3)?,
        date: optional_timestamp_at(row, 4)?,
        owner: Owner::from_column(row.get(5)?),
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
    })
}

fn holiday_from_row(row: &Row<'_>) -> SqliteResult<MaterializedHoliday> {
    let date: String = row.get(2)?;
    let kind: String = row.get(4)?;
    Ok(MaterializedHoliday {
        name: row.get(0)?,
        local_name: row.get(1)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| conversion_error(2, e))?,
        country_code: row.get(3)?,
        kind: HolidayKind::from_tag(&kind),
        description: row.get(5)?,
        hijri_date: row.get(6)?,
    })
}

fn astro_from_row(row: &Row<'_>) -> SqliteResult<AstroHouse> {
    let signs: String = row.get(7)?;
    let days: String = row.get(8)?;
    Ok(AstroHouse {
        id: row.get(0)?,
        season: row.get(1)?,
        common_name: row.get(2)?,
        english_name: row.get(3)?,
        start_date: row.get(4)?,
        star_name: row.get(5)?,
        star_days: row.get(6)?,
        zodiac_signs: serde_json::from_str(&signs).map_err(|e| conversion_error(7, e))?,
        zodiac_days: serde_json::from_str(&days).map_err(|e| conversion_error(8, e))?,
        notes: row.get(9)?,
    })
}
