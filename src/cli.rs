use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate, Utc, Weekday};
use clap::{Args, Parser, Subcommand};

use taqwim::{
    astro::{AstroHouse, load_astro_houses},
    calendar::{
        Event, Locale, MonthGrid, build_month_grid,
        input::{EventDraft, TodoDraft, parse_iso_date},
        weekday_headers,
    },
    holidays::{
        HolidayKind, LunarCalendar, MaterializeOptions, MaterializedHoliday, NagerClient,
        PublicHolidaySource, TabularHijri, days_until, format_hijri, islamic_holidays, materialize,
    },
    seasons::{SEASON_SOURCE, SeasonTable, season_start_events},
    storage::{Config, Store},
    visibility::Caller,
};

#[derive(Parser)]
#[command(
    name = "taqwim",
    version = env!("CARGO_PKG_VERSION"),
    about = "Calendar grids, Hijri holidays, events and todos backed by SQLite",
    long_about = None
)]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(global = true, long = "config")]
    pub config: Option<PathBuf>,

    /// Act as this user; overrides [session].user from the config
    #[arg(global = true, long = "user")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the month grid containing DATE (YYYY-MM-DD, default today)
    Month {
        date: Option<String>,
        #[arg(long)]
        locale: Option<String>,
        #[arg(long = "week-start")]
        week_start: Option<String>,
    },

    /// Generate, store and query holidays
    #[command(subcommand)]
    Holidays(HolidayCommand),

    /// Manage events
    #[command(subcommand)]
    Events(EventCommand),

    /// Manage todos
    #[command(subcommand)]
    Todos(TodoCommand),

    /// Season progress and season-start events
    #[command(subcommand)]
    Season(SeasonCommand),

    /// Astronomical houses (star seasons)
    #[command(subcommand)]
    Astro(AstroCommand),
}

#[derive(Args)]
pub struct YearRange {
    #[arg(long = "from")]
    pub from: Option<i32>,
    #[arg(long = "to")]
    pub to: Option<i32>,
}

#[derive(Subcommand)]
pub enum HolidayCommand {
    /// Write materialized Islamic holidays as JSON
    Generate {
        #[command(flatten)]
        range: YearRange,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace stored religious holidays with freshly materialized ones
    Seed {
        #[command(flatten)]
        range: YearRange,
    },
    /// Import public holidays from Nager.Date
    Fetch {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        country: Option<String>,
    },
    /// List stored holidays
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        country: Option<String>,
    },
    /// Show the next holiday and how many days remain
    Next {
        #[arg(long)]
        country: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum EventCommand {
    /// Events visible to the caller between two dates (default: this month's grid)
    List {
        #[arg(long = "from")]
        from: Option<String>,
        #[arg(long = "to")]
        to: Option<String>,
    },
    /// The next events starting from now
    Upcoming {
        #[arg(long)]
        limit: Option<u32>,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long = "all-day")]
        all_day: bool,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TodoCommand {
    List,
    Add {
        title: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Done {
        id: i64,
        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum SeasonCommand {
    /// Current season and its progress on DATE (default today)
    Show { date: Option<String> },
    /// Replace the public season-start events
    Seed {
        #[command(flatten)]
        range: YearRange,
    },
}

#[derive(Subcommand)]
pub enum AstroCommand {
    /// Stored houses in seed order
    List,
    /// Replace the stored houses with the entries of a JSON file
    Seed { file: PathBuf },
}

struct Session {
    config: Config,
    locale: Locale,
    caller: Caller,
    today: NaiveDate,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_or_create_at(path),
        None => Config::load_or_create(),
    }
    .context("loading config")?;

    let caller = match cli.user.as_deref() {
        Some(token) => Caller::from_token(Some(token)),
        None => config.caller(),
    };
    let ctx = Session {
        locale: config.locale()?,
        config,
        caller,
        today: Local::now().date_naive(),
    };

    match cli.command {
        Commands::Month { date, locale, week_start } => run_month(&ctx, date, locale, week_start),
        Commands::Holidays(command) => run_holidays(&ctx, command).await,
        Commands::Events(command) => run_events(&ctx, command),
        Commands::Todos(command) => run_todos(&ctx, command),
        Commands::Season(command) => run_season(&ctx, command),
        Commands::Astro(command) => run_astro(&ctx, command),
    }
}

fn open_store(ctx: &Session) -> Result<Store> {
    let path = &ctx.config.general.database;
    Store::open(path).with_context(|| format!("opening database {}", path.display()))
}

fn run_month(
    ctx: &Session,
    date: Option<String>,
    locale: Option<String>,
    week_start: Option<String>,
) -> Result<()> {
    let reference = match date {
        Some(text) => parse_iso_date("date", &text)?,
        None => ctx.today,
    };
    let locale = match locale {
        Some(tag) => tag.parse()?,
        None => ctx.locale,
    };
    let week_start = match week_start {
        Some(day) => day
            .parse::<Weekday>()
            .map_err(|_| anyhow::anyhow!("Invalid week start '{}'", day))?,
        None if locale != ctx.locale => locale.week_start(),
        None => ctx.config.week_start()?,
    };

    let grid = build_month_grid(reference, week_start, ctx.today);
    let store = open_store(ctx)?;
    let country = &ctx.config.general.country_code;
    let holidays: Vec<MaterializedHoliday> = store
        .get_holidays(country, Some(grid.year))?
        .into_iter()
        .filter(|h| h.date.month() == grid.month)
        .collect();

    let start = grid.first().and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    let end = grid.last().and_hms_opt(23, 59, 59).map(|d| d.and_utc());
    let events = match (start, end) {
        (Some(start), Some(end)) => store.get_events(&ctx.caller, start, end)?,
        _ => Vec::new(),
    };

    println!("{}", format_month_text(&grid, locale, &holidays, &events));
    Ok(())
}

pub fn format_month_text(
    grid: &MonthGrid,
    locale: Locale,
    holidays: &[MaterializedHoliday],
    events: &[Event],
) -> String {
    let holiday_days: HashSet<NaiveDate> = holidays.iter().map(|h| h.date).collect();
    let mut event_counts: HashMap<NaiveDate, usize> = HashMap::new();
    for event in events {
        *event_counts.entry(event.start.date_naive()).or_default() += 1;
    }

    let mut lines = Vec::new();
    let hijri = NaiveDate::from_ymd_opt(grid.year, grid.month, 1).map(|d| TabularHijri.from_gregorian(d));
    let mut title = locale.format_month_title(grid.year, grid.month);
    if let Some(hijri) = hijri {
        title.push_str(&format!(
            "  ({} {})",
            locale.hijri_month_name(hijri.month),
            locale.digits(hijri.year)
        ));
    }
    lines.push(title);

    lines.push(
        weekday_headers(grid.week_start, locale)
            .iter()
            .map(|name| format!("{:>6}", truncate_chars(name, 5)))
            .collect::<String>(),
    );

    for week in grid.weeks() {
        let row = week
            .iter()
            .map(|day| {
                if !day.in_focus_month {
                    return " ".repeat(6);
                }
                let number = locale.digits(day.date.day());
                let label = if day.is_today { format!("[{}]", number) } else { number };
                let marker = if holiday_days.contains(&day.date) {
                    '*'
                } else if event_counts.contains_key(&day.date) {
                    '+'
                } else {
                    ' '
                };
                format!("{:>5}{}", label, marker)
            })
            .collect::<String>();
        lines.push(row.trim_end().to_string());
    }

    if !holidays.is_empty() {
        lines.push(String::new());
        for holiday in holidays {
            lines.push(format!("* {} {}", holiday.date.format("%Y-%m-%d"), holiday_label(holiday)));
        }
    }

    let total_events: usize = event_counts.values().sum();
    if total_events > 0 {
        lines.push(format!("+ {} event(s) in view", total_events));
    }

    lines.join("\n")
}

fn holiday_label(holiday: &MaterializedHoliday) -> String {
    match &holiday.hijri_date {
        Some(hijri) => format!("{} ({})", holiday.name, hijri),
        None => holiday.name.clone(),
    }
}

fn truncate_chars(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn year_range(ctx: &Session, range: &YearRange) -> (i32, i32) {
    (
        range.from.unwrap_or(ctx.config.holidays.range_start_year),
        range.to.unwrap_or(ctx.config.holidays.range_end_year),
    )
}

fn materialize_islamic(ctx: &Session, range: &YearRange) -> Result<Vec<MaterializedHoliday>> {
    let (from, to) = year_range(ctx, range);
    let options = MaterializeOptions {
        country_code: ctx.config.general.country_code.clone(),
        kind: HolidayKind::Religious,
        lunar_margin_years: ctx.config.holidays.lunar_margin_years,
        display_locale: Locale::Ar,
    };
    Ok(materialize(&islamic_holidays(), from, to, &options, &TabularHijri)?)
}

async fn run_holidays(ctx: &Session, command: HolidayCommand) -> Result<()> {
    let default_country = ctx.config.general.country_code.clone();
    match command {
        HolidayCommand::Generate { range, output } => {
            let holidays = materialize_islamic(ctx, &range)?;
            let json = serde_json::to_string_pretty(&holidays)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    println!("Generated {} holidays to {}", holidays.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
        HolidayCommand::Seed { range } => {
            let holidays = materialize_islamic(ctx, &range)?;
            let mut store = open_store(ctx)?;
            let count = store.replace_holidays(&HolidayKind::Religious, &holidays)?;
            println!("Seeded {} Islamic holidays", count);
        }
        HolidayCommand::Fetch { year, country } => {
            let country = country.unwrap_or(default_country);
            let client = NagerClient::new().with_base_url(ctx.config.holidays.nager_base_url.clone());
            let holidays = client.fetch(year, &country).await?;
            let mut store = open_store(ctx)?;
            let inserted = store.insert_holidays(&holidays)?;
            println!("Fetched {} holidays, {} new", holidays.len(), inserted);
        }
        HolidayCommand::List { year, country } => {
            let country = country.unwrap_or(default_country);
            let store = open_store(ctx)?;
            let holidays = store.get_holidays(&country, year)?;
            if holidays.is_empty() {
                println!("No holidays stored for {}.", country);
            }
            for holiday in holidays {
                println!("{}  {:<10} {}", holiday.date.format("%Y-%m-%d"), holiday.kind, holiday_label(&holiday));
            }
        }
        HolidayCommand::Next { country } => {
            let country = country.unwrap_or(default_country);
            let store = open_store(ctx)?;
            match store.get_next_holiday(&country, ctx.today)? {
                Some(holiday) => {
                    let days = days_until(ctx.today, holiday.date);
                    println!(
                        "{} on {} ({} day(s))",
                        holiday.name,
                        ctx.locale.format_long_date(holiday.date),
                        days
                    );
                }
                None => println!("No upcoming holidays for {}.", country),
            }
        }
    }
    Ok(())
}

fn run_events(ctx: &Session, command: EventCommand) -> Result<()> {
    let store = open_store(ctx)?;
    match command {
        EventCommand::List { from, to } => {
            let grid = build_month_grid(ctx.today, ctx.config.week_start()?, ctx.today);
            let from = match from {
                Some(text) => parse_iso_date("from", &text)?,
                None => grid.first(),
            };
            let to = match to {
                Some(text) => parse_iso_date("to", &text)?,
                None => grid.last(),
            };
            if from > to {
                bail!("--from must not be after --to");
            }
            let (Some(start), Some(end)) = (from.and_hms_opt(0, 0, 0), to.and_hms_opt(23, 59, 59)) else {
                bail!("date out of range");
            };
            let events = store.get_events(&ctx.caller, start.and_utc(), end.and_utc())?;
            print_events(&events);
        }
        EventCommand::Upcoming { limit } => {
            let events = store.get_upcoming_events(&ctx.caller, Utc::now(), limit)?;
            print_events(&events);
        }
        EventCommand::Add { title, start, end, all_day, location, category, description } => {
            let draft = EventDraft {
                title,
                description,
                start,
                end,
                all_day,
                location,
                category,
                reminders: vec![],
            };
            let event = store.create_event(&ctx.caller, &draft.validate()?)?;
            println!("Created event {}", event.id);
        }
        EventCommand::Delete { id } => {
            store.delete_event(&ctx.caller, id)?;
            println!("Deleted event {}", id);
        }
    }
    Ok(())
}

fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("No events.");
        return;
    }
    for event in events {
        let time_label = if event.all_day {
            "All Day".to_string()
        } else {
            format!("{}-{}", event.start.format("%H:%M"), event.end.format("%H:%M"))
        };
        let scope = if event.is_public() { "public" } else { "mine" };
        let mut line = format!(
            "#{:<4} {} {:<13} {} [{}, {}]",
            event.id,
            event.start.format("%Y-%m-%d"),
            time_label,
            event.title,
            event.category,
            scope
        );
        if let Some(location) = &event.location {
            line.push_str(&format!(" @ {}", location));
        }
        println!("{line}");
    }
}

fn run_todos(ctx: &Session, command: TodoCommand) -> Result<()> {
    let store = open_store(ctx)?;
    match command {
        TodoCommand::List => {
            let todos = store.get_todos(&ctx.caller, None)?;
            if todos.is_empty() {
                println!("No todos.");
            }
            for todo in todos {
                let check = if todo.is_done { "x" } else { " " };
                let date = todo
                    .date
                    .map(|d| format!(" ({})", d.format("%Y-%m-%d")))
                    .unwrap_or_default();
                println!("#{:<4} [{}] {}{}", todo.id, check, todo.title, date);
            }
        }
        TodoCommand::Add { title, date, description } => {
            let draft = TodoDraft { title, description, is_done: None, date };
            let todo = store.create_todo(&ctx.caller, &draft.validate()?)?;
            println!("Created todo {}", todo.id);
        }
        TodoCommand::Done { id, undo } => {
            let todo = store.set_todo_done(&ctx.caller, id, !undo)?;
            println!("Todo {} is {}", todo.id, if todo.is_done { "done" } else { "open" });
        }
        TodoCommand::Delete { id } => {
            store.delete_todo(&ctx.caller, id)?;
            println!("Deleted todo {}", id);
        }
    }
    Ok(())
}

fn season_table(ctx: &Session, years: std::ops::RangeInclusive<i32>) -> Result<SeasonTable> {
    match &ctx.config.holidays.seasons_file {
        Some(path) => SeasonTable::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(SeasonTable::approximate(years)),
    }
}

fn run_season(ctx: &Session, command: SeasonCommand) -> Result<()> {
    match command {
        SeasonCommand::Show { date } => {
            let today = match date {
                Some(text) => parse_iso_date("date", &text)?,
                None => ctx.today,
            };
            let table = season_table(ctx, today.year() - 1..=today.year())?;
            match table.current_season(today) {
                Some(season) => println!(
                    "{}: {:.0}% elapsed, {} day(s) left (ends {}) | {}",
                    season.name.label(),
                    season.progress(today) * 100.0,
                    season.days_remaining(today),
                    season.end_date.format("%Y-%m-%d"),
                    format_hijri(TabularHijri.from_gregorian(today), ctx.locale)
                ),
                None => println!("No season data for {}.", today),
            }
        }
        SeasonCommand::Seed { range } => {
            let (from, to) = year_range(ctx, &range);
            let table = season_table(ctx, from..=to)?;
            let events = season_start_events(&table);
            let mut store = open_store(ctx)?;
            let count = store.replace_public_events(SEASON_SOURCE, &events)?;
            println!("Seeded {} season start events", count);
        }
    }
    Ok(())
}

fn run_astro(ctx: &Session, command: AstroCommand) -> Result<()> {
    match command {
        AstroCommand::List => {
            let store = open_store(ctx)?;
            let houses = store.get_astro_houses()?;
            if houses.is_empty() {
                println!("No astronomical houses stored. Run `taqwim astro seed FILE` first.");
            }
            for house in &houses {
                println!("{}", format_astro_house(house));
            }
        }
        AstroCommand::Seed { file } => {
            let houses = load_astro_houses(&file).with_context(|| format!("loading {}", file.display()))?;
            let mut store = open_store(ctx)?;
            let count = store.replace_astro_houses(&houses)?;
            println!("Seeded {} astronomical houses", count);
        }
    }
    Ok(())
}

pub fn format_astro_house(house: &AstroHouse) -> String {
    let mut line = format!(
        "{:<8} {} ({}) [{}] {} days",
        house.start_date, house.common_name, house.star_name, house.season, house.star_days
    );
    if let Some(english) = &house.english_name {
        line.push_str(&format!(" - {}", english));
    }
    if let Some(zodiac) = house.zodiac_summary() {
        line.push_str(&format!("\n         Zodiac: {}", zodiac));
    }
    if let Some(notes) = &house.notes {
        line.push_str(&format!("\n         {}", notes));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_user_after_subcommand() {
        let cli = Cli::try_parse_from(["taqwim", "events", "upcoming", "--user", "user-42"]).unwrap();

        assert_eq!(cli.user.as_deref(), Some("user-42"));
        assert!(matches!(cli.command, Commands::Events(EventCommand::Upcoming { limit: None })));
    }

    #[test]
    fn month_text_marks_today_and_holidays() {
        let grid = build_month_grid(date(2025, 3, 10), Weekday::Sun, date(2025, 3, 10));
        let holidays = vec![MaterializedHoliday {
            name: "Start of Ramadan".to_string(),
            local_name: String::new(),
            date: date(2025, 3, 1),
            country_code: "MA".to_string(),
            kind: HolidayKind::Religious,
            description: String::new(),
            hijri_date: Some("1 Ramadan 1446".to_string()),
        }];

        let text = format_month_text(&grid, Locale::EnUs, &holidays, &[]);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("March 2025"));
        assert!(lines[1].trim_start().starts_with("Sun"));
        assert!(text.contains("1*"));
        assert!(text.contains("[10]"));
        assert!(text.contains("* 2025-03-01 Start of Ramadan (1 Ramadan 1446)"));
    }

    #[test]
    fn parses_astro_seed_file_argument() {
        let cli = Cli::try_parse_from(["taqwim", "astro", "seed", "data/astro.json"]).unwrap();

        match cli.command {
            Commands::Astro(AstroCommand::Seed { file }) => assert_eq!(file, PathBuf::from("data/astro.json")),
            _ => panic!("expected astro seed"),
        }
    }

    #[test]
    fn astro_house_line_shows_zodiac_and_notes() {
        let house = AstroHouse {
            id: 1,
            season: "Winter".to_string(),
            common_name: "Al-Shawla".to_string(),
            english_name: Some("White Nights".to_string()),
            start_date: "Dec 25".to_string(),
            star_name: "Lambda Scorpii".to_string(),
            star_days: 13,
            zodiac_signs: vec!["Capricorn".to_string()],
            zodiac_days: vec![13],
            notes: Some("Coldest nights.".to_string()),
        };

        let text = format_astro_house(&house);

        assert!(text.starts_with("Dec 25   Al-Shawla (Lambda Scorpii) [Winter] 13 days - White Nights"));
        assert!(text.contains("Zodiac: Capricorn (13 days)"));
        assert!(text.ends_with("Coldest nights."));
    }
}
