/// Main entry point for the habit tracker command line
///
/// This file sets up logging, parses command line arguments, opens the
/// database and runs one command against the habit service.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use habit_tracker::{
    format_date, Frequency, Habit, HabitId, HabitKind, HabitService, HabitWithEntries, SqliteStorage,
    TrackerError,
};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, TrackerError> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(".habit_tracker");
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("habit_tracker");
            p
        }),
        // 3. User's config directory
        dirs::config_dir().map(|mut p| {
            p.push("habit_tracker");
            p
        }),
        // 4. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_tracker");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if let Ok(()) = std::fs::create_dir_all(potential_path) {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_tracker");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Resolve the database path from the command line or the defaults
fn resolve_database_path(database: Option<PathBuf>) -> Result<PathBuf, TrackerError> {
    match database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Ok(path)
        }
        None => get_default_database_path(),
    }
}

/// Command line arguments for the habit tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show habits that are due or overdue today (default)
    Today,
    /// List all active habits
    List,
    /// Create a habit
    Add {
        name: String,
        /// daily, weekdays, weekends, days:0,2,4, interval:N, weekly:N or monthly:N
        #[arg(long, default_value = "daily")]
        frequency: Frequency,
        /// Target quantity; makes the habit numerical
        #[arg(long, requires = "unit")]
        target: Option<f64>,
        /// Unit of the target (e.g. "glasses")
        #[arg(long, requires = "target")]
        unit: Option<String>,
    },
    /// Mark a habit done for today
    Complete {
        habit_id: String,
        /// Amount achieved, for numerical habits
        #[arg(long)]
        value: Option<f64>,
    },
    /// Take back today's completion
    Uncomplete { habit_id: String },
    /// Change a habit's name, frequency or active flag
    Update {
        habit_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        frequency: Option<Frequency>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a habit and its whole history
    Delete { habit_id: String },
}

/// One line of the today view
fn describe(item: &HabitWithEntries) -> String {
    let mark = if item.is_completed_today() {
        "[x]"
    } else if item.is_overdue {
        "[!]"
    } else {
        "[ ]"
    };

    let progress = match (item.habit.target_display(), item.today_entry.as_ref().and_then(|e| e.value)) {
        (Some(target), Some(value)) => format!(" {} / {}", value, target),
        (Some(target), None) => format!(" 0 / {}", target),
        _ => String::new(),
    };

    format!(
        "{} {}{}  streak {}  ({})",
        mark, item.habit.name, progress, item.streak, item.habit.id
    )
}

fn print_today(service: &HabitService<SqliteStorage>) {
    let habits = service.habits();
    if habits.is_empty() {
        println!("Nothing due on {}.", format_date(service.today()));
    }
    for item in &habits {
        println!("{}", describe(item));
    }
}

async fn run(service: &HabitService<SqliteStorage>, command: Command) -> Result<(), TrackerError> {
    match command {
        Command::Today => print_today(service),
        Command::List => {
            for habit in service.active_habits().await? {
                println!(
                    "{}  {}  {}  since {}",
                    habit.id,
                    habit.name,
                    habit.frequency,
                    format_date(habit.created_on())
                );
            }
        }
        Command::Add { name, frequency, target, unit } => {
            let kind = match (target, unit) {
                (Some(target), Some(unit)) => HabitKind::Numerical { target, unit },
                _ => HabitKind::Boolean,
            };
            let habit = Habit::new(name, kind, frequency)?;
            let id = habit.id.clone();
            service.add_habit(habit).await?;
            println!("Created habit {}", id);
            print_today(service);
        }
        Command::Complete { habit_id, value } => {
            service.complete_habit(&HabitId::from(habit_id), value).await?;
            print_today(service);
        }
        Command::Uncomplete { habit_id } => {
            service.uncomplete_habit(&HabitId::from(habit_id)).await?;
            print_today(service);
        }
        Command::Update { habit_id, name, frequency, active } => {
            let habit_id = HabitId::from(habit_id);
            let Some(mut habit) = service.habit(&habit_id).await? else {
                eprintln!("No habit with id {}", habit_id);
                return Ok(());
            };
            habit.update(name, frequency, active)?;
            service.update_habit(habit).await?;
        }
        Command::Delete { habit_id } => {
            service.delete_habit(&HabitId::from(habit_id)).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_tracker={}", log_level))
        .with_writer(std::io::stderr)
        .init();

    let db_path = resolve_database_path(args.database)?;
    info!("Using database at: {}", db_path.display());

    let service = HabitService::new(SqliteStorage::new(db_path));
    service.init().await?;

    run(&service, args.command.unwrap_or(Command::Today)).await?;

    info!("Habit tracker finished");
    Ok(())
}
