mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use datepick_core::{CalendarSystem, Mode};
use log::info;

#[derive(Parser)]
#[command(name = "datepick")]
#[command(about = "Pick and convert dates across the Persian and Gregorian calendars")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the month grid around a date
    Show {
        /// Calendar system ("persian" or "gregorian"), defaults to config
        #[arg(short, long)]
        calendar: Option<CalendarSystem>,

        /// Value mode ("date_time" or "date_only"), defaults to config
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Selected value (e.g. "2025-03-20" or "2025-03-20T15:00"), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show today in both calendars
    Today {
        #[arg(short, long)]
        calendar: Option<CalendarSystem>,

        #[arg(short, long)]
        mode: Option<Mode>,
    },
    /// Convert a date between calendars
    Convert {
        /// Date fields in the source calendar (e.g. "1403/01/01")
        date: String,

        /// Calendar the date is written in
        #[arg(short, long, default_value = "persian")]
        from: CalendarSystem,
    },
    /// Drive a picker with a scripted sequence of actions
    Pick {
        #[arg(short, long)]
        calendar: Option<CalendarSystem>,

        #[arg(short, long)]
        mode: Option<Mode>,

        /// Initial bound value, defaults to unset
        #[arg(short, long)]
        date: Option<String>,

        /// Actions: year=N, month=N, day=N, time=HH:MM, select=N, today, toggle, enter, outside
        actions: Vec<String>,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            calendar,
            mode,
            date,
        } => {
            let cfg = config::resolve(calendar, mode)?;
            commands::show::run(&cfg, date.as_deref())
        }
        Commands::Today { calendar, mode } => {
            let cfg = config::resolve(calendar, mode)?;
            commands::today::run(&cfg)
        }
        Commands::Convert { date, from } => commands::convert::run(&date, from),
        Commands::Pick {
            calendar,
            mode,
            date,
            actions,
        } => {
            let cfg = config::resolve(calendar, mode)?;
            info!("picking with {} calendar", cfg.calendar);
            commands::pick::run(&cfg, date.as_deref(), &actions).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Init { force } => commands::config::init(force),
            ConfigCommands::Path => commands::config::path(),
        },
    }
}
