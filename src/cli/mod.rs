pub mod report;

use std::{fmt::Display, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Timelike};
use chrono_english::parse_date_string;
use clap::{Parser, Subcommand, ValueEnum};
use now::DateTimeNow;
use tracing::level_filters::LevelFilter;

use crate::{
    analysis::analyze,
    current::CurrentBlock,
    store::{
        catalog::{JsonTypeCatalog, TypeCatalog},
        day_store::{DayStore, JsonDayStore},
        entities::{Color, TimeBlock},
        rollover::{append_resolved, OPEN_START},
    },
    utils::{
        dir::create_application_default_path,
        logging::enable_logging,
        time::CivilTime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Timeblocks", version, long_about = None)]
#[command(about = "Record and analyze day-partitioned time blocks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "List block types or add a new one")]
    Types {
        #[command(subcommand)]
        command: TypesCommand,
    },
    #[command(about = "Show a day's time blocks or record a new one")]
    Blocks {
        #[command(subcommand)]
        command: BlocksCommand,
    },
    #[command(about = "Read or set the current-block scratch state")]
    Current {
        #[command(subcommand)]
        command: CurrentCommand,
    },
    #[command(about = "Aggregate time usage over a date range")]
    Analyze {
        #[arg(
            long,
            short,
            help = "First day of the range. Examples are \"yesterday\", \"15/03/2025\""
        )]
        start: Option<String>,
        #[arg(long, short, help = "Last day of the range, included in the analysis")]
        end: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TypesCommand {
    #[command(about = "Print the catalog in stored order")]
    List,
    #[command(about = "Append a new block type to the catalog")]
    Add {
        name: String,
        #[arg(long, value_parser = parse_color, help = "RGB triple, e.g. 200,30,30")]
        color: Color,
    },
}

#[derive(Subcommand, Debug)]
enum BlocksCommand {
    #[command(about = "Print all blocks recorded for a day")]
    Show {
        #[arg(long, help = "Day to show, defaults to today")]
        date: Option<String>,
    },
    #[command(about = "Record a finished time block")]
    Add {
        #[arg(
            long,
            help = "Start of the block, e.g. \"9:00 15/03/2025\". Omit to continue from the previous block, rolling over midnight if needed"
        )]
        start: Option<String>,
        #[arg(long, help = "End of the block")]
        end: String,
        #[arg(long = "type", help = "Block type id from the catalog")]
        type_id: i32,
        #[arg(long, default_value = "", help = "Free-form label for the block")]
        title: String,
    },
}

#[derive(Subcommand, Debug)]
enum CurrentCommand {
    #[command(about = "Get or set the current block name")]
    Name { value: Option<String> },
    #[command(about = "Get or set the current block type id")]
    Type { id: Option<i32> },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

fn parse_color(value: &str) -> std::result::Result<Color, String> {
    let parts: Vec<_> = value.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected r,g,b but got {value:?}"));
    };
    let channel = |v: &str| v.parse::<i32>().map_err(|e| format!("bad channel {v:?}: {e}"));
    Ok(Color {
        r: channel(r)?,
        g: channel(g)?,
        b: channel(b)?,
    })
}

/// Parses a free-form date expression into the civil wall-clock fields the
/// core works with.
fn parse_civil(value: &str, style: DateStyle) -> Result<CivilTime> {
    let parsed = parse_date_string(value, Local::now(), style.into())
        .with_context(|| format!("Failed to parse date {value:?}"))?;
    Ok(CivilTime::new(
        parsed.year(),
        parsed.month() as i32,
        parsed.day() as i32,
        parsed.hour() as i32,
        parsed.minute() as i32,
        parsed.second() as i32,
    ))
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };

    let data_dir = match &args.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => create_application_default_path()?,
    };
    enable_logging(&data_dir, logging_level, args.log)?;

    let store = JsonDayStore::new(data_dir.join("blocks"));
    let catalog = JsonTypeCatalog::new(data_dir.join("blocktypes.json"));
    let current = CurrentBlock::new(data_dir.clone());

    match args.commands {
        Commands::Types { command } => match command {
            TypesCommand::List => {
                report::print_types(&catalog.load().await?);
                Ok(())
            }
            TypesCommand::Add { name, color } => {
                let appended = catalog.append(name, color).await?;
                println!("Added block type {} with id {}", appended.name, appended.id);
                Ok(())
            }
        },
        Commands::Blocks { command } => match command {
            BlocksCommand::Show { date } => {
                let date = match date {
                    Some(raw) => parse_civil(&raw, args.date_style)?.date(),
                    None => today().date(),
                };
                let blocks = store.load_day(date).await?;
                report::print_day(&blocks, &catalog.load().await?);
                Ok(())
            }
            BlocksCommand::Add {
                start,
                end,
                type_id,
                title,
            } => {
                let start_time = match start {
                    Some(raw) => parse_civil(&raw, args.date_style)?,
                    None => OPEN_START,
                };
                let block = TimeBlock {
                    start_time,
                    end_time: parse_civil(&end, args.date_style)?,
                    block_type_id: type_id,
                    title,
                };
                let persisted = append_resolved(&store, block).await?;
                println!(
                    "Recorded block on {}",
                    persisted.start_time.date()
                );
                Ok(())
            }
        },
        Commands::Current { command } => match command {
            CurrentCommand::Name { value } => {
                match value {
                    Some(name) => current.set_name(&name).await?,
                    None => println!("{}", current.name().await?),
                }
                Ok(())
            }
            CurrentCommand::Type { id } => {
                match id {
                    Some(id) => current.set_type_id(id).await?,
                    None => println!("{}", current.type_id().await?),
                }
                Ok(())
            }
        },
        Commands::Analyze { start, end } => {
            let start = match start {
                Some(raw) => parse_civil(&raw, args.date_style)?,
                None => today(),
            };
            let end = match end {
                Some(raw) => parse_civil(&raw, args.date_style)?,
                None => today(),
            };
            // Whole-day range: first second of the start day to the last
            // second of the end day.
            let start = start.date().midnight();
            let end = end.date().last_second();

            let analysis = analyze(&store, &catalog, start, end).await?;
            report::print_analysis(&analysis, &catalog.load().await?);
            Ok(())
        }
    }
}

fn today() -> CivilTime {
    let now = Local::now().beginning_of_day();
    CivilTime::midnight(now.year(), now.month() as i32, now.day() as i32)
}
