//! Binary entry point: resolve configuration, start logging, open the SQLite
//! store, then either run a one-shot command or hand over to the TUI.
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;
use tracing::{error, info};

use book_collection_manager::config::{Cli, Command, Config};
use book_collection_manager::export::write_csv_file;
use book_collection_manager::logging::init_logging;
use book_collection_manager::{list_books, open_store, run_app, summarize, App, ReadStatus};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    init_logging(&config.log_path, &config.log_level)?;
    info!(db = %config.db_path.display(), "starting book collection manager");

    let result = run(cli.command, &config);
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "exiting with error");
    }
    result
}

fn run(command: Option<Command>, config: &Config) -> Result<()> {
    let conn = open_store(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    match command {
        Some(Command::Export { output }) => {
            let dir = output.as_deref().unwrap_or(config.export_dir.as_path());
            export(&conn, dir)
        }
        Some(Command::Summary) => print_summary(&conn),
        None => {
            let mut app = App::load(conn, config.sort, config.export_dir.clone())?;
            run_app(&mut app)
        }
    }
}

fn export(conn: &Connection, dir: &Path) -> Result<()> {
    let books = list_books(conn).context("failed to load books")?;
    let path = write_csv_file(&books, dir)?;
    println!("{}", path.display());
    Ok(())
}

fn print_summary(conn: &Connection) -> Result<()> {
    let books = list_books(conn).context("failed to load books")?;
    let summary = summarize(&books);

    println!("Total books:     {}", summary.total);
    for status in ReadStatus::ALL {
        println!(
            "{:<16} {} ({}%)",
            format!("{status}:"),
            summary.read_status.get(Some(status)),
            summary.status_percent(Some(status))
        );
    }
    println!("Favorites:       {}", summary.favorites);
    println!("Average rating:  {}", summary.average_rating_label());

    let sections = [
        ("Languages", &summary.languages),
        ("Genres", &summary.genres),
        ("Top authors", &summary.top_authors),
        ("Top publishers", &summary.top_publishers),
    ];
    for (title, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        println!();
        println!("{title}:");
        for entry in entries {
            println!("  {:<30} {}", entry.value, entry.count);
        }
    }
    Ok(())
}
