//! Runtime configuration. Each setting can come from a command-line flag, an
//! environment variable, or a default rooted in the user's home directory.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use directories::{BaseDirs, UserDirs};

use crate::sort::SortKey;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-collection-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "books.sqlite";
/// Log file written next to the database.
const LOG_FILE_NAME: &str = "book-collection-manager.log";

/// Track a personal book collection from the terminal.
#[derive(Debug, Parser)]
#[command(name = "book-collection-manager", version, about)]
pub struct Cli {
    /// SQLite database holding the collection.
    #[arg(long, env = "BOOK_COLLECTION_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Directory that receives CSV exports.
    #[arg(long, env = "BOOK_COLLECTION_EXPORT_DIR", global = true)]
    pub export_dir: Option<PathBuf>,

    /// Log file (the terminal UI owns stdout).
    #[arg(long, env = "BOOK_COLLECTION_LOG", global = true)]
    pub log_file: Option<PathBuf>,

    /// Initial sort order of the book list.
    #[arg(long, env = "BOOK_COLLECTION_SORT", default_value = "title")]
    pub sort: SortKey,

    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the collection to `book_collection.csv` and print its path.
    Export {
        /// Target directory; defaults to the configured export directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the dashboard statistics.
    Summary,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,
    pub sort: SortKey,
}

impl Config {
    /// Fill in every setting the command line left open.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let data_dir = match (&cli.db, &cli.log_file) {
            (Some(_), Some(_)) => None,
            _ => Some(default_data_dir()?),
        };

        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => data_dir
                .as_ref()
                .map(|dir| dir.join(DB_FILE_NAME))
                .ok_or_else(|| anyhow!("could not resolve database path"))?,
        };

        let log_path = match &cli.log_file {
            Some(path) => path.clone(),
            None => data_dir
                .as_ref()
                .map(|dir| dir.join(LOG_FILE_NAME))
                .ok_or_else(|| anyhow!("could not resolve log path"))?,
        };

        let export_dir = match &cli.export_dir {
            Some(dir) => dir.clone(),
            None => default_export_dir()?,
        };

        Ok(Self {
            db_path,
            export_dir,
            log_path,
            log_level: cli.log_level.clone(),
            sort: cli.sort,
        })
    }
}

/// Resolve the application data directory inside the user's home.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Exports land where a browser download would: the download directory, or
/// the home directory when the platform has none.
fn default_export_dir() -> Result<PathBuf> {
    let user_dirs = UserDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(user_dirs
        .download_dir()
        .map(PathBuf::from)
        .unwrap_or_else(|| user_dirs.home_dir().to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_win() {
        let cli = Cli::try_parse_from([
            "book-collection-manager",
            "--db",
            "/tmp/books.sqlite",
            "--log-file",
            "/tmp/books.log",
            "--export-dir",
            "/tmp/out",
            "--sort",
            "rating",
        ])
        .unwrap();
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/books.sqlite"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/books.log"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.sort, SortKey::Rating);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from([
            "book-collection-manager",
            "export",
            "--output",
            "/tmp/out",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Export { output: Some(_) })
        ));

        let cli = Cli::try_parse_from(["book-collection-manager", "summary"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Summary)));
    }

    #[test]
    fn unknown_sort_key_is_rejected() {
        assert!(Cli::try_parse_from(["book-collection-manager", "--sort", "pages"]).is_err());
    }
}
