//! Command-line and environment configuration.
//!
//! # Invariants
//! - Every resolved path is absolute; the logger rejects relative directories.

use std::path::{Path, PathBuf};

use clap::Parser;

const DEFAULT_DB_FILE: &str = "bookbuddy.db";
const DEFAULT_LOG_DIR: &str = "logs";

/// BookBuddy, a personal book-collection manager.
#[derive(Parser, Debug)]
#[command(name = "bookbuddy", version, about = "Manage your personal book collection")]
pub struct CliArgs {
    /// SQLite database file
    #[arg(long = "db", value_name = "FILE", env = "BOOKBUDDY_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "BOOKBUDDY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rotated log files [default: `logs` next to the database]
    #[arg(long, value_name = "DIR", env = "BOOKBUDDY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Skip loading the sample collection into an empty database
    #[arg(long)]
    pub no_seed: bool,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub seed: bool,
}

impl CliConfig {
    /// Applies defaults and anchors relative paths at `cwd`.
    pub fn resolve(args: CliArgs, cwd: &Path) -> Self {
        let db_path = absolutize(
            args.db_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            cwd,
        );
        let log_dir = match args.log_dir {
            Some(dir) => absolutize(dir, cwd),
            None => db_path
                .parent()
                .unwrap_or(cwd)
                .join(DEFAULT_LOG_DIR),
        };
        let log_level = args
            .log_level
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| bookbuddy_core::default_log_level().to_string());

        Self {
            db_path,
            log_level,
            log_dir,
            seed: !args.no_seed,
        }
    }
}

fn absolutize(path: PathBuf, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, CliConfig};
    use clap::Parser;
    use std::path::Path;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("bookbuddy").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn relative_database_path_is_anchored_at_cwd() {
        let cwd = Path::new("/home/reader");
        let config = CliConfig::resolve(parse(&["--db", "shelf/books.db"]), cwd);

        assert_eq!(config.db_path, cwd.join("shelf/books.db"));
        assert_eq!(config.log_dir, cwd.join("shelf/logs"));
        assert!(config.seed);
    }

    #[test]
    fn explicit_log_settings_win() {
        let cwd = Path::new("/home/reader");
        let config = CliConfig::resolve(
            parse(&[
                "--db",
                "/data/books.db",
                "--log-dir",
                "/var/log/bookbuddy",
                "--log-level",
                "warn",
                "--no-seed",
            ]),
            cwd,
        );

        assert_eq!(config.db_path, Path::new("/data/books.db"));
        assert_eq!(config.log_dir, Path::new("/var/log/bookbuddy"));
        assert_eq!(config.log_level, "warn");
        assert!(!config.seed);
    }

    #[test]
    fn blank_log_level_falls_back_to_build_default() {
        let config = CliConfig::resolve(
            CliArgs {
                db_path: None,
                log_level: Some("  ".to_string()),
                log_dir: None,
                no_seed: false,
            },
            Path::new("/tmp"),
        );

        assert_eq!(config.db_path, Path::new("/tmp/bookbuddy.db"));
        assert_eq!(config.log_level, bookbuddy_core::default_log_level());
    }
}
