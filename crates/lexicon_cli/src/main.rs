//! Command-line entry point.
//!
//! # Responsibility
//! - `ping`: verify `lexicon_core` linkage and print the core version.
//! - `import`: run the CSV import pipeline against a local database file.

use clap::{Parser, Subcommand};
use lexicon_core::db::open_db;
use lexicon_core::{
    import_csv_atomically, init_logging, ImportOptions, LogTarget, UploadedFile, CSV_CONTENT_TYPE,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "lexicon", version, about = "Lexicon dictionary tools")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LEXICON_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Absolute directory for rotating log files; stderr when unset
    #[arg(long, global = true, env = "LEXICON_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the core crate ping and version
    Ping,
    /// Import a CSV file of words into the dictionary database
    Import {
        /// SQLite database file; created and migrated when missing
        #[arg(long, env = "LEXICON_DB_PATH", default_value = "lexicon.db")]
        db: PathBuf,

        /// Print only counts instead of the full category and word listing
        #[arg(long)]
        summary: bool,

        /// CSV file with `term`, `definition` and `path` columns
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let target = match LogTarget::from_dir(cli.log_dir.as_deref()) {
        Ok(target) => target,
        Err(err) => return fail(&err),
    };
    if let Err(err) = init_logging(&cli.log_level, target) {
        return fail(&err);
    }

    match cli.command {
        Command::Ping => {
            println!("lexicon_core ping={}", lexicon_core::ping());
            println!("lexicon_core version={}", lexicon_core::core_version());
            ExitCode::SUCCESS
        }
        Command::Import { db, summary, file } => match run_import(&db, &file, summary) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => fail(&err),
        },
    }
}

fn run_import(db: &Path, file: &Path, summary: bool) -> Result<(), String> {
    let bytes = std::fs::read(file)
        .map_err(|err| format!("failed to read `{}`: {err}", file.display()))?;
    let mut conn = open_db(db).map_err(|err| err.to_string())?;

    let upload = UploadedFile {
        content_type: content_type_for(file),
        bytes: &bytes,
    };
    let outcome = import_csv_atomically(&mut conn, Some(upload), ImportOptions::default())
        .map_err(|err| err.to_string())?;

    let output = if summary {
        serde_json::json!({
            "categories": outcome.categories.len(),
            "words": outcome.words.total,
        })
    } else {
        serde_json::to_value(&outcome).map_err(|err| err.to_string())?
    };
    let rendered = serde_json::to_string_pretty(&output).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

/// Files are declared `text/csv` by extension, the way a browser upload is.
fn content_type_for(file: &Path) -> Option<&'static str> {
    file.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.eq_ignore_ascii_case("csv"))
        .map(|_| CSV_CONTENT_TYPE)
}

fn fail(message: &str) -> ExitCode {
    log::error!("event=cli_command module=cli status=error");
    eprintln!("error: {message}");
    ExitCode::FAILURE
}
