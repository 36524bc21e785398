//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `libcat_core` linkage and print its version.
//! - With a config path argument, open the catalog and print row counts.

use libcat_core::{core_version, init_logging, Catalog, CatalogConfig};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("libcat_core version={}", core_version());

    let Some(config_path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        return ExitCode::SUCCESS;
    };
    match run(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("libcat: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::load(config_path)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.effective_log_level(), log_dir)?;
    }

    let catalog = Catalog::open(&config)?;
    let summary = catalog.summary()?;
    info!(
        "event=cli_summary module=cli status=ok mode={}",
        catalog.gateway().mode()
    );

    println!("store={}", catalog.gateway().mode());
    println!("authors={}", summary.authors);
    println!("books={}", summary.books);
    println!("users={}", summary.users);
    println!("students={}", summary.students);
    println!("author_books={}", summary.author_books);
    println!("student_books={}", summary.student_books);
    Ok(())
}
