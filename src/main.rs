//! A small interactive front door over [`sheet_core::Sheet`].
//!
//! `A1 = =1+2*3` sets a cell; `A1?` prints its value. Non-interactive modes
//! let a script load a file, evaluate one command, or export the result
//! without ever opening a REPL.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sheet_core::{Position, Sheet};
use tracing::{info, warn};

/// Lazy, memoizing spreadsheet evaluation engine.
#[derive(Parser, Debug)]
#[command(name = "sheetengine", version, about)]
struct Cli {
    /// Tab-separated plain-text file to load on startup.
    file: Option<PathBuf>,

    /// Evaluate a single `CELL=INPUT` assignment and print its value, then exit.
    #[arg(short = 'c', long = "command")]
    command: Option<String>,

    /// Export the sheet's evaluated values to this path instead of starting the REPL.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut sheet = match &cli.file {
        Some(path) => {
            let sheet = sheet_core::storage::import(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            info!(path = %path.display(), "loaded sheet");
            sheet
        }
        None => Sheet::new(),
    };

    if let Some(command) = cli.command {
        let pos = apply_assignment(&mut sheet, &command)?;
        let value = sheet.value(pos).context("evaluating assigned cell")?;
        println!("{value}");
        return Ok(());
    }

    if let Some(output) = cli.output {
        sheet_core::storage::export_values(&output, &mut sheet)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("exported to {}", output.display());
        return Ok(());
    }

    run_repl(&mut sheet);
    Ok(())
}

/// Parse `CELL=INPUT` or `CELL = INPUT` and apply it via `set_cell`. Returns
/// the position on success so the caller can immediately report its value.
fn apply_assignment(sheet: &mut Sheet, command: &str) -> Result<Position> {
    let (cell_ref, input) = command
        .split_once('=')
        .with_context(|| format!("expected CELL=INPUT, got {command:?}"))?;
    let pos: Position = cell_ref
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid cell reference: {}", cell_ref.trim()))?;
    sheet.set_cell(pos, input.trim())?;
    Ok(pos)
}

/// Read `CELL = INPUT` or `CELL?` lines from stdin until EOF or `quit`.
fn run_repl(sheet: &mut Sheet) {
    println!("sheetengine REPL — `A1 = =1+2`, `A1?`, `print`, `quit`");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        if line == "print" {
            print!("{}", sheet.print_values());
            continue;
        }

        if let Some(cell_ref) = line.strip_suffix('?') {
            match cell_ref.trim().parse::<Position>() {
                Ok(pos) => match sheet.value(pos) {
                    Ok(value) => println!("{value}"),
                    Err(e) => println!("error: {e}"),
                },
                Err(_) => println!("error: invalid cell reference: {}", cell_ref.trim()),
            }
            continue;
        }

        match apply_assignment(sheet, line) {
            Ok(_) => {}
            Err(message) => {
                warn!(%message, "rejected REPL input");
                println!("error: {message}");
            }
        }
    }
}
