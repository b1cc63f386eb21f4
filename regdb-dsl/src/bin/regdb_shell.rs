/// Interactive regdb shell over an in-memory catalog pair.
///
/// Usage: cargo run --bin regdb_shell [-- --config regdb.toml]
///
/// One statement per line. Lines starting with `--` are comments;
/// `.quit` exits.
use regdb_core::RegdbConfig;
use regdb_dsl::{Execution, Session};
use regdb_storage::{MockCatalog, QueryResult};
use std::io::{self, BufRead, Write};

fn main() {
    if let Err(e) = regdb_dsl::telemetry::init_tracing() {
        eprintln!("warning: logging disabled: {}", e);
    }

    let config = match RegdbConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = MockCatalog::with_layout(config.layout);
    if let Err(e) = catalog.seed_defaults() {
        eprintln!("Failed to seed catalog: {}", e);
        std::process::exit(1);
    }
    let session = Session::new(catalog);

    if let Err(e) = run(&session) {
        eprintln!("I/O error: {}", e);
        std::process::exit(1);
    }
}

fn run(session: &Session<MockCatalog>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "regdb> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            return Ok(());
        }

        let line = line.trim();
        if line.is_empty() || line.starts_with("--") {
            continue;
        }
        if line == ".quit" {
            return Ok(());
        }

        match session.execute(line) {
            Ok(execution) => print_execution(&mut stdout, &execution)?,
            Err(e) => writeln!(stdout, "error: {}", e)?,
        }

        // The shell never reads the query log
        if let Err(e) = session.connection().clear_executed() {
            writeln!(stdout, "error: {}", e)?;
        }
    }
}

fn print_execution(out: &mut impl Write, execution: &Execution) -> io::Result<()> {
    writeln!(out, "-- {}", execution.compiled.sql)?;
    if execution.statement.statement_type().is_read_only() {
        print_rows(out, &execution.result)
    } else {
        writeln!(out, "OK, {} row(s) affected", execution.result.rows_affected)
    }
}

fn print_rows(out: &mut impl Write, result: &QueryResult) -> io::Result<()> {
    writeln!(out, "{}", result.columns.join(" | "))?;
    for row in &result.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        writeln!(out, "{}", cells.join(" | "))?;
    }
    writeln!(out, "({} row(s))", result.row_count())
}
