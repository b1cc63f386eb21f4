/// Statement Tracer - Shows the flow through Lexer → Parser → Compiler
///
/// Usage: cargo run --bin trace_parser -- "<statement>"
///        echo "<statement>" | cargo run --bin trace_parser
///
/// Compiles against an in-memory catalog seeded with the default rows.
use regdb_core::RegdbConfig;
use regdb_dsl::{compile, pretty_print, Lexer, QueryParser};
use regdb_storage::{CatalogConnection, MockCatalog};
use std::io::Read;

fn main() {
    if let Err(e) = regdb_dsl::telemetry::init_tracing() {
        eprintln!("warning: logging disabled: {}", e);
    }

    let input = match read_input() {
        Ok(input) if !input.trim().is_empty() => input,
        Ok(_) => {
            eprintln!("Usage: cargo run --bin trace_parser -- \"<statement>\"");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  cargo run --bin trace_parser -- \"GET MODEL 'default';\"");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ Failed to read statement: {}", e);
            std::process::exit(1);
        }
    };

    let config = match RegdbConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ REGDB STATEMENT TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    println!("📝 INPUT:");
    println!("{}", input.trim());
    println!();

    println!("🔤 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    for token in Lexer::new(&input) {
        match token {
            Ok(token) => println!(
                "{:>4}..{:<4} {:<16} {}",
                token.span.start,
                token.span.end,
                token.kind.to_string(),
                token.text
            ),
            Err(e) => println!("❌ {}", e),
        }
    }
    println!();

    let statement = match QueryParser::parse_query(&input) {
        Ok(statement) => statement,
        Err(e) => {
            println!("❌ Parse error: {}", e);
            std::process::exit(1);
        }
    };

    println!("🌳 STATEMENT ({}):", statement.statement_type());
    println!("─────────────────────────────────────────────────────────────");
    println!("{:#?}", statement);
    println!();
    match serde_json::to_string_pretty(&statement) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("❌ JSON encoding failed: {}", e),
    }
    println!();

    println!("🔄 CANONICAL:");
    println!("─────────────────────────────────────────────────────────────");
    println!("{}", pretty_print(&statement));
    println!();

    let catalog = MockCatalog::with_layout(config.layout);
    if let Err(e) = catalog.seed_defaults() {
        eprintln!("❌ Failed to seed catalog: {}", e);
        std::process::exit(1);
    }

    println!("🛠  SQL:");
    println!("─────────────────────────────────────────────────────────────");
    match compile(&statement, catalog.layout(), &catalog) {
        Ok(compiled) => {
            println!("{}", compiled.sql);
            println!();
            println!("✅ Compile succeeded!");
        }
        Err(e) => {
            println!("❌ Compile error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Statement from the first non-flag argument, or stdin.
fn read_input() -> std::io::Result<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            args.next();
            continue;
        }
        if arg.starts_with("--config=") {
            continue;
        }
        return Ok(arg);
    }

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}
