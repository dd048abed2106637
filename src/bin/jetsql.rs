use std::{
    io::{BufRead, Write, stdin, stdout},
    path::PathBuf,
};

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use jetsql::{DEFAULT_BIND_SIZE, DEFAULT_DATE_FORMAT, Database, OpenOptions, QueryResponse};

/// Interactive SQL shell over a Jet (Access) database file.
///
/// Statements end with `;`. Besides SELECT, `LIST TABLES` and
/// `DESCRIBE TABLE <name>` are understood. Type `exit` to quit.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the .mdb or .accdb file.
    path: PathBuf,

    /// Capacity of each column's binding buffer, in bytes.
    #[arg(long, default_value_t = DEFAULT_BIND_SIZE)]
    bind_size: usize,

    /// strftime pattern for DateTime columns.
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// Scan the catalog once and reuse it.
    #[arg(long)]
    cache_catalog: bool,

    /// Run one statement, print the result and exit.
    #[arg(short, long)]
    execute: Option<String>,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = OpenOptions::new()
        .bind_size(args.bind_size)
        .date_format(&args.date_format)
        .cache_catalog(args.cache_catalog);
    let db = Database::open_with(&args.path, options)?;

    let result = match &args.execute {
        Some(sql) => db
            .query(sql)
            .map_err(|err| miette::Report::new(err).with_source_code(sql.clone()))
            .and_then(|response| print_response(&response)),
        None => repl(&db),
    };

    db.close();
    result
}

fn repl(db: &Database) -> Result<()> {
    println!("Connected to {} ({})", db.path().display(), db.version());

    let mut buf = String::new();

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    loop {
        if buf.is_empty() {
            stdout.write_all(b"jetsql> ").into_diagnostic()?;
        } else {
            stdout.write_all(b"     -> ").into_diagnostic()?;
        }
        stdout.flush().into_diagnostic()?;

        if stdin.read_line(&mut buf).into_diagnostic()? == 0 {
            break;
        }

        let input = buf.trim();
        if input.is_empty() {
            buf.clear();
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }
        if !input.ends_with(';') {
            continue;
        }

        match db.query(input) {
            Ok(response) => print_response(&response)?,
            Err(err) => {
                println!("{:?}", miette::Report::new(err).with_source_code(input.to_string()));
            }
        }

        buf.clear();
    }

    println!("Bye");

    Ok(())
}

fn print_response(response: &QueryResponse) -> Result<()> {
    let mut stdout = stdout().lock();

    let widths: Vec<usize> = response
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            response
                .rows
                .iter()
                .map(|row| row[i].chars().count())
                .chain([name.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell: <width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    writeln!(stdout, "{}", line(&response.columns)).into_diagnostic()?;
    writeln!(
        stdout,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    )
    .into_diagnostic()?;
    for row in &response.rows {
        writeln!(stdout, "{}", line(row)).into_diagnostic()?;
    }
    writeln!(stdout, "({} rows)", response.len()).into_diagnostic()?;

    stdout.flush().into_diagnostic()
}
