use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use camlet_cli::interp::{line_col, StatementResult};
use camlet_cli::monitor::monitor_program;
use camlet_cli::{init_tracing, Error, Interpreter, Options, RuntimeError};
use camlet_parse::parse_str;
use clap::{Parser, Subcommand, ValueEnum};

/// Maximum source file size in bytes (1MB)
const MAX_SOURCE_SIZE: usize = 1_000_000;

#[derive(Parser, Debug)]
#[command(name = "camlet")]
#[command(about = "Camlet: a small ML with contracts and blame")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a Camlet program, printing each top-level result
    Run {
        /// Path to .cml source file
        file: String,

        /// Evaluate without attaching or checking contracts
        #[arg(long)]
        no_contracts: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// Parse a source file and dump the AST
    Parse {
        /// Path to .cml source file
        file: String,

        /// Dump the tree after the contract monitor pass
        #[arg(long)]
        monitored: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Pretty,
    Json,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            no_contracts,
            format,
        } => cmd_run(&file, no_contracts, format),

        Commands::Parse {
            file,
            monitored,
            format,
        } => cmd_parse(&file, monitored, format).map(|()| ExitCode::SUCCESS),
    }
}

fn read_source(path: &str) -> Result<String> {
    let src = std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))?;

    if src.len() > MAX_SOURCE_SIZE {
        bail!(
            "source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        );
    }

    Ok(src)
}

fn cmd_run(file: &str, no_contracts: bool, format: Format) -> Result<ExitCode> {
    let src = read_source(file)?;

    let mut interp = Interpreter::with_options(Options {
        contracts: !no_contracts,
    });
    let outcome = interp.run(&src);

    match format {
        Format::Pretty => {
            for result in interp.statement_results() {
                print_result(file, &src, result);
            }
        }
        Format::Json => {
            let report = serde_json::json!({
                "outcome": outcome,
                "statements": interp.statement_results(),
                "errors": interp.errors(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(if interp.errors().is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Toplevel-style rendering of one statement.
fn print_result(file: &str, src: &str, result: &StatementResult) {
    match result {
        StatementResult::Bound { name, value, ty } => println!("val {name} : {ty} = {value}"),
        StatementResult::Evaluated { value, ty } => println!("- : {ty} = {value}"),
        StatementResult::Contract { name, contract } => println!("contract {name} = {contract}"),
        StatementResult::Failed { error } => {
            if let Some(span) = error.span() {
                let (line, col) = line_col(src, span);
                println!("File \"{file}\", line {line}, column {col}:");
            }
            println!("Error: {}", error.explain());
            if let Error::Runtime(RuntimeError::ContractViolation {
                contract, value, ..
            }) = error
            {
                println!("  contract: {contract}");
                println!("  value: {value}");
            }
        }
    }
}

fn cmd_parse(file: &str, monitored: bool, format: Format) -> Result<()> {
    let src = read_source(file)?;

    let program = parse_str(file, &src).map_err(|e| {
        let (line, col) = line_col(&src, e.span);
        anyhow!("{file}:{line}:{col}: syntax error: {e}")
    })?;
    let program = if monitored {
        monitor_program(&program)
    } else {
        program
    };

    match format {
        Format::Pretty => println!("{:#?}", program),
        Format::Json => println!("{}", serde_json::to_string_pretty(&program)?),
    }
    Ok(())
}
