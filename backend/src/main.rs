//! Ordermart CLI - Profile retail order extracts and build data marts
//!
//! # Commands
//!
//! ```bash
//! ordermart run                     # Quality report + data marts + archive + stats
//! ordermart profile [--json]        # Quality report only
//! ordermart marts                   # Cleansing + data marts + archive + stats
//! ordermart rules                   # Show the rule catalog
//! ```
//!
//! Global options override `ORDERMART_*` environment variables (and `.env`).

use clap::{Parser, Subcommand};
use ordermart::{
    init_logging, log_error, run, run_marts, run_profile, PipelineConfig, Rule,
};
use ordermart::export::report::SUMMARY_FILE;
use ordermart::ExportError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ordermart")]
#[command(about = "Profile retail order extracts and build star-schema data marts", long_about = None)]
struct Cli {
    /// Directory of source files
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Directory receiving every generated artifact
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Field delimiter of the source files
    #[arg(short, long, global = true)]
    delimiter: Option<char>,

    /// Extension of the source files
    #[arg(short, long, global = true)]
    extension: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full run: quality report, data marts, archive and statistics
    Run,

    /// Write the quality report only
    Profile {
        /// Print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Cleanse and write the data marts, archive and statistics
    Marts,

    /// Show the rule catalog
    Rules,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.json_logs) {
        eprintln!("⚠️  Logging disabled: {}", e);
    }

    let result = load_config(&cli).and_then(|config| match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd_run(&config),
        Commands::Profile { json } => cmd_profile(&config, json),
        Commands::Marts => cmd_marts(&config),
        Commands::Rules => cmd_rules(),
    });

    if let Err(e) = result {
        log_error(e.to_string());
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Environment first, then CLI flags.
fn load_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::from_env()?;

    if let Some(ref input) = cli.input {
        config.input_dir = input.clone();
    }
    if let Some(ref output) = cli.output {
        config.output_dir = output.clone();
    }
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(ref extension) = cli.extension {
        config.extension = extension.trim_start_matches('.').to_string();
    }

    config.validate()?;
    Ok(config)
}

fn cmd_run(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = run(config)?;

    eprintln!("\n📊 {} source file(s) read", outcome.sources.len());
    if !outcome.skipped.is_empty() {
        eprintln!("   Skipped: {}", outcome.skipped.join(", "));
    }
    eprintln!("   Inconsistency types: {}", outcome.profile.report.summary.len());
    eprintln!("   Cleansed rows: {}", outcome.marts.cleansed_rows);
    eprintln!("   Fact rows: {}", outcome.marts.marts.sales.len());
    eprintln!("   💾 Archive: {}", outcome.marts.archive.display());
    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_profile(config: &PipelineConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = run_profile(config)?;

    if json {
        let summary = serde_json::to_string_pretty(&outcome.report.summary).map_err(ExportError::from)?;
        println!("{}", summary);
    } else {
        for row in &outcome.report.summary {
            eprintln!("   {:<35} {:>6}  {}", row.rule.name(), row.distinct_rows, row.remediation);
        }
        eprintln!(
            "💾 Summary written to: {}",
            config.report_dir().join(SUMMARY_FILE).display()
        );
    }
    Ok(())
}

fn cmd_marts(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = run_marts(config)?;

    for stats in &outcome.stats {
        eprintln!(
            "   {:<28} {:>8} rows  {:>8} keys",
            stats.table.name(),
            stats.rows,
            stats.distinct_primary_keys
        );
    }
    let diagnostics = outcome.marts.diagnostics;
    if !diagnostics.is_clean() {
        eprintln!(
            "   ⚠️  Geography lookup: {} unresolved, {} ambiguous",
            diagnostics.unresolved, diagnostics.ambiguous
        );
    }
    eprintln!("💾 Archive: {}", outcome.archive.display());
    eprintln!("💾 Statistics: {}", outcome.stats_file.display());
    Ok(())
}

fn cmd_rules() -> Result<(), Box<dyn std::error::Error>> {
    println!("📋 Rule catalog:\n");
    for rule in Rule::CATALOG {
        println!("  {}", rule.name());
        println!("     Remediation: {}", rule.remediation());
        println!("     Suggestion:  {}", rule.suggestion());
    }
    Ok(())
}
