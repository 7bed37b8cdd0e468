use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use subsheet::{run, OutputFormat, RunOutcome};
use subsheet_core::config::{CountParsing, DoneByPolicy, OptionalFieldPolicy};
use subsheet_core::{Config, DateNormalizer, RecordNormalizer};
use subsheet_feeds::{CandidateSource, FileSource, StdinSource};

/// Exit status when every candidate row was rejected or a date did not parse.
const EXIT_NO_VALID: u8 = 2;

#[derive(Parser)]
#[command(name = "subsheet", about = "Normalize subculture lab sheet rows into validated records")]
struct Cli {
    /// Config file layered over the built-in defaults
    /// (default: ~/.config/subsheet/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level to stderr (RUST_LOG overrides).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize an extraction payload and print the accepted records.
    Normalize {
        /// Payload file; omit or pass `-` to read stdin.
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write records here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Reject rows without `doneBy` instead of using the placeholder.
        #[arg(long)]
        reject_missing_done_by: bool,

        /// Reject rows whose optional counts do not parse.
        #[arg(long)]
        reject_invalid_optional: bool,

        /// Require counts to be whole numbers with no trailing text.
        #[arg(long)]
        strict_counts: bool,

        /// Reject rows whose `contaminatedJars` exceeds `jarsUsed`.
        #[arg(long)]
        check_contamination: bool,

        /// Validate rows in parallel.
        #[arg(long)]
        parallel: bool,

        /// Suppress the summary and rejection report.
        #[arg(long, short)]
        quiet: bool,
    },

    /// Parse one date and print it as YYYY-MM-DD with the rule that matched.
    Date {
        text: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Normalize {
            input,
            format,
            output,
            reject_missing_done_by,
            reject_invalid_optional,
            strict_counts,
            check_contamination,
            parallel,
            quiet,
        } => {
            let policy = &mut config.policy;
            if reject_missing_done_by {
                policy.missing_done_by = DoneByPolicy::Reject;
            }
            if reject_invalid_optional {
                policy.invalid_optional = OptionalFieldPolicy::RejectRow;
            }
            if strict_counts {
                policy.count_parsing = CountParsing::Strict;
            }
            policy.contamination_within_jars |= check_contamination;
            policy.parallel |= parallel;

            let normalizer = RecordNormalizer::from_config(&config)?;
            let mut source: Box<dyn CandidateSource> = match input {
                Some(path) if path.as_os_str() != "-" => Box::new(FileSource::new(path)),
                _ => Box::new(StdinSource::new()),
            };
            let mut out: Box<dyn std::io::Write> = match output {
                Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
                None => Box::new(std::io::stdout().lock()),
            };

            let outcome = run(
                source.as_mut(),
                &normalizer,
                format,
                quiet,
                out.as_mut(),
                &mut std::io::stderr(),
            )?;

            Ok(match outcome {
                RunOutcome::Accepted { .. } => ExitCode::SUCCESS,
                RunOutcome::NoValidRecords { .. } => ExitCode::from(EXIT_NO_VALID),
            })
        }

        Command::Date { text } => {
            let dates = DateNormalizer::from_config(&config.dates)?;
            match dates.parse(&text) {
                Ok(found) => {
                    println!("{}\t{}", found.iso(), found.matched_by);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    Ok(ExitCode::from(EXIT_NO_VALID))
                }
            }
        }
    }
}
