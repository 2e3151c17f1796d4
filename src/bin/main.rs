use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossterm::style::Stylize;
use decypher_core::batch;
use decypher_core::core::types::{Analysis, Notice, WordMatch};
use decypher_core::{Config, Decypher, DecypherError, Key};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "decypher",
    version,
    about = "Break monoalphabetic substitution ciphers on English text"
)]
struct Cli {
    /// Encrypt each file with a random key into `_<name>` instead of decrypting
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with_all = ["tally", "dictionary", "snapshot", "json", "parallel"]
    )]
    encrypt: bool,

    /// Seed for the encryption key generator (reproducible fixtures)
    #[arg(long, requires = "encrypt")]
    seed: Option<u64>,

    /// Path to config (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Quadgram tally, one `<ngram> <count>` per line
    #[arg(short, long, value_name = "FILE")]
    tally: Option<PathBuf>,

    /// Dictionary, one word per line
    #[arg(short, long, value_name = "FILE")]
    dictionary: Option<PathBuf>,

    /// Cache the built dictionary index and tally model here
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Score hill-climb neighbours in parallel
    #[arg(long, action = ArgAction::SetTrue)]
    parallel: bool,

    /// Print one JSON report per file
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Print nothing but errors
    #[arg(short, long, action = ArgAction::SetTrue)]
    silent: bool,

    /// Log pipeline details to stderr
    #[arg(short, long, action = ArgAction::SetTrue, conflicts_with = "silent")]
    verbose: bool,

    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    output: String,
    key: Key,
    cross_check_key: Key,
    refinement_key: Key,
    score: f64,
    rounds: usize,
    matches: &'a [WordMatch],
    notices: &'a [Notice],
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let outcome = if cli.encrypt { run_encrypt(&cli) } else { run_decrypt(&cli) };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let fallback = if cli.silent {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Defaults, then the config file, then flags.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(tally) = &cli.tally {
        config.tally = tally.clone();
    }
    if let Some(dictionary) = &cli.dictionary {
        config.dictionary = dictionary.clone();
    }
    if let Some(snapshot) = &cli.snapshot {
        config.snapshot = Some(snapshot.clone());
    }
    if cli.parallel {
        config.parallel = true;
    }
    Ok(config)
}

/// Returns Ok(false) when at least one file was skipped.
fn run_decrypt(cli: &Cli) -> Result<bool> {
    let config = resolve_config(cli)?;
    let engine = Decypher::load(&config)?;

    if !cli.silent && !cli.json {
        println!("decrypting...");
    }

    let mut all_ok = true;
    for outcome in batch::decrypt_files(&engine, &cli.files) {
        match &outcome.result {
            Ok(decrypted) => {
                if !cli.silent {
                    print_analysis(cli, outcome.path, &decrypted.output, &decrypted.analysis)?;
                }
            }
            Err(e) => {
                all_ok = false;
                report_failure(outcome.path, e);
            }
        }
    }
    Ok(all_ok)
}

fn print_analysis(cli: &Cli, path: &Path, output: &Path, analysis: &Analysis) -> Result<()> {
    if cli.json {
        let report = FileReport {
            file: path.display().to_string(),
            output: output.display().to_string(),
            key: analysis.key,
            cross_check_key: analysis.cross_check.key,
            refinement_key: analysis.refinement.key,
            score: analysis.refinement.score,
            rounds: analysis.refinement.rounds(),
            matches: &analysis.cross_check.matches,
            notices: &analysis.notices,
        };
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    for notice in &analysis.notices {
        println!("{}", notice.to_string().yellow());
    }
    println!("{}: {}", path.display(), analysis.key.to_string().bold());
    Ok(())
}

fn run_encrypt(cli: &Cli) -> Result<bool> {
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if !cli.silent {
        println!("encrypting...");
    }

    let mut all_ok = true;
    for outcome in batch::encrypt_files(&cli.files, &mut rng) {
        match &outcome.result {
            Ok(encrypted) => {
                if !cli.silent {
                    println!("{}: {}", outcome.path.display(), encrypted.key.to_string().bold());
                }
            }
            Err(e) => {
                all_ok = false;
                report_failure(outcome.path, e);
            }
        }
    }
    Ok(all_ok)
}

fn report_failure(path: &Path, e: &DecypherError) {
    eprintln!("{} {}: {}", "skipped:".red().bold(), path.display(), e);
}
