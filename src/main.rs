use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cdr_fingerprint::engine::Engine;
use cdr_fingerprint::mapping::ScamCategoryMap;
use cdr_fingerprint::models::QueryMode;
use cdr_fingerprint::params::FingerprintParams;

/// Acoustic fingerprint engine for known-fraudulent call recordings.
#[derive(Parser, Debug)]
#[command(name = "cdr-fingerprint")]
#[command(about = "Fingerprint and match scam-call recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build or update the index from a corpus directory (C6).
    Build {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long, default_value = "fingerprints.db")]
        db: PathBuf,
        /// Subdirectory names to skip (e.g. Legit_Call).
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        #[arg(long)]
        mapping: Option<PathBuf>,
    },
    /// Print index statistics.
    Check {
        #[arg(long, default_value = "fingerprints.db")]
        db: PathBuf,
        #[arg(long, default_value_t = 5)]
        sample: usize,
    },
    /// Query a single audio file against the index (C7).
    Query {
        audio_file: PathBuf,
        #[arg(long, default_value = "fingerprints.db")]
        db: PathBuf,
        #[arg(long)]
        mapping: Option<PathBuf>,
        #[arg(long, default_value_t = 0.20)]
        threshold: f32,
        #[arg(long, value_enum, default_value = "fingerprint")]
        mode: ModeArg,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Fingerprint,
    Hybrid,
    Auto,
}

impl From<ModeArg> for QueryMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Fingerprint => QueryMode::Fingerprint,
            ModeArg::Hybrid => QueryMode::Hybrid,
            ModeArg::Auto => QueryMode::Auto,
        }
    }
}

fn load_mapping(mapping: Option<&PathBuf>, corpus_fallback: Option<&PathBuf>) -> ScamCategoryMap {
    if let Some(path) = mapping {
        match ScamCategoryMap::load_from_file(path) {
            Ok(map) => return map,
            Err(e) => log::warn!("failed to load mapping file {}: {}", path.display(), e),
        }
    }
    if let Some(corpus) = corpus_fallback {
        return ScamCategoryMap::from_corpus_walk(corpus);
    }
    ScamCategoryMap::default()
}

fn main() -> std::process::ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Build {
            corpus,
            db,
            exclude,
            mapping,
        } => run_build(corpus, db, exclude, mapping),
        Command::Check { db, sample } => run_check(db, sample),
        Command::Query {
            audio_file,
            db,
            mapping,
            threshold,
            mode,
        } => run_query(audio_file, db, mapping, threshold, mode),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run_build(
    corpus: PathBuf,
    db: PathBuf,
    exclude: Vec<String>,
    mapping: Option<PathBuf>,
) -> cdr_fingerprint::error::Result<()> {
    let categories = load_mapping(mapping.as_ref(), Some(&corpus));
    let engine = Engine::open(&db, categories, FingerprintParams::default())?;
    let exclude: HashSet<String> = exclude.into_iter().collect();

    let report = engine.build(&corpus, &exclude)?;
    log::info!(
        "build complete: {} processed, {} errored",
        report.processed,
        report.errored
    );
    Ok(())
}

fn run_check(db: PathBuf, sample: usize) -> cdr_fingerprint::error::Result<()> {
    let engine = Engine::open(&db, ScamCategoryMap::default(), FingerprintParams::default())?;
    let stats = engine.check(sample)?;
    println!("Total fingerprints: {}", stats.total_fingerprints);
    println!("Distinct recordings: {}", stats.distinct_recordings);
    println!("Sample recordings: {:?}", stats.sample_recordings);
    Ok(())
}

fn run_query(
    audio_file: PathBuf,
    db: PathBuf,
    mapping: Option<PathBuf>,
    threshold: f32,
    mode: ModeArg,
) -> cdr_fingerprint::error::Result<()> {
    let categories = load_mapping(mapping.as_ref(), None);
    let mut params = FingerprintParams::default();
    params.match_threshold = threshold;
    let engine = Engine::open(&db, categories, params)?;

    let label = engine.query(&audio_file, mode.into(), None, None)?;
    println!("{}", serde_json::to_string_pretty(&label)?);
    Ok(())
}
