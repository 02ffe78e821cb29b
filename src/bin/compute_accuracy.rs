use analogy_eval::{
    AnalogyEvaluator, AnyVectors, BitLevel, Encoding, EvaluationState, Event, LoadOptions,
    Representation, SectionReport, WordVectors, logging,
};
use anyhow::Context;
use chrono::{DateTime, Local};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

// Reads analogy questions like the ones in the google analogy corpus:
// Efficient Estimation of Word Representations in Vector Space
// Tomas Mikolov et al, 2013
// e.g. ": capital-common-countries" followed by "Athens Greece Baghdad Iraq"
#[derive(Parser, Debug)]
#[command(author, version, about = "Word analogy accuracy of a vector table", long_about = None)]
struct Cli {
    /// File containing the word projections
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Quantization bit level (0 = full precision; 1, 2 or 4..=24)
    #[arg(value_name = "BIT_LEVEL", default_value = "0")]
    bit_level: BitLevel,

    /// Only load the first N words for fast approximate evaluation (0 = off, typical value is 30000)
    #[arg(value_name = "THRESHOLD", default_value_t = 0)]
    threshold: usize,

    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(0..=1),
        help = "0: text, 1: binary"
    )]
    binary: u8,

    /// Vector representation used for the nearest-word search
    #[arg(long, value_enum, default_value_t = Encoding::Continuous)]
    encoding: Encoding,

    /// Candidates kept per question
    #[arg(long, default_value_t = 1)]
    top_n: usize,

    /// Question file (reads stdin if not provided)
    #[arg(long, value_name = "FILE")]
    questions: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Configuration parameters, built from command-line arguments.
#[derive(Debug, Clone)]
struct Config {
    vectors: PathBuf,
    questions: Option<PathBuf>,
    load: LoadOptions,
    top_n: usize,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            vectors: cli.file.clone(),
            questions: cli.questions.clone(),
            load: LoadOptions {
                encoding: cli.encoding,
                binary: cli.binary == 1,
                bit_level: cli.bit_level,
                word_limit: cli.threshold,
            },
            top_n: cli.top_n,
        }
    }
}

fn seconds_since(start: DateTime<Local>) -> f64 {
    (Local::now() - start).num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6
}

fn print_section(report: &SectionReport) {
    println!(
        "ACCURACY TOP1: {:.2} %  ({} / {})",
        report.section.percent(),
        report.section.correct,
        report.section.total
    );
    println!(
        "Total accuracy: {:.2} %   Semantic accuracy: {:.2} %   Syntactic accuracy: {:.2} % ",
        report.overall.percent(),
        report.semantic.percent(),
        report.syntactic.percent()
    );
}

fn evaluate<R: Representation, Q: BufRead>(
    vectors: &WordVectors<R>,
    questions: Q,
    top_n: usize,
) -> io::Result<EvaluationState> {
    let mut state = EvaluationState::default();
    AnalogyEvaluator::new(vectors)
        .with_top_n(top_n)
        .run(questions, &mut state, |event| match event {
            Event::SectionStarted(label) => println!("{label}:"),
            Event::SectionFinished(report) => print_section(report),
        })?;
    Ok(state)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::from(&cli);

    let start = Local::now();
    println!("Starting eval...");
    let vectors = AnyVectors::from_file(&config.vectors, &config.load)
        .with_context(|| format!("loading vectors from {}", config.vectors.display()))?;
    println!("Loaded input file in {:.6} seconds", seconds_since(start));

    let questions: Box<dyn BufRead> = match &config.questions {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening questions {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let start = Local::now();
    let state = match &vectors {
        AnyVectors::Continuous(v) => evaluate(v, questions, config.top_n),
        AnyVectors::BitPacked(v) => evaluate(v, questions, config.top_n),
    }
    .context("reading questions")?;

    println!(
        "Questions seen / total: {} {}   {:.2} % ",
        state.questions_scored,
        state.questions_seen,
        state.scored_percent()
    );
    println!("Computed accuracy in {:.6} seconds", seconds_since(start));
    Ok(())
}
