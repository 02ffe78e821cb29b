use analogy_eval::quantize::quantize_slice;
use analogy_eval::{BitLevel, VectorReader, VectorWriter, logging};
use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Rewrite a vector table in another framing, optionally quantizing it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Quantization bit level applied to every component (0 = off)
    #[arg(value_name = "BIT_LEVEL", default_value = "0")]
    bit_level: BitLevel,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1), help = "input 0: text, 1: binary")]
    input_binary: u8,

    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1), help = "output 0: text, 1: binary")]
    output_binary: u8,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const PROGRESS_EVERY: usize = 100_000;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose.max(1));

    let input = File::open(&cli.input)
        .with_context(|| format!("opening {}", cli.input.display()))?;
    let mut reader = VectorReader::new(BufReader::new(input), cli.input_binary == 1);
    let header = reader.read_header()?;
    info!(words = header.words, dims = header.dimension, "converting");

    let output = File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    let mut writer = VectorWriter::new(BufWriter::new(output), cli.output_binary == 1);
    writer.write_header(header)?;

    let mut features = vec![0.0f32; header.dimension];
    for index in 0..header.words {
        if index % PROGRESS_EVERY == 0 {
            info!("{index} of {}", header.words);
        }
        let token = reader.read_entry(index, &mut features)?;
        quantize_slice(&mut features, cli.bit_level);
        writer.write_entry(&token, &features)?;
    }

    writer.into_inner().flush()?;
    info!(bit_level = %cli.bit_level, output = %cli.output.display(), "done");
    Ok(())
}
