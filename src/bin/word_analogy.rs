use analogy_eval::{
    AnyVectors, BitLevel, Encoding, LoadOptions, Representation, WordVectors, logging,
};
use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive word analogies", long_about = None)]
struct Cli {
    #[arg(value_name = "FILE", default_value = "vectors.bin")]
    file: PathBuf,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1), help = "0: text, 1: binary")]
    binary: u8,

    #[arg(long, default_value = "0")]
    bit_level: BitLevel,

    #[arg(long, value_enum, default_value_t = Encoding::Continuous)]
    encoding: Encoding,

    /// Number of completions to list
    #[arg(short = 'n', long, default_value_t = 30)]
    top_n: usize,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn get_input() -> io::Result<Option<String>> {
    let mut s = String::new();
    if io::stdin().read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s.trim().to_uppercase()))
}

fn session<R: Representation>(vectors: &WordVectors<R>, top_n: usize) -> io::Result<()> {
    loop {
        println!("\nWord analogy - KING is to QUEEN as MAN is to ?");
        print!("Enter 3 words (EXIT to quit): ");
        io::stdout().flush()?;
        let Some(s) = get_input()? else {
            break;
        };
        if s == "EXIT" {
            break;
        }

        let words: Vec<&str> = s.split_whitespace().collect();
        if words.len() != 3 {
            println!("Expected exactly 3 words, but got {}. Try again.", words.len());
            continue;
        }

        let oov_words: Vec<&str> = words
            .iter()
            .filter(|&&w| vectors.index_of(w).is_none())
            .copied()
            .collect();
        if !oov_words.is_empty() {
            for word in &oov_words {
                println!("'{word}' is out of vocabulary");
            }
            continue;
        }

        let Some(topn) = vectors.analogy_top_n(words[0], words[1], words[2], top_n) else {
            continue;
        };

        for (i, neighbor) in topn.iter().filter(|n| !n.token.is_empty()).enumerate() {
            println!("{:3}: {:>8.5} {}", i + 1, neighbor.score, neighbor.token);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let options = LoadOptions {
        encoding: cli.encoding,
        binary: cli.binary == 1,
        bit_level: cli.bit_level,
        word_limit: 0,
    };
    let vectors = AnyVectors::from_file(&cli.file, &options)
        .with_context(|| format!("loading vectors from {}", cli.file.display()))?;

    match &vectors {
        AnyVectors::Continuous(v) => session(v, cli.top_n)?,
        AnyVectors::BitPacked(v) => session(v, cli.top_n)?,
    }
    Ok(())
}
