//! Bitrank CLI: answer query files against the succinct structures and
//! generate random inputs.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bitrank::{RankBitVec, SelectIndex};

mod generate;
mod queries;

use queries::QueryKind;

#[derive(Debug, Parser)]
#[command(name = "bitrank")]
#[command(about = "Succinct rank/select bit vector toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer a query file and print a RESULT line with timing and space
    Run(RunArgs),
    /// Generate a random query file
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
struct RunArgs {
    /// Input query file (count, bit string, one query per line)
    input: PathBuf,

    /// Output answer file (one decimal per line)
    output: PathBuf,

    /// Identifier echoed in the RESULT line
    #[arg(long, default_value = "bitrank")]
    name: String,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Random seed
    seed: u64,

    /// Number of bits in the vector
    length: usize,

    /// Probability of each bit being one
    fill_ratio: f64,

    /// Number of queries to generate
    num_queries: usize,

    /// Output file
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Generate(args) => generate::write_input(
            args.seed,
            args.length,
            args.fill_ratio,
            args.num_queries,
            &args.output,
        ),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let (raw_bits, queries) = queries::read_input(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let length = raw_bits.len();
    let mut num_ones = 0usize;
    let mut bitvec: RankBitVec = RankBitVec::new(length)?;
    for (pos, &byte) in raw_bits.as_bytes().iter().enumerate() {
        let is_set = byte == b'1';
        num_ones += usize::from(is_set);
        bitvec.set_bit(pos, is_set);
    }

    tracing::debug!(length, num_ones, queries = queries.len(), "input loaded");

    let mut answers = Vec::with_capacity(queries.len());

    // The reported time covers building the rank tables and the select
    // samples plus answering every query; parsing and output stay outside.
    let start = Instant::now();

    bitvec.update();
    let select: SelectIndex = SelectIndex::new(&bitvec, num_ones)?;

    for query in &queries {
        let answer = match query.kind {
            QueryKind::Access => u64::from(bitvec.is_set(query.value as usize)),
            QueryKind::Rank0 => bitvec.rank0(query.value as usize),
            QueryKind::Rank1 => bitvec.rank1(query.value as usize),
            QueryKind::Select0 => select.select0(query.value as usize) as u64,
            QueryKind::Select1 => select.select1(query.value as usize) as u64,
        };
        answers.push(answer);
    }

    let elapsed_ms = start.elapsed().as_millis();
    let space_bits = bitvec.memory_space_bits() + select.memory_space_bits();

    queries::write_answers(&args.output, &answers)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "RESULT name={} time={} space={}",
        args.name, elapsed_ms, space_bits
    );

    Ok(())
}
