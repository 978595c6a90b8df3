//! Random query-file generator.
//!
//! Produces a Bernoulli-filled bit string and a uniform mix of the five
//! query kinds, deterministic for a given seed.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Writes a query file with `length` random bits and `num_queries` queries.
pub fn write_input(
    seed: u64,
    length: usize,
    fill_ratio: f64,
    num_queries: usize,
    path: &Path,
) -> Result<()> {
    ensure!(length > 0, "length must be positive");
    ensure!(
        (0.0..=1.0).contains(&fill_ratio),
        "fill ratio must be within [0, 1]"
    );

    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{num_queries}")?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut num_ones = 0usize;
    let mut bits = String::with_capacity(length);
    for _ in 0..length {
        let is_set = rng.gen_bool(fill_ratio);
        num_ones += usize::from(is_set);
        bits.push(if is_set { '1' } else { '0' });
    }
    out.write_all(bits.as_bytes())?;

    let num_zeros = length - num_ones;

    // Select ranks must stay within the actual occurrence counts, so kinds
    // whose count is zero are redrawn.
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut emitted = 0usize;
    while emitted < num_queries {
        match rng.gen_range(0..5u32) {
            0 => write!(out, "\naccess {}", rng.gen_range(0..length))?,
            1 => write!(out, "\nrank 0 {}", rng.gen_range(0..length))?,
            2 => write!(out, "\nrank 1 {}", rng.gen_range(0..length))?,
            3 if num_zeros > 0 => write!(out, "\nselect 0 {}", rng.gen_range(1..=num_zeros))?,
            4 if num_ones > 0 => write!(out, "\nselect 1 {}", rng.gen_range(1..=num_ones))?,
            _ => continue,
        }
        emitted += 1;
    }
    writeln!(out)?;

    out.flush()?;
    Ok(())
}
