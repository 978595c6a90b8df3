//! Query-file parsing and answer-file writing.
//!
//! The text format is:
//!
//! ```text
//! <number of queries N>
//! <raw bit string, e.g. "0100010...">
//! <query 1>
//! ...
//! <query N>
//! ```
//!
//! where each query is one of `access <pos>`, `rank <0/1> <pos>` or
//! `select <0/1> <rank>`.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use tempfile::NamedTempFile;

/// The kind of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Whether a bit is set.
    Access,
    /// Number of zeros before a position.
    Rank0,
    /// Number of ones before a position.
    Rank1,
    /// Position of the k-th zero.
    Select0,
    /// Position of the k-th one.
    Select1,
}

/// A single parsed query.
#[derive(Debug, Clone, Copy)]
pub struct Query {
    pub kind: QueryKind,
    /// Position for access/rank, 1-indexed rank for select.
    pub value: u64,
}

/// Parses a query file into the raw bit string and the query list.
pub fn read_input(path: &Path) -> Result<(String, Vec<Query>)> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines();

    let num_queries: usize = lines
        .next()
        .context("missing query count line")?
        .trim()
        .parse()
        .context("invalid query count")?;

    let raw_bits = lines
        .next()
        .context("missing bit string line")?
        .trim()
        .to_string();
    ensure!(
        raw_bits.bytes().all(|byte| byte == b'0' || byte == b'1'),
        "bit string contains characters other than 0 and 1"
    );

    let mut queries = Vec::with_capacity(num_queries);
    for _ in 0..num_queries {
        let line = lines.next().context("fewer queries than announced")?;
        queries.push(parse_query(line)?);
    }

    Ok((raw_bits, queries))
}

fn parse_query(line: &str) -> Result<Query> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().context("empty query line")?;

    let kind = match cmd {
        "access" => QueryKind::Access,
        "rank" | "select" => {
            let bit = parts.next().context("missing bit argument")?;
            match (cmd, bit) {
                ("rank", "0") => QueryKind::Rank0,
                ("rank", "1") => QueryKind::Rank1,
                ("select", "0") => QueryKind::Select0,
                ("select", "1") => QueryKind::Select1,
                _ => bail!("invalid bit argument {bit:?} in {line:?}"),
            }
        }
        _ => bail!("unknown query {cmd:?}"),
    };

    let value = parts
        .next()
        .with_context(|| format!("missing operand in {line:?}"))?
        .parse()
        .with_context(|| format!("invalid operand in {line:?}"))?;

    Ok(Query { kind, value })
}

/// Writes one decimal answer per line.
///
/// The answers go through a temporary file in the target directory that is
/// persisted only once every line is written, so a failure never leaves a
/// partial answer file behind.
pub fn write_answers(path: &Path, answers: &[u64]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;

    {
        let mut out = BufWriter::new(&mut file);
        for answer in answers {
            writeln!(out, "{answer}")?;
        }
        out.flush()?;
    }

    file.persist(path)?;
    Ok(())
}
