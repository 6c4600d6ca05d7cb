use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    time::Instant,
};

use anyhow::Context;

use crate::{
    chess::{attacks::AttackTables, chessmove::Move, fen::Fen, position::Position},
    errors::PerftSuiteError,
};

/// Counts the leaf nodes of the legal move tree to `depth`.
pub fn perft(pos: &Position, depth: usize) -> u64 {
    debug_assert_eq!(pos.check_coherence(), Ok(()));

    if depth == 0 {
        return 1;
    }

    let moves = pos.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut count = 0;
    for &m in moves.iter() {
        let mut next = pos.clone();
        next.do_move(m);
        count += perft(&next, depth - 1);
    }

    count
}

/// Perft split by root move, in generation order.
pub fn divide(pos: &Position, depth: usize) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    pos.legal_moves()
        .iter()
        .map(|&m| {
            let mut next = pos.clone();
            next.do_move(m);
            let nodes = perft(&next, depth - 1);
            log::trace!("{m}: {nodes}");
            (m, nodes)
        })
        .collect()
}

/// One line of an EPD perft suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpdEntry {
    pub fen: Fen,
    /// Depths with their expected node counts, in file order.
    pub depths: Vec<(usize, u64)>,
}

impl EpdEntry {
    /// Parses `<fen> ;D1 n ;D2 n ...`. Blank lines and `#` comments give `None`.
    pub fn parse(line: &str, line_no: usize) -> Result<Option<Self>, PerftSuiteError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut parts = line.split(';');
        let fen_text = parts.next().unwrap_or_default().trim();
        let fen = Fen::parse_relaxed(fen_text).map_err(|source| PerftSuiteError::Fen {
            line: line_no,
            source,
        })?;

        let depths = parts
            .map(|entry| {
                let entry = entry.trim();
                let bad = || PerftSuiteError::BadDepthEntry {
                    line: line_no,
                    entry: entry.to_string(),
                };
                let (d, nodes) = entry.split_once(' ').ok_or_else(bad)?;
                let depth = d
                    .strip_prefix('D')
                    .and_then(|d| d.parse::<usize>().ok())
                    .ok_or_else(bad)?;
                let nodes = nodes.trim().parse::<u64>().map_err(|_| bad())?;
                Ok((depth, nodes))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if depths.is_empty() {
            return Err(PerftSuiteError::NoDepths { line: line_no });
        }

        Ok(Some(Self { fen, depths }))
    }
}

/// Totals from a suite run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuiteReport {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub nodes: u64,
}

impl SuiteReport {
    pub const fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs every entry of an EPD perft suite, skipping depths whose expected
/// node count exceeds `node_limit`.
pub fn run_suite(path: &Path, node_limit: u64) -> anyhow::Result<SuiteReport> {
    let f = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let tables = AttackTables::global();
    let mut report = SuiteReport::default();

    for (index, line) in BufReader::new(f).lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("failed to read line {line_no} of {}", path.display()))?;
        let Some(entry) = EpdEntry::parse(&line, line_no)? else {
            continue;
        };
        let pos = Position::set(&entry.fen, tables);
        log::debug!("line {line_no}: {pos}");

        for &(depth, expected) in &entry.depths {
            if expected > node_limit {
                log::debug!("skipping depth {depth} of line {line_no}, {expected} nodes is over the limit");
                report.skipped += 1;
                continue;
            }
            let start = Instant::now();
            let nodes = perft(&pos, depth);
            report.nodes += nodes;
            if nodes == expected {
                log::info!("PASS: fen {pos}, depth {depth} ({:.2?})", start.elapsed());
                report.passed += 1;
            } else {
                log::error!("FAIL: fen {pos}, depth {depth}: expected {expected}, got {nodes}");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
