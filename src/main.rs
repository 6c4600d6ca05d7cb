#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Command-line front end for castellan.

use std::time::Instant;

use anyhow::{Context, bail};

use castellan::{
    chess::position::{
        Position,
        movegen::{GenKind, MoveList},
    },
    perft,
};

mod cli;

fn main() -> anyhow::Result<()> {
    let cli = <cli::Cli as clap::Parser>::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.subcommand {
        cli::Subcommands::Perft { fen, depth } => {
            let pos = read_position(&fen)?;
            let start = Instant::now();
            let nodes = perft::perft(&pos, depth);
            let elapsed = start.elapsed();
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let nps = (nodes as f64 / elapsed.as_secs_f64().max(1e-9)) as u64;
            println!("nodes {nodes} time {elapsed:.2?} nps {nps}");
        }
        cli::Subcommands::Divide { fen, depth } => {
            let pos = read_position(&fen)?;
            let split = perft::divide(&pos, depth);
            for (m, nodes) in &split {
                println!("{m}: {nodes}");
            }
            println!();
            println!("moves {}", split.len());
            println!("nodes {}", split.iter().map(|&(_, n)| n).sum::<u64>());
        }
        cli::Subcommands::Moves { fen, mode } => {
            let pos = read_position(&fen)?;
            let mut list = MoveList::new();
            pos.generate_kind(mode, &mut list);
            println!("{list}");
            if list.is_empty() && mode == GenKind::Legal {
                if pos.in_check() {
                    println!("checkmate");
                } else {
                    println!("stalemate");
                }
            }
        }
        cli::Subcommands::Play { fen, moves } => {
            let mut pos = read_position(&fen)?;
            pos.play(moves.iter().map(String::as_str))
                .with_context(|| format!("stopped at {pos}"))?;
            println!("{pos:X}");
        }
        cli::Subcommands::Suite { path, node_limit } => {
            let report = perft::run_suite(&path, node_limit)?;
            println!(
                "passed {}, failed {}, skipped {}, nodes {}",
                report.passed, report.failed, report.skipped, report.nodes
            );
            if !report.success() {
                bail!("{} perft checks failed", report.failed);
            }
        }
    }

    Ok(())
}

fn read_position(fen: &str) -> anyhow::Result<Position<'static>> {
    Position::from_fen(fen).with_context(|| format!("invalid FEN \"{fen}\""))
}
