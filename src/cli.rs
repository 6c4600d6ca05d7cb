use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use castellan::chess::position::{Position, movegen::GenKind};

#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// Raise the log level: once for info, twice for debug. `RUST_LOG` overrides this.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[clap(subcommand)]
    pub subcommand: Subcommands,
}

#[derive(Subcommand)]
pub enum Subcommands {
    /// Count the leaf nodes of the move tree to a fixed depth.
    Perft {
        /// The position to search from, as FEN.
        #[clap(long, default_value = Position::STARTING_FEN)]
        fen: String,
        /// Depth of the move tree.
        #[clap(short, long)]
        depth: usize,
    },
    /// Like perft, but with a separate count for each root move.
    Divide {
        /// The position to search from, as FEN.
        #[clap(long, default_value = Position::STARTING_FEN)]
        fen: String,
        /// Depth of the move tree.
        #[clap(short, long)]
        depth: usize,
    },
    /// List the moves of a position.
    Moves {
        /// The position, as FEN.
        #[clap(long, default_value = Position::STARTING_FEN)]
        fen: String,
        /// Which moves to generate.
        #[clap(long, value_enum, default_value = "legal")]
        mode: GenKind,
    },
    /// Apply a sequence of moves and print the resulting position.
    Play {
        /// The position to start from, as FEN.
        #[clap(long, default_value = Position::STARTING_FEN)]
        fen: String,
        /// Moves in long algebraic notation, e.g. e2e4 or e7e8q.
        moves: Vec<String>,
    },
    /// Run an EPD perft suite.
    Suite {
        /// Path to the suite, with lines of the form `<fen> ;D1 n ;D2 n ...`.
        #[clap(value_name = "PATH")]
        path: PathBuf,
        /// Skip depths whose expected node count is above this.
        #[clap(long, value_name = "NODES", default_value = "60000000")]
        node_limit: u64,
    },
}
