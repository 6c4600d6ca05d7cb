#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

//! Castellan, a bitboard chess rules engine.
//!
//! Positions are read from FEN, moves are generated from magic-bitboard
//! attack tables, and the result can be checked with perft.

pub mod chess;
pub mod errors;
pub mod perft;
pub mod rng;

/// The name of the crate.
pub static NAME: &str = "Castellan";
/// The version of the crate.
pub static VERSION: &str = env!("CARGO_PKG_VERSION");
