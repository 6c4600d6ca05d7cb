pub mod attacks;
pub mod chessmove;
pub mod fen;
pub mod magic;
pub mod piece;
pub mod piecelayout;
pub mod position;
pub mod squareset;
pub mod types;
