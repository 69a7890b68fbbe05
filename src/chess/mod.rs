pub mod attacks;
pub mod make_move;
pub mod moves;
pub mod position;
mod zobrist;

pub use attacks::movegen::*;
pub use moves::*;
pub use position::*;
