pub mod evaluation;
pub mod ordering;
pub mod search;
pub mod transposition;
pub mod uci;
