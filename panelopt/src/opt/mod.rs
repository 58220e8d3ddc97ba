pub mod control;
pub mod heuristic;
pub mod material;
pub mod moves;
pub mod sa;
pub mod score;
pub mod strategy;
pub mod strip;
