pub mod advanced;
pub mod basic;
pub mod stats;
