pub mod error;
pub mod rng;
pub mod extract;
pub mod config;
pub mod constraint;
pub mod search;
pub mod segment;
