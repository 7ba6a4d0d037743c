pub mod algorithm;
pub mod assign;
pub mod common;
pub mod config;
pub mod error;
pub mod map;
pub mod scenario;
pub mod solver;
pub mod stat;
