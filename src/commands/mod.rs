pub mod config;
pub mod diff;
pub mod export;
pub mod names;
