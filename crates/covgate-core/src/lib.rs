#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod duration;
pub mod errors;
pub mod report;
pub mod repository;
pub mod traits;
pub mod types;
