pub mod config;
pub mod staging;
