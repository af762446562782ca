pub mod paint;
pub mod paths;
pub mod process;
