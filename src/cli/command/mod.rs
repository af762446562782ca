pub mod build;
pub mod completion;
pub mod generate;
pub mod new;
pub mod serve;
pub mod shared;
