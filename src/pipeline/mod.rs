pub mod context;
pub mod engine;
pub mod progress;

pub use engine::{Pipeline, PipelineError, Task};
pub use progress::{ConsoleProgress, Progress, Silent};
