pub mod dispatcher;
pub mod renderer;

pub use dispatcher::{dispatch, ComponentArgs, ComponentRequest, Dispatch, Question};
