use crate::pipeline::engine::TaskStatus;
use crate::shared::utils::paint::{GREEN, RED, RESET, YELLOW};

/// Observer notified as a pipeline moves through its tasks
pub trait Progress {
    fn started(&mut self, title: &str);
    fn finished(&mut self, title: &str, status: &TaskStatus);
    fn failed(&mut self, title: &str, error: &anyhow::Error);
}

/// Prints one line per task event on stdout
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn started(&mut self, title: &str) {
        println!("{}›{} {}", YELLOW, RESET, title);
    }

    fn finished(&mut self, title: &str, status: &TaskStatus) {
        match status {
            TaskStatus::Skipped { reason } => {
                println!("{}↓{} {} [skipped: {}]", YELLOW, RESET, title, reason)
            }
            _ => println!("{}✓ {}{}", GREEN, title, RESET),
        }
    }

    fn failed(&mut self, title: &str, error: &anyhow::Error) {
        println!("{}✗{} {}", RED, RESET, title);
        println!("  {}{}{}", RED, error, RESET);
    }
}

/// Discards every event
#[derive(Debug, Default)]
pub struct Silent;

impl Progress for Silent {
    fn started(&mut self, _title: &str) {}
    fn finished(&mut self, _title: &str, _status: &TaskStatus) {}
    fn failed(&mut self, _title: &str, _error: &anyhow::Error) {}
}
