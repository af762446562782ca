pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const RESET: &str = "\x1b[0m";

pub fn yellow(text: &str) -> String {
    format!("{}{}{}", YELLOW, text, RESET)
}
