//! The structs
//!
/// Runs an argument vector and returns the output lines.
pub trait CommandRunner: Send + Sync {
    fn run(&self, argv: &[String]) -> std::io::Result<Vec<String>>;
}
/// Runs commands as local child processes with stdin attached to the null device.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;
