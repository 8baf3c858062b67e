//! Module for running shell commands on the machine of a server.
//!
//! [crate::server::Server::run_remote_command] decides *how* a command reaches the
//! machine (`sudo` for the local host, `ssh` otherwise) and hands the resulting
//! argument vector to a [CommandRunner]. [ProcessRunner] runs it as a child process,
//! blocking until it exits, and returns stdout and stderr as lines.
//!
//! The exit status is not part of the contract: a failing command returns its output
//! lines like a successful one.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
