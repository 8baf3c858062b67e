//! Utilities for the command line: option resolution, `.env` handling, and reading
//! the binlog positions of several servers in parallel.
//!
mod utility;

pub use utility::*;
