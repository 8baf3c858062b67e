//! Module for the machines servers run on.
//!
//! A [Machine] knows how to start and stop the server process on a platform and
//! where the platform keeps the server's option file by default. It is shared
//! between the servers on the same kind of platform.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
