//! Module for binlog positions.
//!
//! A [Position] is a coordinate into the binary log of a server: the binlog file name
//! and the byte offset into that file. Positions order lexicographically on
//! `(file, position)`, which is the order the server writes them in.
//!
//! Comparison is purely structural: a position carries no identity of the server or
//! master chain it was read from. Comparing positions read from unrelated logs is
//! allowed, but meaningless, and it is up to the caller not to do that.
//!
//! The text form is `file:position`, for example `master-bin.000001:4711`, and can be
//! parsed back with [str::parse].
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
