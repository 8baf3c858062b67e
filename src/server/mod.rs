//! Module for the server model.
//!
//! A [Server] is the proxy used to operate a MySQL server in a replication
//! deployment: executing SQL through a lazily opened connection, running shell
//! commands on its machine, fetching and replacing its option file, and starting
//! and stopping it.
//!
//! The replication behavior of a server is its [crate::roles::Role]. A server always
//! holds exactly one role; [Server::imbue] detaches the current role and attaches a
//! new one. The role given at construction is attached by [ServerBuilder::build].
//!
//! A server owns its connection and is meant to be driven by one thread at a time.
//! Different servers are independent, and can be driven concurrently.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
