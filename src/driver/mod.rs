//! Module for the SQL driver boundary.
//!
//! The server does not speak the MySQL protocol itself. It asks a [Connector] for a
//! [Connection] and hands statements to it; the connection returns an [Execution]
//! holding the rows and any warnings the statement produced.
//!
//! [MysqlConnector] is the implementation on top of the `mysql` crate. Tests and
//! embedding code can provide their own connector.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
