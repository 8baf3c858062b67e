//! Module for server roles.
//!
//! A [Role] is the replication behavior of a server. Imbuing a server with a role
//! attaches it: the role configures the server for its part in the deployment. When
//! the server gets another role, the old one is detached first and reverts what it
//! configured.
//!
//! - [Vagabond]: the default, a server without a replication responsibility. Attaching
//!   and detaching do nothing.
//! - [Master]: binary logging enabled, and a replication user slaves connect with.
//! - [Slave]: relay logging configured, to replay the binlog of a master.
//!
//! Roles do not keep track of the server they are attached to; the server holds the
//! role. Attaching or detaching a role that changes the option file restarts the
//! server.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
