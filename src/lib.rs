//! Control MySQL servers in a replication deployment.
//!
//! Every server in the deployment is represented by a [server::Server]. A server
//! executes SQL through a connection it opens on first use, runs shell commands on
//! its machine, reads and replaces its option file, and can be started and stopped.
//! What a server does in the deployment is decided by its [roles::Role], which can
//! be replaced at runtime with [server::Server::imbue].
//!
//! The SQL driver, the command runner, the configuration manager and the machine
//! are collaborators behind traits, so all of them can be replaced.
//!
pub mod error;
pub mod position;
pub mod cursor;
pub mod driver;
pub mod remote;
pub mod machine;
pub mod configmanager;
pub mod roles;
pub mod server;
pub mod utility;


pub use error::ServerError;
pub use position::Position;
pub use server::{Credential, Server};

/// Defaults for the command line and `.env` settings.
pub const DEFAULT_HOSTS: &str = "localhost";
pub const DEFAULT_SQL_USER: &str = "root";
pub const DEFAULT_SSH_USER: &str = "mysql";
pub const DEFAULT_PARALLEL: &str = "1";
