//! The error taxonomy of the server model.
//!
//! Collaborators (driver, command runner, config manager, machine) report failures as
//! [anyhow::Error]; the [crate::server::Server] wraps them into the matching variant
//! without retrying or recovering.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// A field or scalar was read from a cursor without a current row.
    #[error("no current row: the result is empty or exhausted")]
    EmptyRow,
    /// A scalar was requested from a row that does not have exactly one column.
    #[error("row has {0} columns, a scalar needs exactly one")]
    NotScalar(usize),
    #[error("row has no field {0}")]
    NoSuchField(String),
    /// Connecting or executing failed in the SQL driver.
    #[error(transparent)]
    Connection(anyhow::Error),
    /// Detaching the old role or attaching the new one failed during imbue.
    /// The role assignment of the server is undefined afterwards.
    #[error("role transition {from} -> {to} failed during {stage}")]
    RoleTransition {
        from: String,
        to: String,
        stage: &'static str,
        #[source]
        source: Box<ServerError>,
    },
    /// The command runner could not run the command at all.
    #[error("remote command {command:?} could not be run")]
    Remote {
        command: Vec<String>,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(anyhow::Error),
    #[error(transparent)]
    Machine(anyhow::Error),
    #[error("invalid binlog position: {0}")]
    InvalidPosition(String),
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;
