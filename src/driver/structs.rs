//! The structs
//!
use std::path::PathBuf;
use crate::cursor::{RowSource, Value, Warning};
use crate::server::Credential;

/// Everything needed to open a connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    /// Only set when the server lives on the local host.
    pub socket: Option<PathBuf>,
    /// Empty means no default database.
    pub database: String,
    pub credential: Credential,
}
/// Parameters substituted into a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    #[default]
    None,
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}
/// The outcome of executing one statement.
pub struct Execution {
    pub rows: Box<dyn RowSource + Send>,
    pub warnings: Vec<Warning>,
}
/// Opens connections. Shared between servers, so it must be thread safe.
pub trait Connector: Send + Sync {
    fn connect(&self, options: &ConnectOptions) -> anyhow::Result<Box<dyn Connection>>;
}
/// An open connection to one server.
pub trait Connection: Send {
    /// Make `database` the default database of the connection.
    fn select_database(&mut self, database: &str) -> anyhow::Result<()>;
    fn execute(&mut self, command: &str, params: &Params) -> anyhow::Result<Execution>;
}
/// The connector using the `mysql` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlConnector;
pub(crate) struct MysqlConnection {
    pub(crate) conn: mysql::Conn,
    pub(crate) hostname_port: String,
}
