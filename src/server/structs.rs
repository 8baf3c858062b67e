//! The structs
//!
use std::{path::PathBuf, sync::Arc};
use serde_derive::{Serialize, Deserialize};
use crate::configmanager::ConfigManager;
use crate::driver::{Connection, Connector};
use crate::machine::Machine;
use crate::remote::CommandRunner;
use crate::roles::Role;

/// A user name and its password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    pub secret: String,
}
/// A representation of a MySQL server.
pub struct Server {
    /// Used to name the binlog and relay log files of the server.
    pub name: String,
    /// The MySQL user to execute SQL with.
    pub sql_user: Credential,
    /// The operating system user on the machine of the server.
    pub ssh_user: Credential,
    /// `localhost` means the server is reached through `socket`.
    pub host: String,
    pub port: u16,
    pub socket: PathBuf,
    /// When not set, it is read from the option file by [Server::resolve_server_id].
    pub server_id: Option<u32>,
    pub defaults_file: String,
    pub config_section: String,
    pub(crate) machine: Arc<dyn Machine>,
    pub(crate) config_manager: Arc<dyn ConfigManager>,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) runner: Arc<dyn CommandRunner>,
    pub(crate) role: Box<dyn Role>,
    pub(crate) connection: Option<Box<dyn Connection>>,
}
/// Collects the construction parameters of a [Server].
/// Everything not set gets a default of its own; nothing is shared between builds.
pub struct ServerBuilder {
    pub(crate) name: String,
    pub(crate) sql_user: Credential,
    pub(crate) ssh_user: Credential,
    pub(crate) machine: Arc<dyn Machine>,
    pub(crate) config_manager: Option<Arc<dyn ConfigManager>>,
    pub(crate) connector: Option<Arc<dyn Connector>>,
    pub(crate) runner: Option<Arc<dyn CommandRunner>>,
    pub(crate) role: Option<Box<dyn Role>>,
    pub(crate) server_id: Option<u32>,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) socket: PathBuf,
    pub(crate) defaults_file: Option<String>,
    pub(crate) config_section: String,
}
