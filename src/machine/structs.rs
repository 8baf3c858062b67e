//! The structs
//!
use crate::server::Server;

pub trait Machine: Send + Sync {
    /// The option file a server uses when no defaults file is given.
    fn defaults_file(&self) -> &str;
    fn start_server(&self, server: &Server) -> anyhow::Result<()>;
    fn stop_server(&self, server: &Server) -> anyhow::Result<()>;
}
/// A Linux machine, controlling the server through its init script.
#[derive(Debug, Clone, PartialEq)]
pub struct Linux {
    pub init_script: String,
    pub defaults_file: String,
}
/// A Solaris machine, controlling the server through SMF.
#[derive(Debug, Clone, PartialEq)]
pub struct Solaris {
    pub service: String,
    pub defaults_file: String,
}
