//! The structs
//!
use crate::error::Result;
use crate::server::{Credential, Server};

pub trait Role: Send {
    /// A short name, used in logging and errors.
    fn name(&self) -> String;
    fn attach(&self, server: &mut Server) -> Result<()>;
    fn detach(&self, server: &mut Server) -> Result<()>;
}
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Vagabond;
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Master {
    /// The user slaves replicate with.
    pub repl_user: Credential,
}
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Slave;
