//! Module for reading and replacing the configuration of a server.
//!
//! The configuration of a MySQL server is an option file (`my.cnf`): sections in
//! brackets followed by `key = value` lines or bare flags. [OptionFile] models such a
//! file line by line, so comments, blank lines and `!include` directives survive a
//! fetch/modify/replace cycle.
//!
//! A [ConfigManager] fetches and replaces the option file of a server. It gets the
//! server as context to resolve the default file (`defaults_file`); the section a
//! server reads is `config_section`, usually `mysqld`.
//!
//! [FileConfigManager] is the default manager, working on the file system of the
//! host the library runs on.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
