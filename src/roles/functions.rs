//! The impls and functions.
//!
use log::*;
use crate::configmanager::OptionFile;
use crate::error::Result;
use crate::roles::{Master, Role, Slave, Vagabond};
use crate::server::{Credential, Server};

/// Quote a string literal for use in a statement.
fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "''"))
}

/// Write the server id given to the server into the option file.
/// Without one, the option file is left as is.
fn set_server_id(server: &Server, config: &mut OptionFile) {
    match server.server_id {
        Some(server_id) => {
            config.set(&server.config_section, "server-id", Some(&server_id.to_string()));
        },
        None if !config.contains(&server.config_section, "server-id") => {
            warn!("{}: no server-id given or configured", server.name);
        },
        None => {},
    }
}

/// Stop the server, replace its option file and start it again.
fn restart_with(server: &mut Server, config: &OptionFile) -> Result<()> {
    info!("{}: restart with new configuration", server.name);
    server.disconnect()
        .stop()?
        .replace_config(config, None)?
        .start()?;
    Ok(())
}

impl Role for Vagabond {
    fn name(&self) -> String {
        "vagabond".to_string()
    }
    fn attach(&self, _server: &mut Server) -> Result<()> {
        Ok(())
    }
    fn detach(&self, _server: &mut Server) -> Result<()> {
        Ok(())
    }
}

impl Master {
    pub fn new(repl_user: Credential) -> Self {
        Master { repl_user }
    }
}

impl Role for Master {
    fn name(&self) -> String {
        "master".to_string()
    }
    fn attach(&self, server: &mut Server) -> Result<()> {
        let mut config = server.fetch_config(None)?;
        let section = server.config_section.clone();
        let log_bin = format!("{}-bin", server.name);
        set_server_id(server, &mut config);
        config.set(&section, "log-bin", Some(&log_bin))
            .set(&section, "log-bin-index", Some(&format!("{}.index", log_bin)));
        restart_with(server, &config)?;

        debug!("{}: create replication user {}", server.name, self.repl_user.name);
        server.sql(&format!(
            "CREATE USER IF NOT EXISTS {}@'%' IDENTIFIED BY {}",
            quote(&self.repl_user.name),
            quote(&self.repl_user.secret),
        ))?;
        server.sql(&format!("GRANT REPLICATION SLAVE ON *.* TO {}@'%'", quote(&self.repl_user.name)))?;
        Ok(())
    }
    /// Disable binary logging again. The replication user is kept.
    fn detach(&self, server: &mut Server) -> Result<()> {
        let mut config = server.fetch_config(None)?;
        let section = server.config_section.clone();
        let log_bin = config.remove(&section, "log-bin");
        let log_bin_index = config.remove(&section, "log-bin-index");
        if log_bin || log_bin_index {
            restart_with(server, &config)?;
        }
        Ok(())
    }
}

impl Role for Slave {
    fn name(&self) -> String {
        "slave".to_string()
    }
    fn attach(&self, server: &mut Server) -> Result<()> {
        let mut config = server.fetch_config(None)?;
        let section = server.config_section.clone();
        let relay_log = format!("{}-relay-bin", server.name);
        set_server_id(server, &mut config);
        config.set(&section, "relay-log", Some(&relay_log))
            .set(&section, "relay-log-index", Some(&format!("{}.index", relay_log)));
        restart_with(server, &config)
    }
    /// Stop replicating and remove the relay log configuration.
    fn detach(&self, server: &mut Server) -> Result<()> {
        server.sql("STOP SLAVE")?;
        let mut config = server.fetch_config(None)?;
        let section = server.config_section.clone();
        let relay_log = config.remove(&section, "relay-log");
        let relay_log_index = config.remove(&section, "relay-log-index");
        if relay_log || relay_log_index {
            restart_with(server, &config)?;
        }
        Ok(())
    }
}
